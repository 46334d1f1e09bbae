use crate::domain::model::TableKind;
use serde::{Deserialize, Serialize};

/// Table and column names the loader binds to. Defaults follow the original
/// Korean sales workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSchema {
    pub bar_table: String,
    pub bar_period_column: String,
    pub bar_total_column: String,

    pub time_series_table: String,
    pub time_series_period_column: String,

    /// The pie table is bound by position: first column category, second value.
    pub pie_table: String,

    pub scatter_table: String,
    pub scatter_x_column: String,
    pub scatter_y_column: String,

    pub pareto_table: String,
    pub pareto_category_column: String,
    pub pareto_value_column: String,
}

impl Default for TableSchema {
    fn default() -> Self {
        Self {
            bar_table: TableKind::Bar.default_name().to_string(),
            bar_period_column: "월".to_string(),
            bar_total_column: "총 매출".to_string(),
            time_series_table: TableKind::TimeSeries.default_name().to_string(),
            time_series_period_column: "월".to_string(),
            pie_table: TableKind::Pie.default_name().to_string(),
            scatter_table: TableKind::Scatter.default_name().to_string(),
            scatter_x_column: "제품 A 매출".to_string(),
            scatter_y_column: "비용".to_string(),
            pareto_table: TableKind::Pareto.default_name().to_string(),
            pareto_category_column: "부서".to_string(),
            pareto_value_column: "매출".to_string(),
        }
    }
}

impl TableSchema {
    pub fn table_name(&self, kind: TableKind) -> &str {
        match kind {
            TableKind::Bar => &self.bar_table,
            TableKind::TimeSeries => &self.time_series_table,
            TableKind::Pie => &self.pie_table,
            TableKind::Scatter => &self.scatter_table,
            TableKind::Pareto => &self.pareto_table,
        }
    }

    /// Required table names in canonical order.
    pub fn required_tables(&self) -> Vec<&str> {
        TableKind::ALL
            .iter()
            .map(|kind| self.table_name(*kind))
            .collect()
    }
}
