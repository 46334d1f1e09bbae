use crate::core::pareto::{self, ParetoRanking};
use crate::core::regression::{self, RegressionFit};
use crate::core::shares::{self, ShareSlice};
use crate::core::summary::{self, Kpis, Reconciliation};
use crate::domain::model::{CategorySeriesRecord, DataTables, PeriodRecord, PointRecord};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};

/// Everything the renderer and the summary cards consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub kpis: Kpis,
    pub bar: Vec<PeriodRecord>,
    pub categories: Vec<String>,
    pub time_series: Vec<CategorySeriesRecord>,
    pub pie: Vec<ShareSlice>,
    pub scatter: Vec<PointRecord>,
    pub regression: RegressionFit,
    pub equation: String,
    pub pareto: ParetoRanking,
    pub reconciliation: Reconciliation,
}

impl DashboardReport {
    /// Compute every derived value. The first failure aborts the whole report.
    pub fn build(tables: DataTables, pareto_threshold: f64) -> Result<Self> {
        let kpis = summary::compute_kpis(&tables.bar)?;
        let time_series = tables.time_series.to_long();
        let reconciliation = summary::reconcile(&tables.bar, &time_series);
        let pie = shares::share_slices(&tables.pie)?;
        let regression = regression::fit_points(&tables.scatter)?;
        let pareto = pareto::rank(&tables.pareto, pareto_threshold)?;

        Ok(Self {
            kpis,
            bar: tables.bar,
            categories: tables.time_series.categories,
            time_series,
            pie,
            scatter: tables.scatter,
            equation: regression.equation_label(),
            regression,
            pareto,
            reconciliation,
        })
    }
}

/// `1234567.8` -> `1,234,568`, the way the KPI cards show amounts.
pub fn format_amount(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    if negative {
        format!("-{}", out)
    } else {
        out
    }
}
