//! Built-in 2024 sales dataset, used when no file is supplied.

use crate::domain::model::{Cell, RawTable, RawWorkbook};
use crate::domain::schema::TableSchema;

pub const EMBEDDED_SOURCE_NAME: &str = "embedded dataset";

const PRODUCTS: [&str; 3] = ["제품 A", "제품 B", "제품 C"];

// (month, product A, product B, product C); the bar totals are the row sums.
const MONTHLY_SALES: [(u32, f64, f64, f64); 12] = [
    (1, 320.0, 300.0, 265.0),
    (2, 335.0, 310.0, 273.0),
    (3, 325.0, 298.0, 264.0),
    (4, 345.0, 315.0, 280.0),
    (5, 372.0, 340.0, 300.0),
    (6, 360.0, 330.0, 290.0),
    (7, 385.0, 350.0, 310.0),
    (8, 405.0, 370.0, 326.0),
    (9, 364.0, 332.0, 294.0),
    (10, 375.0, 342.0, 303.0),
    (11, 395.0, 360.0, 320.0),
    (12, 425.0, 385.0, 340.0),
];

const MONTHLY_COST_A: [f64; 12] = [
    210.0, 221.0, 214.0, 226.0, 243.0, 236.0, 251.0, 264.0, 238.0, 245.0, 258.0, 276.0,
];

const DEPARTMENT_SALES: [(&str, f64); 5] = [
    ("마케팅부", 923.0),
    ("영업부", 477.0),
    ("생산부", 954.0),
    ("인사부", 209.0),
    ("연구개발부", 559.0),
];

fn text(value: &str) -> Cell {
    Cell::Text(value.to_string())
}

fn month_label(month: u32) -> Cell {
    Cell::Text(format!("2024-{:02}", month))
}

/// The embedded tables, named after `schema` so they bind like any external source.
pub fn embedded_workbook(schema: &TableSchema) -> RawWorkbook {
    let mut bar = vec![vec![
        text(&schema.bar_period_column),
        text(&schema.bar_total_column),
    ]];
    let mut series = vec![std::iter::once(text(&schema.time_series_period_column))
        .chain(PRODUCTS.iter().map(|p| text(p)))
        .collect::<Vec<_>>()];
    let mut scatter = vec![vec![
        text(&schema.scatter_x_column),
        text(&schema.scatter_y_column),
    ]];

    for (&(month, a, b, c), &cost) in MONTHLY_SALES.iter().zip(MONTHLY_COST_A.iter()) {
        bar.push(vec![month_label(month), Cell::Number(a + b + c)]);
        series.push(vec![
            month_label(month),
            Cell::Number(a),
            Cell::Number(b),
            Cell::Number(c),
        ]);
        scatter.push(vec![Cell::Number(a), Cell::Number(cost)]);
    }

    // First quarter per product
    let mut pie = vec![vec![text("제품"), text("1분기 매출")]];
    for (index, product) in PRODUCTS.iter().enumerate() {
        let q1: f64 = MONTHLY_SALES[..3]
            .iter()
            .map(|&(_, a, b, c)| [a, b, c][index])
            .sum();
        pie.push(vec![text(product), Cell::Number(q1)]);
    }

    let mut pareto = vec![vec![
        text(&schema.pareto_category_column),
        text(&schema.pareto_value_column),
    ]];
    for (department, sales) in DEPARTMENT_SALES {
        pareto.push(vec![text(department), Cell::Number(sales)]);
    }

    RawWorkbook {
        source_name: EMBEDDED_SOURCE_NAME.to_string(),
        tables: vec![
            RawTable::from_grid(&schema.bar_table, bar),
            RawTable::from_grid(&schema.time_series_table, series),
            RawTable::from_grid(&schema.pie_table, pie),
            RawTable::from_grid(&schema.scatter_table, scatter),
            RawTable::from_grid(&schema.pareto_table, pareto),
        ],
    }
}
