use crate::core::report::DashboardReport;
use crate::domain::model::Period;
use crate::utils::error::{DashboardError, Result};
use serde::Serialize;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const SUPPORTED_FORMATS: [&str; 2] = ["json", "csv"];
pub const DEFAULT_ARCHIVE_NAME: &str = "dashboard_output.zip";

/// A rendered output file, not yet written anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub name: String,
    pub contents: Vec<u8>,
}

#[derive(Serialize)]
struct TimeSeriesRow<'a> {
    period: Period,
    category: &'a str,
    value: f64,
}

#[derive(Serialize)]
struct RegressionRow<'a> {
    slope: f64,
    intercept: f64,
    x_start: f64,
    y_start: f64,
    x_end: f64,
    y_end: f64,
    correlation: Option<f64>,
    r_squared: Option<f64>,
    equation: &'a str,
}

#[derive(Serialize)]
struct ParetoRow<'a> {
    rank: usize,
    category: &'a str,
    value: f64,
    cumulative_percent: f64,
    within_threshold: bool,
}

/// Render the report in each requested format.
pub fn render(report: &DashboardReport, formats: &[String]) -> Result<Vec<ExportFile>> {
    let mut files = Vec::new();

    for format in formats {
        match format.as_str() {
            "json" => files.push(ExportFile {
                name: "dashboard.json".to_string(),
                contents: serde_json::to_vec_pretty(report)?,
            }),
            "csv" => files.extend(render_csv(report)?),
            other => {
                return Err(DashboardError::InvalidConfigValueError {
                    field: "output_formats".to_string(),
                    value: other.to_string(),
                    reason: format!("Valid formats: {}", SUPPORTED_FORMATS.join(", ")),
                })
            }
        }
    }

    Ok(files)
}

fn render_csv(report: &DashboardReport) -> Result<Vec<ExportFile>> {
    let fit = &report.regression;
    let threshold = report.pareto.threshold_index;

    Ok(vec![
        csv_file("bar.csv", &report.bar)?,
        csv_file(
            "timeseries.csv",
            report.time_series.iter().map(|r| TimeSeriesRow {
                period: r.period,
                category: &r.category,
                value: r.value,
            }),
        )?,
        csv_file("pie.csv", &report.pie)?,
        csv_file("scatter.csv", &report.scatter)?,
        csv_file(
            "regression.csv",
            [RegressionRow {
                slope: fit.slope,
                intercept: fit.intercept,
                x_start: fit.endpoints[0].x,
                y_start: fit.endpoints[0].y,
                x_end: fit.endpoints[1].x,
                y_end: fit.endpoints[1].y,
                correlation: fit.correlation,
                r_squared: fit.r_squared,
                equation: &report.equation,
            }],
        )?,
        csv_file(
            "pareto.csv",
            report
                .pareto
                .records
                .iter()
                .enumerate()
                .map(|(index, r)| ParetoRow {
                    rank: index + 1,
                    category: &r.category,
                    value: r.value,
                    cumulative_percent: r.cumulative_percent,
                    within_threshold: threshold.is_some_and(|t| index <= t),
                }),
        )?,
        csv_file("reconciliation.csv", &report.reconciliation.rows)?,
    ])
}

fn csv_file<I, T>(name: &str, rows: I) -> Result<ExportFile>
where
    I: IntoIterator<Item = T>,
    T: Serialize,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let contents = writer
        .into_inner()
        .map_err(|e| DashboardError::IoError(e.into_error()))?;

    Ok(ExportFile {
        name: name.to_string(),
        contents,
    })
}

/// Pack the files into a single in-memory zip archive.
pub fn zip_files(files: &[ExportFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for file in files {
        zip.start_file(file.name.as_str(), SimpleFileOptions::default())?;
        zip.write_all(&file.contents)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
