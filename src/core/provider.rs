use crate::adapters::{csv_bundle, embedded, workbook};
use crate::core::cache::{SourceKey, TableCache};
use crate::domain::model::{
    Cell, DataTables, Period, PeriodRecord, PointRecord, RawTable, RawWorkbook, ShareRecord,
    TimeSeriesRow, TimeSeriesTable,
};
use crate::domain::ports::DataSource;
use crate::domain::schema::TableSchema;
use crate::utils::error::{DashboardError, LoadCause, Result};
use std::collections::HashSet;
use std::path::Path;

/// Loads the five dashboard tables and caches them per source identity.
#[derive(Debug, Default)]
pub struct TabularDataProvider {
    schema: TableSchema,
    cache: TableCache,
}

impl TabularDataProvider {
    pub fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            cache: TableCache::new(),
        }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    pub fn load(&mut self, source: &DataSource) -> Result<DataTables> {
        let key = SourceKey::for_source(source)?;
        if let Some(tables) = self.cache.get(&key) {
            tracing::debug!("Cache hit for {}", source.display_name());
            return Ok(tables.clone());
        }

        tracing::debug!("Cache miss for {}, reading source", source.display_name());
        let raw = read_source(source, &self.schema)?;
        let tables = bind_tables(&raw, &self.schema)?;

        for (kind, rows) in tables.row_counts() {
            tracing::debug!("Loaded {} table: {} rows", kind, rows);
        }

        self.cache.insert(key, tables.clone());
        Ok(tables)
    }

    pub fn invalidate(&mut self, source: &DataSource) -> bool {
        self.cache.invalidate(source)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// Read a source into raw tables, choosing the reader from the path or upload name.
pub fn read_source(source: &DataSource, schema: &TableSchema) -> Result<RawWorkbook> {
    match source {
        DataSource::Embedded => Ok(embedded::embedded_workbook(schema)),
        DataSource::Path(path) if path.is_dir() => csv_bundle::read_csv_directory(path),
        DataSource::Path(path) => {
            let name = path.display().to_string();
            match extension_of(path).as_deref() {
                Some("zip") => csv_bundle::read_csv_zip_path(path),
                Some(ext) if workbook::WORKBOOK_EXTENSIONS.contains(&ext) => {
                    workbook::read_workbook_path(path)
                }
                other => Err(unsupported(&name, other)),
            }
        }
        DataSource::Upload { name, bytes } => match extension_of(Path::new(name)).as_deref() {
            Some("zip") => csv_bundle::read_csv_zip_bytes(name, bytes),
            Some(ext) if workbook::WORKBOOK_EXTENSIONS.contains(&ext) => {
                workbook::read_workbook_bytes(name, bytes)
            }
            other => Err(unsupported(name, other)),
        },
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn unsupported(name: &str, extension: Option<&str>) -> DashboardError {
    DashboardError::load(
        name,
        LoadCause::UnsupportedFormat(match extension {
            Some(ext) => format!("'.{}' files are not supported", ext),
            None => "file has no extension".to_string(),
        }),
    )
}

/// Check that every required table is present, then bind each one to typed rows.
pub fn bind_tables(raw: &RawWorkbook, schema: &TableSchema) -> Result<DataTables> {
    let missing: Vec<String> = schema
        .required_tables()
        .into_iter()
        .filter(|name| raw.table(name).is_none())
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        tracing::debug!("Source {} has tables: {:?}", raw.source_name, raw.table_names());
        return Err(DashboardError::MissingTableError { missing });
    }

    let table = |name: &str| {
        raw.table(name)
            .map(|table| TableBinder::new(&raw.source_name, table))
            .ok_or_else(|| DashboardError::MissingTableError {
                missing: vec![name.to_string()],
            })
    };

    Ok(DataTables {
        bar: table(&schema.bar_table)?.bind_periods(schema)?,
        time_series: table(&schema.time_series_table)?.bind_time_series(schema)?,
        pie: table(&schema.pie_table)?.bind_pie()?,
        scatter: table(&schema.scatter_table)?.bind_points(schema)?,
        pareto: table(&schema.pareto_table)?.bind_shares(
            &schema.pareto_category_column,
            &schema.pareto_value_column,
        )?,
    })
}

struct TableBinder<'a> {
    source_name: &'a str,
    table: &'a RawTable,
}

impl<'a> TableBinder<'a> {
    fn new(source_name: &'a str, table: &'a RawTable) -> Self {
        Self { source_name, table }
    }

    fn error(&self, message: impl Into<String>) -> DashboardError {
        DashboardError::schema(self.source_name, &self.table.name, message)
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.table
            .column_index(name)
            .ok_or_else(|| self.error(format!("missing column '{}'", name)))
    }

    // Spreadsheet row number, counting the header as row 1.
    fn row_label(row: usize) -> usize {
        row + 2
    }

    fn number(&self, row: usize, column: usize) -> Result<f64> {
        let cell = self.table.cell(row, column);
        cell.as_number().ok_or_else(|| {
            self.error(format!(
                "row {}: expected a number in column '{}', found {}",
                Self::row_label(row),
                self.table.columns[column],
                describe(cell)
            ))
        })
    }

    fn non_negative(&self, row: usize, column: usize) -> Result<f64> {
        let value = self.number(row, column)?;
        if value < 0.0 {
            return Err(self.error(format!(
                "row {}: column '{}' must not be negative ({})",
                Self::row_label(row),
                self.table.columns[column],
                value
            )));
        }
        Ok(value)
    }

    fn optional_number(&self, row: usize, column: usize) -> Result<Option<f64>> {
        if self.table.cell(row, column).is_empty() {
            return Ok(None);
        }
        self.number(row, column).map(Some)
    }

    fn period(&self, row: usize, column: usize) -> Result<Period> {
        let cell = self.table.cell(row, column);
        cell.as_period().ok_or_else(|| {
            self.error(format!(
                "row {}: cannot read a month from {} in column '{}'",
                Self::row_label(row),
                describe(cell),
                self.table.columns[column]
            ))
        })
    }

    fn text(&self, row: usize, column: usize) -> Result<String> {
        self.table.cell(row, column).as_text().ok_or_else(|| {
            self.error(format!(
                "row {}: column '{}' is empty",
                Self::row_label(row),
                self.table.columns[column]
            ))
        })
    }

    fn bind_periods(&self, schema: &TableSchema) -> Result<Vec<PeriodRecord>> {
        if self.table.is_blank() {
            return Ok(Vec::new());
        }
        let period_col = self.require_column(&schema.bar_period_column)?;
        let total_col = self.require_column(&schema.bar_total_column)?;

        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(self.table.rows.len());
        for row in 0..self.table.rows.len() {
            let period = self.period(row, period_col)?;
            if !seen.insert(period) {
                return Err(self.error(format!("duplicate month {}", period)));
            }
            records.push(PeriodRecord {
                period,
                total: self.non_negative(row, total_col)?,
            });
        }

        records.sort_by_key(|record| record.period);
        Ok(records)
    }

    fn bind_time_series(&self, schema: &TableSchema) -> Result<TimeSeriesTable> {
        if self.table.is_blank() {
            return Ok(TimeSeriesTable::default());
        }
        let period_col = self.require_column(&schema.time_series_period_column)?;

        let mut category_cols = Vec::new();
        let mut categories: Vec<String> = Vec::new();
        for (index, name) in self.table.columns.iter().enumerate() {
            let name = name.trim();
            if index == period_col || name.is_empty() {
                continue;
            }
            if categories.iter().any(|existing| existing == name) {
                return Err(self.error(format!("duplicate category column '{}'", name)));
            }
            categories.push(name.to_string());
            category_cols.push(index);
        }

        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(self.table.rows.len());
        for row in 0..self.table.rows.len() {
            let period = self.period(row, period_col)?;
            if !seen.insert(period) {
                return Err(self.error(format!("duplicate month {}", period)));
            }
            let values = category_cols
                .iter()
                .map(|&col| self.optional_number(row, col))
                .collect::<Result<Vec<_>>>()?;
            rows.push(TimeSeriesRow { period, values });
        }

        rows.sort_by_key(|row| row.period);
        Ok(TimeSeriesTable { categories, rows })
    }

    fn bind_pie(&self) -> Result<Vec<ShareRecord>> {
        if self.table.is_blank() {
            return Ok(Vec::new());
        }
        if self.table.columns.len() < 2 {
            return Err(self.error("expected a category column and a value column"));
        }
        self.collect_shares(0, 1)
    }

    fn bind_shares(&self, category_column: &str, value_column: &str) -> Result<Vec<ShareRecord>> {
        if self.table.is_blank() {
            return Ok(Vec::new());
        }
        let category_col = self.require_column(category_column)?;
        let value_col = self.require_column(value_column)?;
        self.collect_shares(category_col, value_col)
    }

    fn collect_shares(&self, category_col: usize, value_col: usize) -> Result<Vec<ShareRecord>> {
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(self.table.rows.len());
        for row in 0..self.table.rows.len() {
            let category = self.text(row, category_col)?;
            if !seen.insert(category.clone()) {
                return Err(self.error(format!("duplicate category '{}'", category)));
            }
            records.push(ShareRecord {
                category,
                value: self.non_negative(row, value_col)?,
            });
        }
        Ok(records)
    }

    fn bind_points(&self, schema: &TableSchema) -> Result<Vec<PointRecord>> {
        if self.table.is_blank() {
            return Ok(Vec::new());
        }
        let x_col = self.require_column(&schema.scatter_x_column)?;
        let y_col = self.require_column(&schema.scatter_y_column)?;

        (0..self.table.rows.len())
            .map(|row| {
                Ok(PointRecord {
                    x: self.number(row, x_col)?,
                    y: self.number(row, y_col)?,
                })
            })
            .collect()
    }
}

fn describe(cell: &Cell) -> String {
    match cell {
        Cell::Empty => "an empty cell".to_string(),
        Cell::Text(text) => format!("'{}'", text),
        Cell::Number(value) => value.to_string(),
        Cell::Bool(value) => value.to_string(),
        Cell::Date(value) => value.to_string(),
    }
}
