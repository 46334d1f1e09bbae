use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

/// Calendar month used as the time axis of the bar and line charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(NaiveDate);

impl Period {
    pub fn from_ym(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Period)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Period(date.with_day(1).unwrap_or(date))
    }

    /// Spreadsheet date serial (days since 1899-12-30).
    pub fn from_excel_serial(serial: f64) -> Option<Self> {
        if !serial.is_finite() || !(1.0..=2_958_465.0).contains(&serial) {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        epoch
            .checked_add_days(Days::new(serial.floor() as u64))
            .map(Self::from_date)
    }

    /// Accepts `YYYY-MM`, `YYYY/MM`, `YYYY.MM`, full dates and date-times.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        const DATETIME_FORMATS: [&str; 4] = [
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y/%m/%d %H:%M:%S",
        ];
        for format in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
                return Some(Self::from_date(dt.date()));
            }
        }

        const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(input, format) {
                return Some(Self::from_date(date));
            }
        }

        static YEAR_MONTH: OnceLock<Option<Regex>> = OnceLock::new();
        let re = YEAR_MONTH
            .get_or_init(|| Regex::new(r"^(\d{4})\s*[-/.년]\s*(\d{1,2})\s*월?$").ok())
            .as_ref()?;
        let caps = re.captures(input)?;
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        Self::from_ym(year, month)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn label(&self) -> String {
        self.0.format("%Y-%m").to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Period::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid period '{}'", raw)))
    }
}

/// The five tables a dashboard source must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Bar,
    TimeSeries,
    Pie,
    Scatter,
    Pareto,
}

impl TableKind {
    pub const ALL: [TableKind; 5] = [
        TableKind::Bar,
        TableKind::TimeSeries,
        TableKind::Pie,
        TableKind::Scatter,
        TableKind::Pareto,
    ];

    /// Sheet name used by the original sales workbook.
    pub fn default_name(&self) -> &'static str {
        match self {
            TableKind::Bar => "바차트_히스토그램",
            TableKind::TimeSeries => "시계열차트",
            TableKind::Pie => "파이차트",
            TableKind::Scatter => "산점도",
            TableKind::Pareto => "파레토차트",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableKind::Bar => "bar",
            TableKind::TimeSeries => "time_series",
            TableKind::Pie => "pie",
            TableKind::Scatter => "scatter",
            TableKind::Pareto => "pareto",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub period: Period,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySeriesRecord {
    pub period: Period,
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankRecord {
    pub category: String,
    pub value: f64,
    pub cumulative_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    pub period: Period,
    /// One entry per category column, `None` for a blank cell.
    pub values: Vec<Option<f64>>,
}

/// Wide time-series layout: one value column per category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesTable {
    pub categories: Vec<String>,
    pub rows: Vec<TimeSeriesRow>,
}

impl TimeSeriesTable {
    /// Reshape to one record per (period, category), skipping blank cells.
    pub fn to_long(&self) -> Vec<CategorySeriesRecord> {
        self.rows
            .iter()
            .flat_map(|row| {
                self.categories
                    .iter()
                    .zip(&row.values)
                    .filter_map(move |(category, value)| {
                        value.map(|value| CategorySeriesRecord {
                            period: row.period,
                            category: category.clone(),
                            value,
                        })
                    })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Typed snapshot of all five tables, produced once per load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTables {
    pub bar: Vec<PeriodRecord>,
    pub time_series: TimeSeriesTable,
    pub pie: Vec<ShareRecord>,
    pub scatter: Vec<PointRecord>,
    pub pareto: Vec<ShareRecord>,
}

impl DataTables {
    pub fn row_count(&self, kind: TableKind) -> usize {
        match kind {
            TableKind::Bar => self.bar.len(),
            TableKind::TimeSeries => self.time_series.len(),
            TableKind::Pie => self.pie.len(),
            TableKind::Scatter => self.scatter.len(),
            TableKind::Pareto => self.pareto.len(),
        }
    }

    pub fn row_counts(&self) -> Vec<(TableKind, usize)> {
        TableKind::ALL
            .iter()
            .map(|kind| (*kind, self.row_count(*kind)))
            .collect()
    }
}

/// A single untyped cell as read from a workbook or CSV file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDateTime),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric view; text cells may carry thousands separators.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            Cell::Text(text) => {
                let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
                cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
            }
            _ => None,
        }
    }

    pub fn as_period(&self) -> Option<Period> {
        match self {
            Cell::Date(dt) => Some(Period::from_date(dt.date())),
            Cell::Text(text) => Period::parse(text),
            Cell::Number(serial) => Period::from_excel_serial(*serial),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Cell::Number(value) => Some(value.to_string()),
            Cell::Bool(value) => Some(value.to_string()),
            Cell::Date(dt) => Some(dt.to_string()),
            _ => None,
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// A named grid: header row plus data rows, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Build from a grid whose first row holds the headers. Blank rows are dropped.
    pub fn from_grid(name: impl Into<String>, grid: Vec<Vec<Cell>>) -> Self {
        let mut grid = grid.into_iter();
        let columns = grid
            .next()
            .map(|header| {
                header
                    .iter()
                    .map(|cell| cell.as_text().unwrap_or_default())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let rows = grid
            .filter(|row| !row.iter().all(Cell::is_empty))
            .collect();

        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.trim() == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn is_blank(&self) -> bool {
        self.columns.iter().all(|c| c.trim().is_empty()) && self.rows.is_empty()
    }
}

/// All tables found in one source, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWorkbook {
    pub source_name: String,
    pub tables: Vec<RawTable>,
}

impl RawWorkbook {
    pub fn table(&self, name: &str) -> Option<&RawTable> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|table| table.name.as_str()).collect()
    }
}
