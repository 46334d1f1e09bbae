use crate::domain::model::DataTables;
use crate::domain::schema::TableSchema;
use crate::utils::error::Result;
use std::path::PathBuf;

/// Where the dashboard tables come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Built-in 2024 sales dataset.
    Embedded,
    /// Workbook file, CSV bundle archive or CSV directory on disk.
    Path(PathBuf),
    /// In-memory upload; the name's extension selects the format.
    Upload { name: String, bytes: Vec<u8> },
}

impl DataSource {
    pub fn display_name(&self) -> String {
        match self {
            DataSource::Embedded => "embedded dataset".to_string(),
            DataSource::Path(path) => path.display().to_string(),
            DataSource::Upload { name, .. } => name.clone(),
        }
    }
}

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
    /// Location a relative path resolves to, for reporting.
    fn resolve(&self, path: &str) -> String;
}

pub trait ConfigProvider {
    fn source(&self) -> DataSource;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> Vec<String>;
    /// Archive file name when exports are zipped, `None` to write loose files.
    fn archive_name(&self) -> Option<String>;
    fn schema(&self) -> TableSchema;
    fn pareto_threshold(&self) -> f64;
}

pub trait Pipeline {
    type Report;

    fn extract(&mut self) -> Result<DataTables>;
    fn transform(&self, tables: DataTables) -> Result<Self::Report>;
    fn load(&self, report: &Self::Report) -> Result<String>;
}
