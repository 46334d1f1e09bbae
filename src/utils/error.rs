use thiserror::Error;

/// Underlying reason a data source could not be turned into tables.
#[derive(Error, Debug)]
pub enum LoadCause {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("unsupported source format: {0}")]
    UnsupportedFormat(String),

    #[error("table '{table}': {message}")]
    Schema { table: String, message: String },
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Failed to load data from {source_name}: {cause}")]
    LoadError {
        source_name: String,
        #[source]
        cause: LoadCause,
    },

    #[error("Required tables are missing from the source: {}", .missing.join(", "))]
    MissingTableError { missing: Vec<String> },

    #[error("Table '{table}' contains no rows")]
    EmptyDatasetError { table: String },

    #[error("Regression needs at least 2 paired points (got x={x_len}, y={y_len})")]
    InsufficientDataError { x_len: usize, y_len: usize },

    #[error("Degenerate fit: {reason}")]
    DegenerateFitError { reason: String },

    #[error("Invalid value in {context}: {message}")]
    InvalidValueError { context: String, message: String },

    #[error("Export IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Source,
    Data,
    Analysis,
    Export,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code for a failed run.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl DashboardError {
    pub fn load(source_name: impl Into<String>, cause: impl Into<LoadCause>) -> Self {
        DashboardError::LoadError {
            source_name: source_name.into(),
            cause: cause.into(),
        }
    }

    pub fn schema(
        source_name: impl Into<String>,
        table: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        DashboardError::LoadError {
            source_name: source_name.into(),
            cause: LoadCause::Schema {
                table: table.into(),
                message: message.into(),
            },
        }
    }

    pub fn empty(table: impl Into<String>) -> Self {
        DashboardError::EmptyDatasetError {
            table: table.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DashboardError::LoadError { cause, .. } => match cause {
                LoadCause::Schema { .. } => ErrorCategory::Data,
                _ => ErrorCategory::Source,
            },
            DashboardError::MissingTableError { .. } | DashboardError::EmptyDatasetError { .. } => {
                ErrorCategory::Data
            }
            DashboardError::InsufficientDataError { .. }
            | DashboardError::DegenerateFitError { .. }
            | DashboardError::InvalidValueError { .. } => ErrorCategory::Analysis,
            DashboardError::IoError(_)
            | DashboardError::CsvError(_)
            | DashboardError::ZipError(_)
            | DashboardError::SerializationError(_) => ErrorCategory::Export,
            DashboardError::ConfigError { .. }
            | DashboardError::InvalidConfigValueError { .. }
            | DashboardError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Source | ErrorCategory::Export => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Analysis => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DashboardError::LoadError {
                cause: LoadCause::Schema { table, .. },
                ..
            } => format!("Check the column headers and cell values of table '{}'", table),
            DashboardError::LoadError {
                cause: LoadCause::UnsupportedFormat(_),
                ..
            } => "Use an .xlsx/.xls/.ods workbook, a .zip of CSV files, or a directory of CSV files"
                .to_string(),
            DashboardError::LoadError { .. } => {
                "Make sure the file exists, is readable and is not corrupted".to_string()
            }
            DashboardError::MissingTableError { missing } => format!(
                "Add the following sheets to the workbook: {}",
                missing.join(", ")
            ),
            DashboardError::EmptyDatasetError { table } => {
                format!("Add at least one data row to table '{}'", table)
            }
            DashboardError::InsufficientDataError { .. } => {
                "Provide at least two complete (x, y) rows in the scatter table".to_string()
            }
            DashboardError::DegenerateFitError { .. } => {
                "The x values must not all be identical".to_string()
            }
            DashboardError::InvalidValueError { .. } => {
                "Values must be finite and non-negative".to_string()
            }
            DashboardError::IoError(_) | DashboardError::ZipError(_) => {
                "Check that the output path is writable".to_string()
            }
            DashboardError::CsvError(_) | DashboardError::SerializationError(_) => {
                "Retry the export; report the issue if it persists".to_string()
            }
            DashboardError::ConfigError { .. }
            | DashboardError::InvalidConfigValueError { .. }
            | DashboardError::MissingConfigError { .. } => {
                "Review the command-line flags and the TOML configuration file".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DashboardError::LoadError { .. } => format!("Data load failed: {}", self),
            DashboardError::MissingTableError { missing } => {
                format!("The file is missing these sheets: {}", missing.join(", "))
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
