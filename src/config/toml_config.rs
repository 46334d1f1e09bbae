use crate::core::export::{DEFAULT_ARCHIVE_NAME, SUPPORTED_FORMATS};
use crate::core::pareto::DEFAULT_THRESHOLD_PERCENT;
use crate::core::{ConfigProvider, DataSource};
use crate::domain::schema::TableSchema;
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Input formats accepted by the loader, besides CSV directories.
pub const SOURCE_EXTENSIONS: [&str; 6] = ["xlsx", "xlsm", "xlsb", "xls", "ods", "zip"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub dashboard: DashboardInfo,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub schema: TableSchema,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    Embedded,
    File,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub r#type: SourceType,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_threshold")]
    pub pareto_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pareto_threshold: DEFAULT_THRESHOLD_PERCENT,
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD_PERCENT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub verbose: Option<bool>,
}

impl TomlConfig {
    /// Load a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| DashboardError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DashboardError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR_NAME}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| DashboardError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("dashboard.name", &self.dashboard.name)?;

        if self.source.r#type == SourceType::File {
            let path = validation::validate_required_field("source.path", &self.source.path)?;
            validation::validate_source_path("source.path", path, &SOURCE_EXTENSIONS)?;
        }

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_formats(
            "load.output_formats",
            &self.load.output_formats,
            &SUPPORTED_FORMATS,
        )?;

        if let Some(compression) = &self.load.compression {
            if let Some(filename) = &compression.filename {
                validation::validate_non_empty_string("load.compression.filename", filename)?;
            }
        }

        validation::validate_range(
            "analysis.pareto_threshold",
            self.analysis.pareto_threshold,
            f64::MIN_POSITIVE,
            100.0,
        )?;

        for (field, value) in [
            ("schema.bar_period_column", &self.schema.bar_period_column),
            ("schema.bar_total_column", &self.schema.bar_total_column),
            ("schema.scatter_x_column", &self.schema.scatter_x_column),
            ("schema.scatter_y_column", &self.schema.scatter_y_column),
            ("schema.pareto_category_column", &self.schema.pareto_category_column),
            ("schema.pareto_value_column", &self.schema.pareto_value_column),
        ] {
            validation::validate_non_empty_string(field, value)?;
        }
        for name in self.schema.required_tables() {
            validation::validate_non_empty_string("schema", name)?;
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn verbose_logging(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.verbose)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn source(&self) -> DataSource {
        match (&self.source.r#type, &self.source.path) {
            (SourceType::File, Some(path)) => DataSource::Path(path.clone()),
            _ => DataSource::Embedded,
        }
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> Vec<String> {
        self.load.output_formats.clone()
    }

    fn archive_name(&self) -> Option<String> {
        match &self.load.compression {
            Some(c) if c.enabled => Some(
                c.filename
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ARCHIVE_NAME.to_string()),
            ),
            Some(_) => None,
            None => Some(DEFAULT_ARCHIVE_NAME.to_string()),
        }
    }

    fn schema(&self) -> TableSchema {
        self.schema.clone()
    }

    fn pareto_threshold(&self) -> f64 {
        self.analysis.pareto_threshold
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[dashboard]
name = "sales-2024"

[source]
type = "file"
path = "./sales.xlsx"

[analysis]
pareto_threshold = 75.0

[load]
output_path = "./test-output"
output_formats = ["csv", "json"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.dashboard.name, "sales-2024");
        assert_eq!(config.source(), DataSource::Path(PathBuf::from("./sales.xlsx")));
        assert_eq!(config.pareto_threshold(), 75.0);
        assert_eq!(config.schema(), TableSchema::default());
        assert_eq!(config.archive_name().as_deref(), Some(DEFAULT_ARCHIVE_NAME));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_to_embedded_source() {
        let toml_content = r#"
[dashboard]
name = "demo"

[load]
output_path = "./output"
output_formats = ["json"]

[load.compression]
enabled = false
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source(), DataSource::Embedded);
        assert_eq!(config.pareto_threshold(), DEFAULT_THRESHOLD_PERCENT);
        assert_eq!(config.archive_name(), None);
    }

    #[test]
    fn test_schema_override() {
        let toml_content = r#"
[dashboard]
name = "english"

[schema]
bar_table = "monthly_sales"
bar_period_column = "month"
bar_total_column = "total"

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let schema = config.schema();
        assert_eq!(schema.bar_table, "monthly_sales");
        assert_eq!(schema.bar_total_column, "total");
        // Unlisted fields keep their defaults
        assert_eq!(schema.pareto_table, "파레토차트");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SALES_DASHBOARD_TEST_OUTPUT", "/tmp/dashboard-out");

        let toml_content = r#"
[dashboard]
name = "test"

[load]
output_path = "${SALES_DASHBOARD_TEST_OUTPUT}"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output_path(), "/tmp/dashboard-out");

        std::env::remove_var("SALES_DASHBOARD_TEST_OUTPUT");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[dashboard]
name = "test"

[source]
type = "file"

[load]
output_path = "./output"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(DashboardError::MissingConfigError { .. })
        ));

        let bad_threshold = r#"
[dashboard]
name = "test"

[analysis]
pareto_threshold = 0.0

[load]
output_path = "./output"
output_formats = ["csv"]
"#;
        let config = TomlConfig::from_toml_str(bad_threshold).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[dashboard]
name = "file-test"

[load]
output_path = "./output"
output_formats = ["json"]
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.dashboard.name, "file-test");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[dashboard\nname=").unwrap_err();
        assert!(matches!(err, DashboardError::ConfigError { .. }));
    }
}
