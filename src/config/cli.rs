use crate::config::toml_config::{CompressionConfig, SourceType, TomlConfig, SOURCE_EXTENSIONS};
use crate::core::export::{DEFAULT_ARCHIVE_NAME, SUPPORTED_FORMATS};
use crate::core::pareto::DEFAULT_THRESHOLD_PERCENT;
use crate::core::{ConfigProvider, DataSource};
use crate::domain::schema::TableSchema;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_OUTPUT_PATH: &str = "./output";

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "sales-dashboard")]
#[command(about = "Sales dashboard: monthly KPIs, product trends, regression and Pareto analysis")]
pub struct CliConfig {
    /// Workbook (.xlsx/.xls/.ods), zipped CSV bundle, or directory of CSV files
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Use the embedded 2024 dataset even if a file is configured
    #[arg(long)]
    pub embedded: bool,

    /// TOML configuration file; flags given here override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory that receives the exports [default: ./output]
    #[arg(long)]
    pub output_path: Option<String>,

    /// Export formats [default: json,csv]
    #[arg(long, value_delimiter = ',')]
    pub formats: Vec<String>,

    /// Write loose files instead of a single zip archive
    #[arg(long)]
    pub no_zip: bool,

    /// Cumulative percentage that marks the Pareto threshold [default: 80]
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Load and validate the tables, then stop
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

impl CliConfig {
    /// Apply the flags that were actually given on top of a file configuration.
    pub fn apply_to(&self, config: &mut TomlConfig) {
        if self.embedded {
            config.source.r#type = SourceType::Embedded;
        } else if let Some(file) = &self.file {
            config.source.r#type = SourceType::File;
            config.source.path = Some(file.clone());
        }
        if let Some(output_path) = &self.output_path {
            config.load.output_path = output_path.clone();
        }
        if !self.formats.is_empty() {
            config.load.output_formats = self.formats.clone();
        }
        if self.no_zip {
            config.load.compression = Some(CompressionConfig {
                enabled: false,
                filename: None,
            });
        }
        if let Some(threshold) = self.threshold {
            config.analysis.pareto_threshold = threshold;
        }
    }
}

impl ConfigProvider for CliConfig {
    fn source(&self) -> DataSource {
        match (&self.file, self.embedded) {
            (Some(file), false) => DataSource::Path(file.clone()),
            _ => DataSource::Embedded,
        }
    }

    fn output_path(&self) -> &str {
        self.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH)
    }

    fn output_formats(&self) -> Vec<String> {
        if self.formats.is_empty() {
            SUPPORTED_FORMATS.iter().map(|f| f.to_string()).collect()
        } else {
            self.formats.clone()
        }
    }

    fn archive_name(&self) -> Option<String> {
        (!self.no_zip).then(|| DEFAULT_ARCHIVE_NAME.to_string())
    }

    fn schema(&self) -> TableSchema {
        TableSchema::default()
    }

    fn pareto_threshold(&self) -> f64 {
        self.threshold.unwrap_or(DEFAULT_THRESHOLD_PERCENT)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let (Some(file), false) = (&self.file, self.embedded) {
            validation::validate_source_path("file", file, &SOURCE_EXTENSIONS)?;
        }
        validation::validate_path("output_path", self.output_path())?;
        validation::validate_formats("formats", &self.output_formats(), &SUPPORTED_FORMATS)?;
        validation::validate_range(
            "threshold",
            self.pareto_threshold(),
            f64::MIN_POSITIVE,
            100.0,
        )?;
        Ok(())
    }
}
