pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::LocalStorage;
pub use core::{
    engine::DashboardEngine, pipeline::DashboardPipeline, provider::TabularDataProvider,
    report::DashboardReport,
};
pub use domain::ports::DataSource;
pub use utils::error::{DashboardError, Result};
