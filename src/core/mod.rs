pub mod cache;
pub mod engine;
pub mod export;
pub mod pareto;
pub mod pipeline;
pub mod provider;
pub mod regression;
pub mod report;
pub mod shares;
pub mod summary;

pub use crate::domain::model::DataTables;
pub use crate::domain::ports::{ConfigProvider, DataSource, Pipeline, Storage};
pub use crate::utils::error::Result;
