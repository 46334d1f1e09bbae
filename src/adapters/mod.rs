// Adapters layer: concrete sources and sinks behind the domain ports.

pub mod csv_bundle;
pub mod embedded;
pub mod storage;
pub mod workbook;

pub use storage::LocalStorage;
