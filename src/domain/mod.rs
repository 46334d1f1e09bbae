// Domain layer: records, table schema and ports. No I/O here.

pub mod model;
pub mod ports;
pub mod schema;
