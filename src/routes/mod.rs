//! Router builders.

mod common;
mod tables;
pub use common::common_routes_with_ready;
pub use tables::{api_routes, schema_routes, table_routes};
