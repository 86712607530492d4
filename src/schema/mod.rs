//! Schema cache: table definitions introspected from the database.

mod introspect;
mod registry;
pub mod types;

pub use introspect::load_tables;
pub use registry::SchemaRegistry;
pub use types::*;
