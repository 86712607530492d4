//! dynatable: runtime-reflected generic CRUD over PostgreSQL tables.
//!
//! Tables are introspected once into a [`SchemaRegistry`]; an [`EntityAccessor`]
//! answers list/insert/find/update/delete calls by table and column name against it.

pub mod error;
pub mod handlers;
pub mod outcome;
pub mod record;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;

pub use error::{AccessError, AppError, SchemaError};
pub use outcome::Outcome;
pub use record::Record;
pub use routes::{api_routes, common_routes_with_ready, schema_routes, table_routes};
pub use schema::{ColumnDefinition, ColumnKind, SchemaRegistry, TableDefinition};
pub use service::EntityAccessor;
pub use settings::Settings;
pub use state::AppState;
