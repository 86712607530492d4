//! HTTP handlers for table CRUD and the schema cache.

pub mod schema;
pub mod tables;
