//! In-memory schema registry. Loaded explicitly, refreshed explicitly, shared by clone.

use crate::error::SchemaError;
use crate::schema::introspect::load_tables;
use crate::schema::types::TableDefinition;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type TableMap = HashMap<String, Arc<TableDefinition>>;

/// Table definitions keyed by table name. Clones share the same snapshot slot,
/// so a `refresh` is seen by every holder.
#[derive(Clone, Debug)]
pub struct SchemaRegistry {
    schema: Arc<str>,
    tables: Arc<RwLock<Arc<TableMap>>>,
}

impl SchemaRegistry {
    /// Introspect `schema` and build a registry. Any failure is fatal to the caller.
    pub async fn load(pool: &PgPool, schema: &str) -> Result<Self, SchemaError> {
        let tables = load_tables(pool, schema).await?;
        tracing::info!(schema = %schema, tables = tables.len(), "schema loaded");
        Ok(Self::from_tables(schema, tables))
    }

    /// Registry over already built definitions; no database involved.
    pub fn from_tables(schema: &str, tables: impl IntoIterator<Item = TableDefinition>) -> Self {
        SchemaRegistry {
            schema: Arc::from(schema),
            tables: Arc::new(RwLock::new(Arc::new(index(tables)))),
        }
    }

    /// Re-introspect and swap the whole snapshot. On error the previous snapshot stays in place.
    pub async fn refresh(&self, pool: &PgPool) -> Result<usize, SchemaError> {
        let tables = load_tables(pool, &self.schema).await?;
        let count = tables.len();
        self.replace(tables);
        tracing::info!(schema = %self.schema, tables = count, "schema refreshed");
        Ok(count)
    }

    /// Swap in a new set of definitions.
    pub fn replace(&self, tables: impl IntoIterator<Item = TableDefinition>) {
        let next = Arc::new(index(tables));
        let mut guard = self.tables.write().unwrap_or_else(|e| e.into_inner());
        *guard = next;
    }

    pub fn lookup(&self, table_name: &str) -> Option<Arc<TableDefinition>> {
        self.snapshot().get(table_name).cloned()
    }

    /// Sorted table names.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.snapshot().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    fn snapshot(&self) -> Arc<TableMap> {
        self.tables.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

fn index(tables: impl IntoIterator<Item = TableDefinition>) -> TableMap {
    tables
        .into_iter()
        .map(|t| (t.name.clone(), Arc::new(t)))
        .collect()
}
