//! Shared application state for all routes.

use crate::schema::SchemaRegistry;
use crate::service::EntityAccessor;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub accessor: EntityAccessor,
}

impl AppState {
    pub fn new(pool: PgPool, registry: SchemaRegistry) -> Self {
        AppState {
            accessor: EntityAccessor::new(pool, registry),
        }
    }

    pub fn pool(&self) -> &PgPool {
        self.accessor.pool()
    }

    pub fn registry(&self) -> &SchemaRegistry {
        self.accessor.registry()
    }
}
