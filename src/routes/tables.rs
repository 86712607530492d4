//! Table CRUD and schema routes. Handlers resolve the table from the path segment at request time.

use crate::handlers::schema::{describe_table, list_tables, refresh};
use crate::handlers::tables::{delete as delete_handler, find, insert, list, update};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

pub fn table_routes(state: AppState) -> Router {
    Router::new()
        .route("/tables/:table", get(list).post(insert))
        .route(
            "/tables/:table/:column/:value",
            get(find).patch(update).delete(delete_handler),
        )
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES)))
        .with_state(state)
}

pub fn schema_routes(state: AppState) -> Router {
    Router::new()
        .route("/schema", get(list_tables))
        .route("/schema/refresh", post(refresh))
        .route("/schema/:table", get(describe_table))
        .with_state(state)
}

/// Common, schema and table routes merged into one router.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .merge(super::common_routes_with_ready(state.clone()))
        .merge(schema_routes(state.clone()))
        .merge(table_routes(state))
}
