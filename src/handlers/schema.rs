//! Schema cache handlers: list tables, describe one, refresh from the database.

use crate::error::AppError;
use crate::response::{success_many, success_one_ok};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

pub async fn list_tables(State(state): State<AppState>) -> impl IntoResponse {
    success_many(state.registry().table_names())
}

pub async fn describe_table(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let def = state.registry().lookup(&table).ok_or(AppError::NotFound(table))?;
    Ok(success_one_ok(def.as_ref().clone()))
}

pub async fn refresh(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let count = state.registry().refresh(state.pool()).await?;
    Ok(success_one_ok(serde_json::json!({ "tables": count })))
}
