//! Table CRUD handlers: list, insert, find, update, delete by table and key column.

use crate::error::AppError;
use crate::outcome::Outcome;
use crate::record::Record;
use crate::response::{success_affected, success_many, success_one, success_one_ok};
use crate::schema::{ColumnKind, SchemaRegistry};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

fn body_to_record(value: Value) -> Result<Record, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Typed JSON value for a key taken from the URL path.
/// Columns without a matching JSON shape are sent as text and cast by the database.
fn path_value_for_column(registry: &SchemaRegistry, table: &str, column: &str, raw: &str) -> Result<Value, AppError> {
    let kind = registry
        .lookup(table)
        .and_then(|t| t.column(column).map(|c| c.kind))
        .unwrap_or(ColumnKind::Text);
    Ok(match kind {
        ColumnKind::SmallInt | ColumnKind::Int | ColumnKind::BigInt => {
            let n: i64 = raw
                .parse()
                .map_err(|_| AppError::BadRequest(format!("invalid integer for {}: {}", column, raw)))?;
            Value::Number(n.into())
        }
        ColumnKind::Uuid => {
            let u = uuid::Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("invalid uuid".into()))?;
            Value::String(u.to_string())
        }
        ColumnKind::Bool if raw.eq_ignore_ascii_case("true") => Value::Bool(true),
        ColumnKind::Bool if raw.eq_ignore_ascii_case("false") => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    })
}

fn found<T>(outcome: Outcome<T>, what: impl FnOnce() -> String) -> Result<T, AppError> {
    match outcome {
        Outcome::Found(v) => Ok(v),
        Outcome::NotFound => Err(AppError::NotFound(what())),
        Outcome::Failed(e) => Err(e.into()),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let rows = found(state.accessor.list_all(&table).await, || table.clone())?;
    Ok(success_many(rows))
}

pub async fn insert(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let data = body_to_record(body)?;
    let key = found(state.accessor.insert(&table, &data).await, || table.clone())?;
    Ok(success_one(key))
}

pub async fn find(
    State(state): State<AppState>,
    Path((table, column, raw)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let key = path_value_for_column(state.registry(), &table, &column, &raw)?;
    let row = found(state.accessor.find_by_key(&table, &column, &key).await, || {
        format!("{} where {} = {}", table, column, raw)
    })?;
    Ok(success_one_ok(row))
}

pub async fn update(
    State(state): State<AppState>,
    Path((table, column, raw)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let key = path_value_for_column(state.registry(), &table, &column, &raw)?;
    let data = body_to_record(body)?;
    let n = found(state.accessor.update(&table, &column, &key, &data).await, || table.clone())?;
    Ok(success_affected(n))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((table, column, raw)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let key = path_value_for_column(state.registry(), &table, &column, &raw)?;
    let n = found(state.accessor.delete(&table, &column, &key).await, || table.clone())?;
    Ok(success_affected(n))
}
