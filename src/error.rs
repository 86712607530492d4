//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Startup failures: configuration and schema introspection. Fatal for the server.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database connection: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("schema introspection: {0}")]
    Introspection(#[from] sqlx::Error),
}

/// Why a single accessor operation could not complete.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("unknown column '{column}' on table '{table}'")]
    UnknownColumn { table: String, column: String },
    #[error("no columns to update on table '{0}'")]
    EmptyUpdate(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Schema(_) => (StatusCode::INTERNAL_SERVER_ERROR, "schema_error"),
            AppError::Access(AccessError::UnknownColumn { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unknown_column")
            }
            AppError::Access(AccessError::EmptyUpdate(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "empty_update")
            }
            AppError::Access(AccessError::Db(_)) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        }
    }

    /// Structured context for the client, when the error names something in the schema.
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Access(AccessError::UnknownColumn { table, column }) => {
                Some(json!({ "table": table, "column": column }))
            }
            AppError::Access(AccessError::EmptyUpdate(table)) => Some(json!({ "table": table })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        (status, Json(body)).into_response()
    }
}
