//! Generic row representation and decoding of PostgreSQL rows into it.

use crate::schema::{ColumnKind, TableDefinition};
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{Column, Row};

/// One row: column name to value.
pub type Record = Map<String, Value>;

/// Decode every column of `row`, using the table definition to pick the decoder.
pub fn row_to_record(row: &PgRow, table: &TableDefinition) -> Record {
    let mut map = Record::new();
    for col in row.columns() {
        let name = col.name();
        let kind = table.column(name).map(|c| c.kind).unwrap_or(ColumnKind::Other);
        map.insert(name.to_string(), cell_to_value(row, name, kind));
    }
    map
}

/// Widen through the shortest decimal form, so `1.1f32` reads back as 1.1 and not 1.100000023841858.
/// NaN and infinities become null.
fn f32_to_value(n: f32) -> Value {
    n.to_string()
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn cell_to_value(row: &PgRow, name: &str, kind: ColumnKind) -> Value {
    let decoded = match kind {
        ColumnKind::SmallInt => row.try_get::<Option<i16>, _>(name).map(|v| v.map(Value::from)),
        ColumnKind::Int => row.try_get::<Option<i32>, _>(name).map(|v| v.map(Value::from)),
        ColumnKind::BigInt => row.try_get::<Option<i64>, _>(name).map(|v| v.map(Value::from)),
        ColumnKind::Real => row.try_get::<Option<f32>, _>(name).map(|v| v.map(f32_to_value)),
        ColumnKind::Double => row
            .try_get::<Option<f64>, _>(name)
            .map(|v| v.and_then(serde_json::Number::from_f64).map(Value::Number)),
        ColumnKind::Bool => row.try_get::<Option<bool>, _>(name).map(|v| v.map(Value::Bool)),
        ColumnKind::Uuid => row
            .try_get::<Option<uuid::Uuid>, _>(name)
            .map(|v| v.map(|u| Value::String(u.to_string()))),
        ColumnKind::TimestampTz => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name)
            .map(|v| v.map(|d| Value::String(d.to_rfc3339()))),
        ColumnKind::Timestamp => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(name)
            .map(|v| v.map(|d| Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))),
        ColumnKind::Date => row
            .try_get::<Option<chrono::NaiveDate>, _>(name)
            .map(|v| v.map(|d| Value::String(d.format("%Y-%m-%d").to_string()))),
        ColumnKind::Json => row.try_get::<Option<Value>, _>(name),
        ColumnKind::Text | ColumnKind::Other => row.try_get::<Option<String>, _>(name).map(|v| v.map(Value::String)),
    };
    match decoded {
        Ok(v) => v.unwrap_or(Value::Null),
        Err(e) => {
            tracing::warn!(column = %name, kind = ?kind, error = %e, "column could not be decoded");
            Value::Null
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn real_values_keep_decimal_form() {
        assert_eq!(f32_to_value(1.1), json!(1.1));
        assert_eq!(f32_to_value(0.3), json!(0.3));
        assert_eq!(f32_to_value(-2.5), json!(-2.5));
        assert_eq!(f32_to_value(16777216.0), json!(16777216.0));
        assert_ne!(json!(1.1f32 as f64), json!(1.1));
    }

    #[test]
    fn non_finite_reals_are_null() {
        assert_eq!(f32_to_value(f32::NAN), Value::Null);
        assert_eq!(f32_to_value(f32::INFINITY), Value::Null);
    }
}
