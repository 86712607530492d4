//! Reads table and column metadata from the PostgreSQL system catalogs.

use crate::error::SchemaError;
use crate::schema::types::{ColumnDefinition, ColumnKind, TableDefinition};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;

/// One row per (table, column); tables without columns still produce a row with NULL column fields.
const TABLE_COLUMNS_SQL: &str = r#"
    SELECT
        c.relname AS table_name,
        a.attname AS column_name,
        a.attnum::integer AS ordinal,
        pg_catalog.format_type(a.atttypid, a.atttypmod) AS sql_type,
        pg_catalog.format_type(a.atttypid, -1) AS cast_type,
        t.typname AS udt_name,
        NOT a.attnotnull AS nullable,
        (a.atthasdef OR a.attidentity <> '' OR a.attgenerated <> '') AS has_default,
        array_position(pk.conkey, a.attnum)::integer AS pk_position
    FROM pg_catalog.pg_class c
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    LEFT JOIN pg_catalog.pg_attribute a
        ON a.attrelid = c.oid AND a.attnum > 0 AND NOT a.attisdropped
    LEFT JOIN pg_catalog.pg_type t ON t.oid = a.atttypid
    LEFT JOIN pg_catalog.pg_constraint pk ON pk.conrelid = c.oid AND pk.contype = 'p'
    WHERE n.nspname = $1
      AND c.relkind IN ('r', 'p')
    ORDER BY c.relname, a.attnum
"#;

/// Load every ordinary and partitioned table of `schema`.
pub async fn load_tables(pool: &PgPool, schema: &str) -> Result<Vec<TableDefinition>, SchemaError> {
    let rows = sqlx::query(TABLE_COLUMNS_SQL).bind(schema).fetch_all(pool).await?;

    let mut by_table: BTreeMap<String, Vec<ColumnDefinition>> = BTreeMap::new();
    for row in &rows {
        let table: String = row.try_get("table_name")?;
        let columns = by_table.entry(table).or_default();
        if let Some(col) = column_from_row(row)? {
            columns.push(col);
        }
    }

    Ok(by_table
        .into_iter()
        .map(|(name, columns)| TableDefinition::new(schema, name, columns))
        .collect())
}

fn column_from_row(row: &PgRow) -> Result<Option<ColumnDefinition>, SchemaError> {
    let Some(name) = row.try_get::<Option<String>, _>("column_name")? else {
        return Ok(None);
    };
    let udt: Option<String> = row.try_get("udt_name")?;
    Ok(Some(ColumnDefinition {
        name,
        ordinal: row.try_get::<Option<i32>, _>("ordinal")?.unwrap_or_default(),
        sql_type: row.try_get::<Option<String>, _>("sql_type")?.unwrap_or_else(|| "text".into()),
        cast_type: row.try_get::<Option<String>, _>("cast_type")?.unwrap_or_else(|| "text".into()),
        kind: udt.as_deref().map(ColumnKind::from_udt_name).unwrap_or(ColumnKind::Other),
        nullable: row.try_get::<Option<bool>, _>("nullable")?.unwrap_or(true),
        has_default: row.try_get::<Option<bool>, _>("has_default")?.unwrap_or(false),
        pk_position: row.try_get("pk_position")?,
    }))
}
