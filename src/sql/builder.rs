//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from a cached table definition.
//! Identifiers always come from the catalog; caller-supplied names are resolved against it first.

use crate::error::AccessError;
use crate::record::Record;
use crate::schema::{ColumnDefinition, ColumnKind, TableDefinition};
use serde_json::Value;

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn qualified_table(table: &TableDefinition) -> String {
    format!("{}.{}", quoted(&table.schema), quoted(&table.name))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Push a value and return its placeholder, cast to the column's unmodified type.
    /// Length limits are left to the column itself, which rejects over-long values.
    fn push_param(&mut self, column: &ColumnDefinition, v: Value) -> String {
        self.params.push(v);
        format!("${}::{}", self.params.len(), column.cast_type)
    }
}

fn select_expr(c: &ColumnDefinition) -> String {
    let q = quoted(&c.name);
    if c.kind == ColumnKind::Other {
        format!("{}::text AS {}", q, q)
    } else {
        q
    }
}

/// SELECT list: each column as-is, except types without a native decoder which are read as text.
fn select_column_list<'a>(columns: impl Iterator<Item = &'a ColumnDefinition>) -> String {
    columns.map(select_expr).collect::<Vec<_>>().join(", ")
}

fn resolve_column<'a>(table: &'a TableDefinition, name: &str) -> Result<&'a ColumnDefinition, AccessError> {
    table.column(name).ok_or_else(|| AccessError::UnknownColumn {
        table: table.name.clone(),
        column: name.to_string(),
    })
}

/// Columns of `table` present in `data`, in table order. Fails on the first key that is not a column.
fn data_columns<'a>(table: &'a TableDefinition, data: &Record) -> Result<Vec<&'a ColumnDefinition>, AccessError> {
    for key in data.keys() {
        resolve_column(table, key)?;
    }
    Ok(table.columns.iter().filter(|c| data.contains_key(&c.name)).collect())
}

/// SELECT every column, ordered by primary key when there is one.
pub fn select_all(table: &TableDefinition) -> QueryBuf {
    let mut q = QueryBuf::new();
    let order_clause = if table.primary_key.is_empty() {
        String::new()
    } else {
        let keys: Vec<String> = table.primary_key.iter().map(|k| quoted(k)).collect();
        format!(" ORDER BY {}", keys.join(", "))
    };
    q.sql = format!(
        "SELECT {} FROM {}{}",
        select_column_list(table.columns.iter()),
        qualified_table(table),
        order_clause
    );
    q
}

/// SELECT the first row where `column = value`.
pub fn select_by_column(table: &TableDefinition, column: &str, value: &Value) -> Result<QueryBuf, AccessError> {
    let mut q = QueryBuf::new();
    let col = resolve_column(table, column)?;
    let ph = q.push_param(col, value.clone());
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {} LIMIT 1",
        select_column_list(table.columns.iter()),
        qualified_table(table),
        quoted(&col.name),
        ph
    );
    Ok(q)
}

/// INSERT all pairs of `data`; RETURNING the primary-key columns (nothing when the table has none).
/// Empty `data` inserts DEFAULT VALUES.
pub fn insert(table: &TableDefinition, data: &Record) -> Result<QueryBuf, AccessError> {
    let mut q = QueryBuf::new();
    let columns = data_columns(table, data)?;
    let mut cols = Vec::with_capacity(columns.len());
    let mut placeholders = Vec::with_capacity(columns.len());
    for c in columns {
        let v = data.get(&c.name).cloned().unwrap_or(Value::Null);
        placeholders.push(q.push_param(c, v));
        cols.push(quoted(&c.name));
    }
    let values_clause = if cols.is_empty() {
        "DEFAULT VALUES".to_string()
    } else {
        format!("({}) VALUES ({})", cols.join(", "), placeholders.join(", "))
    };
    let returning = if table.primary_key.is_empty() {
        String::new()
    } else {
        format!(" RETURNING {}", select_column_list(table.primary_key_columns()))
    };
    q.sql = format!("INSERT INTO {} {}{}", qualified_table(table), values_clause, returning);
    Ok(q)
}

/// UPDATE the columns in `data` where `key_column = key_value`.
pub fn update(
    table: &TableDefinition,
    key_column: &str,
    key_value: &Value,
    data: &Record,
) -> Result<QueryBuf, AccessError> {
    let mut q = QueryBuf::new();
    let key = resolve_column(table, key_column)?;
    let columns = data_columns(table, data)?;
    if columns.is_empty() {
        return Err(AccessError::EmptyUpdate(table.name.clone()));
    }
    let mut sets = Vec::with_capacity(columns.len());
    for c in columns {
        let v = data.get(&c.name).cloned().unwrap_or(Value::Null);
        let rhs = q.push_param(c, v);
        sets.push(format!("{} = {}", quoted(&c.name), rhs));
    }
    let key_ph = q.push_param(key, key_value.clone());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        qualified_table(table),
        sets.join(", "),
        quoted(&key.name),
        key_ph
    );
    Ok(q)
}

/// DELETE where `key_column = key_value`.
pub fn delete(table: &TableDefinition, key_column: &str, key_value: &Value) -> Result<QueryBuf, AccessError> {
    let mut q = QueryBuf::new();
    let key = resolve_column(table, key_column)?;
    let ph = q.push_param(key, key_value.clone());
    q.sql = format!("DELETE FROM {} WHERE {} = {}", qualified_table(table), quoted(&key.name), ph);
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::fixtures::{audit_log, column, users};
    use serde_json::json;

    fn record(v: Value) -> Record {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn select_all_orders_by_key_and_reads_numeric_as_text() {
        let q = select_all(&users());
        assert_eq!(
            q.sql,
            r#"SELECT "id", "name", "balance"::text AS "balance" FROM "public"."users" ORDER BY "id""#
        );
        assert!(q.params.is_empty());
        assert_eq!(select_all(&audit_log()).sql, r#"SELECT "message" FROM "public"."audit_log""#);
    }

    #[test]
    fn select_by_column_casts_parameter() {
        let q = select_by_column(&users(), "id", &json!(1)).unwrap();
        assert!(q.sql.ends_with(r#"WHERE "id" = $1::integer LIMIT 1"#), "{}", q.sql);
        assert_eq!(q.params, vec![json!(1)]);
    }

    #[test]
    fn insert_uses_table_order_and_returns_key() {
        let data = record(json!({"balance": "10.50", "name": "Ana"}));
        let q = insert(&users(), &data).unwrap();
        assert_eq!(
            q.sql,
            r#"INSERT INTO "public"."users" ("name", "balance") VALUES ($1::text, $2::numeric) RETURNING "id""#
        );
        assert_eq!(q.params, vec![json!("Ana"), json!("10.50")]);
    }

    #[test]
    fn insert_without_data_or_key() {
        let q = insert(&users(), &Record::new()).unwrap();
        assert_eq!(q.sql, r#"INSERT INTO "public"."users" DEFAULT VALUES RETURNING "id""#);
        let q = insert(&audit_log(), &record(json!({"message": "hi"}))).unwrap();
        assert_eq!(q.sql, r#"INSERT INTO "public"."audit_log" ("message") VALUES ($1::text)"#);
    }

    #[test]
    fn insert_rejects_unknown_column() {
        let err = insert(&users(), &record(json!({"name": "Ana", "email": "a@x"}))).unwrap_err();
        match err {
            AccessError::UnknownColumn { table, column } => {
                assert_eq!(table, "users");
                assert_eq!(column, "email");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn update_binds_key_last() {
        let q = update(&users(), "id", &json!(999), &record(json!({"name": "Bo"}))).unwrap();
        assert_eq!(q.sql, r#"UPDATE "public"."users" SET "name" = $1::text WHERE "id" = $2::integer"#);
        assert_eq!(q.params, vec![json!("Bo"), json!(999)]);
    }

    #[test]
    fn update_requires_columns() {
        assert!(matches!(
            update(&users(), "id", &json!(1), &Record::new()),
            Err(AccessError::EmptyUpdate(_))
        ));
        assert!(matches!(
            update(&users(), "nope", &json!(1), &record(json!({"name": "x"}))),
            Err(AccessError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn delete_by_any_column() {
        let q = delete(&users(), "name", &json!("Ana")).unwrap();
        assert_eq!(q.sql, r#"DELETE FROM "public"."users" WHERE "name" = $1::text"#);
        assert!(delete(&users(), "ghost", &json!(1)).is_err());
    }

    #[test]
    fn casts_drop_length_modifiers() {
        let mut code = column("code", 2, "varchar", "character varying(3)");
        code.pk_position = Some(1);
        let t = TableDefinition::new("public", "people", vec![column("id", 1, "int4", "integer"), code]);
        assert_eq!(t.columns[1].cast_type, "character varying");

        let q = select_by_column(&t, "code", &json!("Barrington")).unwrap();
        assert!(q.sql.ends_with(r#"WHERE "code" = $1::character varying LIMIT 1"#), "{}", q.sql);
        let q = delete(&t, "code", &json!("Barn")).unwrap();
        assert_eq!(q.sql, r#"DELETE FROM "public"."people" WHERE "code" = $1::character varying"#);
        let q = insert(&t, &record(json!({"code": "Bartholomew"}))).unwrap();
        assert!(q.sql.contains("VALUES ($1::character varying)"), "{}", q.sql);
        assert!(!q.sql.contains("(3)"), "{}", q.sql);
    }

    #[test]
    fn identifiers_are_escaped() {
        let t = TableDefinition::new("public", "odd\"name", vec![column("we\"ird", 1, "text", "text")]);
        let q = select_all(&t);
        assert_eq!(q.sql, r#"SELECT "we""ird" FROM "public"."odd""name""#);
    }
}
