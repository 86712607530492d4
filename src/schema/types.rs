//! Table and column descriptors built from the catalog.

use serde::Serialize;

/// How a column's values are decoded from result rows.
/// `Other` covers everything without a native decoder (numeric, enums, time, arrays, ...); those are read as text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    SmallInt,
    Int,
    BigInt,
    Real,
    Double,
    Bool,
    Text,
    Uuid,
    TimestampTz,
    Timestamp,
    Date,
    Json,
    Other,
}

impl ColumnKind {
    /// Classify by `pg_type.typname`.
    pub fn from_udt_name(udt: &str) -> Self {
        match udt {
            "int2" => ColumnKind::SmallInt,
            "int4" => ColumnKind::Int,
            "int8" => ColumnKind::BigInt,
            "float4" => ColumnKind::Real,
            "float8" => ColumnKind::Double,
            "bool" => ColumnKind::Bool,
            "text" | "varchar" | "bpchar" | "name" => ColumnKind::Text,
            "uuid" => ColumnKind::Uuid,
            "timestamptz" => ColumnKind::TimestampTz,
            "timestamp" => ColumnKind::Timestamp,
            "date" => ColumnKind::Date,
            "json" | "jsonb" => ColumnKind::Json,
            _ => ColumnKind::Other,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub ordinal: i32,
    /// Declared type as rendered by `format_type` (e.g. "character varying(40)").
    pub sql_type: String,
    /// Same type without its modifier (e.g. "character varying"); used for parameter casts.
    /// An explicit cast to a length-limited type truncates silently, so parameters never carry one.
    #[serde(skip)]
    pub cast_type: String,
    pub kind: ColumnKind,
    pub nullable: bool,
    /// Default expression, identity or generated column.
    pub has_default: bool,
    /// 1-based position in the primary key, if part of it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pk_position: Option<i32>,
}

impl ColumnDefinition {
    pub fn is_primary_key(&self) -> bool {
        self.pk_position.is_some()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TableDefinition {
    pub schema: String,
    pub name: String,
    /// Ordered by ordinal position.
    pub columns: Vec<ColumnDefinition>,
    /// Ordered by key position. Empty when the table has no primary key.
    pub primary_key: Vec<String>,
}

impl TableDefinition {
    /// Build from columns in any order; primary key order is derived from `pk_position`.
    pub fn new(schema: impl Into<String>, name: impl Into<String>, mut columns: Vec<ColumnDefinition>) -> Self {
        columns.sort_by_key(|c| c.ordinal);
        let mut pk: Vec<&ColumnDefinition> = columns.iter().filter(|c| c.is_primary_key()).collect();
        pk.sort_by_key(|c| c.pk_position);
        let primary_key = pk.into_iter().map(|c| c.name.clone()).collect();
        TableDefinition {
            schema: schema.into(),
            name: name.into(),
            columns,
            primary_key,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.primary_key.iter().filter_map(|name| self.column(name))
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn classifies_common_types() {
        assert_eq!(ColumnKind::from_udt_name("int4"), ColumnKind::Int);
        assert_eq!(ColumnKind::from_udt_name("varchar"), ColumnKind::Text);
        assert_eq!(ColumnKind::from_udt_name("jsonb"), ColumnKind::Json);
        assert_eq!(ColumnKind::from_udt_name("numeric"), ColumnKind::Other);
        assert_eq!(ColumnKind::from_udt_name("mood"), ColumnKind::Other);
    }

    #[test]
    fn composite_key_follows_key_position_not_ordinal() {
        let mut a = column("a", 1, "int4", "integer");
        let mut b = column("b", 2, "int4", "integer");
        a.pk_position = Some(2);
        b.pk_position = Some(1);
        let t = TableDefinition::new("public", "pairs", vec![b.clone(), a.clone()]);
        assert_eq!(t.primary_key, vec!["b".to_string(), "a".to_string()]);
        assert_eq!(t.columns[0].name, "a");
    }

    #[test]
    fn column_lookup() {
        let t = users();
        assert!(t.has_column("name"));
        assert!(!t.has_column("email"));
        assert_eq!(t.primary_key_columns().map(|c| c.name.as_str()).collect::<Vec<_>>(), vec!["id"]);
        assert!(audit_log().primary_key.is_empty());
    }
}
