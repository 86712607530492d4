//! Process settings read from the environment (optionally from a `.env` file).

use crate::error::SchemaError;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    /// Schema whose tables are introspected. Must be a plain PostgreSQL identifier.
    pub schema: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub bind_addr: SocketAddr,
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, SchemaError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SchemaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(SchemaError::MissingConfig("DATABASE_URL"))?;

        let schema = get("DATABASE_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.into());
        if !is_plain_identifier(&schema) {
            return Err(SchemaError::InvalidConfig(format!(
                "DATABASE_SCHEMA '{}' is not a valid identifier",
                schema
            )));
        }

        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| SchemaError::InvalidConfig(format!("DATABASE_MAX_CONNECTIONS: {}", v)))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let acquire_timeout_secs = match get("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .map_err(|_| SchemaError::InvalidConfig(format!("DATABASE_ACQUIRE_TIMEOUT_SECS: {}", v)))?,
            None => DEFAULT_ACQUIRE_TIMEOUT_SECS,
        };

        let bind = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|e| SchemaError::InvalidConfig(format!("BIND_ADDR '{}': {}", bind, e)))?;

        Ok(Settings {
            database_url,
            schema,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            bind_addr,
        })
    }

    /// Pool options sized and timed from these settings.
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
    }

    /// Open the pool and establish the first connection. A failure here is fatal.
    pub async fn connect(&self) -> Result<PgPool, SchemaError> {
        self.pool_options()
            .connect(&self.database_url)
            .await
            .map_err(SchemaError::Connect)
    }
}

static PLAIN_IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]{0,62}$").unwrap());

fn is_plain_identifier(s: &str) -> bool {
    PLAIN_IDENTIFIER.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply_when_only_url_is_set() {
        let s = Settings::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/app")])).unwrap();
        assert_eq!(s.database_url, "postgres://localhost/app");
        assert_eq!(s.schema, "public");
        assert_eq!(s.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(s.acquire_timeout, Duration::from_secs(30));
        assert_eq!(s.bind_addr.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn missing_url_is_fatal() {
        let err = Settings::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, SchemaError::MissingConfig("DATABASE_URL")));
        let err = Settings::from_lookup(lookup(&[("DATABASE_URL", "   ")])).unwrap_err();
        assert!(matches!(err, SchemaError::MissingConfig(_)));
    }

    #[test]
    fn rejects_schema_that_is_not_an_identifier() {
        let err = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/app"),
            ("DATABASE_SCHEMA", "public; drop table x"),
        ]))
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidConfig(_)));
    }

    #[test]
    fn plain_identifiers() {
        for ok in ["public", "_staging", "tenant_42", "app$data", "a".repeat(63).as_str()] {
            assert!(is_plain_identifier(ok), "{}", ok);
        }
        for bad in ["", "9lives", "back office", "Public\"", "a.b", "a".repeat(64).as_str()] {
            assert!(!is_plain_identifier(bad), "{}", bad);
        }
    }

    #[test]
    fn parses_overrides() {
        let s = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/app"),
            ("DATABASE_SCHEMA", "backoffice"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("DATABASE_ACQUIRE_TIMEOUT_SECS", "3"),
            ("BIND_ADDR", "0.0.0.0:8080"),
        ]))
        .unwrap();
        assert_eq!(s.schema, "backoffice");
        assert_eq!(s.max_connections, 12);
        assert_eq!(s.acquire_timeout, Duration::from_secs(3));
        assert_eq!(s.bind_addr.port(), 8080);
    }

    #[test]
    fn zero_connections_is_invalid() {
        let err = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/app"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidConfig(_)));
    }
}
