//! Connection provider for the accounts data-access layer.
//!
//! A data source is a named bundle of `jdbc.*` settings (url, username,
//! password, driver) plus optional pool knobs and SQLite PRAGMA params.
//! [`ConnectionProvider`] turns one such bundle into a lazily built
//! `sqlx` pool and hands out transactions from it; [`DataSources`] keeps
//! one provider per name so every repository bound to the same data source
//! shares a pool.
//!
//! # Example
//! ```rust,no_run
//! use dao_db::DataSources;
//! use figment::{providers::Serialized, Figment};
//!
//! # async fn demo() -> dao_db::Result<()> {
//! let figment = Figment::new().merge(Serialized::defaults(serde_json::json!({
//!     "datasources": {
//!         "h2": {
//!             "jdbc": {
//!                 "url": "sqlite://data/accounts.db",
//!                 "username": "sa",
//!                 "password": "${ACCOUNTS_DB_PASSWORD}",
//!                 "driver": "sqlite"
//!             }
//!         }
//!     }
//! })));
//!
//! let sources = DataSources::from_figment(figment);
//! let provider = sources.default_provider()?;
//! let tx = provider.acquire().await?;
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod options;
pub mod provider;
pub mod registry;
mod sqlite;

pub use config::{DataSourceConfig, JdbcSettings, PoolCfg, DEFAULT_DATA_SOURCE};
pub use options::{redact_credentials_in_dsn, ResolvedSettings};
pub use provider::{ConnectionProvider, DbTransaction};
pub use registry::DataSources;

use thiserror::Error;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Typed error for configuration and connection failures.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("data source '{0}' is not configured")]
    UnknownDataSource(String),

    #[error("data source '{data_source}' is missing required setting '{key}'")]
    MissingSetting {
        data_source: String,
        key: &'static str,
    },

    #[error("invalid configuration for data source '{data_source}': {message}")]
    InvalidConfig {
        data_source: String,
        message: String,
    },

    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),

    #[error("driver '{driver}' does not match the {engine:?} url")]
    DriverMismatch { driver: String, engine: DbEngine },

    #[error("Invalid connection parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown SQLite PRAGMA parameter: {0}")]
    UnknownSqlitePragma(String),

    #[error("Invalid SQLite PRAGMA parameter '{key}': {message}")]
    InvalidSqlitePragma { key: String, message: String },

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Engines a data-source url or driver name can refer to.
///
/// Only [`DbEngine::Sqlite`] can be connected; the others are recognised so
/// that a misconfigured bundle fails with a precise error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    MySql,
    Sqlite,
}

impl DbEngine {
    /// Detect engine by url scheme.
    ///
    /// A leading `jdbc:` is tolerated so urls carried over from JDBC property
    /// files still resolve.
    pub fn detect(url: &str) -> Result<DbEngine> {
        let s = strip_jdbc_prefix(url.trim_start());

        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("mysql://") || s.starts_with("mariadb://") {
            Ok(DbEngine::MySql)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(url.to_string()))
        }
    }

    /// Map a configured driver identifier to an engine (case-insensitive).
    pub fn from_driver(driver: &str) -> Result<DbEngine> {
        match driver.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" | "org.sqlite.jdbc" => Ok(DbEngine::Sqlite),
            "postgres" | "postgresql" | "org.postgresql.driver" => Ok(DbEngine::Postgres),
            "mysql" | "mariadb" | "com.mysql.cj.jdbc.driver" => Ok(DbEngine::MySql),
            _ => Err(DbError::UnsupportedDriver(driver.to_string())),
        }
    }
}

pub(crate) fn strip_jdbc_prefix(url: &str) -> &str {
    url.strip_prefix("jdbc:").unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_detection() {
        assert_eq!(DbEngine::detect("sqlite://test.db").unwrap(), DbEngine::Sqlite);
        assert_eq!(DbEngine::detect("sqlite::memory:").unwrap(), DbEngine::Sqlite);
        assert_eq!(
            DbEngine::detect("postgres://localhost/test").unwrap(),
            DbEngine::Postgres
        );
        assert_eq!(
            DbEngine::detect("mysql://localhost/test").unwrap(),
            DbEngine::MySql
        );
        assert!(DbEngine::detect("unknown://test").is_err());
    }

    #[test]
    fn test_jdbc_prefix_tolerated() {
        assert_eq!(
            DbEngine::detect("jdbc:sqlite:accounts.db").unwrap(),
            DbEngine::Sqlite
        );
        assert!(matches!(
            DbEngine::detect("jdbc:h2:mem:test"),
            Err(DbError::UnknownDsn(_))
        ));
    }

    #[test]
    fn test_driver_names() {
        assert_eq!(DbEngine::from_driver("sqlite").unwrap(), DbEngine::Sqlite);
        assert_eq!(DbEngine::from_driver(" SQLite ").unwrap(), DbEngine::Sqlite);
        assert_eq!(
            DbEngine::from_driver("org.postgresql.Driver").unwrap(),
            DbEngine::Postgres
        );
        assert!(matches!(
            DbEngine::from_driver("org.h2.Driver"),
            Err(DbError::UnsupportedDriver(d)) if d == "org.h2.Driver"
        ));
    }
}
