//! Data-source configuration types.
//!
//! These types are deserialized directly from Figment configuration under
//! `datasources.<name>`:
//!
//! ```yaml
//! datasources:
//!   h2:
//!     jdbc:
//!       url: "sqlite://data/accounts.db"
//!       username: "sa"
//!       password: "${ACCOUNTS_DB_PASSWORD}"
//!       driver: "sqlite"
//!     pool:
//!       max_conns: 5
//!       acquire_timeout: "5s"
//!     params:
//!       journal_mode: "WAL"
//! ```
//!
//! Every `jdbc.*` key is optional at parse time; presence is checked each
//! time a connection is acquired so a broken bundle fails at the call that
//! needs it, not at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Data-source name used when the caller does not pick one.
pub const DEFAULT_DATA_SOURCE: &str = "h2";

/// One named data source.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DataSourceConfig {
    #[serde(default)]
    pub jdbc: JdbcSettings,

    // Connection pool overrides:
    #[serde(default)]
    pub pool: Option<PoolCfg>,

    /// Whitelisted SQLite PRAGMAs; wins over the same keys in the url query.
    #[serde(default)]
    pub params: Option<HashMap<String, String>>,
}

/// The `jdbc.*` property set.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct JdbcSettings {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>, // literal password or ${VAR} for env expansion
    pub driver: Option<String>,
}

impl DataSourceConfig {
    /// Convenience constructor for a fully specified bundle.
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        driver: impl Into<String>,
    ) -> Self {
        Self {
            jdbc: JdbcSettings {
                url: Some(url.into()),
                username: Some(username.into()),
                password: Some(password.into()),
                driver: Some(driver.into()),
            },
            pool: None,
            params: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PoolCfg {
    pub max_conns: Option<u32>,
    pub min_conns: Option<u32>,
    #[serde(with = "humantime_serde", default)]
    pub acquire_timeout: Option<Duration>,
    #[serde(with = "humantime_serde", default)]
    pub idle_timeout: Option<Duration>,
    #[serde(with = "humantime_serde", default)]
    pub max_lifetime: Option<Duration>,
    pub test_before_acquire: Option<bool>,
}

impl PoolCfg {
    /// Apply pool configuration to SQLite pool options.
    pub fn apply_sqlite(
        &self,
        mut opts: sqlx::sqlite::SqlitePoolOptions,
    ) -> sqlx::sqlite::SqlitePoolOptions {
        if let Some(max_conns) = self.max_conns {
            opts = opts.max_connections(max_conns);
        }
        if let Some(min_conns) = self.min_conns {
            opts = opts.min_connections(min_conns);
        }
        if let Some(acquire_timeout) = self.acquire_timeout {
            opts = opts.acquire_timeout(acquire_timeout);
        }
        if let Some(idle_timeout) = self.idle_timeout {
            opts = opts.idle_timeout(Some(idle_timeout));
        }
        if let Some(max_lifetime) = self.max_lifetime {
            opts = opts.max_lifetime(Some(max_lifetime));
        }
        if let Some(test_before_acquire) = self.test_before_acquire {
            opts = opts.test_before_acquire(test_before_acquire);
        }
        opts
    }
}
