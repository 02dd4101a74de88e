//! Settings resolution and typed SQLite connection options.

use crate::config::{DataSourceConfig, PoolCfg};
use crate::sqlite::{extract_sqlite_pragmas, is_memory_dsn};
use crate::{strip_jdbc_prefix, DbEngine, DbError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::collections::HashMap;
use std::str::FromStr;

/// A data-source bundle after presence checks and `${VAR}` expansion.
#[derive(Clone)]
pub struct ResolvedSettings {
    pub data_source: String,
    pub url: String,
    pub username: String,
    pub password: String,
    pub driver: String,
    pub engine: DbEngine,
    pub pool: PoolCfg,
    pub params: HashMap<String, String>,
}

impl std::fmt::Debug for ResolvedSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSettings")
            .field("data_source", &self.data_source)
            .field("url", &redact_credentials_in_dsn(Some(&self.url)))
            .field("username", &self.username)
            .field("password", &"***")
            .field("driver", &self.driver)
            .field("engine", &self.engine)
            .field("pool", &self.pool)
            .field("params", &self.params)
            .finish()
    }
}

impl ResolvedSettings {
    /// Check a raw bundle and expand environment references.
    ///
    /// Fails when a `jdbc.*` key is missing, the url names no known engine,
    /// the driver disagrees with the url, or the engine is not SQLite.
    pub fn resolve(data_source: &str, cfg: &DataSourceConfig) -> Result<Self> {
        let missing = |key: &'static str| DbError::MissingSetting {
            data_source: data_source.to_string(),
            key,
        };

        let url = cfg
            .jdbc
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| missing("jdbc.url"))?;
        let username = cfg.jdbc.username.clone().ok_or_else(|| missing("jdbc.username"))?;
        let password = cfg.jdbc.password.as_deref().ok_or_else(|| missing("jdbc.password"))?;
        let driver = cfg.jdbc.driver.clone().ok_or_else(|| missing("jdbc.driver"))?;

        let url = strip_jdbc_prefix(expand_env_vars(url)?.trim()).to_string();
        let password = resolve_password(password)?;

        let engine = DbEngine::detect(&url)?;
        let driver_engine = DbEngine::from_driver(&driver)?;
        if driver_engine != engine {
            return Err(DbError::DriverMismatch { driver, engine });
        }
        if engine != DbEngine::Sqlite {
            return Err(DbError::UnsupportedDriver(driver));
        }

        let mut params = HashMap::new();
        if let Some(configured) = &cfg.params {
            for (key, value) in configured {
                let value = if value.contains("${") {
                    expand_env_vars(value)?
                } else {
                    value.clone()
                };
                params.insert(key.to_lowercase(), value);
            }
        }

        Ok(Self {
            data_source: data_source.to_string(),
            url,
            username,
            password,
            driver,
            engine,
            pool: cfg.pool.clone().unwrap_or_default(),
            params,
        })
    }

    /// True when the url points at an in-memory database.
    pub fn is_memory(&self) -> bool {
        is_memory_dsn(&self.url)
    }

    /// Build typed connect options.
    ///
    /// PRAGMAs from the url query are applied first and `params` override
    /// them. File databases are created on first connect along with their
    /// parent directory.
    pub fn sqlite_connect_options(&self) -> Result<SqliteConnectOptions> {
        let (clean_url, mut pragmas) = extract_sqlite_pragmas(&self.url);
        pragmas.extend(self.params.clone());

        let mut opts = SqliteConnectOptions::from_str(&clean_url)
            .map_err(|e| DbError::InvalidParameter(e.to_string()))?
            .create_if_missing(true);

        if !self.is_memory() {
            if let Some(parent) = opts.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        opts = sqlite_pragma::apply_pragmas(opts, &pragmas)?;
        Ok(opts)
    }

    /// Build pool options.
    ///
    /// An in-memory database lives only as long as its connection, so the
    /// pool is pinned to a single connection that never idles out.
    pub fn sqlite_pool_options(&self) -> SqlitePoolOptions {
        let opts = self.pool.apply_sqlite(SqlitePoolOptions::new());
        if self.is_memory() {
            opts.max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            opts
        }
    }
}

/// SQLite PRAGMA whitelist and validation.
pub mod sqlite_pragma {
    use crate::DbError;
    use std::collections::HashMap;

    /// Whitelisted SQLite PRAGMA parameters.
    const ALLOWED_PRAGMAS: &[&str] = &["wal", "synchronous", "busy_timeout", "journal_mode"];

    /// Validate and apply SQLite PRAGMA parameters to connection options.
    pub fn apply_pragmas(
        mut opts: sqlx::sqlite::SqliteConnectOptions,
        params: &HashMap<String, String>,
    ) -> crate::Result<sqlx::sqlite::SqliteConnectOptions> {
        for (key, value) in params {
            let key_lower = key.to_lowercase();

            if !ALLOWED_PRAGMAS.contains(&key_lower.as_str()) {
                return Err(DbError::UnknownSqlitePragma(key.clone()));
            }

            opts = match key_lower.as_str() {
                "wal" => opts.pragma("journal_mode", validate_wal_pragma(value)?),
                "journal_mode" => opts.pragma("journal_mode", validate_journal_mode_pragma(value)?),
                "synchronous" => opts.pragma("synchronous", validate_synchronous_pragma(value)?),
                _ => opts.pragma(
                    "busy_timeout",
                    validate_busy_timeout_pragma(value)?.to_string(),
                ),
            };
        }

        Ok(opts)
    }

    fn validate_wal_pragma(value: &str) -> crate::Result<&'static str> {
        match value.to_lowercase().as_str() {
            "true" | "1" => Ok("WAL"),
            "false" | "0" => Ok("DELETE"),
            _ => Err(DbError::InvalidSqlitePragma {
                key: "wal".to_string(),
                message: format!("must be true/false/1/0, got '{value}'"),
            }),
        }
    }

    fn validate_synchronous_pragma(value: &str) -> crate::Result<String> {
        match value.to_uppercase().as_str() {
            "OFF" | "NORMAL" | "FULL" | "EXTRA" => Ok(value.to_uppercase()),
            _ => Err(DbError::InvalidSqlitePragma {
                key: "synchronous".to_string(),
                message: format!("must be OFF/NORMAL/FULL/EXTRA, got '{value}'"),
            }),
        }
    }

    fn validate_busy_timeout_pragma(value: &str) -> crate::Result<u64> {
        value.parse::<u64>().map_err(|_| DbError::InvalidSqlitePragma {
            key: "busy_timeout".to_string(),
            message: format!("must be a non-negative integer, got '{value}'"),
        })
    }

    fn validate_journal_mode_pragma(value: &str) -> crate::Result<String> {
        match value.to_uppercase().as_str() {
            "DELETE" | "WAL" | "MEMORY" | "TRUNCATE" | "PERSIST" | "OFF" => {
                Ok(value.to_uppercase())
            }
            _ => Err(DbError::InvalidSqlitePragma {
                key: "journal_mode".to_string(),
                message: format!("must be DELETE/WAL/MEMORY/TRUNCATE/PERSIST/OFF, got '{value}'"),
            }),
        }
    }
}

/// Expand `${VAR}` references from the process environment.
fn expand_env_vars(input: &str) -> Result<String> {
    if !input.contains("${") {
        return Ok(input.to_string());
    }

    let re = regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| DbError::InvalidParameter(e.to_string()))?;
    let mut result = input.to_string();

    for caps in re.captures_iter(input) {
        let value = std::env::var(&caps[1])?;
        result = result.replace(&caps[0], &value);
    }

    Ok(result)
}

/// Resolve password from environment variable if it is exactly `${VAR}`.
fn resolve_password(password: &str) -> Result<String> {
    match password
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
    {
        Some(var_name) => Ok(std::env::var(var_name)?),
        None => Ok(password.to_string()),
    }
}

/// Redact credentials from a url for logging.
pub fn redact_credentials_in_dsn(dsn: Option<&str>) -> String {
    match dsn {
        Some(dsn) if dsn.contains('@') => {
            if let Ok(mut parsed) = url::Url::parse(dsn) {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("***"));
                }
                parsed.to_string()
            } else {
                "***".to_string()
            }
        }
        Some(dsn) => dsn.to_string(),
        None => "none".to_string(),
    }
}
