//! Transactional connection provider for one data source.

use crate::config::DataSourceConfig;
use crate::options::{redact_credentials_in_dsn, ResolvedSettings};
use crate::{DbError, Result};
use figment::Figment;
use sqlx::{Sqlite, SqlitePool};
use tokio::sync::OnceCell;

/// Transaction handed out by [`ConnectionProvider::acquire`].
///
/// Dropping it without `commit` rolls back and returns the connection to the
/// pool.
pub type DbTransaction = sqlx::Transaction<'static, Sqlite>;

/// Where the provider reads its settings from.
enum SettingsSource {
    /// Re-extracted from `datasources.<name>` on every acquisition.
    Figment(Figment),
    Fixed(DataSourceConfig),
    /// Pool supplied by the caller; no settings involved.
    Injected,
}

/// Supplies transactions for one named data source.
///
/// The pool is built on first use and cached for the lifetime of the
/// provider. Concurrent first callers wait on the same initialization, so
/// the pool is built at most once.
pub struct ConnectionProvider {
    name: String,
    settings: SettingsSource,
    pool: OnceCell<SqlitePool>,
}

impl std::fmt::Debug for ConnectionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionProvider")
            .field("name", &self.name)
            .field("initialized", &self.pool.initialized())
            .finish()
    }
}

impl ConnectionProvider {
    /// Provider whose settings live in a Figment under `datasources.<name>`.
    pub fn from_figment(figment: Figment, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: SettingsSource::Figment(figment),
            pool: OnceCell::new(),
        }
    }

    /// Provider over an already parsed bundle.
    pub fn from_config(name: impl Into<String>, cfg: DataSourceConfig) -> Self {
        Self {
            name: name.into(),
            settings: SettingsSource::Fixed(cfg),
            pool: OnceCell::new(),
        }
    }

    /// Provider over a pool built elsewhere.
    pub fn with_pool(name: impl Into<String>, pool: SqlitePool) -> Self {
        Self {
            name: name.into(),
            settings: SettingsSource::Injected,
            pool: OnceCell::new_with(Some(pool)),
        }
    }

    /// Data-source name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the pool has been built (or injected).
    pub fn is_initialized(&self) -> bool {
        self.pool.initialized()
    }

    /// Read and validate the current settings.
    ///
    /// Returns `None` for a provider built with [`ConnectionProvider::with_pool`].
    pub fn settings(&self) -> Result<Option<ResolvedSettings>> {
        let raw = match &self.settings {
            SettingsSource::Injected => return Ok(None),
            SettingsSource::Fixed(cfg) => cfg.clone(),
            SettingsSource::Figment(figment) => {
                let key = format!("datasources.{}", self.name);
                if !figment.contains(&key) {
                    return Err(DbError::UnknownDataSource(self.name.clone()));
                }
                figment
                    .extract_inner::<DataSourceConfig>(&key)
                    .map_err(|e| DbError::InvalidConfig {
                        data_source: self.name.clone(),
                        message: e.to_string(),
                    })?
            }
        };

        ResolvedSettings::resolve(&self.name, &raw).map(Some)
    }

    /// Begin a transaction on a pooled connection.
    ///
    /// Settings are re-read and validated on every call; the pool is built
    /// from them the first time only.
    pub async fn acquire(&self) -> Result<DbTransaction> {
        let settings = self.settings()?;
        let pool = self.pool_for(settings).await?;
        tracing::debug!(data_source = %self.name, "acquiring connection");
        Ok(pool.begin().await?)
    }

    /// The underlying pool, building it if needed.
    pub async fn pool(&self) -> Result<&SqlitePool> {
        let settings = self.settings()?;
        self.pool_for(settings).await
    }

    /// Close the pool if it was built. Later acquisitions fail.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
            tracing::info!(data_source = %self.name, "connection pool closed");
        }
    }

    async fn pool_for(&self, settings: Option<ResolvedSettings>) -> Result<&SqlitePool> {
        self.pool
            .get_or_try_init(|| async move {
                let settings = settings.ok_or_else(|| DbError::InvalidConfig {
                    data_source: self.name.clone(),
                    message: "no settings to build a pool from".to_string(),
                })?;
                build_pool(&settings).await
            })
            .await
    }
}

async fn build_pool(settings: &ResolvedSettings) -> Result<SqlitePool> {
    let connect_opts = settings.sqlite_connect_options()?;
    let pool_opts = settings.sqlite_pool_options();

    tracing::debug!(
        data_source = %settings.data_source,
        username = %settings.username,
        "credentials are not used by the sqlite engine"
    );

    let pool = pool_opts.connect_with(connect_opts).await?;

    tracing::info!(
        data_source = %settings.data_source,
        engine = ?settings.engine,
        dsn = %redact_credentials_in_dsn(Some(&settings.url)),
        "Built connection pool"
    );

    Ok(pool)
}
