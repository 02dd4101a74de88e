//! Registry of connection providers keyed by data-source name.
//!
//! The registry is responsible for:
//! - Holding the Figment the data-source bundles are read from
//! - Handing out one shared [`ConnectionProvider`] per name

use crate::config::{DataSourceConfig, DEFAULT_DATA_SOURCE};
use crate::provider::ConnectionProvider;
use crate::{DbError, Result};
use dashmap::DashMap;
use figment::{providers::Serialized, Figment};
use std::collections::HashMap;
use std::sync::Arc;

pub struct DataSources {
    /// Figment the `datasources.*` section is read from
    figment: Figment,
    /// One provider per data-source name
    cache: DashMap<String, Arc<ConnectionProvider>>,
}

impl DataSources {
    /// Create a registry over a Figment configuration.
    pub fn from_figment(figment: Figment) -> Self {
        Self {
            figment,
            cache: DashMap::new(),
        }
    }

    /// Create a registry over already parsed bundles.
    pub fn from_configs(configs: HashMap<String, DataSourceConfig>) -> Self {
        let figment = Figment::new().merge(Serialized::defaults(serde_json::json!({
            "datasources": configs,
        })));
        Self::from_figment(figment)
    }

    /// Names of every configured data source, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .figment
            .extract_inner::<HashMap<String, serde_json::Value>>("datasources")
            .map(|m| m.into_keys().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Provider for `name`.
    ///
    /// Every call for the same name returns the same provider and therefore
    /// the same pool.
    pub fn get(&self, name: &str) -> Result<Arc<ConnectionProvider>> {
        if let Some(provider) = self.cache.get(name) {
            return Ok(provider.clone());
        }

        if !self.figment.contains(&format!("datasources.{name}")) {
            return Err(DbError::UnknownDataSource(name.to_string()));
        }

        let provider = self
            .cache
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!(data_source = %name, "registering connection provider");
                Arc::new(ConnectionProvider::from_figment(self.figment.clone(), name))
            })
            .clone();

        Ok(provider)
    }

    /// Provider for [`DEFAULT_DATA_SOURCE`].
    pub fn default_provider(&self) -> Result<Arc<ConnectionProvider>> {
        self.get(DEFAULT_DATA_SOURCE)
    }

    /// Close every pool built so far.
    pub async fn close_all(&self) {
        let providers: Vec<_> = self.cache.iter().map(|e| e.value().clone()).collect();
        for provider in providers {
            provider.close().await;
        }
    }
}
