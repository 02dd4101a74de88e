//! Tests for provider caching in the data-source registry.

use dao_db::{DataSourceConfig, DataSources, DbError, DEFAULT_DATA_SOURCE};
use figment::{
    providers::{Env, Serialized},
    Figment,
};
use std::collections::HashMap;
use std::sync::Arc;

fn registry() -> DataSources {
    DataSources::from_configs(HashMap::from([
        (
            "h2".to_string(),
            DataSourceConfig::new("sqlite::memory:", "sa", "", "sqlite"),
        ),
        (
            "test".to_string(),
            DataSourceConfig::new("sqlite::memory:", "sa", "", "sqlite"),
        ),
    ]))
}

#[test]
fn test_same_name_returns_same_provider() {
    let sources = registry();
    let a = sources.get("h2").unwrap();
    let b = sources.get("h2").unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    let other = sources.get("test").unwrap();
    assert!(!Arc::ptr_eq(&a, &other));
}

#[test]
fn test_default_provider_is_h2() {
    let sources = registry();
    let provider = sources.default_provider().unwrap();
    assert_eq!(provider.name(), DEFAULT_DATA_SOURCE);
    assert_eq!(DEFAULT_DATA_SOURCE, "h2");
}

#[test]
fn test_unknown_name_is_rejected() {
    let sources = registry();
    assert!(matches!(
        sources.get("prod"),
        Err(DbError::UnknownDataSource(name)) if name == "prod"
    ));
}

#[test]
fn test_names_are_sorted() {
    assert_eq!(registry().names(), vec!["h2".to_string(), "test".to_string()]);
    assert!(DataSources::from_figment(Figment::new()).names().is_empty());
}

#[tokio::test]
async fn test_concurrent_get_shares_pool() -> anyhow::Result<()> {
    let sources = Arc::new(registry());

    let (a, b) = tokio::join!(
        {
            let s = sources.clone();
            async move { s.get("test") }
        },
        {
            let s = sources.clone();
            async move { s.get("test") }
        }
    );
    let (a, b) = (a?, b?);
    assert!(Arc::ptr_eq(&a, &b));

    let mut tx = a.acquire().await?;
    sqlx::query("CREATE TABLE shared (id INTEGER)")
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    // Same provider, same in-memory database.
    let mut tx = b.acquire().await?;
    sqlx::query("INSERT INTO shared (id) VALUES (1)")
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    sources.close_all().await;
    Ok(())
}

#[test]
fn test_env_overrides_yaml_layer() {
    std::env::set_var("DAO_REG_TEST__DATASOURCES__H2__JDBC__DRIVER", "postgres");

    let figment = Figment::new()
        .merge(Serialized::defaults(serde_json::json!({
            "datasources": {
                "h2": {
                    "jdbc": {
                        "url": "sqlite::memory:",
                        "username": "sa",
                        "password": "",
                        "driver": "sqlite"
                    }
                }
            }
        })))
        .merge(Env::prefixed("DAO_REG_TEST__").split("__"));
    let sources = DataSources::from_figment(figment);

    let provider = sources.get("h2").unwrap();
    assert!(matches!(
        provider.settings(),
        Err(DbError::DriverMismatch { .. })
    ));

    std::env::remove_var("DAO_REG_TEST__DATASOURCES__H2__JDBC__DRIVER");
}
