use dao_db::ConnectionProvider;

/// DDL for the `role` and `user` tables. Idempotent.
pub const SCHEMA_SQL: &str = include_str!("../../../data/sql/schema.sql");

/// Create the tables on the provider's data source if they are missing.
pub async fn apply_schema(provider: &ConnectionProvider) -> dao_db::Result<()> {
    let mut tx = provider.acquire().await?;
    sqlx::raw_sql(SCHEMA_SQL).execute(&mut *tx).await?;
    tx.commit().await?;
    tracing::info!(data_source = %provider.name(), "schema applied");
    Ok(())
}
