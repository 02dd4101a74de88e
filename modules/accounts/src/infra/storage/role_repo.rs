use std::sync::Arc;

use async_trait::async_trait;
use dao_db::{ConnectionProvider, DbTransaction};

use super::mapper::row_to_role;
use super::sql;
use super::tx::{finish, StorageError, TxError};
use crate::contract::{DaoError, Role};
use crate::domain::repo::RoleRepository;

/// [`RoleRepository`] over a SQLite data source.
#[derive(Clone, Debug)]
pub struct SqliteRoleRepository {
    provider: Arc<ConnectionProvider>,
}

impl SqliteRoleRepository {
    pub fn new(provider: Arc<ConnectionProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl RoleRepository for SqliteRoleRepository {
    async fn create(&self, role: &Role) -> Result<(), DaoError> {
        let name = role
            .name
            .as_deref()
            .ok_or_else(|| DaoError::invalid_argument("role name must be set"))?;

        // Separate transaction; the UNIQUE constraint on name catches a
        // concurrent insert that slips in between.
        let existing = self.find_by_name(name).await?;
        if existing.name.as_deref() == Some(name) {
            tracing::info!(role = name, "role already exists, nothing to create");
            return Ok(());
        }

        let mut tx = self.provider.acquire().await?;
        let result = insert(&mut tx, name).await;
        finish(tx, self.provider.name(), "role.create", result).await
    }

    async fn update(&self, role: &Role) -> Result<(), DaoError> {
        let id = role
            .id
            .ok_or_else(|| DaoError::invalid_argument("role id must be set"))?;

        let mut tx = self.provider.acquire().await?;
        let result = rename(&mut tx, id, role.name.as_deref()).await;
        finish(tx, self.provider.name(), "role.update", result).await
    }

    async fn remove(&self, role: &Role) -> Result<(), DaoError> {
        let id = role
            .id
            .ok_or_else(|| DaoError::invalid_argument("role id must be set"))?;

        let mut tx = self.provider.acquire().await?;
        let result = delete_with_users(&mut tx, id).await;
        finish(tx, self.provider.name(), "role.remove", result).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Role, DaoError> {
        if name.is_empty() {
            return Err(DaoError::invalid_argument("role name must not be empty"));
        }

        let mut tx = self.provider.acquire().await?;
        let result = select_by_name(&mut tx, name).await;
        finish(tx, self.provider.name(), "role.find_by_name", result).await
    }
}

async fn insert(tx: &mut DbTransaction, name: &str) -> Result<(), TxError> {
    sqlx::query(sql::INSERT_ROLE)
        .bind(name)
        .execute(&mut **tx)
        .await
        .map_err(StorageError::during("insert role"))?;
    Ok(())
}

async fn rename(tx: &mut DbTransaction, id: i64, name: Option<&str>) -> Result<(), TxError> {
    sqlx::query(sql::UPDATE_ROLE)
        .bind(name)
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(StorageError::during("update role"))?;
    Ok(())
}

async fn delete_with_users(tx: &mut DbTransaction, id: i64) -> Result<(), TxError> {
    let users = sqlx::query(sql::DELETE_USERS_BY_ROLE)
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(StorageError::during("delete users of role"))?;

    let deleted = sqlx::query(sql::DELETE_ROLE)
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(StorageError::during("delete role"))?;

    if deleted.rows_affected() == 0 {
        return Err(TxError::Abort(DaoError::not_found("role", id)));
    }
    tracing::debug!(role_id = id, users = users.rows_affected(), "role removed");
    Ok(())
}

async fn select_by_name(tx: &mut DbTransaction, name: &str) -> Result<Role, TxError> {
    let rows = sqlx::query(sql::SELECT_ROLE_BY_NAME)
        .bind(name)
        .fetch_all(&mut **tx)
        .await
        .map_err(StorageError::during("select role by name"))?;

    // Last matching row wins.
    let mut found = Role::default();
    for row in &rows {
        found = row_to_role(row).map_err(StorageError::during("read role row"))?;
    }
    Ok(found)
}
