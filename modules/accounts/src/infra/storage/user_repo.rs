use std::sync::Arc;

use async_trait::async_trait;
use dao_db::{ConnectionProvider, DbTransaction};

use super::mapper::row_to_user;
use super::sql;
use super::tx::{finish, StorageError, TxError};
use crate::contract::{DaoError, User};
use crate::domain::repo::UserRepository;

/// [`UserRepository`] over a SQLite data source.
#[derive(Clone, Debug)]
pub struct SqliteUserRepository {
    provider: Arc<ConnectionProvider>,
}

impl SqliteUserRepository {
    pub fn new(provider: Arc<ConnectionProvider>) -> Self {
        Self { provider }
    }
}

fn require_id(user: &User) -> Result<i64, DaoError> {
    user.id
        .ok_or_else(|| DaoError::invalid_argument("user id must be set"))
}

fn require_role(user: &User) -> Result<i64, DaoError> {
    user.role_id
        .ok_or_else(|| DaoError::invalid_argument("user role_id must be set"))
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &User) -> Result<(), DaoError> {
        let role_id = require_role(user)?;

        let mut tx = self.provider.acquire().await?;
        let result = insert(&mut tx, user, role_id).await;
        finish(tx, self.provider.name(), "user.create", result).await
    }

    async fn update(&self, user: &User) -> Result<(), DaoError> {
        let id = require_id(user)?;
        let role_id = require_role(user)?;

        let mut tx = self.provider.acquire().await?;
        let result = overwrite(&mut tx, id, user, role_id).await;
        finish(tx, self.provider.name(), "user.update", result).await
    }

    async fn remove(&self, user: &User) -> Result<(), DaoError> {
        let id = require_id(user)?;

        let mut tx = self.provider.acquire().await?;
        let result = delete(&mut tx, id).await;
        finish(tx, self.provider.name(), "user.remove", result).await
    }

    async fn find_all(&self) -> Result<Vec<User>, DaoError> {
        let mut tx = self.provider.acquire().await?;
        let result = select_all(&mut tx).await;
        finish(tx, self.provider.name(), "user.find_all", result).await
    }

    async fn find_by_login(&self, login: &str) -> Result<User, DaoError> {
        if login.is_empty() {
            return Err(DaoError::invalid_argument("login must not be empty"));
        }

        let mut tx = self.provider.acquire().await?;
        let result = select_one(&mut tx, sql::SELECT_USER_BY_LOGIN, login).await;
        finish(tx, self.provider.name(), "user.find_by_login", result).await
    }

    async fn find_by_email(&self, email: &str) -> Result<User, DaoError> {
        if email.is_empty() {
            return Err(DaoError::invalid_argument("email must not be empty"));
        }

        let mut tx = self.provider.acquire().await?;
        let result = select_one(&mut tx, sql::SELECT_USER_BY_EMAIL, email).await;
        finish(tx, self.provider.name(), "user.find_by_email", result).await
    }
}

async fn insert(tx: &mut DbTransaction, user: &User, role_id: i64) -> Result<(), TxError> {
    sqlx::query(sql::INSERT_USER)
        .bind(user.login.as_deref())
        .bind(user.password.as_deref())
        .bind(user.email.as_deref())
        .bind(user.first_name.as_deref())
        .bind(user.last_name.as_deref())
        .bind(user.birthday)
        .bind(role_id)
        .execute(&mut **tx)
        .await
        .map_err(StorageError::during("insert user"))?;
    Ok(())
}

async fn overwrite(tx: &mut DbTransaction, id: i64, user: &User, role_id: i64) -> Result<(), TxError> {
    sqlx::query(sql::UPDATE_USER)
        .bind(user.login.as_deref())
        .bind(user.password.as_deref())
        .bind(user.email.as_deref())
        .bind(user.first_name.as_deref())
        .bind(user.last_name.as_deref())
        .bind(user.birthday)
        .bind(role_id)
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(StorageError::during("update user"))?;
    Ok(())
}

async fn delete(tx: &mut DbTransaction, id: i64) -> Result<(), TxError> {
    let deleted = sqlx::query(sql::DELETE_USER)
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(StorageError::during("delete user"))?;

    if deleted.rows_affected() == 0 {
        return Err(TxError::Abort(DaoError::not_found("user", id)));
    }
    Ok(())
}

async fn select_all(tx: &mut DbTransaction) -> Result<Vec<User>, TxError> {
    let rows = sqlx::query(sql::SELECT_USERS)
        .fetch_all(&mut **tx)
        .await
        .map_err(StorageError::during("select users"))?;

    let users = rows
        .iter()
        .map(row_to_user)
        .collect::<Result<Vec<_>, _>>()
        .map_err(StorageError::during("read user row"))?;
    Ok(users)
}

async fn select_one(tx: &mut DbTransaction, statement: &'static str, key: &str) -> Result<User, TxError> {
    let rows = sqlx::query(statement)
        .bind(key)
        .fetch_all(&mut **tx)
        .await
        .map_err(StorageError::during("select user"))?;

    Ok(match rows.last() {
        Some(row) => row_to_user(row).map_err(StorageError::during("read user row"))?,
        None => User::default(),
    })
}
