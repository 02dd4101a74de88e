use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::contract::{Role, User};

/// Convert a `role` row to a contract model.
pub(crate) fn row_to_role(row: &SqliteRow) -> Result<Role, sqlx::Error> {
    Ok(Role {
        id: row.try_get(Role::ID)?,
        name: row.try_get(Role::NAME)?,
    })
}

/// Convert a `user` row to a contract model.
pub(crate) fn row_to_user(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get(User::ID)?,
        login: row.try_get(User::LOGIN)?,
        password: row.try_get(User::PASSWORD)?,
        email: row.try_get(User::EMAIL)?,
        first_name: row.try_get(User::FIRST_NAME)?,
        last_name: row.try_get(User::LAST_NAME)?,
        birthday: row.try_get(User::BIRTHDAY)?,
        role_id: row.try_get(User::ROLE_ID)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sqlx::SqlitePool;

    #[tokio::test]
    async fn test_user_row_with_nulls() -> anyhow::Result<()> {
        let pool = SqlitePool::connect("sqlite::memory:").await?;
        let row = sqlx::query(
            "SELECT 5 AS id, 'jdoe' AS login, 'pw' AS password, 'j@doe.io' AS email, \
             NULL AS first_name, 'Doe' AS last_name, '1990-05-17' AS birthday, 2 AS role_id",
        )
        .fetch_one(&pool)
        .await?;

        let user = row_to_user(&row)?;
        assert_eq!(user.id, Some(5));
        assert_eq!(user.first_name, None);
        assert_eq!(user.last_name.as_deref(), Some("Doe"));
        assert_eq!(user.birthday, NaiveDate::from_ymd_opt(1990, 5, 17));
        assert_eq!(user.role_id, Some(2));
        Ok(())
    }

    #[tokio::test]
    async fn test_role_row_missing_column_is_an_error() -> anyhow::Result<()> {
        let pool = SqlitePool::connect("sqlite::memory:").await?;
        let row = sqlx::query("SELECT 1 AS id").fetch_one(&pool).await?;

        assert!(row_to_role(&row).is_err());
        Ok(())
    }
}
