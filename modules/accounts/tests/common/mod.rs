//! Shared fixture: a fresh file database seeded with three roles and three users.

#![allow(dead_code)]

use std::sync::Arc;

use accounts::{apply_schema, SqliteRoleRepository, SqliteUserRepository, User};
use chrono::NaiveDate;
use dao_db::{ConnectionProvider, DataSourceConfig};
use tempfile::TempDir;

pub const ROLES: [(i64, &str); 3] = [(1, "admin"), (2, "user"), (3, "guest")];

pub struct Fixture {
    // Held so the database file outlives the test.
    _dir: TempDir,
    /// Url of the database file, for side connections.
    pub url: String,
    pub provider: Arc<ConnectionProvider>,
}

impl Fixture {
    pub async fn seeded() -> anyhow::Result<Self> {
        let fixture = Self::empty().await?;
        fixture.seed().await?;
        Ok(fixture)
    }

    pub async fn empty() -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        let url = format!("sqlite://{}", dir.path().join("accounts.db").display());
        let provider = Arc::new(ConnectionProvider::from_config(
            "h2",
            DataSourceConfig::new(url.clone(), "sa", "", "sqlite"),
        ));
        apply_schema(&provider).await?;
        Ok(Self {
            _dir: dir,
            url,
            provider,
        })
    }

    pub fn roles(&self) -> SqliteRoleRepository {
        SqliteRoleRepository::new(self.provider.clone())
    }

    pub fn users(&self) -> SqliteUserRepository {
        SqliteUserRepository::new(self.provider.clone())
    }

    async fn seed(&self) -> anyhow::Result<()> {
        let mut tx = self.provider.acquire().await?;
        for (id, name) in ROLES {
            sqlx::query("INSERT INTO role(id, name) VALUES (?, ?)")
                .bind(id)
                .bind(name)
                .execute(&mut *tx)
                .await?;
        }
        for (i, user) in seeded_users().into_iter().enumerate() {
            sqlx::query(
                "INSERT INTO user(id, login, password, email, first_name, last_name, birthday, role_id) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(i as i64 + 1)
            .bind(user.login)
            .bind(user.password)
            .bind(user.email)
            .bind(user.first_name)
            .bind(user.last_name)
            .bind(user.birthday)
            .bind(user.role_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn count(&self, table: &str) -> anyhow::Result<i64> {
        let mut tx = self.provider.acquire().await?;
        let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(n)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Users as seeded, ids 1..=3 in order.
pub fn seeded_users() -> Vec<User> {
    vec![
        User::new("firstUser", "password1", "first@mail.com", "First", "User", date(1990, 1, 1), 1).with_id(1),
        User::new("secondUser", "password2", "second@mail.com", "Second", "User", date(1991, 2, 2), 2).with_id(2),
        User::new("thirdUser", "password3", "third@mail.com", "Third", "User", date(1992, 3, 3), 3).with_id(3),
    ]
}
