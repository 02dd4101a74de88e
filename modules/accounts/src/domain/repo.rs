use async_trait::async_trait;

use crate::contract::{DaoError, Role, User};

/// Persistence port for roles.
///
/// Every call is its own transaction. Storage failures roll back and are
/// logged; the call then reports success (or a zero value for lookups).
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Insert a role unless one with the same name already exists.
    async fn create(&self, role: &Role) -> Result<(), DaoError>;
    /// Set the name of the role with `role.id`.
    async fn update(&self, role: &Role) -> Result<(), DaoError>;
    /// Delete the role with `role.id` together with every user holding it.
    ///
    /// Fails with [`DaoError::NotFound`] and changes nothing when no such
    /// role exists.
    async fn remove(&self, role: &Role) -> Result<(), DaoError>;
    /// Role with the given name, or `Role::default()` when there is none.
    async fn find_by_name(&self, name: &str) -> Result<Role, DaoError>;
}

/// Persistence port for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), DaoError>;
    /// Overwrite every column of the user with `user.id`.
    async fn update(&self, user: &User) -> Result<(), DaoError>;
    /// Delete the user with `user.id`; [`DaoError::NotFound`] when absent.
    async fn remove(&self, user: &User) -> Result<(), DaoError>;
    /// All users in storage order.
    async fn find_all(&self) -> Result<Vec<User>, DaoError>;
    /// User with the given login, or `User::default()`.
    async fn find_by_login(&self, login: &str) -> Result<User, DaoError>;
    /// User with the given email, or `User::default()`.
    async fn find_by_email(&self, email: &str) -> Result<User, DaoError>;
}
