//! Data access for user accounts and their roles.
//!
//! Each repository call runs in its own transaction obtained from a
//! [`dao_db::ConnectionProvider`], and the call returns once that transaction
//! is committed or rolled back.

// === PUBLIC CONTRACT ===
pub mod contract;

pub use contract::{DaoError, Role, User};
pub use domain::repo::{RoleRepository, UserRepository};
pub use infra::storage::{
    apply_schema, schema, SqliteRoleRepository, SqliteUserRepository, StorageError,
};

// === INTERNAL MODULES ===
// Exposed for tests; the re-exports above are the stable surface.
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
