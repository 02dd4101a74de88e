//! SQLite-backed repositories.

mod mapper;
mod role_repo;
pub mod schema;
mod sql;
mod tx;
mod user_repo;

pub use role_repo::SqliteRoleRepository;
pub use schema::{apply_schema, SCHEMA_SQL};
pub use tx::StorageError;
pub use user_repo::SqliteUserRepository;
