//! SQLite url helpers.

pub(crate) mod dsn;

pub(crate) use dsn::{extract_sqlite_pragmas, is_memory_dsn};
