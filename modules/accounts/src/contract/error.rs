use dao_db::DbError;
use thiserror::Error;

/// Errors repository callers see.
///
/// Statement and commit failures are not part of this set: they are rolled
/// back and logged inside the repository, and the call returns its zero value.
#[derive(Error, Debug)]
pub enum DaoError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Connection error: {0}")]
    Connection(#[from] DbError),
}

impl DaoError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}
