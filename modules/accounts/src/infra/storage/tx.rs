use dao_db::DbTransaction;
use thiserror::Error;

use crate::contract::DaoError;

/// A statement or commit that failed inside a repository transaction.
///
/// Never returned to callers; it is logged when the transaction is rolled back.
#[derive(Error, Debug)]
#[error("{operation} failed")]
pub struct StorageError {
    pub operation: &'static str,
    #[source]
    pub source: sqlx::Error,
}

impl StorageError {
    /// Adapter for `map_err` tagging a sqlx error with the step that raised it.
    pub(crate) fn during(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self { operation, source }
    }
}

/// Why a transaction body stopped early.
#[derive(Debug)]
pub(crate) enum TxError {
    /// Roll back, log, report success.
    Storage(StorageError),
    /// Roll back and hand the error to the caller.
    Abort(DaoError),
}

impl From<StorageError> for TxError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

/// Commit on success, roll back otherwise.
///
/// Storage failures end in the zero value of `T`; aborts propagate.
pub(crate) async fn finish<T: Default>(
    tx: DbTransaction,
    data_source: &str,
    operation: &'static str,
    result: Result<T, TxError>,
) -> Result<T, DaoError> {
    match result {
        Ok(value) => match tx.commit().await {
            Ok(()) => Ok(value),
            Err(source) => {
                let err = StorageError {
                    operation: "commit",
                    source,
                };
                tracing::error!(data_source, operation, error = ?err, "commit failed, transaction rolled back");
                Ok(T::default())
            }
        },
        Err(TxError::Abort(err)) => {
            rollback(tx, data_source, operation).await;
            Err(err)
        }
        Err(TxError::Storage(err)) => {
            tracing::error!(data_source, operation, error = ?err, "storage failure, transaction rolled back");
            rollback(tx, data_source, operation).await;
            Ok(T::default())
        }
    }
}

async fn rollback(tx: DbTransaction, data_source: &str, operation: &'static str) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(data_source, operation, error = %e, "rollback failed");
    }
}
