//! Redb Error

use thiserror::Error;

/// Redb Cache Error
#[derive(Debug, Error)]
pub enum Error {
    /// Redb Error
    #[error(transparent)]
    Redb(#[from] redb::Error),
    /// Redb Database Error
    #[error(transparent)]
    Database(#[from] redb::DatabaseError),
    /// Redb Transaction Error
    #[error(transparent)]
    Transaction(#[from] redb::TransactionError),
    /// Redb Commit Error
    #[error(transparent)]
    Commit(#[from] redb::CommitError),
    /// Redb Table Error
    #[error(transparent)]
    Table(#[from] redb::TableError),
    /// Redb Storage Error
    #[error(transparent)]
    Storage(#[from] redb::StorageError),
    /// IO Error
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Partition name rejected
    #[error("Invalid partition: {0}")]
    InvalidPartition(String),
}

impl From<Error> for courier_common::Error {
    fn from(e: Error) -> Self {
        Self::Cache(e.to_string())
    }
}
