use thiserror::Error;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Failure surfaced by a repository operation.
///
/// Nothing is retried internally; every fault reaches the immediate caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage engine could not be reached.
    #[error("storage engine unreachable: {0}")]
    Connection(#[source] mongodb::error::Error),

    /// The record or patch violates the collection schema.
    #[error("invalid person record: {0}")]
    Validation(String),

    /// The identifier text does not parse as a key.
    #[error("malformed person id {0:?}")]
    InvalidKey(String),

    /// The targeted record does not exist.
    #[error("no matching person")]
    NotFound,

    /// Any other driver-reported failure.
    #[error("storage engine operation failed: {0}")]
    Storage(#[source] mongodb::error::Error),
}

impl StoreError {
    /// Classifies a driver fault: reachability problems become
    /// [`StoreError::Connection`], everything else [`StoreError::Storage`].
    pub(crate) fn from_driver(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        let unreachable = matches!(
            err.kind.as_ref(),
            ErrorKind::ServerSelection { .. }
                | ErrorKind::Io(_)
                | ErrorKind::Authentication { .. }
                | ErrorKind::ConnectionPoolCleared { .. }
        );

        if unreachable {
            Self::Connection(err)
        } else {
            Self::Storage(err)
        }
    }
}
