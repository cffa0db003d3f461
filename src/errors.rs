//! Pipeline Watch Error Hierarchy
//!
//! Separates failures of a single store call ([`StoreError`]) from the
//! session-level failure raised once retries are exhausted
//! ([`Error::StoreUnavailable`]). Timeouts and cancellations are not errors;
//! they are [`crate::WatchOutcome`] values.

use std::time::Duration;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

/// Result of a single store operation.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading failures and invalid parameters, including
    /// invalid watch session parameters
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A single store call failed and was not retried
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The result store could not be observed even after retrying
    #[error("Result store unavailable after {attempts} attempts: {source}")]
    StoreUnavailable {
        attempts: usize,
        #[source]
        source: StoreError,
    },

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Embedded database failure
    #[error(transparent)]
    Db(#[from] sled::Error),

    /// Document (de)serialization failure
    #[error(transparent)]
    Codec(#[from] bincode::Error),

    /// A stored key did not have the expected layout
    #[error("Invalid key length: {0}")]
    InvalidKey(usize),

    /// A single query did not answer in time
    #[error("Store query timed out after {0:?}")]
    QueryTimeout(Duration),

    /// Backend reachable state is unknown or down
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl Error {
    /// True when the error means the store could not be observed at all.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Error::StoreUnavailable { .. })
    }
}
