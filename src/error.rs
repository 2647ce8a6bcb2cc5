//! Failure reporting for table operations.

use core::fmt;
use thiserror::Error;

/// Why a table operation was refused.
///
/// Every variant leaves the table exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The table was built with zero buckets and cannot address any key.
    #[error("table has no buckets")]
    NoBuckets,

    /// The bucket hasher returned an index outside `[0, buckets)`.
    #[error("bucket hasher returned index {index} for a table of {buckets} buckets")]
    BucketOutOfRange { index: usize, buckets: usize },

    /// A `TableConfig` asked for a different ownership policy than the table type carries.
    #[error("config requests take_ownership = {requested}, table type uses {actual}")]
    OwnershipMismatch { requested: bool, actual: bool },

    /// The bucket array could not be allocated.
    #[error("failed to allocate bucket array of {buckets} slots")]
    BucketAlloc { buckets: usize },

    /// No room for another entry node.
    #[error("failed to allocate entry node: table is limited to {limit} entries")]
    NodeAlloc { limit: usize },

    #[error("key already present")]
    DuplicateKey,

    #[error("key not found")]
    NotFound,
}

/// A refused operation together with the payload the caller handed in.
///
/// Operations that take payloads by value give them back on failure, so a
/// rejected call never consumes or destroys caller data.
pub struct Rejected<T> {
    pub error: TableError,
    pub payload: T,
}

impl<T> Rejected<T> {
    pub(crate) fn new(error: TableError, payload: T) -> Self {
        Self { error, payload }
    }

    /// Split into the error and the returned payload.
    pub fn into_parts(self) -> (TableError, T) {
        (self.error, self.payload)
    }

    /// Drop the returned payload and keep only the reason.
    pub fn into_error(self) -> TableError {
        self.error
    }

    /// Map the returned payload, keeping the error.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Rejected<U> {
        Rejected {
            error: self.error,
            payload: f(self.payload),
        }
    }
}

// Payloads are opaque; only the reason is printed.
impl<T> fmt::Debug for Rejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for Rejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation rejected: {}", self.error)
    }
}

impl<T> std::error::Error for Rejected<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl<T> From<Rejected<T>> for TableError {
    fn from(r: Rejected<T>) -> Self {
        r.error
    }
}
