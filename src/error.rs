//! Error types for the batch loader
//!
//! Provides unified error handling using thiserror.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

// == Load Error Enum ==
/// Reason a [`BatchLoader::load`](crate::loader::BatchLoader::load) call failed.
///
/// `E` is the error type of the caller-supplied batch function. It is held in
/// an `Arc` so one failure can be handed to every waiter of a batch window.
#[derive(Error)]
pub enum LoadError<E> {
    /// The batch function returned an error; shared by every waiter of the window
    #[error("batch load failed: {0}")]
    Batch(Arc<E>),

    /// The batch function returned a different number of values than keys
    #[error("batch function returned {actual} values for {expected} keys")]
    MisalignedBatch { expected: usize, actual: usize },

    /// The dispatch task went away before answering
    #[error("batch dispatch was cancelled before producing a result")]
    Cancelled,
}

impl<E> LoadError<E> {
    /// The underlying batch function error, if that is what failed.
    pub fn batch_error(&self) -> Option<&Arc<E>> {
        match self {
            LoadError::Batch(err) => Some(err),
            _ => None,
        }
    }
}

impl<E> Clone for LoadError<E> {
    fn clone(&self) -> Self {
        match self {
            LoadError::Batch(err) => LoadError::Batch(Arc::clone(err)),
            LoadError::MisalignedBatch { expected, actual } => LoadError::MisalignedBatch {
                expected: *expected,
                actual: *actual,
            },
            LoadError::Cancelled => LoadError::Cancelled,
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for LoadError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Batch(err) => f.debug_tuple("Batch").field(err).finish(),
            LoadError::MisalignedBatch { expected, actual } => f
                .debug_struct("MisalignedBatch")
                .field("expected", expected)
                .field("actual", actual)
                .finish(),
            LoadError::Cancelled => f.write_str("Cancelled"),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for loader operations.
pub type Result<T, E> = std::result::Result<T, LoadError<E>>;
