use thiserror::Error;

/// LazyError: reasons a cell cannot hand out its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LazyError {
    /// The cell's content was moved out with `take` or `transfer_from`.
    #[error("Cell has been emptied by a move")]
    Emptied,

    /// The cell was accessed from inside its own producer.
    #[error("Cell was accessed while its producer is running")]
    Reentrant,
}

/// ForceError: failure of a fallible producer, or of the cell itself.
#[derive(Debug, Error)]
pub enum ForceError<E> {
    /// The cell could not run its producer at all.
    #[error(transparent)]
    Lazy(#[from] LazyError),

    /// The producer ran and returned an error. The cell stays pending.
    #[error("Cell producer failed: {0}")]
    Producer(E),
}

impl<E> ForceError<E> {
    /// Returns the producer's own error, if that is what failed.
    pub fn into_producer_error(self) -> Option<E> {
        match self {
            ForceError::Producer(err) => Some(err),
            ForceError::Lazy(_) => None,
        }
    }
}
