use thiserror::Error;

/// Errors surfaced to collaborators of the focus core.
///
/// Deserialization failures on load are deliberately absent: they are
/// recovered locally by discarding the corrupt blob and starting idle.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An operation was called from a session state that does not permit it.
    /// Treated as an integration bug in the caller, not silently dropped.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Backing storage failed underneath a write-through mutation.
    #[error("storage failure: {0}")]
    Storage(anyhow::Error),

    /// A mocked external service refused the call. The bundled mocks always
    /// succeed; real backends report through this variant.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(&'static str),
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::Storage(err)
    }
}
