use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The native player exists but has not finished loading its media.
    #[error("Player not ready: {0}")]
    NotReady(String),

    /// The native resource behind the handle has already been released.
    #[error("Player already disposed: {0}")]
    Disposed(String),
}

impl BridgeError {
    /// Transient failures are expected during player startup and may be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, BridgeError::NotReady(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
