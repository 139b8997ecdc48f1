use thiserror::Error;

/// Failures while assembling the runtime around the playback core.
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected `CoreConfig` or logging settings.
    #[error("Invalid runtime configuration: {0}")]
    Config(String),

    /// The host did not inject a bridge the core cannot run without.
    #[error("Host did not provide {capability}: {message}")]
    CapabilityMissing { capability: String, message: String },
}

impl Error {
    /// Whether the host can recover by injecting the missing piece.
    pub fn is_missing_capability(&self) -> bool {
        matches!(self, Self::CapabilityMissing { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
