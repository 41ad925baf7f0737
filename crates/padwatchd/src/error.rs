use padwatch::{ConfigError, PlatformError, SessionError};
use thiserror::Error;

/// Error type for daemon operations.
#[derive(Debug, Error)]
pub(crate) enum DaemonError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
    #[error("backend '{0}' is not compiled in")]
    BackendUnavailable(&'static str),
    #[error("failed to set Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("failed to set up logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}
