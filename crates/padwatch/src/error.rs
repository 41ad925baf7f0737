use thiserror::Error;

/// Failure reported by a platform backend while listing or sampling devices.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlatformError {
    /// The device disappeared since the last listing. Reconciled at the next detect.
    #[error("device gone: {0}")]
    DeviceGone(String),
    /// The backend returned a sample that does not match the device layout.
    #[error("malformed sample from {device_id}: {reason}")]
    Malformed { device_id: String, reason: String },
    /// An opaque backend failure (permission denied, driver error, ...).
    #[error("backend error: {0}")]
    Backend(String),
}

/// Error returned by the session lifecycle and cycle operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session already initialized")]
    AlreadyInitialized,
    #[error("session not initialized")]
    NotInitialized,
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Error returned by read-only device queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("session not initialized")]
    NotInitialized,
    #[error("no device at index {index} ({count} attached)")]
    IndexOutOfRange { index: usize, count: usize },
}

/// Error raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml deserialize error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Error a fallible event handler may return. Logged and otherwise ignored.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Convenient result alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
