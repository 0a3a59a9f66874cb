use thiserror::Error;

/// Problems detected before any worker launches. Never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid target address {target:?}: {source}")]
    InvalidTarget {
        target: String,
        source: url::ParseError,
    },

    #[error("Unsupported scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),

    #[error("Target {0} cannot be used as a base address")]
    NotABase(String),

    #[error("Target {target} is unreachable: {reason}")]
    Unreachable { target: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}
