use thiserror::Error;

/// Failures from the layers under the interpreter: storage, the tree codec,
/// the relay and configuration. Command handlers never surface these to the
/// page; they get logged and turned into reply text.
#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("malformed filesystem data: {0}")]
    MalformedTree(String),

    #[error("serialization error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("relay error: {0}")]
    Relay(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, TerminalError>;
