use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrieXError {
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The payload could not be turned into a request. Reported in-band.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: u64, max: u64 },

    #[error("request dispatcher is no longer running")]
    DispatcherClosed,

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for TrieXError {
    fn from(e: bincode::Error) -> Self {
        TrieXError::Snapshot(e.to_string())
    }
}

impl From<toml::de::Error> for TrieXError {
    fn from(e: toml::de::Error) -> Self {
        TrieXError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrieXError>;
