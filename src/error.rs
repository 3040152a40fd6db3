use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinderError {
    /// Network-level failure reaching the explorer or the node provider.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The explorer answered with a non-success status.
    #[error("explorer rejected the request: {0}")]
    Upstream(String),
    /// Malformed hex or JSON in an upstream response.
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("no block with number {0}")]
    BlockNotFound(u64),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid input: {0}")]
    Input(String),
}
