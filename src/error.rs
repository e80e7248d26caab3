use thiserror::Error;

/// Errors that can occur when reading from a map
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// The requested key was not found
    #[error("Key not found in map: {0}")]
    KeyNotFound(String),
}
