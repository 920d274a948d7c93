//! Error types for the narrative engine.

use thiserror::Error;

/// Errors surfaced by the engine, all from the persistence layer.
///
/// Unknown ids are not errors: lookups yield absent results and the caller
/// presents the not-found state. Loss of persistence is never fatal to a
/// running session either - callers report the failure and keep playing in
/// memory.
#[derive(Error, Debug)]
pub enum EngineError {
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Save record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration file could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

/// A type alias for `Result<T, EngineError>`.
pub type Result<T> = std::result::Result<T, EngineError>;
