use thiserror::Error;

/// Top-level error type for the engine process.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
