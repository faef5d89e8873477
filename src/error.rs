//! Engine error types

/// Errors surfaced by level loading, configuration and the pipeline.
///
/// Geometric degeneracies are never errors; they resolve to "no collision".
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// Malformed level or settings data
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The background worker is gone
    #[error("pipeline error: {0}")]
    Pipeline(String),
}

impl EngineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline(msg.into())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
