//! Error taxonomy
//!
//! Pool and catalog errors are hard failures surfaced to the caller. Placement,
//! boundary and color errors are normally absorbed by fallback chains and only
//! reported through the diagnostic sink.

/// Errors produced by the drop engine
#[derive(Debug, thiserror::Error)]
pub enum DropError {
    #[error("catalog has no items with a positive weight")]
    EmptyCatalog,

    #[error("cannot sample from an empty pool")]
    EmptyPool,

    #[error("no valid spawn position after {attempts} attempts")]
    NoValidPosition { attempts: u32 },

    #[error("invalid boundary: {0}")]
    InvalidBoundary(String),

    #[error("malformed color: {0:?}")]
    MalformedColor(String),

    #[error("unknown quality preset {0:?}")]
    UnknownPreset(String),

    #[error("graphics device unavailable: {0}")]
    Gpu(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type with DropError
pub type Result<T> = std::result::Result<T, DropError>;
