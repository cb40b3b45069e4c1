/// Error types for scene generation operations.
use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy for the generation pipeline.
/// Every variant carries enough context to reproduce the failing round.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid run configuration detected before any work starts.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Density grid input that cannot be interpreted.
    #[error("malformed grid at line {line}: {reason}")]
    MalformedGrid { line: usize, reason: String },

    /// Density grid input that ends before the header-declared row count.
    #[error("truncated grid input: expected {expected} rows, found {found}")]
    TruncatedInput { expected: usize, found: usize },

    /// Rejection sampling ran out of attempts before reaching the target.
    #[error("placement exhausted after {attempts} attempts ({placed}/{target} footprints placed)")]
    PlacementExhausted {
        attempts: usize,
        placed: usize,
        target: usize,
    },

    /// A render call completed without producing its output file.
    #[error("render for camera '{camera}' produced no output at {}", path.display())]
    RenderFailure { camera: String, path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
