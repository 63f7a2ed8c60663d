// ⚠️ Pipeline Errors
// Conditions callers branch on. Everything per-row is recovered locally
// (NA bucket / unanswered question) and never reaches this type.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input dataset or snapshot is missing
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A Likert scale with fewer than two points cannot be interpolated
    #[error("Invalid scale size {size}: a scale needs at least 2 points")]
    InvalidScale { size: u32 },

    /// Static question tables disagree with each other
    #[error("Invalid question schema: {0}")]
    InvalidSchema(String),

    /// Extrema are equal, so no percentage can be derived from them
    #[error("Degenerate extrema: min and max are both {value}")]
    DegenerateExtrema { value: f64 },

    /// A dimension mapping has no buckets, so it has no min or max
    #[error("Dimension '{dimension}' has no buckets")]
    EmptyDimension { dimension: String },

    /// A selection names a bucket that the dataset does not contain
    #[error("Unknown bucket '{bucket}' for dimension '{dimension}'")]
    UnknownBucket { dimension: String, bucket: String },

    /// Snapshot decoded but does not have one mapping per dimension
    #[error("Snapshot has {found} dimensions, expected {expected}")]
    SnapshotShape { expected: usize, found: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
