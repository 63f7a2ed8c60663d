// Survey Anxiety - Core Library
// Ingests the raw survey export once, persists per-bucket averages, and
// answers score / percentile queries from the snapshot. Used by the CLI and tests.

pub mod error;          // Typed pipeline errors
pub mod config;         // Paths, encoding, extra rules file
pub mod rules;          // Near-miss label normalization
pub mod scale;          // Likert → [-2, 2]
pub mod scoring;        // Per-respondent stress score
pub mod schema;         // Identity dimensions and their buckets
pub mod aggregator;     // Rows → per-bucket (count, total)
pub mod reconciliation; // "NA" bucket policy
pub mod averages;       // Tallies → processed dataset
pub mod extrema;        // Lowest / highest reachable composite score
pub mod snapshot;       // Processed dataset ⇄ JSON file
pub mod selection;      // One person's score and percentile
pub mod pipeline;       // Fresh vs cached ingestion

// Re-export commonly used types
pub use error::{PipelineError, Result};
pub use config::{InputEncoding, PipelineConfig};
pub use rules::{LabelNormalizer, NormalizationRule};
pub use scale::LikertScale;
pub use scoring::{Polarity, QuestionSchema, StressScorer};
pub use schema::{BucketSchema, Dimension, DIMENSION_COUNT, NA_BUCKET};
pub use aggregator::{aggregate_file, Aggregator, BucketTally, DimensionTally, IngestStats};
pub use reconciliation::{reconcile_all, reconcile_na, NaResolution};
pub use averages::{average_all, BucketScores, ProcessedDataset};
pub use extrema::{compute_extrema, Extrema};
pub use selection::{percentile, score, IdentitySelection};
pub use pipeline::{ingest, load, IngestOutcome, IngestReport, Pipeline};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
