// 📈 Averager + Processed Dataset
// Reconciled (count, total) tallies → per-bucket mean scores.
// A bucket nobody landed in scores 0.0; it is never dropped.

use crate::aggregator::{DimensionTally, SurveyTally};
use crate::error::PipelineError;
use crate::schema::{Dimension, DIMENSION_COUNT};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// BUCKET SCORES
// ============================================================================

/// Ordered bucket → average score mapping for one dimension
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketScores {
    scores: IndexMap<String, f64>,
}

impl BucketScores {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        BucketScores {
            scores: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn get(&self, bucket: &str) -> Option<f64> {
        self.scores.get(bucket).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores.iter().map(|(label, score)| (label.as_str(), *score))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.scores.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Lowest bucket average, `None` when empty
    pub fn min(&self) -> Option<f64> {
        self.scores.values().copied().reduce(f64::min)
    }

    /// Highest bucket average, `None` when empty
    pub fn max(&self) -> Option<f64> {
        self.scores.values().copied().reduce(f64::max)
    }
}

// ============================================================================
// PROCESSED DATASET
// ============================================================================

/// Eleven bucket-score mappings, one per dimension in `Dimension::ALL` order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<BucketScores>", into = "Vec<BucketScores>")]
pub struct ProcessedDataset {
    dimensions: Vec<BucketScores>,
}

impl ProcessedDataset {
    pub fn new(dimensions: Vec<BucketScores>) -> Result<Self, PipelineError> {
        if dimensions.len() != DIMENSION_COUNT {
            return Err(PipelineError::SnapshotShape {
                expected: DIMENSION_COUNT,
                found: dimensions.len(),
            });
        }
        Ok(ProcessedDataset { dimensions })
    }

    pub fn dimension(&self, dimension: Dimension) -> &BucketScores {
        &self.dimensions[dimension.index()]
    }

    pub fn dimensions(&self) -> &[BucketScores] {
        &self.dimensions
    }

    /// Average score of one bucket
    pub fn score_of(&self, dimension: Dimension, bucket: &str) -> Result<f64, PipelineError> {
        self.dimension(dimension)
            .get(bucket)
            .ok_or_else(|| PipelineError::UnknownBucket {
                dimension: dimension.name().to_string(),
                bucket: bucket.to_string(),
            })
    }
}

impl TryFrom<Vec<BucketScores>> for ProcessedDataset {
    type Error = PipelineError;

    fn try_from(dimensions: Vec<BucketScores>) -> Result<Self, Self::Error> {
        ProcessedDataset::new(dimensions)
    }
}

impl From<ProcessedDataset> for Vec<BucketScores> {
    fn from(dataset: ProcessedDataset) -> Self {
        dataset.dimensions
    }
}

// ============================================================================
// AVERAGER
// ============================================================================

/// Mean score per bucket; zero-population buckets score 0.0
pub fn average(tally: &DimensionTally) -> BucketScores {
    BucketScores::from_entries(tally.iter().map(|(label, bucket)| {
        let mean = if bucket.count == 0 {
            0.0
        } else {
            bucket.total / bucket.count as f64
        };
        (label, mean)
    }))
}

/// Average every reconciled dimension into the processed dataset
pub fn average_all(tally: &SurveyTally) -> ProcessedDataset {
    ProcessedDataset {
        dimensions: tally.iter().map(average).collect(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
