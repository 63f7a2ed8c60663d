// 📉 Extrema - lowest and highest composite score any respondent can reach
//
//   min = Σ min(dimension) / D
//   max = Σ max(dimension) / D
//
// D is the number of dimensions passed in, which for a ProcessedDataset is
// always the eleven identity dimensions.

use crate::averages::{BucketScores, ProcessedDataset};
use crate::error::{PipelineError, Result};
use crate::schema::Dimension;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extrema {
    pub min: f64,
    pub max: f64,
}

impl Extrema {
    /// Sum the worst and best bucket of every dimension, divided by the
    /// dimension count
    pub fn from_dimensions(dimensions: &[BucketScores]) -> Result<Self> {
        if dimensions.is_empty() {
            return Err(PipelineError::EmptyDimension {
                dimension: "<no dimensions>".to_string(),
            });
        }

        let mut min_so_far = 0.0;
        let mut max_so_far = 0.0;

        for (i, scores) in dimensions.iter().enumerate() {
            let (Some(low), Some(high)) = (scores.min(), scores.max()) else {
                return Err(PipelineError::EmptyDimension {
                    dimension: dimension_label(i),
                });
            };
            min_so_far += low;
            max_so_far += high;
        }

        let count = dimensions.len() as f64;
        Ok(Extrema {
            min: min_so_far / count,
            max: max_so_far / count,
        })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Rescale a composite score onto 0–100 between the extrema.
    ///
    /// Equal extrema have no meaningful scale and are reported as an error
    /// instead of producing `inf`/`NaN`.
    pub fn percentage(&self, score: f64) -> Result<f64> {
        if self.span() == 0.0 {
            return Err(PipelineError::DegenerateExtrema { value: self.min });
        }
        Ok((score - self.min) / self.span() * 100.0)
    }
}

fn dimension_label(index: usize) -> String {
    Dimension::ALL
        .get(index)
        .map(|d| d.name().to_string())
        .unwrap_or_else(|| format!("dimension #{}", index))
}

/// Extrema of a processed dataset
pub fn compute_extrema(dataset: &ProcessedDataset) -> Result<Extrema> {
    Extrema::from_dimensions(dataset.dimensions())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_two_dimension_extrema() {
        let dims = vec![
            BucketScores::from_entries([("id1_1", 0.5), ("id1_2", 5.0)]),
            BucketScores::from_entries([("id2_1", 2.0), ("id2_2", 0.2)]),
        ];

        let extrema = Extrema::from_dimensions(&dims).unwrap();
        assert!(close(extrema.min, (0.5 + 0.2) / 2.0));
        assert!(close(extrema.max, (5.0 + 2.0) / 2.0));
    }

    #[test]
    fn test_mixed_sign_extrema() {
        let dims = vec![
            BucketScores::from_entries([("18-24", 5.0792821066052225), ("25-34", 0.5522088004403117)]),
            BucketScores::from_entries([("Male", -5.757139888991139), ("Female", -1.7634546268885034)]),
        ];

        let extrema = Extrema::from_dimensions(&dims).unwrap();
        assert!(close(extrema.min, -2.6024655442754137));
        assert!(close(extrema.max, 1.6579137398583597));
    }

    #[test]
    fn test_full_dataset_divides_by_eleven() {
        let dims: Vec<BucketScores> = (0..11)
            .map(|_| BucketScores::from_entries([("lo", -1.0), ("hi", 10.0)]))
            .collect();
        let dataset = ProcessedDataset::new(dims).unwrap();

        let extrema = compute_extrema(&dataset).unwrap();
        assert!(close(extrema.min, -1.0));
        assert!(close(extrema.max, 10.0));
    }

    #[test]
    fn test_empty_dimension_is_error() {
        let dims = vec![
            BucketScores::from_entries([("a", 1.0)]),
            BucketScores::default(),
        ];

        let result = Extrema::from_dimensions(&dims);
        assert!(matches!(
            result,
            Err(PipelineError::EmptyDimension { dimension }) if dimension == "Gender"
        ));
        assert!(Extrema::from_dimensions(&[]).is_err());
    }

    #[test]
    fn test_percentage() {
        let extrema = Extrema { min: -2.0, max: 2.0 };

        assert!(close(extrema.percentage(0.0).unwrap(), 50.0));
        assert!(close(extrema.percentage(-2.0).unwrap(), 0.0));
        assert!(close(extrema.percentage(2.0).unwrap(), 100.0));
    }

    #[test]
    fn test_degenerate_percentage_is_error() {
        let extrema = Extrema { min: 1.5, max: 1.5 };

        assert!(matches!(
            extrema.percentage(1.5),
            Err(PipelineError::DegenerateExtrema { .. })
        ));
    }
}
