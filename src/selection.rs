// 🎯 Identity Selection - look up one person's score in a processed dataset
//
// A selection is one bucket label per dimension. The composite score is the
// mean of the selected buckets' averages; the percentile compares it against
// everyone who shares the selected bucket in one chosen dimension.

use crate::averages::ProcessedDataset;
use crate::error::{PipelineError, Result};
use crate::extrema::Extrema;
use crate::schema::{age_bucket, head_count_bucket, BucketSchema, Dimension, DIMENSION_COUNT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySelection {
    buckets: [String; DIMENSION_COUNT],
}

impl IdentitySelection {
    /// Selection from bucket labels, in `Dimension::ALL` order
    pub fn from_labels<S: Into<String>>(labels: [S; DIMENSION_COUNT]) -> Self {
        IdentitySelection {
            buckets: labels.map(Into::into),
        }
    }

    /// Selection from raw answers, classified exactly as ingestion would.
    /// Unrecognized values select the "NA" label, which a processed dataset
    /// does not contain, so scoring such a selection fails.
    pub fn from_raw(schema: &BucketSchema, raw: [&str; DIMENSION_COUNT]) -> Self {
        IdentitySelection {
            buckets: Dimension::ALL.map(|d| schema.classify(d, raw[d.index()]).to_string()),
        }
    }

    pub fn bucket(&self, dimension: Dimension) -> &str {
        &self.buckets[dimension.index()]
    }

    pub fn set_bucket<S: Into<String>>(&mut self, dimension: Dimension, label: S) {
        self.buckets[dimension.index()] = label.into();
    }

    pub fn set_age(&mut self, age: u32) -> Result<()> {
        let bucket = age_bucket(i64::from(age)).ok_or_else(|| unknown(Dimension::Age, age))?;
        self.set_bucket(Dimension::Age, bucket);
        Ok(())
    }

    pub fn set_isolation_adults(&mut self, adults: u32) -> Result<()> {
        let bucket = head_count_bucket(i64::from(adults))
            .ok_or_else(|| unknown(Dimension::IsolationAdults, adults))?;
        self.set_bucket(Dimension::IsolationAdults, bucket);
        Ok(())
    }

    pub fn set_isolation_children(&mut self, children: u32) -> Result<()> {
        let bucket = head_count_bucket(i64::from(children))
            .ok_or_else(|| unknown(Dimension::IsolationChildren, children))?;
        self.set_bucket(Dimension::IsolationChildren, bucket);
        Ok(())
    }
}

fn unknown(dimension: Dimension, value: u32) -> PipelineError {
    PipelineError::UnknownBucket {
        dimension: dimension.name().to_string(),
        bucket: value.to_string(),
    }
}

/// Composite anxiety score: mean of the selected buckets' averages
pub fn score(selection: &IdentitySelection, dataset: &ProcessedDataset) -> Result<f64> {
    let mut anxiety = 0.0;
    for dimension in Dimension::ALL {
        anxiety += dataset.score_of(dimension, selection.bucket(dimension))?;
    }
    Ok(anxiety / DIMENSION_COUNT as f64)
}

/// Where `user_score` falls among people sharing the selected bucket of
/// `dimension`: that dimension is pinned to the selection, every other one
/// ranges over its lowest and highest bucket.
pub fn percentile(
    selection: &IdentitySelection,
    user_score: f64,
    dimension: Dimension,
    dataset: &ProcessedDataset,
) -> Result<f64> {
    let mut lowest = 0.0;
    let mut highest = 0.0;

    for other in Dimension::ALL {
        if other == dimension {
            let pinned = dataset.score_of(other, selection.bucket(other))?;
            lowest += pinned;
            highest += pinned;
        } else {
            let scores = dataset.dimension(other);
            let (Some(low), Some(high)) = (scores.min(), scores.max()) else {
                return Err(PipelineError::EmptyDimension {
                    dimension: other.name().to_string(),
                });
            };
            lowest += low;
            highest += high;
        }
    }

    let bounds = Extrema {
        min: lowest / DIMENSION_COUNT as f64,
        max: highest / DIMENSION_COUNT as f64,
    };
    bounds.percentage(user_score)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::averages::BucketScores;

    fn user() -> IdentitySelection {
        IdentitySelection::from_labels([
            "18-24",
            "Other/would rather not say",
            "None",
            "Not employed",
            "Canada",
            "No",
            "Single",
            "No",
            "Life carries on as usual",
            "10",
            "10",
        ])
    }

    /// Each dimension holds only the user's bucket with the given value
    fn single_bucket_dataset(values: [f64; 11]) -> ProcessedDataset {
        let selection = user();
        let dims = Dimension::ALL
            .iter()
            .zip(values)
            .map(|(d, v)| BucketScores::from_entries([(selection.bucket(*d).to_string(), v)]))
            .collect();
        ProcessedDataset::new(dims).unwrap()
    }

    #[test]
    fn test_score_is_mean_of_selected_buckets() {
        let dataset = single_bucket_dataset([
            15.0, 10.0, 15.0, 20.0, 10.0, 5.0, 20.0, 5.0, 5.0, 25.0, 35.0,
        ]);

        assert_eq!(score(&user(), &dataset).unwrap(), 15.0);
    }

    #[test]
    fn test_score_unknown_bucket() {
        let dataset = single_bucket_dataset([0.0; 11]);
        let mut selection = user();
        selection.set_bucket(Dimension::Gender, "Male");

        assert!(matches!(
            score(&selection, &dataset),
            Err(PipelineError::UnknownBucket { .. })
        ));
    }

    #[test]
    fn test_set_age_uses_age_ranges() {
        let mut selection = user();

        selection.set_age(45).unwrap();
        assert_eq!(selection.bucket(Dimension::Age), "45-54");
        selection.set_age(44).unwrap();
        assert_eq!(selection.bucket(Dimension::Age), "35-44");
        selection.set_age(95).unwrap();
        assert_eq!(selection.bucket(Dimension::Age), "65+");
        assert!(selection.set_age(10).is_err());
    }

    #[test]
    fn test_set_isolation_counts() {
        let mut selection = user();
        assert_eq!(selection.bucket(Dimension::IsolationAdults), "10");

        selection.set_isolation_adults(30).unwrap();
        assert_eq!(selection.bucket(Dimension::IsolationAdults), "21-30");
        selection.set_isolation_children(0).unwrap();
        assert_eq!(selection.bucket(Dimension::IsolationChildren), "0");
        assert!(selection.set_isolation_children(500).is_err());
    }

    #[test]
    fn test_from_raw_matches_ingestion() {
        let schema = BucketSchema::default();
        let selection = IdentitySelection::from_raw(
            &schema,
            [
                "18",
                "Other or would rather not say",
                "None",
                "Not employed",
                "Canada",
                "no",
                "Single",
                "no",
                "Life carries on as usual",
                "10",
                "10",
            ],
        );

        assert_eq!(selection, user());
    }

    #[test]
    fn test_percentile_pins_selected_dimension() {
        // Age has two buckets; every other dimension spans [0, 11]
        let selection = user();
        let mut dims = vec![BucketScores::from_entries([("18-24", 11.0), ("25-34", 0.0)])];
        for d in &Dimension::ALL[1..] {
            dims.push(BucketScores::from_entries([
                (selection.bucket(*d).to_string(), 0.0),
                ("other".to_string(), 11.0),
            ]));
        }
        let dataset = ProcessedDataset::new(dims).unwrap();

        // Pinned age contributes 11 → low = 1.0, high = 11.0
        let p = percentile(&selection, 6.0, Dimension::Age, &dataset).unwrap();
        assert!((p - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_degenerate() {
        let dataset = single_bucket_dataset([1.0; 11]);

        assert!(matches!(
            percentile(&user(), 1.0, Dimension::Gender, &dataset),
            Err(PipelineError::DegenerateExtrema { .. })
        ));
    }
}
