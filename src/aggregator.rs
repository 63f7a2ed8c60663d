// 📊 Aggregator - Survey CSV → per-bucket (count, total) tallies
// One pass over the raw export: score every respondent, classify them on
// every identity dimension, and add the score to each chosen bucket.

use crate::config::InputEncoding;
use crate::error::{PipelineError, Result};
use crate::schema::{BucketSchema, Dimension, DIMENSION_COUNT, NA_BUCKET};
use crate::scoring::StressScorer;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

// ============================================================================
// TALLY TYPES
// ============================================================================

/// Running (respondent count, score total) for one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketTally {
    pub count: u64,
    pub total: f64,
}

impl BucketTally {
    pub fn new(count: u64, total: f64) -> Self {
        BucketTally { count, total }
    }

    /// The only way a tally changes: both halves move together
    pub fn add(&mut self, count: u64, score: f64) {
        self.count += count;
        self.total += score;
    }

    pub fn absorb(&mut self, other: BucketTally) {
        self.add(other.count, other.total);
    }
}

/// Ordered bucket → tally mapping for one dimension
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimensionTally {
    buckets: IndexMap<String, BucketTally>,
}

impl DimensionTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroed tally over the given buckets, in order
    pub fn with_buckets<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_entries(labels.into_iter().map(|l| (l, BucketTally::default())))
    }

    /// Tally from explicit entries; a repeated key keeps its first position
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, BucketTally)>,
        S: Into<String>,
    {
        let mut tally = DimensionTally::new();
        for (label, value) in entries {
            tally.buckets.entry(label.into()).or_default().absorb(value);
        }
        tally
    }

    /// Add one respondent's score. Returns false for an unknown bucket.
    pub fn add(&mut self, bucket: &str, score: f64) -> bool {
        match self.buckets.get_mut(bucket) {
            Some(tally) => {
                tally.add(1, score);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, bucket: &str) -> Option<&BucketTally> {
        self.buckets.get(bucket)
    }

    pub fn contains(&self, bucket: &str) -> bool {
        self.buckets.contains_key(bucket)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BucketTally)> {
        self.buckets.iter().map(|(label, tally)| (label.as_str(), tally))
    }

    pub fn tallies_mut(&mut self) -> impl Iterator<Item = &mut BucketTally> {
        self.buckets.values_mut()
    }

    /// Remove a bucket, keeping the order of the others
    pub fn remove(&mut self, bucket: &str) -> Option<BucketTally> {
        self.buckets.shift_remove(bucket)
    }

    /// Additively combine another tally over the same buckets.
    /// Buckets only present in `other` are appended.
    pub fn merge(&mut self, other: &DimensionTally) {
        for (label, tally) in &other.buckets {
            self.buckets.entry(label.clone()).or_default().absorb(*tally);
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn respondents(&self) -> u64 {
        self.buckets.values().map(|t| t.count).sum()
    }
}

/// One tally per dimension, in `Dimension::ALL` order
pub type SurveyTally = [DimensionTally; DIMENSION_COUNT];

/// Fresh accumulators: every canonical bucket plus a trailing "NA"
pub fn empty_tally(schema: &BucketSchema) -> SurveyTally {
    Dimension::ALL.map(|dimension| {
        DimensionTally::with_buckets(
            schema
                .labels(dimension)
                .iter()
                .copied()
                .chain(std::iter::once(NA_BUCKET)),
        )
    })
}

// ============================================================================
// INGEST STATS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Data rows read (header excluded)
    pub rows: u64,
    /// Scored questions left unanswered, summed over all rows
    pub unanswered_questions: u64,
    /// Respondents that fell into "NA", per dimension
    pub na_counts: [u64; DIMENSION_COUNT],
}

impl IngestStats {
    pub fn summary(&self) -> String {
        let na_total: u64 = self.na_counts.iter().sum();
        format!(
            "{} rows, {} unanswered questions, {} NA classifications",
            self.rows, self.unanswered_questions, na_total
        )
    }
}

// ============================================================================
// AGGREGATOR
// ============================================================================

pub struct Aggregator<'a> {
    scorer: &'a StressScorer,
    schema: &'a BucketSchema,
    tally: SurveyTally,
    stats: IngestStats,
}

impl<'a> Aggregator<'a> {
    pub fn new(scorer: &'a StressScorer, schema: &'a BucketSchema) -> Self {
        Aggregator {
            scorer,
            schema,
            tally: empty_tally(schema),
            stats: IngestStats::default(),
        }
    }

    /// Score and classify one respondent. Malformed fields land in "NA";
    /// a row is never rejected.
    pub fn add_row<S: AsRef<str>>(&mut self, row: &[S]) {
        let scored = self.scorer.score_with_stats(row);
        let buckets = self.schema.classify_row(row);

        for ((dimension_tally, bucket), na_count) in self
            .tally
            .iter_mut()
            .zip(buckets)
            .zip(self.stats.na_counts.iter_mut())
        {
            if bucket == NA_BUCKET || !dimension_tally.add(bucket, scored.total) {
                dimension_tally.add(NA_BUCKET, scored.total);
                *na_count += 1;
            }
        }

        self.stats.rows += 1;
        self.stats.unanswered_questions += scored.unanswered as u64;
    }

    pub fn finish(self) -> (SurveyTally, IngestStats) {
        (self.tally, self.stats)
    }

    /// Consume a CSV stream (header row first) into the aggregator
    pub fn read_csv<R: Read>(&mut self, reader: R, encoding: InputEncoding) -> Result<()> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut row: Vec<String> = Vec::new();
        for result in csv_reader.byte_records() {
            let record = result?;

            row.clear();
            row.extend(record.iter().map(|field| encoding.decode(field).into_owned()));
            self.add_row(&row);
        }

        Ok(())
    }
}

/// Aggregate a whole survey export from disk
pub fn aggregate_file(
    path: &Path,
    encoding: InputEncoding,
    scorer: &StressScorer,
    schema: &BucketSchema,
) -> Result<(SurveyTally, IngestStats)> {
    if !path.is_file() {
        return Err(PipelineError::NotFound {
            path: path.to_path_buf(),
        });
    }

    info!(path = %path.display(), "Aggregating survey responses");
    let file = File::open(path)?;

    let mut aggregator = Aggregator::new(scorer, schema);
    aggregator.read_csv(file, encoding)?;
    let (tally, stats) = aggregator.finish();

    for (dimension, na_count) in Dimension::ALL.iter().zip(stats.na_counts) {
        debug!(dimension = dimension.name(), na_count, "NA classifications");
    }
    info!(rows = stats.rows, "Aggregation complete: {}", stats.summary());

    Ok((tally, stats))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::QuestionSchema;

    /// Row with identity columns set and every scored answer at `answer`
    fn make_row(identity: &[(Dimension, &str)], answer: &str) -> Vec<String> {
        let mut row = vec![answer.to_string(); 150];
        for dimension in Dimension::ALL {
            row[dimension.column()] = "NA".to_string();
        }
        for (dimension, value) in identity {
            row[dimension.column()] = value.to_string();
        }
        row
    }

    #[test]
    fn test_bucket_tally_add() {
        let mut tally = BucketTally::default();
        tally.add(1, 2.5);
        tally.add(1, -1.0);

        assert_eq!(tally, BucketTally::new(2, 1.5));
    }

    #[test]
    fn test_dimension_tally_preserves_order() {
        let tally = DimensionTally::with_buckets(["b", "a", "NA"]);
        let labels: Vec<&str> = tally.iter().map(|(l, _)| l).collect();

        assert_eq!(labels, vec!["b", "a", "NA"]);
    }

    #[test]
    fn test_dimension_tally_unknown_bucket() {
        let mut tally = DimensionTally::with_buckets(["a"]);

        assert!(!tally.add("z", 1.0));
        assert!(tally.add("a", 1.0));
        assert_eq!(tally.get("a"), Some(&BucketTally::new(1, 1.0)));
    }

    #[test]
    fn test_dimension_tally_remove_keeps_order() {
        let mut tally = DimensionTally::with_buckets(["a", "NA", "b"]);

        assert_eq!(tally.remove("NA"), Some(BucketTally::default()));
        assert!(tally.add("b", 3.0));
        assert_eq!(tally.get("b"), Some(&BucketTally::new(1, 3.0)));
        assert_eq!(tally.remove("NA"), None);
        assert_eq!(tally.labels().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_dimension_tally_merge_is_additive() {
        let mut left = DimensionTally::from_entries([
            ("a", BucketTally::new(1, 1.0)),
            ("b", BucketTally::new(2, 2.0)),
        ]);
        let right = DimensionTally::from_entries([
            ("b", BucketTally::new(3, 3.0)),
            ("c", BucketTally::new(1, -1.0)),
        ]);
        left.merge(&right);

        assert_eq!(left.get("a"), Some(&BucketTally::new(1, 1.0)));
        assert_eq!(left.get("b"), Some(&BucketTally::new(5, 5.0)));
        assert_eq!(left.get("c"), Some(&BucketTally::new(1, -1.0)));
        assert_eq!(left.respondents(), 7);
        assert_eq!(left.labels().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_tally_has_na_last() {
        let schema = BucketSchema::default();
        let tally = empty_tally(&schema);

        for dimension in Dimension::ALL {
            let dim = &tally[dimension.index()];
            assert_eq!(dim.len(), schema.labels(dimension).len() + 1);
            assert_eq!(dim.labels().last(), Some(NA_BUCKET));
        }
    }

    #[test]
    fn test_add_row_counts_every_dimension_once() {
        let scorer = StressScorer::new(QuestionSchema::standard().unwrap());
        let schema = BucketSchema::default();
        let mut aggregator = Aggregator::new(&scorer, &schema);

        let row = make_row(
            &[
                (Dimension::Age, "30"),
                (Dimension::Gender, "Female"),
                (Dimension::Expatriate, "no"),
                (Dimension::IsolationAdults, "2"),
            ],
            "NA",
        );
        aggregator.add_row(&row);
        let (tally, stats) = aggregator.finish();

        assert_eq!(stats.rows, 1);
        for dim in &tally {
            assert_eq!(dim.respondents(), 1);
        }
        assert_eq!(tally[Dimension::Age.index()].get("25-34").unwrap().count, 1);
        assert_eq!(tally[Dimension::Expatriate.index()].get("No").unwrap().count, 1);
        assert_eq!(tally[Dimension::Education.index()].get(NA_BUCKET).unwrap().count, 1);
        // 4 identity columns classified, 7 fell into NA
        assert_eq!(stats.na_counts.iter().sum::<u64>(), 7);
        assert_eq!(stats.unanswered_questions, 104);
    }

    #[test]
    fn test_malformed_age_goes_to_na_not_abort() {
        let scorer = StressScorer::new(QuestionSchema::standard().unwrap());
        let schema = BucketSchema::default();
        let mut aggregator = Aggregator::new(&scorer, &schema);

        aggregator.add_row(&make_row(&[(Dimension::Age, "twenty")], "3"));
        aggregator.add_row(&make_row(&[(Dimension::Age, "20")], "3"));
        let (tally, stats) = aggregator.finish();

        let age = &tally[Dimension::Age.index()];
        assert_eq!(age.get(NA_BUCKET).unwrap().count, 1);
        assert_eq!(age.get("18-24").unwrap().count, 1);
        assert_eq!(stats.rows, 2);
    }

    #[test]
    fn test_score_added_to_bucket_total() {
        let schema_q = QuestionSchema::new(&[18..20], &[("g", 5, 2)], &[1, 1]).unwrap();
        let scorer = StressScorer::new(schema_q);
        let schema = BucketSchema::default();
        let mut aggregator = Aggregator::new(&scorer, &schema);

        // Both answers 5 → +2 each
        aggregator.add_row(&make_row(&[(Dimension::Gender, "Male")], "5"));
        aggregator.add_row(&make_row(&[(Dimension::Gender, "Male")], "1"));
        let (tally, _) = aggregator.finish();

        assert_eq!(
            tally[Dimension::Gender.index()].get("Male"),
            Some(&BucketTally::new(2, 0.0))
        );
    }

    #[test]
    fn test_read_csv_skips_header_and_decodes_latin1() {
        let scorer = StressScorer::new(QuestionSchema::new(&[], &[], &[]).unwrap());
        let schema = BucketSchema::default();
        let mut aggregator = Aggregator::new(&scorer, &schema);

        let mut data: Vec<u8> = Vec::new();
        data.extend_from_slice(b"a,b,c,d,age,gender,edu,x,emp,country\n");
        data.extend_from_slice(b"1,2,3,4,40,Male,None,x,Student,C\xf4te d\x92Ivoire\n");
        data.extend_from_slice(b"1,2,3,4,19\n");
        aggregator.read_csv(&data[..], InputEncoding::Latin1).unwrap();
        let (tally, stats) = aggregator.finish();

        assert_eq!(stats.rows, 2);
        let country = &tally[Dimension::CountryOfResidence.index()];
        assert_eq!(country.get("Côte d’Ivoire").unwrap().count, 1);
        assert_eq!(country.get(NA_BUCKET).unwrap().count, 1);
        assert_eq!(tally[Dimension::Age.index()].get("18-24").unwrap().count, 1);
    }

    #[test]
    fn test_aggregate_file_missing() {
        let scorer = StressScorer::new(QuestionSchema::standard().unwrap());
        let schema = BucketSchema::default();

        let result = aggregate_file(
            Path::new("/nonexistent/survey.csv"),
            InputEncoding::Latin1,
            &scorer,
            &schema,
        );
        assert!(matches!(result, Err(PipelineError::NotFound { .. })));
    }
}
