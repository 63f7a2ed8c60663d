// 🧮 Stress Scorer
// Folds every scored Likert answer of one respondent into a single scalar.
//
// The scored questions live in fixed contiguous column ranges. Their
// concatenation is cut into groups that share a scale size, and every
// question carries a polarity: +1 raises stress, -1 lowers it, 0 is skipped
// but still consumes its slot.

use crate::error::{PipelineError, Result};
use crate::scale::LikertScale;
use std::ops::Range;

// ============================================================================
// STATIC QUESTION TABLES
// ============================================================================

/// Column ranges holding scored answers, in reading order
pub const ANSWER_COLUMNS: [Range<usize>; 4] = [21..54, 70..109, 110..136, 137..144];

/// (instrument, scale size, question count), in reading order
pub const QUESTION_GROUPS: [(&str, u32, usize); 12] = [
    ("Scale_PSS10_UCLA", 5, 10),
    ("Scale_PSS10_UCLA", 5, 3),
    ("OECD_people", 11, 2),
    ("OECD_institutions", 11, 6),
    ("Corona_concerns", 6, 5),
    ("Trust_countrymeasure", 11, 1),
    ("Compliance", 6, 6),
    ("BFF_15", 6, 15),
    ("Expl_Distress", 6, 25),
    ("SPS", 6, 10),
    ("SPS", 6, 15),
    ("SPS", 6, 6),
];

/// One entry per question across all groups
#[rustfmt::skip]
pub const QUESTION_POLARITY: [i8; 104] = [
    // Scale_PSS10_UCLA
    1, 1, 1, -1, -1, 1, -1, -1, 1, 1,
    1, 1, 1,
    // OECD_people
    -1, -1,
    // OECD_institutions
    -1, -1, -1, -1, -1, -1,
    // Corona_concerns
    1, 1, 1, 1, 1,
    // Trust_countrymeasure
    -1,
    // Compliance
    -1, 0, 0, 1, -1, 1,
    // BFF_15
    1, 1, -1, 0, 0, 0, 0, 0, 0, 0, 1, 0, -1, 0, 0,
    // Expl_Distress
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    // SPS
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    1, 1, 1, 1, 1, -1,
];

// ============================================================================
// SCHEMA TYPES
// ============================================================================

/// Direction a question pushes the stress score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Raises,
    Lowers,
    Ignored,
}

impl Polarity {
    pub fn from_sign(sign: i8) -> Result<Self> {
        match sign {
            1 => Ok(Polarity::Raises),
            -1 => Ok(Polarity::Lowers),
            0 => Ok(Polarity::Ignored),
            other => Err(PipelineError::InvalidSchema(format!(
                "polarity must be -1, 0 or 1, got {}",
                other
            ))),
        }
    }

    pub fn factor(&self) -> f64 {
        match self {
            Polarity::Raises => 1.0,
            Polarity::Lowers => -1.0,
            Polarity::Ignored => 0.0,
        }
    }
}

/// A scored question bound to its CSV column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuestionSlot {
    pub column: usize,
    pub scale: LikertScale,
    pub polarity: Polarity,
}

/// Validated question layout: column ranges × groups × polarity
#[derive(Debug, Clone)]
pub struct QuestionSchema {
    slots: Vec<QuestionSlot>,
}

impl QuestionSchema {
    /// Build a schema from raw tables.
    ///
    /// Groups consume columns in order; trailing columns beyond the last
    /// group are ignored. Fails if a scale has fewer than two points, if
    /// there are more questions than columns, or if the polarity vector does
    /// not have one entry per question.
    pub fn new(
        columns: &[Range<usize>],
        groups: &[(&str, u32, usize)],
        polarity: &[i8],
    ) -> Result<Self> {
        let question_count: usize = groups.iter().map(|(_, _, count)| count).sum();
        if polarity.len() != question_count {
            return Err(PipelineError::InvalidSchema(format!(
                "{} polarity entries for {} questions",
                polarity.len(),
                question_count
            )));
        }

        let column_count: usize = columns.iter().map(|r| r.len()).sum();
        if question_count > column_count {
            return Err(PipelineError::InvalidSchema(format!(
                "{} questions but only {} answer columns",
                question_count, column_count
            )));
        }

        let mut column_iter = columns.iter().flat_map(|r| r.clone());
        let mut signs = polarity.iter();
        let mut slots = Vec::with_capacity(question_count);

        for (_, size, count) in groups {
            let scale = LikertScale::new(*size)?;
            for _ in 0..*count {
                // Both lengths were checked above
                let (Some(column), Some(sign)) = (column_iter.next(), signs.next()) else {
                    break;
                };
                slots.push(QuestionSlot {
                    column,
                    scale,
                    polarity: Polarity::from_sign(*sign)?,
                });
            }
        }

        Ok(QuestionSchema { slots })
    }

    /// The COVIDiSTRESS question layout
    pub fn standard() -> Result<Self> {
        Self::new(&ANSWER_COLUMNS, &QUESTION_GROUPS, &QUESTION_POLARITY)
    }

    pub fn slots(&self) -> &[QuestionSlot] {
        &self.slots
    }

    pub fn question_count(&self) -> usize {
        self.slots.len()
    }
}

// ============================================================================
// STRESS SCORER
// ============================================================================

/// Score of one respondent plus how many questions were skipped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowScore {
    pub total: f64,
    pub unanswered: usize,
}

pub struct StressScorer {
    schema: QuestionSchema,
}

impl StressScorer {
    pub fn new(schema: QuestionSchema) -> Self {
        StressScorer { schema }
    }

    pub fn schema(&self) -> &QuestionSchema {
        &self.schema
    }

    /// Stress score of one row (sum, not average)
    pub fn score<S: AsRef<str>>(&self, row: &[S]) -> f64 {
        self.score_with_stats(row).total
    }

    /// Stress score of one row, counting unanswered questions.
    ///
    /// A row that ends before a question's column treats that question as
    /// unanswered.
    pub fn score_with_stats<S: AsRef<str>>(&self, row: &[S]) -> RowScore {
        let mut total = 0.0;
        let mut unanswered = 0;

        for slot in &self.schema.slots {
            let answer = row
                .get(slot.column)
                .and_then(|field| slot.scale.read(field.as_ref()));

            match answer {
                Some(value) => total += value * slot.polarity.factor(),
                None => unanswered += 1,
            }
        }

        RowScore { total, unanswered }
    }
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: flipping every polarity in a group negates its contribution.
        #[test]
        fn flipping_polarity_negates_group(
            answers in proptest::collection::vec(prop_oneof![
                (1u32..=6).prop_map(|v| v.to_string()),
                Just("NA".to_string()),
            ], 6),
            signs in proptest::collection::vec(-1i8..=1, 6),
        ) {
            let flipped: Vec<i8> = signs.iter().map(|s| -s).collect();
            let original = StressScorer::new(
                QuestionSchema::new(&[0..6], &[("g", 6, 6)], &signs).unwrap());
            let negated = StressScorer::new(
                QuestionSchema::new(&[0..6], &[("g", 6, 6)], &flipped).unwrap());

            prop_assert!((original.score(&answers) + negated.score(&answers)).abs() < 1e-9);
        }

        /// Property: reordering answers within a group with uniform polarity
        /// leaves the score unchanged.
        #[test]
        fn uniform_group_is_order_insensitive(
            mut answers in proptest::collection::vec((1u32..=5).prop_map(|v| v.to_string()), 5),
        ) {
            let scorer = StressScorer::new(
                QuestionSchema::new(&[0..5], &[("g", 5, 5)], &[1; 5]).unwrap());
            let before = scorer.score(&answers);
            answers.reverse();

            prop_assert!((before - scorer.score(&answers)).abs() < 1e-9);
        }
    }
}
