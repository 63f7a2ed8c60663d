// 📏 Scale Normalizer
// Maps a 1-indexed Likert answer on an N-point scale onto [-2, +2]
//
//   contribution = (raw - 1) * (4 / (N - 1)) - 2

use crate::error::{PipelineError, Result};

/// Marker the survey export writes for a question that was not answered
pub const NOT_ANSWERED: &str = "NA";

/// Lower bound of a normalized contribution
pub const CONTRIBUTION_MIN: f64 = -2.0;

/// Upper bound of a normalized contribution
pub const CONTRIBUTION_MAX: f64 = 2.0;

/// An N-point Likert scale (N >= 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikertScale {
    size: u32,
}

impl LikertScale {
    /// Create a scale, rejecting sizes that cannot be interpolated
    pub fn new(size: u32) -> Result<Self> {
        if size < 2 {
            return Err(PipelineError::InvalidScale { size });
        }
        Ok(LikertScale { size })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Normalize a numeric answer.
    ///
    /// Returns `None` when `raw` falls outside `1..=N`. The export uses codes
    /// such as `99` for "does not apply", which count as unanswered.
    pub fn contribution(&self, raw: u32) -> Option<f64> {
        if raw < 1 || raw > self.size {
            return None;
        }
        // Multiply before dividing so both endpoints land exactly on ±2
        let span = f64::from(self.size - 1);
        Some(f64::from(raw - 1) * (CONTRIBUTION_MAX - CONTRIBUTION_MIN) / span + CONTRIBUTION_MIN)
    }

    /// Normalize a raw CSV field.
    ///
    /// `"NA"`, empty fields, non-integers and out-of-range values are all
    /// absent answers: they contribute nothing, not zero.
    pub fn read(&self, field: &str) -> Option<f64> {
        let field = field.trim();
        if field.is_empty() || field == NOT_ANSWERED {
            return None;
        }
        field.parse::<u32>().ok().and_then(|raw| self.contribution(raw))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_single_point_scale() {
        assert!(matches!(
            LikertScale::new(1),
            Err(PipelineError::InvalidScale { size: 1 })
        ));
        assert!(LikertScale::new(0).is_err());
        assert!(LikertScale::new(2).is_ok());
    }

    #[test]
    fn test_five_point_scale_endpoints_and_midpoint() {
        let scale = LikertScale::new(5).unwrap();

        assert_eq!(scale.contribution(1), Some(-2.0));
        assert_eq!(scale.contribution(3), Some(0.0));
        assert_eq!(scale.contribution(5), Some(2.0));
    }

    #[test]
    fn test_eleven_point_scale_step() {
        let scale = LikertScale::new(11).unwrap();

        let step = scale.contribution(2).unwrap() - scale.contribution(1).unwrap();
        assert!((step - 0.4).abs() < 1e-12);
        assert_eq!(scale.contribution(11), Some(2.0));
    }

    #[test]
    fn test_out_of_range_is_unanswered() {
        let scale = LikertScale::new(6).unwrap();

        assert_eq!(scale.contribution(0), None);
        assert_eq!(scale.contribution(7), None);
        assert_eq!(scale.read("99"), None);
    }

    #[test]
    fn test_read_sentinel_and_garbage() {
        let scale = LikertScale::new(6).unwrap();

        assert_eq!(scale.read("NA"), None);
        assert_eq!(scale.read(""), None);
        assert_eq!(scale.read("three"), None);
        assert_eq!(scale.read("-1"), None);
        assert_eq!(scale.read(" 6 "), Some(2.0));
    }
}
