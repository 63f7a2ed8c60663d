// ⚖️ NA Reconciliation - fold the "NA" bucket back into known buckets
//
// Policy per dimension:
//   NA total != 0  →  every other bucket absorbs the FULL NA (count, total)
//   NA total == 0  →  NA is dropped, nothing is redistributed
//
// The NA mass is copied into each bucket, not split proportionally, and the
// decision looks at the score total only (never the count).

use crate::aggregator::{DimensionTally, SurveyTally};
use crate::schema::{Dimension, NA_BUCKET};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// RECONCILIATION RESULT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NaResolution {
    /// No NA bucket was present
    Clean,

    /// NA had a zero total and was discarded
    Dropped { count: u64 },

    /// NA mass was added to every other bucket
    Redistributed {
        count: u64,
        total: f64,
        recipients: usize,
    },
}

impl NaResolution {
    pub fn is_redistributed(&self) -> bool {
        matches!(self, NaResolution::Redistributed { .. })
    }
}

// ============================================================================
// RECONCILER
// ============================================================================

/// Remove the NA bucket from one dimension's tally
pub fn reconcile_na(mut tally: DimensionTally) -> (DimensionTally, NaResolution) {
    let Some(na) = tally.remove(NA_BUCKET) else {
        return (tally, NaResolution::Clean);
    };

    if na.total == 0.0 {
        return (tally, NaResolution::Dropped { count: na.count });
    }

    for bucket in tally.tallies_mut() {
        bucket.absorb(na);
    }
    let recipients = tally.len();

    (
        tally,
        NaResolution::Redistributed {
            count: na.count,
            total: na.total,
            recipients,
        },
    )
}

/// Reconcile every dimension of a survey tally
pub fn reconcile_all(tally: SurveyTally) -> (SurveyTally, Vec<NaResolution>) {
    let mut resolutions = Vec::with_capacity(tally.len());

    let reconciled = tally.map(|dimension_tally| {
        let (clean, resolution) = reconcile_na(dimension_tally);
        resolutions.push(resolution);
        clean
    });

    for (dimension, resolution) in Dimension::ALL.iter().zip(&resolutions) {
        debug!(dimension = dimension.name(), ?resolution, "NA reconciled");
    }

    (reconciled, resolutions)
}

// ============================================================================
// TESTS
// ============================================================================
