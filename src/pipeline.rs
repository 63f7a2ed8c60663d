// 🔄 Pipeline - fresh vs cached
//
//   fresh:  CSV → aggregate → reconcile NA → average → snapshot
//   cached: snapshot exists → read it, never touch the CSV
//
// The snapshot is only written once every earlier step has succeeded.

use crate::aggregator::{aggregate_file, IngestStats};
use crate::averages::{average_all, ProcessedDataset};
use crate::config::{InputEncoding, PipelineConfig};
use crate::error::Result;
use crate::reconciliation::{reconcile_all, NaResolution};
use crate::rules::LabelNormalizer;
use crate::schema::BucketSchema;
use crate::scoring::{QuestionSchema, StressScorer};
use crate::snapshot;
use anyhow::Context as AnyhowContext;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// OUTCOME TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct IngestReport {
    pub input: PathBuf,
    pub snapshot: PathBuf,
    pub stats: IngestStats,
    pub resolutions: Vec<NaResolution>,
    pub completed_at: DateTime<Utc>,
}

impl IngestReport {
    pub fn summary(&self) -> String {
        let redistributed = self
            .resolutions
            .iter()
            .filter(|r| r.is_redistributed())
            .count();
        format!(
            "Ingested {} → {} at {}: {}, NA redistributed in {} of {} dimensions",
            self.input.display(),
            self.snapshot.display(),
            self.completed_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.stats.summary(),
            redistributed,
            self.resolutions.len()
        )
    }
}

#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// Snapshot already existed; nothing was read or written
    Cached { snapshot: PathBuf },

    /// Raw dataset was processed and the snapshot written
    Fresh(IngestReport),
}

impl IngestOutcome {
    pub fn is_cached(&self) -> bool {
        matches!(self, IngestOutcome::Cached { .. })
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct Pipeline {
    scorer: StressScorer,
    schema: BucketSchema,
    encoding: InputEncoding,
}

impl Pipeline {
    pub fn new(scorer: StressScorer, schema: BucketSchema, encoding: InputEncoding) -> Self {
        Pipeline {
            scorer,
            schema,
            encoding,
        }
    }

    /// Standard question layout, standard label rules, Latin-1 input
    pub fn standard() -> Result<Self> {
        Ok(Pipeline::new(
            StressScorer::new(QuestionSchema::standard()?),
            BucketSchema::default(),
            InputEncoding::Latin1,
        ))
    }

    /// Pipeline honoring the config's encoding and extra rules file
    pub fn from_config(config: &PipelineConfig) -> anyhow::Result<Self> {
        let mut normalizer = LabelNormalizer::standard();
        if let Some(rules_path) = &config.rules_path {
            let extra = LabelNormalizer::from_file(rules_path)?;
            for rule in extra.rules() {
                normalizer.add_rule(rule.clone());
            }
            info!(rules = extra.rule_count(), "Loaded extra normalization rules");
        }

        let scorer = StressScorer::new(
            QuestionSchema::standard().context("Built-in question schema is invalid")?,
        );
        Ok(Pipeline::new(
            scorer,
            BucketSchema::new(normalizer),
            config.input_encoding,
        ))
    }

    pub fn schema(&self) -> &BucketSchema {
        &self.schema
    }

    /// Run the fresh path in memory, without writing anything
    pub fn process(
        &self,
        input: &Path,
    ) -> Result<(ProcessedDataset, IngestStats, Vec<NaResolution>)> {
        let (tally, stats) = aggregate_file(input, self.encoding, &self.scorer, &self.schema)?;
        let (reconciled, resolutions) = reconcile_all(tally);
        Ok((average_all(&reconciled), stats, resolutions))
    }

    /// Process `input` into `output` unless `output` already exists
    pub fn ingest(&self, input: &Path, output: &Path) -> Result<IngestOutcome> {
        if output.is_file() {
            info!(snapshot = %output.display(), "Snapshot present, skipping ingestion");
            return Ok(IngestOutcome::Cached {
                snapshot: output.to_path_buf(),
            });
        }
        self.rebuild(input, output).map(IngestOutcome::Fresh)
    }

    /// Process `input` into `output`, replacing any existing snapshot
    pub fn rebuild(&self, input: &Path, output: &Path) -> Result<IngestReport> {
        let (dataset, stats, resolutions) = self.process(input)?;
        snapshot::write(output, &dataset)?;

        let report = IngestReport {
            input: input.to_path_buf(),
            snapshot: output.to_path_buf(),
            stats,
            resolutions,
            completed_at: Utc::now(),
        };
        info!("{}", report.summary());
        Ok(report)
    }
}

// ============================================================================
// FREE-FUNCTION API
// ============================================================================

/// Read a processed dataset snapshot
pub fn load(path: &Path) -> Result<ProcessedDataset> {
    snapshot::read(path)
}

/// Write the snapshot for `input` at `output` if it does not exist yet
pub fn ingest(input: &Path, output: &Path) -> Result<IngestOutcome> {
    Pipeline::standard()?.ingest(input, output)
}

// ============================================================================
// TESTS
// ============================================================================
