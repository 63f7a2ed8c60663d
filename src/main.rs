use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use survey_anxiety::{
    compute_extrema, load, percentile, score, BucketSchema, Dimension, IdentitySelection,
    IngestOutcome, Pipeline, PipelineConfig, DIMENSION_COUNT, NA_BUCKET,
};

/// Survey anxiety pipeline - ingest the raw export once, then query scores
#[derive(Parser)]
#[command(name = "survey-anxiety")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON config file (flags and environment override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the processed dataset snapshot from the raw CSV
    Ingest {
        /// Raw survey CSV
        #[arg(long, env = "SURVEY_INPUT")]
        input: Option<PathBuf>,

        #[command(flatten)]
        snapshot: SnapshotArg,

        /// Rebuild even if the snapshot already exists
        #[arg(long)]
        force: bool,
    },
    /// Print the lowest and highest reachable composite score
    Extrema {
        #[command(flatten)]
        snapshot: SnapshotArg,
    },
    /// Score one respondent profile against the snapshot
    Score {
        #[command(flatten)]
        snapshot: SnapshotArg,

        #[command(flatten)]
        profile: Profile,

        /// Also print the percentile within this dimension's selected bucket
        #[arg(long)]
        dimension: Option<Dimension>,
    },
}

#[derive(Args)]
struct SnapshotArg {
    /// Processed dataset snapshot (JSON)
    #[arg(long = "snapshot", env = "SURVEY_SNAPSHOT")]
    path: Option<PathBuf>,
}

#[derive(Args)]
struct Profile {
    #[arg(long)]
    age: u32,
    #[arg(long)]
    gender: String,
    #[arg(long)]
    education: String,
    #[arg(long)]
    employment: String,
    #[arg(long)]
    country: String,
    #[arg(long)]
    expat: String,
    #[arg(long)]
    marital: String,
    #[arg(long)]
    risk_group: String,
    #[arg(long)]
    situation: String,
    /// People isolating with you, adults
    #[arg(long)]
    adults: u32,
    /// People isolating with you, children
    #[arg(long)]
    children: u32,
}

impl Profile {
    fn selection(&self, schema: &BucketSchema) -> Result<IdentitySelection> {
        let age = self.age.to_string();
        let adults = self.adults.to_string();
        let children = self.children.to_string();
        let raw: [&str; DIMENSION_COUNT] = [
            &age,
            &self.gender,
            &self.education,
            &self.employment,
            &self.country,
            &self.expat,
            &self.marital,
            &self.risk_group,
            &self.situation,
            &adults,
            &children,
        ];

        let selection = IdentitySelection::from_raw(schema, raw);
        for dimension in Dimension::ALL {
            if selection.bucket(dimension) == NA_BUCKET {
                bail!(
                    "{:?} is not a known {} answer",
                    raw[dimension.index()],
                    dimension
                );
            }
        }
        Ok(selection)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Ingest {
            input,
            snapshot,
            force,
        } => run_ingest(config, input, snapshot.path, force),
        Commands::Extrema { snapshot } => run_extrema(config, snapshot.path),
        Commands::Score {
            snapshot,
            profile,
            dimension,
        } => run_score(config, snapshot.path, &profile, dimension),
    }
}

fn run_ingest(
    mut config: PipelineConfig,
    input: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    force: bool,
) -> Result<()> {
    if let Some(input) = input {
        config = config.with_input_path(input);
    }
    if let Some(snapshot) = snapshot {
        config = config.with_snapshot_path(snapshot);
    }

    let pipeline = Pipeline::from_config(&config)?;

    println!("📂 Ingesting {}", config.input_path.display());
    let result = if force {
        pipeline
            .rebuild(&config.input_path, &config.snapshot_path)
            .map(IngestOutcome::Fresh)
    } else {
        pipeline.ingest(&config.input_path, &config.snapshot_path)
    };
    let outcome =
        result.with_context(|| format!("Failed to ingest {}", config.input_path.display()))?;

    match outcome {
        IngestOutcome::Cached { snapshot } => {
            println!("✓ Snapshot already present: {}", snapshot.display());
            println!("   Use --force to rebuild it.");
        }
        IngestOutcome::Fresh(report) => {
            println!("✓ {}", report.stats.summary());
            println!("✓ Snapshot written: {}", report.snapshot.display());
            println!("✓ Completed at {}", report.completed_at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
    }
    Ok(())
}

fn run_extrema(config: PipelineConfig, snapshot: Option<PathBuf>) -> Result<()> {
    let path = snapshot.unwrap_or(config.snapshot_path);
    let dataset =
        load(&path).with_context(|| format!("Failed to load snapshot {}", path.display()))?;

    let extrema = compute_extrema(&dataset)?;
    println!("min: {}", extrema.min);
    println!("max: {}", extrema.max);
    Ok(())
}

fn run_score(
    config: PipelineConfig,
    snapshot: Option<PathBuf>,
    profile: &Profile,
    dimension: Option<Dimension>,
) -> Result<()> {
    let path = snapshot.unwrap_or_else(|| config.snapshot_path.clone());
    let dataset =
        load(&path).with_context(|| format!("Failed to load snapshot {}", path.display()))?;

    let pipeline = Pipeline::from_config(&config)?;
    let selection = profile.selection(pipeline.schema())?;

    let anxiety = score(&selection, &dataset)?;
    let extrema = compute_extrema(&dataset)?;
    println!("score: {}", anxiety);
    println!("scale: {:.1}%", extrema.percentage(anxiety)?);

    if let Some(dimension) = dimension {
        let rank = percentile(&selection, anxiety, dimension, &dataset)?;
        println!(
            "percentile among {} = {}: {:.1}%",
            dimension,
            selection.bucket(dimension),
            rank
        );
    }
    Ok(())
}
