// 💾 Snapshot Store - the processed dataset as a flat JSON file
//
// Shape: a JSON array of eleven objects, one per dimension, keys in bucket
// order. Written UTF-8. Writes go through a sibling temp file and a rename,
// so a reader sees either the complete snapshot or none at all.

use crate::averages::{BucketScores, ProcessedDataset};
use crate::error::{PipelineError, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Encode a dataset as snapshot JSON
pub fn serialize(dataset: &ProcessedDataset) -> Result<String> {
    Ok(serde_json::to_string(dataset)?)
}

/// Decode snapshot JSON; anything but eleven mappings is rejected
pub fn deserialize(text: &str) -> Result<ProcessedDataset> {
    let dimensions: Vec<BucketScores> = serde_json::from_str(text)?;
    ProcessedDataset::new(dimensions)
}

/// Read a snapshot from disk
pub fn read(path: &Path) -> Result<ProcessedDataset> {
    if !path.is_file() {
        return Err(PipelineError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path)?;
    let dimensions: Vec<BucketScores> = serde_json::from_reader(BufReader::new(file))?;
    let dataset = ProcessedDataset::new(dimensions)?;

    debug!(path = %path.display(), "Snapshot loaded");
    Ok(dataset)
}

/// Write a snapshot atomically, replacing any existing file
pub fn write(path: &Path, dataset: &ProcessedDataset) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let staging = staging_path(path);
    let result = write_staged(&staging, dataset)
        .and_then(|()| fs::rename(&staging, path).map_err(PipelineError::from));

    if result.is_err() {
        // Leave no partial file behind
        let _ = fs::remove_file(&staging);
    } else {
        info!(path = %path.display(), "Snapshot written");
    }
    result
}

fn write_staged(staging: &Path, dataset: &ProcessedDataset) -> Result<()> {
    let mut writer = BufWriter::new(File::create(staging)?);
    serde_json::to_writer(&mut writer, dataset)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "snapshot".into());
    name.push(".partial");
    path.with_file_name(name)
}

// ============================================================================
// TESTS
// ============================================================================
