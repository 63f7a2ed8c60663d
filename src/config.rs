// ⚙️ Pipeline Configuration
// File locations and input decoding, loadable from JSON with defaults

use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT_PATH: &str = "data/COVIDiSTRESS June 17.csv";
pub const DEFAULT_SNAPSHOT_PATH: &str = "data/real_data.json";

// ============================================================================
// INPUT ENCODING
// ============================================================================

/// Byte encoding of the raw survey export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputEncoding {
    /// ISO-8859-1: every byte is the code point of the same value
    #[default]
    #[serde(alias = "iso-8859-1")]
    Latin1,
    /// UTF-8, invalid sequences replaced with U+FFFD
    Utf8,
}

impl InputEncoding {
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        match self {
            InputEncoding::Latin1 => {
                if bytes.is_ascii() {
                    // ASCII is valid UTF-8 and identical under Latin-1
                    Cow::Borrowed(std::str::from_utf8(bytes).unwrap_or_default())
                } else {
                    Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
                }
            }
            InputEncoding::Utf8 => String::from_utf8_lossy(bytes),
        }
    }
}

// ============================================================================
// PIPELINE CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raw survey CSV
    pub input_path: PathBuf,

    /// Processed dataset snapshot (JSON)
    pub snapshot_path: PathBuf,

    /// Encoding of `input_path`
    pub input_encoding: InputEncoding,

    /// Optional extra label-normalization rules (JSON list)
    pub rules_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            input_encoding: InputEncoding::Latin1,
            rules_path: None,
        }
    }
}

impl PipelineConfig {
    /// Load config from JSON file; missing keys take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    pub fn with_input_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.input_path = path.into();
        self
    }

    pub fn with_snapshot_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.snapshot_path = path.into();
        self
    }
}

// ============================================================================
// TESTS
// ============================================================================
