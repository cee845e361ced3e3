//! Snapshot recorder.
//!
//! Persists every sampled world document as its own file so sessions can be
//! replayed or turned into training data later.
//!
//! # Storage layout
//!
//! One file per event, flat in the configured directory:
//!
//! | name | content |
//! |------|---------|
//! | `data_<local ISO timestamp, ':' → '-'>.json` | pretty-printed JSON |
//! | `data_<local ISO timestamp, ':' → '-'>.yaml` | block-style YAML |
//!
//! # Example
//!
//! ```rust
//! use craftpilot_memory::recorder::{RecordFormat, SnapshotRecorder};
//!
//! let dir = std::env::temp_dir().join("craftpilot-doc-recorder");
//! let recorder = SnapshotRecorder::new(&dir, RecordFormat::Json);
//! let path = recorder.record(&serde_json::json!({ "biome": "minecraft:plains" })).unwrap();
//! assert!(path.file_name().unwrap().to_string_lossy().starts_with("data_"));
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use craftpilot_types::CraftError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors that can arise while persisting a document.
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML encoding failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<RecorderError> for CraftError {
    fn from(e: RecorderError) -> Self {
        CraftError::Persistence(e.to_string())
    }
}

/// On-disk encoding of recorded documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    Json,
    #[default]
    Yaml,
}

impl RecordFormat {
    pub fn extension(self) -> &'static str {
        match self {
            RecordFormat::Json => "json",
            RecordFormat::Yaml => "yaml",
        }
    }
}

/// Writes one timestamped file per recorded document.
#[derive(Debug, Clone)]
pub struct SnapshotRecorder {
    dir: PathBuf,
    format: RecordFormat,
}

impl SnapshotRecorder {
    /// Recorder writing into `dir`.  The directory is created on first write.
    pub fn new(dir: impl AsRef<Path>, format: RecordFormat) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> RecordFormat {
        self.format
    }

    /// File name for a document recorded at `at`, e.g.
    /// `data_2024-05-01T12-30-00.250000.yaml`.
    pub fn file_name(at: NaiveDateTime, format: RecordFormat) -> String {
        let stamp = at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string().replace(':', "-");
        format!("data_{stamp}.{}", format.extension())
    }

    /// Persist `document`, stamped with the current local time.
    pub fn record<T: Serialize + ?Sized>(&self, document: &T) -> Result<PathBuf, RecorderError> {
        self.record_at(document, Local::now().naive_local())
    }

    /// Persist `document` under the name derived from `at`.
    pub fn record_at<T: Serialize + ?Sized>(
        &self,
        document: &T,
        at: NaiveDateTime,
    ) -> Result<PathBuf, RecorderError> {
        fs::create_dir_all(&self.dir)?;
        let body = match self.format {
            RecordFormat::Json => serde_json::to_string_pretty(document)?,
            RecordFormat::Yaml => serde_yaml::to_string(document)?,
        };
        let path = self.dir.join(Self::file_name(at, self.format));
        fs::write(&path, body)?;
        debug!(path = %path.display(), "recorded snapshot");
        Ok(path)
    }
}
