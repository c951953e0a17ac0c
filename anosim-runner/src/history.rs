//! Run history — JSONL append-only persistence.
//!
//! One JSON object per line: the run fingerprint plus the headline numbers.
//! Each line stands alone, so a partial write costs at most one entry.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use anosim_core::fingerprint::RunFingerprint;

use crate::runner::AnosimResult;

/// A single history entry: fingerprint + result snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub fingerprint: RunFingerprint,
    pub r_true: f64,
    pub permutations: u64,
    pub bigger: u64,
    pub p_value: f64,
}

impl From<&AnosimResult> for HistoryEntry {
    fn from(result: &AnosimResult) -> Self {
        Self {
            fingerprint: result.fingerprint.clone(),
            r_true: result.r_true,
            permutations: result.permutations,
            bigger: result.bigger,
            p_value: result.p_value,
        }
    }
}

/// JSONL history file manager.
pub struct RunHistory {
    path: PathBuf,
}

impl RunHistory {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append one entry, creating the file and its parent directory if needed.
    pub fn append(&self, entry: &HistoryEntry) -> io::Result<()> {
        let json = serde_json::to_string(entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        writeln!(file, "{json}")?;
        file.flush()
    }

    /// Read all entries. Malformed lines are skipped.
    pub fn read_all(&self) -> io::Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = io::BufReader::new(fs::File::open(&self.path)?);
        let mut entries = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if let Ok(entry) = serde_json::from_str::<HistoryEntry>(&line) {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
