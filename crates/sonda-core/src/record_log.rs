//! JSONL logging of reported records for post-run inspection.
//!
//! Every run can append its records to `.sonda/records.jsonl`; the
//! `sonda records` command reads them back. This is a debugging aid, not
//! flow state — the runner itself retains nothing across runs.

use crate::report::{DisplayMode, FlowRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One logged record.
///
/// ```jsonl
/// {"ts":"2024-01-15T10:23:45Z","flow":"Listagem","title":"Login Realizado com Sucesso","success":true,"mode":"monitor","body":{...}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordEntry {
    /// RFC 3339 timestamp.
    pub ts: String,

    /// Flow the record belongs to.
    pub flow: String,

    /// Record title.
    pub title: String,

    /// Whether the step (or flow) succeeded.
    pub success: bool,

    /// Display mode the record was rendered under.
    pub mode: DisplayMode,

    /// The (already redacted) record body.
    pub body: Value,
}

impl RecordEntry {
    /// Creates an entry from a reported record.
    pub fn new(flow: impl Into<String>, record: &FlowRecord) -> Self {
        Self {
            ts: chrono::Utc::now().to_rfc3339(),
            flow: flow.into(),
            title: record.title.clone(),
            success: record.success,
            mode: record.mode,
            body: record.body.clone(),
        }
    }
}

/// Appends entries to a JSONL file.
pub struct RecordLog {
    path: PathBuf,
    file: Option<File>,
}

impl RecordLog {
    /// Default path for the record file.
    pub const DEFAULT_PATH: &'static str = ".sonda/records.jsonl";

    /// Creates a new log. The parent directory is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    /// Creates a log at the default path.
    pub fn default_path() -> Self {
        Self::new(Self::DEFAULT_PATH)
    }

    fn ensure_open(&mut self) -> std::io::Result<&mut File> {
        let file = match self.file.take() {
            Some(file) => file,
            None => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)?;
                }
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)?
            }
        };
        Ok(self.file.insert(file))
    }

    /// Appends one entry.
    pub fn log(&mut self, entry: &RecordEntry) -> std::io::Result<()> {
        let file = self.ensure_open()?;
        let json = serde_json::to_string(entry)?;
        writeln!(file, "{}", json)?;
        file.flush()?;
        debug!(flow = %entry.flow, title = %entry.title, "record logged");
        Ok(())
    }

    /// Returns the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reader for record history files.
pub struct RecordHistory {
    path: PathBuf,
}

impl RecordHistory {
    /// Creates a new history reader.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a reader for the default path.
    pub fn default_path() -> Self {
        Self::new(RecordLog::DEFAULT_PATH)
    }

    /// Returns true if the history file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads all entries. Malformed lines are skipped with a warning.
    pub fn read_all(&self) -> std::io::Result<Vec<RecordEntry>> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(line = line_num + 1, error = %e, "Failed to parse record entry");
                }
            }
        }

        Ok(entries)
    }

    /// Reads the last N entries.
    pub fn read_last(&self, n: usize) -> std::io::Result<Vec<RecordEntry>> {
        let all = self.read_all()?;
        let start = all.len().saturating_sub(n);
        Ok(all[start..].to_vec())
    }

    /// Reads entries for one flow.
    pub fn filter_by_flow(&self, flow: &str) -> std::io::Result<Vec<RecordEntry>> {
        let all = self.read_all()?;
        Ok(all.into_iter().filter(|r| r.flow == flow).collect())
    }

    /// Removes the record file.
    pub fn clear(&self) -> std::io::Result<()> {
        if self.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
