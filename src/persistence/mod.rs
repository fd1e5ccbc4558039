//! Append-only feedback log.
//!
//! The log is a single pretty-printed JSON array of [`FeedbackEntry`] records.
//! Each submission reads the current array, appends one entry and replaces the
//! file through a temporary sibling and a rename, all while holding the sink's
//! mutex. A failed submission leaves the previous log untouched.

use crate::error::{AppError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub id: Uuid,
    pub text: String,
    /// RFC 3339, UTC, millisecond precision.
    pub timestamp: String,
}

impl FeedbackEntry {
    pub fn new(text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

pub struct FeedbackSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FeedbackSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record `text` with a fresh id and the current time.
    pub fn submit(&self, text: &str) -> Result<FeedbackEntry> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| AppError::StorageError("feedback log lock poisoned".to_string()))?;

        let mut entries = read_log(&self.path)?;
        let entry = FeedbackEntry::new(text, Utc::now());
        entries.push(entry.clone());
        write_log(&self.path, &entries)?;

        tracing::info!(
            id = %entry.id,
            total = entries.len(),
            path = %self.path.display(),
            "Feedback recorded"
        );
        metrics::counter!("feedback_entries_total").increment(1);

        Ok(entry)
    }

    /// Current contents of the log, oldest first.
    pub fn entries(&self) -> Result<Vec<FeedbackEntry>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| AppError::StorageError("feedback log lock poisoned".to_string()))?;
        read_log(&self.path)
    }
}

/// A missing file is an empty log; anything unparsable is an error.
fn read_log(path: &Path) -> Result<Vec<FeedbackEntry>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Feedback log does not exist yet");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(AppError::StorageError(format!(
                "failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&raw).map_err(|e| {
        AppError::StorageError(format!("existing log {} is corrupt: {}", path.display(), e))
    })
}

fn write_log(path: &Path, entries: &[FeedbackEntry]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| {
        AppError::StorageError(format!("failed to create {}: {}", dir.display(), e))
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "feedback.json".to_string());
    let tmp_path = dir.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    let written = write_tmp(&tmp_path, entries).and_then(|_| {
        fs::rename(&tmp_path, path).map_err(|e| {
            AppError::StorageError(format!("failed to replace {}: {}", path.display(), e))
        })
    });

    if written.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    written
}

fn write_tmp(tmp_path: &Path, entries: &[FeedbackEntry]) -> Result<()> {
    let file = File::create(tmp_path).map_err(|e| {
        AppError::StorageError(format!("failed to create {}: {}", tmp_path.display(), e))
    })?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, entries)
        .map_err(|e| AppError::StorageError(format!("failed to encode feedback log: {}", e)))?;

    writer
        .flush()
        .map_err(|e| AppError::StorageError(format!("failed to flush feedback log: {}", e)))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| AppError::StorageError(format!("failed to sync feedback log: {}", e)))
}
