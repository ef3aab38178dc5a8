//! JSON Lines data directory backing the dashboard.
//!
//! Every collection is a file under one directory. Missing files read as
//! empty collections and malformed lines are skipped with a warning, so a
//! half-written or hand-edited log never takes the dashboard down.

pub mod records;
pub mod tasks;

use crate::error::{StoreError, StoreResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub use records::LoggedPromptAnalysis;

pub const TASKS_FILE: &str = "tasks.jsonl";
pub const PROMPTS_FILE: &str = "prompts.jsonl";
pub const SESSIONS_FILE: &str = "sessions.jsonl";
pub const TODOS_FILE: &str = "todos.jsonl";
pub const REPOS_FILE: &str = "github-repos.json";
pub const CRON_JOBS_FILE: &str = "cron-jobs.json";

/// Handle to the data directory.
///
/// Cheap to clone. Reads go straight to disk on every call; appends are
/// serialized through a shared lock so concurrent writers never interleave
/// partial lines.
#[derive(Debug, Clone)]
pub struct DataStore {
    dir: PathBuf,
    append_lock: Arc<Mutex<()>>,
}

impl DataStore {
    /// Open the store rooted at `dir`. The directory is created on first append.
    pub fn open<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            append_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Read every decodable record from a JSON Lines file.
    pub(crate) fn read_jsonl<T: DeserializeOwned>(&self, file: &str) -> StoreResult<Vec<T>> {
        let path = self.path(file);
        let Some(content) = read_optional(&path)? else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for (idx, line) in content.split(|b| *b == b'\n').enumerate() {
            let line = line.trim_ascii();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_slice(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    file = %path.display(),
                    line = idx + 1,
                    error = %e,
                    "Skipping malformed record"
                ),
            }
        }
        debug!(file = %path.display(), count = records.len(), "Read records");
        Ok(records)
    }

    /// Read a whole-file JSON document, falling back to the default when the
    /// file is missing or does not decode.
    pub(crate) fn read_json<T: DeserializeOwned + Default>(&self, file: &str) -> StoreResult<T> {
        let path = self.path(file);
        let Some(content) = read_optional(&path)? else {
            return Ok(T::default());
        };

        match serde_json::from_slice(&content) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Ignoring malformed document");
                Ok(T::default())
            }
        }
    }

    /// Append one record as a single newline-terminated JSON line.
    pub(crate) fn append_jsonl<T: Serialize>(&self, file: &str, record: &T) -> StoreResult<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let path = self.path(file);
        let _guard = self.append_lock.lock().unwrap_or_else(|p| p.into_inner());
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        handle
            .write_all(line.as_bytes())
            .map_err(|e| StoreError::io(&path, e))?;
        Ok(())
    }
}

/// Raw file bytes; decoding happens per record so one bad line cannot hide the rest.
fn read_optional(path: &Path) -> StoreResult<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}
