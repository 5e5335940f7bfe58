//! Per-dataset answer persistence.
//!
//! Each dataset set gets one JSON file mapping question id to the stored
//! attempt. Missing or corrupt files load as an empty map; the store is
//! rewritten wholesale on every save.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::quiz::UserResponse;

pub const STORAGE_KEY_PREFIX: &str = "manual_trader_quiz_answers_v2";

pub type AnswerMap = BTreeMap<String, UserResponse>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct AnswerStore {
    path: PathBuf,
}

impl AnswerStore {
    /// Store for `set` under `dir`
    pub fn new(dir: impl AsRef<Path>, set: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", storage_key(set))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails: unreadable data is logged and treated as empty.
    pub fn load(&self) -> AnswerMap {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No saved answers, starting fresh");
            return AnswerMap::new();
        }

        let raw: serde_json::Value = match self.read_raw() {
            Ok(v) => v,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read saved answers, starting fresh");
                return AnswerMap::new();
            }
        };

        let entries = match raw {
            serde_json::Value::Object(entries) => entries,
            other => {
                warn!(path = %self.path.display(), kind = %json_kind(&other), "Saved answers are not an object, starting fresh");
                return AnswerMap::new();
            }
        };

        let mut answers = AnswerMap::new();
        for (id, value) in entries {
            match serde_json::from_value::<UserResponse>(value) {
                Ok(response) if !response.breakdown.is_valid() => {
                    warn!(question = %id, breakdown = ?response.breakdown, "Dropping saved answer with impossible score");
                }
                Ok(response) => {
                    answers.insert(id, response);
                }
                Err(e) => warn!(question = %id, error = %e, "Dropping unreadable saved answer"),
            }
        }

        info!(path = %self.path.display(), count = answers.len(), "Loaded saved answers");
        answers
    }

    pub fn save(&self, answers: &AnswerMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&self.path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, answers)?;

        debug!(path = %self.path.display(), count = answers.len(), "Saved answers");
        Ok(())
    }

    fn read_raw(&self) -> Result<serde_json::Value, StoreError> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

pub fn storage_key(set: &str) -> String {
    format!("{}_{}", STORAGE_KEY_PREFIX, set)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
