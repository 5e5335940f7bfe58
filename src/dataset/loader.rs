use tracing::{info, warn};

use super::api::{DatasetError, DatasetSource};
use crate::quiz::{Dataset, Question};

/// Set key -> dataset file.
pub const DATASET_FILES: [(&str, &str); 3] = [
    ("10", "questions_10.json"),
    ("20", "questions_20.json"),
    ("30", "questions_30.json"),
];
pub const DEFAULT_SET: &str = "30";
pub const FALLBACK_FILE: &str = "questions.json";

/// Known set key, or the default set for anything else.
pub fn resolve_set(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|r| DATASET_FILES.iter().find(|(key, _)| *key == r.trim()))
        .map(|(key, _)| *key)
        .unwrap_or(DEFAULT_SET)
}

pub fn dataset_file(set: &str) -> &'static str {
    DATASET_FILES
        .iter()
        .find(|(key, _)| *key == set)
        .map(|(_, file)| *file)
        .unwrap_or(FALLBACK_FILE)
}

#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub set: String,
    /// The file that actually served the questions
    pub file_name: String,
    pub questions: Vec<Question>,
}

pub struct DatasetLoader {
    source: Box<dyn DatasetSource>,
}

impl DatasetLoader {
    pub fn new(source: Box<dyn DatasetSource>) -> Self {
        Self { source }
    }

    /// Load a set, falling back to `questions.json` once when the set's own
    /// file is unavailable. Parse failures are not retried.
    pub async fn load(&self, set: &str) -> Result<LoadedDataset, DatasetError> {
        let mut file_name = dataset_file(set);
        info!("📂 Loading dataset {} from {}", file_name, self.source.describe());

        let raw = match self.source.fetch(file_name).await {
            Ok(raw) => raw,
            Err(DatasetError::Unavailable { file, reason }) if file_name != FALLBACK_FILE => {
                warn!("⚠️ {} unavailable ({}), falling back to {}", file, reason, FALLBACK_FILE);
                file_name = FALLBACK_FILE;
                self.source.fetch(file_name).await?
            }
            Err(e) => return Err(e),
        };

        let dataset: Dataset = serde_json::from_str(&raw).map_err(|source| DatasetError::Parse {
            file: file_name.to_string(),
            source,
        })?;

        info!("✅ Loaded {} questions from {}", dataset.questions.len(), file_name);

        Ok(LoadedDataset {
            set: set.to_string(),
            file_name: file_name.to_string(),
            questions: dataset.questions,
        })
    }
}
