use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use super::api::{DatasetError, DatasetSource};

/// Reads dataset files from a local directory
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DatasetSource for DirSource {
    async fn fetch(&self, file_name: &str) -> Result<String, DatasetError> {
        let path = self.root.join(file_name);
        debug!("Reading dataset file {}", path.display());

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| DatasetError::Unavailable {
                file: file_name.to_string(),
                reason: e.to_string(),
            })
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirSource::new(dir.path());
        let err = source.fetch("questions_30.json").await.unwrap_err();
        assert!(matches!(err, DatasetError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("questions.json"), "{\"questions\":[]}").unwrap();
        let source = DirSource::new(dir.path());
        assert_eq!(source.fetch("questions.json").await.unwrap(), "{\"questions\":[]}");
    }
}
