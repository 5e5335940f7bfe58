use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    /// The file could not be fetched. Triggers the fallback file once.
    #[error("{file} unavailable: {reason}")]
    Unavailable { file: String, reason: String },

    #[error("request for {file} failed: {source}")]
    Transport {
        file: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid base url: {0}")]
    Url(#[from] url::ParseError),

    #[error("{file} is not a valid dataset: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Fetch the raw JSON text of one dataset file
    async fn fetch(&self, file_name: &str) -> Result<String, DatasetError>;

    /// Human readable origin, for logs
    fn describe(&self) -> String;
}
