use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::api::{DatasetError, DatasetSource};

/// Fetches dataset files relative to an HTTP base URL
pub struct HttpSource {
    http_client: Client,
    base_url: Url,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self, DatasetError> {
        // join() drops the last path segment unless the base ends with '/'
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };

        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self {
            http_client,
            base_url,
        })
    }
}

#[async_trait]
impl DatasetSource for HttpSource {
    async fn fetch(&self, file_name: &str) -> Result<String, DatasetError> {
        let url = self.base_url.join(file_name)?;
        debug!("Fetching dataset {}", url);

        let transport = |source| DatasetError::Transport {
            file: file_name.to_string(),
            source,
        };

        let response = self
            .http_client
            .get(url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(DatasetError::Unavailable {
                file: file_name.to_string(),
                reason: format!("status {}", response.status()),
            });
        }

        response.text().await.map_err(transport)
    }

    fn describe(&self) -> String {
        self.base_url.to_string()
    }
}
