use crate::errors::GuideError;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// Raw guide payload plus the length the server announced, if any
#[derive(Debug, Clone, Default)]
pub struct FetchedDocument {
    pub body: Vec<u8>,
    pub expected_len: Option<u64>,
}

/// Fetch-by-URL capability consumed by ingestion.
///
/// Retries, redirects and authentication belong to the implementation.
pub trait DocumentSource: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedDocument, GuideError>> + Send;
}

/// HTTP(S) source backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn from_config(config: &crate::config::AppConfig) -> Self {
        Self::new(
            &config.user_agent,
            Duration::from_secs(config.request_timeout_secs),
        )
    }
}

impl DocumentSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, GuideError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GuideError::Http(url.to_string(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GuideError::HttpStatus(status.as_u16(), url.to_string()));
        }

        let expected_len = response.content_length();
        let body = response
            .bytes()
            .await
            .map_err(|e| GuideError::Http(url.to_string(), e.to_string()))?;

        Ok(FetchedDocument {
            body: body.to_vec(),
            expected_len,
        })
    }
}

/// In-memory documents keyed by URL. Unknown URLs answer 404.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: HashMap<String, FetchedDocument>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`, announcing its real length
    pub fn with_document(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        let expected_len = Some(body.len() as u64);
        self.documents
            .insert(url.to_string(), FetchedDocument { body, expected_len });
        self
    }

    /// Serve `body` at `url` without a length hint (chunked responses)
    pub fn with_unsized_document(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(
            url.to_string(),
            FetchedDocument {
                body: body.into(),
                expected_len: None,
            },
        );
        self
    }
}

impl DocumentSource for StaticSource {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, GuideError> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| GuideError::HttpStatus(404, url.to_string()))
    }
}
