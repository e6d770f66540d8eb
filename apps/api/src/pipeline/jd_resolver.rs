//! JD Resolver — produces job description text from pasted text or a posting URL.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{info, warn};

use crate::errors::PipelineError;
use crate::extraction::html::html_to_text;
use crate::models::analysis::{JobDescriptionInput, NormalizedText, TextOrigin};

/// Desktop browser identity; many job boards refuse obvious bot user agents.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Fetches the raw HTML of a page. One attempt per call.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, PipelineError>;
}

pub struct HttpPageFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, PipelineError> {
        let parsed = Url::parse(url)
            .map_err(|e| PipelineError::Fetch(format!("invalid URL '{url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PipelineError::Fetch(format!(
                "unsupported URL scheme '{}'",
                parsed.scheme()
            )));
        }

        info!("Fetching job description page: {url}");

        let response = self.client.get(parsed).send().await.map_err(|e| {
            if e.is_timeout() {
                PipelineError::Fetch(format!(
                    "request timed out after {}s",
                    self.timeout.as_secs()
                ))
            } else {
                PipelineError::Fetch(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Fetch(format!("HTTP error: {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| PipelineError::Fetch(format!("failed to read response body: {e}")))
    }
}

#[derive(Clone)]
pub struct JdResolver {
    fetcher: Arc<dyn PageFetcher>,
}

impl JdResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn resolve(&self, input: JobDescriptionInput) -> Result<NormalizedText, PipelineError> {
        match input {
            JobDescriptionInput::RawText(text) => NormalizedText::new(TextOrigin::Jd, text)
                .ok_or_else(|| {
                    PipelineError::InvalidInput("jd_text cannot be empty".to_string())
                }),
            JobDescriptionInput::SourceUrl(url) => {
                let html = self.fetcher.fetch(&url).await?;
                let text = html_to_text(&html);
                info!("Extracted {} chars of job description from {url}", text.len());

                NormalizedText::new(TextOrigin::Jd, text).ok_or_else(|| {
                    warn!("No readable text on {url}");
                    PipelineError::Extraction {
                        origin: TextOrigin::Jd,
                        message: format!(
                            "page at {url} has no readable text (it may require JavaScript)"
                        ),
                    }
                })
            }
        }
    }
}
