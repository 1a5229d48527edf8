//! Tavily Search API client.

use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{SearchDepth, SearchProvider, SearchResult};
use crate::config::{RetryConfig, TavilyConfig};
use crate::error::{ConfigError, SearchError};
use crate::retry::retry_with_backoff;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct TavilyClient {
    api_key: String,
    client: Client,
    base_url: String,
    timeout: Duration,
    retry: RetryConfig,
    max_results: usize,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>, config: &TavilyConfig) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryConfig::default(),
            max_results: 2,
        }
    }

    /// Create from the TAVILY_API_KEY environment variable.
    pub fn from_env(config: &TavilyConfig) -> Result<Self, ConfigError> {
        let api_key = std::env::var("TAVILY_API_KEY")
            .map_err(|_| ConfigError::MissingEnv("TAVILY_API_KEY"))?;
        Ok(Self::new(api_key, config))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Results requested per individual query.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    async fn search_one(
        &self,
        query: &str,
        depth: SearchDepth,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let request = TavilyRequest {
            query: query.to_string(),
            search_depth: depth.as_str().to_string(),
            max_results: self.max_results,
            include_raw_content: true,
        };

        let response = retry_with_backoff(&self.retry, || self.post_search(&request)).await?;

        debug!(query, results = response.results.len(), "Search completed");

        Ok(response
            .results
            .into_iter()
            .map(|r| SearchResult {
                title: r.title,
                url: r.url,
                content: r.content,
                score: r.score,
                raw_content: r.raw_content,
            })
            .collect())
    }

    async fn post_search(&self, request: &TavilyRequest) -> Result<TavilyResponse, SearchError> {
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else if e.is_connect() {
                    SearchError::Connection(e.to_string())
                } else {
                    SearchError::Network(e.to_string())
                }
            })?;

        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| SearchError::MalformedResponse(e.to_string()));
        }

        let error_text = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 => Err(SearchError::Unauthorized),
            429 => Err(SearchError::RateLimited),
            400 => Err(SearchError::BadRequest(error_text)),
            500..=599 => Err(SearchError::ServerError(status.as_u16(), error_text)),
            _ => Err(SearchError::Http(status.as_u16(), error_text)),
        }
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(
        &self,
        queries: &[String],
        depth: SearchDepth,
    ) -> Result<Vec<SearchResult>, SearchError> {
        // One in-flight request per query
        let searches = queries.iter().map(|q| self.search_one(q, depth));
        let batches = try_join_all(searches).await?;
        Ok(batches.into_iter().flatten().collect())
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest {
    query: String,
    search_depth: String,
    max_results: usize,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    content: String,
    score: f64,
    #[serde(default)]
    raw_content: Option<String>,
}
