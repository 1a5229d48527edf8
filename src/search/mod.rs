//! Search gateway: parallel query execution, URL dedup, and context
//! formatting for the writer prompts.

mod tavily;

pub use tavily::TavilyClient;

use crate::error::SearchError;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw page content beyond this many characters is cut and marked.
pub const MAX_RAW_CONTENT_CHARS: usize = 10_000;
pub const TRUNCATION_MARKER: &str = "... [truncated at 10000 chars]";

const SOURCE_SEPARATOR_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    /// Fast search with snippet-level results.
    #[default]
    Basic,
    /// More thorough, slower search.
    Advanced,
}

impl SearchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        }
    }
}

/// One source returned by the provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    /// Provider-cleaned snippet.
    pub content: String,
    /// Relevance score (0-1).
    pub score: f64,
    /// Full page content, if the provider returned it.
    pub raw_content: Option<String>,
}

/// Boundary to the external search provider. Implementations run the queries
/// in parallel and return the flattened result list.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        queries: &[String],
        depth: SearchDepth,
    ) -> Result<Vec<SearchResult>, SearchError>;
}

/// Run the queries and render the deduplicated results as one context blob.
pub async fn execute_searches(
    provider: &dyn SearchProvider,
    queries: &[String],
    depth: SearchDepth,
) -> Result<String, SearchError> {
    let results = provider.search(queries, depth).await?;
    Ok(format_search_results(&results))
}

/// Format results into the source-material string fed to the writer.
/// Duplicate URLs collapse to a single entry (last occurrence wins, first
/// occurrence's position is kept); raw content is capped with a marker.
pub fn format_search_results(results: &[SearchResult]) -> String {
    let mut order: Vec<&str> = Vec::new();
    let mut by_url: HashMap<&str, &SearchResult> = HashMap::new();
    for result in results {
        if by_url.insert(result.url.as_str(), result).is_none() {
            order.push(result.url.as_str());
        }
    }

    let separator = "-".repeat(SOURCE_SEPARATOR_WIDTH);
    let mut formatted = String::from("CONTENT FROM SOURCES:\n\n");

    for url in order {
        let source = by_url[url];
        formatted.push_str(&format!("{}\n", separator));
        formatted.push_str(&format!("SOURCE TITLE: {}\n", source.title));
        formatted.push_str(&format!("URL: {}\n", source.url));
        formatted.push_str(&format!("CLEANED CONTENT: {}", source.content));

        let raw = source.raw_content.as_deref().unwrap_or("");
        let raw = truncate_raw_content(raw);

        formatted.push_str(&format!("RAW CONTENT: {}\n\n", raw));
        formatted.push_str(&format!("{}\n\n", separator));
    }

    formatted.trim().to_string()
}

fn truncate_raw_content(raw: &str) -> String {
    if raw.chars().count() > MAX_RAW_CONTENT_CHARS {
        let cut: String = raw.chars().take(MAX_RAW_CONTENT_CHARS).collect();
        format!("{}{}", cut, TRUNCATION_MARKER)
    } else {
        raw.to_string()
    }
}
