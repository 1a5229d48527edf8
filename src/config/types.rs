use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;
use crate::search::SearchDepth;

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory finished reports are written to.
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    /// Max section tasks in flight per fan-out wave.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout for model and search calls.
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,

    /// Stagger between task launches to avoid burst rate limits.
    #[serde(default = "default_launch_delay_ms")]
    pub launch_delay_ms: u64,

    /// Outline template the planner is steered with.
    #[serde(default = "default_report_structure")]
    pub report_structure: String,

    #[serde(default)]
    pub planning: PlanningConfig,

    #[serde(default)]
    pub builder: BuilderConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct PlanningConfig {
    /// Seed search queries generated before the outline is planned.
    #[serde(default = "default_planning_queries")]
    pub planning_queries: usize,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            planning_queries: default_planning_queries(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct BuilderConfig {
    /// Search queries generated for a section's first research round.
    #[serde(default = "default_queries_per_section")]
    pub queries_per_section: usize,

    /// Follow-up queries requested from the grader on a fail grade.
    #[serde(default = "default_follow_up_queries")]
    pub follow_up_queries: usize,

    /// Hard cap on search rounds per section, counting the first.
    #[serde(default = "default_max_search_iterations")]
    pub max_search_iterations: u32,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            queries_per_section: default_queries_per_section(),
            follow_up_queries: default_follow_up_queries(),
            max_search_iterations: default_max_search_iterations(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct SearchConfig {
    /// Results requested per individual query.
    #[serde(default = "default_results_per_query")]
    pub results_per_query: usize,

    /// Depth for section research searches. Planning always searches basic.
    #[serde(default)]
    pub depth: SearchDepth,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            results_per_query: default_results_per_query(),
            depth: SearchDepth::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: OpenAiConfig,

    #[serde(default)]
    pub tavily: TavilyConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_openai_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct TavilyConfig {
    #[serde(default = "default_tavily_base_url")]
    pub base_url: String,
}

impl Default for TavilyConfig {
    fn default() -> Self {
        Self {
            base_url: default_tavily_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}
