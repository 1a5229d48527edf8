use std::path::PathBuf;

pub fn default_version() -> u32 {
    1
}

pub fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

pub fn default_concurrency() -> usize {
    4
}

pub fn default_timeout_sec() -> u64 {
    120
}

pub fn default_launch_delay_ms() -> u64 {
    250
}

// Skeleton outline handed to the planner. The model may deviate from it.
pub fn default_report_structure() -> String {
    "\
(1) Introduction to the topic:
    * Brief overview of matter at hand
    * No research needed
(2) Main body sections:
    * Research needed
    * Each section should focus on a sub-topic that helps answer the user's question
(3) Conclusion or summary:
    * Should include key take-aways
    * No research needed
"
    .to_string()
}

pub fn default_planning_queries() -> usize {
    2
}

pub fn default_queries_per_section() -> usize {
    2
}

pub fn default_follow_up_queries() -> usize {
    2
}

/// Total search rounds allowed per section, counting the first. The grading
/// loop can never run more rounds than this, regardless of fail grades.
pub fn default_max_search_iterations() -> u32 {
    3
}

pub fn default_results_per_query() -> usize {
    2
}

pub fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub fn default_openai_model() -> String {
    "gpt-4.1".to_string()
}

pub fn default_temperature() -> f32 {
    0.0
}

pub fn default_tavily_base_url() -> String {
    "https://api.tavily.com".to_string()
}

pub fn default_max_attempts() -> u32 {
    3
}

pub fn default_backoff_base_ms() -> u64 {
    1000
}
