use std::path::PathBuf;
use thiserror::Error;

#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum ReportsmithError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Planning error: {0}")]
    Plan(#[from] PlanError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Section build error: {0}")]
    Build(#[from] BuildError),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Concurrency limiter closed: {0}")]
    Limiter(#[from] tokio::sync::AcquireError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Missing required environment variable {0}")]
    MissingEnv(&'static str),
}

/// Failures of the generative model boundary. Transport variants carry enough
/// detail to tell a dead provider from a bad completion.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized - check API key")]
    Unauthorized,

    #[error("Rate limited - too many requests")]
    RateLimited,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("HTTP error ({0}): {1}")]
    Http(u16, String),

    #[error("Malformed completion: {0}")]
    MalformedResponse(String),

    #[error("Completion did not conform to the '{name}' schema: {detail}")]
    SchemaViolation { name: String, detail: String },

    #[error("Model returned an empty completion")]
    EmptyCompletion,
}

impl ModelError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ModelError::Timeout
                | ModelError::Connection(_)
                | ModelError::RateLimited
                | ModelError::ServerError(_, _)
        )
    }
}

/// Failures of the search provider boundary.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized - check API key")]
    Unauthorized,

    #[error("Rate limited - too many requests")]
    RateLimited,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("HTTP error ({0}): {1}")]
    Http(u16, String),

    #[error("Failed to parse search response: {0}")]
    MalformedResponse(String),
}

impl SearchError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SearchError::Timeout
                | SearchError::Connection(_)
                | SearchError::RateLimited
                | SearchError::ServerError(_, _)
        )
    }
}

/// The plan stage either yields a complete valid outline or fails as a whole;
/// no partial plan is ever emitted.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Planning failed: {0}")]
    Model(#[from] ModelError),

    #[error("Planning failed: seed search errored: {0}")]
    Search(#[from] SearchError),

    #[error("Planning failed: model proposed an empty outline")]
    EmptyPlan,

    #[error("Planning failed: duplicate section name '{0}' in proposed outline")]
    DuplicateSection(String),
}

/// A failure inside a single section builder or synthesis task, tagged with
/// the section name so the failing task is diagnosable from the top level.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Section '{section}': model call failed: {source}")]
    Model { section: String, source: ModelError },

    #[error("Section '{section}': search failed: {source}")]
    Search {
        section: String,
        source: SearchError,
    },
}

impl BuildError {
    pub fn section(&self) -> &str {
        match self {
            BuildError::Model { section, .. } => section,
            BuildError::Search { section, .. } => section,
        }
    }
}

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Planned section '{section}' has no finished content")]
    IncompleteMerge { section: String },
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create report directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to write report: {0}")]
    WriteReport(std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_names_its_section() {
        let err = BuildError::Model {
            section: "Background".to_string(),
            source: ModelError::EmptyCompletion,
        };
        assert_eq!(err.section(), "Background");
        assert!(err.to_string().contains("Background"));

        let err = BuildError::Search {
            section: "Approach".to_string(),
            source: SearchError::Timeout,
        };
        assert_eq!(err.section(), "Approach");
    }
}
