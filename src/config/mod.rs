mod defaults;
mod types;

pub use types::*;

use crate::error::ConfigError;
use defaults::*;
use std::path::Path;

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            report_dir: default_report_dir(),
            concurrency: default_concurrency(),
            timeout_sec: default_timeout_sec(),
            launch_delay_ms: default_launch_delay_ms(),
            report_structure: default_report_structure(),
            planning: PlanningConfig::default(),
            builder: BuilderConfig::default(),
            search: SearchConfig::default(),
            providers: ProvidersConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from a YAML file if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.planning.planning_queries == 0 {
            return Err(ConfigError::Invalid(
                "planning.planning_queries must be at least 1".to_string(),
            ));
        }
        if self.builder.queries_per_section == 0 {
            return Err(ConfigError::Invalid(
                "builder.queries_per_section must be at least 1".to_string(),
            ));
        }
        if self.builder.max_search_iterations == 0 {
            return Err(ConfigError::Invalid(
                "builder.max_search_iterations must be at least 1".to_string(),
            ));
        }
        if self.search.results_per_query == 0 {
            return Err(ConfigError::Invalid(
                "search.results_per_query must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
