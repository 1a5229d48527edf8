//! Section builder: the bounded research loop behind every research section.
//!
//! Each research section runs query generation, web search, drafting, and
//! grading in rounds. A failing grade feeds follow-up queries into the next
//! round; the loop always terminates once the configured round budget is
//! spent, whatever the grader says.

use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::BuildError;
use crate::model::{generate_structured, Generator};
use crate::progress::ProgressSender;
use crate::prompts;
use crate::report::{Feedback, Grade, SearchQueries, Section};
use crate::search::{execute_searches, SearchProvider};

/// States of one section's research loop. `round` counts search rounds,
/// starting at 1; `Grade` decides between another `Search` and `Done`, and
/// `round >= max_search_iterations` forces `Done` whatever the verdict.
#[derive(Debug)]
enum BuilderState {
    GenerateQueries,
    Search { queries: Vec<String>, round: u32 },
    Write { context: String, round: u32 },
    Grade { round: u32 },
    Done,
}

/// Research and write one section, returning it with `content` filled in.
///
/// Errors carry the section name so a failure inside a parallel wave can be
/// attributed without unwinding the whole wave's state.
pub async fn build_section(
    model: &dyn Generator,
    search: &dyn SearchProvider,
    config: &Config,
    topic: &str,
    mut section: Section,
    progress: &ProgressSender,
) -> Result<Section, BuildError> {
    let max_rounds = config.builder.max_search_iterations;
    let mut state = BuilderState::GenerateQueries;

    loop {
        state = match state {
            BuilderState::GenerateQueries => {
                let queries = initial_queries(model, config, topic, &section).await?;
                progress.emit(
                    "generate_queries",
                    json!({"section": section.name, "queries": queries}),
                );
                BuilderState::Search { queries, round: 1 }
            }

            BuilderState::Search { queries, round } => {
                debug!(section = %section.name, round, ?queries, "Searching");
                let context = execute_searches(search, &queries, config.search.depth)
                    .await
                    .map_err(|source| BuildError::Search {
                        section: section.name.clone(),
                        source,
                    })?;
                progress.emit("search", json!({"section": section.name, "round": round}));
                BuilderState::Write { context, round }
            }

            BuilderState::Write { context, round } => {
                section.content = write_draft(model, topic, &section, &context).await?;
                progress.emit(
                    "write",
                    json!({"section": section.name, "content": section.content}),
                );
                BuilderState::Grade { round }
            }

            BuilderState::Grade { round } => {
                let feedback = grade_draft(model, config, topic, &section).await?;
                progress.emit(
                    "grade",
                    json!({"section": section.name, "grade": feedback.grade, "round": round}),
                );
                next_after_grade(&section.name, feedback, round, max_rounds)
            }

            BuilderState::Done => return Ok(section),
        };
    }
}

/// Pure transition out of the `Grade` state.
fn next_after_grade(section: &str, feedback: Feedback, round: u32, max_rounds: u32) -> BuilderState {
    match feedback.grade {
        Grade::Pass => {
            info!(section, round, "Section passed grading");
            BuilderState::Done
        }
        Grade::Fail if round >= max_rounds => {
            warn!(section, rounds = max_rounds, "Search budget spent, keeping last draft");
            BuilderState::Done
        }
        Grade::Fail => {
            let queries: Vec<String> = feedback
                .follow_up_queries
                .into_iter()
                .map(|q| q.search_query)
                .collect();
            if queries.is_empty() {
                warn!(section, "Grader failed section without follow-ups, keeping last draft");
                return BuilderState::Done;
            }
            BuilderState::Search {
                queries,
                round: round + 1,
            }
        }
    }
}

async fn initial_queries(
    model: &dyn Generator,
    config: &Config,
    topic: &str,
    section: &Section,
) -> Result<Vec<String>, BuildError> {
    let system = prompts::section_queries(topic, &section.description, config.builder.queries_per_section);
    let queries: SearchQueries =
        generate_structured(model, &system, prompts::SECTION_QUERIES_TASK, "SearchQueries")
            .await
            .map_err(|source| BuildError::Model {
                section: section.name.clone(),
                source,
            })?;
    Ok(queries.queries.into_iter().map(|q| q.search_query).collect())
}

async fn write_draft(
    model: &dyn Generator,
    topic: &str,
    section: &Section,
    context: &str,
) -> Result<String, BuildError> {
    let inputs = prompts::section_writer_inputs(
        topic,
        &section.name,
        &section.description,
        &section.content,
        context,
    );
    model
        .generate(&prompts::section_writer(), &inputs)
        .await
        .map_err(|source| BuildError::Model {
            section: section.name.clone(),
            source,
        })
}

async fn grade_draft(
    model: &dyn Generator,
    config: &Config,
    topic: &str,
    section: &Section,
) -> Result<Feedback, BuildError> {
    let system = prompts::section_grader(
        topic,
        &section.description,
        &section.content,
        config.builder.follow_up_queries,
    );
    generate_structured(model, &system, prompts::SECTION_GRADER_TASK, "Feedback")
        .await
        .map_err(|source| BuildError::Model {
            section: section.name.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ModelError, SearchError};
    use crate::search::{SearchDepth, SearchResult};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Model scripted per schema: grading verdicts are consumed in order,
    /// draft completions count how often writing happened.
    struct ScriptedModel {
        verdicts: Mutex<Vec<serde_json::Value>>,
        drafts: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(verdicts: Vec<serde_json::Value>) -> Self {
            Self {
                verdicts: Mutex::new(verdicts),
                drafts: AtomicUsize::new(0),
            }
        }

        fn draft_count(&self) -> usize {
            self.drafts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Generator for ScriptedModel {
        async fn generate(&self, _system: &str, user: &str) -> Result<String, ModelError> {
            let n = self.drafts.fetch_add(1, Ordering::SeqCst) + 1;
            assert!(user.contains("CLEANED CONTENT") && user.contains("<SOURCE MATERIAL>"));
            Ok(format!("draft v{}", n))
        }

        async fn generate_json(
            &self,
            _system: &str,
            _user: &str,
            schema_name: &str,
            _schema: &serde_json::Value,
        ) -> Result<serde_json::Value, ModelError> {
            match schema_name {
                "SearchQueries" => Ok(json!({
                    "queries": [{"search_query": "alpha"}, {"search_query": "beta"}]
                })),
                "Feedback" => {
                    let mut verdicts = self.verdicts.lock().unwrap();
                    assert!(!verdicts.is_empty(), "grader called more times than scripted");
                    Ok(verdicts.remove(0))
                }
                other => Err(ModelError::SchemaViolation {
                    name: other.to_string(),
                    detail: "unexpected schema".to_string(),
                }),
            }
        }
    }

    struct CountingSearch {
        calls: AtomicUsize,
    }

    impl CountingSearch {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for CountingSearch {
        async fn search(
            &self,
            queries: &[String],
            _depth: SearchDepth,
        ) -> Result<Vec<SearchResult>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(queries
                .iter()
                .map(|q| SearchResult {
                    title: q.clone(),
                    url: format!("https://example.com/{}", q),
                    content: format!("findings for {}", q),
                    score: 0.9,
                    raw_content: None,
                })
                .collect())
        }
    }

    fn research_section() -> Section {
        Section {
            name: "Background".to_string(),
            description: "History and context".to_string(),
            research: true,
            content: String::new(),
        }
    }

    fn pass() -> serde_json::Value {
        json!({"grade": "pass", "follow_up_queries": []})
    }

    fn fail() -> serde_json::Value {
        json!({"grade": "fail", "follow_up_queries": [{"search_query": "narrower"}]})
    }

    #[tokio::test]
    async fn test_pass_on_first_round_stops_immediately() {
        let model = ScriptedModel::new(vec![pass()]);
        let search = CountingSearch::new();

        let section = build_section(
            &model,
            &search,
            &Config::default(),
            "topic",
            research_section(),
            &ProgressSender::disabled(),
        )
        .await
        .unwrap();

        assert_eq!(section.content, "draft v1");
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        assert_eq!(model.draft_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_fail_pass_runs_exactly_three_rounds() {
        let model = ScriptedModel::new(vec![fail(), fail(), pass()]);
        let search = CountingSearch::new();

        let section = build_section(
            &model,
            &search,
            &Config::default(),
            "topic",
            research_section(),
            &ProgressSender::disabled(),
        )
        .await
        .unwrap();

        assert_eq!(section.content, "draft v3");
        assert_eq!(search.calls.load(Ordering::SeqCst), 3);
        assert_eq!(model.draft_count(), 3);
    }

    #[tokio::test]
    async fn test_round_budget_bounds_perpetual_failures() {
        // More fail verdicts than the budget allows; only 3 may be consumed.
        let model = ScriptedModel::new(vec![fail(), fail(), fail(), fail(), fail()]);
        let search = CountingSearch::new();

        let section = build_section(
            &model,
            &search,
            &Config::default(),
            "topic",
            research_section(),
            &ProgressSender::disabled(),
        )
        .await
        .unwrap();

        assert_eq!(section.content, "draft v3");
        assert_eq!(search.calls.load(Ordering::SeqCst), 3);
        assert_eq!(model.verdicts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fail_without_follow_ups_keeps_last_draft() {
        let model = ScriptedModel::new(vec![json!({"grade": "fail", "follow_up_queries": []})]);
        let search = CountingSearch::new();

        let section = build_section(
            &model,
            &search,
            &Config::default(),
            "topic",
            research_section(),
            &ProgressSender::disabled(),
        )
        .await
        .unwrap();

        assert_eq!(section.content, "draft v1");
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchProvider for FailingSearch {
        async fn search(
            &self,
            _queries: &[String],
            _depth: SearchDepth,
        ) -> Result<Vec<SearchResult>, SearchError> {
            Err(SearchError::RateLimited)
        }
    }

    #[test]
    fn test_grade_transitions() {
        let feedback = |v: serde_json::Value| serde_json::from_value::<Feedback>(v).unwrap();

        // Pass ends the loop on any round.
        assert!(matches!(
            next_after_grade("s", feedback(pass()), 1, 3),
            BuilderState::Done
        ));

        // Fail with budget remaining re-enters Search with the follow-ups.
        match next_after_grade("s", feedback(fail()), 1, 3) {
            BuilderState::Search { queries, round } => {
                assert_eq!(queries, vec!["narrower".to_string()]);
                assert_eq!(round, 2);
            }
            other => panic!("expected Search, got {:?}", other),
        }

        // Fail on the final round terminates regardless of follow-ups.
        assert!(matches!(
            next_after_grade("s", feedback(fail()), 3, 3),
            BuilderState::Done
        ));

        // Fail with nothing left to search terminates.
        assert!(matches!(
            next_after_grade(
                "s",
                feedback(json!({"grade": "fail", "follow_up_queries": []})),
                1,
                3
            ),
            BuilderState::Done
        ));
    }

    #[tokio::test]
    async fn test_search_failure_names_the_section() {
        let model = ScriptedModel::new(vec![]);

        let result = build_section(
            &model,
            &FailingSearch,
            &Config::default(),
            "topic",
            research_section(),
            &ProgressSender::disabled(),
        )
        .await;

        match result {
            Err(BuildError::Search { section, .. }) => assert_eq!(section, "Background"),
            other => panic!("expected search failure, got {:?}", other),
        }
    }
}
