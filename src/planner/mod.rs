//! Plan stage: seed research, then a structured section outline.
//!
//! The stage either returns a complete, validated plan or fails as a whole;
//! a schema-nonconformant completion or a broken seed search never yields a
//! partial outline.

use std::collections::HashSet;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::PlanError;
use crate::model::{generate_structured, Generator};
use crate::prompts;
use crate::report::{SearchQueries, Section, SectionPlan};
use crate::search::{execute_searches, SearchDepth, SearchProvider};

/// Produce the ordered section outline for a topic.
///
/// 1. Ask the model for seed search queries scoped to the topic and the
///    configured report structure.
/// 2. Run them through the search gateway for planning context.
/// 3. Ask the model for the structured plan, carrying any prior feedback.
///
/// The returned order is canonical: the compile stage reassembles the final
/// document in exactly this order no matter when tasks finish.
pub async fn plan_report(
    model: &dyn Generator,
    search: &dyn SearchProvider,
    config: &Config,
    topic: &str,
    feedback: Option<&str>,
) -> Result<Vec<Section>, PlanError> {
    let num_queries = config.planning.planning_queries;

    let system = prompts::planner_queries(topic, &config.report_structure, num_queries);
    let queries: SearchQueries =
        generate_structured(model, &system, prompts::PLANNER_QUERIES_TASK, "SearchQueries").await?;

    let query_texts: Vec<String> = queries.queries.into_iter().map(|q| q.search_query).collect();
    debug!(?query_texts, "Planning queries generated");

    let seed_context = execute_searches(search, &query_texts, SearchDepth::Basic).await?;

    let system = prompts::planner(
        topic,
        &config.report_structure,
        &seed_context,
        feedback.unwrap_or(""),
    );
    let plan: SectionPlan =
        generate_structured(model, &system, prompts::PLANNER_TASK, "SectionPlan").await?;

    validate_plan(&plan.sections)?;

    info!(
        sections = plan.sections.len(),
        research = plan.sections.iter().filter(|s| s.research).count(),
        "Report plan ready"
    );

    Ok(plan.sections)
}

/// Section names are merge keys, so the outline must be non-empty and free of
/// duplicates.
fn validate_plan(sections: &[Section]) -> Result<(), PlanError> {
    if sections.is_empty() {
        return Err(PlanError::EmptyPlan);
    }

    let mut seen = HashSet::new();
    for section in sections {
        if !seen.insert(section.name.as_str()) {
            return Err(PlanError::DuplicateSection(section.name.clone()));
        }
    }
    Ok(())
}
