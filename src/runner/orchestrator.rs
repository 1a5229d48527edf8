//! Two-wave fan-out over the report plan.
//!
//! Wave one runs the research sections through the section builder; wave two
//! writes the synthesis sections from the merged research. Tasks inside a
//! wave run concurrently under a semaphore, but a wave never starts before
//! the previous one has fully merged. The final document is compiled in plan
//! order, independent of task completion order.

use crate::builder::build_section;
use crate::config::Config;
use crate::error::{CompileError, ReportsmithError};
use crate::model::Generator;
use crate::planner::plan_report;
use crate::progress::ProgressSender;
use crate::report::Section;
use crate::search::SearchProvider;
use crate::synthesis::synthesize_section;
use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::json;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::info;

#[derive(Debug)]
pub struct RunReport {
    pub topic: String,
    /// Finished sections in plan order.
    pub sections: Vec<Section>,
    pub document: String,
    pub total_duration: Duration,
}

impl RunReport {
    pub fn research_count(&self) -> usize {
        self.sections.iter().filter(|s| s.research).count()
    }
}

pub struct Orchestrator {
    config: Config,
    model: Arc<dyn Generator>,
    search: Arc<dyn SearchProvider>,
    semaphore: Arc<Semaphore>,
}

impl Orchestrator {
    pub fn new(config: Config, model: Arc<dyn Generator>, search: Arc<dyn SearchProvider>) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.concurrency));
        Self {
            config,
            model,
            search,
            semaphore,
        }
    }

    /// Generate a full report for `topic`.
    ///
    /// The wave futures are driven by this call rather than detached onto the
    /// runtime, so dropping the returned future cancels every in-flight model
    /// and search request. The first task failure aborts the run the same way.
    pub async fn run(
        &self,
        topic: &str,
        feedback: Option<&str>,
        progress: &ProgressSender,
    ) -> Result<RunReport, ReportsmithError> {
        let start = std::time::Instant::now();

        let plan = plan_report(
            self.model.as_ref(),
            self.search.as_ref(),
            &self.config,
            topic,
            feedback,
        )
        .await?;
        progress.emit("plan", json!({"sections": plan}));

        let (research, synthesis): (Vec<Section>, Vec<Section>) =
            plan.iter().cloned().partition(|s| s.research);

        info!(
            research = research.len(),
            synthesis = synthesis.len(),
            concurrency = self.config.concurrency,
            "Plan accepted, starting research wave"
        );

        let launch_delay = Duration::from_millis(self.config.launch_delay_ms);
        let mut finished: HashMap<String, Section> = HashMap::new();

        let wave = FuturesUnordered::new();
        for (idx, section) in research.into_iter().enumerate() {
            wave.push(self.build_task(topic, section, launch_delay * idx as u32, progress));
        }
        drain_wave(wave, &mut finished).await?;

        // Research is fully merged; synthesis tasks read it in plan order.
        let research_done: Vec<Section> = plan
            .iter()
            .filter(|s| s.research)
            .filter_map(|s| finished.get(&s.name).cloned())
            .collect();

        info!(synthesis = synthesis.len(), "Research wave merged, starting synthesis wave");

        let wave = FuturesUnordered::new();
        for (idx, section) in synthesis.into_iter().enumerate() {
            wave.push(self.synthesis_task(
                topic,
                section,
                &research_done,
                launch_delay * idx as u32,
                progress,
            ));
        }
        drain_wave(wave, &mut finished).await?;

        let document = compile_document(&plan, &finished)?;
        progress.emit("compile", json!({"chars": document.len()}));

        let sections = plan
            .iter()
            .filter_map(|s| finished.remove(&s.name))
            .collect();

        Ok(RunReport {
            topic: topic.to_string(),
            sections,
            document,
            total_duration: start.elapsed(),
        })
    }

    async fn build_task(
        &self,
        topic: &str,
        section: Section,
        delay: Duration,
        progress: &ProgressSender,
    ) -> Result<Section, ReportsmithError> {
        // Stagger launches to avoid burst rate limits.
        if delay > Duration::ZERO {
            sleep(delay).await;
        }
        let _permit = self.semaphore.clone().acquire_owned().await?;
        Ok(build_section(
            self.model.as_ref(),
            self.search.as_ref(),
            &self.config,
            topic,
            section,
            progress,
        )
        .await?)
    }

    async fn synthesis_task(
        &self,
        topic: &str,
        section: Section,
        research_done: &[Section],
        delay: Duration,
        progress: &ProgressSender,
    ) -> Result<Section, ReportsmithError> {
        if delay > Duration::ZERO {
            sleep(delay).await;
        }
        let _permit = self.semaphore.clone().acquire_owned().await?;
        Ok(synthesize_section(
            self.model.as_ref(),
            topic,
            section,
            research_done,
            progress,
        )
        .await?)
    }
}

/// Collect a wave, failing on the first task error. Dropping the wave on
/// error cancels every sibling still in flight.
async fn drain_wave<F>(
    mut wave: FuturesUnordered<F>,
    finished: &mut HashMap<String, Section>,
) -> Result<(), ReportsmithError>
where
    F: Future<Output = Result<Section, ReportsmithError>>,
{
    while let Some(result) = wave.next().await {
        let section = result?;
        info!(section = %section.name, chars = section.content.len(), "Section finished");
        finished.insert(section.name.clone(), section);
    }
    Ok(())
}

/// Assemble the final document in plan order. Every planned section must
/// have finished content; a gap means a merge bug upstream, not a condition
/// to paper over.
pub fn compile_document(
    plan: &[Section],
    finished: &HashMap<String, Section>,
) -> Result<String, CompileError> {
    let mut parts = Vec::with_capacity(plan.len());
    for planned in plan {
        let section = finished
            .get(&planned.name)
            .ok_or_else(|| CompileError::IncompleteMerge {
                section: planned.name.clone(),
            })?;
        parts.push(section.content.as_str());
    }
    Ok(parts.join("\n\n"))
}
