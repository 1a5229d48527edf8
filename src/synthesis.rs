//! Synthesis stage: single-shot writing for sections that need no research.
//!
//! Introductions, conclusions, and similar framing sections are written from
//! the finished research sections rather than from fresh searches, so they
//! can only run after the research wave has fully merged.

use serde_json::json;
use tracing::debug;

use crate::error::BuildError;
use crate::model::Generator;
use crate::progress::ProgressSender;
use crate::prompts;
use crate::report::{format_sections, Section};

/// Write one non-research section from the completed research sections.
pub async fn synthesize_section(
    model: &dyn Generator,
    topic: &str,
    mut section: Section,
    research_sections: &[Section],
    progress: &ProgressSender,
) -> Result<Section, BuildError> {
    let context = format_sections(research_sections);
    debug!(section = %section.name, context_chars = context.len(), "Synthesizing from research");

    let system = prompts::final_writer(topic, &section.name, &section.description, &context);
    section.content = model
        .generate(&system, prompts::FINAL_WRITER_TASK)
        .await
        .map_err(|source| BuildError::Model {
            section: section.name.clone(),
            source,
        })?;

    progress.emit(
        "synthesize",
        json!({"section": section.name, "content": section.content}),
    );
    Ok(section)
}
