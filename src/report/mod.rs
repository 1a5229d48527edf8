//! Report data model: sections, search queries, and grading feedback.
//!
//! These types double as the structured-output schemas handed to the
//! generative model, so field names and descriptions are part of the
//! model-facing contract.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One titled unit of the final document, independently writable.
/// Identity within a plan is `name`; the merge back into plan order is keyed
/// on it, so names must be unique (the planner enforces this).
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Section {
    /// Name for this section of the report.
    pub name: String,

    /// Overview of the main topics and key points to be covered in this section.
    pub description: String,

    /// Whether independent research is needed for this section of the report.
    pub research: bool,

    /// The content of the section.
    #[serde(default)]
    pub content: String,
}

/// Ordered outline proposed by the planner. The section order here is the
/// canonical document order, regardless of task completion order.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct SectionPlan {
    /// Sections of the report.
    pub sections: Vec<Section>,
}

/// Query for web search.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct SearchQuery {
    /// Query for web search.
    pub search_query: String,
}

/// List of search queries.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct SearchQueries {
    /// List of search queries.
    pub queries: Vec<SearchQuery>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Pass,
    Fail,
}

/// Grader verdict on a written section. On a fail the follow-up queries
/// replace the section's pending queries for the next search round.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Feedback {
    /// Evaluation indicating whether the response is satisfactory (pass) or
    /// needs revision (fail).
    pub grade: Grade,

    /// List of follow-up search queries.
    #[serde(default)]
    pub follow_up_queries: Vec<SearchQuery>,
}

const SECTION_SEPARATOR_WIDTH: usize = 80;

/// Render finished sections as the context string handed to synthesis tasks.
/// Stable textual form: title, description, research flag, and content (or an
/// explicit placeholder), separated by a visible rule.
pub fn format_sections(sections: &[Section]) -> String {
    let separator = "-".repeat(SECTION_SEPARATOR_WIDTH);
    let mut out = String::new();
    for section in sections {
        let content = if section.content.is_empty() {
            "[no content]"
        } else {
            section.content.as_str()
        };
        out.push_str(&format!(
            "SECTION TITLE:\n{}\nDESCRIPTION:\n{}\nREQUIRES RESEARCH:\n{}\nCONTENT:\n{}\n\n{}\n\n",
            section.name, section.description, section.research, content, separator
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_plan_deserializes_without_content() {
        let json = r#"{
            "sections": [
                {"name": "Introduction", "description": "Overview", "research": false},
                {"name": "Background", "description": "History", "research": true}
            ]
        }"#;

        let plan: SectionPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.sections.len(), 2);
        assert!(plan.sections.iter().all(|s| s.content.is_empty()));
        assert!(plan.sections[1].research);
    }

    #[test]
    fn test_feedback_grade_lowercase() {
        let feedback: Feedback = serde_json::from_str(
            r#"{"grade": "fail", "follow_up_queries": [{"search_query": "more detail"}]}"#,
        )
        .unwrap();
        assert_eq!(feedback.grade, Grade::Fail);
        assert_eq!(feedback.follow_up_queries.len(), 1);

        let feedback: Feedback = serde_json::from_str(r#"{"grade": "pass"}"#).unwrap();
        assert_eq!(feedback.grade, Grade::Pass);
        assert!(feedback.follow_up_queries.is_empty());
    }

    #[test]
    fn test_format_sections_placeholder_and_order() {
        let sections = vec![
            Section {
                name: "Alpha".to_string(),
                description: "First".to_string(),
                research: true,
                content: "Alpha body.".to_string(),
            },
            Section {
                name: "Beta".to_string(),
                description: "Second".to_string(),
                research: false,
                content: String::new(),
            },
        ];

        let formatted = format_sections(&sections);
        assert!(formatted.contains("SECTION TITLE:\nAlpha"));
        assert!(formatted.contains("Alpha body."));
        assert!(formatted.contains("[no content]"));
        let alpha = formatted.find("Alpha").unwrap();
        let beta = formatted.find("Beta").unwrap();
        assert!(alpha < beta);
    }
}
