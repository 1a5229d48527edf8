//! Embedded prompt templates and their substitution helpers.
//!
//! Templates live under `prompts/` and use `{{PLACEHOLDER}}` markers. Every
//! system prompt carries the current UTC timestamp so the model can reason
//! about recency of current-events sources.

use chrono::Utc;

const PLANNER_QUERIES_PROMPT: &str = include_str!("../prompts/planner_queries.md");
const PLANNER_PROMPT: &str = include_str!("../prompts/planner.md");
const SECTION_QUERIES_PROMPT: &str = include_str!("../prompts/section_queries.md");
const SECTION_WRITER_PROMPT: &str = include_str!("../prompts/section_writer.md");
const SECTION_WRITER_INPUTS: &str = include_str!("../prompts/section_writer_inputs.md");
const SECTION_GRADER_PROMPT: &str = include_str!("../prompts/section_grader.md");
const FINAL_WRITER_PROMPT: &str = include_str!("../prompts/final_writer.md");

pub const PLANNER_QUERIES_TASK: &str =
    "Generate search queries that will help in planning the sections of the report.";
pub const PLANNER_TASK: &str = "Generate the sections of the report. Your response must include a \
    sections field containing a list of sections. Each section must include name, description, \
    research, and content fields.";
pub const SECTION_QUERIES_TASK: &str = "Generate search queries on the provided topic.";
pub const SECTION_GRADER_TASK: &str = "Grade the following section of a news-style report. \
    Consider follow-up questions for missing information. If the grade is 'pass', return an empty \
    follow-up query list. If the grade is 'fail', provide specific search queries to gather the \
    missing information.";
pub const FINAL_WRITER_TASK: &str = "Write a section of a report that answers a user's current \
    events question using the information you were provided.";

/// Current UTC date and time as `YYYY-MM-DD HH:MM:SS`.
pub fn current_utc_datetime() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn stamp(template: &str) -> String {
    template.replace("{{CURRENT_DATE_AND_TIME}}", &current_utc_datetime())
}

pub fn planner_queries(topic: &str, report_structure: &str, num_queries: usize) -> String {
    stamp(PLANNER_QUERIES_PROMPT)
        .replace("{{TOPIC}}", topic)
        .replace("{{REPORT_STRUCTURE}}", report_structure)
        .replace("{{NUM_QUERIES}}", &num_queries.to_string())
}

pub fn planner(topic: &str, report_structure: &str, context: &str, feedback: &str) -> String {
    stamp(PLANNER_PROMPT)
        .replace("{{TOPIC}}", topic)
        .replace("{{REPORT_STRUCTURE}}", report_structure)
        .replace("{{CONTEXT}}", context)
        .replace("{{FEEDBACK}}", feedback)
}

pub fn section_queries(topic: &str, section_topic: &str, num_queries: usize) -> String {
    stamp(SECTION_QUERIES_PROMPT)
        .replace("{{TOPIC}}", topic)
        .replace("{{SECTION_TOPIC}}", section_topic)
        .replace("{{NUM_QUERIES}}", &num_queries.to_string())
}

pub fn section_writer() -> String {
    stamp(SECTION_WRITER_PROMPT)
}

pub fn section_writer_inputs(
    topic: &str,
    section_name: &str,
    section_topic: &str,
    section_content: &str,
    context: &str,
) -> String {
    SECTION_WRITER_INPUTS
        .replace("{{TOPIC}}", topic)
        .replace("{{SECTION_NAME}}", section_name)
        .replace("{{SECTION_TOPIC}}", section_topic)
        .replace("{{SECTION_CONTENT}}", section_content)
        .replace("{{CONTEXT}}", context)
}

pub fn section_grader(
    topic: &str,
    section_topic: &str,
    section_content: &str,
    num_queries: usize,
) -> String {
    stamp(SECTION_GRADER_PROMPT)
        .replace("{{TOPIC}}", topic)
        .replace("{{SECTION_TOPIC}}", section_topic)
        .replace("{{SECTION_CONTENT}}", section_content)
        .replace("{{NUM_QUERIES}}", &num_queries.to_string())
}

pub fn final_writer(topic: &str, section_name: &str, section_topic: &str, context: &str) -> String {
    stamp(FINAL_WRITER_PROMPT)
        .replace("{{TOPIC}}", topic)
        .replace("{{SECTION_NAME}}", section_name)
        .replace("{{SECTION_TOPIC}}", section_topic)
        .replace("{{CONTEXT}}", context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_fully_substituted() {
        let prompt = planner_queries("Trade policy", "(1) Intro\n(2) Body", 2);
        assert!(prompt.contains("Trade policy"));
        assert!(prompt.contains("(2) Body"));
        assert!(!prompt.contains("{{"));

        let prompt = planner("Trade policy", "structure", "seed context", "");
        assert!(!prompt.contains("{{"));

        let prompt = section_grader("topic", "section topic", "content", 3);
        assert!(prompt.contains('3'));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_writer_inputs_carry_existing_content() {
        let inputs = section_writer_inputs("t", "Background", "history", "draft text", "sources");
        assert!(inputs.contains("Background"));
        assert!(inputs.contains("draft text"));
        assert!(inputs.contains("sources"));
        assert!(!inputs.contains("{{"));
    }

    #[test]
    fn test_datetime_format() {
        let ts = current_utc_datetime();
        // YYYY-MM-DD HH:MM:SS
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
    }
}
