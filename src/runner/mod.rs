mod orchestrator;

pub use orchestrator::{compile_document, Orchestrator, RunReport};
