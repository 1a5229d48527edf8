mod openai;

pub use openai::OpenAiGenerator;

use crate::error::ModelError;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

/// Boundary to the generative model: given a system/task prompt pair, return
/// either free text or a JSON value conforming to a declared output schema.
/// Synchronous request/response contract; everything behind it (model choice,
/// transport, decoding) is the provider's business.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Free-text completion.
    async fn generate(&self, system: &str, user: &str) -> Result<String, ModelError>;

    /// Schema-constrained completion. `schema_name` identifies the expected
    /// shape to both the provider and the error path.
    async fn generate_json(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value, ModelError>;
}

/// Request a completion conforming to `T`'s derived JSON schema and decode it.
/// A completion that fails to decode is a schema violation, not a transport
/// error.
pub async fn generate_structured<T>(
    model: &dyn Generator,
    system: &str,
    user: &str,
    schema_name: &str,
) -> Result<T, ModelError>
where
    T: DeserializeOwned + JsonSchema,
{
    let schema = serde_json::to_value(schemars::schema_for!(T)).map_err(|e| {
        ModelError::SchemaViolation {
            name: schema_name.to_string(),
            detail: format!("failed to render schema: {}", e),
        }
    })?;

    let value = model.generate_json(system, user, schema_name, &schema).await?;

    serde_json::from_value(value).map_err(|e| ModelError::SchemaViolation {
        name: schema_name.to_string(),
        detail: e.to_string(),
    })
}

/// Pull a JSON object out of a completion that may wrap it in prose or a
/// markdown code fence.
pub fn extract_json(s: &str) -> Option<String> {
    let trimmed = s.trim();

    if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return Some(trimmed.to_string());
    }

    // Markdown code block
    if let Ok(re) = regex::Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```") {
        for cap in re.captures_iter(s) {
            let potential_json = cap.get(1)?.as_str().trim();
            if serde_json::from_str::<serde_json::Value>(potential_json).is_ok() {
                return Some(potential_json.to_string());
            }
        }
    }

    // First balanced JSON object
    let brace_start = s.find('{')?;
    let mut depth = 0;
    let mut end = brace_start;

    for (i, c) in s[brace_start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end = brace_start + i + 1;
                    break;
                }
            }
            _ => {}
        }
    }

    if depth == 0 && end > brace_start {
        let potential_json = &s[brace_start..end];
        if serde_json::from_str::<serde_json::Value>(potential_json).is_ok() {
            return Some(potential_json.to_string());
        }
    }

    None
}
