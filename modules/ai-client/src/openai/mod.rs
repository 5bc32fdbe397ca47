mod client;
pub(crate) mod schema;
pub(crate) mod types;

pub use schema::StructuredOutput;

use tracing::debug;

use crate::error::{AiError, Result};
use crate::util::strip_code_blocks;
use client::OpenAiClient;
use types::{ChatRequest, ToolDefinitionWire, WireMessage};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

// =============================================================================
// OpenAi Agent
// =============================================================================

/// Chat-completions agent for any OpenAI-compatible endpoint (OpenAI itself or
/// a gateway that fronts other model vendors).
#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    model: String,
    base_url: Option<String>,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> Result<OpenAiClient> {
        OpenAiClient::new(
            &self.api_key,
            self.base_url.as_deref().unwrap_or(OPENAI_API_URL),
        )
    }

    /// Structured extraction through a single forced tool call.
    ///
    /// The tool's parameter schema is derived from `T`. The model is made to call
    /// `tool_name`; its arguments are deserialized into `T`. A response without
    /// that tool call is `AiError::NoStructuredOutput`.
    pub async fn extract_with_tool<T: StructuredOutput>(
        &self,
        tool_name: &str,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Result<T> {
        let request = ChatRequest::new(&self.model)
            .message(WireMessage::system(system_prompt))
            .message(WireMessage::user(user_prompt))
            .temperature(0.0)
            .forced_tool(ToolDefinitionWire::function(tool_name, T::tool_schema()));

        let response = self.client()?.chat(&request).await?;

        let arguments = response
            .tool_arguments(tool_name)
            .ok_or_else(|| AiError::NoStructuredOutput(tool_name.to_string()))?;

        debug!(tool = tool_name, bytes = arguments.len(), "Received tool arguments");

        serde_json::from_str(strip_code_blocks(arguments))
            .map_err(|e| AiError::Parse(format!("{tool_name} arguments: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_new() {
        let ai = OpenAi::new("sk-test", "google/gemini-2.5-flash");
        assert_eq!(ai.model(), "google/gemini-2.5-flash");
        assert_eq!(ai.api_key, "sk-test");
        assert!(ai.base_url.is_none());
    }

    #[test]
    fn test_openai_with_base_url() {
        let ai = OpenAi::new("sk-test", "gpt-4o").with_base_url("https://gateway.example/v1");
        assert_eq!(ai.base_url.as_deref(), Some("https://gateway.example/v1"));
    }
}
