use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, StructuredOutputFormat};
use serde_json::Value;

use yonis_core::AiSettings;

/// Everything one outbound classification call carries.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub schema: Value,
}

/// The remote text-generation service. `Ok(None)` means the call succeeded
/// but carried no text.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, String>;
}

#[async_trait]
impl Generator for Box<dyn Generator> {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, String> {
        (**self).generate(request).await
    }
}

fn map_backend(provider: &str) -> Result<LLMBackend, String> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(format!("unknown provider: {other}")),
    }
}

fn output_format(schema: &Value) -> Result<StructuredOutputFormat, String> {
    serde_json::from_value(serde_json::json!({
        "name": "DiagnosticResult",
        "description": "Classification of the user's input into one state",
        "schema": schema,
        "strict": true,
    }))
    .map_err(|e| format!("output schema: {e}"))
}

/// Generator backed by the `llm` crate, configured from `AiSettings`.
#[derive(Debug, Clone)]
pub struct LlmGenerator {
    settings: AiSettings,
}

impl LlmGenerator {
    pub fn new(settings: AiSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Generator for LlmGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, String> {
        let backend = map_backend(&self.settings.provider)?;

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(&self.settings.model)
            .system(&request.system)
            .temperature(request.temperature)
            .timeout_seconds(self.settings.timeout().as_secs())
            .schema(output_format(&request.schema)?);

        if !self.settings.api_key.is_empty() {
            builder = builder.api_key(&self.settings.api_key);
        }

        let llm = builder.build().map_err(|e| format!("build LLM: {e}"))?;

        let messages = vec![ChatMessage::user().content(&request.user).build()];

        let response = llm.chat(&messages).await.map_err(|e| format!("chat: {e}"))?;

        Ok(response.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_providers_map() {
        for p in ["openai", "anthropic", "google", "ollama", "groq", "mistral", "deepseek"] {
            assert!(map_backend(p).is_ok(), "{p}");
        }
        assert_eq!(map_backend("gemini").unwrap_err(), "unknown provider: gemini");
    }

    #[test]
    fn schema_wraps_into_output_format() {
        let format = output_format(&crate::prompt::response_schema()).unwrap();
        assert_eq!(format.name, "DiagnosticResult");
        assert!(format.schema.is_some());
    }
}
