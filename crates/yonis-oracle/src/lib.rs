pub mod engine;
mod parse;
mod prompt;

use std::time::Duration;

use tracing::{debug, info, warn};
use yonis_core::{AiSettings, DiagnosticResult, Taxonomy};

pub use engine::{GenerationRequest, Generator, LlmGenerator};
pub use parse::parse_diagnosis;
pub use prompt::{response_schema, system_prompt, TEMPERATURE};

/// State reported when the remote classification did not complete.
pub const FALLBACK_STATE_ID: u32 = 49;
pub const FALLBACK_ANALYSIS: &str =
    "The system is experiencing interference. We cannot calculate your vector.";
pub const FALLBACK_RECOMMENDATION: &str = "Stabilize your connection and try again.";

#[derive(Debug, thiserror::Error)]
pub enum DiagnosticError {
    #[error("remote model unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("response violates schema: {0}")]
    SchemaViolation(String),
    #[error("remote model returned no text")]
    EmptyResponse,
}

/// The sentinel result. Constant; never derived from input.
pub fn fallback() -> DiagnosticResult {
    DiagnosticResult {
        state_id: FALLBACK_STATE_ID,
        analysis: FALLBACK_ANALYSIS.to_string(),
        recommendation: FALLBACK_RECOMMENDATION.to_string(),
    }
}

/// Fold every failure cause into the fallback.
pub fn collapse(result: Result<DiagnosticResult, DiagnosticError>) -> DiagnosticResult {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "diagnostic failed, returning fallback");
        fallback()
    })
}

/// Classification gateway. Holds no mutable state, so one instance can
/// serve concurrent callers.
pub struct Oracle<G = LlmGenerator> {
    generator: G,
    system: String,
    timeout: Duration,
}

impl<G: Generator> Oracle<G> {
    pub fn new(generator: G, taxonomy: &Taxonomy) -> Self {
        Self {
            generator,
            system: prompt::system_prompt(taxonomy),
            timeout: Duration::from_secs(yonis_core::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Oracle over `generator` with the timeout taken from `settings`.
    pub fn configured(generator: G, settings: &AiSettings, taxonomy: &Taxonomy) -> Self {
        info!(provider = %settings.provider, model = %settings.model, "configuring oracle");
        Self::new(generator, taxonomy).with_timeout(settings.timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the outbound request for `user_text`.
    pub fn request(&self, user_text: &str) -> GenerationRequest {
        GenerationRequest {
            system: self.system.clone(),
            user: user_text.to_string(),
            temperature: prompt::TEMPERATURE,
            schema: prompt::response_schema(),
        }
    }

    /// One remote call, with the failure cause preserved.
    pub async fn try_classify(&self, user_text: &str) -> Result<DiagnosticResult, DiagnosticError> {
        let request = self.request(user_text);

        let reply = tokio::time::timeout(self.timeout, self.generator.generate(&request))
            .await
            .map_err(|_| {
                DiagnosticError::RemoteUnavailable(format!("timed out after {:?}", self.timeout))
            })?
            .map_err(DiagnosticError::RemoteUnavailable)?;

        let raw = reply.ok_or(DiagnosticError::EmptyResponse)?;
        debug!(raw = %raw, "oracle reply");
        parse::parse_diagnosis(&raw)
    }

    /// Classify free text. Never fails; any error becomes the fallback.
    /// Callers reject blank input before calling.
    pub async fn classify(&self, user_text: &str) -> DiagnosticResult {
        collapse(self.try_classify(user_text).await)
    }
}
