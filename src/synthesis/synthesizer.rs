//! Prompt synthesizer — turns validated inputs into the final artifact.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{LlmError, SynthesisError};
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};
use crate::templates::meta_instruction;
use crate::validation::ValidatedInputs;

/// Sampling and timeout settings for the generation call.
#[derive(Debug, Clone)]
pub struct SynthesizerConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound on one backend call.
    pub timeout: Duration,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Builds the meta-instruction and makes exactly one generation call.
pub struct PromptSynthesizer {
    llm: Arc<dyn LlmProvider>,
    config: SynthesizerConfig,
}

impl PromptSynthesizer {
    pub fn new(llm: Arc<dyn LlmProvider>, config: SynthesizerConfig) -> Self {
        Self { llm, config }
    }

    /// Generate the artifact. The backend's text is returned unmodified.
    pub async fn synthesize(&self, inputs: &ValidatedInputs) -> Result<String, SynthesisError> {
        let template = inputs.template_type();
        let instruction = meta_instruction(inputs);
        debug!(
            template = %template,
            instruction_chars = instruction.chars().count(),
            "Built meta-instruction"
        );

        match self.generate(instruction).await {
            Ok(artifact) => {
                info!(
                    template = %template,
                    model = self.llm.model_name(),
                    artifact_chars = artifact.chars().count(),
                    "Artifact generated"
                );
                Ok(artifact)
            }
            Err(e) => {
                warn!(
                    template = %template,
                    model = self.llm.model_name(),
                    error = %e,
                    "Generation failed"
                );
                Err(SynthesisError::GenerationFailed)
            }
        }
    }

    async fn generate(&self, instruction: String) -> Result<String, LlmError> {
        let request = CompletionRequest::new(vec![ChatMessage::user(instruction)])
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        let response = tokio::time::timeout(self.config.timeout, self.llm.complete(request))
            .await
            .map_err(|_| LlmError::Timeout {
                provider: self.llm.model_name().to_string(),
                timeout: self.config.timeout,
            })??;

        if response.content.trim().is_empty() {
            return Err(LlmError::EmptyResponse {
                provider: self.llm.model_name().to_string(),
            });
        }
        debug!(chars = response.content.chars().count(), "Completion finished");
        Ok(response.content)
    }
}
