//! Synthesis pipeline — admission, validation, then generation.

mod synthesizer;

pub use synthesizer::{PromptSynthesizer, SynthesizerConfig};

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::admission::{Admission, AdmissionController, CallerIdentity};
use crate::error::SynthesisError;
use crate::validation::validate;

/// A request to synthesize one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    pub template_type: String,
    pub inputs: BTreeMap<String, String>,
}

impl SynthesisRequest {
    pub fn new(template_type: impl Into<String>, inputs: BTreeMap<String, String>) -> Self {
        Self {
            template_type: template_type.into(),
            inputs,
        }
    }

    /// Parse a raw request body. Anything not shaped like
    /// `{ templateType: string, inputs: { string: string } }` is malformed.
    pub fn from_slice(body: &[u8]) -> Result<Self, SynthesisError> {
        let request: Self = serde_json::from_slice(body).map_err(|_| SynthesisError::malformed())?;
        request.ensure_well_formed()?;
        Ok(request)
    }

    /// A blank template tag counts as missing.
    pub fn ensure_well_formed(&self) -> Result<(), SynthesisError> {
        if self.template_type.trim().is_empty() {
            return Err(SynthesisError::malformed());
        }
        Ok(())
    }
}

/// A successfully generated artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisResult {
    pub final_artifact: String,
}

/// Runs one synthesis attempt end to end.
pub struct SynthesisService {
    admission: Arc<AdmissionController>,
    synthesizer: PromptSynthesizer,
}

impl SynthesisService {
    pub fn new(admission: Arc<AdmissionController>, synthesizer: PromptSynthesizer) -> Self {
        Self {
            admission,
            synthesizer,
        }
    }

    /// Whether caller identity may come from forwarding headers.
    pub fn trusts_forwarded(&self) -> bool {
        self.admission.trusts_forwarded()
    }

    /// Handle a raw body. Admission runs before the body is even parsed, so a
    /// throttled caller never reaches validation.
    pub async fn handle_raw(
        &self,
        caller: &CallerIdentity,
        body: &[u8],
    ) -> Result<SynthesisResult, SynthesisError> {
        self.admit(caller).await?;
        let request = SynthesisRequest::from_slice(body)?;
        self.run(caller, &request).await
    }

    /// Handle an already-parsed request.
    pub async fn handle(
        &self,
        caller: &CallerIdentity,
        request: &SynthesisRequest,
    ) -> Result<SynthesisResult, SynthesisError> {
        self.admit(caller).await?;
        self.run(caller, request).await
    }

    async fn admit(&self, caller: &CallerIdentity) -> Result<(), SynthesisError> {
        match self.admission.admit(caller).await {
            Admission::Allowed => Ok(()),
            Admission::Throttled => {
                info!(caller = %caller, "Synthesis throttled");
                Err(SynthesisError::TooManyRequests)
            }
        }
    }

    async fn run(
        &self,
        caller: &CallerIdentity,
        request: &SynthesisRequest,
    ) -> Result<SynthesisResult, SynthesisError> {
        request.ensure_well_formed()?;
        let validated = validate(&request.template_type, &request.inputs).map_err(|rejection| {
            let err = SynthesisError::from(rejection);
            info!(
                caller = %caller,
                template = %request.template_type,
                code = err.code(),
                "Synthesis request rejected"
            );
            err
        })?;

        info!(caller = %caller, template = %validated.template_type(), "Synthesizing");
        let final_artifact = self.synthesizer.synthesize(&validated).await?;
        Ok(SynthesisResult { final_artifact })
    }
}
