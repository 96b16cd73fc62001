//! Shared harness: stub backends and a server on a random port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;

use jium::admission::{AdmissionConfig, AdmissionController, InMemoryCounterStore};
use jium::dialogue::DialogueEngine;
use jium::error::LlmError;
use jium::llm::{CompletionRequest, CompletionResponse, LlmProvider};
use jium::synthesis::{PromptSynthesizer, SynthesisService, SynthesizerConfig};
use jium::templates::TemplateRegistry;
use jium::web::app_routes;

/// Maximum time any test is allowed to run before we consider it hung.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// How the stub backend behaves.
pub enum Behavior {
    Reply(&'static str),
    Fail,
    Hang,
    /// Reply after a delay.
    Slow(&'static str, Duration),
}

/// Stub LLM provider for integration tests (no real API calls).
pub struct StubLlm {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl StubLlm {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for StubLlm {
    fn model_name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let content = match &self.behavior {
            Behavior::Reply(text) => text,
            Behavior::Fail => {
                return Err(LlmError::RequestFailed {
                    provider: "stub".to_string(),
                    reason: "HTTP 401: invalid x-api-key sk-ant-secret".to_string(),
                });
            }
            Behavior::Hang => return std::future::pending().await,
            Behavior::Slow(text, delay) => {
                tokio::time::sleep(*delay).await;
                text
            }
        };
        Ok(CompletionResponse {
            content: content.to_string(),
        })
    }
}

/// Server knobs.
pub struct ServerOptions {
    pub rate_limit: u32,
    pub generation_timeout: Duration,
    pub trust_forwarded: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            rate_limit: 10,
            generation_timeout: Duration::from_secs(2),
            trust_forwarded: false,
        }
    }
}

/// Start an Axum server on a random port, return the port.
pub async fn start_server(llm: Arc<StubLlm>, options: ServerOptions) -> u16 {
    let registry = Arc::new(TemplateRegistry::builtin().unwrap());
    let admission = AdmissionController::new(
        InMemoryCounterStore::new(),
        AdmissionConfig {
            max_requests: options.rate_limit,
            trust_forwarded: options.trust_forwarded,
            ..Default::default()
        },
    );
    let synthesizer = PromptSynthesizer::new(
        llm,
        SynthesizerConfig {
            timeout: options.generation_timeout,
            ..Default::default()
        },
    );
    let service = Arc::new(SynthesisService::new(Arc::new(admission), synthesizer));
    let app = app_routes(Arc::new(DialogueEngine::new(registry)), service);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    port
}
