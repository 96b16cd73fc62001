use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use jium::admission::{AdmissionController, CallerIdentity, InMemoryCounterStore, spawn_sweep_task};
use jium::cli::run_chat;
use jium::config::ServiceConfig;
use jium::dialogue::{ConversationSession, DialogueEngine};
use jium::llm::create_provider;
use jium::synthesis::{PromptSynthesizer, SynthesisService};
use jium::templates::TemplateRegistry;
use jium::web::app_routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        anyhow::bail!("Failed to install rustls crypto provider");
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServiceConfig::from_env().context("Invalid configuration")?;
    let chat_mode = std::env::args().nth(1).as_deref() == Some("chat");

    eprintln!("✍️  Jium v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.llm.model);
    eprintln!(
        "   Rate limit: {} per {}s",
        config.admission.max_requests,
        config.admission.window.as_secs()
    );

    // ── Core ────────────────────────────────────────────────────────────
    let llm = create_provider(&config.llm)?;
    let registry = Arc::new(TemplateRegistry::builtin()?);
    eprintln!("   Templates: {}", registry.iter().count());

    let store = InMemoryCounterStore::new();
    let _sweep_handle = spawn_sweep_task(Arc::clone(&store), config.admission.window);
    let admission = Arc::new(AdmissionController::new(store, config.admission.clone()));

    let synthesizer = PromptSynthesizer::new(llm, config.synthesizer.clone());
    let service = Arc::new(SynthesisService::new(admission, synthesizer));
    let engine = Arc::new(DialogueEngine::new(registry));

    if chat_mode {
        eprintln!("   Type a message and press Enter. Numbers pick a suggestion, /quit to exit.\n");
        let session =
            ConversationSession::new(engine, service, CallerIdentity::Named("local".to_string()));
        run_chat(session).await?;
        return Ok(());
    }

    // ── HTTP ────────────────────────────────────────────────────────────
    let app = app_routes(engine, service);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    eprintln!("   API: http://0.0.0.0:{}/api/generate-prompt", config.port);
    eprintln!("   Chat WS: ws://0.0.0.0:{}/ws/chat\n", config.port);
    tracing::info!(port = config.port, "Jium server started");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
