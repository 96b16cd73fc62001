//! HTTP and WebSocket surface.

mod api;
mod ws;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::admission::CallerIdentity;
use crate::dialogue::DialogueEngine;
use crate::synthesis::SynthesisService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DialogueEngine>,
    pub service: Arc<SynthesisService>,
}

/// Build the Axum router with every REST and WebSocket route.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` so
/// callers are identified by their peer address.
pub fn app_routes(engine: Arc<DialogueEngine>, service: Arc<SynthesisService>) -> Router {
    let state = AppState { engine, service };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health))
        .route("/api/templates", get(api::list_templates))
        .route("/api/generate-prompt", post(api::generate_prompt))
        .route("/api/conversation/step", post(api::conversation_step))
        .route("/ws/chat", get(ws::chat_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Caller identity extracted from the socket peer, or from forwarding
/// headers when the admission config trusts them.
pub struct Caller(pub CallerIdentity);

impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let trust_forwarded = state.service.trusts_forwarded();
        Ok(Self(CallerIdentity::from_request(
            &parts.headers,
            peer,
            trust_forwarded,
        )))
    }
}
