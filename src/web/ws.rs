//! Chat WebSocket — one guided conversation per socket.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{AppState, Caller};
use crate::admission::CallerIdentity;
use crate::dialogue::{
    BotMessage, ConversationSession, DialoguePhase, StepOutcome, SynthesisJob, Turn, UserInput,
};
use crate::error::SynthesisError;
use crate::synthesis::SynthesisResult;
use crate::templates::SuggestedReply;

// ── JSON Protocol ───────────────────────────────────────────────────────

/// Message from client → server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Text { text: String },
    Suggestion { label: String },
    Restart,
}

impl From<ClientMessage> for UserInput {
    fn from(msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::Text { text } => UserInput::text(text),
            ClientMessage::Suggestion { label } => UserInput::suggestion(label),
            ClientMessage::Restart => UserInput::text("/restart"),
        }
    }
}

/// Message from server → client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    Turn {
        phase: DialoguePhase,
        messages: Vec<BotMessage>,
        suggestions: Vec<SuggestedReply>,
    },
    Synthesizing { messages: Vec<BotMessage> },
    Busy { message: String },
    Error { message: String },
}

impl From<StepOutcome> for ServerMessage {
    fn from(outcome: StepOutcome) -> Self {
        Self::Turn {
            phase: outcome.phase,
            messages: outcome.messages,
            suggestions: outcome.suggestions,
        }
    }
}

const BUSY: &str = "결과물을 만드는 중이에요. 잠시만 기다려 주세요.";
const UNREADABLE: &str = "메시지를 이해하지 못했어요.";

// ── Handler ─────────────────────────────────────────────────────────────

pub(super) async fn chat_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> impl IntoResponse {
    info!(caller = %caller, "Chat client connecting");
    ws.on_upgrade(move |socket| handle_socket(socket, state, caller))
}

async fn handle_socket(mut socket: WebSocket, state: AppState, caller: CallerIdentity) {
    let mut session = ConversationSession::new(state.engine, state.service, caller.clone());
    if send(&mut socket, session.greet().into()).await.is_err() {
        warn!("Failed to send greeting, client disconnected");
        return;
    }

    let mut in_flight: Option<SynthesisJob> = None;

    loop {
        tokio::select! {
            result = wait(&mut in_flight) => {
                in_flight = None;
                let outcome = session.finish(result);
                if send(&mut socket, outcome.into()).await.is_err() {
                    break;
                }
            }

            msg = socket.recv() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(caller = %caller, "Chat client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Chat socket error");
                        break;
                    }
                    Some(Ok(_)) => continue,
                };

                if in_flight.is_some() {
                    let busy = ServerMessage::Busy { message: BUSY.to_string() };
                    if send(&mut socket, busy).await.is_err() {
                        break;
                    }
                    continue;
                }

                let reply = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => match session.begin(client_msg.into()) {
                        Turn::Done(outcome) => outcome.into(),
                        Turn::Pending { messages, job } => {
                            in_flight = Some(job);
                            ServerMessage::Synthesizing { messages }
                        }
                    },
                    Err(e) => {
                        debug!(error = %e, "Unreadable chat message");
                        ServerMessage::Error { message: UNREADABLE.to_string() }
                    }
                };
                if send(&mut socket, reply).await.is_err() {
                    break;
                }
            }
        }
    }

    if in_flight.is_some() {
        info!(caller = %caller, "Dropping in-flight synthesis for closed conversation");
    }
}

/// Resolve the in-flight job, or never when there is none.
async fn wait(job: &mut Option<SynthesisJob>) -> Result<SynthesisResult, SynthesisError> {
    match job {
        Some(job) => job.await,
        None => std::future::pending().await,
    }
}

async fn send(socket: &mut WebSocket, msg: ServerMessage) -> Result<(), axum::Error> {
    match serde_json::to_string(&msg) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!(error = %e, "Failed to serialize chat message");
            Ok(())
        }
    }
}
