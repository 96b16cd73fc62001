//! Conversation session — drives one conversation through the engine and
//! the synthesis pipeline.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::admission::CallerIdentity;
use crate::error::SynthesisError;
use crate::synthesis::{SynthesisResult, SynthesisService};

use super::engine::{DialogueEngine, StepOutcome, Transition};
use super::message::{BotMessage, UserInput};
use super::state::{ConversationState, DialoguePhase};

/// An owned, in-flight synthesis attempt.
pub type SynthesisJob = Pin<Box<dyn Future<Output = Result<SynthesisResult, SynthesisError>> + Send>>;

/// What `begin` produced.
pub enum Turn {
    Done(StepOutcome),
    /// Synthesis started. Await `job`, then pass its result to `finish`.
    /// Dropping `job` abandons the attempt and leaves the state untouched.
    Pending {
        messages: Vec<BotMessage>,
        job: SynthesisJob,
    },
}

/// One conversation with one caller.
pub struct ConversationSession {
    engine: Arc<DialogueEngine>,
    service: Arc<SynthesisService>,
    caller: CallerIdentity,
    state: ConversationState,
}

impl ConversationSession {
    pub fn new(
        engine: Arc<DialogueEngine>,
        service: Arc<SynthesisService>,
        caller: CallerIdentity,
    ) -> Self {
        Self::resume(engine, service, caller, ConversationState::default())
    }

    /// Continue from a state produced earlier by the engine.
    pub fn resume(
        engine: Arc<DialogueEngine>,
        service: Arc<SynthesisService>,
        caller: CallerIdentity,
        state: ConversationState,
    ) -> Self {
        Self {
            engine,
            service,
            caller,
            state,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn phase(&self) -> DialoguePhase {
        self.state.phase(self.engine.registry())
    }

    /// Greeting and menu. Resets the conversation.
    pub fn greet(&mut self) -> StepOutcome {
        let outcome = self.engine.start();
        self.state = outcome.state.clone();
        outcome
    }

    /// Process one turn and wait for synthesis if it was triggered.
    ///
    /// Taking `&mut self` keeps at most one request outstanding per
    /// conversation.
    pub async fn send(&mut self, input: UserInput) -> StepOutcome {
        match self.begin(input) {
            Turn::Done(outcome) => outcome,
            Turn::Pending { messages, job } => {
                let result = job.await;
                let mut outcome = self.finish(result);
                let mut all = messages;
                all.append(&mut outcome.messages);
                outcome.messages = all;
                outcome
            }
        }
    }

    /// Process one turn without waiting for synthesis.
    pub fn begin(&mut self, input: UserInput) -> Turn {
        let from = self.phase();
        match self.engine.step(&self.state, &input) {
            Transition::Continue(outcome) => {
                debug_assert!(
                    from.can_transition_to(outcome.phase),
                    "engine moved {from} -> {}",
                    outcome.phase
                );
                self.state = outcome.state.clone();
                Turn::Done(outcome)
            }
            Transition::Synthesize { request, messages } => {
                debug_assert!(from.can_transition_to(DialoguePhase::Synthesizing));
                let service = Arc::clone(&self.service);
                let caller = self.caller.clone();
                let job: SynthesisJob =
                    Box::pin(async move { service.handle(&caller, &request).await });
                Turn::Pending { messages, job }
            }
        }
    }

    /// Apply a finished synthesis attempt.
    pub fn finish(&mut self, result: Result<SynthesisResult, SynthesisError>) -> StepOutcome {
        let outcome = self.engine.complete(result);
        debug_assert!(DialoguePhase::Synthesizing.can_transition_to(outcome.phase));
        self.state = outcome.state.clone();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::{AdmissionConfig, AdmissionController, InMemoryCounterStore};
    use crate::dialogue::MessageKind;
    use crate::llm::LlmProvider;
    use crate::synthesis::test_support::StubLlm;
    use crate::synthesis::{PromptSynthesizer, SynthesizerConfig};
    use crate::templates::TemplateRegistry;

    fn session(llm: Arc<dyn LlmProvider>, limit: u32) -> ConversationSession {
        let engine = Arc::new(DialogueEngine::new(Arc::new(
            TemplateRegistry::builtin().unwrap(),
        )));
        let admission = AdmissionController::new(
            InMemoryCounterStore::new(),
            AdmissionConfig {
                max_requests: limit,
                ..Default::default()
            },
        );
        let service = Arc::new(SynthesisService::new(
            Arc::new(admission),
            PromptSynthesizer::new(llm, SynthesizerConfig::default()),
        ));
        ConversationSession::new(engine, service, CallerIdentity::Named("test".to_string()))
    }

    async fn fill_blog(s: &mut ConversationSession) {
        s.send(UserInput::text("블로그 글쓰기")).await;
        s.send(UserInput::text("AI 윤리")).await;
        s.send(UserInput::suggestion("대학생")).await;
        s.send(UserInput::suggestion("전문적으로")).await;
        s.send(UserInput::text("없음")).await;
        assert_eq!(s.phase(), DialoguePhase::AwaitingConfirmation);
    }

    #[tokio::test]
    async fn blog_conversation_ends_with_artifact() {
        let llm = StubLlm::ok("AI 윤리에 관한 초안");
        let mut s = session(llm.clone(), 10);
        s.greet();
        fill_blog(&mut s).await;

        let outcome = s.send(UserInput::suggestion("✨ 프롬프트 생성하기")).await;
        assert_eq!(outcome.messages[0].kind, MessageKind::Notice);
        let fin = outcome.messages.iter().find(|m| m.is_final()).unwrap();
        assert_eq!(fin.text, "AI 윤리에 관한 초안");
        assert_eq!(*s.state(), ConversationState::default());
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn failure_becomes_message_and_resets() {
        let mut s = session(StubLlm::failing(), 10);
        fill_blog(&mut s).await;
        let outcome = s.send(UserInput::suggestion("✨ 프롬프트 생성하기")).await;
        assert_eq!(outcome.phase, DialoguePhase::Failed);
        let err = outcome.messages.last().unwrap();
        assert_eq!(err.kind, MessageKind::Error);
        assert!(!err.text.contains("sk-test"));
        assert_eq!(s.phase(), DialoguePhase::Idle);
    }

    #[tokio::test]
    async fn throttled_conversation_reports_rate_limit() {
        let mut s = session(StubLlm::ok("x"), 0);
        fill_blog(&mut s).await;
        let outcome = s.send(UserInput::suggestion("✨ 프롬프트 생성하기")).await;
        assert!(outcome.messages.last().unwrap().text.contains("요청이 너무 많습니다"));
    }

    #[tokio::test]
    async fn every_turn_follows_the_phase_table() {
        let mut s = session(StubLlm::ok("초안"), 10);
        let mut from = s.phase();
        let turns = [
            UserInput::text("아무거나"),
            UserInput::text("블로그 글쓰기"),
            UserInput::text("AI"),
            UserInput::text("AI 윤리"),
            UserInput::suggestion("대학생"),
            UserInput::suggestion("전문적으로"),
            UserInput::text("없음"),
            UserInput::text("음..."),
            UserInput::suggestion("✨ 프롬프트 생성하기"),
            UserInput::text("이메일"),
            UserInput::text("처음으로"),
        ];
        for input in turns {
            let outcome = s.send(input).await;
            assert!(from.can_transition_to(outcome.phase), "{from} -> {}", outcome.phase);
            from = s.phase();
        }
        assert_eq!(from, DialoguePhase::Idle);
    }

    #[tokio::test]
    async fn abandoned_job_leaves_state_untouched() {
        let llm = StubLlm::ok("x");
        let mut s = session(llm.clone(), 10);
        fill_blog(&mut s).await;
        let before = s.state().clone();

        let Turn::Pending { job, .. } = s.begin(UserInput::suggestion("✨ 프롬프트 생성하기"))
        else {
            panic!("expected pending synthesis");
        };
        drop(job);
        assert_eq!(*s.state(), before);
        assert_eq!(llm.calls(), 0);
    }
}
