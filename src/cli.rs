//! Interactive chat over stdin/stdout, for local use.

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::dialogue::{ConversationSession, MessageKind, StepOutcome, UserInput};
use crate::error::Result;
use crate::templates::SuggestedReply;

/// Run a REPL until EOF or `/quit`.
pub async fn run_chat(mut session: ConversationSession) -> Result<()> {
    let mut offered = print_outcome(&session.greet());

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    eprint!("> ");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            eprint!("> ");
            continue;
        }
        if line == "/quit" {
            break;
        }

        let input = resolve_line(line, &offered);
        if matches!(input, UserInput::Suggestion { .. }) {
            eprintln!("⏳ {}", input.utterance());
        }
        offered = print_outcome(&session.send(input).await);
        eprint!("> ");
    }
    Ok(())
}

/// A bare number picks the matching offered suggestion (1-based).
fn resolve_line(line: &str, offered: &[SuggestedReply]) -> UserInput {
    match line.parse::<usize>() {
        Ok(n) if (1..=offered.len()).contains(&n) => UserInput::suggestion(&offered[n - 1].label),
        _ => UserInput::text(line),
    }
}

fn print_outcome(outcome: &StepOutcome) -> Vec<SuggestedReply> {
    for msg in &outcome.messages {
        match msg.kind {
            MessageKind::Final => println!("\n{}\n", msg.text),
            MessageKind::Error => eprintln!("❌ {}", msg.text),
            MessageKind::Rejection | MessageKind::Clarification => eprintln!("⚠️  {}", msg.text),
            MessageKind::Question | MessageKind::Notice => eprintln!("{}", msg.text),
        }
    }
    for (i, s) in outcome.suggestions.iter().enumerate() {
        eprintln!("  [{}] {}", i + 1, s.label);
    }
    outcome.suggestions.clone()
}
