//! TUI-less "ask" command

use std::error::Error;
use std::io::{self, Write};

use crate::core::app::{apply_action, App, AppAction, AppCommand};
use crate::core::chat_stream::{ChatStreamService, StreamMessage};

/// How a headless exchange ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    Answered,
    Failed(String),
}

pub async fn run_ask(mut app: App, question: Vec<String>) -> Result<(), Box<dyn Error>> {
    let question = question.join(" ");
    if question.trim().is_empty() {
        eprintln!("Usage: hikmat ask <question>");
        std::process::exit(1);
    }

    app.initialize();
    let mut stdout = io::stdout();
    let outcome = stream_answer(&mut app, question, &mut stdout).await?;
    if let Some(status) = app.ui.status.take() {
        eprintln!("⚠️  {status}");
    }
    match outcome {
        AskOutcome::Answered => {
            writeln!(stdout)?;
            Ok(())
        }
        AskOutcome::Failed(err) => {
            eprintln!("\n❌ Error: {err}");
            std::process::exit(1);
        }
    }
}

/// Ask `question`, copying reply chunks to `out` as they arrive. The
/// exchange is recorded in the transcript exactly as the interactive client
/// records it.
pub async fn stream_answer<W: Write>(
    app: &mut App,
    question: String,
    out: &mut W,
) -> Result<AskOutcome, Box<dyn Error>> {
    let outcome = apply_action(app, AppAction::Ask { question });
    let Some(AppCommand::SpawnStream(params)) = outcome.command else {
        return Ok(AskOutcome::Answered);
    };

    let stream_id = params.stream_id;
    let (stream_service, mut rx) = ChatStreamService::new();
    stream_service.spawn_stream(params);

    while let Some((message, id)) = rx.recv().await {
        if id != stream_id {
            continue;
        }
        let result = match &message {
            StreamMessage::Chunk(content) => {
                write!(out, "{content}")?;
                out.flush()?;
                None
            }
            StreamMessage::Error(err) => Some(AskOutcome::Failed(err.clone())),
            StreamMessage::End => Some(AskOutcome::Answered),
            StreamMessage::Started => None,
        };
        apply_action(app, AppAction::from_stream(message, id));
        if let Some(result) = result {
            return Ok(result);
        }
    }

    Ok(AskOutcome::Answered)
}
