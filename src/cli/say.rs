//! TUI-less "say" command

use std::error::Error;
use std::io::Write;

use thiserror::Error;

use crate::api::ChatBackend;
use crate::core::log::{ChatLog, LogEntry};
use crate::core::message::{fallback, Role};
use crate::core::widget::{perform, ChatOutcome, ChatWidget, SendOutcome, SessionPhase};

#[derive(Debug, Error)]
pub enum SayError {
    #[error("Nothing to say. Usage: sous say <prompt>")]
    EmptyPrompt,
    #[error("{}", fallback::START_FAILED)]
    StartFailed,
    #[error("{}", fallback::NO_RESPONSE)]
    NoResponse,
    #[error("{}", fallback::NETWORK_ERROR)]
    ChatFailed,
}

/// Plain text of the newest assistant message.
fn latest_reply(log: &ChatLog) -> Option<String> {
    log.entries().iter().rev().find_map(|entry| match entry {
        LogEntry::Message {
            role: Role::Assistant,
            body,
            ..
        } => Some(body.plain_text()),
        _ => None,
    })
}

pub async fn run_say<B: ChatBackend + ?Sized>(
    backend: &B,
    user_id: &str,
    prompt: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    if prompt.trim().is_empty() {
        return Err(SayError::EmptyPrompt.into());
    }

    let mut widget = ChatWidget::new();
    widget.start_session(backend, user_id).await?;
    if widget.state().phase() == &SessionPhase::Failed {
        return Err(SayError::StartFailed.into());
    }
    if let Some(greeting) = latest_reply(widget.log()) {
        writeln!(out, "{greeting}\n")?;
    }

    let SendOutcome::Dispatch(request) = widget.begin_send(prompt) else {
        return Err(SayError::StartFailed.into());
    };
    let completion = perform(backend, request).await;
    let outcome = completion.chat_outcome();
    widget.complete(completion);
    match outcome {
        Some(ChatOutcome::Answered) => {}
        Some(ChatOutcome::NoResponse) => return Err(SayError::NoResponse.into()),
        Some(ChatOutcome::Failed) | None => return Err(SayError::ChatFailed.into()),
    }

    let reply = latest_reply(widget.log()).unwrap_or_default();
    writeln!(out, "{reply}")?;
    out.flush()?;
    Ok(())
}
