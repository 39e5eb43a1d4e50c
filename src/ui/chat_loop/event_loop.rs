//! Polls terminal input, applies request completions and redraws.
//!
//! Everything that touches [`ChatApp`] happens on this task; network calls
//! run on spawned tasks and report back over channels, so the widget only
//! ever sees one mutation at a time.

use std::{error::Error, sync::Arc, time::Duration};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::api::{ApiError, ApiReply, ChatBackend, HttpBackend, MemoriesResponse};
use crate::core::dispatch::RequestDispatcher;
use crate::ui::renderer::ui;

use super::app::{ChatApp, Effect};
use super::lifecycle::{restore_terminal, setup_terminal};

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

type MemoriesResult = (String, Result<ApiReply<MemoriesResponse>, ApiError>);

#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub base_url: String,
    pub user: Option<String>,
    /// Start the session for `user` without waiting for Enter.
    pub auto_start: bool,
    pub timeout: Option<Duration>,
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

struct EffectRunner {
    dispatcher: RequestDispatcher,
    memories_tx: mpsc::UnboundedSender<MemoriesResult>,
}

impl EffectRunner {
    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::Dispatch(request) => {
                debug!(request = %request.id(), "dispatching request");
                self.dispatcher.spawn(request);
            }
            Effect::LoadMemories { user_id } => {
                let backend = self.dispatcher.backend();
                let tx = self.memories_tx.clone();
                tokio::spawn(async move {
                    let result = backend.memories(&user_id).await;
                    let _ = tx.send((user_id, result));
                });
            }
        }
    }
}

pub async fn run_chat(options: ChatOptions) -> Result<(), Box<dyn Error>> {
    let ChatOptions {
        base_url,
        user,
        auto_start,
        timeout,
    } = options;

    let backend: Arc<dyn ChatBackend> = Arc::new(HttpBackend::new(base_url.clone(), timeout)?);
    let (dispatcher, mut completions) = RequestDispatcher::new(backend);
    let (memories_tx, mut memories_rx) = mpsc::unbounded_channel::<MemoriesResult>();
    let mut runner = EffectRunner {
        dispatcher,
        memories_tx,
    };

    info!(%base_url, "chat started");
    let mut app = ChatApp::new(base_url, user.as_deref());
    if auto_start && user.is_some() {
        if let Some(effect) = app.submit_name() {
            runner.run(effect);
        }
    }

    let mut terminal = setup_terminal()?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);
    let mut ticker = tokio::time::interval(TICK);

    let result: Result<(), Box<dyn Error>> = loop {
        if app.exit_requested {
            break Ok(());
        }

        if let Err(err) = terminal.draw(|f| ui(f, &mut app)) {
            break Err(err.into());
        }

        tokio::select! {
            Some(ui_event) = event_rx.recv() => {
                let UiEvent::Crossterm(ev) = ui_event;
                match ev {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if let Some(effect) = app.handle_key(key) {
                            runner.run(effect);
                        }
                    }
                    Event::Paste(text) => app.handle_paste(&text),
                    _ => {}
                }
            }
            Some(completion) = completions.recv() => {
                if let Some(effect) = app.apply_completion(completion) {
                    runner.run(effect);
                }
            }
            Some((user_id, outcome)) = memories_rx.recv() => {
                app.apply_memories(&user_id, outcome);
            }
            _ = ticker.tick() => {}
        }
    };

    event_reader_handle.abort();
    runner.dispatcher.cancel_start();
    restore_terminal(&mut terminal)?;
    info!("chat closed");
    result
}
