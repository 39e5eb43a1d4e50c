//! Interactive state for the chat screen: the widget plus the two input
//! fields, focus and the alert modal. Key handling is synchronous and
//! returns an [`Effect`] for the event loop to run in the background.

use std::time::Instant;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};
use tracing::{error, warn};
use tui_textarea::{CursorMove, TextArea};

use crate::api::{ApiError, ApiReply, MemoriesResponse};
use crate::core::memories::format_memories;
use crate::core::message::Role;
use crate::core::widget::{ChatWidget, Completion, Request, SendOutcome};
use crate::ui::markup::TYPING_FRAMES;

const PAGE_SCROLL: u16 = 10;
const TYPING_FRAME_MILLIS: u128 = 300;

pub const HELP_TEXT: &str = "Enter your name and press Enter to start a session, then chat \
in the Message field.\n\nKeys: Enter send, Tab switch field, PageUp/PageDown scroll, \
Esc or Ctrl+C quit.\n\nCommands: /memories list what I remember about you, /clear clear the \
transcript, /help show this help, /quit exit.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Name,
    Message,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Dispatch(Request),
    LoadMemories { user_id: String },
}

pub struct ChatApp {
    pub widget: ChatWidget,
    pub name_input: TextArea<'static>,
    pub message_input: TextArea<'static>,
    pub focus: Focus,
    pub alert: Option<String>,
    pub base_url: String,
    pub exit_requested: bool,
    pulse_start: Instant,
}

fn text_field(initial: Option<&str>) -> TextArea<'static> {
    let mut field = match initial {
        Some(text) => TextArea::new(vec![text.to_string()]),
        None => TextArea::default(),
    };
    field.move_cursor(CursorMove::End);
    field.set_cursor_line_style(Style::default());
    field
}

fn field_text(field: &TextArea<'_>) -> String {
    field.lines().join("\n")
}

impl ChatApp {
    pub fn new(base_url: impl Into<String>, default_user: Option<&str>) -> Self {
        let mut app = Self {
            widget: ChatWidget::new(),
            name_input: text_field(default_user),
            message_input: text_field(None),
            focus: Focus::Name,
            alert: None,
            base_url: base_url.into(),
            exit_requested: false,
            pulse_start: Instant::now(),
        };
        app.refresh_fields();
        app
    }

    pub fn typing_frame(&self) -> usize {
        (self.pulse_start.elapsed().as_millis() / TYPING_FRAME_MILLIS) as usize % TYPING_FRAMES.len()
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.refresh_fields();
    }

    fn focused_field(&mut self) -> &mut TextArea<'static> {
        match self.focus {
            Focus::Name => &mut self.name_input,
            Focus::Message => &mut self.message_input,
        }
    }

    fn refresh_fields(&mut self) {
        let name_title = match self.widget.state().current_user() {
            Some(_) => "Name (session active)",
            None => "Name (Enter to start)",
        };
        let focus = self.focus;
        style_field(&mut self.name_input, name_title, focus == Focus::Name);
        style_field(
            &mut self.message_input,
            "Message (Enter to send, /help for commands)",
            focus == Focus::Message,
        );
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Effect> {
        if self.alert.take().is_some() {
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => {
                self.exit_requested = true;
                None
            }
            KeyCode::Esc => {
                self.exit_requested = true;
                None
            }
            KeyCode::Tab | KeyCode::BackTab => {
                let next = match self.focus {
                    Focus::Name => Focus::Message,
                    Focus::Message => Focus::Name,
                };
                self.set_focus(next);
                None
            }
            KeyCode::PageUp => {
                self.widget.log_mut().scroll_up(PAGE_SCROLL);
                None
            }
            KeyCode::PageDown => {
                self.widget.log_mut().scroll_down(PAGE_SCROLL);
                None
            }
            KeyCode::Up if self.focused_input_is_empty() => {
                self.widget.log_mut().scroll_up(1);
                None
            }
            KeyCode::Down if self.focused_input_is_empty() => {
                self.widget.log_mut().scroll_down(1);
                None
            }
            KeyCode::Enter => match self.focus {
                Focus::Name => self.submit_name(),
                Focus::Message => self.submit_message(),
            },
            _ => {
                self.focused_field().input(tui_textarea::Input::from(key));
                None
            }
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        let cleaned: String = match self.focus {
            Focus::Name => text.split_whitespace().collect::<Vec<_>>().join(" "),
            Focus::Message => text.replace("\r\n", "\n").replace('\r', "\n"),
        };
        self.focused_field().insert_str(cleaned);
    }

    fn focused_input_is_empty(&self) -> bool {
        let field = match self.focus {
            Focus::Name => &self.name_input,
            Focus::Message => &self.message_input,
        };
        field.lines().iter().all(|line| line.is_empty())
    }

    pub fn submit_name(&mut self) -> Option<Effect> {
        let name = field_text(&self.name_input);
        match self.widget.begin_start_session(&name) {
            Ok(request) => Some(Effect::Dispatch(request)),
            Err(rejected) => {
                self.alert = Some(rejected.to_string());
                None
            }
        }
    }

    pub fn submit_message(&mut self) -> Option<Effect> {
        let text = field_text(&self.message_input);
        if let Some(command) = text.trim().strip_prefix('/') {
            let command = command.to_string();
            self.message_input = text_field(None);
            self.refresh_fields();
            return self.run_command(&command);
        }

        match self.widget.begin_send(&text) {
            SendOutcome::Ignored => None,
            SendOutcome::Queued => {
                self.message_input = text_field(None);
                self.refresh_fields();
                None
            }
            SendOutcome::Dispatch(request) => {
                self.message_input = text_field(None);
                self.refresh_fields();
                Some(Effect::Dispatch(request))
            }
        }
    }

    fn run_command(&mut self, command: &str) -> Option<Effect> {
        let name = command.split_whitespace().next().unwrap_or_default();
        match name.to_ascii_lowercase().as_str() {
            "memories" => match self.widget.state().current_user() {
                Some(user_id) => Some(Effect::LoadMemories {
                    user_id: user_id.to_string(),
                }),
                None => {
                    self.alert = Some("Start a session to see what I remember.".to_string());
                    None
                }
            },
            "clear" => {
                self.widget.log_mut().clear();
                None
            }
            "help" => {
                self.alert = Some(HELP_TEXT.to_string());
                None
            }
            "quit" | "exit" => {
                self.exit_requested = true;
                None
            }
            _ => {
                self.alert = Some(format!("Unknown command: /{name}. Type /help for commands."));
                None
            }
        }
    }

    pub fn apply_completion(&mut self, completion: Completion) -> Option<Effect> {
        let was_active = self.widget.state().is_active();
        let next = self.widget.complete(completion);
        if !was_active && self.widget.state().is_active() {
            self.set_focus(Focus::Message);
        }
        next.map(Effect::Dispatch)
    }

    pub fn apply_memories(
        &mut self,
        user_id: &str,
        result: Result<ApiReply<MemoriesResponse>, ApiError>,
    ) {
        match result {
            Ok(reply) if reply.is_ok() => {
                self.widget
                    .add_message(Role::Assistant, &format_memories(user_id, &reply.body));
            }
            Ok(reply) => {
                warn!(status = reply.status.as_u16(), payload = %reply.raw, "memories request rejected");
                self.alert = Some(format!(
                    "Couldn't load memories (HTTP {}).",
                    reply.status.as_u16()
                ));
            }
            Err(err) => {
                error!(error = %err, "memories request failed");
                self.alert = Some("Couldn't load memories. Please check your connection.".to_string());
            }
        }
    }
}

fn style_field(field: &mut TextArea<'static>, title: &'static str, focused: bool) {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    field.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title),
    );
    field.set_cursor_style(if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    });
}
