//! Turns rendered [`Markup`] into styled ratatui lines.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::log::{ChatLog, LogEntry};
use crate::core::markup::{Inline, Markup, BULLET};
use crate::core::message::Role;

pub const TYPING_FRAMES: [&str; 3] = ["○", "◐", "●"];

fn role_label(role: Role) -> Span<'static> {
    match role {
        Role::User => Span::styled(
            "You",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Role::Assistant => Span::styled(
            "Assistant",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
    }
}

struct LineBuilder {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
}

impl LineBuilder {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            current: Vec::new(),
        }
    }

    fn push(&mut self, text: impl Into<String>, style: Style) {
        let text = text.into();
        if !text.is_empty() {
            self.current.push(Span::styled(text, style));
        }
    }

    fn break_line(&mut self) {
        self.lines
            .push(Line::from(std::mem::take(&mut self.current)));
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.break_line();
        self.lines
    }
}

fn push_inlines(builder: &mut LineBuilder, inlines: &[Inline], style: Style) {
    for inline in inlines {
        match inline {
            Inline::Text(text) => builder.push(text.clone(), style),
            Inline::Strong(children) => {
                push_inlines(builder, children, style.add_modifier(Modifier::BOLD))
            }
            Inline::Emphasis(children) => {
                push_inlines(builder, children, style.add_modifier(Modifier::ITALIC))
            }
            Inline::LineBreak => builder.break_line(),
            Inline::Bullet => builder.push(BULLET, style),
            Inline::SoftBreak => builder.push(" ", style),
        }
    }
}

/// Lines for one message body; paragraphs are separated by a blank line.
pub fn markup_lines(markup: &Markup, base: Style) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (index, paragraph) in markup.paragraphs().iter().enumerate() {
        if index > 0 {
            lines.push(Line::default());
        }
        let mut builder = LineBuilder::new();
        push_inlines(&mut builder, &paragraph.inlines, base);
        lines.extend(builder.finish());
    }
    lines
}

/// The whole transcript, with the typing indicator drawn at `frame`.
pub fn transcript_lines(log: &ChatLog, frame: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for entry in log.entries() {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        match entry {
            LogEntry::Message { role, body, .. } => {
                lines.push(Line::from(role_label(*role)));
                lines.extend(markup_lines(body, Style::default()));
            }
            LogEntry::Typing { .. } => {
                let symbol = TYPING_FRAMES[frame % TYPING_FRAMES.len()];
                lines.push(Line::from(vec![
                    role_label(Role::Assistant),
                    Span::raw(" "),
                    Span::styled(symbol, Style::default().fg(Color::Yellow)),
                ]));
            }
        }
    }
    lines
}
