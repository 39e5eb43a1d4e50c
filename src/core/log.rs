//! The chat transcript as an ordered list of attached nodes.
//!
//! Every entry gets a [`NodeId`] when it is attached so that callers holding
//! on to a node (the typing indicator) can check whether it is still part of
//! the log after someone else cleared it.

use crate::core::markup::{render_text, Markup};
use crate::core::message::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Message {
        id: NodeId,
        role: Role,
        text: String,
        body: Markup,
    },
    Typing {
        id: NodeId,
    },
}

impl LogEntry {
    pub fn id(&self) -> NodeId {
        match self {
            LogEntry::Message { id, .. } | LogEntry::Typing { id } => *id,
        }
    }

    pub fn is_typing(&self) -> bool {
        matches!(self, LogEntry::Typing { .. })
    }
}

#[derive(Debug, Default)]
pub struct ChatLog {
    entries: Vec<LogEntry>,
    next_id: u64,
    /// Lines scrolled up from the bottom; zero keeps the newest entry in view.
    lines_above_bottom: u16,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Messages in display order, skipping the typing indicator.
    pub fn messages(&self) -> impl Iterator<Item = (Role, &str)> {
        self.entries.iter().filter_map(|entry| match entry {
            LogEntry::Message { role, text, .. } => Some((*role, text.as_str())),
            LogEntry::Typing { .. } => None,
        })
    }

    pub fn typing_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_typing()).count()
    }

    /// Append a message row and scroll to the bottom.
    pub fn push_message(&mut self, role: Role, text: &str) -> NodeId {
        let id = self.allocate_id();
        self.entries.push(LogEntry::Message {
            id,
            role,
            text: text.to_string(),
            body: render_text(text),
        });
        self.scroll_to_bottom();
        id
    }

    pub fn attach_typing(&mut self) -> NodeId {
        let id = self.allocate_id();
        self.entries.push(LogEntry::Typing { id });
        self.scroll_to_bottom();
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.entries.iter().any(|entry| entry.id() == id)
    }

    /// Detach a node. Returns false when it was not attached.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id() != id);
        self.entries.len() != before
    }

    /// Move an attached node to the end of the log.
    pub fn move_to_end(&mut self, id: NodeId) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.id() == id) else {
            return false;
        };
        let entry = self.entries.remove(index);
        self.entries.push(entry);
        self.scroll_to_bottom();
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.lines_above_bottom = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.lines_above_bottom = 0;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.lines_above_bottom = self.lines_above_bottom.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.lines_above_bottom = self.lines_above_bottom.saturating_sub(lines);
    }

    pub fn is_at_bottom(&self) -> bool {
        self.lines_above_bottom == 0
    }

    /// Top line to show for a viewport of `available` lines over `total`
    /// wrapped lines. Clamps the stored offset so scrolling past the top
    /// cannot accumulate.
    pub fn scroll_offset(&mut self, total: u16, available: u16) -> u16 {
        let max_offset = total.saturating_sub(available);
        self.lines_above_bottom = self.lines_above_bottom.min(max_offset);
        max_offset - self.lines_above_bottom
    }

    fn allocate_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }
}
