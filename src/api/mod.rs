//! Request and response payloads for the assistant server, plus the
//! [`client`] that sends them.
//!
//! Response types are deliberately lenient: every field is optional so a
//! reply with an unexpected shape still decodes, and the caller decides
//! whether the missing field is an anomaly.

use serde::{Deserialize, Serialize};

pub mod client;

pub use client::{ApiError, ApiReply, ChatBackend, HttpBackend};

pub const START_SESSION_PATH: &str = "api/start_session";
pub const CHAT_PATH: &str = "api/chat";
pub const MEMORIES_PATH: &str = "api/memories";

#[derive(Debug, Clone, Serialize)]
pub struct StartSessionRequest<'a> {
    pub user_id: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartSessionResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
}

impl StartSessionResponse {
    /// The greeting, if the server sent a non-blank one.
    pub fn usable_message(&self) -> Option<&str> {
        non_blank(self.message.as_deref())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub user_id: &'a str,
    pub message: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
}

impl ChatResponse {
    pub fn usable_response(&self) -> Option<&str> {
        non_blank(self.response.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoriesResponse {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub items: Vec<MemoryItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub memory: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}
