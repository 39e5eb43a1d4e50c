use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::api::{
    ChatRequest, ChatResponse, MemoriesResponse, StartSessionRequest, StartSessionResponse,
    CHAT_PATH, MEMORIES_PATH, START_SESSION_PATH,
};
use crate::utils::url::construct_api_url;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, timeout, or body read failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with something that is not JSON.
    #[error("response ({status}) was not valid JSON: {source}")]
    Decode {
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A reply that decoded as JSON, whatever its status code.
#[derive(Debug, Clone)]
pub struct ApiReply<T> {
    pub status: StatusCode,
    pub body: T,
    pub raw: serde_json::Value,
}

impl<T> ApiReply<T> {
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }
}

impl<T: DeserializeOwned + Default> ApiReply<T> {
    /// Decode `text` as JSON. A JSON value that does not match `T` yields
    /// `T::default()` so the caller sees the shape problem, not an error.
    pub fn decode(status: StatusCode, text: &str) -> Result<Self, ApiError> {
        let raw: serde_json::Value =
            serde_json::from_str(text).map_err(|source| ApiError::Decode {
                status: status.as_u16(),
                body: text.to_string(),
                source,
            })?;
        let body = serde_json::from_value(raw.clone()).unwrap_or_default();
        Ok(Self { status, body, raw })
    }
}

/// The two calls the chat widget needs, plus the memory listing.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn start_session(&self, user_id: &str)
        -> Result<ApiReply<StartSessionResponse>, ApiError>;

    async fn chat(&self, user_id: &str, message: &str)
        -> Result<ApiReply<ChatResponse>, ApiError>;

    async fn memories(&self, user_id: &str) -> Result<ApiReply<MemoriesResponse>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into(),
        })
    }

    async fn read_reply<T: DeserializeOwned + Default>(
        response: reqwest::Response,
    ) -> Result<ApiReply<T>, ApiError> {
        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "response received");
        ApiReply::decode(status, &text)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn start_session(
        &self,
        user_id: &str,
    ) -> Result<ApiReply<StartSessionResponse>, ApiError> {
        let url = construct_api_url(&self.base_url, START_SESSION_PATH);
        debug!(%url, "starting session");
        let response = self
            .client
            .post(url)
            .json(&StartSessionRequest { user_id })
            .send()
            .await?;
        Self::read_reply(response).await
    }

    async fn chat(&self, user_id: &str, message: &str) -> Result<ApiReply<ChatResponse>, ApiError> {
        let url = construct_api_url(&self.base_url, CHAT_PATH);
        debug!(%url, chars = message.chars().count(), "sending chat message");
        let response = self
            .client
            .post(url)
            .json(&ChatRequest { user_id, message })
            .send()
            .await?;
        Self::read_reply(response).await
    }

    async fn memories(&self, user_id: &str) -> Result<ApiReply<MemoriesResponse>, ApiError> {
        let url = construct_api_url(&self.base_url, MEMORIES_PATH);
        let response = self
            .client
            .get(url)
            .query(&[("user_id", user_id)])
            .send()
            .await?;
        Self::read_reply(response).await
    }
}
