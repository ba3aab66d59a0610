//! Chat transport: inbound classification and outbound replies

mod telegram;

pub use telegram::{TelegramConfig, TelegramGateway, DEFAULT_TELEGRAM_API};

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// One chat; also the conversation key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub i64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outbound message; `choices` render as a one-time keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub choices: Option<Vec<String>>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            choices: None,
        }
    }

    pub fn with_choices(text: impl Into<String>, choices: Vec<String>) -> Self {
        Self {
            text: text.into(),
            choices: Some(choices),
        }
    }
}

/// Classified user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start,
    Cancel,
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub session: SessionId,
    pub input: Input,
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Chat API error {code}: {description}")]
    Api { code: i64, description: String },
    #[error("Malformed chat API response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        // The request URL embeds the bot token
        let e = e.without_url();
        if e.is_decode() {
            ChatError::Malformed(e.to_string())
        } else {
            ChatError::Network(e.to_string())
        }
    }
}

/// Outbound side of the chat transport
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn send_reply(&self, session: SessionId, reply: &Reply) -> Result<(), ChatError>;
}

#[async_trait]
impl<T: ChatGateway + ?Sized> ChatGateway for Arc<T> {
    async fn send_reply(&self, session: SessionId, reply: &Reply) -> Result<(), ChatError> {
        (**self).send_reply(session, reply).await
    }
}
