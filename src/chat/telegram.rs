//! Telegram Bot API gateway (long polling)

use super::{ChatError, ChatGateway, Inbound, Input, Reply, SessionId};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub api_base: String,
    /// Long-poll wait passed to `getUpdates`
    pub poll_timeout: Duration,
    /// Extra time allowed on top of the long-poll wait
    pub request_timeout: Duration,
}

pub struct TelegramGateway {
    client: reqwest::Client,
    config: TelegramConfig,
    /// Next update id to request
    offset: AtomicI64,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<i64>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

impl TelegramGateway {
    pub fn new(config: TelegramConfig) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(config.poll_timeout + config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            config,
            offset: AtomicI64::new(0),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.config.api_base.trim_end_matches('/'),
            self.config.token
        )
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, ChatError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let parsed: ApiResponse<T> = response.json().await?;

        match parsed {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                ok: true,
                result: None,
                ..
            } => Err(ChatError::Malformed(format!("{method}: ok without result"))),
            ApiResponse {
                error_code,
                description,
                ..
            } => Err(ChatError::Api {
                code: error_code.unwrap_or_else(|| i64::from(status.as_u16())),
                description: description.unwrap_or_default(),
            }),
        }
    }

    /// Wait for the next batch of messages.
    ///
    /// Advances the offset past every update received, including ones that
    /// carry no text.
    pub async fn poll(&self) -> Result<Vec<Inbound>, ChatError> {
        let updates: Vec<Update> = self.call("getUpdates", &self.updates_request()).await?;
        self.acknowledge(&updates);
        Ok(updates.into_iter().filter_map(inbound_from_update).collect())
    }

    fn updates_request(&self) -> Value {
        json!({
            "offset": self.offset.load(Ordering::Acquire),
            "timeout": self.config.poll_timeout.as_secs(),
            "allowed_updates": ["message"],
        })
    }

    /// Never moves the offset backwards
    fn acknowledge(&self, updates: &[Update]) {
        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset.fetch_max(last + 1, Ordering::AcqRel);
        }
    }
}

#[async_trait]
impl ChatGateway for TelegramGateway {
    async fn send_reply(&self, session: SessionId, reply: &Reply) -> Result<(), ChatError> {
        let body = json!({
            "chat_id": session.0,
            "text": reply.text,
            "reply_markup": reply_markup(reply),
        });
        // Result is the sent message; only success matters
        let _: Value = self.call("sendMessage", &body).await?;
        Ok(())
    }
}

fn inbound_from_update(update: Update) -> Option<Inbound> {
    let message = update.message?;
    let text = message.text?;
    Some(Inbound {
        session: SessionId(message.chat.id),
        input: parse_input(&text)?,
    })
}

fn reply_markup(reply: &Reply) -> Value {
    match &reply.choices {
        Some(choices) => {
            let rows: Vec<Value> = choices.iter().map(|c| json!([{ "text": c }])).collect();
            json!({
                "keyboard": rows,
                "one_time_keyboard": true,
                "resize_keyboard": true,
            })
        }
        None => json!({ "remove_keyboard": true }),
    }
}

/// Classify message text; `/start` and `/cancel` may carry an `@botname`
/// suffix. Any other command is dropped.
fn parse_input(text: &str) -> Option<Input> {
    let Some(command) = text.trim().strip_prefix('/') else {
        return Some(Input::Text(text.to_string()));
    };
    let command = command.split_whitespace().next().unwrap_or_default();
    match command.split('@').next().unwrap_or_default() {
        "start" => Some(Input::Start),
        "cancel" => Some(Input::Cancel),
        other => {
            tracing::debug!(command = other, "Ignoring unknown command");
            None
        }
    }
}
