use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const API_BASE: &str = "https://api.telegram.org";

// Unknown payload fields are ignored on deserialization, so only the
// parts of the Bot API the dispatcher consumes are modeled here.

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
    pub contact: Option<Contact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    pub phone_number: String,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

/// Minimal Telegram Bot API client: long polling in, messages and
/// callback answers out.
pub struct TelegramApi {
    client: reqwest::Client,
    base: String,
}

impl TelegramApi {
    pub fn new(token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: format!("{API_BASE}/bot{token}"),
        }
    }

    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let response = self
            .client
            .get(format!("{}/getUpdates", self.base))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout_secs.to_string()),
                (
                    "allowed_updates",
                    "[\"message\",\"callback_query\"]".to_string(),
                ),
            ])
            .timeout(Duration::from_secs(timeout_secs + 10))
            .send()
            .await
            .context("getUpdates request failed")?;
        unwrap_envelope(response).await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<Value>,
    ) -> Result<()> {
        let mut payload = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(markup) = reply_markup {
            payload["reply_markup"] = markup;
        }
        let response = self
            .client
            .post(format!("{}/sendMessage", self.base))
            .json(&payload)
            .send()
            .await
            .context("sendMessage request failed")?;
        let _: Value = unwrap_envelope(response).await?;
        Ok(())
    }

    pub async fn answer_callback_query(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<()> {
        let mut payload = serde_json::json!({
            "callback_query_id": callback_id,
            "show_alert": show_alert,
        });
        if let Some(text) = text {
            payload["text"] = Value::String(text.to_string());
        }
        let response = self
            .client
            .post(format!("{}/answerCallbackQuery", self.base))
            .json(&payload)
            .send()
            .await
            .context("answerCallbackQuery request failed")?;
        let _: Value = unwrap_envelope(response).await?;
        Ok(())
    }
}

async fn unwrap_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await.context("Failed to read API response")?;
    let envelope: Envelope<T> = serde_json::from_str(&body)
        .with_context(|| format!("Malformed API response ({status}): {body}"))?;
    if !envelope.ok {
        anyhow::bail!(
            "Telegram API error: {}",
            envelope.description.unwrap_or_else(|| status.to_string())
        );
    }
    envelope
        .result
        .ok_or_else(|| anyhow::anyhow!("Telegram API response without result"))
}
