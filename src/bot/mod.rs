pub mod api;
pub mod keyboards;

use crate::dialog::{Engine, Event, Outgoing};
use anyhow::Result;
use api::{Message, TelegramApi, Update};
use std::time::Duration;

const POLL_TIMEOUT_SECS: u64 = 30;

/// Transport glue: pulls updates off the Bot API, feeds them to the
/// conversation engine one at a time and delivers the replies. The
/// sequential loop is what serializes events per session.
pub struct Bot {
    api: TelegramApi,
    engine: Engine,
}

impl Bot {
    pub fn new(api: TelegramApi, engine: Engine) -> Self {
        Self { api, engine }
    }

    pub async fn run(&self) -> Result<()> {
        let mut offset = 0i64;
        loop {
            let updates = match self.api.get_updates(offset, POLL_TIMEOUT_SECS).await {
                Ok(updates) => updates,
                Err(err) => {
                    tracing::error!("getUpdates failed: {err:#}");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    continue;
                }
            };
            for update in updates {
                offset = offset.max(update.update_id + 1);
                if let Err(err) = self.dispatch(update).await {
                    // Fatal for this request only; the form involved was
                    // already cleared by the engine.
                    tracing::error!("Update handling failed: {err:#}");
                }
            }
        }
    }

    async fn dispatch(&self, update: Update) -> Result<()> {
        if let Some(message) = update.message {
            return self.dispatch_message(message).await;
        }
        if let Some(callback) = update.callback_query {
            let session_id = callback.from.id;
            let chat_id = callback
                .message
                .as_ref()
                .map(|message| message.chat.id)
                .unwrap_or(session_id);
            let data = callback.data.clone().unwrap_or_default();
            let replies = self.engine.handle(session_id, Event::Callback { data }).await?;

            let mut answered = false;
            for reply in replies {
                match reply {
                    Outgoing::Alert(text) => {
                        self.api
                            .answer_callback_query(&callback.id, Some(&text), true)
                            .await?;
                        answered = true;
                    }
                    Outgoing::Message { text, keyboard } => {
                        self.api
                            .send_message(chat_id, &text, keyboard.map(keyboards::render))
                            .await?;
                    }
                }
            }
            if !answered {
                self.api
                    .answer_callback_query(&callback.id, None, false)
                    .await?;
            }
        }
        Ok(())
    }

    async fn dispatch_message(&self, message: Message) -> Result<()> {
        let chat_id = message.chat.id;
        let event = if let Some(contact) = message.contact {
            // A forwarded contact card carries someone else's user id;
            // only the sender's own contact proves number ownership.
            let own = match (contact.user_id, message.from.as_ref()) {
                (Some(user_id), Some(from)) => user_id == from.id,
                (Some(_), None) => false,
                (None, _) => true,
            };
            Event::Contact {
                phone: contact.phone_number,
                own,
            }
        } else if let Some(text) = message.text {
            if text.starts_with("/start") {
                Event::Start
            } else {
                Event::Text(text)
            }
        } else {
            return Ok(());
        };

        let replies = self.engine.handle(chat_id, event).await?;
        for reply in replies {
            match reply {
                Outgoing::Message { text, keyboard } => {
                    self.api
                        .send_message(chat_id, &text, keyboard.map(keyboards::render))
                        .await?;
                }
                Outgoing::Alert(text) => {
                    // Alerts only make sense for callbacks; degrade to a
                    // plain message elsewhere.
                    self.api.send_message(chat_id, &text, None).await?;
                }
            }
        }
        Ok(())
    }
}
