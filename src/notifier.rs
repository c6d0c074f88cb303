//! # Notifier
//!
//! Outbound message delivery boundary
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: Add request-scoped ids to delivery logs, enforce client timeout
//! - 1.0.0: Initial Telegram Bot API notifier
//!
//! The scheduler talks to a `Notifier` trait object, never to the Telegram
//! API directly. Delivery failures are returned to the caller, which keeps
//! the event un-acknowledged so the next tick retries it.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

use crate::core::response::truncate_for_message;
use crate::core::{Event, TIME_FORMAT};

/// HTTP timeout for a single sendMessage call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that can deliver a text message to a chat
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str) -> Result<()>;
}

/// Notifier backed by the Telegram Bot API
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
}

impl TelegramNotifier {
    /// Build a notifier for the given bot token
    pub fn new(token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(TelegramNotifier {
            client,
            api_base: format!("https://api.telegram.org/bot{token}"),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: i64, text: &str) -> Result<()> {
        let request_id = Uuid::new_v4();
        debug!("[{request_id}] Sending message to chat {chat_id}");

        let body = json!({
            "chat_id": chat_id,
            "text": truncate_for_message(text),
            "parse_mode": "HTML",
        });

        let response = self
            .client
            .post(format!("{}/sendMessage", self.api_base))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("[{request_id}] sendMessage request failed"))?;

        let status = response.status();
        let payload: serde_json::Value = response
            .json()
            .await
            .with_context(|| format!("[{request_id}] sendMessage returned non-JSON body"))?;

        if !status.is_success() || payload.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            let description = payload
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or("no description");
            bail!("[{request_id}] sendMessage rejected ({status}): {description}");
        }

        info!("[{request_id}] ✅ Delivered message to chat {chat_id}");
        Ok(())
    }
}

/// Render the reminder text for a due event
pub fn render_reminder(event: &Event) -> String {
    let mut text = format!("🔔 Reminder!\n<b>{}</b>", event.title);

    if let Some(time) = event.time {
        text.push_str(&format!("\n🕒 {} today", time.format(TIME_FORMAT)));
    }

    if let Some(description) = &event.description {
        if !description.is_empty() {
            text.push_str(&format!("\n{description}"));
        }
    }

    text
}
