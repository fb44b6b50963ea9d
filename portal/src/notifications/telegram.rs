use async_trait::async_trait;
use reqwest::Client;
use std::{sync::Arc, time::Duration};
use tracing::warn;

use crate::notifications::{PortalNotifier, noop_portal_notifier};

const TELEGRAM_HTTP_TIMEOUT_SECS: u64 = 5;
const TELEGRAM_API_BASE: &str = "https://api.telegram.org/bot";

pub struct TelegramNotifier {
    chat_id: String,
    endpoint: String,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl AsRef<str>, chat_id: impl Into<String>) -> Self {
        let timeout = Duration::from_secs(TELEGRAM_HTTP_TIMEOUT_SECS);
        let client = Client::builder().timeout(timeout).build().unwrap_or_else(|err| {
            warn!(
                "Failed to build Telegram reqwest client with timeout ({}); using default client",
                err
            );
            Client::new()
        });

        Self {
            chat_id: chat_id.into(),
            endpoint: format!("{TELEGRAM_API_BASE}{}/sendMessage", bot_token.as_ref()),
            client,
        }
    }

    async fn send_message(&self, text: &str, parse_mode: Option<&str>) -> Result<(), String> {
        let mut payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
            "disable_web_page_preview": true
        });
        if let Some(parse_mode) = parse_mode {
            payload["parse_mode"] = serde_json::Value::String(parse_mode.to_string());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|err| format!("request error: {err}"))?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(format!("telegram API returned {status}: {body}"))
    }
}

fn escape_markdown_v2(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' | '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '=' | '|' | '{'
            | '}' | '.' | '!' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

#[async_trait]
impl PortalNotifier for TelegramNotifier {
    async fn notify_startup(&self) {
        let message = "Credential portal started and is watching the wallet session.";
        if let Err(err) = self.send_message(message, None).await {
            warn!("Failed Telegram startup notification: {}", err);
        }
    }

    async fn notify_wallet_connected(&self, address: &str) {
        let message = format!("🔗 *Wallet connected*: `{}`", escape_markdown_v2(address));
        if let Err(err) = self.send_message(&message, Some("MarkdownV2")).await {
            warn!("Failed Telegram connect notification: {}", err);
        }
    }

    async fn notify_wallet_disconnected(&self) {
        let message = "⚠️ Wallet removed all accounts; session disconnected.";
        if let Err(err) = self.send_message(message, None).await {
            warn!("Failed Telegram disconnect notification: {}", err);
        }
    }

    async fn notify_chain_changed(&self, network: &str) {
        let message = format!("🔁 *Chain changed* to {}; portal reloading.", escape_markdown_v2(network));
        if let Err(err) = self.send_message(&message, Some("MarkdownV2")).await {
            warn!("Failed Telegram chain notification: {}", err);
        }
    }

    async fn notify_credential_minted(&self, tx_hash: &str, student: &str) {
        let message = format!(
            "🎓 *Credential minted* for {}\n🧾 tx: `{}`",
            escape_markdown_v2(student),
            escape_markdown_v2(tx_hash)
        );
        if let Err(err) = self.send_message(&message, Some("MarkdownV2")).await {
            warn!("Failed Telegram mint notification: {}", err);
        }
    }
}

pub fn telegram_notifier_from_env() -> Arc<dyn PortalNotifier> {
    let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let chat_id = std::env::var("TELEGRAM_CHAT_ID")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match (bot_token, chat_id) {
        (Some(token), Some(chat_id)) => Arc::new(TelegramNotifier::new(token, chat_id)),
        (Some(_), None) => {
            warn!("TELEGRAM_BOT_TOKEN is set but TELEGRAM_CHAT_ID is missing; Telegram notifications disabled");
            noop_portal_notifier()
        }
        (None, Some(_)) => {
            warn!("TELEGRAM_CHAT_ID is set but TELEGRAM_BOT_TOKEN is missing; Telegram notifications disabled");
            noop_portal_notifier()
        }
        (None, None) => noop_portal_notifier(),
    }
}
