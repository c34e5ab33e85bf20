use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::NotifyError;

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Push-message sink
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<String>,
}

#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token,
            chat_id,
        }
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", TELEGRAM_API_URL, self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        // Telegram reports failures in the body as well as the status code
        let response = self
            .client
            .post(self.send_message_url())
            .json(&request)
            .send()
            .await?
            .json::<TelegramResponse>()
            .await?;

        check_response(response)
    }
}

fn check_response(response: TelegramResponse) -> Result<(), NotifyError> {
    if response.ok {
        return Ok(());
    }
    Err(NotifyError::Rejected(
        response
            .description
            .unwrap_or_else(|| "no description".to_string()),
    ))
}
