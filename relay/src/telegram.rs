use crate::config::TelegramConfig;
use crate::errors::{RelayError, Result};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use url::Url;

/// Body of the `sendMessage` call.
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Answer from the messaging API for one `sendMessage` call.
#[derive(Debug)]
pub struct ApiReply {
    pub status: http::StatusCode,
    pub body: JsonValue,
}

/// Thin client for the bot API's message-send endpoint.
#[derive(Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    api_url: Url,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.http_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            api_url: config.api_url.clone(),
        })
    }

    fn send_message_url(&self, bot_token: &str) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_url.as_str().trim_end_matches('/'),
            bot_token
        )
    }

    /// Posts `text` to one chat.
    ///
    /// Any HTTP answer is returned as an [`ApiReply`], whatever its status;
    /// only transport failures are errors. A body that is not JSON is kept
    /// as a JSON string.
    pub async fn send_message(
        &self,
        bot_token: &str,
        chat_id: &str,
        text: &str,
    ) -> Result<ApiReply> {
        let response = self
            .client
            .post(self.send_message_url(bot_token))
            .json(&SendMessage {
                chat_id,
                text,
                parse_mode: "HTML",
            })
            .send()
            .await
            // Strip the URL, it carries the bot token.
            .map_err(|e| RelayError::HttpClientError(e.without_url()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| RelayError::HttpClientError(e.without_url()))?;
        let body = serde_json::from_str(&raw).unwrap_or(JsonValue::String(raw));

        Ok(ApiReply { status, body })
    }
}
