use crate::config::TelegramConfig;
use crate::errors::{RelayError, Result};

/// Deployment secrets needed to deliver one submission.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub bot_token: String,
    /// Trimmed, non-empty destination chat identifiers in configured order.
    pub chat_ids: Vec<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bot_token", &"<redacted>")
            .field("chat_ids", &self.chat_ids)
            .finish()
    }
}

impl Credentials {
    /// Builds credentials from the raw token and comma-separated chat list.
    ///
    /// Either value being absent or blank is a configuration error, as is a
    /// chat list that holds nothing but separators.
    pub fn from_raw(bot_token: Option<&str>, chat_ids: Option<&str>) -> Result<Self> {
        let bot_token = bot_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(RelayError::MissingConfiguration("bot token"))?;

        let chat_ids: Vec<String> = chat_ids
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect();

        if chat_ids.is_empty() {
            return Err(RelayError::MissingConfiguration("chat ids"));
        }

        Ok(Self {
            bot_token: bot_token.to_string(),
            chat_ids,
        })
    }
}

/// Source of credentials, consulted on every relay invocation.
pub trait CredentialsProvider: Send + Sync {
    fn credentials(&self) -> Result<Credentials>;
}

/// Reads credentials from the process environment.
pub struct EnvCredentials {
    bot_token_env: String,
    chat_ids_env: String,
}

impl EnvCredentials {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            bot_token_env: config.bot_token_env.clone(),
            chat_ids_env: config.chat_ids_env.clone(),
        }
    }
}

impl CredentialsProvider for EnvCredentials {
    fn credentials(&self) -> Result<Credentials> {
        let bot_token = std::env::var(&self.bot_token_env).ok();
        let chat_ids = std::env::var(&self.chat_ids_env).ok();
        Credentials::from_raw(bot_token.as_deref(), chat_ids.as_deref())
    }
}
