use crate::policy::DeliveryPolicy;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Relay path must start with '/': {0}")]
    InvalidPath(String),

    #[error("Empty environment variable name for {0}")]
    EmptyEnvName(&'static str),

    #[error("HTTP timeout cannot be 0")]
    InvalidTimeout,
}

/// Relay configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Main listener for form submissions
    pub listener: Listener,
    /// Admin listener for health and readiness checks
    pub admin_listener: Listener,
    /// Path the relay accepts submissions on
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub delivery_policy: DeliveryPolicy,
    /// Whether a successful response lists the per-destination outcomes
    #[serde(default = "default_report_results")]
    pub report_results: bool,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

fn default_path() -> String {
    "/relay".to_string()
}

fn default_report_results() -> bool {
    true
}

impl Config {
    /// Validates the relay configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if !self.path.starts_with('/') {
            return Err(ValidationError::InvalidPath(self.path.clone()));
        }

        self.telegram.validate()
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    /// Validates the listener configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

/// Messaging API settings.
///
/// The bot token and chat list are secrets and never live in the file: only
/// the names of the environment variables holding them do. They are read on
/// every invocation.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TelegramConfig {
    #[serde(default = "default_api_url")]
    pub api_url: Url,
    #[serde(default = "default_bot_token_env")]
    pub bot_token_env: String,
    #[serde(default = "default_chat_ids_env")]
    pub chat_ids_env: String,
    /// Applies to each outbound call. Unset means no client-side timeout.
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
}

fn default_api_url() -> Url {
    Url::parse("https://api.telegram.org").expect("static url is valid")
}

fn default_bot_token_env() -> String {
    "BOT_TOKEN".to_string()
}

fn default_chat_ids_env() -> String {
    "CHAT_IDS".to_string()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            bot_token_env: default_bot_token_env(),
            chat_ids_env: default_chat_ids_env(),
            http_timeout_secs: None,
        }
    }
}

impl TelegramConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bot_token_env.trim().is_empty() {
            return Err(ValidationError::EmptyEnvName("bot_token_env"));
        }
        if self.chat_ids_env.trim().is_empty() {
            return Err(ValidationError::EmptyEnvName("chat_ids_env"));
        }
        if self.http_timeout_secs == Some(0) {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}
