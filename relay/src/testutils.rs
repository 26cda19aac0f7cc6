use crate::config::{Config, Listener, TelegramConfig};
use crate::credentials::{Credentials, CredentialsProvider};
use crate::dispatcher::Dispatcher;
use crate::errors::Result;
use crate::handler::RelayHandler;
use crate::policy::DeliveryPolicy;
use crate::telegram::TelegramClient;
use std::sync::Arc;
use url::Url;

/// Credentials fixed at construction, in the same raw shape as the environment.
pub struct StaticCredentials {
    bot_token: Option<String>,
    chat_ids: Option<String>,
}

impl StaticCredentials {
    pub fn new(bot_token: &str, chat_ids: &str) -> Self {
        Self {
            bot_token: Some(bot_token.to_string()),
            chat_ids: Some(chat_ids.to_string()),
        }
    }

    pub fn missing() -> Self {
        Self {
            bot_token: None,
            chat_ids: None,
        }
    }
}

impl CredentialsProvider for StaticCredentials {
    fn credentials(&self) -> Result<Credentials> {
        Credentials::from_raw(self.bot_token.as_deref(), self.chat_ids.as_deref())
    }
}

pub fn test_config(api_url: &str, delivery_policy: DeliveryPolicy) -> Config {
    Config {
        listener: Listener {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        admin_listener: Listener {
            host: "127.0.0.1".to_string(),
            port: 3001,
        },
        path: "/relay".to_string(),
        delivery_policy,
        report_results: true,
        telegram: TelegramConfig {
            api_url: Url::parse(api_url).unwrap(),
            ..TelegramConfig::default()
        },
    }
}

pub fn test_handler(config: &Config, credentials: StaticCredentials) -> RelayHandler {
    let dispatcher = Dispatcher::new(TelegramClient::new(&config.telegram).unwrap());
    RelayHandler::new(config, Arc::new(credentials), dispatcher)
}
