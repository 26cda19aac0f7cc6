//! Wire types exchanged between the intake form and the relay.
//!
//! The client posts a [`FormSubmission`] as JSON to the relay; the relay
//! answers with [`RelaySuccess`] or [`RelayFailure`], optionally carrying one
//! [`DeliveryResult`] per destination chat.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Payload built from the form state on each submit attempt.
///
/// Optional fields are omitted from the JSON when the active form layout
/// does not collect them.
///
/// # Example
/// ```json
/// {
///   "firstName": "Иван",
///   "lastName": "Петров",
///   "birthDate": "01.02.1990",
///   "phone": "+7 (999) 123-45-67",
///   "social": "https://t.me/ivan_p",
///   "socialDisplay": "@ivan_p",
///   "socialType": "telegram",
///   "gender": "Мужской",
///   "contactMethod": "Telegram",
///   "services": "Маникюр, Педикюр"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    pub first_name: String,
    pub last_name: String,
    /// Always `DD.MM.YYYY`.
    pub birth_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Canonical deep link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social: Option<String>,
    /// Handle or link as the user typed it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_type: Option<SocialNetwork>,
    pub gender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_method: Option<String>,
    /// Selected service labels joined with `", "`.
    pub services: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialNetwork {
    Telegram,
    Whatsapp,
}

impl SocialNetwork {
    pub const fn display_name(&self) -> &'static str {
        match self {
            SocialNetwork::Telegram => "Telegram",
            SocialNetwork::Whatsapp => "WhatsApp",
        }
    }
}

impl fmt::Display for SocialNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Outcome of delivering the rendered message to one destination chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryResult {
    #[serde(rename = "chatId")]
    pub destination: String,
    pub success: bool,
    /// Body returned by the messaging API, if one was received.
    #[serde(rename = "result", default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<JsonValue>,
    /// Transport failure, if the API could not be reached.
    #[serde(rename = "error", default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl DeliveryResult {
    pub fn answered(destination: String, success: bool, response_body: JsonValue) -> Self {
        Self {
            destination,
            success,
            response_body: Some(response_body),
            error_detail: None,
        }
    }

    pub fn failed(destination: String, error_detail: String) -> Self {
        Self {
            destination,
            success: false,
            response_body: None,
            error_detail: Some(error_detail),
        }
    }
}

/// Body of a `200` relay response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaySuccess {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<DeliveryResult>>,
}

/// Body of every non-2xx relay response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayFailure {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<DeliveryResult>>,
}

impl RelayFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: Vec<DeliveryResult>) -> Self {
        Self {
            error: error.into(),
            details: Some(details),
        }
    }
}
