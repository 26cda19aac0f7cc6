//! Contact handle validation and deep-link canonicalization.

use regex::Regex;
use serde::Deserialize;
use shared::protocol::SocialNetwork;
use std::sync::LazyLock;
use url::Url;

/// How the social field is filled in a given form layout.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SocialMode {
    /// A full `t.me` / `wa.me` link, network inferred from the host.
    Link,
    /// A short handle or number plus an explicitly chosen network.
    Handle,
}

static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?(?:wa\.me|api\.whatsapp\.com|t\.me|telegram\.me)/\S+$")
        .expect("link pattern is valid")
});

// ASCII only: Telegram usernames cannot hold other letters.
static HANDLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[@+A-Za-z0-9][A-Za-z0-9_.+\-() ]{3,}$").expect("handle pattern is valid")
});

/// Shortest digit run accepted as a WhatsApp number.
const MIN_WHATSAPP_DIGITS: usize = 10;

pub fn is_contact_link(value: &str) -> bool {
    LINK_PATTERN.is_match(value.trim())
}

pub fn is_contact_handle(value: &str) -> bool {
    HANDLE_PATTERN.is_match(value.trim())
}

/// Whether `handle` can be reached on `network`.
///
/// WhatsApp contacts are phone numbers, so a handle without enough digits
/// has no deep link there.
pub fn is_handle_for(network: SocialNetwork, handle: &str) -> bool {
    match network {
        SocialNetwork::Telegram => true,
        SocialNetwork::Whatsapp => {
            handle.chars().filter(char::is_ascii_digit).count() >= MIN_WHATSAPP_DIGITS
        }
    }
}

/// Network a contact link points to, if it is one we accept.
pub fn network_of_link(link: &str) -> Option<SocialNetwork> {
    if !is_contact_link(link) {
        return None;
    }
    let url = Url::parse(link.trim()).ok()?;
    match url.host_str()?.trim_start_matches("www.") {
        "t.me" | "telegram.me" => Some(SocialNetwork::Telegram),
        "wa.me" | "api.whatsapp.com" => Some(SocialNetwork::Whatsapp),
        _ => None,
    }
}

/// Deep link for a handle typed in handle mode.
///
/// Telegram handles drop their `@`; WhatsApp contacts are reduced to the
/// digits of the number.
pub fn deep_link(network: SocialNetwork, handle: &str) -> String {
    let handle = handle.trim();
    match network {
        SocialNetwork::Telegram => {
            format!("https://t.me/{}", handle.trim_start_matches('@'))
        }
        SocialNetwork::Whatsapp => {
            let digits: String = handle.chars().filter(char::is_ascii_digit).collect();
            format!("https://wa.me/{digits}")
        }
    }
}
