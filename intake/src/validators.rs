//! Pure field predicates.
//!
//! Each validator is total: it inspects a value and returns `Ok(())` or the
//! [`FieldError`] whose message is shown next to the field. Nothing here
//! touches form state.

use crate::phone;
use crate::social::{self, SocialMode};
use chrono::NaiveDate;
use shared::protocol::SocialNetwork;
use thiserror::Error;

/// Date format produced by a date picker.
pub const PICKER_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{0} обязательно для заполнения.")]
    Required(&'static str),

    #[error("Введите корректную дату рождения.")]
    InvalidDate,

    #[error("Введите корректный номер телефона.")]
    InvalidPhone,

    #[error("Введите корректную ссылку на Telegram или WhatsApp.")]
    InvalidSocialLink,

    #[error("Введите корректный ник или номер телефона.")]
    InvalidSocialHandle,

    #[error("{0}")]
    NothingSelected(&'static str),
}

pub type Verdict = Result<(), FieldError>;

pub fn validate_required(label: &'static str, value: &str) -> Verdict {
    if value.trim().is_empty() {
        return Err(FieldError::Required(label));
    }
    Ok(())
}

pub fn validate_birth_date(label: &'static str, value: &str) -> Verdict {
    validate_required(label, value)?;
    NaiveDate::parse_from_str(value.trim(), PICKER_DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| FieldError::InvalidDate)
}

pub fn validate_phone(label: &'static str, value: &str) -> Verdict {
    validate_required(label, value)?;
    if !phone::is_russian_mobile(value) {
        return Err(FieldError::InvalidPhone);
    }
    Ok(())
}

/// In handle mode, `network` is the network chosen next to the field, if
/// any; the handle must be reachable there.
pub fn validate_social(
    label: &'static str,
    mode: SocialMode,
    network: Option<SocialNetwork>,
    value: &str,
) -> Verdict {
    validate_required(label, value)?;
    match mode {
        SocialMode::Link if !social::is_contact_link(value) => Err(FieldError::InvalidSocialLink),
        SocialMode::Link => Ok(()),
        SocialMode::Handle => {
            let reachable = network.is_none_or(|n| social::is_handle_for(n, value));
            if !social::is_contact_handle(value) || !reachable {
                return Err(FieldError::InvalidSocialHandle);
            }
            Ok(())
        }
    }
}

/// Single-choice groups: exactly one option must be selected.
pub fn validate_choice(prompt: &'static str, selected: Option<usize>) -> Verdict {
    match selected {
        Some(_) => Ok(()),
        None => Err(FieldError::NothingSelected(prompt)),
    }
}

/// Multi-choice groups: at least one option must be selected.
pub fn validate_multi_choice(prompt: &'static str, selected_count: usize) -> Verdict {
    if selected_count == 0 {
        return Err(FieldError::NothingSelected(prompt));
    }
    Ok(())
}
