use serde::Deserialize;
use shared::protocol::DeliveryResult;

/// Rule deciding overall success from the per-destination outcomes.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryPolicy {
    /// At least one destination received the message.
    #[default]
    Any,
    /// Every destination received the message.
    All,
}

impl DeliveryPolicy {
    pub fn is_satisfied(&self, results: &[DeliveryResult]) -> bool {
        match self {
            DeliveryPolicy::Any => results.iter().any(|r| r.success),
            DeliveryPolicy::All => !results.is_empty() && results.iter().all(|r| r.success),
        }
    }

    /// Error text returned when the policy is not satisfied.
    pub fn failure_message(&self) -> &'static str {
        match self {
            DeliveryPolicy::Any => "Ошибка при отправке во все чаты",
            DeliveryPolicy::All => "Ошибка при отправке в один или несколько чатов",
        }
    }
}
