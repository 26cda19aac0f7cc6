use crate::metrics_defs::{DELIVERIES, DELIVERY_DURATION};
use crate::telegram::TelegramClient;
use shared::protocol::DeliveryResult;
use shared::{counter, histogram};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// Fans one rendered message out to every destination chat.
#[derive(Clone)]
pub struct Dispatcher {
    client: TelegramClient,
}

impl Dispatcher {
    pub fn new(client: TelegramClient) -> Self {
        Self { client }
    }

    /// Sends `text` to all `chat_ids` concurrently and waits for every call.
    ///
    /// Results come back in the order of `chat_ids`, regardless of which call
    /// completed first. Failed deliveries are reported, never retried.
    pub async fn dispatch(
        &self,
        bot_token: &str,
        chat_ids: &[String],
        text: &str,
    ) -> Vec<DeliveryResult> {
        let mut join_set = JoinSet::new();
        let bot_token: Arc<str> = Arc::from(bot_token);
        let text: Arc<str> = Arc::from(text);

        // Spawn one delivery per destination
        for (index, chat_id) in chat_ids.iter().enumerate() {
            let client = self.client.clone();
            let bot_token = bot_token.clone();
            let text = text.clone();
            let chat_id = chat_id.clone();

            join_set.spawn(async move {
                let result = deliver(&client, &bot_token, chat_id, &text).await;
                (index, result)
            });
        }

        let mut slots: Vec<Option<DeliveryResult>> = vec![None; chat_ids.len()];

        while let Some(join_result) = join_set.join_next().await {
            match join_result {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => tracing::error!("Delivery task panicked: {}", e),
            }
        }

        // A slot is only empty if its task panicked
        slots
            .into_iter()
            .zip(chat_ids)
            .map(|(slot, chat_id)| {
                slot.unwrap_or_else(|| {
                    DeliveryResult::failed(chat_id.clone(), "delivery task aborted".to_string())
                })
            })
            .collect()
    }
}

async fn deliver(
    client: &TelegramClient,
    bot_token: &str,
    chat_id: String,
    text: &str,
) -> DeliveryResult {
    let started = Instant::now();
    let reply = client.send_message(bot_token, &chat_id, text).await;
    histogram!(DELIVERY_DURATION).record(started.elapsed().as_secs_f64());

    let result = match reply {
        Ok(reply) if reply.status.is_success() => {
            tracing::debug!(chat_id = %chat_id, "Message delivered");
            DeliveryResult::answered(chat_id, true, reply.body)
        }
        Ok(reply) => {
            tracing::error!(
                chat_id = %chat_id,
                status = %reply.status,
                body = %reply.body,
                "Messaging API rejected message"
            );
            DeliveryResult::answered(chat_id, false, reply.body)
        }
        Err(e) => {
            tracing::error!(chat_id = %chat_id, error = %e, "Message delivery failed");
            DeliveryResult::failed(chat_id, e.to_string())
        }
    };

    let outcome = if result.success { "success" } else { "failure" };
    counter!(DELIVERIES, "outcome" => outcome).increment(1);

    result
}
