use crate::config::Config;
use crate::credentials::CredentialsProvider;
use crate::dispatcher::Dispatcher;
use crate::errors::{RelayError, Result};
use crate::message;
use crate::metrics_defs::REQUESTS;
use crate::policy::DeliveryPolicy;
use http::{Method, StatusCode};
use hyper::body::Bytes;
use hyper::{Request, Response};
use shared::counter;
use shared::http::make_json_response;
use shared::protocol::{FormSubmission, RelayFailure, RelaySuccess};
use std::sync::Arc;

const SUCCESS_MESSAGE: &str = "Данные успешно отправлены";
const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
const CONFIGURATION_ERROR: &str = "Server configuration error";
const INTERNAL_ERROR: &str = "Внутренняя ошибка сервера";

/// Stateless handler for one submission.
///
/// Every invocation re-reads credentials, renders the message and fans it
/// out. Whatever happens, the caller gets a well-formed JSON response.
pub struct RelayHandler {
    credentials: Arc<dyn CredentialsProvider>,
    dispatcher: Dispatcher,
    policy: DeliveryPolicy,
    report_results: bool,
}

impl RelayHandler {
    pub fn new(
        config: &Config,
        credentials: Arc<dyn CredentialsProvider>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            credentials,
            dispatcher,
            policy: config.delivery_policy,
            report_results: config.report_results,
        }
    }

    pub async fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        if request.method() != Method::POST {
            counter!(REQUESTS, "outcome" => "method_not_allowed").increment(1);
            return make_json_response(
                StatusCode::METHOD_NOT_ALLOWED,
                &RelayFailure::new(METHOD_NOT_ALLOWED),
            );
        }

        match self.relay(request.into_body()).await {
            Ok(response) => response,
            Err(RelayError::MissingConfiguration(what)) => {
                tracing::error!(missing = what, "Relay is not configured");
                counter!(REQUESTS, "outcome" => "configuration_error").increment(1);
                make_json_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &RelayFailure::new(CONFIGURATION_ERROR),
                )
            }
            Err(e) => {
                tracing::error!(error = %e, "Relay failed");
                counter!(REQUESTS, "outcome" => "error").increment(1);
                internal_error_response()
            }
        }
    }

    async fn relay(&self, body: Bytes) -> Result<Response<Bytes>> {
        // Configuration is checked before the payload is even looked at
        let credentials = self.credentials.credentials()?;

        let submission: FormSubmission = serde_json::from_slice(&body)?;
        let text = message::render(&submission);

        let results = self
            .dispatcher
            .dispatch(&credentials.bot_token, &credentials.chat_ids, &text)
            .await;

        let delivered = results.iter().filter(|r| r.success).count();
        tracing::info!(
            destinations = results.len(),
            delivered,
            policy = ?self.policy,
            "Submission relayed"
        );

        if self.policy.is_satisfied(&results) {
            counter!(REQUESTS, "outcome" => "delivered").increment(1);
            let body = RelaySuccess {
                message: SUCCESS_MESSAGE.to_string(),
                results: self.report_results.then_some(results),
            };
            Ok(make_json_response(StatusCode::OK, &body))
        } else {
            counter!(REQUESTS, "outcome" => "undelivered").increment(1);
            Ok(make_json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &RelayFailure::with_details(self.policy.failure_message(), results),
            ))
        }
    }
}

/// Generic 500 used for anything that escapes the normal error mapping.
pub fn internal_error_response() -> Response<Bytes> {
    make_json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &RelayFailure::new(INTERNAL_ERROR),
    )
}
