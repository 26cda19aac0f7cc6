pub mod config;
pub mod credentials;
pub mod dispatcher;
pub mod errors;
pub mod handler;
pub mod message;
pub mod metrics_defs;
pub mod policy;
pub mod telegram;

#[cfg(test)]
mod testutils;

use credentials::{CredentialsProvider, EnvCredentials};
use dispatcher::Dispatcher;
use errors::{RelayError, Result};
use handler::{RelayHandler, internal_error_response};
use http::StatusCode;
use http_body_util::BodyExt;
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response};
use shared::admin_service::AdminService;
use shared::http::{boxed, make_error_response, run_http_service};
use std::pin::Pin;
use std::sync::Arc;
use telegram::TelegramClient;

pub async fn run(config: config::Config) -> Result<()> {
    config.validate()?;

    let credentials: Arc<dyn CredentialsProvider> =
        Arc::new(EnvCredentials::new(&config.telegram));
    let dispatcher = Dispatcher::new(TelegramClient::new(&config.telegram)?);
    let handler = RelayHandler::new(&config, credentials, dispatcher);
    let relay_service = RelayService::new(config.path.clone(), handler);

    tracing::info!(
        path = %config.path,
        policy = ?config.delivery_policy,
        "Starting relay"
    );

    let relay_task = run_http_service(&config.listener.host, config.listener.port, relay_service);
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        AdminService::<_, RelayError>::new(|| true),
    );

    tokio::try_join!(relay_task, admin_task)?;
    Ok(())
}

/// Serves the relay path; every other path is `404`.
pub struct RelayService {
    path: String,
    handler: Arc<RelayHandler>,
}

impl RelayService {
    pub fn new(path: String, handler: RelayHandler) -> Self {
        Self {
            path,
            handler: Arc::new(handler),
        }
    }
}

impl Service<Request<Incoming>> for RelayService {
    type Response = Response<BoxBody<Bytes, Self::Error>>;
    type Error = RelayError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        if req.uri().path() != self.path {
            return Box::pin(async move { Ok(make_error_response(StatusCode::NOT_FOUND).map(boxed)) });
        }

        let handler = self.handler.clone();
        Box::pin(async move {
            // The handler runs in its own task so that a panic still yields a response
            let task = tokio::spawn(async move {
                let (parts, body) = req.into_parts();
                let body = match body.collect().await {
                    Ok(collected) => collected.to_bytes(),
                    Err(e) => {
                        let e = RelayError::RequestBodyError(e.to_string());
                        tracing::error!(error = %e, "Could not read submission");
                        return internal_error_response();
                    }
                };
                handler.handle(Request::from_parts(parts, body)).await
            });

            let response = match task.await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!("Relay task panicked: {}", e);
                    internal_error_response()
                }
            };
            Ok(response.map(boxed))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DeliveryPolicy;
    use crate::testutils::{StaticCredentials, test_config, test_handler};
    use http_body_util::Full;
    use hyper_util::client::legacy::Client;
    use hyper_util::client::legacy::connect::HttpConnector;
    use hyper_util::rt::TokioExecutor;
    use serde_json::json;
    use tokio::net::TcpListener;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn start_relay(api_url: &str) -> u16 {
        // Reserve a free port, then hand it to the service loop
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = test_config(api_url, DeliveryPolicy::Any);
        let handler = test_handler(&config, StaticCredentials::new("test-token", "1"));
        let service = RelayService::new(config.path.clone(), handler);
        tokio::spawn(async move { run_http_service("127.0.0.1", port, service).await });

        // Give the server a moment to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        port
    }

    async fn send(port: u16, method: &str, path: &str, body: &'static [u8]) -> (u16, Bytes) {
        let client: Client<HttpConnector, Full<Bytes>> =
            Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let request = Request::builder()
            .method(method)
            .uri(format!("http://127.0.0.1:{port}{path}"))
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from_static(body)))
            .unwrap();
        let response = client.request(request).await.unwrap();
        let status = response.status().as_u16();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body)
    }

    #[tokio::test]
    async fn test_relay_over_http() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let port = start_relay(&mock_server.uri()).await;
        let (status, body) = send(
            port,
            "POST",
            "/relay",
            br#"{"firstName":"A","lastName":"B","birthDate":"01.01.2000","gender":"X","services":"S"}"#,
        )
        .await;
        assert_eq!(status, 200);
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["results"][0]["chatId"], "1");
        assert_eq!(body["results"][0]["success"], true);
    }

    #[tokio::test]
    async fn test_unknown_path_and_method() {
        let mock_server = MockServer::start().await;
        let port = start_relay(&mock_server.uri()).await;

        let (status, _) = send(port, "POST", "/elsewhere", b"{}").await;
        assert_eq!(status, 404);

        let (status, body) = send(port, "GET", "/relay", b"").await;
        assert_eq!(status, 405);
        assert_eq!(body.as_ref(), br#"{"error":"Method Not Allowed"}"#);
    }
}
