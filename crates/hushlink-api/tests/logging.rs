/// Request logging must never carry the owner's secret, which travels in the
/// query string of owner routes.
use std::io;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use tracing::Level;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use hushlink_ai::{GeminiClient, ModelConfig};
use hushlink_api::{AppStateInner, router, trace_layer};
use hushlink_db::MemoryStore;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

async fn safe_model() -> MockServer {
    let server = MockServer::start().await;
    let output = json!({ "isSafe": true, "reason": "Content meets safety guidelines." });
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": output.to_string() }] } }]
        })))
        .mount(&server)
        .await;
    server
}

fn traced_app(server: &MockServer) -> Router {
    let mut config = ModelConfig::new("test-key");
    config.api_base = server.uri();
    router(Arc::new(AppStateInner {
        store: Arc::new(MemoryStore::new()),
        model: GeminiClient::new(config).unwrap(),
        public_url: "https://hush.example".to_string(),
    }))
    .layer(trace_layer())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test(flavor = "current_thread")]
async fn owner_requests_log_path_without_secret() {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let server = safe_model().await;
    let app = traced_app(&server);

    let (status, created) = send(&app, Method::POST, "/links", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let short_id = created["short_id"].as_str().unwrap().to_string();
    let secret = created["secret_key"].as_str().unwrap().to_string();

    let (status, sent) = send(
        &app,
        Method::POST,
        &format!("/links/{short_id}/messages"),
        Some(json!({ "text": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let message_id = sent["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/links/{short_id}/messages?secret={secret}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/links/{short_id}/messages/{message_id}?secret={secret}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let logs = capture.contents();
    assert!(logs.contains(&format!("path=/links/{short_id}/messages")), "{logs}");
    assert!(logs.contains(&format!("/messages/{message_id}")), "{logs}");
    assert!(!logs.contains(&secret), "secret leaked into logs:\n{logs}");
    assert!(!logs.contains("secret="), "{logs}");
}
