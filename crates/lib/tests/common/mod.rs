//! Shared helpers for integration tests: free ports, stub LINE and search APIs, gateway startup.

#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use gourmet::config::Config;
use gourmet::gateway;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CHANNEL_SECRET: &str = "integration-channel-secret";
pub const ACCESS_TOKEN: &str = "integration-access-token";
pub const API_KEY: &str = "integration-api-key";

pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

async fn serve_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

/// One reply received by the stub LINE API: Authorization header and JSON body.
#[derive(Debug, Clone)]
pub struct RecordedReply {
    pub authorization: String,
    pub body: serde_json::Value,
}

/// Stub of the LINE reply endpoint that records every request.
#[derive(Clone, Default)]
pub struct LineStub {
    pub replies: Arc<Mutex<Vec<RecordedReply>>>,
}

impl LineStub {
    pub async fn start() -> (Self, String) {
        let stub = Self::default();
        let app = Router::new()
            .route("/v2/bot/message/reply", post(record_reply))
            .with_state(stub.clone());
        let url = serve_stub(app).await;
        (stub, url)
    }

    pub fn replies(&self) -> Vec<RecordedReply> {
        self.replies.lock().unwrap().clone()
    }
}

async fn record_reply(
    State(stub): State<LineStub>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    stub.replies
        .lock()
        .unwrap()
        .push(RecordedReply { authorization, body });
    Json(serde_json::json!({}))
}

/// Stub of the gourmet search endpoint with a canned response.
#[derive(Clone)]
pub struct SearchStub {
    pub status: StatusCode,
    pub body: String,
    pub queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl SearchStub {
    pub async fn start(status: StatusCode, body: impl Into<String>) -> (Self, String) {
        let stub = Self {
            status,
            body: body.into(),
            queries: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/hotpepper/gourmet/v1/", get(search))
            .with_state(stub.clone());
        let url = serve_stub(app).await;
        (stub, url)
    }

    pub fn hits(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<HashMap<String, String>> {
        self.queries.lock().unwrap().clone()
    }
}

async fn search(
    State(stub): State<SearchStub>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    stub.queries.lock().unwrap().push(params);
    (stub.status, stub.body.clone())
}

/// Config pointing at the stubs with test credentials.
pub fn test_config(line_url: &str, search_url: &str) -> Config {
    let mut config = Config::default();
    config.server.bind = "127.0.0.1".to_string();
    config.server.port = free_port();
    config.line.channel_secret = Some(CHANNEL_SECRET.to_string());
    config.line.channel_access_token = Some(ACCESS_TOKEN.to_string());
    config.line.api_base_url = line_url.to_string();
    config.search.api_key = Some(API_KEY.to_string());
    config.search.base_url = search_url.to_string();
    config.search.timeout_secs = 5;
    config
}

/// Start the gateway in the background and wait until GET / answers. Returns the base URL.
/// The server task is left running when the test ends.
pub async fn start_gateway(config: Config) -> String {
    let base = format!("http://127.0.0.1:{}", config.server.port);
    tokio::spawn(async move {
        let _ = gateway::run_gateway(config).await;
    });
    let client = reqwest::Client::new();
    for _ in 0..100 {
        if let Ok(resp) = client.get(format!("{}/", base)).send().await {
            if resp.status().is_success() {
                return base;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("gateway at {} did not come up within 5s", base);
}

/// POST a webhook body to /callback, signed with the test secret.
pub async fn post_signed(base: &str, body: &serde_json::Value) -> StatusCode {
    let raw = body.to_string();
    let signature = gourmet::channels::sign_body(CHANNEL_SECRET, raw.as_bytes());
    reqwest::Client::new()
        .post(format!("{}/callback", base))
        .header("x-line-signature", signature)
        .header("content-type", "application/json")
        .body(raw)
        .send()
        .await
        .expect("post callback")
        .status()
}

pub fn location_event(token: &str, latitude: f64, longitude: f64) -> serde_json::Value {
    serde_json::json!({
        "destination": "Uxxxxxxxx",
        "events": [{
            "type": "message",
            "mode": "active",
            "replyToken": token,
            "source": { "type": "user", "userId": "U1" },
            "message": {
                "type": "location",
                "id": "100",
                "title": "pin",
                "address": "Tokyo",
                "latitude": latitude,
                "longitude": longitude
            }
        }]
    })
}

/// Text of the single message in a recorded reply.
pub fn reply_text(reply: &RecordedReply) -> Option<&str> {
    reply.body["messages"][0]["text"].as_str()
}
