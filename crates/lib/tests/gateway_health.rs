//! Integration test: start the webhook server on a free port, GET /, assert the greeting.
//! Does not contact LINE or the search provider.

mod common;

use gourmet::config::Config;
use gourmet::gateway;

#[tokio::test]
async fn health_responds_with_greeting() {
    let config = common::test_config("http://127.0.0.1:9", "http://127.0.0.1:9");
    let base = common::start_gateway(config).await;
    let resp = reqwest::get(format!("{}/", base)).await.expect("GET /");
    assert!(resp.status().is_success());
    assert_eq!(resp.text().await.expect("body"), gateway::HELLO_TEXT);
}

#[tokio::test]
async fn refuses_to_start_without_channel_secret() {
    let mut config = Config::default();
    config.server.bind = "127.0.0.1".to_string();
    config.server.port = common::free_port();
    config.line.channel_access_token = Some("token".to_string());
    let err = gateway::run_gateway(config).await.unwrap_err();
    assert!(err.to_string().contains("LINE_CHANNEL_SECRET"), "{}", err);
}

#[tokio::test]
async fn refuses_to_start_without_access_token() {
    let mut config = Config::default();
    config.server.bind = "127.0.0.1".to_string();
    config.server.port = common::free_port();
    config.line.channel_secret = Some("secret".to_string());
    let err = gateway::run_gateway(config).await.unwrap_err();
    assert!(err.to_string().contains("LINE_CHANNEL_ACCESS_TOKEN"), "{}", err);
}
