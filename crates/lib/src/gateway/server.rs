//! Webhook HTTP server (single port).

use crate::bot::{Dispatcher, ReplyBuilder};
use crate::channels::{parse_webhook, LineClient, WebhookError, SIGNATURE_HEADER};
use crate::config::{mask_secret, Config};
use crate::search::HotPepperClient;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

/// Body of `GET /`.
pub const HELLO_TEXT: &str = "Hello World!!!!";

/// Shared state for request handlers. Built once at startup; read-only afterwards.
#[derive(Clone)]
struct GatewayState {
    channel_secret: Arc<str>,
    line: LineClient,
    dispatcher: Dispatcher,
}

/// HTTP client shared by the reply and search calls; every request is bounded by `timeout`.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("building http client")
}

/// Run the webhook server; binds to config.server.bind:config.server.port.
/// Refuses to start without the LINE channel secret and access token.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    let Some(channel_secret) = config.line.channel_secret.clone() else {
        anyhow::bail!("refusing to start without a LINE channel secret (set LINE_CHANNEL_SECRET)");
    };
    let Some(access_token) = config.line.channel_access_token.clone() else {
        anyhow::bail!(
            "refusing to start without a LINE channel access token (set LINE_CHANNEL_ACCESS_TOKEN)"
        );
    };
    log::info!(
        "line channel: secret {}, access token {}",
        mask_secret(&channel_secret),
        mask_secret(&access_token)
    );
    match config.search.api_key.as_deref() {
        Some(key) => log::info!("gourmet search: api key {}", mask_secret(key)),
        None => log::warn!("HOTPEPPER_API_KEY is not set; location messages will get a not-configured reply"),
    }

    let http = build_http_client(config.search.timeout())?;
    let line = LineClient::new(&config.line.api_base_url, access_token, http.clone());
    let search = HotPepperClient::new(&config.search, http);
    let dispatcher = Dispatcher::new(ReplyBuilder::new(search, config.reply.format));
    log::info!(
        "reply format: {:?}, coordinate precision: {}, range: {}, count: {}",
        config.reply.format,
        config.search.coordinate_precision,
        config.search.range,
        config.search.count
    );

    let bind_addr = format!("{}:{}", config.server.bind.trim(), config.server.port);
    let state = GatewayState {
        channel_secret: Arc::from(channel_secret),
        line,
        dispatcher,
    };
    let app = Router::new()
        .route("/", get(hello))
        .route("/callback", post(callback))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("webhook server exited")?;
    log::info!("server stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / returns a fixed greeting (for probes).
async fn hello() -> &'static str {
    HELLO_TEXT
}

/// POST /callback — verifies `x-line-signature`, parses events, dispatches them, then answers 200.
/// 400 for a missing or invalid signature, 500 for any other parse failure.
async fn callback(State(state): State<GatewayState>, headers: HeaderMap, body: Bytes) -> StatusCode {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let events = match parse_webhook(&state.channel_secret, signature, &body) {
        Ok(events) => events,
        Err(WebhookError::InvalidSignature) => {
            log::warn!("callback: rejected request with invalid signature");
            return StatusCode::BAD_REQUEST;
        }
        Err(e) => {
            log::warn!("callback: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    };
    log::debug!("callback: {} event(s)", events.len());
    state.dispatcher.dispatch(&events, &state.line).await;
    StatusCode::OK
}
