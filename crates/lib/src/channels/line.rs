//! LINE Messaging API: webhook signature check, event parsing, and the reply endpoint.

use crate::channels::inbound::{InboundEvent, Message, ReplyTarget};
use crate::channels::reply::{ReplyError, ReplyPayload, Replier};
use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying base64(HMAC-SHA256(channel secret, body)).
pub const SIGNATURE_HEADER: &str = "x-line-signature";

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("malformed webhook body: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Webhook POST body.
#[derive(Debug, Deserialize)]
struct WebhookBody {
    #[serde(default)]
    events: Vec<WireEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    reply_token: Option<String>,
    #[serde(default)]
    message: Option<WireMessage>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

impl WireMessage {
    fn into_message(self) -> Message {
        match self.kind.as_str() {
            "text" => {
                if let Some(body) = self.text {
                    return Message::Text { body };
                }
            }
            "location" => {
                if let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) {
                    return Message::Location { latitude, longitude };
                }
            }
            _ => {}
        }
        Message::Other { kind: self.kind }
    }
}

/// Compute the base64 signature LINE sends for `body`.
pub fn sign_body(secret: &str, body: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return String::new(),
    };
    mac.update(body);
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// Constant-time check of `signature` (base64) against the body.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = base64::engine::general_purpose::STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Verify the signature and parse the body into inbound events.
/// A message event without a reply token cannot be answered and is dropped.
pub fn parse_webhook(
    secret: &str,
    signature: Option<&str>,
    body: &[u8],
) -> Result<Vec<InboundEvent>, WebhookError> {
    let signature = signature.ok_or(WebhookError::InvalidSignature)?;
    if !verify_signature(secret, body, signature) {
        return Err(WebhookError::InvalidSignature);
    }
    let parsed: WebhookBody = serde_json::from_slice(body)?;
    let events = parsed
        .events
        .into_iter()
        .filter_map(|ev| {
            if ev.event_type != "message" {
                return Some(InboundEvent::NonMessage {
                    event_type: ev.event_type,
                });
            }
            match (ev.reply_token, ev.message) {
                (Some(token), Some(msg)) => Some(InboundEvent::Message {
                    reply_target: ReplyTarget(token),
                    message: msg.into_message(),
                }),
                _ => {
                    log::debug!("line: message event without reply token or message, skipping");
                    None
                }
            }
        })
        .collect();
    Ok(events)
}

/// Client for the LINE reply API.
#[derive(Clone)]
pub struct LineClient {
    api_base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl LineClient {
    pub fn new(api_base_url: &str, access_token: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            client,
        }
    }

    /// POST /v2/bot/message/reply with a single message.
    pub async fn reply_message(&self, reply_token: &str, payload: &ReplyPayload) -> Result<(), ReplyError> {
        let url = format!("{}/v2/bot/message/reply", self.api_base_url);
        let body = serde_json::json!({
            "replyToken": reply_token,
            "messages": [payload],
        });
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ReplyError::Api(format!("{} {}", status, body)));
        }
        Ok(())
    }
}

#[async_trait]
impl Replier for LineClient {
    async fn reply(&self, target: &ReplyTarget, payload: ReplyPayload) -> Result<(), ReplyError> {
        self.reply_message(target.as_str(), &payload).await
    }
}
