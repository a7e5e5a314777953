//! Inbound events: what the dispatcher sees after the webhook body has been verified and parsed.

/// Opaque reply token identifying the conversation a reply must be addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget(pub String);

impl ReplyTarget {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Message content of a message event.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Text { body: String },
    Location { latitude: f64, longitude: f64 },
    /// Sticker, image, etc. Carries the wire type for logging.
    Other { kind: String },
}

/// One notification delivered to the webhook.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Message {
        reply_target: ReplyTarget,
        message: Message,
    },
    /// Follow, unfollow, postback, and anything else that is not a message.
    NonMessage { event_type: String },
}
