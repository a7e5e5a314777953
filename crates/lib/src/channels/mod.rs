//! LINE channel: webhook parsing, signature verification, and the reply API.
//!
//! Inbound events are parsed into [`InboundEvent`]s for the dispatcher; replies go
//! out through the [`Replier`] trait so the bot logic never touches HTTP directly.

mod inbound;
mod line;
mod reply;

pub use inbound::{InboundEvent, Message, ReplyTarget};
pub use line::{parse_webhook, sign_body, verify_signature, LineClient, WebhookError, SIGNATURE_HEADER};
pub use reply::{CarouselColumn, ReplyError, ReplyPayload, Replier, Template, UriAction};
