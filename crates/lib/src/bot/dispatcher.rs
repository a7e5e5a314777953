//! Event dispatch: one reply per handled message event, in order.

use crate::bot::reply_builder::ReplyBuilder;
use crate::channels::{InboundEvent, Message, ReplyPayload, Replier};

/// Routes inbound events by message variant.
#[derive(Clone)]
pub struct Dispatcher {
    builder: ReplyBuilder,
}

impl Dispatcher {
    pub fn new(builder: ReplyBuilder) -> Self {
        Self { builder }
    }

    /// Handle every event. Text is echoed, locations get a restaurant reply, everything else is ignored.
    /// A failed reply is logged and the remaining events are still processed.
    pub async fn dispatch(&self, events: &[InboundEvent], replier: &dyn Replier) {
        for event in events {
            let (target, message) = match event {
                InboundEvent::Message {
                    reply_target,
                    message,
                } => (reply_target, message),
                InboundEvent::NonMessage { event_type } => {
                    log::debug!("ignoring {} event", event_type);
                    continue;
                }
            };
            match message {
                Message::Text { body } => {
                    if let Err(e) = replier.reply(target, ReplyPayload::text(body.clone())).await {
                        log::warn!("echo reply failed: {}", e);
                    }
                }
                Message::Location {
                    latitude,
                    longitude,
                } => {
                    self.builder
                        .handle_location(replier, target, *latitude, *longitude)
                        .await;
                }
                Message::Other { kind } => {
                    log::debug!("ignoring {} message", kind);
                }
            }
        }
    }
}
