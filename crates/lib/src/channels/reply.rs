//! Outbound reply payloads (LINE message objects) and the reply capability.

use crate::channels::inbound::ReplyTarget;
use async_trait::async_trait;
use serde::Serialize;

/// One LINE message object sent in a reply: `{ "type": "text", ... }` or `{ "type": "template", ... }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplyPayload {
    Text {
        text: String,
    },
    Template {
        #[serde(rename = "altText")]
        alt_text: String,
        template: Template,
    },
}

impl ReplyPayload {
    pub fn text(text: impl Into<String>) -> Self {
        ReplyPayload::Text { text: text.into() }
    }

    pub fn carousel(alt_text: impl Into<String>, columns: Vec<CarouselColumn>) -> Self {
        ReplyPayload::Template {
            alt_text: alt_text.into(),
            template: Template::Carousel { columns },
        }
    }

    /// Text body when this is a text reply.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ReplyPayload::Text { text } => Some(text),
            ReplyPayload::Template { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Template {
    Carousel { columns: Vec<CarouselColumn> },
}

/// One card of a carousel template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselColumn {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
    pub actions: Vec<UriAction>,
}

/// Action that opens a URI: `{ "type": "uri", "label", "uri" }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "uri")]
pub struct UriAction {
    pub label: String,
    pub uri: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("reply request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("reply api error: {0}")]
    Api(String),
}

/// Sends a reply to the conversation identified by a reply token.
#[async_trait]
pub trait Replier: Send + Sync {
    async fn reply(&self, target: &ReplyTarget, payload: ReplyPayload) -> Result<(), ReplyError>;
}
