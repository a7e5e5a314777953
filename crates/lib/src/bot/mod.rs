//! Bot logic: route inbound events to replies.
//!
//! The dispatcher echoes text and hands locations to the reply builder, which runs
//! the restaurant search and shapes the result as text or a carousel.

mod dispatcher;
mod reply_builder;

pub use dispatcher::Dispatcher;
pub use reply_builder::{
    render_carousel, render_text_listing, ReplyBuilder, CAROUSEL_ALT_TEXT, FETCH_FAILED_TEXT,
    KEY_NOT_CONFIGURED_TEXT, LISTING_HEADER, NO_RESULTS_TEXT, PARSE_FAILED_TEXT,
};
