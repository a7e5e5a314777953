//! Gourmet bot library: LINE webhook handling, restaurant search, and reply building,
//! used by the `gourmet-bot` binary.

pub mod bot;
pub mod channels;
pub mod config;
pub mod gateway;
pub mod search;
