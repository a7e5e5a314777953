//! Gateway: HTTP listener for the LINE webhook.
//!
//! `GET /` is a liveness probe; `POST /callback` verifies the signature, parses events,
//! and runs the dispatcher before answering.

mod server;

pub use server::{build_http_client, run_gateway, HELLO_TEXT};
