//! HTTP surface of the weather fulfillment webhook.
//!
//! The library half holds the axum router, handlers and server wiring so the
//! integration tests can drive them; the binary adds the CLI on top.

pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
