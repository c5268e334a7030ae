//! HTTP surface and process wiring.
//!
//! [`server`] is the axum app behind the website: it mints inquiry sessions
//! and hands out chat links. [`runtime`] owns startup and the inbound event
//! loop that feeds messages into the reply pipeline.

pub mod runtime;
pub mod server;

pub use {
    runtime::run,
    server::{AppState, build_app},
};
