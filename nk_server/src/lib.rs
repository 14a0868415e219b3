//! HTTP server for notekeeper.
//!
//! The binary in `main.rs` wires configuration, storage and mail into
//! [`api::create_router`]; everything it uses is exposed here so integration
//! tests can build the same router.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
