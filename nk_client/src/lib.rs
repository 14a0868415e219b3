//! Internal modules for the notekeeper client.
//!
//! This library provides the API client, command parsing and the persisted
//! session used by the nk_client binary.

pub mod api_client;
pub mod commands;
pub mod session;
