//! Core logic for the large-text paste hook.
//!
//! Decides when an outbound channel message is too long, uploads the full text
//! to a paste service and rewrites the message to a snippet plus a link. The
//! HTTP transport and the host's config store live behind ports (traits)
//! implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod hot_reload;
pub mod logging;
pub mod offload;
pub mod paste;
pub mod ports;

pub use errors::{Error, OffloadError, Result};
