//! Inbound command handling.
//!
//! This module handles:
//! - Decoding raw command payloads off the bus
//! - Dispatching to the per-command handlers
//! - Reporting the outcome to the log

mod executor;
pub mod handlers;

pub use executor::{decode, execute, CommandOutcome};
