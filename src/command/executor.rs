//! Command executor - decodes and dispatches incoming commands

use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::handlers::{self, HandlerContext};
use crate::hardware::HardwareIO;
use crate::protocol::Command;
use crate::state::DeviceState;

/// Result of command execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Command ran to completion
    Completed { message: String },
    /// Command was valid but actuation failed
    Failed { message: String },
    /// Command type unknown to this device; nothing was done
    Ignored,
}

/// Decode a raw payload from the command topic.
///
/// An undecodable payload is dropped here with a diagnostic and never
/// reaches dispatch. A well-formed payload with an unrecognized type
/// decodes to [`Command::Unknown`] and is dispatched as a no-op.
pub fn decode(payload: &[u8]) -> Option<Command> {
    match serde_json::from_slice(payload) {
        Ok(command) => Some(command),
        Err(e) => {
            warn!("Dropping undecodable command payload: {}", e);
            None
        }
    }
}

/// Execute one decoded command against device state and outputs.
pub async fn execute(
    command: Command,
    state: &mut DeviceState,
    hw: &mut impl HardwareIO,
    fan_hold: Duration,
) -> CommandOutcome {
    let ctx = HandlerContext {
        state,
        hw,
        fan_hold,
        now: Instant::now(),
    };

    let outcome = match command {
        Command::FanControl { state: fan_on } => handlers::handle_fan_control(ctx, fan_on).await,
        Command::BuzzerTest => handlers::handle_buzzer_test(ctx).await,
        Command::MedicationReminder { medication } => {
            handlers::handle_medication_reminder(ctx, &medication).await
        }
        Command::Unknown => {
            warn!("Unknown command type, ignoring");
            CommandOutcome::Ignored
        }
    };

    match &outcome {
        CommandOutcome::Completed { message } => info!("Command completed: {}", message),
        CommandOutcome::Failed { message } => warn!("Command failed: {}", message),
        CommandOutcome::Ignored => {}
    }
    outcome
}
