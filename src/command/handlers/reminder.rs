//! Medication reminder command handler

use tracing::info;

use super::HandlerContext;
use crate::buzzer::{self, Pattern};
use crate::command::CommandOutcome;
use crate::hardware::HardwareIO;

/// Handle `medication_reminder`: three short pulses. The medication
/// name only feeds the log line; actuation is the same regardless.
pub async fn handle_medication_reminder<H: HardwareIO>(
    ctx: HandlerContext<'_, H>,
    medication: &str,
) -> CommandOutcome {
    info!("Medication reminder: {}", medication);
    match buzzer::play(ctx.hw, Pattern::Reminder).await {
        Ok(()) => CommandOutcome::Completed {
            message: format!("Medication reminder played: {}", medication),
        },
        Err(e) => CommandOutcome::Failed {
            message: format!("buzzer output: {}", e),
        },
    }
}
