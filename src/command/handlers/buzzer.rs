//! Buzzer test command handler

use super::HandlerContext;
use crate::buzzer::{self, Pattern};
use crate::command::CommandOutcome;
use crate::hardware::HardwareIO;

/// Handle `buzzer_test`: one long audible pulse so staff can confirm
/// the node is wired and audible from the room.
pub async fn handle_buzzer_test<H: HardwareIO>(ctx: HandlerContext<'_, H>) -> CommandOutcome {
    match buzzer::play(ctx.hw, Pattern::Single).await {
        Ok(()) => CommandOutcome::Completed {
            message: "Buzzer test completed".into(),
        },
        Err(e) => CommandOutcome::Failed {
            message: format!("buzzer output: {}", e),
        },
    }
}
