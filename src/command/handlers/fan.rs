//! Fan override command handler

use super::HandlerContext;
use crate::command::CommandOutcome;
use crate::hardware::HardwareIO;

/// Handle `fan_control`.
///
/// Drives the relay to the requested level, mirrors it into state, and
/// opens a manual hold window. While the hold lasts, the sensing cycle
/// leaves the fan alone, so an operator's choice is not clobbered by
/// the very next temperature evaluation.
pub async fn handle_fan_control<H: HardwareIO>(
    ctx: HandlerContext<'_, H>,
    fan_on: bool,
) -> CommandOutcome {
    if let Err(e) = ctx.hw.set_fan(fan_on) {
        return CommandOutcome::Failed {
            message: format!("fan output: {}", e),
        };
    }
    ctx.state.fan_active = fan_on;
    ctx.state.hold_fan(ctx.now, ctx.fan_hold);

    CommandOutcome::Completed {
        message: format!("Fan {}", if fan_on { "activated" } else { "deactivated" }),
    }
}
