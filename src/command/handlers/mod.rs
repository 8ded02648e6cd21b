//! Command handlers, one file per command type

mod buzzer;
mod fan;
mod reminder;

pub use buzzer::handle_buzzer_test;
pub use fan::handle_fan_control;
pub use reminder::handle_medication_reminder;

use std::time::{Duration, Instant};

use crate::hardware::HardwareIO;
use crate::state::DeviceState;

/// Everything a handler may touch, borrowed from the agent for the
/// duration of one command.
pub struct HandlerContext<'a, H: HardwareIO> {
    pub state: &'a mut DeviceState,
    pub hw: &'a mut H,
    pub fan_hold: Duration,
    pub now: Instant,
}
