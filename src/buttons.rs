//! Request-button polling with press-edge debouncing.

use tracing::warn;

use crate::hardware::{Button, HardwareIO};
use crate::protocol::{Alert, AlertKind, AlertPriority};
use crate::state::DeviceState;

/// Alert parameters per button. Message strings are part of the portal
/// contract and show up verbatim on the dashboard.
fn alert_profile(button: Button) -> (AlertKind, AlertPriority, &'static str) {
    match button {
        Button::Help => (
            AlertKind::Help,
            AlertPriority::Critical,
            "Emergency help button pressed",
        ),
        Button::Water => (
            AlertKind::Water,
            AlertPriority::Medium,
            "Water assistance requested",
        ),
        Button::Other => (
            AlertKind::Other,
            AlertPriority::Medium,
            "General assistance requested",
        ),
    }
}

/// Poll all three buttons once.
///
/// Edge-triggered on press: a held button alerts exactly once and stays
/// silent until released and pressed again. A failed read skips that
/// channel for the cycle, latch untouched, and the others still poll.
pub fn poll(state: &mut DeviceState, hw: &mut impl HardwareIO) -> Vec<Alert> {
    let mut alerts = Vec::new();
    for button in Button::ALL {
        let level = match hw.read_button(button) {
            Ok(level) => level,
            Err(e) => {
                warn!("Button read failed on {:?}: {}", button, e);
                continue;
            }
        };
        // Active-low wiring: low level means pressed.
        let pressed = !level;
        if pressed && state.buttons.is_armed(button) {
            let (kind, priority, message) = alert_profile(button);
            state.buttons.set_armed(button, false);
            alerts.push(Alert::new(kind, priority, message));
        } else if !pressed {
            state.buttons.set_armed(button, true);
        }
    }
    alerts
}
