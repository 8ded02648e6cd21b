//! Device-local mutable state.
//!
//! One instance lives for the whole process, owned by the agent task.
//! Everything that must survive between ticks lives here; everything
//! else is an ephemeral message.

use std::time::{Duration, Instant};

use chrono::NaiveDateTime;

use crate::hardware::Button;
use crate::protocol::now_local;

/// Debounce latches for the three request buttons.
///
/// `true` means armed: the button is released and the next press raises
/// an alert. A latch stays `false` for as long as the button is held
/// after triggering, so a long press produces exactly one alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonLatches {
    help: bool,
    water: bool,
    other: bool,
}

impl ButtonLatches {
    /// All buttons armed (released).
    pub fn armed() -> Self {
        Self {
            help: true,
            water: true,
            other: true,
        }
    }

    pub fn is_armed(&self, button: Button) -> bool {
        match button {
            Button::Help => self.help,
            Button::Water => self.water,
            Button::Other => self.other,
        }
    }

    pub fn set_armed(&mut self, button: Button, armed: bool) {
        match button {
            Button::Help => self.help = armed,
            Button::Water => self.water = armed,
            Button::Other => self.other = armed,
        }
    }
}

/// Mutable device state spanning the process lifetime.
#[derive(Debug)]
pub struct DeviceState {
    /// Mirrors the fan relay output.
    pub fan_active: bool,
    /// Last time the motion input was seen asserted.
    #[allow(dead_code)] // updated every sample, no on-device consumer yet
    pub last_motion: NaiveDateTime,
    /// Debounce latches for the request buttons.
    pub buttons: ButtonLatches,
    /// While set, autonomous fan control is suspended.
    fan_hold_until: Option<Instant>,
}

impl DeviceState {
    /// Startup defaults: fan off, all buttons armed, motion time = now.
    pub fn new() -> Self {
        Self {
            fan_active: false,
            last_motion: now_local(),
            buttons: ButtonLatches::armed(),
            fan_hold_until: None,
        }
    }

    /// Start (or refresh) the manual fan override window. While the
    /// window is open, autonomous control leaves the fan alone.
    pub fn hold_fan(&mut self, now: Instant, hold: Duration) {
        self.fan_hold_until = Some(now + hold);
    }

    /// True while a manual fan override is in effect. Expired holds are
    /// cleared on query.
    pub fn fan_hold_active(&mut self, now: Instant) -> bool {
        match self.fan_hold_until {
            Some(deadline) if now < deadline => true,
            Some(_) => {
                self.fan_hold_until = None;
                false
            }
            None => false,
        }
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}
