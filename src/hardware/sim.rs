//! In-memory hardware backend.
//!
//! Stands in for the GPIO stack on development hosts and in tests.
//! Inputs are injectable, outputs are recorded in call order, and
//! individual channels can be put into a faulted state to exercise the
//! error paths.

// The injection and inspection half of this API is only reached from
// unit tests; normal builds drive it purely through HardwareIO.
#![allow(dead_code)]

use tracing::debug;

use super::pins::PinConfig;
use super::{Button, HardwareError, HardwareIO};

/// One recorded output transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCall {
    Fan(bool),
    Buzzer(bool),
}

#[derive(Debug)]
pub struct SimulatedHardware {
    climate: Option<(f32, f32)>,
    motion: bool,
    pressed: [bool; 3],
    fan: bool,
    buzzer: bool,
    climate_fault: bool,
    motion_fault: bool,
    button_faults: [bool; 3],
    outputs: Vec<OutputCall>,
}

fn idx(button: Button) -> usize {
    match button {
        Button::Help => 0,
        Button::Water => 1,
        Button::Other => 2,
    }
}

impl SimulatedHardware {
    /// Fresh simulator: comfortable room, no motion, nothing pressed.
    pub fn new(pins: PinConfig) -> Self {
        debug!("Simulated hardware backend, pin map: {:?}", pins);
        Self {
            climate: Some((22.5, 48.0)),
            motion: false,
            pressed: [false; 3],
            fan: false,
            buzzer: false,
            climate_fault: false,
            motion_fault: false,
            button_faults: [false; 3],
            outputs: Vec::new(),
        }
    }

    /// Set the next climate sample. `None` makes the sensor report
    /// "no fresh reading", which callers fill in synthetically.
    pub fn set_climate(&mut self, climate: Option<(f32, f32)>) {
        self.climate = climate;
    }

    pub fn set_motion(&mut self, asserted: bool) {
        self.motion = asserted;
    }

    pub fn press(&mut self, button: Button) {
        self.pressed[idx(button)] = true;
    }

    pub fn release(&mut self, button: Button) {
        self.pressed[idx(button)] = false;
    }

    /// Make climate reads fail outright until cleared.
    pub fn set_climate_fault(&mut self, faulted: bool) {
        self.climate_fault = faulted;
    }

    pub fn set_motion_fault(&mut self, faulted: bool) {
        self.motion_fault = faulted;
    }

    pub fn set_button_fault(&mut self, button: Button, faulted: bool) {
        self.button_faults[idx(button)] = faulted;
    }

    /// Current fan line level.
    pub fn fan(&self) -> bool {
        self.fan
    }

    /// Current buzzer line level.
    pub fn buzzer(&self) -> bool {
        self.buzzer
    }

    /// Every output transition since construction, in call order.
    pub fn outputs(&self) -> &[OutputCall] {
        &self.outputs
    }
}

impl HardwareIO for SimulatedHardware {
    fn read_climate(&mut self) -> Result<Option<(f32, f32)>, HardwareError> {
        if self.climate_fault {
            return Err(HardwareError::ClimateRead("simulated fault".into()));
        }
        Ok(self.climate)
    }

    fn read_motion(&mut self) -> Result<bool, HardwareError> {
        if self.motion_fault {
            return Err(HardwareError::InputRead("simulated PIR fault".into()));
        }
        Ok(self.motion)
    }

    fn read_button(&mut self, button: Button) -> Result<bool, HardwareError> {
        if self.button_faults[idx(button)] {
            return Err(HardwareError::InputRead(format!(
                "simulated fault on {:?}",
                button
            )));
        }
        // Active-low wiring: held down pulls the line to ground.
        Ok(!self.pressed[idx(button)])
    }

    fn set_fan(&mut self, on: bool) -> Result<(), HardwareError> {
        self.fan = on;
        self.outputs.push(OutputCall::Fan(on));
        Ok(())
    }

    fn set_buzzer(&mut self, on: bool) -> Result<(), HardwareError> {
        self.buzzer = on;
        self.outputs.push(OutputCall::Buzzer(on));
        Ok(())
    }
}
