//! Hardware access seam for pluggable I/O backends.
//!
//! The control logic only ever talks to [`HardwareIO`], so the same
//! agent runs against the in-memory simulator (development hosts,
//! tests) or a GPIO-backed implementation on the device itself.

pub mod pins;
pub mod sim;

use thiserror::Error;

/// Faults surfaced by a hardware backend.
#[derive(Debug, Error)]
pub enum HardwareError {
    /// The climate sensor could not be read at all. A sensor that
    /// responds but has no fresh sample is `Ok(None)`, not this.
    #[error("climate sensor read failed: {0}")]
    ClimateRead(String),

    /// A digital input could not be read.
    #[error("input read failed: {0}")]
    InputRead(String),

    /// A digital output could not be driven. The simulated backend
    /// has no failing output path, so only tests build this today.
    #[allow(dead_code)]
    #[error("output write failed: {0}")]
    OutputWrite(String),
}

/// The three bedside request buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Help,
    Water,
    Other,
}

impl Button {
    /// Poll order. Matches the portal's expectation that help wins
    /// when several alerts arrive in the same cycle.
    pub const ALL: [Button; 3] = [Button::Help, Button::Water, Button::Other];
}

/// Sensor and actuator access for one node.
///
/// Methods are synchronous; every call is a short pin or bus operation
/// and the agent task is the only caller.
pub trait HardwareIO {
    /// Read temperature (°C) and humidity (%RH). `Ok(None)` means the
    /// sensor produced no usable sample this cycle and the caller
    /// should synthesize one.
    fn read_climate(&mut self) -> Result<Option<(f32, f32)>, HardwareError>;

    /// Current motion input level (true = asserted).
    fn read_motion(&mut self) -> Result<bool, HardwareError>;

    /// Raw line level for a button (true = high). Buttons are wired
    /// active-low behind pull-ups, so a pressed button reads false.
    fn read_button(&mut self, button: Button) -> Result<bool, HardwareError>;

    /// Drive the fan relay.
    fn set_fan(&mut self, on: bool) -> Result<(), HardwareError>;

    /// Drive the buzzer line.
    fn set_buzzer(&mut self, on: bool) -> Result<(), HardwareError>;
}
