//! BCM pin assignments for the node's peripherals.

use std::env;

/// Pin map (BCM numbering). Defaults match the reference wiring; each
/// pin can be overridden through its `*_PIN` environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinConfig {
    pub dht: u8,
    pub pir: u8,
    pub fan: u8,
    pub buzzer: u8,
    pub button_help: u8,
    pub button_water: u8,
    pub button_other: u8,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            dht: 4,
            pir: 18,
            fan: 22,
            buzzer: 23,
            button_help: 24,
            button_water: 25,
            button_other: 26,
        }
    }
}

impl PinConfig {
    /// Load the pin map from the environment, keeping the wiring
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            dht: env_pin("DHT_PIN", d.dht),
            pir: env_pin("PIR_PIN", d.pir),
            fan: env_pin("FAN_PIN", d.fan),
            buzzer: env_pin("BUZZER_PIN", d.buzzer),
            button_help: env_pin("BUTTON_HELP_PIN", d.button_help),
            button_water: env_pin("BUTTON_WATER_PIN", d.button_water),
            button_other: env_pin("BUTTON_OTHER_PIN", d.button_other),
        }
    }
}

fn env_pin(key: &str, default: u8) -> u8 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
