//! Periodic sensing cycle: climate + motion sampling and autonomous
//! fan control.

use std::time::Instant;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::hardware::{HardwareError, HardwareIO};
use crate::protocol::{now_local, round1, SensorReading};
use crate::state::DeviceState;

/// Fan engages above this temperature (°C).
pub const FAN_ON_C: f32 = 30.0;

/// Fan disengages at or below this temperature (°C). The gap up to
/// [`FAN_ON_C`] is a dead band so the relay does not chatter around a
/// single threshold.
pub const FAN_OFF_C: f32 = 28.0;

/// Hysteresis decision. `Some(level)` when the fan line must change,
/// `None` inside the dead band or when already at the right level.
pub fn fan_decision(temperature: f32, fan_active: bool) -> Option<bool> {
    if temperature > FAN_ON_C && !fan_active {
        Some(true)
    } else if temperature <= FAN_OFF_C && fan_active {
        Some(false)
    } else {
        None
    }
}

/// Plausible stand-in values for a cycle where the climate sensor gave
/// nothing: temperature in [15, 35] °C, humidity in [40, 70] %RH.
fn synthesize_climate() -> (f32, f32) {
    let mut rng = rand::thread_rng();
    let temperature = 20.0 + rng.gen_range(-5.0..=15.0);
    let humidity = 40.0 + rng.gen_range(0.0..=30.0);
    (temperature, humidity)
}

/// Run one sensing cycle.
///
/// Reads climate (synthesizing on an empty sample), refreshes the
/// motion timestamp, applies fan hysteresis unless a manual hold is in
/// effect, and returns the reading to publish. Any hardware fault
/// aborts the cycle; the caller logs it and skips the tick.
pub fn sample(
    state: &mut DeviceState,
    hw: &mut impl HardwareIO,
    now: Instant,
) -> Result<SensorReading, HardwareError> {
    let (temperature, humidity) = match hw.read_climate()? {
        Some(sample) => sample,
        None => {
            let synthesized = synthesize_climate();
            warn!(
                "Climate sensor gave no reading, synthesized {:.1}C / {:.1}%",
                synthesized.0, synthesized.1
            );
            synthesized
        }
    };

    let motion = hw.read_motion()?;
    if motion {
        state.last_motion = now_local();
    }

    let hold = state.fan_hold_active(now);
    if let Some(fan_on) = fan_decision(temperature, state.fan_active) {
        if hold {
            debug!("Fan change suppressed by manual hold");
        } else {
            hw.set_fan(fan_on)?;
            state.fan_active = fan_on;
            if fan_on {
                info!("Fan auto-activated, temperature high: {:.1}C", temperature);
            } else {
                info!("Fan auto-deactivated, temperature normal: {:.1}C", temperature);
            }
        }
    }

    Ok(SensorReading {
        temperature: round1(temperature),
        humidity: round1(humidity),
        motion_detected: motion,
        fan_active: state.fan_active,
        timestamp: now_local(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::pins::PinConfig;
    use crate::hardware::sim::{OutputCall, SimulatedHardware};
    use std::time::Duration;

    fn fixture() -> (DeviceState, SimulatedHardware) {
        (
            DeviceState::new(),
            SimulatedHardware::new(PinConfig::default()),
        )
    }

    #[test]
    fn test_fan_decision_table() {
        // Engage only above 30 and only when off.
        assert_eq!(fan_decision(30.1, false), Some(true));
        assert_eq!(fan_decision(30.0, false), None);
        assert_eq!(fan_decision(30.1, true), None);
        // Disengage at or below 28 and only when on.
        assert_eq!(fan_decision(28.0, true), Some(false));
        assert_eq!(fan_decision(27.0, false), None);
        // Dead band holds whatever the fan is doing.
        assert_eq!(fan_decision(29.0, true), None);
        assert_eq!(fan_decision(29.0, false), None);
        assert_eq!(fan_decision(28.1, true), None);
    }

    #[test]
    fn test_temperature_sweep_toggles_fan_once_each_way() {
        let (mut state, mut hw) = fixture();
        let now = Instant::now();
        let mut levels = Vec::new();
        for t in [25.0, 31.0, 29.0, 27.0] {
            hw.set_climate(Some((t, 50.0)));
            let reading = sample(&mut state, &mut hw, now).unwrap();
            levels.push(reading.fan_active);
        }
        assert_eq!(levels, vec![false, true, true, false]);
        assert_eq!(
            hw.outputs(),
            &[OutputCall::Fan(true), OutputCall::Fan(false)]
        );
    }

    #[test]
    fn test_reading_rounds_to_one_decimal() {
        let (mut state, mut hw) = fixture();
        hw.set_climate(Some((24.44, 51.26)));
        let reading = sample(&mut state, &mut hw, Instant::now()).unwrap();
        assert_eq!(reading.temperature, 24.4);
        assert_eq!(reading.humidity, 51.3);
    }

    #[test]
    fn test_empty_climate_sample_synthesizes_in_range() {
        let (mut state, mut hw) = fixture();
        hw.set_climate(None);
        for _ in 0..50 {
            let reading = sample(&mut state, &mut hw, Instant::now()).unwrap();
            assert!((15.0..=35.0).contains(&reading.temperature));
            assert!((40.0..=70.0).contains(&reading.humidity));
        }
    }

    #[test]
    fn test_motion_refreshes_last_motion_time() {
        let (mut state, mut hw) = fixture();
        let old = chrono::NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        state.last_motion = old;

        hw.set_motion(false);
        let reading = sample(&mut state, &mut hw, Instant::now()).unwrap();
        assert!(!reading.motion_detected);
        assert_eq!(state.last_motion, old);

        hw.set_motion(true);
        let reading = sample(&mut state, &mut hw, Instant::now()).unwrap();
        assert!(reading.motion_detected);
        assert!(state.last_motion > old);
    }

    #[test]
    fn test_climate_fault_skips_cycle_untouched() {
        let (mut state, mut hw) = fixture();
        hw.set_climate_fault(true);
        assert!(sample(&mut state, &mut hw, Instant::now()).is_err());
        assert!(!state.fan_active);
        assert!(hw.outputs().is_empty());
    }

    #[test]
    fn test_motion_fault_skips_cycle() {
        let (mut state, mut hw) = fixture();
        hw.set_motion_fault(true);
        assert!(sample(&mut state, &mut hw, Instant::now()).is_err());
        assert!(hw.outputs().is_empty());
    }

    #[test]
    fn test_manual_hold_suppresses_autonomous_control() {
        let (mut state, mut hw) = fixture();
        let t0 = Instant::now();

        // Operator forces the fan on in a cool room.
        state.fan_active = true;
        hw.set_fan(true).unwrap();
        state.hold_fan(t0, Duration::from_secs(300));

        hw.set_climate(Some((20.0, 50.0)));
        let reading = sample(&mut state, &mut hw, t0 + Duration::from_secs(5)).unwrap();
        assert!(reading.fan_active);
        assert!(state.fan_active);

        // Hold expired: the next cycle reasserts hysteresis.
        let reading = sample(&mut state, &mut hw, t0 + Duration::from_secs(301)).unwrap();
        assert!(!reading.fan_active);
        assert!(!state.fan_active);
        assert_eq!(
            hw.outputs(),
            &[OutputCall::Fan(true), OutputCall::Fan(false)]
        );
    }
}
