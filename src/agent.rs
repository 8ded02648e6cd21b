//! Tick orchestration and device lifetime.
//!
//! The [`Agent`] owns the device state and sequences every sensor read
//! and actuator write. Exactly one task drives it; that task is the
//! serialization point, so no locking is needed anywhere below.

use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::buttons;
use crate::command::{self, CommandOutcome};
use crate::hardware::HardwareIO;
use crate::protocol::{Alert, Command, HeartbeatStatus, SensorReading};
use crate::sensing;
use crate::state::DeviceState;

pub struct Agent {
    state: DeviceState,
    started: Instant,
    last_heartbeat: Option<Instant>,
    heartbeat_period: Duration,
    fan_hold: Duration,
}

impl Agent {
    pub fn new(heartbeat_period: Duration, fan_hold: Duration) -> Self {
        Self {
            state: DeviceState::new(),
            started: Instant::now(),
            last_heartbeat: None,
            heartbeat_period,
            fan_hold,
        }
    }

    /// Seconds since process start, monotonic.
    fn uptime(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Run one sensing cycle. `None` means a hardware fault skipped
    /// this cycle; nothing is published for it.
    pub fn run_sensing(&mut self, hw: &mut impl HardwareIO) -> Option<SensorReading> {
        match sensing::sample(&mut self.state, hw, Instant::now()) {
            Ok(reading) => Some(reading),
            Err(e) => {
                warn!("Sensing cycle skipped: {}", e);
                None
            }
        }
    }

    /// Poll the request buttons once, collecting any new alerts.
    pub fn poll_buttons(&mut self, hw: &mut impl HardwareIO) -> Vec<Alert> {
        buttons::poll(&mut self.state, hw)
    }

    /// Periodic heartbeat, tracked by last-sent time rather than a
    /// separate timer. `Some` when the period has elapsed (or nothing
    /// was sent yet).
    pub fn heartbeat_due(&mut self, now: Instant) -> Option<HeartbeatStatus> {
        let due = match self.last_heartbeat {
            None => true,
            Some(at) => now.duration_since(at) >= self.heartbeat_period,
        };
        if !due {
            return None;
        }
        self.last_heartbeat = Some(now);
        Some(HeartbeatStatus::online(self.uptime()))
    }

    /// Immediate heartbeat, stamping the period from `now`. Used right
    /// after a (re)connect so the portal marks the device online
    /// without waiting out the period.
    pub fn heartbeat_now(&mut self, now: Instant) -> HeartbeatStatus {
        self.last_heartbeat = Some(now);
        HeartbeatStatus::online(self.uptime())
    }

    /// Status payload for a graceful goodbye.
    pub fn offline_status(&self) -> HeartbeatStatus {
        HeartbeatStatus::offline(self.uptime())
    }

    /// Execute one inbound command.
    pub async fn handle_command(
        &mut self,
        command: Command,
        hw: &mut impl HardwareIO,
    ) -> CommandOutcome {
        command::execute(command, &mut self.state, hw, self.fan_hold).await
    }

    /// Force both outputs inactive. Runs before hardware release on
    /// every shutdown path; a failure here is logged and the remaining
    /// output is still forced.
    pub fn shutdown(&mut self, hw: &mut impl HardwareIO) {
        info!("Forcing outputs low");
        if let Err(e) = hw.set_fan(false) {
            error!("Failed to force fan low: {}", e);
        }
        if let Err(e) = hw.set_buzzer(false) {
            error!("Failed to force buzzer low: {}", e);
        }
        self.state.fan_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::pins::PinConfig;
    use crate::hardware::sim::{OutputCall, SimulatedHardware};
    use crate::hardware::Button;

    const HEARTBEAT: Duration = Duration::from_secs(30);
    const HOLD: Duration = Duration::from_secs(300);

    fn fixture() -> (Agent, SimulatedHardware) {
        (
            Agent::new(HEARTBEAT, HOLD),
            SimulatedHardware::new(PinConfig::default()),
        )
    }

    #[test]
    fn test_heartbeat_cadence() {
        let (mut agent, _) = fixture();
        let t0 = Instant::now();

        // Nothing sent yet, first check fires immediately.
        assert!(agent.heartbeat_due(t0).is_some());
        assert!(agent.heartbeat_due(t0 + Duration::from_secs(5)).is_none());
        assert!(agent.heartbeat_due(t0 + Duration::from_secs(29)).is_none());
        assert!(agent.heartbeat_due(t0 + Duration::from_secs(30)).is_some());
        // Period restarts from the send, not from t0.
        assert!(agent.heartbeat_due(t0 + Duration::from_secs(59)).is_none());
        assert!(agent.heartbeat_due(t0 + Duration::from_secs(60)).is_some());
    }

    #[test]
    fn test_heartbeat_now_restamps_period() {
        let (mut agent, _) = fixture();
        let t0 = Instant::now();
        agent.heartbeat_now(t0);
        assert!(agent.heartbeat_due(t0 + Duration::from_secs(10)).is_none());
        assert!(agent.heartbeat_due(t0 + Duration::from_secs(30)).is_some());
    }

    #[test]
    fn test_uptime_monotonic_from_start() {
        let (agent, _) = fixture();
        let hb = agent.offline_status();
        assert!(hb.uptime_seconds >= 0.0);
        assert!(hb.uptime_seconds < 60.0);
    }

    #[test]
    fn test_sensing_and_buttons_share_state() {
        let (mut agent, mut hw) = fixture();
        hw.set_climate(Some((31.0, 50.0)));
        hw.press(Button::Help);

        let reading = agent.run_sensing(&mut hw).unwrap();
        assert!(reading.fan_active);

        let alerts = agent.poll_buttons(&mut hw);
        assert_eq!(alerts.len(), 1);
        // Held button stays silent on the next poll.
        assert!(agent.poll_buttons(&mut hw).is_empty());
    }

    #[test]
    fn test_sensing_fault_yields_none() {
        let (mut agent, mut hw) = fixture();
        hw.set_climate_fault(true);
        assert!(agent.run_sensing(&mut hw).is_none());
    }

    #[test]
    fn test_shutdown_forces_outputs_low() {
        let (mut agent, mut hw) = fixture();
        hw.set_climate(Some((31.0, 50.0)));
        agent.run_sensing(&mut hw).unwrap();
        assert!(hw.fan());

        agent.shutdown(&mut hw);
        assert!(!hw.fan());
        assert!(!hw.buzzer());
        assert!(!agent.state.fan_active);
        assert_eq!(
            hw.outputs().last(),
            Some(&OutputCall::Buzzer(false))
        );
    }

    #[tokio::test]
    async fn test_command_override_survives_next_cycle() {
        let (mut agent, mut hw) = fixture();

        let outcome = agent
            .handle_command(Command::FanControl { state: true }, &mut hw)
            .await;
        assert!(matches!(outcome, CommandOutcome::Completed { .. }));

        // Cool room right after the override: hold keeps the fan on.
        hw.set_climate(Some((20.0, 50.0)));
        let reading = agent.run_sensing(&mut hw).unwrap();
        assert!(reading.fan_active);
        assert!(agent.state.fan_active);
    }
}
