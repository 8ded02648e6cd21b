//! Wire types for the care-portal MQTT contract.
//!
//! Payloads are JSON and key names follow the portal's existing schema
//! (camelCase object keys, upper-case alert enums, snake_case command
//! types), so structs carry serde renames wherever the Rust name differs.
//! Breaking any key here breaks the dashboard.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Current timestamp in the portal's format: local time, no offset.
pub fn now_local() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Topic layout under the per-device namespace.
pub mod topics {
    /// Periodic readings published by the device.
    pub fn sensors(device_id: &str) -> String {
        format!("device/{}/sensors", device_id)
    }

    /// Button and event alerts published by the device.
    pub fn alerts(device_id: &str) -> String {
        format!("device/{}/alerts", device_id)
    }

    /// Heartbeat / liveness published by the device.
    pub fn status(device_id: &str) -> String {
        format!("device/{}/status", device_id)
    }

    /// Inbound commands from the portal; the device subscribes here.
    pub fn commands(device_id: &str) -> String {
        format!("device/{}/commands", device_id)
    }
}

/// One periodic sensor sample.
///
/// `motion` is the PIR level at the instant of the sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub temperature: f32,
    pub humidity: f32,
    #[serde(rename = "motion")]
    pub motion_detected: bool,
    pub fan_active: bool,
    pub timestamp: NaiveDateTime,
}

/// Alert categories the device can raise. The portal defines more
/// (server-side) variants; these are the device-originated ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    Help,
    Water,
    Other,
}

/// Priorities the device assigns. The portal's full scale has more
/// levels; only these two originate here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertPriority {
    Medium,
    Critical,
}

/// A single event alert, published once per triggering press.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub priority: AlertPriority,
    pub timestamp: NaiveDateTime,
}

impl Alert {
    /// Create an alert stamped with the current time.
    pub fn new(kind: AlertKind, priority: AlertPriority, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            priority,
            timestamp: now_local(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
}

/// Heartbeat published on the status topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatStatus {
    pub status: DeviceStatus,
    pub timestamp: NaiveDateTime,
    pub uptime_seconds: f64,
}

impl HeartbeatStatus {
    pub fn online(uptime_seconds: f64) -> Self {
        Self {
            status: DeviceStatus::Online,
            timestamp: now_local(),
            uptime_seconds,
        }
    }

    pub fn offline(uptime_seconds: f64) -> Self {
        Self {
            status: DeviceStatus::Offline,
            timestamp: now_local(),
            uptime_seconds,
        }
    }
}

/// Payload pre-registered with the broker as the last will. Static
/// because the broker publishes it on our behalf after an ungraceful
/// drop; no timestamp can be attached ahead of time.
pub const OFFLINE_WILL: &str = r#"{"status":"offline"}"#;

/// Status publishes and the will are both retained, so the broker's
/// retained slot always holds the latest liveness state. Retaining
/// only one side would leave late subscribers a stale answer.
pub const STATUS_RETAIN: bool = true;

/// Commands accepted from the portal.
///
/// An unrecognized `type` decodes to [`Command::Unknown`] so that new
/// portal-side commands degrade to a logged no-op here instead of a
/// decode failure. Missing optional fields take the portal's historical
/// defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    FanControl {
        #[serde(default)]
        state: bool,
    },
    BuzzerTest,
    MedicationReminder {
        #[serde(default = "default_medication")]
        medication: String,
    },
    #[serde(other)]
    Unknown,
}

fn default_medication() -> String {
    "Unknown".to_string()
}

/// Round to one decimal place for emission. Readings travel with the
/// precision the dashboard displays.
pub fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap()
    }

    #[test]
    fn test_sensor_reading_wire_keys() {
        let reading = SensorReading {
            temperature: 24.5,
            humidity: 51.0,
            motion_detected: true,
            fan_active: false,
            timestamp: ts(),
        };
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["temperature"], 24.5);
        assert_eq!(json["humidity"], 51.0);
        assert_eq!(json["motion"], true);
        assert_eq!(json["fanActive"], false);
        assert_eq!(json["timestamp"], "2025-03-14T09:26:53");
    }

    #[test]
    fn test_alert_wire_keys() {
        let alert = Alert {
            kind: AlertKind::Help,
            message: "Emergency help button pressed".to_string(),
            priority: AlertPriority::Critical,
            timestamp: ts(),
        };
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "HELP");
        assert_eq!(json["priority"], "CRITICAL");
        assert_eq!(json["message"], "Emergency help button pressed");
    }

    #[test]
    fn test_heartbeat_wire_keys() {
        let hb = HeartbeatStatus::online(12.5);
        let json = serde_json::to_value(&hb).unwrap();
        assert_eq!(json["status"], "online");
        assert_eq!(json["uptimeSeconds"], 12.5);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_command_decode_fan() {
        let cmd: Command = serde_json::from_str(r#"{"type":"fan_control","state":true}"#).unwrap();
        assert_eq!(cmd, Command::FanControl { state: true });
    }

    #[test]
    fn test_command_decode_fan_defaults_off() {
        let cmd: Command = serde_json::from_str(r#"{"type":"fan_control"}"#).unwrap();
        assert_eq!(cmd, Command::FanControl { state: false });
    }

    #[test]
    fn test_command_decode_buzzer() {
        let cmd: Command = serde_json::from_str(r#"{"type":"buzzer_test"}"#).unwrap();
        assert_eq!(cmd, Command::BuzzerTest);
    }

    #[test]
    fn test_command_decode_reminder_default_medication() {
        let cmd: Command = serde_json::from_str(r#"{"type":"medication_reminder"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::MedicationReminder {
                medication: "Unknown".to_string()
            }
        );
    }

    #[test]
    fn test_command_unknown_type_is_noop_variant() {
        let cmd: Command = serde_json::from_str(r#"{"type":"camera_pan","angle":90}"#).unwrap();
        assert_eq!(cmd, Command::Unknown);
    }

    #[test]
    fn test_command_malformed_payload_is_error() {
        assert!(serde_json::from_str::<Command>("not json").is_err());
        assert!(serde_json::from_str::<Command>(r#"{"state":true}"#).is_err());
    }

    #[test]
    fn test_topic_layout() {
        assert_eq!(topics::sensors("EDC_RPI_001"), "device/EDC_RPI_001/sensors");
        assert_eq!(topics::commands("EDC_RPI_001"), "device/EDC_RPI_001/commands");
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(24.44), 24.4);
        assert_eq!(round1(24.46), 24.5);
        assert_eq!(round1(-3.26), -3.3);
    }
}
