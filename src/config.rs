//! Environment-driven configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Agent configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Unique device identifier; doubles as the MQTT client id.
    pub device_id: String,
    /// Broker host
    pub broker_host: String,
    /// Broker port
    pub broker_port: u16,
    /// Optional broker credentials; both must be non-empty to apply
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sensing + button polling period
    pub sample_period: Duration,
    /// Heartbeat period
    pub heartbeat_period: Duration,
    /// How long a manual fan override suppresses autonomous control
    pub fan_hold: Duration,
    /// MQTT keep-alive
    pub keep_alive: Duration,
    /// Startup window for the first broker session
    pub connect_timeout: Duration,
    /// Reconnection backoff (initial)
    pub reconnect_delay: Duration,
    /// Reconnection backoff (cap)
    pub max_reconnect_delay: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            device_id: "EDC_RPI_001".into(),
            broker_host: "localhost".into(),
            broker_port: 1883,
            username: None,
            password: None,
            sample_period: Duration::from_secs(5),
            heartbeat_period: Duration::from_secs(30),
            fan_hold: Duration::from_secs(300),
            keep_alive: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(30),
        }
    }
}

impl AgentConfig {
    /// Load from the environment, keeping defaults for anything unset
    /// or unparsable.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            device_id: env_string("DEVICE_ID", &d.device_id),
            broker_host: env_string("MQTT_BROKER", &d.broker_host),
            broker_port: env_parse("MQTT_PORT", d.broker_port),
            username: env_opt("MQTT_USERNAME"),
            password: env_opt("MQTT_PASSWORD"),
            sample_period: env_secs("SAMPLE_PERIOD_SECS", d.sample_period),
            heartbeat_period: env_secs("HEARTBEAT_PERIOD_SECS", d.heartbeat_period),
            fan_hold: env_secs("FAN_HOLD_SECS", d.fan_hold),
            keep_alive: env_secs("MQTT_KEEP_ALIVE_SECS", d.keep_alive),
            connect_timeout: env_secs("MQTT_CONNECT_TIMEOUT_SECS", d.connect_timeout),
            reconnect_delay: d.reconnect_delay,
            max_reconnect_delay: d.max_reconnect_delay,
        }
    }

    /// Credentials, when both halves are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => Some((u, p)),
            _ => None,
        }
    }
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key).ok().unwrap_or_else(|| default.to_string())
}

/// Empty string counts as unset, matching the reference deployment
/// scripts that export blank credentials.
fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Zero counts as unparsable: every period configured through this
/// helper feeds a timer, and a zero-length interval panics.
fn env_secs(key: &str, default: Duration) -> Duration {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|&secs| secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_deployment() {
        let config = AgentConfig::default();
        assert_eq!(config.device_id, "EDC_RPI_001");
        assert_eq!(config.broker_host, "localhost");
        assert_eq!(config.broker_port, 1883);
        assert_eq!(config.sample_period, Duration::from_secs(5));
        assert_eq!(config.heartbeat_period, Duration::from_secs(30));
        assert_eq!(config.fan_hold, Duration::from_secs(300));
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_credentials_require_both_halves() {
        let mut config = AgentConfig::default();
        config.username = Some("node".into());
        assert!(config.credentials().is_none());
        config.password = Some("secret".into());
        assert_eq!(config.credentials(), Some(("node", "secret")));
    }

    #[test]
    fn test_zero_period_env_keeps_default() {
        // A key no other test touches; the environment is process-wide.
        env::set_var("CARENODE_TEST_PERIOD_SECS", "0");
        assert_eq!(
            env_secs("CARENODE_TEST_PERIOD_SECS", Duration::from_secs(5)),
            Duration::from_secs(5)
        );
        env::set_var("CARENODE_TEST_PERIOD_SECS", "7");
        assert_eq!(
            env_secs("CARENODE_TEST_PERIOD_SECS", Duration::from_secs(5)),
            Duration::from_secs(7)
        );
        env::remove_var("CARENODE_TEST_PERIOD_SECS");
    }
}
