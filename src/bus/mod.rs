//! Message bus seam: broker connectivity for the agent loop.

pub mod mqtt;

use std::time::Duration;

use thiserror::Error;

/// Events surfaced to the agent loop.
#[derive(Debug)]
pub enum BusEvent {
    /// Session established (first connect or a reconnect). The command
    /// subscription has already been re-registered.
    Connected,
    /// Session lost. The driver keeps reconnecting on its own; this is
    /// informational.
    Disconnected { reason: String },
    /// Raw payload delivered on the command topic.
    Command(Vec<u8>),
}

/// Bus failures.
#[derive(Debug, Error)]
pub enum BusError {
    /// No broker session within the startup window.
    #[error("no broker session within {0:?}")]
    ConnectTimeout(Duration),

    /// Request rejected by the client (queue full, client stopped).
    #[error("mqtt client error: {0}")]
    Client(#[from] rumqttc::ClientError),

    /// The driver task stopped and no further events will arrive.
    #[error("bus driver stopped")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_failure() {
        let err = BusError::ConnectTimeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "no broker session within 10s");
        assert_eq!(BusError::Closed.to_string(), "bus driver stopped");
    }
}
