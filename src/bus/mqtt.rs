//! MQTT bus driver with automatic reconnection.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, LastWill, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::{BusError, BusEvent};
use crate::config::AgentConfig;
use crate::protocol::{topics, OFFLINE_WILL, STATUS_RETAIN};

/// Handle to the broker session.
///
/// Construction waits for the first acknowledged session; after that a
/// spawned driver owns the network loop, reconnects with backoff, and
/// forwards [`BusEvent`]s. Publishes are best-effort and never wait:
/// during an outage the request queue fills with backlog and further
/// publishes fail immediately, which the caller logs and drops. The
/// agent loop must keep ticking whatever the broker is doing.
pub struct MqttBus {
    client: AsyncClient,
    event_rx: mpsc::Receiver<BusEvent>,
}

/// Registered with the broker at connect time; delivered (retained on
/// the status topic) if the session dies without a goodbye.
fn last_will(device_id: &str) -> LastWill {
    LastWill::new(
        topics::status(device_id),
        OFFLINE_WILL,
        QoS::AtLeastOnce,
        STATUS_RETAIN,
    )
}

impl MqttBus {
    /// Connect to the broker and wait for the session to come up.
    ///
    /// Startup cannot proceed without the bus, so no session within
    /// `config.connect_timeout` is an error the caller treats as
    /// fatal. The broker keeps a retained offline will on our status
    /// topic for ungraceful drops.
    pub async fn connect(config: &AgentConfig) -> Result<Self, BusError> {
        let mut options = MqttOptions::new(
            config.device_id.clone(),
            config.broker_host.clone(),
            config.broker_port,
        );
        options.set_keep_alive(config.keep_alive);
        if let Some((username, password)) = config.credentials() {
            options.set_credentials(username, password);
        }
        options.set_last_will(last_will(&config.device_id));

        let (client, eventloop) = AsyncClient::new(options, 20);
        let (event_tx, mut event_rx) = mpsc::channel(100);

        let driver = Driver {
            eventloop,
            client: client.clone(),
            command_topic: topics::commands(&config.device_id),
            event_tx,
            reconnect_delay: config.reconnect_delay,
            max_reconnect_delay: config.max_reconnect_delay,
        };
        tokio::spawn(driver.run());

        // Swallow pre-session noise; only a live session lets us out.
        let first_session = timeout(config.connect_timeout, async {
            loop {
                match event_rx.recv().await {
                    Some(BusEvent::Connected) => return Ok(()),
                    Some(BusEvent::Disconnected { reason }) => {
                        warn!("Broker not reachable yet: {}", reason);
                    }
                    Some(_) => {}
                    None => return Err(BusError::Closed),
                }
            }
        })
        .await;

        match first_session {
            Ok(Ok(())) => Ok(Self { client, event_rx }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(BusError::ConnectTimeout(config.connect_timeout)),
        }
    }

    /// Queue a publish without waiting. A full request queue (outage
    /// backlog) is an immediate error, never a parked caller.
    pub fn publish(
        &self,
        topic: &str,
        qos: QoS,
        retain: bool,
        payload: Vec<u8>,
    ) -> Result<(), BusError> {
        self.client.try_publish(topic, qos, retain, payload)?;
        Ok(())
    }

    /// Next bus event. `None` once the driver has stopped.
    pub async fn recv(&mut self) -> Option<BusEvent> {
        self.event_rx.recv().await
    }

    /// Graceful goodbye, queued without waiting like a publish. A
    /// clean disconnect discards the registered will, so the portal
    /// sees our explicit offline status instead.
    pub fn disconnect(&self) -> Result<(), BusError> {
        self.client.try_disconnect()?;
        Ok(())
    }
}

struct Driver {
    eventloop: EventLoop,
    client: AsyncClient,
    command_topic: String,
    event_tx: mpsc::Sender<BusEvent>,
    reconnect_delay: Duration,
    max_reconnect_delay: Duration,
}

impl Driver {
    /// Network loop. Runs until the agent side drops its receiver.
    async fn run(mut self) {
        let mut delay = self.reconnect_delay;
        let mut subscribed = false;
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    delay = self.reconnect_delay;
                    info!("Broker session established");
                    // Subscribe on every session: the broker forgets us
                    // across clean-session reconnects.
                    subscribed = self.request_subscribe();
                    if self.event_tx.send(BusEvent::Connected).await.is_err() {
                        return;
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    if publish.topic == self.command_topic {
                        let event = BusEvent::Command(publish.payload.to_vec());
                        if self.event_tx.send(event).await.is_err() {
                            return;
                        }
                    } else {
                        debug!("Ignoring publish on {}", publish.topic);
                    }
                }
                Ok(_) => {
                    // Right after a reconnect the request queue may
                    // still be flushing an outage backlog; flushing it
                    // produces events, so retrying here converges.
                    if !subscribed {
                        subscribed = self.request_subscribe();
                    }
                }
                Err(e) => {
                    subscribed = false;
                    let event = BusEvent::Disconnected {
                        reason: e.to_string(),
                    };
                    if self.event_tx.send(event).await.is_err() {
                        return;
                    }
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(self.max_reconnect_delay);
                }
            }
        }
    }

    /// Queue the command subscription without waiting. False when the
    /// request queue had no room yet.
    fn request_subscribe(&self) -> bool {
        match self
            .client
            .try_subscribe(self.command_topic.clone(), QoS::AtLeastOnce)
        {
            Ok(()) => true,
            Err(e) => {
                warn!("Command subscription deferred: {}", e);
                false
            }
        }
    }
}
