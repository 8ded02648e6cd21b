mod agent;
mod bus;
mod buttons;
mod buzzer;
mod command;
mod config;
mod hardware;
mod protocol;
mod sensing;
mod state;

use std::time::{Duration, Instant};

use anyhow::Context;
use rumqttc::QoS;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agent::Agent;
use bus::mqtt::MqttBus;
use bus::BusEvent;
use config::AgentConfig;
use hardware::pins::PinConfig;
use hardware::sim::SimulatedHardware;
use protocol::{topics, STATUS_RETAIN};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AgentConfig::from_env();
    let pins = PinConfig::from_env();

    info!("Care node starting: {}", config.device_id);
    info!("  broker: {}:{}", config.broker_host, config.broker_port);

    // The node cannot operate without the bus, so a dead broker at
    // startup ends the process here.
    let mut bus = MqttBus::connect(&config)
        .await
        .context("broker connection failed at startup")?;

    let mut hw = SimulatedHardware::new(pins);
    let mut agent = Agent::new(config.heartbeat_period, config.fan_hold);

    let sensors_topic = topics::sensors(&config.device_id);
    let alerts_topic = topics::alerts(&config.device_id);
    let status_topic = topics::status(&config.device_id);

    let mut ticker = tokio::time::interval(config.sample_period);
    // A long tick (a playing buzzer pattern) just delays the next one.
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut sigterm = signal(SignalKind::terminate())?;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!(
        "Entering control loop, sample period {:?}",
        config.sample_period
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_tick(
                    &mut agent,
                    &mut hw,
                    &bus,
                    &sensors_topic,
                    &alerts_topic,
                    &status_topic,
                );
            }

            event = bus.recv() => match event {
                Some(BusEvent::Command(payload)) => {
                    if let Some(cmd) = command::decode(&payload) {
                        agent.handle_command(cmd, &mut hw).await;
                    }
                }
                Some(BusEvent::Connected) => {
                    info!("Broker session re-established");
                    let hb = agent.heartbeat_now(Instant::now());
                    publish_json(&bus, &status_topic, QoS::AtLeastOnce, STATUS_RETAIN, &hb);
                }
                Some(BusEvent::Disconnected { reason }) => {
                    warn!("Broker connection lost: {}", reason);
                }
                None => {
                    error!("Bus driver stopped");
                    break;
                }
            },

            _ = &mut ctrl_c => {
                info!("Interrupt received, shutting down");
                break;
            }

            _ = sigterm.recv() => {
                info!("Terminate received, shutting down");
                break;
            }
        }
    }

    shutdown(agent, hw, bus, &status_topic).await;
    info!("Care node stopped");
    Ok(())
}

/// One scheduler tick: sensing, then button polling, then heartbeat.
/// The order is load-bearing: a published reading reflects this tick's
/// fan decision, never a stale one.
fn run_tick(
    agent: &mut Agent,
    hw: &mut SimulatedHardware,
    bus: &MqttBus,
    sensors_topic: &str,
    alerts_topic: &str,
    status_topic: &str,
) {
    if let Some(reading) = agent.run_sensing(hw) {
        debug!("Sensor data: {:?}", reading);
        publish_json(bus, sensors_topic, QoS::AtMostOnce, false, &reading);
    }

    for alert in agent.poll_buttons(hw) {
        info!("Sending alert: {:?} ({:?})", alert.kind, alert.priority);
        publish_json(bus, alerts_topic, QoS::AtLeastOnce, false, &alert);
    }

    if let Some(hb) = agent.heartbeat_due(Instant::now()) {
        debug!("Heartbeat, uptime {:.0}s", hb.uptime_seconds);
        publish_json(bus, status_topic, QoS::AtLeastOnce, STATUS_RETAIN, &hb);
    }
}

/// Serialize and publish, best-effort. A dropped publish (encode
/// failure, or an outage backlog filling the request queue) is logged
/// and forgotten; the next cycle produces fresh data anyway.
fn publish_json<T: serde::Serialize>(
    bus: &MqttBus,
    topic: &str,
    qos: QoS,
    retain: bool,
    value: &T,
) {
    let payload = match serde_json::to_vec(value) {
        Ok(payload) => payload,
        Err(e) => {
            error!("Failed to encode payload for {}: {}", topic, e);
            return;
        }
    };
    if let Err(e) = bus.publish(topic, qos, retain, payload) {
        warn!("Publish to {} dropped: {}", topic, e);
    }
}

/// Ordered shutdown: outputs forced low, hardware released, explicit
/// offline status, transport closed.
async fn shutdown(mut agent: Agent, mut hw: SimulatedHardware, bus: MqttBus, status_topic: &str) {
    agent.shutdown(&mut hw);
    drop(hw);

    let goodbye = agent.offline_status();
    publish_json(&bus, status_topic, QoS::AtLeastOnce, STATUS_RETAIN, &goodbye);
    if let Err(e) = bus.disconnect() {
        warn!("Broker disconnect failed: {}", e);
    }
    // Give the driver a beat to flush the goodbye before the process
    // tears the event loop down with it.
    tokio::time::sleep(Duration::from_millis(200)).await;
}
