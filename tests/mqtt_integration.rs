// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the MQTT command sink using mockforge-mqtt.

#![cfg(feature = "mqtt")]

use std::sync::Arc;
use std::time::Duration;

use lumen_lib::animation::{AnimationRegistry, Outcome};
use lumen_lib::command::{DeviceCommand, RawCommand};
use lumen_lib::error::SendError;
use lumen_lib::event::AnimationEvent;
use lumen_lib::protocol::{DeviceCommandSink, DeviceSnapshotProvider, MqttCommandSink, TopicStyle};
use lumen_lib::state::SnapshotStore;
use lumen_lib::types::{Brightness, BrightnessScale, PowerState};
use mockforge_mqtt::broker::MqttConfig;
use mockforge_mqtt::start_mqtt_server;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use serde_json::{Value, json};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, timeout};

/// Helper to find an available port for testing.
fn get_test_port() -> u16 {
    use std::sync::atomic::{AtomicU16, Ordering};
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(18850);
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Starts a mock MQTT broker on the given port.
async fn start_mock_broker(port: u16) {
    let config = MqttConfig {
        port,
        host: "127.0.0.1".to_string(),
        ..Default::default()
    };

    tokio::spawn(async move {
        let _ = start_mqtt_server(config).await;
    });

    // Give the broker time to bind and accept connections
    sleep(Duration::from_millis(500)).await;
}

/// A second client on the mock broker that records what it receives.
struct Observer {
    client: AsyncClient,
    messages: mpsc::UnboundedReceiver<(String, String)>,
}

impl Observer {
    /// Connects and waits until `filter` is subscribed.
    async fn subscribe(port: u16, filter: &str) -> Self {
        let mut options = MqttOptions::new(format!("observer-{port}"), "127.0.0.1", port);
        options.set_keep_alive(Duration::from_secs(5));
        let (client, mut event_loop) = AsyncClient::new(options, 10);
        client.subscribe(filter, QoS::AtMostOnce).await.unwrap();

        let (message_tx, messages) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        tokio::spawn(async move {
            let mut ready_tx = Some(ready_tx);
            while let Ok(event) = event_loop.poll().await {
                match event {
                    Event::Incoming(Packet::SubAck(_)) => {
                        if let Some(tx) = ready_tx.take() {
                            let _ = tx.send(());
                        }
                    }
                    Event::Incoming(Packet::Publish(publish)) => {
                        let payload = String::from_utf8_lossy(&publish.payload).into_owned();
                        let _ = message_tx.send((publish.topic, payload));
                    }
                    _ => {}
                }
            }
        });

        timeout(Duration::from_secs(5), ready_rx)
            .await
            .expect("observer subscription timed out")
            .unwrap();
        Self { client, messages }
    }

    /// Returns the next `(topic, payload)` seen by the observer.
    async fn next(&mut self) -> (String, String) {
        timeout(Duration::from_secs(5), self.messages.recv())
            .await
            .expect("no message within 5s")
            .unwrap()
    }

    async fn publish(&self, topic: &str, payload: &str) {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload.as_bytes().to_vec())
            .await
            .unwrap();
    }
}

async fn connect(port: u16, style: TopicStyle) -> MqttCommandSink {
    MqttCommandSink::builder()
        .broker(&format!("mqtt://127.0.0.1:{port}"))
        .unwrap()
        .topic_style(style)
        .build()
        .await
        .unwrap()
}

// ============================================================================
// Connection
// ============================================================================

mod connection {
    use super::*;

    #[tokio::test]
    async fn connect_to_broker() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let sink = connect(port, TopicStyle::Tasmota).await;
        assert!(sink.is_connected());
        assert_eq!(sink.config().port(), port);
    }

    #[tokio::test]
    async fn connect_without_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let result = MqttCommandSink::builder()
            .broker(&format!("127.0.0.1:{port}"))
            .unwrap()
            .build()
            .await;
        assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
    }

    #[tokio::test]
    async fn telemetry_updates_snapshot_store() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let store = SnapshotStore::new();
        let sink = MqttCommandSink::builder()
            .host("127.0.0.1")
            .port(port)
            .topic_style(TopicStyle::zigbee2mqtt())
            .snapshot_store(store.clone())
            .build()
            .await
            .unwrap();
        assert!(sink.is_connected());

        let device = Observer::subscribe(port, "unrelated/#").await;

        // The sink subscribes right after ConnAck; republish until it has.
        let mut seen = None;
        for _ in 0..20 {
            device
                .publish("zigbee2mqtt/Desk", r#"{"state":"ON","brightness":180}"#)
                .await;
            sleep(Duration::from_millis(100)).await;
            seen = store.get("Desk");
            if seen.is_some() {
                break;
            }
        }

        let desk = seen.expect("telemetry never reached the store");
        assert_eq!(desk.power(), PowerState::On);
        assert_eq!(desk.brightness, Some(180));
    }

    #[tokio::test]
    async fn no_broker_fails_to_connect() {
        let port = get_test_port();

        let result = MqttCommandSink::builder()
            .host("127.0.0.1")
            .port(port)
            .connection_timeout(Duration::from_secs(2))
            .build()
            .await;
        assert!(matches!(result, Err(SendError::ConnectionFailed(_))));
    }
}

// ============================================================================
// Publishing
// ============================================================================

mod publishing {
    use super::*;

    #[tokio::test]
    async fn tasmota_command() {
        let port = get_test_port();
        start_mock_broker(port).await;
        let mut observer = Observer::subscribe(port, "cmnd/animations/#").await;

        let sink = connect(port, TopicStyle::Tasmota).await;
        sink.send("animations", "Power", "ON").await.unwrap();
        sink.send("animations", "HsbColor", "120,100,50").await.unwrap();

        assert_eq!(
            observer.next().await,
            ("cmnd/animations/Power".to_string(), "ON".to_string())
        );
        assert_eq!(
            observer.next().await,
            ("cmnd/animations/HsbColor".to_string(), "120,100,50".to_string())
        );
    }

    #[tokio::test]
    async fn tasmota_raw_brightness_goes_out_as_dimmer() {
        let port = get_test_port();
        start_mock_broker(port).await;
        let mut observer = Observer::subscribe(port, "cmnd/lamp/#").await;

        let sink = connect(port, TopicStyle::Tasmota).await;
        let registry = AnimationRegistry::new(Arc::new(sink));
        let full = DeviceCommand::Brightness(Brightness::full(BrightnessScale::Byte));
        registry.send("lamp", &full).await.unwrap();

        assert_eq!(
            observer.next().await,
            ("cmnd/lamp/Dimmer".to_string(), "100".to_string())
        );
    }

    #[tokio::test]
    async fn zigbee2mqtt_command() {
        let port = get_test_port();
        start_mock_broker(port).await;
        let mut observer = Observer::subscribe(port, "zigbee2mqtt/Desk/set").await;

        let sink = connect(port, TopicStyle::zigbee2mqtt()).await;
        sink.send("Desk", "Dimmer", "50").await.unwrap();

        let (topic, body) = observer.next().await;
        assert_eq!(topic, "zigbee2mqtt/Desk/set");
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body, json!({"state": "ON", "brightness": 127}));
    }

    #[tokio::test]
    async fn zigbee2mqtt_rejects_unknown_command() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let sink = connect(port, TopicStyle::zigbee2mqtt()).await;
        let result = sink.send("Desk", "Backlog", "Power ON").await;
        assert!(matches!(result, Err(SendError::Rejected(_))));
    }

    #[tokio::test]
    async fn send_after_disconnect_fails() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let sink = connect(port, TopicStyle::Tasmota).await;
        sink.disconnect().await.unwrap();

        let result = sink.send("animations", "Power", "OFF").await;
        assert!(matches!(result, Err(SendError::NotConnected)));
    }
}

// ============================================================================
// Animations over MQTT
// ============================================================================

mod animations {
    use super::*;

    #[tokio::test]
    async fn pulse_runs_to_completion() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let mut observer = Observer::subscribe(port, "cmnd/animations/Power").await;

        let sink = connect(port, TopicStyle::Tasmota).await;
        let registry = AnimationRegistry::new(Arc::new(sink));
        let mut events = registry.subscribe();

        let params = json!({"target": "animations", "cycles": 2, "interval_ms": 20});
        registry
            .start("pulse-animations", "pulse", params.as_object().unwrap())
            .unwrap();

        let report = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let AnimationEvent::Finished { report, .. } = events.recv().await.unwrap() {
                    return report;
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(report.outcome, Outcome::Completed);
        assert_eq!(report.sent, 5);
        assert_eq!(report.failed, 0);
        assert!(!registry.is_any_running());

        let mut payloads = Vec::new();
        for _ in 0..5 {
            payloads.push(observer.next().await.1);
        }
        assert_eq!(payloads, ["ON", "OFF", "ON", "OFF", "ON"]);
    }

    #[tokio::test]
    async fn direct_commands() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let mut observer = Observer::subscribe(port, "cmnd/lamp/#").await;

        let sink = connect(port, TopicStyle::Tasmota).await;
        let registry = AnimationRegistry::new(Arc::new(sink));

        registry.send("lamp", &DeviceCommand::on()).await.unwrap();
        registry
            .send("lamp", &RawCommand::new("Fade", "1"))
            .await
            .unwrap();
        registry.emergency_stop("lamp").await.unwrap();

        let seen = [
            observer.next().await,
            observer.next().await,
            observer.next().await,
        ];
        assert_eq!(
            seen.map(|(topic, payload)| format!("{topic} {payload}")),
            [
                "cmnd/lamp/Power ON",
                "cmnd/lamp/Fade 1",
                "cmnd/lamp/Power OFF"
            ]
        );
    }
}
