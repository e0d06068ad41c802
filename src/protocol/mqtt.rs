// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT command sink.
//!
//! Publishes every command at QoS 0, not retained. Animation steps are
//! superseded within milliseconds, so redelivery would only replay stale
//! frames.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use lumen_lib::animation::AnimationRegistry;
//! use lumen_lib::protocol::{MqttCommandSink, TopicStyle};
//! use lumen_lib::state::SnapshotStore;
//!
//! # async fn example() -> lumen_lib::Result<()> {
//! let store = SnapshotStore::new();
//! let sink = MqttCommandSink::builder()
//!     .broker("mqtt://192.168.1.50:1883")?
//!     .credentials("user", "password")
//!     .topic_style(TopicStyle::zigbee2mqtt())
//!     .snapshot_store(store.clone())
//!     .build()
//!     .await?;
//!
//! let registry = AnimationRegistry::builder(Arc::new(sink))
//!     .snapshot_provider(Arc::new(store))
//!     .build();
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use tokio::sync::oneshot;

use crate::error::{ParseError, SendError};
use crate::protocol::topic::DEFAULT_Z2M_BASE_TOPIC;
use crate::protocol::{DeviceCommandSink, TopicStyle};
use crate::state::SnapshotStore;
use crate::telemetry::parse_telemetry;

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Default MQTT port.
const DEFAULT_PORT: u16 = 1883;

/// Connection settings for [`MqttCommandSink`].
#[derive(Debug, Clone)]
pub struct MqttSinkConfig {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    client_id: Option<String>,
    keep_alive: Duration,
    connection_timeout: Duration,
    topic_style: TopicStyle,
}

impl MqttSinkConfig {
    /// Returns the broker host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the broker port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns how commands map to topics.
    #[must_use]
    pub fn topic_style(&self) -> &TopicStyle {
        &self.topic_style
    }

    /// Base topic telemetry is read from.
    fn telemetry_base(&self) -> &str {
        match &self.topic_style {
            TopicStyle::Zigbee2Mqtt { base_topic } => base_topic,
            TopicStyle::Tasmota => DEFAULT_Z2M_BASE_TOPIC,
        }
    }
}

impl Default for MqttSinkConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            credentials: None,
            client_id: None,
            keep_alive: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            topic_style: TopicStyle::default(),
        }
    }
}

/// A [`DeviceCommandSink`] publishing to an MQTT broker.
///
/// Optionally feeds a [`SnapshotStore`] from Zigbee2MQTT telemetry on the
/// same connection. Cheap to clone; clones share the connection.
#[derive(Clone)]
pub struct MqttCommandSink {
    inner: Arc<MqttSinkInner>,
}

struct MqttSinkInner {
    client: AsyncClient,
    config: MqttSinkConfig,
    connected: AtomicBool,
}

impl MqttCommandSink {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> MqttCommandSinkBuilder {
        MqttCommandSinkBuilder::default()
    }

    /// Returns whether the broker connection is up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    /// Returns the connection settings.
    #[must_use]
    pub fn config(&self) -> &MqttSinkConfig {
        &self.inner.config
    }

    /// Disconnects from the broker.
    ///
    /// # Errors
    ///
    /// Returns error if the disconnect request cannot be queued.
    pub async fn disconnect(&self) -> Result<(), SendError> {
        tracing::info!(
            host = %self.inner.config.host,
            port = %self.inner.config.port,
            "Disconnecting from MQTT broker"
        );
        self.inner.client.disconnect().await?;
        self.inner.connected.store(false, Ordering::Release);
        Ok(())
    }
}

#[async_trait]
impl DeviceCommandSink for MqttCommandSink {
    async fn send(&self, target: &str, command: &str, value: &str) -> Result<(), SendError> {
        if !self.is_connected() {
            return Err(SendError::NotConnected);
        }

        let style = &self.inner.config.topic_style;
        let topic = style.command_topic(target, command);
        let payload = style.payload(command, value)?;

        tracing::debug!(topic = %topic, payload = %payload, "Publishing command");
        self.inner
            .client
            .publish(&topic, QoS::AtMostOnce, false, payload)
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for MqttCommandSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttCommandSink")
            .field("host", &self.inner.config.host)
            .field("port", &self.inner.config.port)
            .field("topic_style", &self.inner.config.topic_style)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Builder for [`MqttCommandSink`].
#[derive(Debug, Default)]
pub struct MqttCommandSinkBuilder {
    config: MqttSinkConfig,
    snapshots: Option<SnapshotStore>,
}

impl MqttCommandSinkBuilder {
    /// Sets host and port from a URL such as `mqtt://host:1883`.
    ///
    /// `mqtt://` and `tcp://` prefixes are optional; the port defaults to
    /// 1883.
    ///
    /// # Errors
    ///
    /// Returns `SendError::InvalidAddress` if the port is not a number.
    pub fn broker(mut self, url: &str) -> Result<Self, SendError> {
        let (host, port) = parse_mqtt_url(url)?;
        self.config.host = host;
        self.config.port = port;
        Ok(self)
    }

    /// Sets the broker host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the broker port (default: 1883).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets a fixed client id instead of a generated one.
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.config.client_id = Some(id.into());
        self
    }

    /// Sets the keep-alive interval (default: 30 seconds).
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.config.keep_alive = duration;
        self
    }

    /// Sets how long to wait for the broker's `ConnAck` (default: 10 seconds).
    #[must_use]
    pub fn connection_timeout(mut self, duration: Duration) -> Self {
        self.config.connection_timeout = duration;
        self
    }

    /// Sets the topic layout (default: Tasmota).
    #[must_use]
    pub fn topic_style(mut self, style: TopicStyle) -> Self {
        self.config.topic_style = style;
        self
    }

    /// Keeps `store` up to date from Zigbee2MQTT telemetry.
    #[must_use]
    pub fn snapshot_store(mut self, store: SnapshotStore) -> Self {
        self.snapshots = Some(store);
        self
    }

    /// Connects to the broker.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Host is not set
    /// - Connection fails or times out
    /// - The telemetry subscription fails
    pub async fn build(self) -> Result<MqttCommandSink, SendError> {
        let Self { config, snapshots } = self;
        if config.host.is_empty() {
            return Err(SendError::InvalidAddress(
                "MQTT broker host is required".to_string(),
            ));
        }

        let client_id = config.client_id.clone().unwrap_or_else(|| {
            let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
            format!("lumen_{}_{}", std::process::id(), counter)
        });

        let mut mqtt_options = MqttOptions::new(&client_id, &config.host, config.port);
        mqtt_options.set_keep_alive(config.keep_alive);
        mqtt_options.set_clean_session(true);
        if let Some((ref username, ref password)) = config.credentials {
            mqtt_options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, 10);
        let telemetry_base = config.telemetry_base().to_string();
        let timeout = config.connection_timeout;

        let sink = MqttCommandSink {
            inner: Arc::new(MqttSinkInner {
                client,
                config,
                connected: AtomicBool::new(false),
            }),
        };

        let (connack_tx, connack_rx) = oneshot::channel();
        let telemetry = snapshots.map(|store| Telemetry {
            base_topic: telemetry_base,
            store,
        });
        tokio::spawn(handle_sink_events(
            event_loop,
            sink.clone(),
            telemetry,
            Some(connack_tx),
        ));

        match tokio::time::timeout(timeout, connack_rx).await {
            Ok(Ok(())) => {
                sink.inner.connected.store(true, Ordering::Release);
                tracing::info!(
                    host = %sink.inner.config.host,
                    port = %sink.inner.config.port,
                    client_id = %client_id,
                    "Connected to MQTT broker"
                );
            }
            Ok(Err(_)) => {
                return Err(SendError::ConnectionFailed(
                    "MQTT event loop terminated unexpectedly".to_string(),
                ));
            }
            Err(_) => {
                return Err(SendError::ConnectionFailed(format!(
                    "MQTT connection timeout after {}s",
                    timeout.as_secs()
                )));
            }
        }

        Ok(sink)
    }
}

/// Where incoming telemetry goes.
struct Telemetry {
    base_topic: String,
    store: SnapshotStore,
}

impl Telemetry {
    fn handle(&self, topic: &str, payload: &str) {
        match parse_telemetry(&self.base_topic, topic, payload) {
            Ok(message) => {
                if self.store.ingest(&message) {
                    tracing::trace!(topic = %topic, "Snapshot updated");
                }
            }
            Err(ParseError::UnexpectedTopic(_)) => {}
            Err(e) => tracing::debug!(topic = %topic, error = %e, "Ignoring telemetry"),
        }
    }
}

/// Parses an MQTT URL into host and port.
fn parse_mqtt_url(url: &str) -> Result<(String, u16), SendError> {
    let url = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    match url.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse()
                .map_err(|_| SendError::InvalidAddress(format!("Invalid port: {port}")))?;
            Ok((host.to_string(), port))
        }
        None => Ok((url.to_string(), DEFAULT_PORT)),
    }
}

/// Drives the `rumqttc` event loop for the sink's lifetime.
async fn handle_sink_events(
    mut event_loop: EventLoop,
    sink: MqttCommandSink,
    telemetry: Option<Telemetry>,
    mut connack_tx: Option<oneshot::Sender<()>>,
) {
    use rumqttc::{Event, Packet};

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT sink connected");
                sink.inner.connected.store(true, Ordering::Release);
                if let Some(telemetry) = &telemetry {
                    // Clean sessions drop subscriptions, so renew on every ConnAck.
                    let filter = format!("{}/#", telemetry.base_topic);
                    if let Err(e) = sink.inner.client.try_subscribe(&filter, QoS::AtMostOnce) {
                        tracing::warn!(filter = %filter, error = %e, "Telemetry subscription failed");
                    }
                }
                if let Some(tx) = connack_tx.take() {
                    let _ = tx.send(());
                }
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let Some(telemetry) = &telemetry else {
                    continue;
                };
                if let Ok(payload) = std::str::from_utf8(&publish.payload) {
                    telemetry.handle(&publish.topic, payload);
                }
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::info!("MQTT broker disconnected");
                sink.inner.connected.store(false, Ordering::Release);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "MQTT sink event loop error");
                sink.inner.connected.store(false, Ordering::Release);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DeviceSnapshot;
    use crate::protocol::DeviceSnapshotProvider;

    #[test]
    fn parse_mqtt_url_with_port() {
        let (host, port) = parse_mqtt_url("mqtt://192.168.1.50:1884").unwrap();
        assert_eq!(host, "192.168.1.50");
        assert_eq!(port, 1884);
    }

    #[test]
    fn parse_mqtt_url_default_port() {
        let (host, port) = parse_mqtt_url("broker.local").unwrap();
        assert_eq!(host, "broker.local");
        assert_eq!(port, 1883);
    }

    #[test]
    fn parse_mqtt_url_tcp_scheme() {
        let (host, port) = parse_mqtt_url("tcp://broker.local:8883").unwrap();
        assert_eq!(host, "broker.local");
        assert_eq!(port, 8883);
    }

    #[test]
    fn parse_mqtt_url_bad_port() {
        assert!(matches!(
            parse_mqtt_url("mqtt://broker:abc"),
            Err(SendError::InvalidAddress(_))
        ));
    }

    #[test]
    fn builder_defaults() {
        let builder = MqttCommandSink::builder();
        assert_eq!(builder.config.port(), 1883);
        assert!(builder.config.host().is_empty());
        assert_eq!(builder.config.topic_style(), &TopicStyle::Tasmota);
        assert_eq!(builder.config.keep_alive, Duration::from_secs(30));
        assert!(builder.snapshots.is_none());
    }

    #[test]
    fn builder_chain() {
        let builder = MqttCommandSink::builder()
            .broker("mqtt://10.0.0.2:1885")
            .unwrap()
            .credentials("admin", "secret")
            .client_id("lumen-test")
            .topic_style(TopicStyle::zigbee2mqtt())
            .connection_timeout(Duration::from_secs(3));

        assert_eq!(builder.config.host(), "10.0.0.2");
        assert_eq!(builder.config.port(), 1885);
        assert_eq!(builder.config.client_id.as_deref(), Some("lumen-test"));
        assert_eq!(builder.config.telemetry_base(), "zigbee2mqtt");
        assert_eq!(builder.config.connection_timeout, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn build_without_host_fails() {
        let result = MqttCommandSink::builder().build().await;
        assert!(matches!(result, Err(SendError::InvalidAddress(_))));
    }

    #[test]
    fn telemetry_updates_store() {
        let store = SnapshotStore::new();
        store.upsert(DeviceSnapshot::new("Desk"));
        let telemetry = Telemetry {
            base_topic: "z2m".to_string(),
            store: store.clone(),
        };

        telemetry.handle("z2m/Desk", r#"{"state":"ON"}"#);
        telemetry.handle("z2m/Desk/set", r#"{"state":"OFF"}"#);
        telemetry.handle("z2m/Desk", "not json");

        assert!(store.get("Desk").unwrap().is_on);
    }
}
