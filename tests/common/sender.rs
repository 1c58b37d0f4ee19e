//! UDP sender fixture and listener helpers.
//!
//! [`TestSender`] plays the part of an application emitting log datagrams:
//! it binds an ephemeral loopback socket, connects it to the listener, and
//! fires payloads without waiting for any reply.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use logdrop_core::config::ListenerConfig;
use logdrop_core::{LogRecord, ParseError};
use logdrop_listener::Listener;
use tokio::net::UdpSocket;

use super::builders::PayloadBuilder;

/// How long a harness waits for a datagram before failing the test.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TestSender {
    socket: UdpSocket,
}

impl TestSender {
    pub async fn connect(target: SocketAddr) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0")
            .await
            .expect("unable to bind sender socket");
        socket
            .connect(target)
            .await
            .expect("unable to connect sender socket");
        Self { socket }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.socket.local_addr().expect("sender has a local address")
    }

    pub async fn send(&self, payload: &[u8]) {
        let sent = self.socket.send(payload).await.expect("unable to send datagram");
        assert_eq!(sent, payload.len(), "datagram was sent partially");
    }

    /// The reference traffic pattern: ten records with strictly increasing
    /// wall-clock timestamps, then one with the unresolved sentinel `-1`.
    /// Returns the timestamps in send order.
    pub async fn send_reference_burst(&self) -> Vec<i64> {
        let base = chrono::Utc::now()
            .timestamp_nanos_opt()
            .expect("current time fits in i64 nanoseconds");

        let mut timestamps: Vec<i64> = (0..10).map(|i| base + i).collect();
        timestamps.push(-1);

        for &timestamp in &timestamps {
            self.send(&PayloadBuilder::new().timestamp(timestamp).bytes())
                .await;
        }
        timestamps
    }
}

/// Listener config bound to an ephemeral loopback port.
pub fn loopback_config() -> ListenerConfig {
    let mut config = ListenerConfig::new(0);
    config.bind_address = IpAddr::V4(Ipv4Addr::LOCALHOST);
    config
}

/// Start a loopback listener and a sender connected to it.
pub async fn listener_and_sender(config: ListenerConfig) -> (Listener, TestSender) {
    let listener = Listener::start(&config)
        .await
        .expect("listener should bind");
    let sender = TestSender::connect(listener.local_addr()).await;
    (listener, sender)
}

/// Wait for the next item, failing the test on timeout or on `Closed`.
pub async fn next_item(listener: &mut Listener) -> Result<LogRecord, ParseError> {
    tokio::time::timeout(RECV_TIMEOUT, listener.next())
        .await
        .expect("timed out waiting for a datagram")
        .expect("listener closed unexpectedly")
}
