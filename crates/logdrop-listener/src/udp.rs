//! UDP ingestion listener.
//!
//! A [`Listener`] owns exactly one bound socket and turns every datagram it
//! receives into a `Result<LogRecord, ParseError>`. There is no queue between
//! the socket and the caller: a datagram is only read when the caller asks for
//! the next item, so a slow consumer makes the kernel drop datagrams instead
//! of growing memory here.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use logdrop_core::config::ListenerConfig;
use logdrop_core::{DatagramParser, LogRecord, ParseError, RawDatagram};
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::stats::{ListenerStats, StatsSnapshot};

// Large enough for any UDP payload (65,507 bytes over IPv4), so a datagram is
// never silently truncated by the receive call.
const RECV_BUFFER_SIZE: usize = 65_536;

/// Pause after a failed receive so a persistently failing socket cannot spin.
const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// The socket could not be bound. Fatal to the listener; never retried here.
#[derive(Debug, thiserror::Error)]
#[error("failed to bind UDP listener on {addr}: {source}")]
pub struct BindError {
    pub addr: SocketAddr,
    pub source: io::Error,
}

impl BindError {
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

/// Cloneable, thread-safe way to stop a [`Listener`] from another task.
#[derive(Debug, Clone)]
pub struct StopHandle {
    cancel_token: CancellationToken,
}

impl StopHandle {
    /// Idempotent. A pending [`Listener::next`] resolves to `None`.
    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// One bound UDP endpoint producing parsed log records.
pub struct Listener {
    socket: Option<UdpSocket>,
    local_addr: SocketAddr,
    parser: DatagramParser,
    cancel_token: CancellationToken,
    stats: Arc<ListenerStats>,
    buf: Box<[u8]>,
}

impl Listener {
    /// Bind `config.bind_address:config.port` and return a ready listener.
    pub async fn start(config: &ListenerConfig) -> Result<Self, BindError> {
        Self::start_with_token(config, CancellationToken::new()).await
    }

    /// Like [`Listener::start`], but stopped when `cancel_token` is cancelled.
    /// Pass a child token to tie several listeners to one shutdown signal.
    pub async fn start_with_token(
        config: &ListenerConfig,
        cancel_token: CancellationToken,
    ) -> Result<Self, BindError> {
        let addr = config.socket_addr();
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| BindError { addr, source })?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| BindError { addr, source })?;

        info!(%local_addr, "listening for log datagrams");

        Ok(Self {
            socket: Some(socket),
            local_addr,
            parser: config.parser(),
            cancel_token,
            stats: Arc::default(),
            buf: vec![0u8; RECV_BUFFER_SIZE].into_boxed_slice(),
        })
    }

    /// The address actually bound; differs from the config when port `0` was requested.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            cancel_token: self.cancel_token.clone(),
        }
    }

    pub fn stats(&self) -> Arc<ListenerStats> {
        Arc::clone(&self.stats)
    }

    pub fn is_closed(&self) -> bool {
        self.socket.is_none()
    }

    /// Stop the listener and release the socket. Idempotent.
    pub fn stop(&mut self) {
        self.cancel_token.cancel();
        self.close();
    }

    /// Wait for the next datagram and parse it.
    ///
    /// Returns `None` once the listener is stopped, and on every call after
    /// that. Socket receive errors are logged and counted, never returned.
    pub async fn next(&mut self) -> Option<Result<LogRecord, ParseError>> {
        loop {
            let socket = self.socket.as_ref()?;

            let received = tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => None,
                result = socket.recv_from(&mut self.buf) => Some(result),
            };

            match received {
                None => {
                    self.close();
                    return None;
                }
                Some(Ok((len, peer))) => return Some(self.process(len, peer)),
                Some(Err(err)) => {
                    self.stats.record_receive_error();
                    warn!(local_addr = %self.local_addr, error = %err, "failed to receive datagram");
                    backoff(&self.cancel_token).await;
                }
            }
        }
    }

    /// Push-style consumption: hand every item to `on_item` until stopped,
    /// then return the final counters.
    pub async fn run<F>(mut self, mut on_item: F) -> StatsSnapshot
    where
        F: FnMut(Result<LogRecord, ParseError>),
    {
        while let Some(item) = self.next().await {
            on_item(item);
        }
        self.stats.snapshot()
    }

    fn process(&self, len: usize, peer: SocketAddr) -> Result<LogRecord, ParseError> {
        self.stats.record_received();
        trace!(%peer, len, "received datagram");

        let result = self.parser.parse(RawDatagram::new(&self.buf[..len], peer));
        match &result {
            Ok(_) => self.stats.record_accepted(),
            Err(err) => {
                self.stats.record_rejected();
                debug!(%peer, error = %err, "rejected datagram");
            }
        }
        result
    }

    fn close(&mut self) {
        if self.socket.take().is_some() {
            info!(local_addr = %self.local_addr, "listener closed");
        }
    }
}

/// Sleep for [`RECV_ERROR_BACKOFF`], returning early if `token` is cancelled.
async fn backoff(token: &CancellationToken) {
    tokio::select! {
        biased;
        _ = token.cancelled() => {}
        _ = tokio::time::sleep(RECV_ERROR_BACKOFF) => {}
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("local_addr", &self.local_addr)
            .field("parser", &self.parser)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
