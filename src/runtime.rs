//! Runtime — starts every configured listener and drains them to an output.
//!
//! Each listener gets its own task and a child of the shared shutdown token,
//! so cancelling that token stops all of them. Startup is all-or-nothing: if
//! any listener fails to bind, the ones already bound are dropped and the
//! bind error is returned.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use logdrop_core::config::ListenerConfig;
use logdrop_listener::{Listener, StatsSnapshot};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::output::OutputFormat;

/// Destination shared by all listener tasks.
pub type SharedWriter = Arc<Mutex<dyn Write + Send>>;

/// Final counters of one listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerSummary {
    pub local_addr: SocketAddr,
    pub stats: StatsSnapshot,
}

pub struct Runtime {
    listeners: Vec<Listener>,
    shutdown: CancellationToken,
}

impl Runtime {
    /// Bind every listener in `configs`.
    pub async fn start(configs: &[ListenerConfig], shutdown: CancellationToken) -> anyhow::Result<Self> {
        anyhow::ensure!(!configs.is_empty(), "no listeners configured");

        let mut listeners = Vec::with_capacity(configs.len());
        for config in configs {
            let listener = Listener::start_with_token(config, shutdown.child_token())
                .await
                .context("listener failed to start")?;
            listeners.push(listener);
        }

        info!("started {} listener(s)", listeners.len());
        Ok(Self { listeners, shutdown })
    }

    pub fn local_addrs(&self) -> Vec<SocketAddr> {
        self.listeners.iter().map(Listener::local_addr).collect()
    }

    /// Drain all listeners into `out` until the shutdown token is cancelled.
    ///
    /// A write failure on `out` means nobody is reading any more, so it
    /// cancels the shutdown token and stops every listener.
    pub async fn run(self, format: OutputFormat, out: SharedWriter) -> anyhow::Result<Vec<ListenerSummary>> {
        let mut tasks = Vec::with_capacity(self.listeners.len());

        for listener in self.listeners {
            let local_addr = listener.local_addr();
            let out = Arc::clone(&out);
            let shutdown = self.shutdown.clone();

            tasks.push(tokio::spawn(async move {
                let stats = listener
                    .run(|item| match item {
                        Ok(record) => {
                            if let Err(err) = write_record(&out, format, &record) {
                                error!(%local_addr, error = %err, "failed to write record, shutting down");
                                shutdown.cancel();
                            }
                        }
                        // Already logged and counted by the listener.
                        Err(_) => {}
                    })
                    .await;
                ListenerSummary { local_addr, stats }
            }));
        }

        let mut summaries = Vec::with_capacity(tasks.len());
        for task in tasks {
            summaries.push(task.await.context("listener task panicked")?);
        }
        Ok(summaries)
    }
}

fn write_record(
    out: &SharedWriter,
    format: OutputFormat,
    record: &logdrop_core::LogRecord,
) -> anyhow::Result<()> {
    let line = format.render(record)?;
    let mut out = match out.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    writeln!(out, "{line}")?;
    out.flush()?;
    Ok(())
}
