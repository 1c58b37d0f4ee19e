use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use logdrop::config::{Config, ListenerOverrides};
use logdrop::{OutputFormat, Runtime, SharedWriter};
use logdrop_core::SeverityPolicy;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "logdrop", about = "Receive JSON log records over UDP and print them")]
struct Cli {
    /// Config file (TOML, YAML or JSON, by extension).
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// UDP port to listen on. Replaces any listeners from the config file.
    #[arg(long, short)]
    port: Option<u16>,

    /// Interface to bind together with --port.
    #[arg(long, requires = "port")]
    bind: Option<IpAddr>,

    /// Reject datagrams larger than this many bytes (applies to every listener).
    #[arg(long)]
    max_datagram_size: Option<usize>,

    /// `reject`, or a level to use for unknown severities (applies to every listener).
    #[arg(long)]
    unknown_severity: Option<SeverityPolicy>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Log at debug level regardless of config and RUST_LOG.
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn overrides(&self) -> ListenerOverrides {
        ListenerOverrides {
            port: self.port,
            bind_address: self.bind,
            max_datagram_size: self.max_datagram_size,
            unknown_severity: self.unknown_severity,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::defaults(),
    };

    init_logging(&cli, &config);

    let listeners = config.resolve_listeners(&cli.overrides())?;
    let shutdown = CancellationToken::new();
    let runtime = Runtime::start(&listeners, shutdown.clone()).await?;

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            wait_for_signal().await;
            shutdown.cancel();
        }
    });

    let out: SharedWriter = Arc::new(Mutex::new(std::io::stdout()));
    let summaries = runtime.run(cli.format, out).await?;

    for summary in summaries {
        info!(local_addr = %summary.local_addr, "{}", summary.stats);
    }
    info!("logdrop stopped");
    Ok(())
}

fn init_logging(cli: &Cli, config: &Config) {
    let filter = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level))
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("failed to register SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("caught SIGINT, shutting down"),
        () = terminate => info!("caught SIGTERM, shutting down"),
    }
}
