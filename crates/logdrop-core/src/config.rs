//! Configuration types for logdrop.
//!
//! [`Config::load`] layers an optional user file (TOML, YAML or JSON, picked
//! by extension) on top of the built-in defaults. [`Config::defaults`] returns
//! the defaults alone without touching the filesystem (useful in tests).

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::Deserialize;

use crate::parser::{DatagramParser, SeverityPolicy};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[logging]
level = "info"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    /// One entry per `[[listener]]` table.
    #[serde(default, rename = "listener")]
    pub listeners: Vec<ListenerConfig>,
}

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// `[[listener]]` section: one UDP endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListenerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,
    /// No default. `0` asks the OS for an ephemeral port.
    pub port: u16,
    /// Datagrams longer than this are rejected before parsing.
    #[serde(default)]
    pub max_datagram_size: Option<usize>,
    #[serde(default)]
    pub unknown_severity: SeverityPolicy,
}

fn default_bind_address() -> IpAddr { IpAddr::V4(Ipv4Addr::UNSPECIFIED) }

impl ListenerConfig {
    /// A listener on `0.0.0.0:port` with default limits and policy.
    pub fn new(port: u16) -> Self {
        Self {
            bind_address: default_bind_address(),
            port,
            max_datagram_size: None,
            unknown_severity: SeverityPolicy::default(),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Parser configured with this listener's size cap and severity policy.
    pub fn parser(&self) -> DatagramParser {
        DatagramParser::new()
            .with_max_datagram_size(self.max_datagram_size)
            .with_severity_policy(self.unknown_severity)
    }
}

/// Command-line adjustments applied on top of the loaded listeners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOverrides {
    /// Replaces every configured listener with a single one on this port.
    pub port: Option<u16>,
    /// Bind address for the listener created from `port`.
    pub bind_address: Option<IpAddr>,
    pub max_datagram_size: Option<usize>,
    pub unknown_severity: Option<SeverityPolicy>,
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load `path` layered on top of the built-in defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let cfg: Config = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        Self {
            logging: LoggingConfig::default(),
            listeners: Vec::new(),
        }
    }

    /// The listeners to start: one from `overrides.port` if set, otherwise
    /// the configured ones, with the size cap and severity policy overrides
    /// applied to each. The result is validated and never empty.
    pub fn resolve_listeners(&self, overrides: &ListenerOverrides) -> anyhow::Result<Vec<ListenerConfig>> {
        let mut listeners = match overrides.port {
            Some(port) => {
                let mut listener = ListenerConfig::new(port);
                if let Some(bind_address) = overrides.bind_address {
                    listener.bind_address = bind_address;
                }
                vec![listener]
            }
            None => self.listeners.clone(),
        };

        anyhow::ensure!(
            !listeners.is_empty(),
            "no listeners configured: pass --port or a config file with a [[listener]] table"
        );

        for listener in &mut listeners {
            if let Some(limit) = overrides.max_datagram_size {
                listener.max_datagram_size = Some(limit);
            }
            if let Some(policy) = overrides.unknown_severity {
                listener.unknown_severity = policy;
            }
        }

        let resolved = Config {
            logging: self.logging.clone(),
            listeners,
        };
        resolved.validate()?;
        Ok(resolved.listeners)
    }

    /// Reject configurations that could never run.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for listener in &self.listeners {
            anyhow::ensure!(
                listener.max_datagram_size != Some(0),
                "listener {}: max_datagram_size must be greater than zero",
                listener.socket_addr()
            );
            if listener.port != 0 {
                anyhow::ensure!(
                    seen.insert(listener.socket_addr()),
                    "listener {} is configured more than once",
                    listener.socket_addr()
                );
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
