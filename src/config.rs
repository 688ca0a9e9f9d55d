// Runtime configuration, layered from defaults, switchgrasp.toml, the
// environment and command line flags.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Parser, Serialize)]
#[command(version, about = "Poll switches over SNMP and track their layer 2 topology")]
pub(crate) struct Cli {
    /// Path of the TOML configuration file
    #[arg(short, long, default_value = "switchgrasp.toml")]
    #[serde(skip)]
    pub(crate) config: PathBuf,

    /// Path and name of database
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<String>,

    /// Maximum number of hosts polled concurrently
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    threads: Option<usize>,

    /// One of error, warn, info, debug, trace
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    log_level: Option<String>,

    /// Run a single poll cycle and exit
    #[arg(long)]
    #[serde(skip)]
    pub(crate) once: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    /// Switches and routers to poll.
    pub(crate) hosts: Vec<String>,
    /// Candidate credentials, tried in order.
    pub(crate) credentials: Vec<CredentialProfile>,
    pub(crate) threads: usize,
    /// Seconds between the start of two poll cycles.
    pub(crate) polling_interval: u64,
    pub(crate) database: String,
    /// Holds credential caches, idle history and search indexes.
    pub(crate) cache_directory: PathBuf,
    pub(crate) oui_file: Option<PathBuf>,
    /// Registry downloaded to `oui_file` when that file is missing.
    pub(crate) oui_url: Option<String>,
    /// Per-request SNMP timeout in seconds.
    pub(crate) snmp_timeout: u64,
    pub(crate) snmp_retries: u32,
    pub(crate) log_level: String,
    pub(crate) log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hosts: Vec::new(),
            credentials: Vec::new(),
            threads: 10,
            polling_interval: 3600,
            database: "switchgrasp.db".to_string(),
            cache_directory: PathBuf::from("cache"),
            oui_file: None,
            oui_url: None,
            snmp_timeout: 5,
            snmp_retries: 1,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

/// One SNMP credential set, as listed under `[[credentials]]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CredentialProfile {
    /// Name written to the per-host credential cache.
    pub(crate) group: String,
    /// 2 (v2c) or 3 (USM).
    #[serde(default = "default_version")]
    pub(crate) version: u8,
    #[serde(default)]
    pub(crate) community: Option<String>,
    #[serde(default)]
    pub(crate) secname: Option<String>,
    #[serde(default = "default_port")]
    pub(crate) port: u16,
    #[serde(default)]
    pub(crate) authprotocol: Option<String>,
    #[serde(default)]
    pub(crate) authpassword: Option<String>,
    #[serde(default)]
    pub(crate) privprotocol: Option<String>,
    #[serde(default)]
    pub(crate) privpassword: Option<String>,
    #[serde(default = "default_enabled")]
    pub(crate) enabled: bool,
}

fn default_version() -> u8 {
    2
}

fn default_port() -> u16 {
    161
}

fn default_enabled() -> bool {
    true
}

impl Config {
    pub(crate) fn load(cli: &Cli) -> Result<Config> {
        let config = Figment::from(Serialized::defaults(Config::default()))
            // Start with toml configuration file.
            .merge(Toml::file(&cli.config))
            // Override with anything set in environment variables.
            .merge(Env::prefixed("SWITCHGRASP_"))
            // Override with anything set via flags.
            .merge(Serialized::defaults(cli))
            .extract()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a single poll.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.hosts.is_empty() {
            bail!("no hosts configured");
        }
        if !self.credentials.iter().any(|c| c.enabled) {
            bail!("no enabled SNMP credentials configured");
        }
        for credential in &self.credentials {
            match credential.version {
                2 if credential.community.is_none() => {
                    bail!("credential group {} has no community", credential.group)
                }
                3 if credential.secname.is_none() => {
                    bail!("credential group {} has no secname", credential.group)
                }
                2 | 3 => {}
                other => bail!(
                    "credential group {} has unsupported SNMP version {}",
                    credential.group,
                    other
                ),
            }
        }
        Ok(())
    }

    pub(crate) fn database_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.database)
    }

    /// Size of the host polling pool on this machine.
    pub(crate) fn workers(&self) -> usize {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        pool_size(self.threads, cores)
    }
}

/// `min(configured, cores - 1)`, never below one.
pub(crate) fn pool_size(configured: usize, cores: usize) -> usize {
    configured.min(cores.saturating_sub(1)).max(1)
}

#[cfg(test)]
pub(crate) fn v2c(group: &str, community: &str) -> CredentialProfile {
    CredentialProfile {
        group: group.to_string(),
        version: 2,
        community: Some(community.to_string()),
        secname: None,
        port: 161,
        authprotocol: None,
        authpassword: None,
        privprotocol: None,
        privpassword: None,
        enabled: true,
    }
}
