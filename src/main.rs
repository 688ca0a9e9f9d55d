use std::fs::OpenOptions;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use simplelog::{
    ColorChoice, CombinedLogger, LevelFilter, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};

mod config;
mod db;
mod poll;
mod search;
mod snmp;
mod topology;
mod utils;

use crate::config::{Cli, Config};
use crate::db::oui::OuiTable;
use crate::poll::{CycleError, PollContext};
use crate::search::ReverseLookup;
use crate::snmp::agent::UdpConnector;

fn init_logging(config: &Config) -> Result<()> {
    let level = LevelFilter::from_str(&config.log_level)
        .with_context(|| format!("invalid log_level {:?}", config.log_level))?;
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = &config.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening log file {:?}", path))?;
        loggers.push(WriteLogger::new(level, simplelog::Config::default(), file));
    }
    CombinedLogger::init(loggers)?;
    Ok(())
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let db = db::connection(&config.database_url()).await?;

    // Load the Oui database for MAC address lookups.
    let oui = OuiTable::load(&db, config.oui_file.as_deref(), config.oui_url.as_deref()).await?;

    let connector = Arc::new(UdpConnector::new(
        Duration::from_secs(config.snmp_timeout),
        config.snmp_retries,
    ));
    let lookup: ReverseLookup = Arc::new(utils::get_host_from_ip);
    let interval = Duration::from_secs(config.polling_interval.max(1));
    let ctx = Arc::new(PollContext::new(db, config, connector, oui, lookup));

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match poll::run_cycle(ctx.clone(), utils::timestamp_now()).await {
            Ok(summary) => {
                for (host, reason) in &summary.reasons {
                    info!("cycle {}: {}: {}", summary.event, host, reason);
                }
            }
            Err(e @ CycleError::Fatal { .. }) => return Err(e.into()),
            Err(e) if cli.once => return Err(e.into()),
            Err(e) => error!("poll cycle failed, retrying next interval: {:#}", e),
        }
        if cli.once {
            return Ok(());
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    }
    if let Err(e) = init_logging(&config) {
        eprintln!("Logging error: {:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli, config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
