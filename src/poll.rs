// Poll cycle: fan hosts out over a fixed worker pool, then sweep and
// rebuild the search indexes.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info, warn};
use sea_orm::DatabaseConnection;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

use crate::config::Config;
use crate::db::oui::OuiTable;
use crate::db::reconcile::{reconcile, ReconcileSummary};
use crate::db::sweep::{sweep, SweepSummary};
use crate::search::{self, ReverseLookup};
use crate::snmp::agent::Connector;
use crate::snmp::credentials::CredentialResolver;
use crate::snmp::poller;
use crate::topology::{self, idle::IdleTracker};

/// Everything a worker needs, shared by all workers of all cycles.
pub(crate) struct PollContext {
    pub(crate) db: DatabaseConnection,
    pub(crate) config: Config,
    resolver: CredentialResolver,
    oui: OuiTable,
    lookup: ReverseLookup,
}

impl PollContext {
    pub(crate) fn new(
        db: DatabaseConnection,
        config: Config,
        connector: Arc<dyn Connector>,
        oui: OuiTable,
        lookup: ReverseLookup,
    ) -> Self {
        let resolver = CredentialResolver::new(connector, &config.cache_directory);
        PollContext {
            db,
            config,
            resolver,
            oui,
            lookup,
        }
    }
}

#[derive(Debug)]
pub(crate) enum Outcome {
    Polled(ReconcileSummary),
    /// No credential authenticated.
    Skipped(String),
    Failed(String),
    /// A programming or configuration error; stops the process.
    Fatal(String),
}

#[derive(Debug, Default)]
pub(crate) struct CycleSummary {
    pub(crate) event: i32,
    pub(crate) attempted: usize,
    pub(crate) polled: usize,
    pub(crate) skipped: usize,
    pub(crate) failed: usize,
    /// Host and reason for every skipped or failed host.
    pub(crate) reasons: Vec<(String, String)>,
    pub(crate) swept: SweepSummary,
}

/// Resolve, collect, normalize and reconcile one host.
async fn poll_host(ctx: &PollContext, host: &str, event: i32, now: i64) -> Outcome {
    let Some(resolved) = ctx.resolver.resolve(host, &ctx.config.credentials).await else {
        return Outcome::Skipped("no credential group authenticated".to_string());
    };
    info!("{}: polling with credential group {}", host, resolved.profile.group);

    let snapshot = match poller::collect(&resolved.session).await {
        Ok(snapshot) => snapshot,
        Err(e) if e.is_fatal() => return Outcome::Fatal(e.to_string()),
        Err(e) => return Outcome::Failed(e.to_string()),
    };

    let mut idle = IdleTracker::load(&ctx.config.cache_directory, host).await;
    let canonical = match topology::normalize(&snapshot, now, &mut idle) {
        Ok(canonical) => canonical,
        Err(e) => return Outcome::Failed(e.to_string()),
    };
    if let Err(e) = idle.save().await {
        warn!("{}: {:#}", host, e);
    }

    match reconcile(&ctx.db, &ctx.oui, &canonical, event, now).await {
        Ok(summary) => Outcome::Polled(summary),
        Err(e) => Outcome::Failed(format!("database: {}", e)),
    }
}

/// Why a cycle stopped early.
#[derive(Debug, Error)]
pub(crate) enum CycleError {
    /// A device or query that can never be polled correctly; stops the
    /// process.
    #[error("{host}: {reason}")]
    Fatal { host: String, reason: String },
    /// The cycle could not run this time; the next interval tries again.
    #[error(transparent)]
    Operational(#[from] anyhow::Error),
}

/// Poll `host` on its own task so a panic costs one host, not the worker.
async fn poll_isolated(ctx: &Arc<PollContext>, host: &str, event: i32, now: i64) -> Outcome {
    let ctx = ctx.clone();
    let owned = host.to_string();
    let task = tokio::spawn(async move { poll_host(&ctx, &owned, event, now).await });
    match task.await {
        Ok(outcome) => outcome,
        Err(e) => Outcome::Failed(format!("poll task ended abnormally: {}", e)),
    }
}

async fn publish_indexes(ctx: &PollContext, workers: usize) -> Result<()> {
    let indexes = search::build(&ctx.db, workers, ctx.lookup.clone()).await?;
    search::write(&ctx.config.cache_directory, &indexes).await
}

/// One full cycle at time `now`.
///
/// Per-host failures, a failed sweep and failed index writes are logged and
/// recorded; only a fatal outcome or a cycle that cannot start returns an
/// error.
pub(crate) async fn run_cycle(ctx: Arc<PollContext>, now: i64) -> Result<CycleSummary, CycleError> {
    let hosts = ctx.config.hosts.clone();
    let event = crate::db::new_event(&ctx.db, now)
        .await
        .context("allocating cycle event")?
        .idx_event;
    let workers = ctx.config.workers().min(hosts.len()).max(1);
    info!(
        "cycle {}: polling {} hosts with {} workers",
        event,
        hosts.len(),
        workers
    );

    let (host_tx, host_rx) = mpsc::channel::<String>(hosts.len().max(1));
    for host in &hosts {
        host_tx.send(host.clone()).await.context("queueing hosts")?;
    }
    drop(host_tx);
    let host_rx = Arc::new(Mutex::new(host_rx));

    let (outcome_tx, mut outcome_rx) = mpsc::channel::<(String, Outcome)>(workers);
    let mut pool = JoinSet::new();
    for _ in 0..workers {
        let ctx = ctx.clone();
        let host_rx = host_rx.clone();
        let outcome_tx = outcome_tx.clone();
        pool.spawn(async move {
            loop {
                let next = host_rx.lock().await.recv().await;
                let Some(host) = next else {
                    break;
                };
                let outcome = poll_isolated(&ctx, &host, event, now).await;
                if outcome_tx.send((host, outcome)).await.is_err() {
                    break;
                }
            }
        });
    }
    drop(outcome_tx);

    let mut summary = CycleSummary {
        event,
        attempted: hosts.len(),
        ..Default::default()
    };
    let mut reported = HashSet::new();
    while let Some((host, outcome)) = outcome_rx.recv().await {
        reported.insert(host.clone());
        match outcome {
            Outcome::Polled(written) => {
                info!("{}: polled: {:?}", host, written);
                summary.polled += 1;
            }
            Outcome::Skipped(reason) => {
                warn!("{}: skipped: {}", host, reason);
                summary.skipped += 1;
                summary.reasons.push((host, reason));
            }
            Outcome::Failed(reason) => {
                error!("{}: failed: {}", host, reason);
                summary.failed += 1;
                summary.reasons.push((host, reason));
            }
            Outcome::Fatal(reason) => {
                error!("{}: fatal: {}", host, reason);
                pool.abort_all();
                return Err(CycleError::Fatal { host, reason });
            }
        }
    }
    while let Some(joined) = pool.join_next().await {
        if let Err(e) = joined {
            error!("cycle {}: poll worker ended abnormally: {}", event, e);
        }
    }
    for host in hosts.iter().filter(|host| !reported.contains(*host)) {
        let reason = "no outcome reported".to_string();
        error!("{}: failed: {}", host, reason);
        summary.failed += 1;
        summary.reasons.push((host.clone(), reason));
    }

    // Only after every host has finished.
    match sweep(&ctx.db, &hosts).await {
        Ok(swept) => summary.swept = swept,
        Err(e) => error!("cycle {}: sweep failed: {}", event, e),
    }
    if let Err(e) = publish_indexes(&ctx, workers).await {
        error!("cycle {}: search indexes not updated: {:#}", event, e);
    }

    info!(
        "cycle {} complete: {} attempted, {} polled, {} skipped, {} failed",
        event, summary.attempted, summary.polled, summary.skipped, summary.failed
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;
    use crate::config::v2c;
    use crate::db::test_connection;
    use crate::snmp::agent::fake::FakeConnector;
    use crate::snmp::poller::tests::access_switch;
    use sea_orm::*;
    use switchgrasp_entity::{device, l1interface};

    async fn context(connector: FakeConnector) -> (tempfile::TempDir, Arc<PollContext>) {
        let (dir, db) = test_connection().await;
        let config = Config {
            hosts: vec!["sw1".to_string(), "sw9".to_string()],
            credentials: vec![v2c("campus", "public")],
            threads: 4,
            cache_directory: dir.path().join("cache"),
            ..Default::default()
        };
        let oui = OuiTable::load(&db, None, None).await.unwrap();
        let lookup: ReverseLookup = Arc::new(|_: &IpAddr| None);
        let ctx = PollContext::new(db, config, Arc::new(connector), oui, lookup);
        (dir, Arc::new(ctx))
    }

    async fn ts_idle(db: &DatabaseConnection, ifindex: i32) -> i64 {
        l1interface::Entity::find()
            .filter(l1interface::Column::Ifindex.eq(ifindex))
            .one(db)
            .await
            .unwrap()
            .unwrap()
            .ts_idle
    }

    #[tokio::test]
    async fn idle_since_holds_across_cycles() {
        let mut connector = FakeConnector::default();
        connector.add("sw1", "campus", access_switch());
        let (dir, ctx) = context(connector).await;

        let first = run_cycle(ctx.clone(), 1_700_000_000).await.unwrap();
        assert_eq!(first.polled, 1);
        // sw9 never answers.
        assert_eq!(first.skipped, 1);
        assert_eq!(first.reasons[0].0, "sw9");
        assert_eq!(ts_idle(&ctx.db, 1).await, 0);
        assert_eq!(ts_idle(&ctx.db, 2).await, 1_700_000_000);

        let second = run_cycle(ctx.clone(), 1_700_000_100).await.unwrap();
        assert_eq!(second.polled, 1);
        assert_eq!(ts_idle(&ctx.db, 2).await, 1_700_000_000);
        assert_eq!(second.swept.total(), 0);

        let sw1 = device::Entity::find()
            .filter(device::Column::Hostname.eq("sw1"))
            .one(&ctx.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sw1.idx_event, second.event);
        assert_eq!(sw1.last_polled, 1_700_000_100);

        let search = dir.path().join("cache").join("search");
        assert!(search.join("arp.json").exists());
        assert!(search.join("ifindex.json").exists());
        assert!(dir.path().join("cache").join("idle").join("sw1.json").exists());
    }

    #[tokio::test]
    async fn unreachable_device_keeps_its_rows() {
        let mut connector = FakeConnector::default();
        connector.add("sw1", "campus", access_switch());
        let (_dir, ctx) = context(connector).await;
        run_cycle(ctx.clone(), 1_700_000_000).await.unwrap();

        // Same database and cache, but sw1 has gone quiet.
        let mut silent = access_switch();
        silent.unreachable = true;
        let mut connector = FakeConnector::default();
        connector.add("sw1", "campus", silent);
        let oui = OuiTable::load(&ctx.db, None, None).await.unwrap();
        let quiet = Arc::new(PollContext::new(
            ctx.db.clone(),
            ctx.config.clone(),
            Arc::new(connector),
            oui,
            Arc::new(|_: &IpAddr| None),
        ));

        let summary = run_cycle(quiet, 1_700_000_100).await.unwrap();
        assert_eq!(summary.polled, 0);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.swept.total(), 0);
        let enabled = l1interface::Entity::find()
            .filter(l1interface::Column::Enabled.eq(true))
            .count(&ctx.db)
            .await
            .unwrap();
        assert_eq!(enabled, 3);
    }

    #[tokio::test]
    async fn protocol_failure_stops_the_cycle() {
        let mut broken = access_switch();
        broken.broken_walks = true;
        let mut connector = FakeConnector::default();
        connector.add("sw1", "campus", broken);
        let (_dir, ctx) = context(connector).await;

        let err = run_cycle(ctx.clone(), 1_700_000_000).await.unwrap_err();
        match err {
            CycleError::Fatal { host, reason } => {
                assert_eq!(host, "sw1");
                assert!(reason.contains("malformed"), "{reason}");
            }
            other => panic!("expected a fatal error, got {other}"),
        }
        assert_eq!(device::Entity::find().count(&ctx.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failed_index_write_does_not_stop_the_cycle() {
        let mut connector = FakeConnector::default();
        connector.add("sw1", "campus", access_switch());
        let (dir, ctx) = context(connector).await;
        // A plain file where the search directory belongs.
        let cache = dir.path().join("cache");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join("search"), b"").unwrap();

        let summary = run_cycle(ctx.clone(), 1_700_000_000).await.unwrap();
        assert_eq!(summary.polled, 1);
        assert_eq!(ts_idle(&ctx.db, 2).await, 1_700_000_000);
        assert!(cache.join("search").is_file());

        let next = run_cycle(ctx.clone(), 1_700_000_100).await.unwrap();
        assert_eq!(next.polled, 1);
    }

    #[tokio::test]
    async fn panicking_host_is_reported_as_failed() {
        let mut exploding = access_switch();
        exploding.panics = true;
        let mut connector = FakeConnector::default();
        connector.add("sw1", "campus", exploding);
        let (_dir, ctx) = context(connector).await;

        let summary = run_cycle(ctx.clone(), 1_700_000_000).await.unwrap();
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.polled, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        let (host, reason) = summary
            .reasons
            .iter()
            .find(|(host, _)| host == "sw1")
            .unwrap();
        assert_eq!(host, "sw1");
        assert!(reason.contains("ended abnormally"), "{reason}");
    }
}
