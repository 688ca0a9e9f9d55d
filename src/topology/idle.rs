// Idle-since history per interface, persisted across restarts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::warn;

/// Merge a stored idle-since with a fresh observation.
///
/// 0 means "active". An active observation resets the port; otherwise the
/// earliest continuously-idle timestamp is kept.
pub(crate) fn merge_idle(previous: i64, observed: i64) -> i64 {
    if observed == 0 {
        0
    } else if previous == 0 {
        observed
    } else {
        previous.min(observed)
    }
}

/// ifIndex to idle-since for one host, stored as `<cache_dir>/idle/<host>.json`.
#[derive(Debug, Default)]
pub(crate) struct IdleTracker {
    path: Option<PathBuf>,
    previous: BTreeMap<i32, i64>,
    current: BTreeMap<i32, i64>,
}

impl IdleTracker {
    /// Tracker with no history that is never written to disk.
    #[cfg(test)]
    pub(crate) fn ephemeral() -> Self {
        IdleTracker::default()
    }

    pub(crate) async fn load(cache_dir: &Path, host: &str) -> Self {
        let path = cache_dir.join("idle").join(format!("{}.json", host.replace('/', "_")));
        let previous = match tokio::fs::read(&path).await {
            Ok(contents) => serde_json::from_slice(&contents).unwrap_or_else(|e| {
                warn!("{}: ignoring corrupt idle history {:?}: {}", host, path, e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        IdleTracker {
            path: Some(path),
            previous,
            current: BTreeMap::new(),
        }
    }

    /// Record one observation and return the merged idle-since.
    pub(crate) fn observe(&mut self, ifindex: i32, active: bool, now: i64) -> i64 {
        let observed = if active { 0 } else { now };
        let previous = self.previous.get(&ifindex).copied().unwrap_or(0);
        let since = merge_idle(previous, observed);
        self.current.insert(ifindex, since);
        since
    }

    /// Persist this cycle's observations, replacing the old history.
    pub(crate) async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {:?}", parent))?;
        }
        let contents = serde_json::to_vec(&self.current)?;
        tokio::fs::write(path, contents)
            .await
            .with_context(|| format!("writing {:?}", path))?;
        Ok(())
    }
}
