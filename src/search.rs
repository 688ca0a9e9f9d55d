// Search indexes rebuilt from the enabled topology after every cycle.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::Serialize;
use tokio::sync::Semaphore;

use switchgrasp_entity::{device, l1interface, mac, macip, macport};

/// Reverse DNS, `utils::get_host_from_ip` outside tests.
pub(crate) type ReverseLookup = Arc<dyn Fn(&IpAddr) -> Option<String> + Send + Sync>;

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct SearchIndexes {
    /// IP to MAC.
    pub(crate) arp: BTreeMap<String, String>,
    /// MAC to every IP it answered for.
    pub(crate) rarp: BTreeMap<String, Vec<String>>,
    /// ifAlias text to device hostname to ifIndexes.
    pub(crate) ifalias: BTreeMap<String, BTreeMap<String, Vec<i32>>>,
    /// MAC to device hostname to ifIndex to the MAC's IPs.
    pub(crate) ifindex: BTreeMap<String, BTreeMap<String, BTreeMap<i32, Vec<String>>>>,
    /// IP to reverse DNS name.
    pub(crate) hosts: BTreeMap<String, String>,
}

/// Resolve every address on a bounded pool of blocking lookups.
pub(crate) async fn resolve_hostnames(
    addresses: BTreeSet<String>,
    workers: usize,
    lookup: ReverseLookup,
) -> Result<BTreeMap<String, String>> {
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut handles = Vec::with_capacity(addresses.len());
    for address in addresses {
        let permit = semaphore.clone().acquire_owned().await?;
        let lookup = lookup.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let hostname = address.parse::<IpAddr>().ok().and_then(|ip| lookup(&ip));
            (address, hostname)
        }));
    }
    let mut hosts = BTreeMap::new();
    for handle in handles {
        if let (address, Some(hostname)) = handle.await? {
            hosts.insert(address, hostname);
        }
    }
    Ok(hosts)
}

/// Build every index from enabled rows, resolving hostnames on the way and
/// writing them back to `macip.hostname`.
pub(crate) async fn build(
    db: &DatabaseConnection,
    workers: usize,
    lookup: ReverseLookup,
) -> Result<SearchIndexes> {
    let devices: HashMap<i32, String> = device::Entity::find()
        .filter(device::Column::Enabled.eq(true))
        .all(db)
        .await?
        .into_iter()
        .map(|row| (row.idx_device, row.hostname))
        .collect();
    let ports: HashMap<i32, l1interface::Model> = l1interface::Entity::find()
        .filter(l1interface::Column::Enabled.eq(true))
        .all(db)
        .await?
        .into_iter()
        .map(|row| (row.idx_l1interface, row))
        .collect();
    let macs: HashMap<i32, String> = mac::Entity::find()
        .filter(mac::Column::Enabled.eq(true))
        .all(db)
        .await?
        .into_iter()
        .map(|row| (row.idx_mac, row.mac))
        .collect();
    let addresses = macip::Entity::find()
        .filter(macip::Column::Enabled.eq(true))
        .all(db)
        .await?;
    let learned = macport::Entity::find()
        .filter(macport::Column::Enabled.eq(true))
        .all(db)
        .await?;

    let mut indexes = SearchIndexes::default();

    for row in &addresses {
        let Some(mac) = macs.get(&row.idx_mac) else {
            continue;
        };
        indexes.arp.insert(row.address.clone(), mac.clone());
        let ips = indexes.rarp.entry(mac.clone()).or_default();
        if !ips.contains(&row.address) {
            ips.push(row.address.clone());
        }
    }
    for ips in indexes.rarp.values_mut() {
        ips.sort();
    }

    for port in ports.values() {
        let (Some(alias), Some(hostname)) = (port.ifalias.as_deref(), devices.get(&port.idx_device))
        else {
            continue;
        };
        if alias.is_empty() {
            continue;
        }
        let found = indexes
            .ifalias
            .entry(alias.to_string())
            .or_default()
            .entry(hostname.clone())
            .or_default();
        found.push(port.ifindex);
        found.sort_unstable();
    }

    for row in &learned {
        let (Some(mac), Some(port)) = (macs.get(&row.idx_mac), ports.get(&row.idx_l1interface)) else {
            continue;
        };
        let Some(hostname) = devices.get(&port.idx_device) else {
            continue;
        };
        let ips = indexes.rarp.get(mac).cloned().unwrap_or_default();
        indexes
            .ifindex
            .entry(mac.clone())
            .or_default()
            .entry(hostname.clone())
            .or_default()
            .insert(port.ifindex, ips);
    }

    let distinct: BTreeSet<String> = indexes.arp.keys().cloned().collect();
    debug!("resolving {} addresses", distinct.len());
    indexes.hosts = resolve_hostnames(distinct, workers, lookup).await?;
    for (address, hostname) in &indexes.hosts {
        macip::Entity::update_many()
            .col_expr(macip::Column::Hostname, Expr::value(hostname.clone()))
            .filter(macip::Column::Address.eq(address.as_str()))
            .filter(macip::Column::Enabled.eq(true))
            .exec(db)
            .await?;
    }

    info!(
        "search indexes: {} addresses, {} MACs, {} aliases, {} hostnames",
        indexes.arp.len(),
        indexes.rarp.len(),
        indexes.ifalias.len(),
        indexes.hosts.len()
    );
    Ok(indexes)
}

async fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> Result<()> {
    let path = dir.join(name);
    let staging = dir.join(format!(".{}.tmp", name));
    let contents = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(&staging, contents)
        .await
        .with_context(|| format!("writing {:?}", staging))?;
    tokio::fs::rename(&staging, &path)
        .await
        .with_context(|| format!("replacing {:?}", path))?;
    Ok(())
}

/// Replace the JSON files under `<cache_dir>/search/`.
pub(crate) async fn write(cache_dir: &Path, indexes: &SearchIndexes) -> Result<()> {
    let dir = cache_dir.join("search");
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("creating {:?}", dir))?;
    write_json(&dir, "arp.json", &indexes.arp).await?;
    write_json(&dir, "rarp.json", &indexes.rarp).await?;
    write_json(&dir, "ifalias.json", &indexes.ifalias).await?;
    write_json(&dir, "ifindex.json", &indexes.ifindex).await?;
    write_json(&dir, "hosts.json", &indexes.hosts).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::oui::OuiTable;
    use crate::db::reconcile::reconcile;
    use crate::db::reconcile::tests::{device, port};
    use crate::db::{new_event, test_connection};
    use crate::topology::snapshot::ArpEntry;

    fn fake_dns() -> ReverseLookup {
        Arc::new(|ip: &IpAddr| match ip.to_string().as_str() {
            "10.0.0.5" => Some("printer.example.com".to_string()),
            _ => None,
        })
    }

    #[tokio::test]
    async fn bounded_pool_resolves_every_address() {
        let addresses: BTreeSet<String> = ["10.0.0.5", "10.0.0.6", "not an ip"]
            .iter()
            .map(|a| String::from(*a))
            .collect();
        let hosts = resolve_hostnames(addresses, 2, fake_dns()).await.unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts["10.0.0.5"], "printer.example.com");
    }

    #[tokio::test]
    async fn indexes_cover_arp_rarp_alias_and_ifindex() {
        let (dir, db) = test_connection().await;
        let oui = OuiTable::load(&db, None, None).await.unwrap();
        let event = new_event(&db, 1000).await.unwrap().idx_event;

        let mut canonical = device("sw1", vec![port(1, 0), port(2, 0)]);
        canonical.interfaces[0].ifalias = Some("printer".to_string());
        canonical.arp.push(ArpEntry {
            address: "10.0.0.5".parse().unwrap(),
            mac: "001122334455".to_string(),
        });
        reconcile(&db, &oui, &canonical, event, 1000).await.unwrap();

        let indexes = build(&db, 4, fake_dns()).await.unwrap();
        assert_eq!(indexes.arp["10.0.0.5"], "001122334455");
        assert_eq!(
            indexes.rarp["001122334455"],
            vec![
                "10.0.0.5".to_string(),
                "2001:0db8:0000:0000:0000:0000:0000:0005".to_string()
            ]
        );
        assert_eq!(indexes.ifalias["printer"]["sw1"], vec![1]);
        assert_eq!(indexes.ifindex["001122334455"]["sw1"][&1].len(), 2);
        assert_eq!(indexes.hosts["10.0.0.5"], "printer.example.com");

        let row = macip::Entity::find()
            .filter(macip::Column::Address.eq("10.0.0.5"))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.hostname.as_deref(), Some("printer.example.com"));

        write(dir.path(), &indexes).await.unwrap();
        let arp: BTreeMap<String, String> = serde_json::from_slice(
            &std::fs::read(dir.path().join("search").join("arp.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(arp, indexes.arp);
    }
}
