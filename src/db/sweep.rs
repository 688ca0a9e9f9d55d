// Disable rows that their device's last successful generation did not
// confirm.

use log::info;
use sea_orm::sea_query::{Expr, Query, SelectStatement};
use sea_orm::*;

use switchgrasp_entity::{device, l1interface, mac, macip, macport, vlan, vlanport};

/// Rows disabled per entity by one sweep.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SweepSummary {
    pub(crate) devices: u64,
    pub(crate) l1interfaces: u64,
    pub(crate) vlans: u64,
    pub(crate) vlanports: u64,
    pub(crate) macports: u64,
    pub(crate) macips: u64,
    pub(crate) macs: u64,
}

impl SweepSummary {
    pub(crate) fn total(&self) -> u64 {
        self.devices
            + self.l1interfaces
            + self.vlans
            + self.vlanports
            + self.macports
            + self.macips
            + self.macs
    }
}

fn ports_of(idx_device: i32) -> SelectStatement {
    Query::select()
        .column(l1interface::Column::IdxL1interface)
        .from(l1interface::Entity)
        .and_where(l1interface::Column::IdxDevice.eq(idx_device))
        .to_owned()
}

/// Stale-row condition for one device: everything when the device itself is
/// retired, otherwise rows from an older generation than its last success.
/// Rows newer than that success come from an interrupted reconcile and are
/// kept.
fn stale<C: ColumnTrait>(column: C, current: Option<i32>) -> Condition {
    match current {
        Some(event) => Condition::all().add(column.lt(event)),
        None => Condition::all(),
    }
}

/// Run the sweep for every device. Only the configured `hosts` stay enabled.
///
/// Must run after every device of the cycle has been reconciled. Only rows
/// that are still enabled are touched, so a second run changes nothing.
pub(crate) async fn sweep(db: &DatabaseConnection, hosts: &[String]) -> Result<SweepSummary, DbErr> {
    let mut summary = SweepSummary::default();

    summary.devices = device::Entity::update_many()
        .col_expr(device::Column::Enabled, Expr::value(false))
        .filter(device::Column::Enabled.eq(true))
        .filter(device::Column::Hostname.is_not_in(hosts.iter().map(String::as_str)))
        .exec(db)
        .await?
        .rows_affected;

    for row in device::Entity::find().all(db).await? {
        let current = row.enabled.then_some(row.idx_event);

        summary.l1interfaces += l1interface::Entity::update_many()
            .col_expr(l1interface::Column::Enabled, Expr::value(false))
            .filter(l1interface::Column::Enabled.eq(true))
            .filter(l1interface::Column::IdxDevice.eq(row.idx_device))
            .filter(stale(l1interface::Column::IdxEvent, current))
            .exec(db)
            .await?
            .rows_affected;

        summary.vlans += vlan::Entity::update_many()
            .col_expr(vlan::Column::Enabled, Expr::value(false))
            .filter(vlan::Column::Enabled.eq(true))
            .filter(vlan::Column::IdxDevice.eq(row.idx_device))
            .filter(stale(vlan::Column::IdxEvent, current))
            .exec(db)
            .await?
            .rows_affected;

        summary.vlanports += vlanport::Entity::update_many()
            .col_expr(vlanport::Column::Enabled, Expr::value(false))
            .filter(vlanport::Column::Enabled.eq(true))
            .filter(vlanport::Column::IdxL1interface.in_subquery(ports_of(row.idx_device)))
            .filter(stale(vlanport::Column::IdxEvent, current))
            .exec(db)
            .await?
            .rows_affected;

        summary.macports += macport::Entity::update_many()
            .col_expr(macport::Column::Enabled, Expr::value(false))
            .filter(macport::Column::Enabled.eq(true))
            .filter(macport::Column::IdxL1interface.in_subquery(ports_of(row.idx_device)))
            .filter(stale(macport::Column::IdxEvent, current))
            .exec(db)
            .await?
            .rows_affected;

        summary.macips += macip::Entity::update_many()
            .col_expr(macip::Column::Enabled, Expr::value(false))
            .filter(macip::Column::Enabled.eq(true))
            .filter(macip::Column::IdxDevice.eq(row.idx_device))
            .filter(stale(macip::Column::IdxEvent, current))
            .exec(db)
            .await?
            .rows_affected;
    }

    // A MAC lives as long as some enabled port or address references it.
    summary.macs = mac::Entity::update_many()
        .col_expr(mac::Column::Enabled, Expr::value(false))
        .filter(mac::Column::Enabled.eq(true))
        .filter(
            mac::Column::IdxMac.not_in_subquery(
                Query::select()
                    .column(macport::Column::IdxMac)
                    .from(macport::Entity)
                    .and_where(macport::Column::Enabled.eq(true))
                    .to_owned(),
            ),
        )
        .filter(
            mac::Column::IdxMac.not_in_subquery(
                Query::select()
                    .column(macip::Column::IdxMac)
                    .from(macip::Entity)
                    .and_where(macip::Column::Enabled.eq(true))
                    .to_owned(),
            ),
        )
        .exec(db)
        .await?
        .rows_affected;

    info!("sweep disabled {} rows: {:?}", summary.total(), summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::oui::OuiTable;
    use crate::db::reconcile::reconcile;
    use crate::db::reconcile::tests::{device, port};
    use crate::db::{new_event, test_connection};

    fn hosts(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| String::from(*n)).collect()
    }

    async fn enabled_ports(db: &DatabaseConnection, hostname: &str) -> Vec<i32> {
        let owner = device::Entity::find()
            .filter(device::Column::Hostname.eq(hostname))
            .one(db)
            .await
            .unwrap()
            .unwrap();
        let mut ports: Vec<i32> = l1interface::Entity::find()
            .filter(l1interface::Column::IdxDevice.eq(owner.idx_device))
            .filter(l1interface::Column::Enabled.eq(true))
            .all(db)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.ifindex)
            .collect();
        ports.sort();
        ports
    }

    #[tokio::test]
    async fn vanished_rows_are_disabled_once() {
        let (_dir, db) = test_connection().await;
        let oui = OuiTable::load(&db, None, None).await.unwrap();

        let first = new_event(&db, 1000).await.unwrap().idx_event;
        reconcile(&db, &oui, &device("sw1", vec![port(1, 0), port(2, 0)]), first, 1000)
            .await
            .unwrap();
        let summary = sweep(&db, &hosts(&["sw1"])).await.unwrap();
        assert_eq!(summary.total(), 0);

        let second = new_event(&db, 1100).await.unwrap().idx_event;
        let mut canonical = device("sw1", vec![port(2, 0)]);
        canonical.mac_ports.clear();
        canonical.arp.clear();
        reconcile(&db, &oui, &canonical, second, 1100).await.unwrap();

        let summary = sweep(&db, &hosts(&["sw1"])).await.unwrap();
        assert_eq!(summary.l1interfaces, 1);
        assert_eq!(summary.vlanports, 1);
        assert_eq!(summary.macports, 1);
        assert_eq!(summary.macips, 1);
        assert_eq!(summary.macs, 1);
        assert_eq!(summary.vlans, 0);
        assert_eq!(enabled_ports(&db, "sw1").await, vec![2]);

        let again = sweep(&db, &hosts(&["sw1"])).await.unwrap();
        assert_eq!(again, SweepSummary::default());
    }

    #[tokio::test]
    async fn interrupted_reconcile_keeps_reconfirmed_rows() {
        let (_dir, db) = test_connection().await;
        let oui = OuiTable::load(&db, None, None).await.unwrap();

        let first = new_event(&db, 1000).await.unwrap().idx_event;
        reconcile(&db, &oui, &device("sw1", vec![port(1, 0), port(2, 0)]), first, 1000)
            .await
            .unwrap();

        // Port 2 is gone, and the write stops right after the interface step.
        let second = new_event(&db, 1100).await.unwrap().idx_event;
        let canonical = device("sw1", vec![port(1, 0)]);
        db.execute_unprepared("ALTER TABLE vlan RENAME TO vlan_offline")
            .await
            .unwrap();
        assert!(reconcile(&db, &oui, &canonical, second, 1100).await.is_err());
        db.execute_unprepared("ALTER TABLE vlan_offline RENAME TO vlan")
            .await
            .unwrap();

        let owner = device::Entity::find()
            .filter(device::Column::Hostname.eq("sw1"))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(owner.idx_event, first);
        let port1 = l1interface::Entity::find()
            .filter(l1interface::Column::IdxDevice.eq(owner.idx_device))
            .filter(l1interface::Column::Ifindex.eq(1))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(port1.idx_event, second);

        let summary = sweep(&db, &hosts(&["sw1"])).await.unwrap();
        assert_eq!(summary.total(), 0);
        assert_eq!(enabled_ports(&db, "sw1").await, vec![1, 2]);

        // The next complete generation retires port 2.
        let third = new_event(&db, 1200).await.unwrap().idx_event;
        reconcile(&db, &oui, &canonical, third, 1200).await.unwrap();
        let summary = sweep(&db, &hosts(&["sw1"])).await.unwrap();
        assert_eq!(summary.l1interfaces, 1);
        assert_eq!(enabled_ports(&db, "sw1").await, vec![1]);
    }

    #[tokio::test]
    async fn a_failed_poll_keeps_the_device_rows() {
        let (_dir, db) = test_connection().await;
        let oui = OuiTable::load(&db, None, None).await.unwrap();

        let first = new_event(&db, 1000).await.unwrap().idx_event;
        for host in ["sw1", "sw2"] {
            reconcile(&db, &oui, &device(host, vec![port(1, 0)]), first, 1000)
                .await
                .unwrap();
        }

        // sw2 is unreachable in the second cycle.
        let second = new_event(&db, 1100).await.unwrap().idx_event;
        reconcile(&db, &oui, &device("sw1", vec![port(1, 0)]), second, 1100)
            .await
            .unwrap();
        let summary = sweep(&db, &hosts(&["sw1", "sw2"])).await.unwrap();
        assert_eq!(summary.total(), 0);
        assert_eq!(enabled_ports(&db, "sw2").await, vec![1]);
    }

    #[tokio::test]
    async fn removed_hosts_are_retired_with_their_rows() {
        let (_dir, db) = test_connection().await;
        let oui = OuiTable::load(&db, None, None).await.unwrap();

        let first = new_event(&db, 1000).await.unwrap().idx_event;
        for host in ["sw1", "sw2"] {
            reconcile(&db, &oui, &device(host, vec![port(1, 0)]), first, 1000)
                .await
                .unwrap();
        }

        let summary = sweep(&db, &hosts(&["sw1"])).await.unwrap();
        assert_eq!(summary.devices, 1);
        assert_eq!(summary.l1interfaces, 1);
        assert_eq!(summary.vlans, 1);
        // The MAC is still seen on sw1.
        assert_eq!(summary.macs, 0);
        assert!(enabled_ports(&db, "sw2").await.is_empty());
        assert_eq!(enabled_ports(&db, "sw1").await, vec![1]);

        assert_eq!(sweep(&db, &hosts(&["sw1"])).await.unwrap().total(), 0);
    }
}
