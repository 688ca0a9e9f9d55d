// Upsert one device's canonical records under a generation id.

use std::collections::{BTreeSet, HashMap};
use std::net::IpAddr;

use log::{debug, error};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;

use switchgrasp_entity::{device, l1interface, mac, macip, macport, vlan, vlanport, DEFAULT_ZONE};

use crate::db::oui::OuiTable;
use crate::db::{naive_now, retry_once};
use crate::topology::idle::merge_idle;
use crate::topology::{CanonicalDevice, CanonicalInterface};
use crate::utils;

const LOOKUP_CHUNK: usize = 500;

/// Rows written for one device, plus entity-level write failures.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ReconcileSummary {
    pub(crate) interfaces: usize,
    pub(crate) vlans: usize,
    pub(crate) vlanports: usize,
    pub(crate) macs: usize,
    pub(crate) macips: usize,
    pub(crate) macports: usize,
    pub(crate) failures: usize,
}

/// Write `device` into the store under generation `event`.
///
/// The device row is mandatory; an error there aborts the device. Any other
/// entity that still fails after one retry is logged with its natural key
/// and skipped. The device's own `idx_event` only moves to `event` once
/// everything else is written.
pub(crate) async fn reconcile(
    db: &DatabaseConnection,
    oui: &OuiTable,
    device: &CanonicalDevice,
    event: i32,
    now: i64,
) -> Result<ReconcileSummary, DbErr> {
    let mut summary = ReconcileSummary::default();
    let host = device.hostname.as_str();

    let row = retry_once(|| upsert_device(db, device, event, now)).await?;
    let idx_device = row.idx_device;

    let stored_idle: HashMap<i32, i64> = l1interface::Entity::find()
        .filter(l1interface::Column::IdxDevice.eq(idx_device))
        .filter(l1interface::Column::Enabled.eq(true))
        .all(db)
        .await?
        .into_iter()
        .map(|port| (port.ifindex, port.ts_idle))
        .collect();
    for interface in &device.interfaces {
        let previous = stored_idle.get(&interface.ifindex).copied().unwrap_or(0);
        let ts_idle = merge_idle(previous, interface.ts_idle);
        match retry_once(|| upsert_interface(db, idx_device, interface, ts_idle, event)).await {
            Ok(_) => summary.interfaces += 1,
            Err(e) => {
                error!("{}: l1interface ifindex={}: {}", host, interface.ifindex, e);
                summary.failures += 1;
            }
        }
    }
    let ports: HashMap<i32, i32> = l1interface::Entity::find()
        .filter(l1interface::Column::IdxDevice.eq(idx_device))
        .all(db)
        .await?
        .into_iter()
        .map(|port| (port.ifindex, port.idx_l1interface))
        .collect();

    for (number, info) in &device.vlans {
        match retry_once(|| upsert_vlan(db, idx_device, *number, info.name.clone(), info.state, event)).await {
            Ok(_) => summary.vlans += 1,
            Err(e) => {
                error!("{}: vlan vlan={}: {}", host, number, e);
                summary.failures += 1;
            }
        }
    }
    let vlans: HashMap<i32, i32> = vlan::Entity::find()
        .filter(vlan::Column::IdxDevice.eq(idx_device))
        .all(db)
        .await?
        .into_iter()
        .map(|row| (row.vlan, row.idx_vlan))
        .collect();

    for interface in &device.interfaces {
        let Some(&idx_l1interface) = ports.get(&interface.ifindex) else {
            continue;
        };
        for number in &interface.vlans {
            let Some(&idx_vlan) = vlans.get(number) else {
                continue;
            };
            match retry_once(|| upsert_vlanport(db, idx_l1interface, idx_vlan, event)).await {
                Ok(_) => summary.vlanports += 1,
                Err(e) => {
                    error!(
                        "{}: vlanport ifindex={} vlan={}: {}",
                        host, interface.ifindex, number, e
                    );
                    summary.failures += 1;
                }
            }
        }
    }

    let addresses = device.macs();
    for address in &addresses {
        let idx_oui = oui.lookup(db, address).await;
        match retry_once(|| upsert_mac(db, address, idx_oui, event)).await {
            Ok(_) => summary.macs += 1,
            Err(e) => {
                error!("{}: mac mac={}: {}", host, address, e);
                summary.failures += 1;
            }
        }
    }
    let macs = mac_ids(db, &addresses).await?;

    for entry in &device.arp {
        let Some(&idx_mac) = macs.get(&entry.mac) else {
            continue;
        };
        let address = utils::ip_to_string(&entry.address);
        let version = match entry.address {
            IpAddr::V4(_) => 4,
            IpAddr::V6(_) => 6,
        };
        match retry_once(|| upsert_macip(db, idx_device, idx_mac, &address, version, event)).await {
            Ok(_) => summary.macips += 1,
            Err(e) => {
                error!("{}: macip mac={} address={}: {}", host, entry.mac, address, e);
                summary.failures += 1;
            }
        }
    }

    for (ifindex, learned) in &device.mac_ports {
        let Some(&idx_l1interface) = ports.get(ifindex) else {
            continue;
        };
        for address in learned {
            let Some(&idx_mac) = macs.get(address) else {
                continue;
            };
            match retry_once(|| upsert_macport(db, idx_l1interface, idx_mac, event)).await {
                Ok(_) => summary.macports += 1,
                Err(e) => {
                    error!("{}: macport ifindex={} mac={}: {}", host, ifindex, address, e);
                    summary.failures += 1;
                }
            }
        }
    }

    retry_once(|| mark_reconciled(db, idx_device, event)).await?;
    debug!("{}: reconciled under event {}: {:?}", host, event, summary);
    Ok(summary)
}

async fn upsert_device(
    db: &DatabaseConnection,
    device: &CanonicalDevice,
    event: i32,
    now: i64,
) -> Result<device::Model, DbErr> {
    let row = device::ActiveModel {
        idx_zone: Set(DEFAULT_ZONE),
        // Only used for a first insert; an existing device keeps its last
        // successful generation until mark_reconciled.
        idx_event: Set(event),
        hostname: Set(device.hostname.clone()),
        sys_name: Set(device.sys_name.clone()),
        sys_description: Set(Some(device.sys_description.clone())),
        sys_objectid: Set(Some(device.sys_objectid.clone())),
        sys_uptime: Set(device.sys_uptime),
        last_polled: Set(now),
        enabled: Set(true),
        ts_modified: Set(naive_now()),
        ..Default::default()
    };
    device::Entity::insert(row)
        .on_conflict(
            OnConflict::column(device::Column::Hostname)
                .update_columns([
                    device::Column::SysName,
                    device::Column::SysDescription,
                    device::Column::SysObjectid,
                    device::Column::SysUptime,
                    device::Column::LastPolled,
                    device::Column::Enabled,
                    device::Column::TsModified,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;
    device::Entity::find()
        .filter(device::Column::Hostname.eq(device.hostname.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("device {}", device.hostname)))
}

async fn upsert_interface(
    db: &DatabaseConnection,
    idx_device: i32,
    interface: &CanonicalInterface,
    ts_idle: i64,
    event: i32,
) -> Result<(), DbErr> {
    let neighbors = &interface.neighbors;
    let row = l1interface::ActiveModel {
        idx_device: Set(idx_device),
        idx_event: Set(event),
        ifindex: Set(interface.ifindex),
        duplex: Set(interface.duplex),
        ethernet: Set(interface.ethernet),
        nativevlan: Set(interface.nativevlan),
        trunk: Set(interface.trunk),
        ifspeed: Set(interface.ifspeed),
        iftype: Set(interface.iftype),
        ifalias: Set(interface.ifalias.clone()),
        ifname: Set(interface.ifname.clone()),
        ifdescription: Set(interface.ifdescription.clone()),
        ifadminstatus: Set(interface.ifadminstatus),
        ifoperstatus: Set(interface.ifoperstatus),
        ts_idle: Set(ts_idle),
        cdpcachedeviceid: Set(neighbors.cdp_device_id.clone()),
        cdpcachedeviceport: Set(neighbors.cdp_device_port.clone()),
        cdpcacheplatform: Set(neighbors.cdp_platform.clone()),
        lldpremportdesc: Set(neighbors.lldp_port_desc.clone()),
        lldpremsysdesc: Set(neighbors.lldp_sys_desc.clone()),
        lldpremsysname: Set(neighbors.lldp_sys_name.clone()),
        lldpremchassisid: Set(neighbors.lldp_chassis_id.clone()),
        enabled: Set(true),
        ts_modified: Set(naive_now()),
        ..Default::default()
    };
    l1interface::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([l1interface::Column::IdxDevice, l1interface::Column::Ifindex])
                .update_columns([
                    l1interface::Column::IdxEvent,
                    l1interface::Column::Duplex,
                    l1interface::Column::Ethernet,
                    l1interface::Column::Nativevlan,
                    l1interface::Column::Trunk,
                    l1interface::Column::Ifspeed,
                    l1interface::Column::Iftype,
                    l1interface::Column::Ifalias,
                    l1interface::Column::Ifname,
                    l1interface::Column::Ifdescription,
                    l1interface::Column::Ifadminstatus,
                    l1interface::Column::Ifoperstatus,
                    l1interface::Column::TsIdle,
                    l1interface::Column::Cdpcachedeviceid,
                    l1interface::Column::Cdpcachedeviceport,
                    l1interface::Column::Cdpcacheplatform,
                    l1interface::Column::Lldpremportdesc,
                    l1interface::Column::Lldpremsysdesc,
                    l1interface::Column::Lldpremsysname,
                    l1interface::Column::Lldpremchassisid,
                    l1interface::Column::Enabled,
                    l1interface::Column::TsModified,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;
    Ok(())
}

async fn upsert_vlan(
    db: &DatabaseConnection,
    idx_device: i32,
    number: i32,
    name: Option<String>,
    state: i32,
    event: i32,
) -> Result<(), DbErr> {
    let row = vlan::ActiveModel {
        idx_device: Set(idx_device),
        idx_event: Set(event),
        vlan: Set(number),
        name: Set(name),
        state: Set(state),
        enabled: Set(true),
        ts_modified: Set(naive_now()),
        ..Default::default()
    };
    vlan::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([vlan::Column::IdxDevice, vlan::Column::Vlan])
                .update_columns([
                    vlan::Column::IdxEvent,
                    vlan::Column::Name,
                    vlan::Column::State,
                    vlan::Column::Enabled,
                    vlan::Column::TsModified,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;
    Ok(())
}

async fn upsert_vlanport(
    db: &DatabaseConnection,
    idx_l1interface: i32,
    idx_vlan: i32,
    event: i32,
) -> Result<(), DbErr> {
    let row = vlanport::ActiveModel {
        idx_l1interface: Set(idx_l1interface),
        idx_vlan: Set(idx_vlan),
        idx_event: Set(event),
        enabled: Set(true),
        ts_modified: Set(naive_now()),
        ..Default::default()
    };
    vlanport::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([vlanport::Column::IdxL1interface, vlanport::Column::IdxVlan])
                .update_columns([
                    vlanport::Column::IdxEvent,
                    vlanport::Column::Enabled,
                    vlanport::Column::TsModified,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;
    Ok(())
}

async fn upsert_mac(
    db: &DatabaseConnection,
    address: &str,
    idx_oui: i32,
    event: i32,
) -> Result<(), DbErr> {
    let row = mac::ActiveModel {
        idx_oui: Set(idx_oui),
        idx_event: Set(event),
        mac: Set(address.to_string()),
        enabled: Set(true),
        ts_modified: Set(naive_now()),
        ..Default::default()
    };
    mac::Entity::insert(row)
        .on_conflict(
            OnConflict::column(mac::Column::Mac)
                .update_columns([
                    mac::Column::IdxOui,
                    mac::Column::IdxEvent,
                    mac::Column::Enabled,
                    mac::Column::TsModified,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;
    Ok(())
}

async fn mac_ids(
    db: &DatabaseConnection,
    addresses: &BTreeSet<String>,
) -> Result<HashMap<String, i32>, DbErr> {
    let addresses: Vec<&String> = addresses.iter().collect();
    let mut ids = HashMap::new();
    for chunk in addresses.chunks(LOOKUP_CHUNK) {
        let rows = mac::Entity::find()
            .filter(mac::Column::Mac.is_in(chunk.iter().map(|a| a.as_str())))
            .all(db)
            .await?;
        ids.extend(rows.into_iter().map(|row| (row.mac, row.idx_mac)));
    }
    Ok(ids)
}

async fn upsert_macip(
    db: &DatabaseConnection,
    idx_device: i32,
    idx_mac: i32,
    address: &str,
    version: i32,
    event: i32,
) -> Result<(), DbErr> {
    let row = macip::ActiveModel {
        idx_device: Set(idx_device),
        idx_mac: Set(idx_mac),
        idx_event: Set(event),
        address: Set(address.to_string()),
        version: Set(version),
        enabled: Set(true),
        ts_modified: Set(naive_now()),
        ..Default::default()
    };
    // Hostnames belong to the DNS pass and are left alone here.
    macip::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                macip::Column::IdxDevice,
                macip::Column::IdxMac,
                macip::Column::Address,
            ])
            .update_columns([
                macip::Column::IdxEvent,
                macip::Column::Version,
                macip::Column::Enabled,
                macip::Column::TsModified,
            ])
            .to_owned(),
        )
        .exec(db)
        .await?;
    Ok(())
}

async fn upsert_macport(
    db: &DatabaseConnection,
    idx_l1interface: i32,
    idx_mac: i32,
    event: i32,
) -> Result<(), DbErr> {
    let row = macport::ActiveModel {
        idx_l1interface: Set(idx_l1interface),
        idx_mac: Set(idx_mac),
        idx_event: Set(event),
        enabled: Set(true),
        ts_modified: Set(naive_now()),
        ..Default::default()
    };
    macport::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([macport::Column::IdxL1interface, macport::Column::IdxMac])
                .update_columns([
                    macport::Column::IdxEvent,
                    macport::Column::Enabled,
                    macport::Column::TsModified,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;
    Ok(())
}

/// Record `event` as the device's last successful generation.
async fn mark_reconciled(db: &DatabaseConnection, idx_device: i32, event: i32) -> Result<(), DbErr> {
    device::Entity::update_many()
        .col_expr(device::Column::IdxEvent, Expr::value(event))
        .filter(device::Column::IdxDevice.eq(idx_device))
        .exec(db)
        .await?;
    Ok(())
}
