// Vendor normalization: one raw device snapshot in, canonical interface,
// VLAN and MAC records out.

pub(crate) mod duplex;
pub(crate) mod idle;
pub(crate) mod snapshot;
pub(crate) mod vlan;

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use thiserror::Error;

use crate::snmp::mib::IFTYPE_ETHERNET_CSMACD;
use crate::topology::idle::IdleTracker;
use crate::topology::snapshot::{ArpEntry, DeviceSnapshot, InterfaceFacts, Neighbors};
use crate::topology::vlan::VlanFacts;

/// ifAdminStatus / ifOperStatus up(1).
const STATUS_UP: i64 = 1;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("{0}: no sysObjectID in snapshot")]
    MissingObjectId(String),
    #[error("{0}: no sysDescr in snapshot")]
    MissingDescription(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CanonicalInterface {
    pub(crate) ifindex: i32,
    pub(crate) ethernet: bool,
    pub(crate) trunk: bool,
    pub(crate) nativevlan: i32,
    pub(crate) vlans: Vec<i32>,
    pub(crate) duplex: i32,
    pub(crate) iftype: i32,
    pub(crate) ifspeed: i64,
    pub(crate) ifadminstatus: i32,
    pub(crate) ifoperstatus: i32,
    pub(crate) ifname: Option<String>,
    pub(crate) ifalias: Option<String>,
    pub(crate) ifdescription: Option<String>,
    pub(crate) neighbors: Neighbors,
    /// Epoch seconds since the port went idle, or 0 while active.
    pub(crate) ts_idle: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct CanonicalVlan {
    pub(crate) name: Option<String>,
    /// vtpVlanState where reported, otherwise 0.
    pub(crate) state: i32,
}

#[derive(Clone, Debug)]
pub(crate) struct CanonicalDevice {
    pub(crate) hostname: String,
    pub(crate) sys_name: Option<String>,
    pub(crate) sys_description: String,
    pub(crate) sys_objectid: String,
    pub(crate) sys_uptime: i64,
    pub(crate) interfaces: Vec<CanonicalInterface>,
    /// Every VLAN seen on any port.
    pub(crate) vlans: BTreeMap<i32, CanonicalVlan>,
    /// MACs learned per ifIndex.
    pub(crate) mac_ports: BTreeMap<i32, BTreeSet<String>>,
    pub(crate) arp: Vec<ArpEntry>,
}

impl CanonicalDevice {
    /// Distinct MACs from the FDB and the ARP tables.
    pub(crate) fn macs(&self) -> BTreeSet<String> {
        self.mac_ports
            .values()
            .flatten()
            .chain(self.arp.iter().map(|entry| &entry.mac))
            .cloned()
            .collect()
    }
}

fn is_ethernet(facts: &InterfaceFacts) -> bool {
    let virtual_vlan = facts
        .if_name
        .as_deref()
        .map(|name| name.to_ascii_lowercase().starts_with("vl"))
        .unwrap_or(false);
    facts.if_type == Some(IFTYPE_ETHERNET_CSMACD) && !virtual_vlan
}

/// VLAN facts for a physical port, read through the ifStack layers above it.
///
/// With several higher layers their VLAN lists are concatenated and the
/// native VLAN and trunk flag come from the highest ifIndex.
fn resolve_vlans(snapshot: &DeviceSnapshot, ifindex: i32, facts: &InterfaceFacts) -> VlanFacts {
    let higher = snapshot.stack.higher_layers(ifindex);
    if higher.is_empty() {
        return vlan::extract(facts);
    }
    let mut resolved = VlanFacts::default();
    for layer in higher {
        let layer_facts = snapshot
            .interfaces
            .get(&layer)
            .map(vlan::extract)
            .unwrap_or_default();
        resolved.vlans.extend(layer_facts.vlans);
        resolved.native_vlan = layer_facts.native_vlan;
        resolved.trunk = layer_facts.trunk;
    }
    resolved
}

fn to_i32(value: Option<i64>) -> i32 {
    value.and_then(|v| i32::try_from(v).ok()).unwrap_or(0)
}

/// Turn one snapshot into canonical records, folding port idle state into
/// `idle`.
pub(crate) fn normalize(
    snapshot: &DeviceSnapshot,
    now: i64,
    idle: &mut IdleTracker,
) -> Result<CanonicalDevice, NormalizeError> {
    let host = &snapshot.hostname;
    let sys_objectid = snapshot
        .system
        .sys_object_id
        .clone()
        .ok_or_else(|| NormalizeError::MissingObjectId(host.clone()))?;
    let sys_description = snapshot
        .system
        .sys_descr
        .clone()
        .ok_or_else(|| NormalizeError::MissingDescription(host.clone()))?;

    let mut interfaces = Vec::new();
    let mut vlans: BTreeMap<i32, CanonicalVlan> = BTreeMap::new();
    for (&ifindex, facts) in &snapshot.interfaces {
        if !facts.in_iftable() {
            debug!("{}: ifIndex {} has no ifTable row, skipping", host, ifindex);
            continue;
        }
        let ethernet = is_ethernet(facts);
        let vlan_facts = resolve_vlans(snapshot, ifindex, facts);
        for vlan in &vlan_facts.vlans {
            vlans.entry(*vlan).or_insert_with(|| CanonicalVlan {
                name: snapshot.vlan_names.get(vlan).cloned(),
                state: to_i32(snapshot.vlan_states.get(vlan).copied()),
            });
        }

        let active = facts.if_admin_status == Some(STATUS_UP)
            && facts.if_oper_status == Some(STATUS_UP);
        let ts_idle = if ethernet {
            idle.observe(ifindex, active, now)
        } else {
            0
        };

        let ifspeed = match facts.if_high_speed {
            Some(mbps) if mbps > 0 => mbps.saturating_mul(1_000_000),
            _ => facts.if_speed.unwrap_or(0),
        };

        let mut port_vlans = vlan_facts.vlans;
        port_vlans.sort_unstable();
        port_vlans.dedup();

        interfaces.push(CanonicalInterface {
            ifindex,
            ethernet,
            trunk: vlan_facts.trunk,
            nativevlan: vlan_facts.native_vlan,
            vlans: port_vlans,
            duplex: duplex::canonical(facts),
            iftype: to_i32(facts.if_type),
            ifspeed,
            ifadminstatus: to_i32(facts.if_admin_status),
            ifoperstatus: to_i32(facts.if_oper_status),
            ifname: facts.if_name.clone(),
            ifalias: facts.if_alias.clone(),
            ifdescription: facts.if_descr.clone(),
            neighbors: facts.neighbors.clone(),
            ts_idle,
        });
    }

    let mac_ports = snapshot
        .fdb
        .iter()
        .filter(|(ifindex, _)| {
            snapshot
                .interfaces
                .get(ifindex)
                .map(InterfaceFacts::in_iftable)
                .unwrap_or(false)
        })
        .map(|(ifindex, macs)| (*ifindex, macs.clone()))
        .collect();

    Ok(CanonicalDevice {
        hostname: host.clone(),
        sys_name: snapshot.system.sys_name.clone(),
        sys_description,
        sys_objectid,
        sys_uptime: snapshot.system.sys_uptime,
        interfaces,
        vlans,
        mac_ports,
        arp: snapshot.arp.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::snapshot::SystemFacts;

    fn port(if_type: i64, name: &str, admin: i64, oper: i64) -> InterfaceFacts {
        InterfaceFacts {
            if_type: Some(if_type),
            if_name: Some(name.to_string()),
            if_descr: Some(name.to_string()),
            if_admin_status: Some(admin),
            if_oper_status: Some(oper),
            ..Default::default()
        }
    }

    fn snapshot() -> DeviceSnapshot {
        DeviceSnapshot {
            hostname: "sw1".to_string(),
            system: SystemFacts {
                sys_descr: Some("Juniper EX".to_string()),
                sys_object_id: Some(".1.3.6.1.4.1.2636".to_string()),
                sys_name: Some("sw1".to_string()),
                sys_uptime: 4200,
            },
            ..Default::default()
        }
    }

    fn interface(device: &CanonicalDevice, ifindex: i32) -> &CanonicalInterface {
        device
            .interfaces
            .iter()
            .find(|i| i.ifindex == ifindex)
            .unwrap()
    }

    #[test]
    fn ethernet_excludes_vlan_shadow_interfaces() {
        assert!(is_ethernet(&port(6, "ge-0/0/1", 1, 1)));
        assert!(!is_ethernet(&port(6, "Vlan20", 1, 1)));
        assert!(!is_ethernet(&port(6, "vlan.0", 1, 1)));
        assert!(!is_ethernet(&port(24, "lo0", 1, 1)));
    }

    #[test]
    fn single_higher_layer_supplies_vlan_facts() {
        let mut snapshot = snapshot();
        let mut physical = port(6, "ge-0/0/1", 1, 1);
        physical.vm_vlan = Some(999);
        snapshot.interfaces.insert(1, physical);
        snapshot.interfaces.insert(
            501,
            InterfaceFacts {
                if_type: Some(53),
                jnx_tagged_vlans: vec![10, 20],
                jnx_access_mode: Some(2),
                pvid: Some(10),
                ..Default::default()
            },
        );
        snapshot.stack.add(501, 1);
        snapshot.stack.add(0, 501);

        let mut idle = IdleTracker::ephemeral();
        let device = normalize(&snapshot, 1000, &mut idle).unwrap();
        let port = interface(&device, 1);
        assert_eq!(port.vlans, vec![10, 20]);
        assert_eq!(port.nativevlan, 10);
        assert!(port.trunk);
    }

    #[test]
    fn no_higher_layer_uses_own_attributes() {
        let mut snapshot = snapshot();
        let mut physical = port(6, "Gi1/0/1", 1, 1);
        physical.vm_vlan = Some(30);
        physical.pvid = Some(30);
        snapshot.interfaces.insert(1, physical);
        snapshot.stack.add(0, 1);

        let mut idle = IdleTracker::ephemeral();
        let device = normalize(&snapshot, 1000, &mut idle).unwrap();
        let port = interface(&device, 1);
        assert_eq!(port.vlans, vec![30]);
        assert_eq!(port.nativevlan, 30);
        assert!(!port.trunk);
        assert_eq!(device.vlans.keys().copied().collect::<Vec<_>>(), vec![30]);
    }

    #[test]
    fn several_higher_layers_take_the_highest_last() {
        let mut snapshot = snapshot();
        snapshot.interfaces.insert(1, port(6, "ge-0/0/1", 1, 1));
        snapshot.interfaces.insert(
            520,
            InterfaceFacts {
                if_type: Some(53),
                jnx_tagged_vlans: vec![20],
                pvid: Some(20),
                ..Default::default()
            },
        );
        snapshot.interfaces.insert(
            510,
            InterfaceFacts {
                if_type: Some(53),
                jnx_tagged_vlans: vec![10],
                pvid: Some(10),
                jnx_access_mode: Some(2),
                ..Default::default()
            },
        );
        snapshot.stack.add(520, 1);
        snapshot.stack.add(510, 1);
        snapshot.vlan_names.insert(20, "voice".to_string());

        let mut idle = IdleTracker::ephemeral();
        let device = normalize(&snapshot, 1000, &mut idle).unwrap();
        let port = interface(&device, 1);
        assert_eq!(port.vlans, vec![10, 20]);
        assert_eq!(port.nativevlan, 20);
        assert!(!port.trunk);
        assert_eq!(device.vlans[&20].name.as_deref(), Some("voice"));
        assert_eq!(device.vlans[&10], CanonicalVlan::default());
    }

    #[test]
    fn idle_applies_to_ethernet_only() {
        let mut snapshot = snapshot();
        snapshot.interfaces.insert(1, port(6, "Gi1/0/1", 1, 1));
        snapshot.interfaces.insert(2, port(6, "Gi1/0/2", 1, 2));
        snapshot.interfaces.insert(3, port(24, "Lo0", 1, 2));

        let mut idle = IdleTracker::ephemeral();
        let device = normalize(&snapshot, 1000, &mut idle).unwrap();
        assert_eq!(interface(&device, 1).ts_idle, 0);
        assert_eq!(interface(&device, 2).ts_idle, 1000);
        assert_eq!(interface(&device, 3).ts_idle, 0);
    }

    #[test]
    fn gaps_are_isolated_per_interface() {
        let mut snapshot = snapshot();
        snapshot.interfaces.insert(1, port(6, "Gi1/0/1", 1, 1));
        // Only known from a stale CDP entry.
        snapshot.interfaces.insert(
            7,
            InterfaceFacts {
                neighbors: Neighbors {
                    cdp_device_id: Some("old".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        snapshot
            .fdb
            .insert(7, ["001122334455".to_string()].into_iter().collect());
        snapshot
            .fdb
            .insert(1, ["00aabbccddee".to_string()].into_iter().collect());

        let mut idle = IdleTracker::ephemeral();
        let device = normalize(&snapshot, 1000, &mut idle).unwrap();
        assert_eq!(device.interfaces.len(), 1);
        assert_eq!(device.interfaces[0].duplex, duplex::UNKNOWN);
        assert_eq!(device.mac_ports.len(), 1);
        assert!(device.macs().contains("00aabbccddee"));
    }

    #[test]
    fn missing_system_facts_abort_the_device() {
        let mut snapshot = snapshot();
        snapshot.system.sys_object_id = None;
        let mut idle = IdleTracker::ephemeral();
        assert!(matches!(
            normalize(&snapshot, 1000, &mut idle),
            Err(NormalizeError::MissingObjectId(_))
        ));
    }

    #[test]
    fn high_speed_wins_over_legacy_speed() {
        let mut snapshot = snapshot();
        let mut facts = port(6, "Te1/0/1", 1, 1);
        facts.if_speed = Some(4_294_967_295);
        facts.if_high_speed = Some(10_000);
        snapshot.interfaces.insert(1, facts);
        let mut idle = IdleTracker::ephemeral();
        let device = normalize(&snapshot, 1000, &mut idle).unwrap();
        assert_eq!(device.interfaces[0].ifspeed, 10_000_000_000);
    }
}
