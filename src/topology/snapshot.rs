// Typed per-device MIB snapshot, assembled by the poller and consumed by
// the normalizer.

use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct SystemFacts {
    pub(crate) sys_descr: Option<String>,
    pub(crate) sys_object_id: Option<String>,
    pub(crate) sys_name: Option<String>,
    /// Hundredths of a second.
    pub(crate) sys_uptime: i64,
}

/// CDP and LLDP data learned on one interface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Neighbors {
    pub(crate) cdp_device_id: Option<String>,
    pub(crate) cdp_device_port: Option<String>,
    pub(crate) cdp_platform: Option<String>,
    pub(crate) lldp_chassis_id: Option<String>,
    pub(crate) lldp_port_desc: Option<String>,
    pub(crate) lldp_sys_name: Option<String>,
    pub(crate) lldp_sys_desc: Option<String>,
}

/// Everything polled for one ifIndex. Fields are None when the device does
/// not implement the MIB carrying them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct InterfaceFacts {
    // IF-MIB
    pub(crate) if_type: Option<i64>,
    pub(crate) if_descr: Option<String>,
    pub(crate) if_name: Option<String>,
    pub(crate) if_alias: Option<String>,
    pub(crate) if_speed: Option<i64>,
    /// Mbit/s.
    pub(crate) if_high_speed: Option<i64>,
    pub(crate) if_admin_status: Option<i64>,
    pub(crate) if_oper_status: Option<i64>,

    // Duplex sources
    pub(crate) port_duplex: Option<i64>,
    pub(crate) c2900_duplex_status: Option<i64>,
    pub(crate) sw_port_duplex_status: Option<i64>,
    pub(crate) c2900_linkbeat_status: Option<i64>,
    pub(crate) c2900_duplex_state: Option<i64>,
    pub(crate) dot3_duplex_status: Option<i64>,

    // VLAN sources
    pub(crate) vm_vlan: Option<i64>,
    pub(crate) trunk_vlans_enabled: Option<Vec<u8>>,
    pub(crate) routed_vlans: Vec<i64>,
    pub(crate) jnx_tagged_vlans: Vec<i64>,
    pub(crate) trunk_native_vlan: Option<i64>,
    pub(crate) pvid: Option<i64>,
    pub(crate) trunk_dynamic_status: Option<i64>,
    pub(crate) jnx_access_mode: Option<i64>,

    pub(crate) neighbors: Neighbors,
}

impl InterfaceFacts {
    /// True once the interface has a row in ifTable.
    pub(crate) fn in_iftable(&self) -> bool {
        self.if_type.is_some() || self.if_descr.is_some()
    }
}

/// ifStackStatus adjacency, lower layer to the higher layers above it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct StackTable {
    higher: BTreeMap<i32, BTreeSet<i32>>,
}

impl StackTable {
    /// Record one `ifStackStatus.<higher>.<lower>` row. The 0 sentinel on
    /// either side means "nothing stacked".
    pub(crate) fn add(&mut self, higher: i32, lower: i32) {
        if higher == 0 || lower == 0 {
            return;
        }
        self.higher.entry(lower).or_default().insert(higher);
    }

    /// Higher layers above `lower`, ascending.
    pub(crate) fn higher_layers(&self, lower: i32) -> Vec<i32> {
        self.higher
            .get(&lower)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ArpEntry {
    pub(crate) address: IpAddr,
    pub(crate) mac: String,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct DeviceSnapshot {
    pub(crate) hostname: String,
    pub(crate) system: SystemFacts,
    pub(crate) interfaces: BTreeMap<i32, InterfaceFacts>,
    pub(crate) stack: StackTable,
    /// MACs learned in the bridge FDB, by ifIndex.
    pub(crate) fdb: BTreeMap<i32, BTreeSet<String>>,
    pub(crate) arp: Vec<ArpEntry>,
    pub(crate) vlan_names: BTreeMap<i32, String>,
    /// vtpVlanState: operational(1), suspended(2), mtuTooBigForDevice(3),
    /// mtuTooBigForTrunk(4).
    pub(crate) vlan_states: BTreeMap<i32, i64>,
}
