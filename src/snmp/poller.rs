// Walks the curated MIB set for one device and assembles a typed snapshot.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use log::debug;

use crate::snmp::session::Session;
use crate::snmp::{mib, SnmpError, SnmpValue};
use crate::topology::snapshot::{ArpEntry, DeviceSnapshot, InterfaceFacts, SystemFacts};
use crate::utils;

/// ipNetToPhysicalNetAddressType values.
const INET_IPV4: u32 = 1;
const INET_IPV6: u32 = 2;

pub(crate) async fn collect(session: &Session) -> Result<DeviceSnapshot, SnmpError> {
    let mut snapshot = DeviceSnapshot {
        hostname: session.host().to_string(),
        system: system(session).await?,
        ..Default::default()
    };
    if_table(session, &mut snapshot).await?;
    stack(session, &mut snapshot).await?;
    let bridge = bridge_ports(session).await?;
    duplex(session, &mut snapshot).await?;
    vlans(session, &mut snapshot, &bridge).await?;
    neighbors(session, &mut snapshot, &bridge).await?;
    fdb(session, &mut snapshot, &bridge).await?;
    arp(session, &mut snapshot).await?;
    debug!(
        "{}: collected {} interfaces, {} FDB ports, {} ARP entries",
        snapshot.hostname,
        snapshot.interfaces.len(),
        snapshot.fdb.len(),
        snapshot.arp.len()
    );
    Ok(snapshot)
}

async fn system(session: &Session) -> Result<SystemFacts, SnmpError> {
    let text = |query: crate::snmp::session::Query| {
        if query.exists {
            query.value.as_text()
        } else {
            None
        }
    };
    Ok(SystemFacts {
        sys_descr: text(session.get(mib::SYS_DESCR).await?),
        sys_object_id: text(session.get(mib::SYS_OBJECT_ID).await?),
        sys_name: text(session.get(mib::SYS_NAME).await?),
        sys_uptime: session
            .get(mib::SYS_UPTIME)
            .await?
            .value
            .as_integer()
            .unwrap_or(0),
    })
}

/// Walk a table indexed by ifIndex and hand each value to `apply`.
async fn per_ifindex<F>(
    session: &Session,
    oid: &str,
    snapshot: &mut DeviceSnapshot,
    mut apply: F,
) -> Result<(), SnmpError>
where
    F: FnMut(&mut InterfaceFacts, SnmpValue),
{
    for (index, value) in session.walk_normalized(oid).await? {
        if let Ok(ifindex) = i32::try_from(index) {
            apply(snapshot.interfaces.entry(ifindex).or_default(), value);
        }
    }
    Ok(())
}

async fn if_table(session: &Session, snapshot: &mut DeviceSnapshot) -> Result<(), SnmpError> {
    per_ifindex(session, mib::IF_DESCR, snapshot, |f, v| f.if_descr = v.as_text()).await?;
    per_ifindex(session, mib::IF_TYPE, snapshot, |f, v| f.if_type = v.as_integer()).await?;
    per_ifindex(session, mib::IF_SPEED, snapshot, |f, v| f.if_speed = v.as_integer()).await?;
    per_ifindex(session, mib::IF_ADMIN_STATUS, snapshot, |f, v| {
        f.if_admin_status = v.as_integer()
    })
    .await?;
    per_ifindex(session, mib::IF_OPER_STATUS, snapshot, |f, v| {
        f.if_oper_status = v.as_integer()
    })
    .await?;
    per_ifindex(session, mib::IF_NAME, snapshot, |f, v| f.if_name = v.as_text()).await?;
    per_ifindex(session, mib::IF_HIGH_SPEED, snapshot, |f, v| {
        f.if_high_speed = v.as_integer()
    })
    .await?;
    per_ifindex(session, mib::IF_ALIAS, snapshot, |f, v| f.if_alias = v.as_text()).await?;
    Ok(())
}

async fn stack(session: &Session, snapshot: &mut DeviceSnapshot) -> Result<(), SnmpError> {
    for (suffix, _) in session.walk_suffixed(mib::IF_STACK_STATUS).await? {
        if let [higher, lower] = suffix[..] {
            if let (Ok(higher), Ok(lower)) = (i32::try_from(higher), i32::try_from(lower)) {
                snapshot.stack.add(higher, lower);
            }
        }
    }
    Ok(())
}

/// dot1dBasePort to ifIndex.
async fn bridge_ports(session: &Session) -> Result<BTreeMap<u32, i32>, SnmpError> {
    Ok(session
        .walk_normalized(mib::DOT1D_BASE_PORT_IFINDEX)
        .await?
        .into_iter()
        .filter_map(|(port, value)| {
            let ifindex = i32::try_from(value.as_integer()?).ok()?;
            Some((port, ifindex))
        })
        .collect())
}

/// Resolve a port number that may be a bridge port or already an ifIndex.
fn port_ifindex(bridge: &BTreeMap<u32, i32>, port: u32) -> Option<i32> {
    bridge
        .get(&port)
        .copied()
        .or_else(|| i32::try_from(port).ok())
}

/// Map a vendor `(module, port)` index to ifIndex through its ifIndex column.
async fn module_ports(session: &Session, oid: &str) -> Result<BTreeMap<Vec<u32>, i32>, SnmpError> {
    Ok(session
        .walk_suffixed(oid)
        .await?
        .into_iter()
        .filter_map(|(suffix, value)| {
            let ifindex = i32::try_from(value.as_integer()?).ok()?;
            Some((suffix, ifindex))
        })
        .collect())
}

async fn per_module_port<F>(
    session: &Session,
    oid: &str,
    ports: &BTreeMap<Vec<u32>, i32>,
    snapshot: &mut DeviceSnapshot,
    mut apply: F,
) -> Result<(), SnmpError>
where
    F: FnMut(&mut InterfaceFacts, i64),
{
    for (suffix, value) in session.walk_suffixed(oid).await? {
        if let (Some(ifindex), Some(value)) = (ports.get(&suffix), value.as_integer()) {
            apply(snapshot.interfaces.entry(*ifindex).or_default(), value);
        }
    }
    Ok(())
}

async fn duplex(session: &Session, snapshot: &mut DeviceSnapshot) -> Result<(), SnmpError> {
    let stack_ports = module_ports(session, mib::PORT_IFINDEX).await?;
    if !stack_ports.is_empty() {
        per_module_port(session, mib::PORT_DUPLEX, &stack_ports, snapshot, |f, v| {
            f.port_duplex = Some(v)
        })
        .await?;
    }

    let c2900_ports = module_ports(session, mib::C2900_PORT_IFINDEX).await?;
    if !c2900_ports.is_empty() {
        per_module_port(session, mib::C2900_PORT_DUPLEX_STATUS, &c2900_ports, snapshot, |f, v| {
            f.c2900_duplex_status = Some(v)
        })
        .await?;
        per_module_port(session, mib::C2900_PORT_LINKBEAT_STATUS, &c2900_ports, snapshot, |f, v| {
            f.c2900_linkbeat_status = Some(v)
        })
        .await?;
        per_module_port(session, mib::C2900_PORT_DUPLEX_STATE, &c2900_ports, snapshot, |f, v| {
            f.c2900_duplex_state = Some(v)
        })
        .await?;
    }

    per_ifindex(session, mib::SW_PORT_DUPLEX_STATUS, snapshot, |f, v| {
        f.sw_port_duplex_status = v.as_integer()
    })
    .await?;
    per_ifindex(session, mib::DOT3_STATS_DUPLEX_STATUS, snapshot, |f, v| {
        f.dot3_duplex_status = v.as_integer()
    })
    .await?;
    Ok(())
}

async fn vlans(
    session: &Session,
    snapshot: &mut DeviceSnapshot,
    bridge: &BTreeMap<u32, i32>,
) -> Result<(), SnmpError> {
    per_ifindex(session, mib::VM_VLAN, snapshot, |f, v| f.vm_vlan = v.as_integer()).await?;
    per_ifindex(session, mib::VLAN_TRUNK_PORT_VLANS_ENABLED, snapshot, |f, v| {
        f.trunk_vlans_enabled = v.as_bytes().map(<[u8]>::to_vec)
    })
    .await?;
    per_ifindex(session, mib::VLAN_TRUNK_PORT_NATIVE_VLAN, snapshot, |f, v| {
        f.trunk_native_vlan = v.as_integer()
    })
    .await?;
    per_ifindex(session, mib::VLAN_TRUNK_PORT_DYNAMIC_STATUS, snapshot, |f, v| {
        f.trunk_dynamic_status = v.as_integer()
    })
    .await?;

    // cviRoutedVlanIfIndex.<vlan>.<physical> = routed ifIndex
    for (suffix, value) in session.walk_suffixed(mib::CVI_ROUTED_VLAN_IFINDEX).await? {
        let (Some(vlan), Some(ifindex)) = (suffix.first(), value.as_integer()) else {
            continue;
        };
        if let Ok(ifindex) = i32::try_from(ifindex) {
            let facts = snapshot.interfaces.entry(ifindex).or_default();
            facts.routed_vlans.push(i64::from(*vlan));
        }
    }

    for (port, value) in session.walk_normalized(mib::DOT1Q_PVID).await? {
        if let Some(ifindex) = bridge.get(&port) {
            snapshot.interfaces.entry(*ifindex).or_default().pvid = value.as_integer();
        }
    }

    // Juniper indexes port tables by an internal VLAN id, mapped to the
    // 802.1Q tag through jnxExVlanTag.
    let tags = session.walk_normalized(mib::JNX_EX_VLAN_TAG).await?;
    for (suffix, _) in session.walk_suffixed(mib::JNX_EX_VLAN_PORT_STATUS).await? {
        let [vlan_index, port] = suffix[..] else {
            continue;
        };
        let tag = tags.get(&vlan_index).and_then(SnmpValue::as_integer);
        if let (Some(tag), Some(ifindex)) = (tag, port_ifindex(bridge, port)) {
            let facts = snapshot.interfaces.entry(ifindex).or_default();
            if !facts.jnx_tagged_vlans.contains(&tag) {
                facts.jnx_tagged_vlans.push(tag);
            }
        }
    }
    for (suffix, value) in session.walk_suffixed(mib::JNX_EX_VLAN_PORT_ACCESS_MODE).await? {
        let [_, port] = suffix[..] else {
            continue;
        };
        if let (Some(mode), Some(ifindex)) = (value.as_integer(), port_ifindex(bridge, port)) {
            let facts = snapshot.interfaces.entry(ifindex).or_default();
            // Trunk on any VLAN makes the port a trunk.
            if facts.jnx_access_mode != Some(2) {
                facts.jnx_access_mode = Some(mode);
            }
        }
    }

    for (vlan, value) in session.walk_normalized(mib::DOT1Q_VLAN_STATIC_NAME).await? {
        if let (Ok(vlan), Some(name)) = (i32::try_from(vlan), value.as_text()) {
            snapshot.vlan_names.entry(vlan).or_insert(name);
        }
    }
    for (suffix, value) in session.walk_suffixed(mib::VTP_VLAN_STATE).await? {
        let [_, vlan] = suffix[..] else {
            continue;
        };
        if let (Ok(vlan), Some(state)) = (i32::try_from(vlan), value.as_integer()) {
            snapshot.vlan_states.insert(vlan, state);
        }
    }
    for (suffix, value) in session.walk_suffixed(mib::VTP_VLAN_NAME).await? {
        let [_, vlan] = suffix[..] else {
            continue;
        };
        if let (Ok(vlan), Some(name)) = (i32::try_from(vlan), value.as_text()) {
            snapshot.vlan_names.entry(vlan).or_insert(name);
        }
    }
    Ok(())
}

async fn neighbors(
    session: &Session,
    snapshot: &mut DeviceSnapshot,
    bridge: &BTreeMap<u32, i32>,
) -> Result<(), SnmpError> {
    // cdpCacheTable is indexed by <ifIndex>.<deviceIndex>.
    let cdp = [
        mib::CDP_CACHE_DEVICE_ID,
        mib::CDP_CACHE_DEVICE_PORT,
        mib::CDP_CACHE_PLATFORM,
    ];
    for (column, oid) in cdp.into_iter().enumerate() {
        for (suffix, value) in session.walk_suffixed(oid).await? {
            let Some(ifindex) = suffix.first().and_then(|i| i32::try_from(*i).ok()) else {
                continue;
            };
            let neighbors = &mut snapshot.interfaces.entry(ifindex).or_default().neighbors;
            let text = value.as_text();
            match column {
                0 => neighbors.cdp_device_id = text,
                1 => neighbors.cdp_device_port = text,
                _ => neighbors.cdp_platform = text,
            }
        }
    }

    // lldpRemTable is indexed by <timeMark>.<localPortNum>.<index>.
    let lldp = [
        mib::LLDP_REM_CHASSIS_ID,
        mib::LLDP_REM_PORT_DESC,
        mib::LLDP_REM_SYS_NAME,
        mib::LLDP_REM_SYS_DESC,
    ];
    for (column, oid) in lldp.into_iter().enumerate() {
        for (suffix, value) in session.walk_suffixed(oid).await? {
            let Some(ifindex) = suffix.get(1).and_then(|port| port_ifindex(bridge, *port)) else {
                continue;
            };
            let neighbors = &mut snapshot.interfaces.entry(ifindex).or_default().neighbors;
            let text = if column == 0 {
                value
                    .as_bytes()
                    .and_then(utils::mac_from_bytes)
                    .or_else(|| value.as_text())
            } else {
                value.as_text()
            };
            match column {
                0 => neighbors.lldp_chassis_id = text,
                1 => neighbors.lldp_port_desc = text,
                2 => neighbors.lldp_sys_name = text,
                _ => neighbors.lldp_sys_desc = text,
            }
        }
    }
    Ok(())
}

async fn fdb(
    session: &Session,
    snapshot: &mut DeviceSnapshot,
    bridge: &BTreeMap<u32, i32>,
) -> Result<(), SnmpError> {
    let mut entries = session.walk_suffixed(mib::DOT1D_TP_FDB_PORT).await?;
    // dot1qTpFdbPort adds a leading FDB id to the MAC index.
    entries.extend(session.walk_suffixed(mib::DOT1Q_TP_FDB_PORT).await?);
    for (suffix, value) in entries {
        if suffix.len() < 6 {
            continue;
        }
        let Some(mac) = utils::mac_from_arcs(&suffix[suffix.len() - 6..]) else {
            continue;
        };
        let port = value.as_integer().and_then(|p| u32::try_from(p).ok());
        if let Some(ifindex) = port.and_then(|p| bridge.get(&p)) {
            snapshot.fdb.entry(*ifindex).or_default().insert(mac);
        }
    }
    Ok(())
}

async fn arp(session: &Session, snapshot: &mut DeviceSnapshot) -> Result<(), SnmpError> {
    // ipNetToMediaPhysAddress.<ifIndex>.<a>.<b>.<c>.<d>
    for (suffix, value) in session.walk_suffixed(mib::IP_NET_TO_MEDIA_PHYS_ADDRESS).await? {
        let Some(octets) = arcs_to_bytes(suffix.get(1..).unwrap_or_default()) else {
            continue;
        };
        let Ok(octets) = <[u8; 4]>::try_from(octets.as_slice()) else {
            continue;
        };
        push_arp(snapshot, IpAddr::V4(Ipv4Addr::from(octets)), &value);
    }

    // ipNetToPhysicalPhysAddress.<ifIndex>.<type>.<length>.<address...>
    for (suffix, value) in session.walk_suffixed(mib::IP_NET_TO_PHYSICAL_PHYS_ADDRESS).await? {
        let [_, kind, _, ref address @ ..] = suffix[..] else {
            continue;
        };
        let Some(bytes) = arcs_to_bytes(address) else {
            continue;
        };
        let address = match kind {
            INET_IPV4 => <[u8; 4]>::try_from(bytes.as_slice())
                .ok()
                .map(|b| IpAddr::V4(Ipv4Addr::from(b))),
            INET_IPV6 => <[u8; 16]>::try_from(bytes.as_slice())
                .ok()
                .map(|b| IpAddr::V6(Ipv6Addr::from(b))),
            _ => None,
        };
        if let Some(address) = address {
            push_arp(snapshot, address, &value);
        }
    }
    Ok(())
}

fn arcs_to_bytes(arcs: &[u32]) -> Option<Vec<u8>> {
    arcs.iter().map(|arc| u8::try_from(*arc).ok()).collect()
}

fn push_arp(snapshot: &mut DeviceSnapshot, address: IpAddr, value: &SnmpValue) {
    let Some(mac) = value.as_bytes().and_then(utils::mac_from_bytes) else {
        return;
    };
    let entry = ArpEntry { address, mac };
    if !snapshot.arp.contains(&entry) {
        snapshot.arp.push(entry);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::snmp::agent::fake::FakeAgent;
    use async_snmp::{Oid, Value};

    /// A small Cisco access switch: two Ethernet ports and an SVI.
    pub(crate) fn access_switch() -> FakeAgent {
        let mut agent = FakeAgent::default();
        agent.set(mib::SYS_DESCR, "Cisco IOS Software, C2960".into());
        agent.set(
            mib::SYS_OBJECT_ID,
            Value::ObjectIdentifier(Oid::from_slice(&[1, 3, 6, 1, 4, 1, 9, 1, 1208])),
        );
        agent.set(mib::SYS_NAME, "sw1".into());
        agent.set(mib::SYS_UPTIME, Value::TimeTicks(123_456));

        for (ifindex, name, admin, oper) in [(1, "Gi1/0/1", 1, 1), (2, "Gi1/0/2", 1, 2)] {
            agent.set(&format!("{}.{}", mib::IF_DESCR, ifindex), name.into());
            agent.set(&format!("{}.{}", mib::IF_NAME, ifindex), name.into());
            agent.set(&format!("{}.{}", mib::IF_TYPE, ifindex), Value::Integer(6));
            agent.set(&format!("{}.{}", mib::IF_SPEED, ifindex), Value::Gauge32(1_000_000_000));
            agent.set(&format!("{}.{}", mib::IF_ADMIN_STATUS, ifindex), Value::Integer(admin));
            agent.set(&format!("{}.{}", mib::IF_OPER_STATUS, ifindex), Value::Integer(oper));
            agent.set(&format!("{}.{}", mib::VM_VLAN, ifindex), Value::Integer(10));
            agent.set(&format!("{}.{}", mib::DOT3_STATS_DUPLEX_STATUS, ifindex), Value::Integer(3));
            agent.set(&format!("{}.{}", mib::DOT1D_BASE_PORT_IFINDEX, ifindex), Value::Integer(ifindex));
        }
        agent.set(&format!("{}.1", mib::IF_ALIAS), "printer".into());
        agent.set(&format!("{}.50", mib::IF_DESCR), "Vlan10".into());
        agent.set(&format!("{}.50", mib::IF_NAME), "Vl10".into());
        agent.set(&format!("{}.50", mib::IF_TYPE), Value::Integer(53));
        agent.set(&format!("{}.10", mib::DOT1Q_VLAN_STATIC_NAME), "users".into());

        agent.set(
            &format!("{}.0.17.34.51.68.85", mib::DOT1D_TP_FDB_PORT),
            Value::Integer(1),
        );
        agent.set(
            &format!("{}.50.10.0.0.5", mib::IP_NET_TO_MEDIA_PHYS_ADDRESS),
            Value::OctetString(vec![0x00, 0x11, 0x22, 0x33, 0x44, 0x55].into()),
        );
        agent.set(
            &format!("{}.1.6", mib::CDP_CACHE_DEVICE_ID),
            "phone.example.com".into(),
        );
        agent
    }

    #[tokio::test]
    async fn collects_a_typed_snapshot() {
        let session = Session::new("sw1", Box::new(access_switch()));
        let snapshot = collect(&session).await.unwrap();

        assert_eq!(snapshot.hostname, "sw1");
        assert_eq!(snapshot.system.sys_object_id.as_deref(), Some(".1.3.6.1.4.1.9.1.1208"));
        assert_eq!(snapshot.system.sys_uptime, 123_456);
        assert_eq!(snapshot.interfaces.len(), 3);

        let port = &snapshot.interfaces[&1];
        assert_eq!(port.if_type, Some(6));
        assert_eq!(port.if_alias.as_deref(), Some("printer"));
        assert_eq!(port.vm_vlan, Some(10));
        assert_eq!(port.dot3_duplex_status, Some(3));
        assert_eq!(port.neighbors.cdp_device_id.as_deref(), Some("phone.example.com"));

        assert!(snapshot.fdb[&1].contains("001122334455"));
        assert_eq!(snapshot.arp.len(), 1);
        assert_eq!(snapshot.arp[0].address.to_string(), "10.0.0.5");
        assert_eq!(snapshot.vlan_names[&10], "users");
    }

    #[tokio::test]
    async fn ipv6_neighbors_and_juniper_vlans() {
        let mut agent = FakeAgent::default();
        agent.set(mib::SYS_DESCR, "Juniper Networks EX2300".into());
        agent.set(&format!("{}.1", mib::DOT1D_BASE_PORT_IFINDEX), Value::Integer(513));
        agent.set(&format!("{}.5", mib::JNX_EX_VLAN_TAG), Value::Integer(100));
        agent.set(&format!("{}.5.1", mib::JNX_EX_VLAN_PORT_STATUS), Value::Integer(1));
        agent.set(&format!("{}.5.1", mib::JNX_EX_VLAN_PORT_ACCESS_MODE), Value::Integer(2));
        agent.set(&format!("{}.513.600", mib::IF_STACK_STATUS), Value::Integer(1));
        let mut v6 = format!("{}.600.2.16.32.1.13.184", mib::IP_NET_TO_PHYSICAL_PHYS_ADDRESS);
        for _ in 0..11 {
            v6.push_str(".0");
        }
        v6.push_str(".1");
        agent.set(&v6, Value::OctetString(vec![0xaa, 0xbb, 0xcc, 0, 0, 1].into()));

        let session = Session::new("ex1", Box::new(agent));
        let snapshot = collect(&session).await.unwrap();
        assert_eq!(snapshot.interfaces[&513].jnx_tagged_vlans, vec![100]);
        assert_eq!(snapshot.interfaces[&513].jnx_access_mode, Some(2));
        assert_eq!(snapshot.stack.higher_layers(600), vec![513]);
        assert_eq!(snapshot.arp[0].mac, "aabbcc000001");
        assert_eq!(
            utils::ip_to_string(&snapshot.arp[0].address),
            "2001:0db8:0000:0000:0000:0000:0000:0001"
        );
    }
}
