// VLAN membership, native VLAN and trunk state for one interface.

use crate::topology::snapshot::InterfaceFacts;

const MAX_VLAN: i32 = 4094;

/// vlanTrunkPortDynamicStatus trunking(1).
const TRUNKING: i64 = 1;
/// jnxExVlanPortAccessMode trunk(2).
const JNX_TRUNK: i64 = 2;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct VlanFacts {
    pub(crate) vlans: Vec<i32>,
    pub(crate) native_vlan: i32,
    pub(crate) trunk: bool,
}

/// VLANs set in a vlanTrunkPortVlansEnabled bitmap. The high bit of the
/// first octet is VLAN 0.
pub(crate) fn decode_bitmap(bitmap: &[u8]) -> Vec<i32> {
    let mut vlans = Vec::new();
    for (octet, byte) in bitmap.iter().enumerate() {
        for bit in 0..8 {
            if byte & (0x80 >> bit) != 0 {
                let vlan = (octet * 8 + bit) as i32;
                if (1..=MAX_VLAN).contains(&vlan) {
                    vlans.push(vlan);
                }
            }
        }
    }
    vlans
}

fn valid(vlan: i64) -> Option<i32> {
    i32::try_from(vlan)
        .ok()
        .filter(|v| (1..=MAX_VLAN).contains(v))
}

fn vlan_list(values: &[i64]) -> Vec<i32> {
    values.iter().copied().filter_map(valid).collect()
}

/// Read VLAN facts from one interface's own attributes.
pub(crate) fn extract(facts: &InterfaceFacts) -> VlanFacts {
    let sources: [Vec<i32>; 4] = [
        facts.vm_vlan.and_then(valid).into_iter().collect(),
        facts
            .trunk_vlans_enabled
            .as_deref()
            .map(decode_bitmap)
            .unwrap_or_default(),
        vlan_list(&facts.routed_vlans),
        vlan_list(&facts.jnx_tagged_vlans),
    ];
    let vlans = sources
        .into_iter()
        .find(|source| !source.is_empty())
        .unwrap_or_default();

    let native_vlan = facts
        .trunk_native_vlan
        .or(facts.pvid)
        .and_then(valid)
        .unwrap_or(0);

    let trunk =
        facts.trunk_dynamic_status == Some(TRUNKING) || facts.jnx_access_mode == Some(JNX_TRUNK);

    VlanFacts {
        vlans,
        native_vlan,
        trunk,
    }
}
