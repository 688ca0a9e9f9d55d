// Duplex canonicalization across the vendor MIBs that report it.
//
// Canonical codes: 0 unknown, 1 half, 2 full, 3 half-auto, 4 full-auto.

use crate::topology::snapshot::InterfaceFacts;

pub(crate) const UNKNOWN: i32 = 0;
pub(crate) const HALF: i32 = 1;
pub(crate) const FULL: i32 = 2;
pub(crate) const HALF_AUTO: i32 = 3;
pub(crate) const FULL_AUTO: i32 = 4;

/// CISCO-STACK-MIB portDuplex: half(1), full(2), disagree(3), auto(4).
fn port_duplex(value: i64) -> i32 {
    match value {
        1 => HALF,
        2 => FULL,
        _ => UNKNOWN,
    }
}

/// CISCO-C2900-MIB c2900PortDuplexStatus: fullduplex(1), halfduplex(2).
fn c2900_duplex_status(value: i64) -> i32 {
    match value {
        1 => FULL,
        2 => HALF,
        _ => UNKNOWN,
    }
}

/// CISCO-ESSWITCH-MIB swPortDuplexStatus: full(1), half(2), auto-full(3),
/// auto-half(4).
fn sw_port_duplex_status(value: i64) -> i32 {
    match value {
        1 => FULL,
        2 => HALF,
        3 => FULL_AUTO,
        4 => HALF_AUTO,
        _ => UNKNOWN,
    }
}

/// c2900PortLinkbeatStatus (unknown(1), nolinkbeat(2), linkbeat(3)) crossed
/// with c2900PortDuplexState (fullduplex(1), halfduplex(2)).
fn linkbeat(linkbeat: i64, duplex_state: i64) -> i32 {
    match (linkbeat, duplex_state) {
        (2, 2) => FULL,
        (2, 1) => HALF,
        (3, 2) => FULL_AUTO,
        (3, 1) => HALF_AUTO,
        _ => UNKNOWN,
    }
}

/// EtherLike-MIB dot3StatsDuplexStatus: unknown(1), halfDuplex(2),
/// fullDuplex(3).
fn dot3_duplex_status(value: i64) -> i32 {
    match value {
        2 => HALF,
        3 => FULL,
        _ => UNKNOWN,
    }
}

/// First present source wins, in fixed priority order.
pub(crate) fn canonical(facts: &InterfaceFacts) -> i32 {
    if let Some(value) = facts.port_duplex {
        return port_duplex(value);
    }
    if let Some(value) = facts.c2900_duplex_status {
        return c2900_duplex_status(value);
    }
    if let Some(value) = facts.sw_port_duplex_status {
        return sw_port_duplex_status(value);
    }
    if let (Some(beat), Some(state)) = (facts.c2900_linkbeat_status, facts.c2900_duplex_state) {
        return linkbeat(beat, state);
    }
    facts
        .dot3_duplex_status
        .map(dot3_duplex_status)
        .unwrap_or(UNKNOWN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_legacy_value_maps_to_a_canonical_code() {
        let codes = [UNKNOWN, HALF, FULL, HALF_AUTO, FULL_AUTO];
        for value in -1..=6 {
            assert!(codes.contains(&port_duplex(value)));
            assert!(codes.contains(&c2900_duplex_status(value)));
            assert!(codes.contains(&sw_port_duplex_status(value)));
            assert!(codes.contains(&dot3_duplex_status(value)));
            for state in -1..=3 {
                assert!(codes.contains(&linkbeat(value, state)));
            }
        }
    }

    #[test]
    fn linkbeat_table() {
        assert_eq!(linkbeat(2, 2), FULL);
        assert_eq!(linkbeat(2, 1), HALF);
        assert_eq!(linkbeat(3, 2), FULL_AUTO);
        assert_eq!(linkbeat(3, 1), HALF_AUTO);
        assert_eq!(linkbeat(1, 1), UNKNOWN);
    }

    #[test]
    fn sources_are_tried_in_priority_order() {
        assert_eq!(canonical(&InterfaceFacts::default()), UNKNOWN);

        let mut facts = InterfaceFacts {
            dot3_duplex_status: Some(3),
            ..Default::default()
        };
        assert_eq!(canonical(&facts), FULL);

        facts.c2900_linkbeat_status = Some(3);
        facts.c2900_duplex_state = Some(1);
        assert_eq!(canonical(&facts), HALF_AUTO);

        facts.sw_port_duplex_status = Some(3);
        assert_eq!(canonical(&facts), FULL_AUTO);

        facts.c2900_duplex_status = Some(2);
        assert_eq!(canonical(&facts), HALF);

        facts.port_duplex = Some(4);
        assert_eq!(canonical(&facts), UNKNOWN);
    }

    #[test]
    fn half_a_linkbeat_pair_is_not_enough() {
        let facts = InterfaceFacts {
            c2900_linkbeat_status: Some(3),
            ..Default::default()
        };
        assert_eq!(canonical(&facts), UNKNOWN);
    }
}
