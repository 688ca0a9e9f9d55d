// OID string handling shared by the session and MIB pollers.

use crate::snmp::SnmpError;

/// Check that an OID is written as `.1.3.6...`.
///
/// A malformed OID is a programming error in a MIB table, never a property of
/// the device being polled, so callers treat the error as fatal.
pub(crate) fn validate(oid: &str) -> Result<(), SnmpError> {
    let invalid = || SnmpError::InvalidOid(oid.to_string());
    let body = oid.strip_prefix('.').ok_or_else(invalid)?;
    if body.is_empty() || body.ends_with('.') {
        return Err(invalid());
    }
    for arc in body.split('.') {
        if arc.is_empty() || !arc.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        arc.parse::<u32>().map_err(|_| invalid())?;
    }
    Ok(())
}

/// Format arcs in the dotted, leading-dot form used for result keys.
pub(crate) fn dotted(arcs: &[u32]) -> String {
    let mut out = String::with_capacity(arcs.len() * 4);
    for arc in arcs {
        out.push('.');
        out.push_str(&arc.to_string());
    }
    out
}

/// Arcs of `full` below `base`, or None when `full` is outside the subtree.
pub(crate) fn suffix(base: &str, full: &str) -> Option<Vec<u32>> {
    let rest = full.strip_prefix(base)?;
    if rest.is_empty() {
        return Some(Vec::new());
    }
    let rest = rest.strip_prefix('.')?;
    rest.split('.').map(|arc| arc.parse().ok()).collect()
}
