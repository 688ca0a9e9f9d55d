// SNMP access: credential resolution, sessions and MIB collection.

pub(crate) mod agent;
pub(crate) mod credentials;
pub(crate) mod mib;
pub(crate) mod oid;
pub(crate) mod poller;
pub(crate) mod session;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnmpError {
    /// Malformed OID in a query; a programming error, never a device fault.
    #[error("invalid OID {0:?}")]
    InvalidOid(String),
    #[error("{host} is unreachable: {reason}")]
    Unreachable { host: String, reason: String },
    #[error("SNMP failure from {host}: {reason}")]
    Protocol { host: String, reason: String },
}

impl SnmpError {
    /// Errors that must stop the whole process rather than one host.
    /// Only an unreachable device is left to the next cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SnmpError::InvalidOid(_) | SnmpError::Protocol { .. })
    }
}

/// A polled value after normalization.
///
/// Strings, addresses, OIDs and opaque data are kept as raw bytes; every
/// numeric SNMP type becomes a signed integer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnmpValue {
    Bytes(Vec<u8>),
    Integer(i64),
    Null,
}

impl SnmpValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SnmpValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            SnmpValue::Bytes(value) => Some(value),
            _ => None,
        }
    }

    /// Lossy UTF-8 text with trailing NULs and whitespace removed.
    pub fn as_text(&self) -> Option<String> {
        let bytes = self.as_bytes()?;
        let text = String::from_utf8_lossy(bytes);
        let text = text.trim_end_matches(['\0', ' ', '\r', '\n']);
        Some(text.to_string())
    }
}
