// GET and WALK against one device, with failure classification and value
// normalization.

use std::collections::BTreeMap;

use async_snmp::{Error, ErrorStatus, Oid, Value};
use log::debug;

use crate::snmp::agent::SnmpAgent;
use crate::snmp::{mib, oid, SnmpError, SnmpValue};

/// Result of a single GET.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Query {
    pub(crate) exists: bool,
    pub(crate) value: SnmpValue,
}

impl Query {
    fn absent() -> Self {
        Query {
            exists: false,
            value: SnmpValue::Null,
        }
    }
}

pub(crate) struct Session {
    host: String,
    agent: Box<dyn SnmpAgent>,
}

enum Failure {
    Absent,
    Error(SnmpError),
}

impl Session {
    pub(crate) fn new(host: &str, agent: Box<dyn SnmpAgent>) -> Self {
        Session {
            host: host.to_string(),
            agent,
        }
    }

    pub(crate) fn host(&self) -> &str {
        &self.host
    }

    /// True if the device answers a sysObjectID probe. Never errors.
    pub(crate) async fn contactable(&self) -> bool {
        let Ok(probe) = parse(mib::SYS_OBJECT_ID) else {
            return false;
        };
        match self.agent.get(&probe).await {
            Ok(_) => true,
            Err(e) => {
                debug!("{}: probe failed: {}", self.host, e);
                false
            }
        }
    }

    pub(crate) async fn get(&self, oid: &str) -> Result<Query, SnmpError> {
        let parsed = parse(oid)?;
        match self.agent.get(&parsed).await {
            Ok(varbind) => Ok(match normalize(varbind.value) {
                Some(value) => Query {
                    exists: true,
                    value,
                },
                None => Query::absent(),
            }),
            Err(e) => match self.classify(*e) {
                Failure::Absent => Ok(Query::absent()),
                Failure::Error(e) => Err(e),
            },
        }
    }

    /// Walk a subtree keyed by full dotted OID (`.1.3.6...`).
    pub(crate) async fn walk(&self, oid: &str) -> Result<BTreeMap<String, SnmpValue>, SnmpError> {
        Ok(self
            .walk_raw(oid)
            .await?
            .into_iter()
            .map(|(arcs, value)| (oid::dotted(&arcs), value))
            .collect())
    }

    /// Walk a subtree keyed by the last OID arc, for ifIndex-style tables.
    pub(crate) async fn walk_normalized(
        &self,
        oid: &str,
    ) -> Result<BTreeMap<u32, SnmpValue>, SnmpError> {
        Ok(self
            .walk_raw(oid)
            .await?
            .into_iter()
            .filter_map(|(arcs, value)| arcs.last().map(|last| (*last, value)))
            .collect())
    }

    /// Walk a subtree keeping every arc below `oid`, for composite indexes.
    pub(crate) async fn walk_suffixed(
        &self,
        oid: &str,
    ) -> Result<Vec<(Vec<u32>, SnmpValue)>, SnmpError> {
        let base = parse(oid)?;
        let base_len = base.arcs().len();
        Ok(self
            .walk_raw(oid)
            .await?
            .into_iter()
            .map(|(arcs, value)| (arcs[base_len..].to_vec(), value))
            .collect())
    }

    async fn walk_raw(&self, oid: &str) -> Result<Vec<(Vec<u32>, SnmpValue)>, SnmpError> {
        let parsed = parse(oid)?;
        let base = parsed.arcs();
        let varbinds = match self.agent.walk(&parsed).await {
            Ok(varbinds) => varbinds,
            Err(e) => match self.classify(*e) {
                Failure::Absent => return Ok(Vec::new()),
                Failure::Error(e) => return Err(e),
            },
        };
        Ok(varbinds
            .into_iter()
            .filter(|varbind| {
                let arcs = varbind.oid.arcs();
                arcs.len() > base.len() && arcs.starts_with(base)
            })
            .filter_map(|varbind| {
                let arcs = varbind.oid.arcs().to_vec();
                normalize(varbind.value).map(|value| (arcs, value))
            })
            .collect())
    }

    fn classify(&self, error: Error) -> Failure {
        match error {
            Error::Timeout { .. } | Error::Network { .. } => Failure::Error(SnmpError::Unreachable {
                host: self.host.clone(),
                reason: error.to_string(),
            }),
            Error::Snmp {
                status: ErrorStatus::NoSuchName,
                ..
            } => Failure::Absent,
            Error::InvalidOid(oid) => Failure::Error(SnmpError::InvalidOid(oid.to_string())),
            other => Failure::Error(SnmpError::Protocol {
                host: self.host.clone(),
                reason: other.to_string(),
            }),
        }
    }
}

fn parse(dotted: &str) -> Result<Oid, SnmpError> {
    oid::validate(dotted)?;
    Oid::parse(&dotted[1..]).map_err(|_| SnmpError::InvalidOid(dotted.to_string()))
}

/// Map a wire value to its normalized form, or None for the
/// noSuchObject/noSuchInstance/endOfMibView exceptions.
fn normalize(value: Value) -> Option<SnmpValue> {
    let normalized = match value {
        Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => return None,
        Value::Null => SnmpValue::Null,
        Value::Integer(n) => SnmpValue::Integer(i64::from(n)),
        Value::Counter32(n) | Value::Gauge32(n) | Value::TimeTicks(n) => {
            SnmpValue::Integer(i64::from(n))
        }
        Value::Counter64(n) => SnmpValue::Integer(i64::try_from(n).unwrap_or(i64::MAX)),
        Value::OctetString(bytes) | Value::Opaque(bytes) => SnmpValue::Bytes(bytes.to_vec()),
        Value::IpAddress(octets) => SnmpValue::Bytes(octets.to_vec()),
        Value::ObjectIdentifier(oid) => SnmpValue::Bytes(oid::dotted(oid.arcs()).into_bytes()),
        Value::Unknown { data, .. } => SnmpValue::Bytes(data.to_vec()),
        _ => SnmpValue::Null,
    };
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snmp::agent::fake::FakeAgent;

    fn session() -> Session {
        let mut agent = FakeAgent::default();
        agent.set(mib::SYS_DESCR, "Cisco IOS".into());
        agent.set(".1.3.6.1.2.1.2.2.1.3.1", Value::Integer(6));
        agent.set(".1.3.6.1.2.1.2.2.1.3.2", Value::Integer(24));
        agent.set(".1.3.6.1.2.1.2.2.1.5.1", Value::Gauge32(1_000_000_000));
        agent.set(".1.3.6.1.2.1.17.4.3.1.2.0.17.34.51.68.85", Value::Integer(3));
        Session::new("sw1", Box::new(agent))
    }

    #[tokio::test]
    async fn get_reports_existence() {
        let session = session();
        let query = session.get(mib::SYS_DESCR).await.unwrap();
        assert!(query.exists);
        assert_eq!(query.value.as_text().as_deref(), Some("Cisco IOS"));

        let query = session.get(mib::SYS_NAME).await.unwrap();
        assert!(!query.exists);
        assert_eq!(query.value, SnmpValue::Null);
    }

    #[tokio::test]
    async fn malformed_oids_fail_before_any_request() {
        let session = session();
        for bad in ["1.3.6", ".1.3.", ".1.x.3", "."] {
            let err = session.get(bad).await.unwrap_err();
            assert!(err.is_fatal(), "{bad}");
            assert!(session.walk(bad).await.unwrap_err().is_fatal());
        }
    }

    #[tokio::test]
    async fn walks_are_keyed_three_ways() {
        let session = session();

        let full = session.walk(mib::IF_TYPE).await.unwrap();
        assert_eq!(
            full.get(".1.3.6.1.2.1.2.2.1.3.2"),
            Some(&SnmpValue::Integer(24))
        );

        let by_index = session.walk_normalized(mib::IF_TYPE).await.unwrap();
        assert_eq!(by_index.len(), 2);
        assert_eq!(by_index[&1], SnmpValue::Integer(6));
        // A sibling column must not leak into the walk.
        assert!(!by_index.values().any(|v| *v == SnmpValue::Integer(1_000_000_000)));

        let suffixed = session.walk_suffixed(mib::DOT1D_TP_FDB_PORT).await.unwrap();
        assert_eq!(
            suffixed,
            vec![(vec![0, 17, 34, 51, 68, 85], SnmpValue::Integer(3))]
        );

        assert!(session.walk_normalized(mib::VM_VLAN).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn timeouts_are_unreachable_except_when_probing() {
        let agent = FakeAgent {
            unreachable: true,
            ..Default::default()
        };
        let session = Session::new("sw9", Box::new(agent));
        assert!(!session.contactable().await);
        let err = session.get(mib::SYS_DESCR).await.unwrap_err();
        assert!(matches!(err, SnmpError::Unreachable { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn values_normalize_to_bytes_or_integers() {
        assert_eq!(
            normalize(Value::IpAddress([10, 0, 0, 1])),
            Some(SnmpValue::Bytes(vec![10, 0, 0, 1]))
        );
        assert_eq!(
            normalize(Value::TimeTicks(4200)),
            Some(SnmpValue::Integer(4200))
        );
        assert_eq!(
            normalize(Value::Counter64(u64::MAX)),
            Some(SnmpValue::Integer(i64::MAX))
        );
        assert_eq!(
            normalize(Value::ObjectIdentifier(Oid::from_slice(&[1, 3, 6, 1, 4, 1, 9]))),
            Some(SnmpValue::Bytes(b".1.3.6.1.4.1.9".to_vec()))
        );
        assert_eq!(normalize(Value::Null), Some(SnmpValue::Null));
        assert_eq!(normalize(Value::EndOfMibView), None);
    }
}
