// Transport seam between sessions and the async-snmp client.

use std::time::Duration;

use async_snmp::{client::Retry, Auth, AuthProtocol, Client, Oid, PrivProtocol, VarBind};
use async_trait::async_trait;

use crate::config::CredentialProfile;
use crate::snmp::SnmpError;

/// GETBULK max-repetitions used for every walk.
const MAX_REPETITIONS: i32 = 25;

/// One authenticated SNMP conversation with a single device.
#[async_trait]
pub(crate) trait SnmpAgent: Send + Sync {
    async fn get(&self, oid: &Oid) -> async_snmp::Result<VarBind>;

    /// Every varbind below `oid`, in agent order.
    async fn walk(&self, oid: &Oid) -> async_snmp::Result<Vec<VarBind>>;
}

/// Opens agents for a host with a given credential profile.
#[async_trait]
pub(crate) trait Connector: Send + Sync {
    async fn connect(
        &self,
        host: &str,
        profile: &CredentialProfile,
    ) -> Result<Box<dyn SnmpAgent>, SnmpError>;
}

pub(crate) struct ClientAgent {
    client: Client,
}

#[async_trait]
impl SnmpAgent for ClientAgent {
    async fn get(&self, oid: &Oid) -> async_snmp::Result<VarBind> {
        self.client.get(oid).await
    }

    async fn walk(&self, oid: &Oid) -> async_snmp::Result<Vec<VarBind>> {
        // GETBULK with non-repeaters = 0.
        self.client
            .bulk_walk(oid.clone(), MAX_REPETITIONS)
            .collect()
            .await
    }
}

/// Production connector: one UDP client per host and profile.
pub(crate) struct UdpConnector {
    timeout: Duration,
    retries: u32,
}

impl UdpConnector {
    pub(crate) fn new(timeout: Duration, retries: u32) -> Self {
        UdpConnector { timeout, retries }
    }
}

#[async_trait]
impl Connector for UdpConnector {
    async fn connect(
        &self,
        host: &str,
        profile: &CredentialProfile,
    ) -> Result<Box<dyn SnmpAgent>, SnmpError> {
        let auth = auth_for(host, profile)?;
        let target = if host.contains(':') {
            format!("[{}]:{}", host, profile.port)
        } else {
            format!("{}:{}", host, profile.port)
        };
        let client = Client::builder(target, auth)
            .timeout(self.timeout)
            .retry(Retry::fixed(self.retries, Duration::ZERO))
            .connect()
            .await
            .map_err(|e| SnmpError::Unreachable {
                host: host.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Box::new(ClientAgent { client }))
    }
}

/// Build v2c community or v3 USM authentication from a profile.
fn auth_for(host: &str, profile: &CredentialProfile) -> Result<Auth, SnmpError> {
    let protocol_error = |reason: String| SnmpError::Protocol {
        host: host.to_string(),
        reason: format!("credential group {}: {}", profile.group, reason),
    };
    match profile.version {
        2 => {
            let community = profile
                .community
                .as_deref()
                .ok_or_else(|| protocol_error("missing community".to_string()))?;
            Ok(Auth::v2c(community))
        }
        3 => {
            let secname = profile
                .secname
                .as_deref()
                .ok_or_else(|| protocol_error("missing secname".to_string()))?;
            let mut usm = Auth::usm(secname);
            if let Some(name) = profile.authprotocol.as_deref() {
                let protocol: AuthProtocol =
                    name.parse().map_err(|e| protocol_error(format!("{}", e)))?;
                let password = profile.authpassword.clone().unwrap_or_default();
                usm = usm.auth(protocol, password);
                if let Some(name) = profile.privprotocol.as_deref() {
                    let protocol: PrivProtocol =
                        name.parse().map_err(|e| protocol_error(format!("{}", e)))?;
                    let password = profile.privpassword.clone().unwrap_or_default();
                    usm = usm.privacy(protocol, password);
                }
            }
            Ok(usm.into())
        }
        other => Err(protocol_error(format!("unsupported SNMP version {}", other))),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::v2c;

    #[test]
    fn builds_usm_auth_from_profile() {
        let mut profile = v2c("core", "unused");
        profile.version = 3;
        profile.secname = Some("poller".to_string());
        profile.authprotocol = Some("sha256".to_string());
        profile.authpassword = Some("authpassword".to_string());
        profile.privprotocol = Some("aes".to_string());
        profile.privpassword = Some("privpassword".to_string());
        assert!(auth_for("sw1", &profile).is_ok());

        profile.authprotocol = Some("rot13".to_string());
        assert!(matches!(
            auth_for("sw1", &profile),
            Err(SnmpError::Protocol { .. })
        ));
    }

    #[test]
    fn v2c_requires_a_community() {
        let mut profile = v2c("campus", "public");
        assert!(auth_for("sw1", &profile).is_ok());
        profile.community = None;
        assert!(auth_for("sw1", &profile).is_err());
    }
}
