// Per-host SNMP credential discovery with a one-line group cache.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::config::CredentialProfile;
use crate::snmp::agent::Connector;
use crate::snmp::session::Session;

/// The profile that authenticated, with a session ready to poll.
pub(crate) struct Resolved {
    pub(crate) profile: CredentialProfile,
    pub(crate) session: Session,
}

#[derive(Clone)]
pub(crate) struct CredentialResolver {
    connector: Arc<dyn Connector>,
    cache_dir: PathBuf,
}

impl CredentialResolver {
    /// Cached group names live in `<cache_dir>/snmp/<host>`.
    pub(crate) fn new(connector: Arc<dyn Connector>, cache_dir: &Path) -> Self {
        CredentialResolver {
            connector,
            cache_dir: cache_dir.join("snmp"),
        }
    }

    /// Find the first enabled profile that authenticates against `host`,
    /// trying the cached group before walking the list in order.
    pub(crate) async fn resolve(
        &self,
        host: &str,
        profiles: &[CredentialProfile],
    ) -> Option<Resolved> {
        let enabled: Vec<&CredentialProfile> = profiles.iter().filter(|p| p.enabled).collect();
        let cached = self.cached_group(host).await;

        if let Some(group) = &cached {
            for profile in enabled.iter().filter(|p| &p.group == group) {
                if let Some(session) = self.probe(host, profile).await {
                    return Some(Resolved {
                        profile: (*profile).clone(),
                        session,
                    });
                }
            }
            info!("{}: cached credential group {} failed, probing all", host, group);
        }

        for profile in enabled {
            if cached.as_ref() == Some(&profile.group) {
                continue;
            }
            if let Some(session) = self.probe(host, profile).await {
                self.store_group(host, &profile.group).await;
                return Some(Resolved {
                    profile: profile.clone(),
                    session,
                });
            }
        }
        None
    }

    async fn probe(&self, host: &str, profile: &CredentialProfile) -> Option<Session> {
        let agent = match self.connector.connect(host, profile).await {
            Ok(agent) => agent,
            Err(e) => {
                debug!("{}: group {}: {}", host, profile.group, e);
                return None;
            }
        };
        let session = Session::new(host, agent);
        if session.contactable().await {
            debug!("{}: authenticated with group {}", host, profile.group);
            Some(session)
        } else {
            None
        }
    }

    fn cache_file(&self, host: &str) -> PathBuf {
        let name: String = host
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.cache_dir.join(name)
    }

    async fn cached_group(&self, host: &str) -> Option<String> {
        let contents = tokio::fs::read_to_string(self.cache_file(host)).await.ok()?;
        let group = contents.lines().next()?.trim();
        if group.is_empty() {
            None
        } else {
            Some(group.to_string())
        }
    }

    async fn store_group(&self, host: &str, group: &str) {
        let result = async {
            tokio::fs::create_dir_all(&self.cache_dir).await?;
            tokio::fs::write(self.cache_file(host), format!("{}\n", group)).await
        }
        .await;
        if let Err(e) = result {
            warn!("{}: failed to cache credential group {}: {}", host, group, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::v2c;
    use crate::snmp::agent::fake::{FakeAgent, FakeConnector};
    use crate::snmp::mib;
    use async_snmp::Value;

    fn profiles() -> Vec<CredentialProfile> {
        vec![
            v2c("profile-1-name", "one"),
            v2c("profile-2-name", "two"),
            v2c("profile-3-name", "three"),
        ]
    }

    fn connector(host: &str, group: &str) -> FakeConnector {
        let mut agent = FakeAgent::default();
        let enterprise = async_snmp::Oid::from_slice(&[1, 3, 6, 1, 4, 1, 9]);
        agent.set(mib::SYS_OBJECT_ID, Value::ObjectIdentifier(enterprise));
        let mut connector = FakeConnector::default();
        connector.add(host, group, agent);
        connector
    }

    #[tokio::test]
    async fn cached_group_is_tried_first() {
        let dir = tempfile::tempdir().unwrap();
        let connector = connector("r1", "profile-2-name");
        let resolver = CredentialResolver::new(Arc::new(connector.clone()), dir.path());

        let resolved = resolver.resolve("r1", &profiles()).await.unwrap();
        assert_eq!(resolved.profile.group, "profile-2-name");
        assert_eq!(connector.attempts(), 2);
        let cached = std::fs::read_to_string(dir.path().join("snmp").join("r1")).unwrap();
        assert_eq!(cached.trim(), "profile-2-name");

        let resolved = resolver.resolve("r1", &profiles()).await.unwrap();
        assert_eq!(resolved.profile.group, "profile-2-name");
        assert_eq!(resolved.session.host(), "r1");
        // One round trip, no fallback to profiles 1 or 3.
        assert_eq!(connector.attempts(), 3);
    }

    #[tokio::test]
    async fn stale_cache_falls_back_to_list_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("snmp")).unwrap();
        std::fs::write(dir.path().join("snmp").join("r1"), "profile-1-name\n").unwrap();
        let connector = connector("r1", "profile-3-name");
        let resolver = CredentialResolver::new(Arc::new(connector.clone()), dir.path());

        let resolved = resolver.resolve("r1", &profiles()).await.unwrap();
        assert_eq!(resolved.profile.group, "profile-3-name");
        // Cached profile 1, then 2 and 3; profile 1 is not retried.
        assert_eq!(connector.attempts(), 3);
        let cached = std::fs::read_to_string(dir.path().join("snmp").join("r1")).unwrap();
        assert_eq!(cached.trim(), "profile-3-name");
    }

    #[tokio::test]
    async fn disabled_profiles_and_dead_hosts_resolve_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let connector = connector("r1", "profile-2-name");
        let resolver = CredentialResolver::new(Arc::new(connector.clone()), dir.path());

        let mut profiles = profiles();
        profiles[1].enabled = false;
        assert!(resolver.resolve("r1", &profiles).await.is_none());
        assert_eq!(connector.attempts(), 2);

        assert!(resolver.resolve("r2", &self::profiles()).await.is_none());
        assert!(!dir.path().join("snmp").join("r2").exists());
    }
}
