//! Backend instance registry
//!
//! Tracks the live backend instances the proxy is allowed to relay to. The
//! relay treats this purely as a liveness oracle: an instance that is not
//! registered does not get dialed.

use crate::config::InstanceConfig;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A registered backend instance.
///
/// Identified by IP address, and optionally addressable by a human-friendly
/// alias within a session.
#[derive(Debug, Clone)]
pub struct Instance {
    /// Dotted-decimal address the instance is reachable at
    pub ip: String,

    /// Session prefix this instance belongs to, if any
    pub session: Option<String>,

    /// Alias the instance can be addressed by within its session
    pub alias: Option<String>,
}

impl Instance {
    pub fn new(config: InstanceConfig) -> Self {
        Self {
            ip: config.ip,
            session: config.session,
            alias: config.alias,
        }
    }
}

/// Registry of live backend instances.
#[derive(Debug, Clone, Default)]
pub struct InstanceRegistry {
    instances: Arc<RwLock<Vec<Instance>>>,
}

impl InstanceRegistry {
    /// Create a new registry seeded from configuration.
    pub fn new(configs: Vec<InstanceConfig>) -> Self {
        let instances = configs.into_iter().map(Instance::new).collect();

        Self {
            instances: Arc::new(RwLock::new(instances)),
        }
    }

    /// Register a new live instance.
    pub async fn register(&self, instance: Instance) {
        tracing::info!(ip = %instance.ip, "Instance registered");
        self.instances.write().await.push(instance);
    }

    /// Remove an instance by IP. Returns whether anything was removed.
    pub async fn remove_by_ip(&self, ip: &str) -> bool {
        let mut instances = self.instances.write().await;
        let before = instances.len();
        instances.retain(|i| i.ip != ip);

        let removed = instances.len() < before;
        if removed {
            tracing::info!(ip = %ip, "Instance removed");
        }
        removed
    }

    /// Look up an instance by (session prefix, alias).
    pub async fn find_by_alias(&self, session_prefix: &str, alias: &str) -> Option<Instance> {
        self.instances
            .read()
            .await
            .iter()
            .find(|i| {
                i.session.as_deref() == Some(session_prefix) && i.alias.as_deref() == Some(alias)
            })
            .cloned()
    }

    /// Look up an instance by IP address.
    pub async fn find_by_ip(&self, ip: &str) -> Option<Instance> {
        self.instances
            .read()
            .await
            .iter()
            .find(|i| i.ip == ip)
            .cloned()
    }

    /// Number of registered instances.
    pub async fn count(&self) -> usize {
        self.instances.read().await.len()
    }
}
