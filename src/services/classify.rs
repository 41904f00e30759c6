//! Cluster provisioning type
//!
//! Derived from the management cluster's status and hosted-provider config
//! blocks plus the number of machine pools on the provisioning cluster.
//! Rules are checked in order and the first match wins.

use std::fmt;

use crate::models::GenericResource;

/// Hosted provider config blocks under the management cluster's `spec`
pub const HOSTED_CONFIG_BLOCKS: &[&str] = &["eksConfig", "aksConfig", "gkeConfig"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterType {
    Imported,
    Hosted,
    Custom,
    NodeDriver,
}

impl ClusterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterType::Imported => "imported",
            ClusterType::Hosted => "hosted",
            ClusterType::Custom => "custom",
            ClusterType::NodeDriver => "node-driver",
        }
    }
}

impl fmt::Display for ClusterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The inputs to classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterFacts {
    pub provider: String,
    pub driver: String,
    /// `imported` flag of the first hosted config block present
    pub hosted: Option<bool>,
    pub machine_pools: usize,
}

impl ClusterFacts {
    /// Read facts from the management cluster (if known) and the provisioning cluster
    pub fn gather(management: Option<&GenericResource>, provisioning: &GenericResource) -> Self {
        let machine_pools = provisioning
            .field(&["spec", "rkeConfig", "machinePools"])
            .and_then(|pools| pools.as_array())
            .map(|pools| pools.len())
            .unwrap_or(0);

        let Some(management) = management else {
            return Self {
                machine_pools,
                ..Self::default()
            };
        };

        let hosted = HOSTED_CONFIG_BLOCKS.iter().find_map(|block| {
            management
                .field(&["spec", *block])
                .filter(|config| config.is_object())
                .map(|config| {
                    config
                        .get("imported")
                        .and_then(|imported| imported.as_bool())
                        .unwrap_or(false)
                })
        });

        Self {
            provider: management
                .str_field(&["status", "provider"])
                .unwrap_or_default()
                .to_string(),
            driver: management
                .str_field(&["status", "driver"])
                .unwrap_or_default()
                .to_string(),
            hosted,
            machine_pools,
        }
    }
}

pub fn classify(facts: &ClusterFacts) -> ClusterType {
    match facts.hosted {
        Some(true) => return ClusterType::Imported,
        Some(false) => return ClusterType::Hosted,
        None => {}
    }
    if !facts.provider.is_empty() && facts.provider == facts.driver {
        return ClusterType::Imported;
    }
    if facts.machine_pools == 0 {
        return ClusterType::Custom;
    }
    ClusterType::NodeDriver
}

/// Classify straight from the two cluster documents
pub fn classify_cluster(
    management: Option<&GenericResource>,
    provisioning: &GenericResource,
) -> ClusterType {
    classify(&ClusterFacts::gather(management, provisioning))
}
