//! Resource kind definitions
//!
//! This module provides the closed set of resource kinds the inspection tools
//! know how to address, together with their API coordinates. Adding a kind
//! means adding a variant and its row in `as_str`, `aliases` and
//! `coordinates`; nothing in the walker or the aggregator changes.

use std::fmt;
use std::str::FromStr;

use super::coordinates::ResourceCoordinates;
use crate::error::{Error, Result};

/// Enumeration of all resource kinds known to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    // Core workloads
    Pod,
    Deployment,
    ReplicaSet,
    StatefulSet,
    DaemonSet,
    Job,
    CronJob,
    // Core resources
    Service,
    ConfigMap,
    Secret,
    Namespace,
    Node,
    Event,
    PersistentVolumeClaim,
    PersistentVolume,
    ServiceAccount,
    Ingress,
    // Metrics server
    PodMetrics,
    NodeMetrics,
    // Rancher
    ProvisioningCluster,
    ManagementCluster,
    Project,
    // Cluster API
    Machine,
    MachineSet,
    MachineDeployment,
}

impl ResourceKind {
    /// Canonical kind name as it appears in `kind` and owner references
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Pod => "Pod",
            ResourceKind::Deployment => "Deployment",
            ResourceKind::ReplicaSet => "ReplicaSet",
            ResourceKind::StatefulSet => "StatefulSet",
            ResourceKind::DaemonSet => "DaemonSet",
            ResourceKind::Job => "Job",
            ResourceKind::CronJob => "CronJob",
            ResourceKind::Service => "Service",
            ResourceKind::ConfigMap => "ConfigMap",
            ResourceKind::Secret => "Secret",
            ResourceKind::Namespace => "Namespace",
            ResourceKind::Node => "Node",
            ResourceKind::Event => "Event",
            ResourceKind::PersistentVolumeClaim => "PersistentVolumeClaim",
            ResourceKind::PersistentVolume => "PersistentVolume",
            ResourceKind::ServiceAccount => "ServiceAccount",
            ResourceKind::Ingress => "Ingress",
            ResourceKind::PodMetrics => "PodMetrics",
            ResourceKind::NodeMetrics => "NodeMetrics",
            // Both Rancher cluster types are literally `kind: Cluster`
            ResourceKind::ProvisioningCluster => "Cluster",
            ResourceKind::ManagementCluster => "Cluster",
            ResourceKind::Project => "Project",
            ResourceKind::Machine => "Machine",
            ResourceKind::MachineSet => "MachineSet",
            ResourceKind::MachineDeployment => "MachineDeployment",
        }
    }

    /// Lowercase names accepted by [`resolve`]
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Pod => &["pod", "pods", "po"],
            ResourceKind::Deployment => &["deployment", "deployments", "deploy"],
            ResourceKind::ReplicaSet => &["replicaset", "replicasets", "rs"],
            ResourceKind::StatefulSet => &["statefulset", "statefulsets", "sts"],
            ResourceKind::DaemonSet => &["daemonset", "daemonsets", "ds"],
            ResourceKind::Job => &["job", "jobs"],
            ResourceKind::CronJob => &["cronjob", "cronjobs", "cj"],
            ResourceKind::Service => &["service", "services", "svc"],
            ResourceKind::ConfigMap => &["configmap", "configmaps", "cm"],
            ResourceKind::Secret => &["secret", "secrets"],
            ResourceKind::Namespace => &["namespace", "namespaces", "ns"],
            ResourceKind::Node => &["node", "nodes", "no"],
            ResourceKind::Event => &["event", "events", "ev"],
            ResourceKind::PersistentVolumeClaim => {
                &["persistentvolumeclaim", "persistentvolumeclaims", "pvc"]
            }
            ResourceKind::PersistentVolume => &["persistentvolume", "persistentvolumes", "pv"],
            ResourceKind::ServiceAccount => &["serviceaccount", "serviceaccounts", "sa"],
            ResourceKind::Ingress => &["ingress", "ingresses", "ing"],
            ResourceKind::PodMetrics => &["pod.metrics.k8s.io", "podmetrics"],
            ResourceKind::NodeMetrics => &["node.metrics.k8s.io", "nodemetrics"],
            ResourceKind::ProvisioningCluster => &[
                "provisioningcluster",
                "provisioningclusters",
                "cluster.provisioning.cattle.io",
            ],
            ResourceKind::ManagementCluster => &[
                "cluster",
                "clusters",
                "managementcluster",
                "managementclusters",
                "cluster.management.cattle.io",
            ],
            ResourceKind::Project => &["project", "projects"],
            ResourceKind::Machine => &["machine", "machines"],
            ResourceKind::MachineSet => &["machineset", "machinesets", "ms"],
            ResourceKind::MachineDeployment => &["machinedeployment", "machinedeployments", "md"],
        }
    }

    /// API coordinates for this kind
    pub fn coordinates(&self) -> ResourceCoordinates {
        let (group, version, plural) = match self {
            ResourceKind::Pod => ("", "v1", "pods"),
            ResourceKind::Deployment => ("apps", "v1", "deployments"),
            ResourceKind::ReplicaSet => ("apps", "v1", "replicasets"),
            ResourceKind::StatefulSet => ("apps", "v1", "statefulsets"),
            ResourceKind::DaemonSet => ("apps", "v1", "daemonsets"),
            ResourceKind::Job => ("batch", "v1", "jobs"),
            ResourceKind::CronJob => ("batch", "v1", "cronjobs"),
            ResourceKind::Service => ("", "v1", "services"),
            ResourceKind::ConfigMap => ("", "v1", "configmaps"),
            ResourceKind::Secret => ("", "v1", "secrets"),
            ResourceKind::Namespace => ("", "v1", "namespaces"),
            ResourceKind::Node => ("", "v1", "nodes"),
            ResourceKind::Event => ("events.k8s.io", "v1", "events"),
            ResourceKind::PersistentVolumeClaim => ("", "v1", "persistentvolumeclaims"),
            ResourceKind::PersistentVolume => ("", "v1", "persistentvolumes"),
            ResourceKind::ServiceAccount => ("", "v1", "serviceaccounts"),
            ResourceKind::Ingress => ("networking.k8s.io", "v1", "ingresses"),
            ResourceKind::PodMetrics => ("metrics.k8s.io", "v1beta1", "pods"),
            ResourceKind::NodeMetrics => ("metrics.k8s.io", "v1beta1", "nodes"),
            ResourceKind::ProvisioningCluster => ("provisioning.cattle.io", "v1", "clusters"),
            ResourceKind::ManagementCluster => ("management.cattle.io", "v3", "clusters"),
            ResourceKind::Project => ("management.cattle.io", "v3", "projects"),
            ResourceKind::Machine => ("cluster.x-k8s.io", "v1beta1", "machines"),
            ResourceKind::MachineSet => ("cluster.x-k8s.io", "v1beta1", "machinesets"),
            ResourceKind::MachineDeployment => {
                ("cluster.x-k8s.io", "v1beta1", "machinedeployments")
            }
        };
        ResourceCoordinates::new(group, version, plural, self.as_str())
    }

    /// Get all resource kinds
    pub fn all() -> &'static [Self] {
        &[
            ResourceKind::Pod,
            ResourceKind::Deployment,
            ResourceKind::ReplicaSet,
            ResourceKind::StatefulSet,
            ResourceKind::DaemonSet,
            ResourceKind::Job,
            ResourceKind::CronJob,
            ResourceKind::Service,
            ResourceKind::ConfigMap,
            ResourceKind::Secret,
            ResourceKind::Namespace,
            ResourceKind::Node,
            ResourceKind::Event,
            ResourceKind::PersistentVolumeClaim,
            ResourceKind::PersistentVolume,
            ResourceKind::ServiceAccount,
            ResourceKind::Ingress,
            ResourceKind::PodMetrics,
            ResourceKind::NodeMetrics,
            ResourceKind::ProvisioningCluster,
            ResourceKind::ManagementCluster,
            ResourceKind::Project,
            ResourceKind::Machine,
            ResourceKind::MachineSet,
            ResourceKind::MachineDeployment,
        ]
    }

    /// Try to parse a string (case-insensitive) into a ResourceKind
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.aliases().contains(&lower.as_str()))
    }

    /// Whether an owner reference kind names this resource kind
    ///
    /// Owner references carry the canonical kind, so the comparison is exact.
    pub fn matches_owner_kind(&self, owner_kind: &str) -> bool {
        self.as_str() == owner_kind
    }
}

/// Resolve a loosely-typed kind name to its API coordinates
pub fn resolve(kind: &str) -> Result<ResourceCoordinates> {
    ResourceKind::from_str_case_insensitive(kind)
        .map(|k| k.coordinates())
        .ok_or_else(|| Error::UnknownKind(kind.to_string()))
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_case_insensitive(s).ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str() {
        assert_eq!(ResourceKind::ReplicaSet.as_str(), "ReplicaSet");
        assert_eq!(ResourceKind::MachineSet.as_str(), "MachineSet");
        assert_eq!(ResourceKind::ProvisioningCluster.as_str(), "Cluster");
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!(
            ResourceKind::from_str_case_insensitive("Pod"),
            Some(ResourceKind::Pod)
        );
        assert_eq!(
            ResourceKind::from_str_case_insensitive("POD.METRICS.K8S.IO"),
            Some(ResourceKind::PodMetrics)
        );
        assert_eq!(
            ResourceKind::from_str_case_insensitive("cluster"),
            Some(ResourceKind::ManagementCluster)
        );
        assert_eq!(ResourceKind::from_str_case_insensitive("widget"), None);
    }

    #[test]
    fn test_aliases_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for kind in ResourceKind::all() {
            for alias in kind.aliases() {
                assert!(seen.insert(*alias), "alias {} registered twice", alias);
                assert_eq!(*alias, alias.to_lowercase());
            }
        }
    }

    #[test]
    fn test_resolve_unknown() {
        let err = resolve("gizmo").unwrap_err();
        assert!(matches!(err, Error::UnknownKind(ref k) if k == "gizmo"));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ResourceKind::MachineDeployment), "MachineDeployment");
    }
}
