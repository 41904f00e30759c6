//! Data structures for ownership walks

use std::collections::HashSet;

use crate::models::{GenericResource, OwnerReference, ResourceIdentity, ResourceKind};

/// Ownership patterns the walker knows how to follow
///
/// Each chain is a leaf kind plus two hops. A hop lists the owner kinds it
/// accepts, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerChain {
    /// Pod -> ReplicaSet -> Deployment | StatefulSet | DaemonSet
    Workload,
    /// Machine -> MachineSet -> MachineDeployment
    Machine,
}

impl OwnerChain {
    pub fn leaf(&self) -> ResourceKind {
        match self {
            OwnerChain::Workload => ResourceKind::Pod,
            OwnerChain::Machine => ResourceKind::Machine,
        }
    }

    /// Kinds accepted for the first hop
    pub fn intermediates(&self) -> &'static [ResourceKind] {
        match self {
            OwnerChain::Workload => &[ResourceKind::ReplicaSet],
            OwnerChain::Machine => &[ResourceKind::MachineSet],
        }
    }

    /// Kinds accepted for the second hop
    pub fn top_level(&self) -> &'static [ResourceKind] {
        match self {
            OwnerChain::Workload => &[
                ResourceKind::Deployment,
                ResourceKind::StatefulSet,
                ResourceKind::DaemonSet,
            ],
            OwnerChain::Machine => &[ResourceKind::MachineDeployment],
        }
    }

    pub fn hops(&self) -> [&'static [ResourceKind]; 2] {
        [self.intermediates(), self.top_level()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerChain::Workload => "workload",
            OwnerChain::Machine => "machine",
        }
    }
}

/// Pick the owner to follow for a hop
///
/// Preference follows the order of `kinds`, not the order of the references.
/// Owners of any other kind are ignored.
pub fn select_owner<'a>(
    owners: &'a [OwnerReference],
    kinds: &[ResourceKind],
) -> Option<(ResourceKind, &'a OwnerReference)> {
    kinds.iter().find_map(|kind| {
        owners
            .iter()
            .find(|owner| kind.matches_owner_kind(&owner.kind))
            .map(|owner| (*kind, owner))
    })
}

/// Result of a single-chain walk
#[derive(Debug, Clone, PartialEq)]
pub struct ChainWalk {
    pub start: GenericResource,
    /// Owners found, nearest first
    pub ancestors: Vec<GenericResource>,
}

impl ChainWalk {
    /// The furthest ancestor reached, if any
    pub fn deepest(&self) -> Option<&GenericResource> {
        self.ancestors.last()
    }

    /// Whether every hop of the chain found an owner
    pub fn is_complete(&self, chain: OwnerChain) -> bool {
        self.ancestors.len() == chain.hops().len()
    }
}

/// Result of a fan-out walk, each tier in first-encountered order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FanOut {
    pub leaves: Vec<GenericResource>,
    pub intermediates: Vec<GenericResource>,
    pub top_level: Vec<GenericResource>,
}

impl FanOut {
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty() && self.intermediates.is_empty() && self.top_level.is_empty()
    }

    /// All tiers flattened, leaves first
    pub fn into_resources(self) -> Vec<GenericResource> {
        let mut resources = self.leaves;
        resources.extend(self.intermediates);
        resources.extend(self.top_level);
        resources
    }
}

/// Resources already fetched (or emitted) during one traversal
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<ResourceIdentity>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an identity; false if it was already present
    pub fn insert(&mut self, identity: ResourceIdentity) -> bool {
        self.seen.insert(identity)
    }

    pub fn contains(&self, identity: &ResourceIdentity) -> bool {
        self.seen.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
