//! Core walk implementation

use crate::error::{Error, Result};
use crate::gateway::{ListQuery, ResourceGateway};
use crate::models::{GenericResource, OwnerReference, ResourceIdentity, ResourceKind, Selector};
use crate::trace::models::{ChainWalk, FanOut, OwnerChain, VisitedSet, select_owner};

/// Fetch one owner, logging and wrapping any failure with its identity
async fn fetch_owner<G>(
    gateway: &G,
    cluster: &str,
    kind: ResourceKind,
    namespace: &str,
    owner: &OwnerReference,
) -> Result<GenericResource>
where
    G: ResourceGateway + ?Sized,
{
    let identity = ResourceIdentity::new(cluster, kind.as_str(), namespace, &owner.name);
    match gateway
        .get_one(cluster, &kind.coordinates(), namespace, &owner.name)
        .await
    {
        Ok(resource) => Ok(resource),
        Err(e) => {
            tracing::error!(
                cluster,
                kind = kind.as_str(),
                namespace,
                name = %owner.name,
                error = %e,
                "Failed to fetch owner"
            );
            Err(Error::fetching(identity, e))
        }
    }
}

/// Walk a single ownership chain upwards from `start`
///
/// Each hop follows the first owner reference matching the hop's kinds. A
/// missing owner ends the walk with whatever was collected so far.
pub async fn walk_owner_chain<G>(
    gateway: &G,
    cluster: &str,
    chain: OwnerChain,
    start: GenericResource,
) -> Result<ChainWalk>
where
    G: ResourceGateway + ?Sized,
{
    let mut visited = VisitedSet::new();
    visited.insert(start.identity(cluster));

    let mut ancestors: Vec<GenericResource> = Vec::new();
    for kinds in chain.hops() {
        let current = ancestors.last().unwrap_or(&start);
        let namespace = current.namespace().to_string();
        let owners = current.owner_references();

        let Some((kind, owner)) = select_owner(&owners, kinds) else {
            tracing::debug!(
                cluster,
                chain = chain.as_str(),
                kind = current.kind(),
                name = current.name(),
                "No owner for next hop, ending walk"
            );
            break;
        };

        let identity = ResourceIdentity::new(cluster, kind.as_str(), &namespace, &owner.name);
        if !visited.insert(identity) {
            tracing::warn!(cluster, kind = kind.as_str(), name = %owner.name, "Ownership cycle");
            break;
        }

        let parent = fetch_owner(gateway, cluster, kind, &namespace, owner).await?;
        ancestors.push(parent);
    }

    Ok(ChainWalk { start, ancestors })
}

/// Deduplicated fan-out walk over leaves, their owners and their owners' owners
///
/// One walker covers one traversal: the visited-set is shared by every
/// [`walk`](FanOutWalker::walk) call, so a machine set shared by several pools
/// is still fetched once.
pub struct FanOutWalker<'a, G: ResourceGateway + ?Sized> {
    gateway: &'a G,
    chain: OwnerChain,
    cluster: String,
    namespace: String,
    visited: VisitedSet,
    out: FanOut,
}

impl<'a, G: ResourceGateway + ?Sized> FanOutWalker<'a, G> {
    pub fn new(gateway: &'a G, chain: OwnerChain, cluster: &str, namespace: &str) -> Self {
        Self {
            gateway,
            chain,
            cluster: cluster.to_string(),
            namespace: namespace.to_string(),
            visited: VisitedSet::new(),
            out: FanOut::default(),
        }
    }

    /// List leaves matching `selector` and resolve their owners
    ///
    /// With `name_filter` set, only the leaf with that name is kept; owners are
    /// looked up for the kept leaves only.
    pub async fn walk(&mut self, selector: &Selector, name_filter: Option<&str>) -> Result<()> {
        let leaf_kind = self.chain.leaf();
        let leaves = match self
            .gateway
            .list_many(
                &self.cluster,
                &leaf_kind.coordinates(),
                &self.namespace,
                &ListQuery::new().selector(selector),
            )
            .await
        {
            Ok(leaves) => leaves,
            Err(e) if e.is_not_found() => {
                tracing::debug!(
                    cluster = %self.cluster,
                    kind = leaf_kind.as_str(),
                    selector = %selector,
                    "Leaf kind not served yet, treating as empty"
                );
                return Ok(());
            }
            Err(e) => {
                tracing::error!(
                    cluster = %self.cluster,
                    kind = leaf_kind.as_str(),
                    namespace = %self.namespace,
                    selector = %selector,
                    error = %e,
                    "Failed to list leaves"
                );
                return Err(e);
            }
        };

        tracing::info!(
            cluster = %self.cluster,
            kind = leaf_kind.as_str(),
            selector = %selector,
            count = leaves.len(),
            "Listed leaves"
        );

        for leaf in leaves {
            if name_filter.is_some_and(|name| leaf.name() != name) {
                continue;
            }
            if !self.visited.insert(leaf.identity(&self.cluster)) {
                continue;
            }
            self.follow_leaf(&leaf).await?;
            self.out.leaves.push(leaf);
        }

        Ok(())
    }

    async fn follow_leaf(&mut self, leaf: &GenericResource) -> Result<()> {
        let owners = leaf.owner_references();
        let Some((kind, owner)) = select_owner(&owners, self.chain.intermediates()) else {
            tracing::info!(
                cluster = %self.cluster,
                kind = leaf.kind(),
                namespace = leaf.namespace(),
                name = leaf.name(),
                "Leaf has no owner of the expected kind"
            );
            return Ok(());
        };

        let Some(intermediate) = self.fetch_once(kind, leaf.namespace(), owner).await? else {
            return Ok(());
        };

        let owners = intermediate.owner_references();
        if let Some((kind, owner)) = select_owner(&owners, self.chain.top_level()) {
            if let Some(top) = self.fetch_once(kind, intermediate.namespace(), owner).await? {
                self.out.top_level.push(top);
            }
        }
        self.out.intermediates.push(intermediate);

        Ok(())
    }

    /// Fetch an owner unless this traversal already has it
    async fn fetch_once(
        &mut self,
        kind: ResourceKind,
        namespace: &str,
        owner: &OwnerReference,
    ) -> Result<Option<GenericResource>> {
        let identity = ResourceIdentity::new(&self.cluster, kind.as_str(), namespace, &owner.name);
        if !self.visited.insert(identity) {
            return Ok(None);
        }
        fetch_owner(self.gateway, &self.cluster, kind, namespace, owner)
            .await
            .map(Some)
    }

    /// Distinct resources seen so far
    pub fn visited(&self) -> usize {
        self.visited.len()
    }

    pub fn finish(self) -> FanOut {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::gateway::InMemoryGateway;
    use serde_json::json;

    fn pod(owners: serde_json::Value) -> GenericResource {
        GenericResource::from_value(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {"name": "web-6d4f-x", "namespace": "shop", "ownerReferences": owners}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_walk_to_deployment() {
        let gateway = InMemoryGateway::new()
            .with(
                "c1",
                ResourceKind::ReplicaSet,
                json!({"metadata": {"name": "web-6d4f", "namespace": "shop",
                    "ownerReferences": [{"kind": "Deployment", "name": "web"}]}}),
            )
            .with(
                "c1",
                ResourceKind::Deployment,
                json!({"metadata": {"name": "web", "namespace": "shop"}}),
            );

        let walk = walk_owner_chain(
            &gateway,
            "c1",
            OwnerChain::Workload,
            pod(json!([{"kind": "ReplicaSet", "name": "web-6d4f"}])),
        )
        .await
        .unwrap();

        assert!(walk.is_complete(OwnerChain::Workload));
        assert_eq!(walk.deepest().unwrap().kind(), "Deployment");
        assert_eq!(walk.ancestors[0].name(), "web-6d4f");
    }

    #[tokio::test]
    async fn test_replica_set_without_controller() {
        let gateway = InMemoryGateway::new().with(
            "c1",
            ResourceKind::ReplicaSet,
            json!({"metadata": {"name": "web-6d4f", "namespace": "shop"}}),
        );

        let walk = walk_owner_chain(
            &gateway,
            "c1",
            OwnerChain::Workload,
            pod(json!([{"kind": "ReplicaSet", "name": "web-6d4f"}])),
        )
        .await
        .unwrap();

        assert_eq!(walk.ancestors.len(), 1);
        assert!(!walk.is_complete(OwnerChain::Workload));
    }

    #[tokio::test]
    async fn test_missing_owner_is_fatal_with_identity() {
        let gateway = InMemoryGateway::new();
        let err = walk_owner_chain(
            &gateway,
            "c1",
            OwnerChain::Workload,
            pod(json!([{"kind": "ReplicaSet", "name": "gone"}])),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        match err {
            Error::Fetch { identity, .. } => {
                assert_eq!(identity, ResourceIdentity::new("c1", "ReplicaSet", "shop", "gone"))
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }
}
