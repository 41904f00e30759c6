//! Resource Gateway
//!
//! Uniform "get one" / "list many" access to any cluster in the fleet, keyed by
//! [`ResourceCoordinates`]. Everything above this layer (ownership walks, logs,
//! metrics, cluster inspections) is expressed in terms of these calls, so it
//! never needs to know whether it talks to the local management cluster or a
//! downstream one.
//!
//! No retries happen here; each call resolves once or fails.

mod memory;

pub use memory::InMemoryGateway;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{GenericResource, ResourceCoordinates, Selector};

/// Options for [`ResourceGateway::list_many`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub label_selector: Option<String>,
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(mut self, selector: impl Into<String>) -> Self {
        let selector = selector.into();
        self.label_selector = (!selector.is_empty()).then_some(selector);
        self
    }

    pub fn selector(self, selector: &Selector) -> Self {
        self.labels(selector.to_string())
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Read access to resources on a named cluster
///
/// An empty `namespace` addresses cluster-scoped kinds (for `get_one`) or all
/// namespaces (for `list_many`).
#[async_trait]
pub trait ResourceGateway: Send + Sync {
    /// Fetch a single resource
    ///
    /// Fails with `NotFound`, `Unauthorized`, `Forbidden` or `Unavailable`.
    async fn get_one(
        &self,
        cluster: &str,
        coords: &ResourceCoordinates,
        namespace: &str,
        name: &str,
    ) -> Result<GenericResource>;

    /// List resources; no matches is an empty vector, not an error
    async fn list_many(
        &self,
        cluster: &str,
        coords: &ResourceCoordinates,
        namespace: &str,
        query: &ListQuery,
    ) -> Result<Vec<GenericResource>>;

    /// Last `tail_lines` lines of one container's log
    async fn pod_logs(
        &self,
        cluster: &str,
        namespace: &str,
        pod: &str,
        container: &str,
        tail_lines: i64,
    ) -> Result<String>;
}
