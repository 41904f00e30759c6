//! In-memory gateway
//!
//! Serves fixture documents instead of talking to an API server. Used by the
//! test suites and handy for replaying captured cluster state offline.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{ListQuery, ResourceGateway};
use crate::error::{Error, ErrorKind, Result};
use crate::models::{GenericResource, ResourceCoordinates, ResourceKind, Selector};

/// (cluster, group, plural, namespace, name)
type ObjectKey = (String, String, String, String, String);
/// (cluster, group, plural)
type CollectionKey = (String, String, String);
/// (cluster, namespace, pod, container)
type LogKey = (String, String, String, String);

/// Fixture-backed [`ResourceGateway`]
#[derive(Default)]
pub struct InMemoryGateway {
    objects: BTreeMap<ObjectKey, GenericResource>,
    logs: HashMap<LogKey, String>,
    object_failures: HashMap<ObjectKey, ErrorKind>,
    collection_failures: HashMap<CollectionKey, ErrorKind>,
    get_calls: Mutex<HashMap<ObjectKey, usize>>,
}

fn object_key(
    cluster: &str,
    coords: &ResourceCoordinates,
    namespace: &str,
    name: &str,
) -> ObjectKey {
    (
        cluster.to_string(),
        coords.group.clone(),
        coords.plural.clone(),
        namespace.to_string(),
        name.to_string(),
    )
}

fn collection_key(cluster: &str, coords: &ResourceCoordinates) -> CollectionKey {
    (cluster.to_string(), coords.group.clone(), coords.plural.clone())
}

fn error_for(kind: ErrorKind, what: String) -> Error {
    match kind {
        ErrorKind::NotFound => Error::NotFound(what),
        ErrorKind::Unauthorized => Error::Unauthorized(what),
        ErrorKind::Forbidden => Error::Forbidden(what),
        ErrorKind::Unavailable => Error::Unavailable(what),
        ErrorKind::UnknownKind => Error::UnknownKind(what),
        ErrorKind::Malformed => Error::malformed("fixture", what),
    }
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document of a registry kind; namespace and name come from its metadata
    pub fn with(self, cluster: &str, kind: ResourceKind, doc: Value) -> Self {
        self.with_coordinates(cluster, &kind.coordinates(), doc)
    }

    /// Add a document under explicit coordinates
    pub fn with_coordinates(
        mut self,
        cluster: &str,
        coords: &ResourceCoordinates,
        doc: Value,
    ) -> Self {
        self.insert(cluster, coords, doc);
        self
    }

    pub fn insert(&mut self, cluster: &str, coords: &ResourceCoordinates, doc: Value) {
        let resource = match GenericResource::from_value(doc) {
            Ok(resource) => resource.stamped(coords),
            Err(e) => {
                tracing::warn!("Ignoring fixture for {}: {}", coords, e);
                return;
            }
        };
        let key = object_key(cluster, coords, resource.namespace(), resource.name());
        self.objects.insert(key, resource);
    }

    /// Register container log output for a pod
    pub fn with_logs(
        mut self,
        cluster: &str,
        namespace: &str,
        pod: &str,
        container: &str,
        text: &str,
    ) -> Self {
        self.logs.insert(
            (
                cluster.to_string(),
                namespace.to_string(),
                pod.to_string(),
                container.to_string(),
            ),
            text.to_string(),
        );
        self
    }

    /// Make `get_one` for a specific resource fail
    pub fn failing_get(
        mut self,
        cluster: &str,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        error: ErrorKind,
    ) -> Self {
        self.object_failures
            .insert(object_key(cluster, &kind.coordinates(), namespace, name), error);
        self
    }

    /// Make every call against a resource type fail
    pub fn failing_collection(
        mut self,
        cluster: &str,
        coords: &ResourceCoordinates,
        error: ErrorKind,
    ) -> Self {
        self.collection_failures
            .insert(collection_key(cluster, coords), error);
        self
    }

    /// Number of `get_one` calls made for a resource
    pub fn get_count(
        &self,
        cluster: &str,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> usize {
        let key = object_key(cluster, &kind.coordinates(), namespace, name);
        self.get_calls
            .lock()
            .map(|calls| calls.get(&key).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Total `get_one` calls made against this gateway
    pub fn total_gets(&self) -> usize {
        self.get_calls
            .lock()
            .map(|calls| calls.values().sum())
            .unwrap_or(0)
    }

    fn record_get(&self, key: &ObjectKey) {
        if let Ok(mut calls) = self.get_calls.lock() {
            *calls.entry(key.clone()).or_default() += 1;
        }
    }
}

#[async_trait]
impl ResourceGateway for InMemoryGateway {
    async fn get_one(
        &self,
        cluster: &str,
        coords: &ResourceCoordinates,
        namespace: &str,
        name: &str,
    ) -> Result<GenericResource> {
        let key = object_key(cluster, coords, namespace, name);
        self.record_get(&key);

        let what = format!("{} {:?} in namespace {:?}", coords.plural, name, namespace);
        if let Some(kind) = self
            .collection_failures
            .get(&collection_key(cluster, coords))
            .or_else(|| self.object_failures.get(&key))
        {
            return Err(error_for(*kind, what));
        }

        self.objects
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::NotFound(what))
    }

    async fn list_many(
        &self,
        cluster: &str,
        coords: &ResourceCoordinates,
        namespace: &str,
        query: &ListQuery,
    ) -> Result<Vec<GenericResource>> {
        if let Some(kind) = self.collection_failures.get(&collection_key(cluster, coords)) {
            return Err(error_for(*kind, coords.plural.clone()));
        }

        let selector = match &query.label_selector {
            Some(s) => Selector::parse(s)?,
            None => Selector::default(),
        };

        let items = self
            .objects
            .iter()
            .filter(|((c, group, plural, ns, _), _)| {
                c == cluster
                    && *group == coords.group
                    && *plural == coords.plural
                    && (namespace.is_empty() || ns == namespace)
            })
            .map(|(_, resource)| resource)
            .filter(|resource| selector.matches(&resource.labels()))
            .take(query.limit.map(|l| l as usize).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(items)
    }

    async fn pod_logs(
        &self,
        cluster: &str,
        namespace: &str,
        pod: &str,
        container: &str,
        tail_lines: i64,
    ) -> Result<String> {
        let key = (
            cluster.to_string(),
            namespace.to_string(),
            pod.to_string(),
            container.to_string(),
        );
        let text = self
            .logs
            .get(&key)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "logs for {}/{} container {}",
                    namespace, pod, container
                ))
            })?;

        let lines: Vec<&str> = text.lines().collect();
        let skip = lines.len().saturating_sub(tail_lines.max(0) as usize);
        Ok(lines[skip..].join("\n"))
    }
}
