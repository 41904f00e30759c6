//! Resource fetching through the Kubernetes API
//!
//! `KubeGateway` implements [`ResourceGateway`] with dynamic kube-rs APIs, so
//! any kind with known coordinates can be fetched without a typed model.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{ListParams, LogParams};
use kube::core::DynamicObject;
use kube::{Api, Client};

use super::ClusterConnector;
use crate::error::{Error, Result};
use crate::gateway::{ListQuery, ResourceGateway};
use crate::models::{GenericResource, ResourceCoordinates};

/// Gateway backed by live clusters
///
/// Holds one client per cluster for as long as the gateway lives; a gateway is
/// meant to serve a single request.
pub struct KubeGateway {
    connector: ClusterConnector,
    clients: Mutex<HashMap<String, Client>>,
}

impl KubeGateway {
    pub fn new(connector: ClusterConnector) -> Self {
        Self {
            connector,
            clients: Mutex::new(HashMap::new()),
        }
    }

    fn client(&self, cluster: &str) -> Result<Client> {
        if let Some(client) = self
            .clients
            .lock()
            .ok()
            .and_then(|clients| clients.get(cluster).cloned())
        {
            return Ok(client);
        }

        let client = self
            .connector
            .create_client(cluster)
            .map_err(|e| Error::Unavailable(format!("{:#}", e)))?;
        if let Ok(mut clients) = self.clients.lock() {
            clients.insert(cluster.to_string(), client.clone());
        }
        Ok(client)
    }

    /// Dynamic API for a resource type; empty namespace means cluster-wide
    fn dynamic_api(
        &self,
        cluster: &str,
        coords: &ResourceCoordinates,
        namespace: &str,
    ) -> Result<Api<DynamicObject>> {
        let client = self.client(cluster)?;
        let api_resource = coords.to_api_resource();
        Ok(if namespace.is_empty() {
            Api::all_with(client, &api_resource)
        } else {
            Api::namespaced_with(client, namespace, &api_resource)
        })
    }
}

fn to_generic(obj: DynamicObject, coords: &ResourceCoordinates) -> Result<GenericResource> {
    let value = serde_json::to_value(&obj)?;
    Ok(GenericResource::from_value(value)?.stamped(coords))
}

#[async_trait]
impl ResourceGateway for KubeGateway {
    async fn get_one(
        &self,
        cluster: &str,
        coords: &ResourceCoordinates,
        namespace: &str,
        name: &str,
    ) -> Result<GenericResource> {
        let api = self.dynamic_api(cluster, coords, namespace)?;
        tracing::debug!(cluster, resource = %coords, namespace, name, "get");
        let obj = api.get(name).await?;
        to_generic(obj, coords)
    }

    async fn list_many(
        &self,
        cluster: &str,
        coords: &ResourceCoordinates,
        namespace: &str,
        query: &ListQuery,
    ) -> Result<Vec<GenericResource>> {
        let api = self.dynamic_api(cluster, coords, namespace)?;

        let mut params = ListParams::default();
        if let Some(selector) = &query.label_selector {
            params = params.labels(selector);
        }
        if let Some(limit) = query.limit {
            params = params.limit(limit);
        }

        tracing::debug!(
            cluster,
            resource = %coords,
            namespace,
            selector = query.label_selector.as_deref().unwrap_or(""),
            "list"
        );
        let list = api.list(&params).await?;
        list.items
            .into_iter()
            .map(|obj| to_generic(obj, coords))
            .collect()
    }

    async fn pod_logs(
        &self,
        cluster: &str,
        namespace: &str,
        pod: &str,
        container: &str,
        tail_lines: i64,
    ) -> Result<String> {
        let api: Api<Pod> = Api::namespaced(self.client(cluster)?, namespace);
        let params = LogParams {
            container: Some(container.to_string()),
            tail_lines: Some(tail_lines),
            ..LogParams::default()
        };
        tracing::debug!(cluster, namespace, pod, container, tail_lines, "logs");
        Ok(api.logs(pod, &params).await?)
    }
}
