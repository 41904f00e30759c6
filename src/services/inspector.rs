//! Inspection tools
//!
//! Each public method of [`Inspector`] answers one agent tool call. Methods
//! build a fresh [`InspectionBundle`] from gateway reads and ownership walks,
//! and run inside a span derived from the inspector's [`RequestContext`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use serde::Deserialize;
use tracing::Instrument;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::gateway::{ListQuery, ResourceGateway};
use crate::models::{
    GenericResource, ResourceCoordinates, ResourceIdentity, ResourceKind, Selector, resolve,
};
use crate::services::bundle::{BundleBuilder, ContainerLog, InspectionBundle};
use crate::services::classify::classify_cluster;
use crate::trace::{FanOutWalker, OwnerChain, walk_owner_chain};

/// Marker key carrying the derived cluster type
pub const CLUSTER_TYPE_MARKER: &str = "clusterType";
/// ConfigMap holding the provisioning log, in the namespace named after the management cluster
pub const PROVISIONING_LOG: &str = "provisioning-log";

static NEXT_REQUEST: AtomicU64 = AtomicU64::new(1);

/// Logging context of one request
///
/// Every operation runs in a span built from this context, so log lines from
/// the walker and gateway carry the request id without any global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    pub fn new() -> Self {
        let seq = NEXT_REQUEST.fetch_add(1, Ordering::Relaxed);
        Self {
            request_id: format!("{}-{}", std::process::id(), seq),
        }
    }

    pub fn with_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    pub fn span(&self, tool: &str, cluster: &str) -> tracing::Span {
        tracing::info_span!("inspect", request_id = %self.request_id, tool, cluster)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Machine pool entry of a provisioning cluster
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MachinePool {
    name: String,
    #[serde(default)]
    machine_config_ref: Option<MachineConfigRef>,
}

#[derive(Debug, Clone, Deserialize)]
struct MachineConfigRef {
    kind: String,
    name: String,
}

fn machine_pools(provisioning: &GenericResource) -> Result<Vec<MachinePool>> {
    match provisioning.field(&["spec", "rkeConfig", "machinePools"]) {
        Some(pools) if !pools.is_null() => serde_json::from_value(pools.clone())
            .map_err(|e| Error::malformed("machinePools", e.to_string())),
        _ => Ok(Vec::new()),
    }
}

fn container_names(pod: &GenericResource) -> Vec<String> {
    pod.field(&["spec", "containers"])
        .and_then(|c| c.as_array())
        .map(|containers| {
            containers
                .iter()
                .filter_map(|c| c.get("name").and_then(|n| n.as_str()))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Images of init containers then containers, in declaration order
fn pod_images(pod: &GenericResource) -> Vec<String> {
    ["initContainers", "containers"]
        .iter()
        .filter_map(|list| pod.field(&["spec", *list]).and_then(|c| c.as_array()))
        .flatten()
        .filter_map(|c| c.get("image").and_then(|i| i.as_str()))
        .map(str::to_string)
        .collect()
}

/// Tool set over one gateway
pub struct Inspector<G: ResourceGateway> {
    gateway: G,
    config: Config,
    ctx: RequestContext,
}

impl<G: ResourceGateway> Inspector<G> {
    pub fn new(gateway: G, config: Config) -> Self {
        Self::with_context(gateway, config, RequestContext::new())
    }

    pub fn with_context(gateway: G, config: Config, ctx: RequestContext) -> Self {
        Self {
            gateway,
            config,
            ctx,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn namespace_or_default<'a>(&'a self, namespace: Option<&'a str>) -> &'a str {
        namespace
            .filter(|ns| !ns.is_empty())
            .unwrap_or(self.config.default_namespace.as_str())
    }

    /// Fetch a resource whose absence fails the request
    async fn fetch(
        &self,
        cluster: &str,
        coords: &ResourceCoordinates,
        namespace: &str,
        name: &str,
    ) -> Result<GenericResource> {
        self.gateway
            .get_one(cluster, coords, namespace, name)
            .await
            .map_err(|e| {
                tracing::error!(
                    cluster,
                    kind = %coords.kind,
                    namespace,
                    name,
                    error = %e,
                    "Failed to get resource"
                );
                Error::fetching(ResourceIdentity::new(cluster, &coords.kind, namespace, name), e)
            })
    }

    /// List resources whose retrieval failure fails the request
    async fn list(
        &self,
        cluster: &str,
        coords: &ResourceCoordinates,
        namespace: &str,
        query: &ListQuery,
    ) -> Result<Vec<GenericResource>> {
        self.gateway
            .list_many(cluster, coords, namespace, query)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    cluster,
                    kind = %coords.kind,
                    namespace,
                    selector = query.label_selector.as_deref().unwrap_or(""),
                    error = %e,
                    "Failed to list resources"
                );
            })
    }

    /// Fetch a single resource by kind name
    pub async fn get_resource(
        &self,
        cluster: &str,
        kind: &str,
        namespace: &str,
        name: &str,
    ) -> Result<InspectionBundle> {
        async {
            let coords = resolve(kind)?;
            let mut bundle = BundleBuilder::new();
            bundle.required(self.fetch(cluster, &coords, namespace, name).await)?;
            Ok(bundle.build())
        }
        .instrument(self.ctx.span("get_resource", cluster))
        .await
    }

    /// List resources by kind name; an empty namespace lists across all namespaces
    pub async fn list_resources(
        &self,
        cluster: &str,
        kind: &str,
        namespace: &str,
        label_selector: Option<&str>,
    ) -> Result<InspectionBundle> {
        async {
            let coords = resolve(kind)?;
            let query = ListQuery::new().labels(label_selector.unwrap_or_default());
            let mut bundle = BundleBuilder::new();
            bundle.resources(self.list(cluster, &coords, namespace, &query).await?);
            Ok(bundle.build())
        }
        .instrument(self.ctx.span("list_resources", cluster))
        .await
    }

    /// Pod, its top-most controller, container logs and metrics if available
    pub async fn inspect_pod(
        &self,
        cluster: &str,
        namespace: &str,
        name: &str,
    ) -> Result<InspectionBundle> {
        async {
            let pod = self
                .fetch(cluster, &ResourceKind::Pod.coordinates(), namespace, name)
                .await?;
            let walk =
                walk_owner_chain(&self.gateway, cluster, OwnerChain::Workload, pod.clone()).await?;

            let mut logs = Vec::new();
            for container in container_names(&pod) {
                let log = self
                    .gateway
                    .pod_logs(
                        cluster,
                        namespace,
                        name,
                        &container,
                        self.config.pod_log_tail_lines,
                    )
                    .await
                    .map_err(|e| {
                        tracing::error!(
                            cluster,
                            namespace,
                            pod = name,
                            container = %container,
                            error = %e,
                            "Failed to get pod logs"
                        );
                        Error::fetching(pod.identity(cluster), e)
                    })?;
                logs.push(ContainerLog { container, log });
            }

            let metrics = self
                .gateway
                .get_one(cluster, &ResourceKind::PodMetrics.coordinates(), namespace, name)
                .await;

            let mut bundle = BundleBuilder::new();
            bundle.resource(pod);
            if let Some(controller) = walk.deepest() {
                bundle.resource(controller.clone());
            }
            bundle
                .logs(name, logs)
                .optional("pod metrics", metrics.map(Some));
            Ok(bundle.build())
        }
        .instrument(self.ctx.span("inspect_pod", cluster))
        .await
    }

    /// Deployment and the pods its selector matches
    pub async fn get_deployment_details(
        &self,
        cluster: &str,
        namespace: &str,
        name: &str,
    ) -> Result<InspectionBundle> {
        async {
            let deployment = self
                .fetch(cluster, &ResourceKind::Deployment.coordinates(), namespace, name)
                .await?;

            let selector = deployment
                .field(&["spec", "selector"])
                .cloned()
                .map(serde_json::from_value::<LabelSelector>)
                .transpose()
                .map_err(|e| Error::malformed("Deployment", e.to_string()))?
                .map(|s| Selector::from_label_selector(&s))
                .transpose()?
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    Error::malformed("Deployment", format!("{} has no pod selector", name))
                })?;

            let pods = self
                .list(
                    cluster,
                    &ResourceKind::Pod.coordinates(),
                    namespace,
                    &ListQuery::new().selector(&selector),
                )
                .await?;

            let mut bundle = BundleBuilder::new();
            bundle.resource(deployment).resources(pods);
            Ok(bundle.build())
        }
        .instrument(self.ctx.span("get_deployment_details", cluster))
        .await
    }

    /// All nodes, plus node metrics if a metrics server is installed
    pub async fn get_nodes(&self, cluster: &str) -> Result<InspectionBundle> {
        async {
            let nodes = self
                .list(cluster, &ResourceKind::Node.coordinates(), "", &ListQuery::new())
                .await?;
            let metrics = self
                .gateway
                .list_many(
                    cluster,
                    &ResourceKind::NodeMetrics.coordinates(),
                    "",
                    &ListQuery::new(),
                )
                .await;

            let mut bundle = BundleBuilder::new();
            bundle.resources(nodes).optional("node metrics", metrics);
            Ok(bundle.build())
        }
        .instrument(self.ctx.span("get_nodes", cluster))
        .await
    }

    /// Provisioning state of a downstream cluster, read from the local cluster
    pub async fn inspect_cluster(
        &self,
        cluster_name: &str,
        namespace: Option<&str>,
    ) -> Result<InspectionBundle> {
        let local = self.config.local_cluster.as_str();
        async {
            let namespace = self.namespace_or_default(namespace);
            let provisioning = self
                .fetch(
                    local,
                    &ResourceKind::ProvisioningCluster.coordinates(),
                    namespace,
                    cluster_name,
                )
                .await?;
            tracing::info!(cluster = cluster_name, namespace, "Found provisioning cluster");

            let management_name = provisioning
                .str_field(&["status", "clusterName"])
                .filter(|name| !name.is_empty())
                .map(str::to_string);
            let management = match &management_name {
                Some(name) => Some(
                    self.fetch(
                        local,
                        &ResourceKind::ManagementCluster.coordinates(),
                        "",
                        name,
                    )
                    .await?,
                ),
                None => None,
            };
            let cluster_type = classify_cluster(management.as_ref(), &provisioning);

            let pools = machine_pools(&provisioning)?;
            let mut pool_resources = Vec::new();
            for pool in &pools {
                if let Some(config_ref) = &pool.machine_config_ref {
                    let coords = ResourceCoordinates::for_machine_config(&config_ref.kind);
                    pool_resources.push(
                        self.fetch(local, &coords, namespace, &config_ref.name)
                            .await?,
                    );
                }

                let selector = Selector::for_cluster(provisioning.name(), Some(pool.name.as_str()));
                tracing::debug!(pool = %pool.name, selector = %selector, "Listing pool machines");
                match self
                    .list(
                        local,
                        &ResourceKind::Machine.coordinates(),
                        namespace,
                        &ListQuery::new().selector(&selector),
                    )
                    .await
                {
                    Ok(machines) => pool_resources.extend(machines),
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e),
                }
            }

            let provisioning_log = match &management_name {
                Some(ns) => {
                    self.gateway
                        .get_one(
                            local,
                            &ResourceKind::ConfigMap.coordinates(),
                            ns,
                            PROVISIONING_LOG,
                        )
                        .await
                }
                None => Err(Error::NotFound(PROVISIONING_LOG.to_string())),
            };

            let mut events = Vec::new();
            for ns in &self.config.event_namespaces {
                events.extend(
                    self.list(
                        local,
                        &ResourceKind::Event.coordinates(),
                        ns,
                        &ListQuery::new().limit(self.config.event_limit),
                    )
                    .await?,
                );
            }

            let mut bundle = BundleBuilder::new();
            bundle.resource(provisioning);
            if let Some(management) = management {
                bundle.resource(management);
            }
            bundle
                .marker(CLUSTER_TYPE_MARKER, cluster_type.as_str())
                .resources(pool_resources)
                .optional("provisioning log", provisioning_log.map(Some))
                .resources(events);
            Ok(bundle.build())
        }
        .instrument(self.ctx.span("inspect_cluster", local))
        .await
    }

    /// Provisioning cluster followed by its machines, machine sets and machine deployments
    ///
    /// With `machine` set, only that machine and its owners are included.
    pub async fn inspect_cluster_machines(
        &self,
        cluster_name: &str,
        namespace: Option<&str>,
        machine: Option<&str>,
    ) -> Result<InspectionBundle> {
        let local = self.config.local_cluster.as_str();
        async {
            let namespace = self.namespace_or_default(namespace);
            let provisioning = self
                .fetch(
                    local,
                    &ResourceKind::ProvisioningCluster.coordinates(),
                    namespace,
                    cluster_name,
                )
                .await?;

            let pools = machine_pools(&provisioning)?;
            let mut walker =
                FanOutWalker::new(&self.gateway, OwnerChain::Machine, local, namespace);
            if pools.is_empty() {
                walker
                    .walk(&Selector::for_cluster(provisioning.name(), None), machine)
                    .await?;
            }
            for pool in &pools {
                walker
                    .walk(
                        &Selector::for_cluster(provisioning.name(), Some(pool.name.as_str())),
                        machine,
                    )
                    .await?;
            }
            let fan_out = walker.finish();
            tracing::info!(
                cluster = cluster_name,
                machines = fan_out.leaves.len(),
                machine_sets = fan_out.intermediates.len(),
                machine_deployments = fan_out.top_level.len(),
                "Resolved cluster machines"
            );

            let mut bundle = BundleBuilder::new();
            bundle
                .resource(provisioning)
                .resources(fan_out.into_resources());
            Ok(bundle.build())
        }
        .instrument(self.ctx.span("inspect_cluster_machines", local))
        .await
    }

    /// Container images in use per cluster
    ///
    /// With no clusters given, every management cluster known to the local
    /// cluster is scanned.
    pub async fn get_cluster_images(
        &self,
        clusters: &[String],
    ) -> Result<BTreeMap<String, Vec<String>>> {
        let local = self.config.local_cluster.as_str();
        async {
            let clusters = if clusters.is_empty() {
                self.list(
                    local,
                    &ResourceKind::ManagementCluster.coordinates(),
                    "",
                    &ListQuery::new(),
                )
                .await?
                .iter()
                .map(|c| c.name().to_string())
                .collect()
            } else {
                clusters.to_vec()
            };

            let mut images = BTreeMap::new();
            for cluster in clusters {
                let pods = self
                    .list(&cluster, &ResourceKind::Pod.coordinates(), "", &ListQuery::new())
                    .await?;
                let cluster_images = pods.iter().flat_map(pod_images).collect();
                images.insert(cluster, cluster_images);
            }
            Ok(images)
        }
        .instrument(self.ctx.span("get_cluster_images", local))
        .await
    }
}
