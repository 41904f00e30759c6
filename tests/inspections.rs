//! End-to-end inspection tests
//!
//! Drives `Inspector` over an in-memory fleet: one downstream cluster running a
//! small web workload, and the local cluster holding a provisioned RKE2 cluster
//! with one machine pool.

use rancher_inspect::cli::{ToolCommand, run_tool};
use rancher_inspect::config::Config;
use rancher_inspect::services::{BundleEntry, CLUSTER_TYPE_MARKER, render_bundle};
use rancher_inspect::{
    Error, ErrorKind, InMemoryGateway, InspectionBundle, Inspector, RequestContext,
    ResourceCoordinates, ResourceKind,
};
use serde_json::{Value, json};

const LOCAL: &str = "local";
const DOWNSTREAM: &str = "c-m-prod";
const FLEET: &str = "fleet-default";

fn names(bundle: &InspectionBundle) -> Vec<String> {
    bundle
        .resources()
        .map(|r| format!("{}/{}", r.kind(), r.name()))
        .collect()
}

fn pod(name: &str, app: &str, owner: Option<&str>) -> Value {
    let owners: Vec<Value> = owner
        .map(|rs| vec![json!({"kind": "ReplicaSet", "name": rs})])
        .unwrap_or_default();
    json!({
        "metadata": {
            "name": name,
            "namespace": "shop",
            "labels": {"app": app},
            "ownerReferences": owners
        },
        "spec": {
            "initContainers": [{"name": "migrate", "image": "registry.example.com/shop/migrate:2.1"}],
            "containers": [
                {"name": "app", "image": "registry.example.com/shop/web:2.1"},
                {"name": "proxy", "image": "envoyproxy/envoy:v1.31"}
            ]
        }
    })
}

fn workload() -> InMemoryGateway {
    InMemoryGateway::new()
        .with(DOWNSTREAM, ResourceKind::Pod, pod("web-7d9-x2k", "web", Some("web-7d9")))
        .with(DOWNSTREAM, ResourceKind::Pod, pod("web-7d9-q8z", "web", Some("web-7d9")))
        .with(DOWNSTREAM, ResourceKind::Pod, pod("db-0", "db", None))
        .with(
            DOWNSTREAM,
            ResourceKind::ReplicaSet,
            json!({"metadata": {"name": "web-7d9", "namespace": "shop",
                "ownerReferences": [{"kind": "Deployment", "name": "web"}]}}),
        )
        .with(
            DOWNSTREAM,
            ResourceKind::Deployment,
            json!({"metadata": {"name": "web", "namespace": "shop"},
                "spec": {"selector": {"matchLabels": {"app": "web"}}}}),
        )
        .with(
            DOWNSTREAM,
            ResourceKind::Deployment,
            json!({"metadata": {"name": "legacy", "namespace": "shop"}, "spec": {}}),
        )
        .with(DOWNSTREAM, ResourceKind::Node, json!({"metadata": {"name": "worker-1"}}))
        .with(DOWNSTREAM, ResourceKind::Node, json!({"metadata": {"name": "worker-2"}}))
        .with_logs(DOWNSTREAM, "shop", "web-7d9-x2k", "app", "starting\nlistening on :8080")
        .with_logs(DOWNSTREAM, "shop", "web-7d9-x2k", "proxy", "envoy ready")
}

fn provisioned() -> InMemoryGateway {
    InMemoryGateway::new()
        .with(
            LOCAL,
            ResourceKind::ProvisioningCluster,
            json!({
                "metadata": {"name": "prod", "namespace": FLEET},
                "spec": {"rkeConfig": {"machinePools": [{
                    "name": "pool1",
                    "quantity": 2,
                    "machineConfigRef": {"kind": "Amazonec2Config", "name": "nc-prod-pool1"}
                }]}},
                "status": {"clusterName": DOWNSTREAM}
            }),
        )
        .with(
            LOCAL,
            ResourceKind::ManagementCluster,
            json!({"metadata": {"name": DOWNSTREAM},
                "status": {"provider": "rke2", "driver": ""}}),
        )
        .with_coordinates(
            LOCAL,
            &ResourceCoordinates::for_machine_config("Amazonec2Config"),
            json!({"metadata": {"name": "nc-prod-pool1", "namespace": FLEET},
                "instanceType": "t3.large"}),
        )
        .with(LOCAL, ResourceKind::Machine, machine("prod-pool1-a", "prod-pool1-ms"))
        .with(LOCAL, ResourceKind::Machine, machine("prod-pool1-b", "prod-pool1-ms"))
        .with(
            LOCAL,
            ResourceKind::MachineSet,
            json!({"metadata": {"name": "prod-pool1-ms", "namespace": FLEET,
                "ownerReferences": [{"kind": "MachineDeployment", "name": "prod-pool1"}]}}),
        )
        .with(
            LOCAL,
            ResourceKind::MachineDeployment,
            json!({"metadata": {"name": "prod-pool1", "namespace": FLEET}}),
        )
        .with(LOCAL, ResourceKind::Event, event("cattle-system", "agent-restart"))
        .with(LOCAL, ResourceKind::Event, event("kube-system", "etcd-slow"))
}

fn machine(name: &str, machine_set: &str) -> Value {
    json!({
        "metadata": {
            "name": name,
            "namespace": FLEET,
            "labels": {
                "cluster.x-k8s.io/cluster-name": "prod",
                "rke.cattle.io/rke-machine-pool-name": "pool1"
            },
            "ownerReferences": [{"kind": "MachineSet", "name": machine_set}]
        }
    })
}

fn event(namespace: &str, name: &str) -> Value {
    json!({"metadata": {"name": name, "namespace": namespace}, "reason": "Unhealthy"})
}

fn inspector(gateway: InMemoryGateway) -> Inspector<InMemoryGateway> {
    Inspector::with_context(gateway, Config::default(), RequestContext::with_id("test"))
}

#[tokio::test]
async fn test_inspect_pod_includes_controller_and_logs() {
    let gateway = workload().with(
        DOWNSTREAM,
        ResourceKind::PodMetrics,
        json!({"metadata": {"name": "web-7d9-x2k", "namespace": "shop"},
            "containers": [{"name": "app", "usage": {"cpu": "5m"}}]}),
    );
    let bundle = inspector(gateway)
        .inspect_pod(DOWNSTREAM, "shop", "web-7d9-x2k")
        .await
        .unwrap();

    assert_eq!(
        names(&bundle),
        vec!["Pod/web-7d9-x2k", "Deployment/web", "PodMetrics/web-7d9-x2k"]
    );
    let logs = bundle
        .entries()
        .iter()
        .find_map(|entry| match entry {
            BundleEntry::PodLogs { containers, .. } => Some(containers),
            _ => None,
        })
        .unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].container, "app");
    assert_eq!(logs[0].log, "starting\nlistening on :8080");
}

#[tokio::test]
async fn test_metrics_failure_never_aborts() {
    let gateway = workload().failing_collection(
        DOWNSTREAM,
        &ResourceKind::PodMetrics.coordinates(),
        ErrorKind::Unavailable,
    );
    let bundle = inspector(gateway)
        .inspect_pod(DOWNSTREAM, "shop", "web-7d9-x2k")
        .await
        .unwrap();
    assert_eq!(names(&bundle), vec!["Pod/web-7d9-x2k", "Deployment/web"]);
}

#[tokio::test]
async fn test_unowned_pod_yields_pod_alone() {
    let gateway = workload().with_logs(DOWNSTREAM, "shop", "db-0", "app", "");
    let gateway = gateway.with_logs(DOWNSTREAM, "shop", "db-0", "proxy", "");
    let bundle = inspector(gateway)
        .inspect_pod(DOWNSTREAM, "shop", "db-0")
        .await
        .unwrap();
    assert_eq!(names(&bundle), vec!["Pod/db-0"]);
}

#[tokio::test]
async fn test_missing_pod_is_fatal() {
    let err = inspector(workload())
        .inspect_pod(DOWNSTREAM, "shop", "gone")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, Error::Fetch { .. }));
}

#[tokio::test]
async fn test_missing_container_logs_are_fatal() {
    // db-0 has no log fixtures registered
    let err = inspector(workload())
        .inspect_pod(DOWNSTREAM, "shop", "db-0")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    match &err {
        Error::Fetch { identity, .. } => {
            assert_eq!(identity.kind, "Pod");
            assert_eq!(identity.name, "db-0");
        }
        other => panic!("expected a fetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_deployment_details_selects_pods() {
    let bundle = inspector(workload())
        .get_deployment_details(DOWNSTREAM, "shop", "web")
        .await
        .unwrap();
    assert_eq!(
        names(&bundle),
        vec!["Deployment/web", "Pod/web-7d9-q8z", "Pod/web-7d9-x2k"]
    );
}

#[tokio::test]
async fn test_deployment_without_selector_is_malformed() {
    let err = inspector(workload())
        .get_deployment_details(DOWNSTREAM, "shop", "legacy")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Malformed);
}

#[tokio::test]
async fn test_nodes_without_metrics_server() {
    let gateway = workload().failing_collection(
        DOWNSTREAM,
        &ResourceKind::NodeMetrics.coordinates(),
        ErrorKind::NotFound,
    );
    let bundle = inspector(gateway).get_nodes(DOWNSTREAM).await.unwrap();
    assert_eq!(names(&bundle), vec!["Node/worker-1", "Node/worker-2"]);
}

#[tokio::test]
async fn test_empty_list_is_not_an_error() {
    let bundle = inspector(workload())
        .list_resources(DOWNSTREAM, "statefulsets", "shop", None)
        .await
        .unwrap();
    assert!(bundle.is_empty());
}

#[tokio::test]
async fn test_list_with_label_selector() {
    let bundle = inspector(workload())
        .list_resources(DOWNSTREAM, "PO", "", Some("app in (db)"))
        .await
        .unwrap();
    assert_eq!(names(&bundle), vec!["Pod/db-0"]);
}

#[tokio::test]
async fn test_list_with_unbalanced_selector_is_malformed() {
    let err = inspector(workload())
        .list_resources(DOWNSTREAM, "pod", "", Some("app)in(web"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Malformed);
}

#[tokio::test]
async fn test_get_resource_unknown_kind() {
    let err = inspector(workload())
        .get_resource(DOWNSTREAM, "widget", "shop", "web")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownKind);
}

#[tokio::test]
async fn test_required_failure_surfaces_verbatim_kind() {
    let gateway = workload().failing_get(
        DOWNSTREAM,
        ResourceKind::Deployment,
        "shop",
        "web",
        ErrorKind::Forbidden,
    );
    let err = inspector(gateway)
        .get_resource(DOWNSTREAM, "deploy", "shop", "web")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert!(err.to_string().contains("Deployment shop/web"));
}

#[tokio::test]
async fn test_inspect_cluster() {
    let bundle = inspector(provisioned())
        .inspect_cluster("prod", None)
        .await
        .unwrap();

    assert_eq!(bundle.marker(CLUSTER_TYPE_MARKER), Some("node-driver"));
    assert_eq!(
        names(&bundle),
        vec![
            "Cluster/prod",
            "Cluster/c-m-prod",
            "Amazonec2Config/nc-prod-pool1",
            "Machine/prod-pool1-a",
            "Machine/prod-pool1-b",
            "Event/agent-restart",
            "Event/etcd-slow",
        ]
    );
}

#[tokio::test]
async fn test_inspect_cluster_includes_provisioning_log() {
    let gateway = provisioned().with(
        LOCAL,
        ResourceKind::ConfigMap,
        json!({"metadata": {"name": "provisioning-log", "namespace": DOWNSTREAM},
            "data": {"log": "[INFO ] waiting for agent"}}),
    );
    let bundle = inspector(gateway).inspect_cluster("prod", Some("")).await.unwrap();
    assert!(names(&bundle).contains(&"ConfigMap/provisioning-log".to_string()));
}

#[tokio::test]
async fn test_inspect_cluster_respects_event_limit() {
    let gateway = provisioned()
        .with(LOCAL, ResourceKind::Event, event("kube-system", "etcd-slow-2"))
        .with(LOCAL, ResourceKind::Event, event("kube-system", "etcd-slow-3"));
    let config = Config {
        event_limit: 2,
        event_namespaces: vec!["kube-system".to_string()],
        ..Config::default()
    };
    let bundle = Inspector::new(gateway, config)
        .inspect_cluster("prod", None)
        .await
        .unwrap();
    let events = bundle.resources().filter(|r| r.kind() == "Event").count();
    assert_eq!(events, 2);
}

#[tokio::test]
async fn test_inspect_cluster_is_idempotent() {
    let inspector = inspector(provisioned());
    let first = inspector.inspect_cluster("prod", None).await.unwrap();
    let second = inspector.inspect_cluster("prod", None).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_inspect_cluster_machines() {
    let inspector = inspector(provisioned());
    let bundle = inspector
        .inspect_cluster_machines("prod", None, None)
        .await
        .unwrap();
    assert_eq!(
        names(&bundle),
        vec![
            "Cluster/prod",
            "Machine/prod-pool1-a",
            "Machine/prod-pool1-b",
            "MachineSet/prod-pool1-ms",
            "MachineDeployment/prod-pool1",
        ]
    );
    assert_eq!(
        inspector
            .gateway()
            .get_count(LOCAL, ResourceKind::MachineSet, FLEET, "prod-pool1-ms"),
        1
    );

    let one = inspector
        .inspect_cluster_machines("prod", Some(FLEET), Some("prod-pool1-b"))
        .await
        .unwrap();
    assert_eq!(
        names(&one),
        vec![
            "Cluster/prod",
            "Machine/prod-pool1-b",
            "MachineSet/prod-pool1-ms",
            "MachineDeployment/prod-pool1",
        ]
    );
}

#[tokio::test]
async fn test_missing_provisioning_cluster_is_fatal() {
    let err = inspector(provisioned())
        .inspect_cluster_machines("staging", None, None)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_cluster_images() {
    let gateway = workload()
        .with(
            LOCAL,
            ResourceKind::ManagementCluster,
            json!({"metadata": {"name": DOWNSTREAM}}),
        )
        .with(
            LOCAL,
            ResourceKind::ManagementCluster,
            json!({"metadata": {"name": LOCAL}}),
        );
    let inspector = inspector(gateway);

    let all = inspector.get_cluster_images(&[]).await.unwrap();
    assert_eq!(all.keys().collect::<Vec<_>>(), vec![DOWNSTREAM, LOCAL]);
    assert!(all[LOCAL].is_empty());
    assert_eq!(all[DOWNSTREAM].len(), 9);
    assert_eq!(all[DOWNSTREAM][0], "registry.example.com/shop/migrate:2.1");

    let one = inspector
        .get_cluster_images(&[DOWNSTREAM.to_string()])
        .await
        .unwrap();
    assert_eq!(one.len(), 1);
}

#[tokio::test]
async fn test_rendered_response() {
    let inspector = inspector(workload());
    let bundle = inspector
        .inspect_pod(DOWNSTREAM, "shop", "web-7d9-x2k")
        .await
        .unwrap();
    let text = render_bundle(&bundle, DOWNSTREAM).unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(value["cluster"], DOWNSTREAM);
    assert_eq!(value["resources"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["logs"][0]["pod"], "web-7d9-x2k");
    assert_eq!(value["logs"][0]["containers"][1]["log"], "envoy ready");

    let via_tool = run_tool(
        &inspector,
        ToolCommand::Get {
            kind: "deployment".to_string(),
            name: "web".to_string(),
            cluster: DOWNSTREAM.to_string(),
            namespace: "shop".to_string(),
        },
    )
    .await
    .unwrap();
    let value: Value = serde_json::from_str(&via_tool).unwrap();
    assert_eq!(value["resources"][0]["kind"], "Deployment");
    assert_eq!(value["resources"][0]["apiVersion"], "apps/v1");
}
