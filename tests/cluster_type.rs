//! Cluster type classification tests
//!
//! Decision order: hosted-imported, hosted, provider equals driver, no
//! machine pools, node driver.

use rancher_inspect::GenericResource;
use rancher_inspect::services::{ClusterType, classify_cluster};
use serde_json::{Value, json};

fn doc(value: Value) -> GenericResource {
    GenericResource::from_value(value).unwrap()
}

fn management(status: Value, spec: Value) -> GenericResource {
    doc(json!({
        "apiVersion": "management.cattle.io/v3",
        "kind": "Cluster",
        "metadata": {"name": "c-m-abc123"},
        "spec": spec,
        "status": status
    }))
}

fn provisioning(pools: usize) -> GenericResource {
    let pools: Vec<Value> = (0..pools)
        .map(|i| json!({"name": format!("pool{}", i), "quantity": 1}))
        .collect();
    doc(json!({
        "apiVersion": "provisioning.cattle.io/v1",
        "kind": "Cluster",
        "metadata": {"name": "prod", "namespace": "fleet-default"},
        "spec": {"rkeConfig": {"machinePools": pools}},
        "status": {"clusterName": "c-m-abc123"}
    }))
}

#[test]
fn test_provider_equals_driver_is_imported() {
    let mgmt = management(json!({"provider": "rke2", "driver": "rke2"}), json!({}));
    assert_eq!(classify_cluster(Some(&mgmt), &provisioning(0)), ClusterType::Imported);
    assert_eq!(classify_cluster(Some(&mgmt), &provisioning(3)), ClusterType::Imported);
}

#[test]
fn test_hosted_block_marked_imported() {
    let mgmt = management(
        json!({"provider": "eks", "driver": "EKS"}),
        json!({"eksConfig": {"imported": true, "region": "eu-west-1"}}),
    );
    assert_eq!(classify_cluster(Some(&mgmt), &provisioning(0)), ClusterType::Imported);
}

#[test]
fn test_hosted_block_not_imported() {
    for block in ["eksConfig", "aksConfig", "gkeConfig"] {
        let mut spec = serde_json::Map::new();
        spec.insert(block.to_string(), json!({"imported": false}));
        // provider == driver would say imported, but the hosted rule wins
        let mgmt = management(json!({"provider": "aks", "driver": "aks"}), Value::Object(spec));
        assert_eq!(
            classify_cluster(Some(&mgmt), &provisioning(2)),
            ClusterType::Hosted,
            "{}",
            block
        );
    }
}

#[test]
fn test_no_pools_is_custom() {
    let mgmt = management(json!({"provider": "rke2", "driver": "imported"}), json!({}));
    assert_eq!(classify_cluster(Some(&mgmt), &provisioning(0)), ClusterType::Custom);
}

#[test]
fn test_pools_is_node_driver() {
    let mgmt = management(json!({"provider": "rke2", "driver": "imported"}), json!({}));
    let cluster_type = classify_cluster(Some(&mgmt), &provisioning(2));
    assert_eq!(cluster_type, ClusterType::NodeDriver);
    assert_eq!(cluster_type.to_string(), "node-driver");
}

#[test]
fn test_null_hosted_block_is_absent() {
    let mgmt = management(
        json!({"provider": "k3s", "driver": "rke2"}),
        json!({"eksConfig": null, "gkeConfig": null}),
    );
    assert_eq!(classify_cluster(Some(&mgmt), &provisioning(1)), ClusterType::NodeDriver);
}

#[test]
fn test_empty_provider_and_driver_do_not_match() {
    let mgmt = management(json!({}), json!({}));
    assert_eq!(classify_cluster(Some(&mgmt), &provisioning(0)), ClusterType::Custom);
}

#[test]
fn test_unknown_management_cluster_uses_pools_only() {
    assert_eq!(classify_cluster(None, &provisioning(0)), ClusterType::Custom);
    assert_eq!(classify_cluster(None, &provisioning(1)), ClusterType::NodeDriver);
}
