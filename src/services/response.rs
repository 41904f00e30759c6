//! Agent-facing response text
//!
//! Turns a bundle into JSON. Nothing here feeds back into resolution.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::error::Result;
use crate::services::bundle::{BundleEntry, InspectionBundle};

/// Render a bundle as pretty JSON, preserving bundle order within each section
pub fn render_bundle(bundle: &InspectionBundle, cluster: &str) -> Result<String> {
    let mut resources = Vec::new();
    let mut logs = Vec::new();
    let mut markers = Map::new();

    for entry in bundle.entries() {
        match entry {
            BundleEntry::Resource(resource) => resources.push(resource.as_value().clone()),
            BundleEntry::PodLogs { pod, containers } => {
                logs.push(json!({"pod": pod, "containers": containers}))
            }
            BundleEntry::Marker { key, value } => {
                markers.insert(key.clone(), Value::String(value.clone()));
            }
        }
    }

    let response = json!({
        "cluster": cluster,
        "resources": resources,
        "logs": logs,
        "markers": markers,
    });
    Ok(serde_json::to_string_pretty(&response)?)
}

/// Render the cluster -> images map
pub fn render_images(images: &BTreeMap<String, Vec<String>>) -> Result<String> {
    Ok(serde_json::to_string_pretty(images)?)
}
