//! Schema-agnostic resource documents
//!
//! `GenericResource` is an opaque JSON document with typed accessors for the
//! handful of fields the resolver reads. It is never mutated once handed out;
//! callers needing a typed view convert a copy with [`GenericResource::to_typed`].

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::coordinates::ResourceCoordinates;
use crate::error::{Error, Result};

/// Any fetched Kubernetes object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenericResource(Value);

/// Back-link from a resource to the controller it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerReference {
    pub kind: String,
    pub name: String,
}

/// Address of a resource instance across the whole fleet
///
/// `namespace` is empty for cluster-scoped kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceIdentity {
    pub cluster: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl ResourceIdentity {
    pub fn new(cluster: &str, kind: &str, namespace: &str, name: &str) -> Self {
        Self {
            cluster: cluster.to_string(),
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{} {} (cluster {})", self.kind, self.name, self.cluster)
        } else {
            write!(
                f,
                "{} {}/{} (cluster {})",
                self.kind, self.namespace, self.name, self.cluster
            )
        }
    }
}

impl GenericResource {
    /// Wrap a JSON document; anything other than an object is rejected
    pub fn from_value(value: Value) -> Result<Self> {
        if value.is_object() {
            Ok(Self(value))
        } else {
            Err(Error::malformed(
                "resource",
                "expected a JSON object at the document root",
            ))
        }
    }

    /// Fill in `apiVersion`/`kind` when the server omitted them (list items)
    pub(crate) fn stamped(mut self, coords: &ResourceCoordinates) -> Self {
        if let Some(obj) = self.0.as_object_mut() {
            if !obj.contains_key("apiVersion") {
                obj.insert("apiVersion".into(), Value::String(coords.api_version()));
            }
            if !obj.contains_key("kind") && !coords.kind.is_empty() {
                obj.insert("kind".into(), Value::String(coords.kind.clone()));
            }
        }
        self
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Nested field lookup, e.g. `field(&["status", "provider"])`
    pub fn field(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(&self.0, |value, key| value.get(key))
    }

    pub fn str_field(&self, path: &[&str]) -> Option<&str> {
        self.field(path).and_then(|v| v.as_str())
    }

    pub fn bool_field(&self, path: &[&str]) -> Option<bool> {
        self.field(path).and_then(|v| v.as_bool())
    }

    pub fn kind(&self) -> &str {
        self.str_field(&["kind"]).unwrap_or_default()
    }

    pub fn api_version(&self) -> &str {
        self.str_field(&["apiVersion"]).unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.str_field(&["metadata", "name"]).unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        self.str_field(&["metadata", "namespace"])
            .unwrap_or_default()
    }

    pub fn labels(&self) -> BTreeMap<String, String> {
        self.field(&["metadata", "labels"])
            .and_then(|l| l.as_object())
            .map(|labels| {
                labels
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Owner references in declaration order; entries missing kind or name are skipped
    pub fn owner_references(&self) -> Vec<OwnerReference> {
        self.field(&["metadata", "ownerReferences"])
            .and_then(|o| o.as_array())
            .map(|refs| {
                refs.iter()
                    .filter_map(|owner| {
                        let kind = owner.get("kind").and_then(|k| k.as_str())?;
                        let name = owner.get("name").and_then(|n| n.as_str())?;
                        Some(OwnerReference {
                            kind: kind.to_string(),
                            name: name.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Identity of this resource in `cluster`
    pub fn identity(&self, cluster: &str) -> ResourceIdentity {
        ResourceIdentity::new(cluster, self.kind(), self.namespace(), self.name())
    }

    /// Convert a copy of the document into a typed view
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.0.clone())
            .map_err(|e| Error::malformed(self.kind().to_string(), e.to_string()))
    }
}

impl TryFrom<Value> for GenericResource {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}
