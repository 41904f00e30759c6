//! API coordinates (group/version/resource) for a kind

use std::fmt;

use kube::core::ApiResource;

/// Group used by every node-driver machine config kind
pub const MACHINE_CONFIG_GROUP: &str = "rke-machine-config.cattle.io";

/// Fully-qualified location of a resource type on the API server
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceCoordinates {
    pub group: String,
    pub version: String,
    /// Lowercase plural resource name (e.g. "replicasets")
    pub plural: String,
    /// Kind name, used to stamp list items that come back without one
    pub kind: String,
}

impl ResourceCoordinates {
    pub fn new(group: &str, version: &str, plural: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            plural: plural.to_lowercase(),
            kind: kind.to_string(),
        }
    }

    /// Coordinates for a node-driver machine config referenced by a machine pool
    ///
    /// The pool only carries the config's kind; the resource name for every
    /// machine config kind is its lowercased kind with a trailing "s".
    pub fn for_machine_config(kind: &str) -> Self {
        Self {
            group: MACHINE_CONFIG_GROUP.to_string(),
            version: "v1".to_string(),
            plural: format!("{}s", kind.to_lowercase()),
            kind: kind.to_string(),
        }
    }

    /// `apiVersion` string ("v1" for the core group, "group/version" otherwise)
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Convert to a kube `ApiResource` for dynamic API calls
    pub fn to_api_resource(&self) -> ApiResource {
        ApiResource {
            group: self.group.clone(),
            version: self.version.clone(),
            api_version: self.api_version(),
            kind: self.kind.clone(),
            plural: self.plural.clone(),
        }
    }
}

impl fmt::Display for ResourceCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}/{}", self.version, self.plural)
        } else {
            write!(f, "{}/{}/{}", self.group, self.version, self.plural)
        }
    }
}
