//! Service layer
//!
//! Aggregates gateway reads and ownership walks into inspection bundles, and
//! renders those bundles for the agent.

pub mod bundle;
pub mod classify;
pub mod inspector;
pub mod response;

pub use bundle::{BundleBuilder, BundleEntry, ContainerLog, InspectionBundle, build_bundle};
pub use classify::{ClusterFacts, ClusterType, classify, classify_cluster};
pub use inspector::{CLUSTER_TYPE_MARKER, Inspector, RequestContext};
pub use response::{render_bundle, render_images};
