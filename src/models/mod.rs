//! Resource model layer
//!
//! Structure:
//! - `resource_kind.rs` - Kind Registry (closed set of kinds and their coordinates)
//! - `coordinates.rs` - group/version/resource triples, including dynamic machine configs
//! - `resource.rs` - schema-agnostic resource documents and identities
//! - `selector.rs` - label selector rendering and matching

pub mod coordinates;
pub mod resource;
pub mod resource_kind;
pub mod selector;

pub use coordinates::ResourceCoordinates;
pub use resource::{GenericResource, OwnerReference, ResourceIdentity};
pub use resource_kind::{ResourceKind, resolve};
pub use selector::Selector;
