//! Rancher fleet inspection library
//!
//! Resolves resources across a Rancher-managed fleet: maps kind names to API
//! coordinates, reads single resources and collections from the local or any
//! downstream cluster, walks owner references, and aggregates the results into
//! inspection bundles for an agent.

pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod kube;
pub mod models;
pub mod services;
pub mod trace;

// Re-export commonly used types for convenience
pub use error::{Error, ErrorKind, Result};
pub use gateway::{InMemoryGateway, ListQuery, ResourceGateway};
pub use models::{GenericResource, ResourceCoordinates, ResourceIdentity, ResourceKind, resolve};
pub use services::{InspectionBundle, Inspector, RequestContext};
