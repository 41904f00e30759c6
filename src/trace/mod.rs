//! Ownership graph walking
//!
//! Follows owner references from a resource towards the controllers that
//! manage it. Two shapes are supported:
//! - a single chain from one starting resource (pod -> replicaset -> deployment)
//! - a deduplicated fan-out from a listed set of leaves
//!   (machines -> machine sets -> machine deployments)
//!
//! Only the owner kinds named by the [`OwnerChain`] are ever fetched.

mod core;
mod models;

pub use self::core::{FanOutWalker, walk_owner_chain};
pub use models::{ChainWalk, FanOut, OwnerChain, VisitedSet, select_owner};
