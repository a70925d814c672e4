//! Nodeorder Scheduler - node scoring for batch scheduling sessions
//!
//! This crate provides:
//! - A session-scoped node/task index kept in step with tentative placements
//! - Node scoring heuristics (least requested, balanced resource, node and
//!   inter-pod affinity)
//! - The `nodeorder` plugin combining them into a weighted score
//! - The session host, plugin registry and scheduler configuration

pub mod capacity;
pub mod error;
pub mod framework;
pub mod index;
pub mod listers;
pub mod plugins;
pub mod priorities;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;

// Re-export commonly used types
pub use capacity::{AllocatableCapacity, CapacityLookup};
pub use error::{Result, SchedulerError};
pub use framework::{build_plugins, Arguments, EventHandler, Plugin, SchedulerConf, Session};
pub use index::{IndexSnapshot, NodeState, NodeStateIndex};
pub use listers::{NodeInfoLookup, TaskLister};
pub use plugins::nodeorder::{NodeOrderPlugin, NodeOrderScorer, PriorityWeight};
pub use types::{HostPriority, HostPriorityList, MAX_PRIORITY};
