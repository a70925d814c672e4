//! Node scoring heuristics
//!
//! Each heuristic reads the task and index state and never mutates either,
//! so they can run concurrently for different (task, node) pairs.

pub mod balanced_resource;
pub mod inter_pod_affinity;
pub mod least_requested;
pub mod node_affinity;

use crate::capacity::CapacityLookup;
use crate::index::NodeState;
use crate::types::HostPriority;
use crate::Result;
use nodeorder_core::{ResourceQuantities, TaskInfo};

pub use balanced_resource::BalancedResourcePriority;
pub use inter_pod_affinity::InterPodAffinityPriority;
pub use least_requested::LeastRequestedPriority;
pub use node_affinity::NodeAffinityPriority;

/// Heuristic that scores a single node from its own state
pub trait PriorityMap: Send + Sync {
    /// Score the node for the given task
    fn map(&self, task: &TaskInfo, state: &NodeState) -> Result<HostPriority>;

    /// Name of the heuristic
    fn name(&self) -> &str;
}

/// Requested resources on the node once `task` is added, paired with the
/// node's allocatable capacity
fn requested_and_allocatable(
    task: &TaskInfo,
    state: &NodeState,
    capacity: &dyn CapacityLookup,
) -> Result<(ResourceQuantities, ResourceQuantities)> {
    let allocatable = capacity.capacity(&state.name, &state.node)?;
    let requested = state.non_zero_requested() + task.non_zero_resreq;
    Ok((requested, allocatable))
}
