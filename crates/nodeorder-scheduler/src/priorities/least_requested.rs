use super::{requested_and_allocatable, PriorityMap};
use crate::capacity::{AllocatableCapacity, CapacityLookup};
use crate::index::NodeState;
use crate::types::{HostPriority, MAX_PRIORITY};
use crate::Result;
use nodeorder_core::TaskInfo;
use std::sync::Arc;
use tracing::debug;

/// Favors nodes with more unrequested capacity left after placing the task
pub struct LeastRequestedPriority {
    capacity: Arc<dyn CapacityLookup>,
}

impl LeastRequestedPriority {
    pub fn new(capacity: Arc<dyn CapacityLookup>) -> Self {
        Self { capacity }
    }
}

impl Default for LeastRequestedPriority {
    fn default() -> Self {
        Self::new(Arc::new(AllocatableCapacity))
    }
}

/// `(capacity - requested) * MAX_PRIORITY / capacity`, 0 on an empty or
/// overcommitted resource
fn least_requested_score(requested: i64, capacity: i64) -> i64 {
    if capacity <= 0 || requested > capacity {
        return 0;
    }
    let free = capacity as i128 - requested as i128;
    (free * MAX_PRIORITY as i128 / capacity as i128) as i64
}

impl PriorityMap for LeastRequestedPriority {
    fn map(&self, task: &TaskInfo, state: &NodeState) -> Result<HostPriority> {
        let (requested, allocatable) = requested_and_allocatable(task, state, &*self.capacity)?;

        let cpu_score = least_requested_score(requested.cpu_millicores, allocatable.cpu_millicores);
        let memory_score = least_requested_score(requested.memory_bytes, allocatable.memory_bytes);
        let score = (cpu_score + memory_score) / 2;

        debug!(
            "Node {} least requested score: {} (CPU: {}/{} milli, Memory: {}/{} bytes)",
            state.name,
            score,
            requested.cpu_millicores,
            allocatable.cpu_millicores,
            requested.memory_bytes,
            allocatable.memory_bytes
        );

        Ok(HostPriority::new(&state.name, score))
    }

    fn name(&self) -> &str {
        "LeastRequested"
    }
}
