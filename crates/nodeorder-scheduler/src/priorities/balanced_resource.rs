use super::{requested_and_allocatable, PriorityMap};
use crate::capacity::{AllocatableCapacity, CapacityLookup};
use crate::index::NodeState;
use crate::types::{HostPriority, MAX_PRIORITY};
use crate::Result;
use nodeorder_core::TaskInfo;
use std::sync::Arc;
use tracing::debug;

/// Favors nodes whose CPU and memory utilization stay close to each other
/// once the task is placed
pub struct BalancedResourcePriority {
    capacity: Arc<dyn CapacityLookup>,
}

impl BalancedResourcePriority {
    pub fn new(capacity: Arc<dyn CapacityLookup>) -> Self {
        Self { capacity }
    }
}

impl Default for BalancedResourcePriority {
    fn default() -> Self {
        Self::new(Arc::new(AllocatableCapacity))
    }
}

fn fraction_of_capacity(requested: i64, capacity: i64) -> f64 {
    if capacity == 0 {
        return 1.0;
    }
    requested as f64 / capacity as f64
}

impl PriorityMap for BalancedResourcePriority {
    fn map(&self, task: &TaskInfo, state: &NodeState) -> Result<HostPriority> {
        let (requested, allocatable) = requested_and_allocatable(task, state, &*self.capacity)?;

        let cpu_fraction = fraction_of_capacity(requested.cpu_millicores, allocatable.cpu_millicores);
        let memory_fraction = fraction_of_capacity(requested.memory_bytes, allocatable.memory_bytes);

        // A saturated resource makes the node the worst choice regardless of balance
        let score = if cpu_fraction >= 1.0 || memory_fraction >= 1.0 {
            0
        } else {
            let diff = (cpu_fraction - memory_fraction).abs();
            ((1.0 - diff) * MAX_PRIORITY as f64) as i64
        };

        debug!(
            "Node {} balanced resource score: {} (CPU fraction: {:.3}, Memory fraction: {:.3})",
            state.name, score, cpu_fraction, memory_fraction
        );

        Ok(HostPriority::new(&state.name, score))
    }

    fn name(&self) -> &str {
        "BalancedResource"
    }
}
