use crate::{Result, SchedulerError};
use nodeorder_core::{Node, ResourceQuantities};

/// Source of a node's schedulable capacity
pub trait CapacityLookup: Send + Sync {
    fn capacity(&self, node_name: &str, node: &Node) -> Result<ResourceQuantities>;
}

/// Reads `status.allocatable`
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocatableCapacity;

impl CapacityLookup for AllocatableCapacity {
    fn capacity(&self, node_name: &str, node: &Node) -> Result<ResourceQuantities> {
        let allocatable = node
            .status
            .as_ref()
            .and_then(|s| s.allocatable.as_ref())
            .ok_or_else(|| {
                SchedulerError::capacity_unavailable(node_name, "node reports no allocatable resources")
            })?;

        ResourceQuantities::try_from_k8s_resource_map(allocatable)
            .map_err(|e| SchedulerError::capacity_unavailable(node_name, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::create_test_node;
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

    #[test]
    fn test_allocatable_capacity() {
        let node = create_test_node("node1", "4", "8Gi");
        let capacity = AllocatableCapacity.capacity("node1", &node).unwrap();
        assert_eq!(capacity, ResourceQuantities::new(4000, 8 << 30));
    }

    #[test]
    fn test_missing_status_is_an_error() {
        let node = Node::default();
        let err = AllocatableCapacity.capacity("node1", &node).unwrap_err();
        assert!(matches!(err, SchedulerError::CapacityUnavailable { .. }));
    }

    #[test]
    fn test_garbage_quantity_is_an_error() {
        let mut node = create_test_node("node1", "4", "8Gi");
        node.status
            .as_mut()
            .unwrap()
            .allocatable
            .as_mut()
            .unwrap()
            .insert("cpu".to_string(), Quantity("four".to_string()));

        let err = AllocatableCapacity.capacity("node1", &node).unwrap_err();
        assert!(err.to_string().contains("four"));
    }
}
