//! Node ordering plugin
//!
//! Scores candidate nodes with a weighted sum of the least-requested,
//! balanced-resource, node-affinity and inter-pod-affinity heuristics, and
//! keeps its own node index in step with the session's tentative
//! placements.

pub mod bridge;
pub mod scorer;
pub mod weight;

pub use bridge::NodeOrderEventBridge;
pub use scorer::NodeOrderScorer;
pub use weight::PriorityWeight;

use crate::capacity::{AllocatableCapacity, CapacityLookup};
use crate::framework::{Arguments, NodeOrderFn, Plugin, Session};
use crate::index::NodeStateIndex;
use crate::listers::TaskLister;
use nodeorder_core::{NodeInfo, TaskInfo};
use std::sync::Arc;
use tracing::{debug, info};

pub const PLUGIN_NAME: &str = "nodeorder";

pub struct NodeOrderPlugin {
    arguments: Arguments,
    capacity: Arc<dyn CapacityLookup>,
}

/// Plugin builder registered under [`PLUGIN_NAME`]
pub fn new(arguments: Arguments) -> Box<dyn Plugin> {
    Box::new(NodeOrderPlugin::new(arguments))
}

impl NodeOrderPlugin {
    pub fn new(arguments: Arguments) -> Self {
        Self {
            arguments,
            capacity: Arc::new(AllocatableCapacity),
        }
    }

    /// Use `capacity` instead of the nodes' reported allocatable resources
    pub fn with_capacity(mut self, capacity: Arc<dyn CapacityLookup>) -> Self {
        self.capacity = capacity;
        self
    }
}

impl Plugin for NodeOrderPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn on_session_open(&self, ssn: &mut Session) {
        let weight = PriorityWeight::from_arguments(&self.arguments);
        let index = Arc::new(NodeStateIndex::new(ssn.nodes()));
        let tasks = Arc::new(TaskLister::from_nodes(ssn.nodes()));

        ssn.add_event_handler(Arc::new(NodeOrderEventBridge::new(index.clone(), tasks)));

        let scorer = Arc::new(NodeOrderScorer::with_capacity(
            weight,
            index,
            self.capacity.clone(),
        ));
        let node_order: NodeOrderFn =
            Arc::new(move |task: &TaskInfo, node: &NodeInfo| scorer.score(task, node));
        ssn.add_node_order_fn(PLUGIN_NAME, node_order);

        info!(
            "Enabled {} for session {} with weights {:?}",
            PLUGIN_NAME, ssn.uid, weight
        );
    }

    fn on_session_close(&self, ssn: &mut Session) {
        debug!("Leaving {} for session {}", PLUGIN_NAME, ssn.uid);
    }
}
