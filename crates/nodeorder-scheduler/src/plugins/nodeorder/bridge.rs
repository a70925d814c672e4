use crate::framework::EventHandler;
use crate::index::NodeStateIndex;
use crate::listers::TaskLister;
use crate::SchedulerError;
use nodeorder_core::{SessionEvent, SessionEventKind, TaskInfo};
use std::sync::Arc;
use tracing::{debug, warn};

/// Keeps the node index and task lister in step with the session's
/// allocate and deallocate events
pub struct NodeOrderEventBridge {
    index: Arc<NodeStateIndex>,
    tasks: Arc<TaskLister>,
}

impl NodeOrderEventBridge {
    pub fn new(index: Arc<NodeStateIndex>, tasks: Arc<TaskLister>) -> Self {
        Self { index, tasks }
    }

    pub fn on_allocate(&self, task: &TaskInfo, node_name: &str) {
        if self.index.lookup(node_name).is_none() {
            warn!(
                "node order, update pod {} allocate to node {} failed: node not in index",
                task, node_name
            );
            return;
        }

        let placed = self.tasks.update_task(task, Some(node_name));
        match self.index.bind(placed, node_name) {
            Ok(()) => debug!("node order, added task {} to node {}", task, node_name),
            Err(e) => warn!("node order, failed to add task {} to node {}: {}", task, node_name, e),
        }
    }

    pub fn on_deallocate(&self, task: &TaskInfo, node_name: &str) {
        if self.index.lookup(node_name).is_none() {
            warn!(
                "node order, update pod {} deallocate from node {} failed: node not in index",
                task, node_name
            );
            return;
        }

        match self.index.unbind(task, node_name) {
            Ok(_) => {
                self.tasks.update_task(task, None);
                debug!("node order, removed task {} from node {}", task, node_name);
            }
            Err(e @ SchedulerError::TaskNotBound { .. }) => warn!("node order, {}", e),
            Err(e) => warn!(
                "node order, failed to remove task {} from node {}: {}",
                task, node_name, e
            ),
        }
    }
}

impl EventHandler for NodeOrderEventBridge {
    fn handle(&self, event: &SessionEvent) {
        match event.kind {
            SessionEventKind::Allocate => self.on_allocate(&event.task, &event.node_name),
            SessionEventKind::Deallocate => self.on_deallocate(&event.task, &event.node_name),
        }
    }
}
