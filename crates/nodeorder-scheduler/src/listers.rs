use crate::index::IndexSnapshot;
use crate::{Result, SchedulerError};
use nodeorder_core::{Node, NodeInfo, TaskId, TaskInfo};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves a node name to the node object
pub trait NodeInfoLookup: Send + Sync {
    fn node_info(&self, node_name: &str) -> Result<Arc<Node>>;
}

impl NodeInfoLookup for IndexSnapshot {
    fn node_info(&self, node_name: &str) -> Result<Arc<Node>> {
        self.lookup(node_name)
            .map(|state| state.node.clone())
            .ok_or_else(|| SchedulerError::node_not_found(node_name))
    }
}

/// Tracks the current placement of every task seen in the session
#[derive(Debug, Default)]
pub struct TaskLister {
    tasks: RwLock<HashMap<TaskId, TaskInfo>>,
}

impl TaskLister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the lister with the tasks already bound in the node snapshot
    pub fn from_nodes<'a>(nodes: impl IntoIterator<Item = &'a NodeInfo>) -> Self {
        let tasks = nodes
            .into_iter()
            .flat_map(|info| info.tasks.iter())
            .map(|task| (task.uid.clone(), task.clone()))
            .collect();

        Self {
            tasks: RwLock::new(tasks),
        }
    }

    /// Record `task` as placed on `node_name` (`None` clears the placement)
    /// and return the updated task
    pub fn update_task(&self, task: &TaskInfo, node_name: Option<&str>) -> TaskInfo {
        let updated = task.with_node_name(node_name);
        self.tasks.write().insert(updated.uid.clone(), updated.clone());
        updated
    }

    pub fn get(&self, uid: &TaskId) -> Option<TaskInfo> {
        self.tasks.read().get(uid).cloned()
    }

    /// Node the task is currently placed on
    pub fn placement(&self, uid: &TaskId) -> Option<String> {
        self.tasks.read().get(uid).and_then(|t| t.node_name.clone())
    }

    /// All known tasks, ordered by id
    pub fn list(&self) -> Vec<TaskInfo> {
        let mut tasks: Vec<_> = self.tasks.read().values().cloned().collect();
        tasks.sort_by(|a, b| a.uid.cmp(&b.uid));
        tasks
    }
}
