//! Node/Task state index
//!
//! Per-session view of which tasks sit on which node and how much of each
//! node they request. Readers take an [`IndexSnapshot`] (a cheap `Arc`
//! clone) and never hold the lock while scoring; writers swap in a new
//! version under the write lock, copying only the node entry they touch.
//!
//! Between mutations every entry satisfies
//! `requested == Σ task.resreq` and
//! `non_zero_requested == Σ task.non_zero_resreq` over its bound tasks.

use crate::{Result, SchedulerError};
use nodeorder_core::{Node, NodeInfo, ResourceQuantities, TaskId, TaskInfo};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Index entry for one node
#[derive(Debug, Clone)]
pub struct NodeState {
    pub name: String,
    pub node: Arc<Node>,
    tasks: BTreeMap<TaskId, TaskInfo>,
    requested: ResourceQuantities,
    non_zero_requested: ResourceQuantities,
}

impl NodeState {
    /// Create an entry with no bound tasks
    pub fn new(name: impl Into<String>, node: Arc<Node>) -> Self {
        Self {
            name: name.into(),
            node,
            tasks: BTreeMap::new(),
            requested: ResourceQuantities::default(),
            non_zero_requested: ResourceQuantities::default(),
        }
    }

    /// Create an entry holding the tasks the session already placed on the node
    pub fn from_node_info(info: &NodeInfo) -> Self {
        let mut state = Self::new(&info.name, info.node.clone());
        for task in &info.tasks {
            state.add_task(task.clone());
        }
        state
    }

    /// Tasks bound to this node, ordered by task id
    pub fn tasks(&self) -> impl Iterator<Item = &TaskInfo> {
        self.tasks.values()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn contains(&self, uid: &TaskId) -> bool {
        self.tasks.contains_key(uid)
    }

    /// Sum of the requests of the bound tasks
    pub fn requested(&self) -> ResourceQuantities {
        self.requested
    }

    /// Sum of the non-zero requests of the bound tasks
    pub fn non_zero_requested(&self) -> ResourceQuantities {
        self.non_zero_requested
    }

    pub fn labels(&self) -> Option<&BTreeMap<String, String>> {
        self.node.metadata.labels.as_ref()
    }

    fn add_task(&mut self, task: TaskInfo) {
        // Rebinding the same task must not count it twice
        self.remove_task(&task.uid);
        self.requested += task.resreq;
        self.non_zero_requested += task.non_zero_resreq;
        self.tasks.insert(task.uid.clone(), task);
    }

    fn remove_task(&mut self, uid: &TaskId) -> Option<TaskInfo> {
        let task = self.tasks.remove(uid)?;
        self.requested -= task.resreq;
        self.non_zero_requested -= task.non_zero_resreq;
        Some(task)
    }
}

/// Immutable view of the whole index at one point in time
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    nodes: HashMap<String, Arc<NodeState>>,
    order: Vec<String>,
    generation: u64,
}

impl IndexSnapshot {
    /// Entry for `node_name`, if indexed
    pub fn lookup(&self, node_name: &str) -> Option<&Arc<NodeState>> {
        self.nodes.get(node_name)
    }

    /// All entries in the stable node order
    pub fn nodes(&self) -> impl Iterator<Item = &Arc<NodeState>> {
        self.order.iter().filter_map(|name| self.nodes.get(name))
    }

    /// Node names in the stable node order
    pub fn node_names(&self) -> &[String] {
        &self.order
    }

    /// Counter bumped by every successful bind and unbind
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Mutable, session-scoped node/task index
#[derive(Debug, Default)]
pub struct NodeStateIndex {
    inner: RwLock<Arc<IndexSnapshot>>,
}

impl NodeStateIndex {
    /// Build the index from the session's node snapshot. Node order follows
    /// the input; a repeated name replaces the earlier entry.
    pub fn new<'a>(nodes: impl IntoIterator<Item = &'a NodeInfo>) -> Self {
        let mut snapshot = IndexSnapshot::default();

        for info in nodes {
            let state = NodeState::from_node_info(info);
            debug!(
                "Indexed node {} with {} tasks (CPU: {} milli, Memory: {} bytes requested)",
                state.name,
                state.task_count(),
                state.requested.cpu_millicores,
                state.requested.memory_bytes
            );
            if snapshot
                .nodes
                .insert(info.name.clone(), Arc::new(state))
                .is_none()
            {
                snapshot.order.push(info.name.clone());
            }
        }

        Self {
            inner: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Current state of the whole index
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.inner.read().clone()
    }

    /// Current entry for `node_name`
    pub fn lookup(&self, node_name: &str) -> Option<Arc<NodeState>> {
        self.inner.read().lookup(node_name).cloned()
    }

    /// Record `task` as bound to `node_name`
    pub fn bind(&self, task: TaskInfo, node_name: &str) -> Result<()> {
        let mut guard = self.inner.write();
        let snapshot = Arc::make_mut(&mut *guard);

        let entry = snapshot
            .nodes
            .get_mut(node_name)
            .ok_or_else(|| SchedulerError::node_not_found(node_name))?;

        debug!("Binding task {} to node {}", task, node_name);
        Arc::make_mut(entry).add_task(task);
        snapshot.generation += 1;

        Ok(())
    }

    /// Remove `task` from `node_name`, returning the task as it was bound
    pub fn unbind(&self, task: &TaskInfo, node_name: &str) -> Result<TaskInfo> {
        let mut guard = self.inner.write();

        // Check before make_mut so a failed unbind copies nothing
        match guard.lookup(node_name) {
            None => return Err(SchedulerError::node_not_found(node_name)),
            Some(entry) if !entry.contains(&task.uid) => {
                return Err(SchedulerError::task_not_bound(task.to_string(), node_name))
            }
            Some(_) => {}
        }

        let snapshot = Arc::make_mut(&mut *guard);
        let removed = snapshot
            .nodes
            .get_mut(node_name)
            .and_then(|entry| Arc::make_mut(entry).remove_task(&task.uid))
            .ok_or_else(|| SchedulerError::internal_error("index entry vanished under lock"))?;
        snapshot.generation += 1;

        debug!("Unbound task {} from node {}", task, node_name);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{create_test_node, create_test_pod};

    fn node_info(name: &str, cpu: &str, memory: &str) -> NodeInfo {
        NodeInfo::new(create_test_node(name, cpu, memory))
    }

    fn task(name: &str, cpu: &str, memory: &str) -> TaskInfo {
        TaskInfo::new(create_test_pod(name, cpu, memory))
    }

    #[test]
    fn test_build_from_snapshot() {
        let mut node1 = node_info("node1", "4", "8Gi");
        node1.add_task(task("a", "1", "1Gi"));
        node1.add_task(task("b", "500m", "512Mi"));
        let node2 = node_info("node2", "4", "8Gi");

        let index = NodeStateIndex::new([&node1, &node2]);
        let snapshot = index.snapshot();

        assert_eq!(snapshot.node_names(), &["node1".to_string(), "node2".to_string()]);
        let entry = snapshot.lookup("node1").unwrap();
        assert_eq!(entry.task_count(), 2);
        assert_eq!(
            entry.requested(),
            ResourceQuantities::new(1500, (1 << 30) + (512 << 20))
        );
        assert_eq!(snapshot.lookup("node2").unwrap().task_count(), 0);
        assert!(snapshot.lookup("node3").is_none());
    }

    #[test]
    fn test_bind_unbind_restores_usage() {
        let index = NodeStateIndex::new([&node_info("node1", "4", "8Gi")]);
        let t = task("web", "750m", "300Mi");
        let before = index.lookup("node1").unwrap().requested();

        index.bind(t.clone(), "node1").unwrap();
        let after = index.lookup("node1").unwrap().requested();
        assert_eq!(after, before + t.resreq);

        index.unbind(&t, "node1").unwrap();
        assert_eq!(index.lookup("node1").unwrap().requested(), before);
    }

    #[test]
    fn test_repeated_cycles_do_not_drift() {
        let index = NodeStateIndex::new([&node_info("node1", "4", "8Gi")]);
        let tasks: Vec<_> = (0..5)
            .map(|i| task(&format!("t{}", i), "333m", "123Mi"))
            .collect();

        for _ in 0..50 {
            for t in &tasks {
                index.bind(t.clone(), "node1").unwrap();
            }
            for t in tasks.iter().rev() {
                index.unbind(t, "node1").unwrap();
            }
        }

        let entry = index.lookup("node1").unwrap();
        assert_eq!(entry.task_count(), 0);
        assert!(entry.requested().is_zero());
        assert!(entry.non_zero_requested().is_zero());
    }

    #[test]
    fn test_oversized_requests_saturate() {
        let index = NodeStateIndex::new([&node_info("node1", "4", "8Gi")]);
        index.bind(task("a", "1", "8000Pi"), "node1").unwrap();
        index.bind(task("b", "1", "8000Pi"), "node1").unwrap();

        let requested = index.lookup("node1").unwrap().requested();
        assert_eq!(requested.cpu_millicores, 2000);
        assert_eq!(requested.memory_bytes, i64::MAX);
    }

    #[test]
    fn test_rebind_does_not_double_count() {
        let index = NodeStateIndex::new([&node_info("node1", "4", "8Gi")]);
        let t = task("web", "1", "1Gi");

        index.bind(t.clone(), "node1").unwrap();
        index.bind(t.clone(), "node1").unwrap();

        let entry = index.lookup("node1").unwrap();
        assert_eq!(entry.task_count(), 1);
        assert_eq!(entry.requested(), t.resreq);
    }

    #[test]
    fn test_unknown_node_is_reported() {
        let index = NodeStateIndex::new([&node_info("node1", "4", "8Gi")]);
        let t = task("web", "1", "1Gi");

        let err = index.bind(t.clone(), "ghost").unwrap_err();
        assert!(matches!(err, SchedulerError::NodeNotFound { .. }));

        let err = index.unbind(&t, "ghost").unwrap_err();
        assert!(matches!(err, SchedulerError::NodeNotFound { .. }));

        let err = index.unbind(&t, "node1").unwrap_err();
        assert!(matches!(err, SchedulerError::TaskNotBound { .. }));

        // Failed mutations leave the generation alone
        assert_eq!(index.snapshot().generation(), 0);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let index = NodeStateIndex::new([&node_info("node1", "4", "8Gi")]);
        let before = index.snapshot();

        index.bind(task("web", "1", "1Gi"), "node1").unwrap();

        assert_eq!(before.lookup("node1").unwrap().task_count(), 0);
        assert_eq!(before.generation(), 0);
        assert_eq!(index.snapshot().lookup("node1").unwrap().task_count(), 1);
        assert_eq!(index.snapshot().generation(), 1);
    }

    #[test]
    fn test_concurrent_readers_see_whole_mutations() {
        let index = NodeStateIndex::new([&node_info("node1", "64", "64Gi")]);
        let tasks: Vec<_> = (0..32)
            .map(|i| task(&format!("t{}", i), "100m", "64Mi"))
            .collect();

        std::thread::scope(|s| {
            s.spawn(|| {
                for t in &tasks {
                    index.bind(t.clone(), "node1").unwrap();
                }
                for t in &tasks {
                    index.unbind(t, "node1").unwrap();
                }
            });

            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..200 {
                        let entry = index.lookup("node1").unwrap();
                        let sum = entry
                            .tasks()
                            .fold(ResourceQuantities::default(), |acc, t| acc + t.resreq);
                        assert_eq!(entry.requested(), sum);
                    }
                });
            }
        });

        assert!(index.lookup("node1").unwrap().requested().is_zero());
    }
}
