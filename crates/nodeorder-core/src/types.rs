use crate::resources::{pod_non_zero_requests, pod_requests, ResourceQuantities};
use k8s_openapi::api::core::v1::{Node, Pod};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Stable identity of a task within a session
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A schedulable unit of work, derived from a pod
#[derive(Debug, Clone)]
pub struct TaskInfo {
    /// Pod UID, or `namespace/name` when the pod has none
    pub uid: TaskId,
    pub name: String,
    pub namespace: String,
    /// Node the task is currently placed on, `None` while unbound
    pub node_name: Option<String>,
    /// Sum of container requests
    pub resreq: ResourceQuantities,
    /// Container requests with unset CPU/memory counted at the defaults
    pub non_zero_resreq: ResourceQuantities,
    pub pod: Arc<Pod>,
}

impl TaskInfo {
    /// Create a task view over a pod. The placement is taken from
    /// `spec.nodeName`.
    pub fn new(pod: Pod) -> Self {
        let name = pod.metadata.name.clone().unwrap_or_default();
        let namespace = pod
            .metadata
            .namespace
            .clone()
            .unwrap_or_else(|| "default".to_string());
        let uid = pod
            .metadata
            .uid
            .clone()
            .map(TaskId)
            .unwrap_or_else(|| TaskId(format!("{}/{}", namespace, name)));
        let node_name = pod
            .spec
            .as_ref()
            .and_then(|s| s.node_name.clone())
            .filter(|n| !n.is_empty());

        Self {
            uid,
            name,
            namespace,
            node_name,
            resreq: pod_requests(&pod),
            non_zero_resreq: pod_non_zero_requests(&pod),
            pod: Arc::new(pod),
        }
    }

    /// Labels of the underlying pod
    pub fn labels(&self) -> Option<&BTreeMap<String, String>> {
        self.pod.metadata.labels.as_ref()
    }

    /// Copy of this task placed on `node_name` (or unplaced for `None`).
    /// The pod's `spec.nodeName` follows the placement.
    pub fn with_node_name(&self, node_name: Option<&str>) -> Self {
        let mut pod = (*self.pod).clone();
        if let Some(spec) = pod.spec.as_mut() {
            spec.node_name = node_name.map(str::to_string);
        }

        Self {
            node_name: node_name.map(str::to_string),
            pod: Arc::new(pod),
            ..self.clone()
        }
    }
}

impl fmt::Display for TaskInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A placement target as the session sees it: the node object plus the
/// tasks already bound to it
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub name: String,
    pub node: Arc<Node>,
    pub tasks: Vec<TaskInfo>,
}

impl NodeInfo {
    pub fn new(node: Node) -> Self {
        Self {
            name: node.metadata.name.clone().unwrap_or_default(),
            node: Arc::new(node),
            tasks: Vec::new(),
        }
    }

    /// Attach an already-bound task. The task's placement is normalised to
    /// this node.
    pub fn add_task(&mut self, task: TaskInfo) {
        let task = if task.node_name.as_deref() == Some(self.name.as_str()) {
            task
        } else {
            task.with_node_name(Some(&self.name))
        };
        self.tasks.push(task);
    }

    pub fn labels(&self) -> Option<&BTreeMap<String, String>> {
        self.node.metadata.labels.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_identity_falls_back_to_namespaced_name() {
        let mut pod = Pod::default();
        pod.metadata.name = Some("nginx".to_string());
        pod.metadata.namespace = Some("web".to_string());

        let task = TaskInfo::new(pod.clone());
        assert_eq!(task.uid, TaskId::from("web/nginx"));
        assert_eq!(task.to_string(), "web/nginx");
        assert!(task.node_name.is_none());

        pod.metadata.uid = Some("1234".to_string());
        assert_eq!(TaskInfo::new(pod).uid.as_str(), "1234");
    }

    #[test]
    fn test_with_node_name_updates_pod_spec() {
        let mut pod = Pod::default();
        pod.metadata.name = Some("nginx".to_string());
        pod.spec = Some(Default::default());

        let task = TaskInfo::new(pod);
        let placed = task.with_node_name(Some("node1"));
        assert_eq!(placed.node_name.as_deref(), Some("node1"));
        assert_eq!(
            placed.pod.spec.as_ref().unwrap().node_name.as_deref(),
            Some("node1")
        );
        // The source task keeps its placement
        assert!(task.node_name.is_none());

        let cleared = placed.with_node_name(None);
        assert!(cleared.node_name.is_none());
        assert!(cleared.pod.spec.as_ref().unwrap().node_name.is_none());
    }

    #[test]
    fn test_node_info_normalises_task_placement() {
        let mut node = Node::default();
        node.metadata.name = Some("node1".to_string());
        let mut info = NodeInfo::new(node);

        let mut pod = Pod::default();
        pod.metadata.name = Some("web".to_string());
        pod.spec = Some(Default::default());
        info.add_task(TaskInfo::new(pod));

        assert_eq!(info.tasks.len(), 1);
        assert_eq!(info.tasks[0].node_name.as_deref(), Some("node1"));
    }
}
