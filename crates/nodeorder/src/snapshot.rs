use nodeorder_core::{Node, NodeInfo, Pod, TaskInfo};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Cluster state loaded from a YAML file
///
/// Pods with `spec.nodeName` set are bound to that node, the rest are
/// pending.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub pods: Vec<Pod>,
}

impl ClusterSnapshot {
    pub fn from_file(path: &Path) -> miette::Result<Self> {
        nodeorder_core::from_yaml_file(path).map_err(|e| {
            miette::miette!("Failed to load cluster snapshot {}: {}", path.display(), e)
        })
    }

    /// Split into session nodes (with their bound tasks) and pending tasks
    /// ordered by `namespace/name`
    pub fn into_session_input(self) -> (Vec<NodeInfo>, Vec<TaskInfo>) {
        let mut nodes: BTreeMap<String, NodeInfo> = self
            .nodes
            .into_iter()
            .map(|node| {
                let info = NodeInfo::new(node);
                (info.name.clone(), info)
            })
            .collect();

        let mut pending = Vec::new();
        for pod in self.pods {
            let task = TaskInfo::new(pod);
            match task.node_name.clone() {
                Some(node_name) => match nodes.get_mut(&node_name) {
                    Some(info) => info.add_task(task),
                    None => warn!(
                        "Pod {} is bound to unknown node {}, skipping",
                        task, node_name
                    ),
                },
                None => pending.push(task),
            }
        }

        pending.sort_by_key(|t| t.to_string());
        (nodes.into_values().collect(), pending)
    }
}
