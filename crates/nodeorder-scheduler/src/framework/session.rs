use super::plugin::Plugin;
use crate::{Result, SchedulerError};
use nodeorder_core::{NodeInfo, SessionEvent, TaskInfo};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Scores a (task, node) pair; higher is better
pub type NodeOrderFn = Arc<dyn Fn(&TaskInfo, &NodeInfo) -> Result<f64> + Send + Sync>;

/// Receives allocate/deallocate events raised by the session
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &SessionEvent);
}

/// One scheduling cycle over a fixed snapshot of nodes
///
/// Plugins register their scoring functions and event handlers when the
/// session opens. Events are delivered synchronously, in registration
/// order, before `allocate`/`deallocate` return.
pub struct Session {
    pub uid: Uuid,
    nodes: BTreeMap<String, NodeInfo>,
    node_order_fns: Vec<(String, NodeOrderFn)>,
    event_handlers: Vec<Arc<dyn EventHandler>>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Session {
    /// Open a session and let every plugin register itself
    pub fn open(nodes: impl IntoIterator<Item = NodeInfo>, plugins: Vec<Box<dyn Plugin>>) -> Self {
        let mut ssn = Self {
            uid: Uuid::new_v4(),
            nodes: nodes.into_iter().map(|n| (n.name.clone(), n)).collect(),
            node_order_fns: Vec::new(),
            event_handlers: Vec::new(),
            plugins: Vec::new(),
        };

        for plugin in &plugins {
            debug!("Opening plugin {} for session {}", plugin.name(), ssn.uid);
            plugin.on_session_open(&mut ssn);
        }
        ssn.plugins = plugins;

        info!(
            "Opened session {} with {} nodes and {} plugins",
            ssn.uid,
            ssn.nodes.len(),
            ssn.plugins.len()
        );

        ssn
    }

    /// Close the session, giving plugins a chance to release state
    pub fn close(mut self) {
        let plugins = std::mem::take(&mut self.plugins);
        for plugin in &plugins {
            plugin.on_session_close(&mut self);
        }
        self.node_order_fns.clear();
        self.event_handlers.clear();

        info!("Closed session {}", self.uid);
    }

    /// Nodes in the session, ordered by name
    pub fn nodes(&self) -> impl Iterator<Item = &NodeInfo> {
        self.nodes.values()
    }

    pub fn node(&self, name: &str) -> Option<&NodeInfo> {
        self.nodes.get(name)
    }

    pub fn add_node_order_fn(&mut self, name: &str, f: NodeOrderFn) {
        self.node_order_fns.push((name.to_string(), f));
    }

    pub fn add_event_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.event_handlers.push(handler);
    }

    /// Combined score of every registered scoring function
    pub fn node_order(&self, task: &TaskInfo, node: &NodeInfo) -> Result<f64> {
        let mut score = 0.0;
        for (name, f) in &self.node_order_fns {
            let s = f(task, node)?;
            debug!("Node order {} scored task {} on node {}: {}", name, task, node.name, s);
            score += s;
        }
        Ok(score)
    }

    /// Tentatively place `task` on `node_name`
    pub fn allocate(&self, task: &mut TaskInfo, node_name: &str) -> Result<()> {
        if !self.nodes.contains_key(node_name) {
            return Err(SchedulerError::node_not_found(node_name));
        }

        task.node_name = Some(node_name.to_string());
        self.dispatch(&SessionEvent::allocate(task.clone(), node_name));
        Ok(())
    }

    /// Undo a tentative placement of `task`
    pub fn deallocate(&self, task: &mut TaskInfo) -> Result<()> {
        let node_name = task
            .node_name
            .take()
            .ok_or_else(|| SchedulerError::task_not_bound(task.to_string(), ""))?;

        self.dispatch(&SessionEvent::deallocate(task.clone(), node_name));
        Ok(())
    }

    fn dispatch(&self, event: &SessionEvent) {
        debug!(
            "Session {} dispatching {} of task {} on node {}",
            self.uid, event.kind, event.task, event.node_name
        );
        for handler in &self.event_handlers {
            handler.handle(event);
        }
    }
}
