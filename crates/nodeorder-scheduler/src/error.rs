// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Scheduler error type
#[derive(Error, Debug, Diagnostic)]
pub enum SchedulerError {
    /// Node is not part of the session's index
    #[error("Node not found: {node_name}")]
    #[diagnostic(
        code(scheduler::node_not_found),
        help("The node is not part of the current scheduling session")
    )]
    NodeNotFound { node_name: String },

    /// Task is not bound to the node it is being removed from
    #[error("Task {task} is not bound to node {node_name}")]
    #[diagnostic(
        code(scheduler::task_not_bound),
        help("Deallocate events must name the node the task was allocated to")
    )]
    TaskNotBound { task: String, node_name: String },

    /// Node capacity could not be determined
    #[error("Capacity of node {node_name} is unavailable: {reason}")]
    #[diagnostic(
        code(scheduler::capacity_unavailable),
        help("Check that the node reports status.allocatable for cpu and memory")
    )]
    CapacityUnavailable { node_name: String, reason: String },

    /// A scoring heuristic failed
    #[error("{priority} priority failed: {source}")]
    #[diagnostic(
        code(scheduler::priority_failed),
        help("The node stays unscored for this task")
    )]
    PriorityFailed {
        priority: String,
        #[source]
        source: Box<SchedulerError>,
    },

    /// Plugin name in the configuration has no registered builder
    #[error("Unknown plugin: {name}")]
    #[diagnostic(
        code(scheduler::unknown_plugin),
        help("Registered plugins: {registered}")
    )]
    UnknownPlugin { name: String, registered: String },

    /// Scheduler configuration could not be loaded
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(scheduler::config_error),
        help("Check the scheduler configuration file")
    )]
    ConfigError { message: String },

    /// Core error
    #[error("Core error: {0}")]
    #[diagnostic(
        code(scheduler::core_error),
        help("This is an internal error")
    )]
    CoreError(#[from] nodeorder_core::CoreError),

    /// Internal error
    #[error("Internal error: {message}")]
    #[diagnostic(
        code(scheduler::internal_error),
        help("This is likely a bug. Please report it")
    )]
    InternalError { message: String },
}

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;

impl SchedulerError {
    /// Create a NodeNotFound error
    pub fn node_not_found(node_name: impl Into<String>) -> Self {
        Self::NodeNotFound {
            node_name: node_name.into(),
        }
    }

    /// Create a TaskNotBound error
    pub fn task_not_bound(task: impl Into<String>, node_name: impl Into<String>) -> Self {
        Self::TaskNotBound {
            task: task.into(),
            node_name: node_name.into(),
        }
    }

    /// Create a CapacityUnavailable error
    pub fn capacity_unavailable(node_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CapacityUnavailable {
            node_name: node_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a PriorityFailed error
    pub fn priority_failed(priority: impl Into<String>, source: SchedulerError) -> Self {
        Self::PriorityFailed {
            priority: priority.into(),
            source: Box::new(source),
        }
    }

    /// Create an UnknownPlugin error
    pub fn unknown_plugin(name: impl Into<String>, registered: &[&str]) -> Self {
        Self::UnknownPlugin {
            name: name.into(),
            registered: registered.join(", "),
        }
    }

    /// Create a ConfigError
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an InternalError
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}
