use crate::types::TaskInfo;
use std::fmt;

/// Lifecycle event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEventKind {
    Allocate,
    Deallocate,
}

impl fmt::Display for SessionEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocate => write!(f, "allocate"),
            Self::Deallocate => write!(f, "deallocate"),
        }
    }
}

/// A tentative placement change emitted by the scheduling session
#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub kind: SessionEventKind,
    /// The task as it was when the event was raised
    pub task: TaskInfo,
    /// Node the task is placed on (allocate) or removed from (deallocate)
    pub node_name: String,
}

impl SessionEvent {
    /// Create an allocate event
    pub fn allocate(task: TaskInfo, node_name: impl Into<String>) -> Self {
        Self {
            kind: SessionEventKind::Allocate,
            task,
            node_name: node_name.into(),
        }
    }

    /// Create a deallocate event
    pub fn deallocate(task: TaskInfo, node_name: impl Into<String>) -> Self {
        Self {
            kind: SessionEventKind::Deallocate,
            task,
            node_name: node_name.into(),
        }
    }
}
