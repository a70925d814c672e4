//! Nodeorder Core - Fundamental types for the node scoring core
//!
//! This crate provides:
//! - Task and node views over Kubernetes pods and nodes
//! - Resource quantity parsing and arithmetic
//! - Label and node selector evaluation
//! - Session lifecycle events
//! - Error types with miette diagnostics
//! - YAML loading helpers

pub mod error;
pub mod events;
pub mod labels;
pub mod resources;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use events::{SessionEvent, SessionEventKind};
pub use labels::{Operator, Requirement, Selector};
pub use resources::ResourceQuantities;
pub use types::{NodeInfo, TaskId, TaskInfo};

// Re-export k8s-openapi types for convenience
pub use k8s_openapi;
pub use k8s_openapi::api::core::v1::{Node, Pod};
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use std::path::Path;

/// Deserialize a value from YAML
pub fn from_yaml<T: for<'de> serde::Deserialize<'de>>(data: &str) -> Result<T> {
    serde_yaml::from_str(data).map_err(|e| {
        CoreError::serialization_error(
            format!("Failed to deserialize from YAML: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Read and deserialize a YAML file
pub fn from_yaml_file<T: for<'de> serde::Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path).map_err(|e| {
        CoreError::serialization_error(
            format!("Failed to read {}: {}", path.display(), e),
            Some(Box::new(e)),
        )
    })?;
    from_yaml(&data)
}
