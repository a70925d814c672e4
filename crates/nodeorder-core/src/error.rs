// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Core error type for nodeorder operations
#[derive(Error, Debug, Diagnostic)]
pub enum CoreError {
    /// A label or node selector could not be turned into a matcher
    #[error("Invalid selector: {reason}")]
    #[diagnostic(
        code(nodeorder::invalid_selector),
        help("{suggestion}")
    )]
    InvalidSelector {
        #[allow(unused)]
        reason: String,
        #[allow(unused)]
        suggestion: String,
    },

    /// A resource quantity string could not be parsed
    #[error("Invalid quantity for {resource}: {value}")]
    #[diagnostic(
        code(nodeorder::invalid_quantity),
        help("Use Kubernetes quantity notation, e.g. '500m' or '2' for CPU and '128Mi' or '1Gi' for memory")
    )]
    InvalidQuantity {
        #[allow(unused)]
        resource: String,
        #[allow(unused)]
        value: String,
    },

    /// Serialization error
    #[error("Serialization error: {message}")]
    #[diagnostic(
        code(nodeorder::serialization_error),
        help("Ensure the input is valid YAML")
    )]
    SerializationError {
        #[allow(unused)]
        message: String,
        #[source]
        #[allow(unused)]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create an InvalidSelector error
    pub fn invalid_selector(reason: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::InvalidSelector {
            reason: reason.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an InvalidQuantity error
    pub fn invalid_quantity(resource: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidQuantity {
            resource: resource.into(),
            value: value.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::SerializationError {
            message: message.into(),
            source,
        }
    }
}
