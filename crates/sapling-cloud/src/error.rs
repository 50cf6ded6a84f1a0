//! Cloud error types

use thiserror::Error;

/// A structural problem found while validating a resource graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Logical id of the offending resource
    pub resource: String,

    /// What is wrong with it
    pub reason: String,
}

impl ValidationError {
    pub fn new(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.resource, self.reason)
    }
}

/// Cloud errors
///
/// `DuplicateName`, `UnknownReference`, `MissingFunction` and `Validation`
/// are raised locally and never after a provider call has been made.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource name already declared: {0}")]
    DuplicateName(String),

    #[error("Reference to undeclared resource: {0}")]
    UnknownReference(String),

    #[error("No Lambda function declared before API gateway {0}")]
    MissingFunction(String),

    #[error("Template validation failed: {}", format_violations(.0))]
    Validation(Vec<ValidationError>),

    #[error("Provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Stack {stack} has no resource of type {resource_type}")]
    ResourceNotFound {
        stack: String,
        resource_type: String,
    },

    #[error("Stack not found: {0}")]
    StackNotFound(String),

    #[error("Timed out waiting for stack {stack} to be deleted after {attempts} attempts")]
    DeleteTimeout { stack: String, attempts: u32 },

    #[error("No code or handler given to update Lambda function {0}")]
    NothingToUpdate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub fn provider(status: u16, message: impl Into<String>) -> Self {
        Self::Provider {
            status,
            message: message.into(),
        }
    }

    /// The provider's own status code, if this error came from the provider
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn format_violations(violations: &[ValidationError]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, CloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_violation() {
        let err = CloudError::Validation(vec![
            ValidationError::new("Role", "no policies"),
            ValidationError::new("Fn", "missing handler"),
        ]);
        assert_eq!(
            err.to_string(),
            "Template validation failed: Role: no policies; Fn: missing handler"
        );
    }

    #[test]
    fn test_provider_status() {
        let err = CloudError::provider(400, "ValidationError: Stack already exists");
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            err.to_string(),
            "Provider error (400): ValidationError: Stack already exists"
        );
        assert_eq!(CloudError::StackNotFound("s".into()).status(), None);
    }
}
