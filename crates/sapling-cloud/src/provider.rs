//! Provider API traits
//!
//! The deployer, the resource index and the bucket manager only talk to
//! CloudFormation, Lambda and S3 through these traits. `sapling-cloud-aws` implements them on the
//! AWS SDK; tests use the in-memory stubs in [`crate::testing`].

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// CloudFormation stack status
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackStatus {
    CreateInProgress,
    CreateFailed,
    CreateComplete,
    RollbackInProgress,
    RollbackFailed,
    RollbackComplete,
    DeleteInProgress,
    DeleteFailed,
    DeleteComplete,
    UpdateInProgress,
    UpdateComplete,
    UpdateRollbackComplete,
    /// Anything this crate does not model
    Other(String),
}

impl StackStatus {
    /// Statuses under which a stack still occupies its name
    ///
    /// Excludes `DELETE_COMPLETE`: a deleted stack and one that
    /// never existed look the same.
    pub const PRESENT: [StackStatus; 8] = [
        StackStatus::CreateInProgress,
        StackStatus::CreateFailed,
        StackStatus::CreateComplete,
        StackStatus::DeleteInProgress,
        StackStatus::DeleteFailed,
        StackStatus::RollbackComplete,
        StackStatus::RollbackInProgress,
        StackStatus::UpdateRollbackComplete,
    ];

    pub const READY: [StackStatus; 1] = [StackStatus::CreateComplete];

    pub fn as_str(&self) -> &str {
        match self {
            Self::CreateInProgress => "CREATE_IN_PROGRESS",
            Self::CreateFailed => "CREATE_FAILED",
            Self::CreateComplete => "CREATE_COMPLETE",
            Self::RollbackInProgress => "ROLLBACK_IN_PROGRESS",
            Self::RollbackFailed => "ROLLBACK_FAILED",
            Self::RollbackComplete => "ROLLBACK_COMPLETE",
            Self::DeleteInProgress => "DELETE_IN_PROGRESS",
            Self::DeleteFailed => "DELETE_FAILED",
            Self::DeleteComplete => "DELETE_COMPLETE",
            Self::UpdateInProgress => "UPDATE_IN_PROGRESS",
            Self::UpdateComplete => "UPDATE_COMPLETE",
            Self::UpdateRollbackComplete => "UPDATE_ROLLBACK_COMPLETE",
            Self::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "CREATE_IN_PROGRESS" => Self::CreateInProgress,
            "CREATE_FAILED" => Self::CreateFailed,
            "CREATE_COMPLETE" => Self::CreateComplete,
            "ROLLBACK_IN_PROGRESS" => Self::RollbackInProgress,
            "ROLLBACK_FAILED" => Self::RollbackFailed,
            "ROLLBACK_COMPLETE" => Self::RollbackComplete,
            "DELETE_IN_PROGRESS" => Self::DeleteInProgress,
            "DELETE_FAILED" => Self::DeleteFailed,
            "DELETE_COMPLETE" => Self::DeleteComplete,
            "UPDATE_IN_PROGRESS" => Self::UpdateInProgress,
            "UPDATE_COMPLETE" => Self::UpdateComplete,
            "UPDATE_ROLLBACK_COMPLETE" => Self::UpdateRollbackComplete,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_present(&self) -> bool {
        Self::PRESENT.contains(self)
    }

    pub fn is_ready(&self) -> bool {
        Self::READY.contains(self)
    }
}

impl std::fmt::Display for StackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acknowledgement that a template may create IAM resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    Iam,
    NamedIam,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Iam => "CAPABILITY_IAM",
            Capability::NamedIam => "CAPABILITY_NAMED_IAM",
        }
    }
}

/// One entry of a `ListStacks` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSummary {
    pub name: String,
    pub id: String,
    pub status: StackStatus,
}

/// One physical resource in a deployed stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub logical_id: String,
    pub physical_id: String,
    pub resource_type: String,
    pub status: String,
}

/// Result of `CreateStack`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStackOutput {
    pub stack_id: String,
}

/// Lambda's `LastUpdateStatus` as reported by an update call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateStatus {
    Successful,
    InProgress,
    Failed { reason: Option<String> },
    /// Not reported by the service
    Unknown,
}

/// Result of a Lambda code or configuration update
///
/// Rejected requests surface as `CloudError::Provider`; an accepted update
/// can still report [`UpdateStatus::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionUpdate {
    pub function_name: String,
    pub status: UpdateStatus,
    pub code_size: i64,
    pub handler: Option<String>,
}

impl FunctionUpdate {
    pub fn is_success(&self) -> bool {
        !matches!(self.status, UpdateStatus::Failed { .. })
    }
}

/// CloudFormation stack operations
///
/// Implementations return `CloudError::Provider` carrying the provider's own
/// status code and message on failure, and never retry.
#[async_trait]
pub trait StackApi: Send + Sync {
    /// Stacks whose status is one of `filter`
    async fn list_stacks(&self, filter: &[StackStatus]) -> Result<Vec<StackSummary>>;

    async fn create_stack(
        &self,
        name: &str,
        template_body: &str,
        capabilities: &[Capability],
    ) -> Result<CreateStackOutput>;

    /// Start deleting a stack
    async fn delete_stack(&self, name: &str) -> Result<()>;

    async fn list_stack_resources(&self, name: &str) -> Result<Vec<ResourceSummary>>;

    /// Whether a stack called `name` is listed under one of `filter`
    async fn has_stack(&self, name: &str, filter: &[StackStatus]) -> Result<bool> {
        let stacks = self.list_stacks(filter).await?;
        Ok(stacks
            .iter()
            .any(|s| s.name == name && filter.contains(&s.status)))
    }
}

/// Lambda function operations
#[async_trait]
pub trait FunctionApi: Send + Sync {
    /// Names of every function in the account and region
    async fn list_functions(&self) -> Result<Vec<String>>;

    async fn update_function_code(&self, name: &str, zip_bytes: Vec<u8>)
    -> Result<FunctionUpdate>;

    async fn update_function_handler(&self, name: &str, handler: &str) -> Result<FunctionUpdate>;
}

/// Result of `CreateBucket`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBucketOutput {
    pub location: Option<String>,
}

/// S3 bucket operations
#[async_trait]
pub trait BucketApi: Send + Sync {
    /// Names of every bucket owned by the caller
    async fn list_buckets(&self) -> Result<Vec<String>>;

    async fn create_bucket(&self, name: &str) -> Result<CreateBucketOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_and_membership() {
        for status in StackStatus::PRESENT.iter().chain(StackStatus::READY.iter()) {
            assert_eq!(&StackStatus::parse(status.as_str()), status);
        }

        assert!(StackStatus::CreateComplete.is_present());
        assert!(StackStatus::CreateComplete.is_ready());
        assert!(StackStatus::CreateFailed.is_present());
        assert!(!StackStatus::CreateFailed.is_ready());
        assert!(!StackStatus::DeleteComplete.is_present());
        assert_eq!(
            StackStatus::parse("IMPORT_COMPLETE"),
            StackStatus::Other("IMPORT_COMPLETE".to_string())
        );
    }

    #[test]
    fn test_capability_wire_names() {
        assert_eq!(Capability::Iam.as_str(), "CAPABILITY_IAM");
        assert_eq!(Capability::NamedIam.as_str(), "CAPABILITY_NAMED_IAM");
    }
}
