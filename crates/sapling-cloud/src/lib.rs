//! Sapling Cloud
//!
//! Declarative CloudFormation templates for a serverless web application and
//! the stack lifecycle around them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  sapling CLI                     │
//! │          (scaffold / exists / update)            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                sapling-cloud                     │
//! │  ┌──────────────────┐  ┌──────────────────────┐ │
//! │  │ TemplateBuilder  │  │ StackDeployer        │ │
//! │  │ ResourceGraph    │  │ StackResourceIndex   │ │
//! │  └──────────────────┘  └──────────┬───────────┘ │
//! │   trait StackApi / FunctionApi / BucketApi       │
//! └───────────────────────────────────┬─────────────┘
//!                                     │
//!                           ┌─────────▼─────────┐
//!                           │ sapling-cloud-aws │
//!                           └───────────────────┘
//! ```

pub mod bucket;
pub mod builder;
pub mod deployer;
pub mod error;
pub mod function;
pub mod index;
pub mod naming;
pub mod poll;
pub mod provider;
pub mod template;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-exports
pub use bucket::BucketManager;
pub use builder::{FunctionRef, GatewayRef, RoleRef, TemplateBuilder};
pub use deployer::{DeployOutcome, StackDeployer};
pub use error::{CloudError, Result, ValidationError};
pub use function::FunctionUpdater;
pub use index::StackResourceIndex;
pub use naming::{NameRole, derived_name};
pub use poll::{PollConfig, poll_until};
pub use provider::{
    BucketApi, Capability, CreateBucketOutput, CreateStackOutput, FunctionApi, FunctionUpdate,
    ResourceSummary, StackApi, StackStatus, StackSummary, UpdateStatus,
};
pub use template::{FunctionCode, Output, Resource, ResourceGraph, ResourceKind, Template, Value};
