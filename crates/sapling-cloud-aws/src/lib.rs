//! AWS provider for Sapling
//!
//! Implements [`sapling_cloud::StackApi`] on CloudFormation,
//! [`sapling_cloud::FunctionApi`] on Lambda and [`sapling_cloud::BucketApi`]
//! on S3. Region and credentials come
//! from the standard AWS default chain (environment, profile, instance
//! metadata).

pub mod cloudformation;
pub mod error;
pub mod lambda;
pub mod s3;

pub use cloudformation::AwsStackApi;
pub use lambda::AwsFunctionApi;
pub use s3::AwsBucketApi;

use aws_config::{BehaviorVersion, SdkConfig};
use sapling_cloud::{BucketApi, FunctionApi, StackApi};
use std::sync::Arc;

/// Load SDK configuration from the default chain
pub async fn load_config() -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest()).load().await
}

/// Provider clients, ready to hand to the cloud components
pub struct AwsProviders {
    pub stacks: Arc<dyn StackApi>,
    pub functions: Arc<dyn FunctionApi>,
    pub buckets: Arc<dyn BucketApi>,
}

impl AwsProviders {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            stacks: Arc::new(AwsStackApi::new(config)),
            functions: Arc::new(AwsFunctionApi::new(config)),
            buckets: Arc::new(AwsBucketApi::new(config)),
        }
    }

    pub async fn from_env() -> Self {
        let config = load_config().await;
        tracing::debug!("AWS region: {:?}", config.region());
        Self::new(&config)
    }
}
