//! S3 implementation of [`BucketApi`]

use crate::error::provider_error;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use sapling_cloud::{BucketApi, CreateBucketOutput, Result};

/// Region that rejects an explicit location constraint
const DEFAULT_REGION: &str = "us-east-1";

pub struct AwsBucketApi {
    client: Client,
    region: Option<String>,
}

impl AwsBucketApi {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
            region: config.region().map(|r| r.to_string()),
        }
    }
}

fn location_constraint(region: Option<&str>) -> Option<CreateBucketConfiguration> {
    let region = region.filter(|r| *r != DEFAULT_REGION)?;
    Some(
        CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(region))
            .build(),
    )
}

#[async_trait]
impl BucketApi for AwsBucketApi {
    async fn list_buckets(&self) -> Result<Vec<String>> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(provider_error)?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|b| b.name())
            .map(str::to_string)
            .collect())
    }

    async fn create_bucket(&self, name: &str) -> Result<CreateBucketOutput> {
        let output = self
            .client
            .create_bucket()
            .bucket(name)
            .set_create_bucket_configuration(location_constraint(self.region.as_deref()))
            .send()
            .await
            .map_err(provider_error)?;

        Ok(CreateBucketOutput {
            location: output.location().map(str::to_string),
        })
    }
}
