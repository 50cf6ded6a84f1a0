//! Deployment bucket lifecycle

use crate::error::Result;
use crate::provider::{BucketApi, CreateBucketOutput};
use std::sync::Arc;

/// One named S3 bucket
pub struct BucketManager {
    api: Arc<dyn BucketApi>,
    name: String,
}

impl BucketManager {
    pub fn new(api: Arc<dyn BucketApi>, name: impl Into<String>) -> Self {
        Self {
            api,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn exists(&self) -> Result<bool> {
        let buckets = self.api.list_buckets().await?;
        Ok(buckets.iter().any(|b| *b == self.name))
    }

    /// Create the bucket unless it is already listed
    ///
    /// Returns `None` when nothing was created.
    pub async fn create(&self) -> Result<Option<CreateBucketOutput>> {
        if self.exists().await? {
            tracing::info!("Bucket {} already exists", self.name);
            return Ok(None);
        }

        tracing::info!("Creating bucket {}", self.name);
        let output = self.api.create_bucket(&self.name).await?;
        Ok(Some(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CloudError;
    use crate::testing::{StubBucketApi, StubBucketCall};

    const BUCKET: &str = "test-lambda-5f0e6c1d";

    fn manager(api: &Arc<StubBucketApi>) -> BucketManager {
        BucketManager::new(api.clone(), BUCKET)
    }

    #[tokio::test]
    async fn test_bucket_exists() {
        let api = Arc::new(StubBucketApi::new());
        api.add_bucket(BUCKET);

        assert!(manager(&api).exists().await.unwrap());
        assert_eq!(api.calls(), vec![StubBucketCall::ListBuckets]);
    }

    #[tokio::test]
    async fn test_bucket_does_not_exist() {
        let api = Arc::new(StubBucketApi::new());
        api.add_bucket("someone-elses-bucket");

        assert!(!manager(&api).exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_create_bucket() {
        let api = Arc::new(StubBucketApi::new());
        let manager = manager(&api);

        let output = manager.create().await.unwrap().unwrap();
        assert_eq!(output.location.as_deref(), Some("/test-lambda-5f0e6c1d"));
        assert_eq!(
            api.calls(),
            vec![
                StubBucketCall::ListBuckets,
                StubBucketCall::CreateBucket {
                    name: BUCKET.to_string(),
                },
            ]
        );
        assert!(manager.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_create_existing_bucket_is_noop() {
        let api = Arc::new(StubBucketApi::new());
        api.add_bucket(BUCKET);

        assert_eq!(manager(&api).create().await.unwrap(), None);
        assert_eq!(api.calls(), vec![StubBucketCall::ListBuckets]);
    }

    #[tokio::test]
    async fn test_create_failure_is_provider_error() {
        let api = Arc::new(StubBucketApi::new());
        api.fail_create(CloudError::provider(
            409,
            "BucketAlreadyExists: The requested bucket name is not available",
        ));

        let err = manager(&api).create().await.unwrap_err();
        assert_eq!(err.status(), Some(409));
    }
}
