//! Lookup of physical resources in a deployed stack

use crate::error::{CloudError, Result};
use crate::provider::{ResourceSummary, StackApi, StackStatus};
use crate::template::type_tag;
use std::sync::Arc;

/// Maps logical resources of a live stack to their physical ids
pub struct StackResourceIndex {
    api: Arc<dyn StackApi>,
}

impl StackResourceIndex {
    pub fn new(api: Arc<dyn StackApi>) -> Self {
        Self { api }
    }

    pub async fn list_resources(&self, stack_name: &str) -> Result<Vec<ResourceSummary>> {
        let resources = self.api.list_stack_resources(stack_name).await?;
        tracing::debug!("Stack {} has {} resources", stack_name, resources.len());
        Ok(resources)
    }

    /// First resource of `resource_type` in the stack
    pub async fn find_by_type(
        &self,
        stack_name: &str,
        resource_type: &str,
    ) -> Result<ResourceSummary> {
        if !self.api.has_stack(stack_name, &StackStatus::PRESENT).await? {
            return Err(CloudError::StackNotFound(stack_name.to_string()));
        }

        self.list_resources(stack_name)
            .await?
            .into_iter()
            .find(|r| r.resource_type == resource_type)
            .ok_or_else(|| CloudError::ResourceNotFound {
                stack: stack_name.to_string(),
                resource_type: resource_type.to_string(),
            })
    }

    /// Physical name of the stack's Lambda function
    pub async fn function_name(&self, stack_name: &str) -> Result<String> {
        let function = self.find_by_type(stack_name, type_tag::FUNCTION).await?;
        tracing::info!("Found lambda function {}", function.physical_id);
        Ok(function.physical_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubStackApi;

    const STACK: &str = "IndexStack";

    fn summary(logical: &str, physical: &str, resource_type: &str) -> ResourceSummary {
        ResourceSummary {
            logical_id: logical.to_string(),
            physical_id: physical.to_string(),
            resource_type: resource_type.to_string(),
            status: "CREATE_COMPLETE".to_string(),
        }
    }

    fn deployed() -> Arc<StubStackApi> {
        let api = Arc::new(StubStackApi::new());
        api.push_listing(vec![(STACK, StackStatus::CreateComplete)]);
        api.set_resources(
            STACK,
            vec![
                summary("LambdaExecutionRole", "IndexStack-Role-1X2Y", type_tag::ROLE),
                summary("EchoFunction", "IndexStack-EchoFunction-9QW8", type_tag::FUNCTION),
                summary("EchoApi", "a1b2c3d4e5", type_tag::REST_API),
            ],
        );
        api
    }

    #[tokio::test]
    async fn test_function_name_resolves_physical_id() {
        let index = StackResourceIndex::new(deployed());
        assert_eq!(
            index.function_name(STACK).await.unwrap(),
            "IndexStack-EchoFunction-9QW8"
        );
    }

    #[tokio::test]
    async fn test_list_resources_keeps_provider_order() {
        let index = StackResourceIndex::new(deployed());
        let logical: Vec<String> = index
            .list_resources(STACK)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.logical_id)
            .collect();
        assert_eq!(logical, vec!["LambdaExecutionRole", "EchoFunction", "EchoApi"]);
    }

    #[tokio::test]
    async fn test_missing_type_is_resource_not_found() {
        let index = StackResourceIndex::new(deployed());
        let err = index.find_by_type(STACK, type_tag::BUCKET).await.unwrap_err();
        assert!(matches!(
            err,
            CloudError::ResourceNotFound { ref stack, ref resource_type }
                if stack == STACK && resource_type == type_tag::BUCKET
        ));
    }

    #[tokio::test]
    async fn test_absent_stack_is_stack_not_found() {
        let api = Arc::new(StubStackApi::new());
        api.push_listing(Vec::new());
        let index = StackResourceIndex::new(api.clone());

        let err = index.function_name(STACK).await.unwrap_err();
        assert!(matches!(err, CloudError::StackNotFound(ref s) if s == STACK));
        assert_eq!(api.calls().len(), 1);
    }
}
