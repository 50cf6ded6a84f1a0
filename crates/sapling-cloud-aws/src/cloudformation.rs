//! CloudFormation implementation of [`StackApi`]

use crate::error::provider_error;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudformation::Client;
use aws_sdk_cloudformation::types as cfn;
use sapling_cloud::{
    Capability, CreateStackOutput, ResourceSummary, Result, StackApi, StackStatus, StackSummary,
};

pub struct AwsStackApi {
    client: Client,
}

impl AwsStackApi {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

fn to_sdk_status(status: &StackStatus) -> cfn::StackStatus {
    cfn::StackStatus::from(status.as_str())
}

fn to_sdk_capability(capability: &Capability) -> cfn::Capability {
    cfn::Capability::from(capability.as_str())
}

fn from_sdk_summary(summary: &cfn::StackSummary) -> StackSummary {
    StackSummary {
        name: summary.stack_name().unwrap_or_default().to_string(),
        id: summary.stack_id().unwrap_or_default().to_string(),
        status: summary
            .stack_status()
            .map(|s| StackStatus::parse(s.as_str()))
            .unwrap_or_else(|| StackStatus::Other(String::new())),
    }
}

fn from_sdk_resource(resource: &cfn::StackResourceSummary) -> ResourceSummary {
    ResourceSummary {
        logical_id: resource.logical_resource_id().unwrap_or_default().to_string(),
        physical_id: resource.physical_resource_id().unwrap_or_default().to_string(),
        resource_type: resource.resource_type().unwrap_or_default().to_string(),
        status: resource
            .resource_status()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
    }
}

#[async_trait]
impl StackApi for AwsStackApi {
    async fn list_stacks(&self, filter: &[StackStatus]) -> Result<Vec<StackSummary>> {
        let mut pages = self
            .client
            .list_stacks()
            .set_stack_status_filter(Some(filter.iter().map(to_sdk_status).collect()))
            .into_paginator()
            .send();

        let mut stacks = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(provider_error)?;
            stacks.extend(page.stack_summaries().iter().map(from_sdk_summary));
        }

        tracing::debug!("ListStacks returned {} stacks", stacks.len());
        Ok(stacks)
    }

    async fn create_stack(
        &self,
        name: &str,
        template_body: &str,
        capabilities: &[Capability],
    ) -> Result<CreateStackOutput> {
        let output = self
            .client
            .create_stack()
            .stack_name(name)
            .template_body(template_body)
            .set_capabilities(Some(capabilities.iter().map(to_sdk_capability).collect()))
            .send()
            .await
            .map_err(provider_error)?;

        Ok(CreateStackOutput {
            stack_id: output.stack_id().unwrap_or_default().to_string(),
        })
    }

    async fn delete_stack(&self, name: &str) -> Result<()> {
        self.client
            .delete_stack()
            .stack_name(name)
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }

    async fn list_stack_resources(&self, name: &str) -> Result<Vec<ResourceSummary>> {
        let mut pages = self
            .client
            .list_stack_resources()
            .stack_name(name)
            .into_paginator()
            .send();

        let mut resources = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(provider_error)?;
            resources.extend(page.stack_resource_summaries().iter().map(from_sdk_resource));
        }
        Ok(resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter_uses_wire_names() {
        for status in StackStatus::PRESENT.iter() {
            let sdk = to_sdk_status(status);
            assert_eq!(sdk.as_str(), status.as_str());
            assert_eq!(&StackStatus::parse(sdk.as_str()), status);
        }
        assert_eq!(to_sdk_status(&StackStatus::CreateComplete), cfn::StackStatus::CreateComplete);
    }

    #[test]
    fn test_capability_mapping() {
        assert_eq!(to_sdk_capability(&Capability::Iam), cfn::Capability::CapabilityIam);
        assert_eq!(
            to_sdk_capability(&Capability::NamedIam),
            cfn::Capability::CapabilityNamedIam
        );
    }
}
