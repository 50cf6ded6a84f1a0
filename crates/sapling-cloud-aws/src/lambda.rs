//! Lambda implementation of [`FunctionApi`]

use crate::error::provider_error;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_lambda::Client;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::LastUpdateStatus;
use sapling_cloud::{FunctionApi, FunctionUpdate, Result, UpdateStatus};

pub struct AwsFunctionApi {
    client: Client,
}

impl AwsFunctionApi {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

fn from_sdk_update_status(status: Option<&LastUpdateStatus>, reason: Option<&str>) -> UpdateStatus {
    match status {
        Some(LastUpdateStatus::Successful) => UpdateStatus::Successful,
        Some(LastUpdateStatus::InProgress) => UpdateStatus::InProgress,
        Some(LastUpdateStatus::Failed) => UpdateStatus::Failed {
            reason: reason.map(str::to_string),
        },
        _ => UpdateStatus::Unknown,
    }
}

#[async_trait]
impl FunctionApi for AwsFunctionApi {
    async fn list_functions(&self) -> Result<Vec<String>> {
        let mut pages = self.client.list_functions().into_paginator().send();

        let mut names = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(provider_error)?;
            names.extend(
                page.functions()
                    .iter()
                    .filter_map(|f| f.function_name())
                    .map(str::to_string),
            );
        }
        Ok(names)
    }

    async fn update_function_code(
        &self,
        name: &str,
        zip_bytes: Vec<u8>,
    ) -> Result<FunctionUpdate> {
        let output = self
            .client
            .update_function_code()
            .function_name(name)
            .zip_file(Blob::new(zip_bytes))
            .send()
            .await
            .map_err(provider_error)?;

        Ok(FunctionUpdate {
            function_name: output.function_name().unwrap_or(name).to_string(),
            status: from_sdk_update_status(
                output.last_update_status(),
                output.last_update_status_reason(),
            ),
            code_size: output.code_size(),
            handler: output.handler().map(str::to_string),
        })
    }

    async fn update_function_handler(&self, name: &str, handler: &str) -> Result<FunctionUpdate> {
        let output = self
            .client
            .update_function_configuration()
            .function_name(name)
            .handler(handler)
            .send()
            .await
            .map_err(provider_error)?;

        Ok(FunctionUpdate {
            function_name: output.function_name().unwrap_or(name).to_string(),
            status: from_sdk_update_status(
                output.last_update_status(),
                output.last_update_status_reason(),
            ),
            code_size: output.code_size(),
            handler: output.handler().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_status_mapping() {
        assert_eq!(
            from_sdk_update_status(Some(&LastUpdateStatus::InProgress), None),
            UpdateStatus::InProgress
        );
        assert_eq!(
            from_sdk_update_status(Some(&LastUpdateStatus::Failed), Some("EniLimitExceeded")),
            UpdateStatus::Failed {
                reason: Some("EniLimitExceeded".to_string())
            }
        );
        assert_eq!(from_sdk_update_status(None, None), UpdateStatus::Unknown);
    }
}
