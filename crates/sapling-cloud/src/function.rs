//! In-place updates of a deployed Lambda function

use crate::error::{CloudError, Result};
use crate::provider::{FunctionApi, FunctionUpdate};
use std::path::Path;
use std::sync::Arc;

pub struct FunctionUpdater {
    api: Arc<dyn FunctionApi>,
}

impl FunctionUpdater {
    pub fn new(api: Arc<dyn FunctionApi>) -> Self {
        Self { api }
    }

    pub async fn exists(&self, function_name: &str) -> Result<bool> {
        let functions = self.api.list_functions().await?;
        Ok(functions.iter().any(|f| f == function_name))
    }

    /// Upload new code, a new handler, or both
    ///
    /// Code goes first. If Lambda reports the code update as failed its
    /// response is returned and the handler is left alone.
    pub async fn update(
        &self,
        function_name: &str,
        code: Option<&Path>,
        handler: Option<&str>,
    ) -> Result<FunctionUpdate> {
        if code.is_none() && handler.is_none() {
            return Err(CloudError::NothingToUpdate(function_name.to_string()));
        }

        let mut last = None;

        if let Some(path) = code {
            let zip_bytes = tokio::fs::read(path).await?;
            tracing::info!(
                "Uploading {} ({} bytes) to lambda function {}",
                path.display(),
                zip_bytes.len(),
                function_name
            );
            let update = self.api.update_function_code(function_name, zip_bytes).await?;
            if !update.is_success() {
                tracing::warn!(
                    "Code update for {} reported {:?}",
                    function_name,
                    update.status
                );
                return Ok(update);
            }
            last = Some(update);
        }

        if let Some(handler) = handler {
            tracing::info!("Setting handler of {} to {}", function_name, handler);
            last = Some(self.api.update_function_handler(function_name, handler).await?);
        }

        last.ok_or_else(|| CloudError::NothingToUpdate(function_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::UpdateStatus;
    use crate::testing::{StubFunctionApi, StubFunctionCall};
    use std::io::ErrorKind;
    use tempfile::TempDir;

    const FUNCTION: &str = "UnitTestFunctionName";

    fn code_file(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("lambda.zip");
        std::fs::write(&path, b"PK\x05\x06").unwrap();
        path
    }

    #[tokio::test]
    async fn test_exists() {
        let api = Arc::new(StubFunctionApi::new());
        api.add_function(FUNCTION);
        let updater = FunctionUpdater::new(api);

        assert!(updater.exists(FUNCTION).await.unwrap());
        assert!(!updater.exists("Missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_requires_code_or_handler() {
        let api = Arc::new(StubFunctionApi::new());
        let err = FunctionUpdater::new(api.clone())
            .update(FUNCTION, None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, CloudError::NothingToUpdate(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_code_file() {
        let dir = TempDir::new().unwrap();
        let api = Arc::new(StubFunctionApi::new());
        let err = FunctionUpdater::new(api.clone())
            .update(FUNCTION, Some(&dir.path().join("nope.zip")), None)
            .await
            .unwrap_err();

        assert!(matches!(err, CloudError::Io(ref e) if e.kind() == ErrorKind::NotFound));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_code_then_handler() {
        let dir = TempDir::new().unwrap();
        let path = code_file(&dir);
        let api = Arc::new(StubFunctionApi::new());

        let update = FunctionUpdater::new(api.clone())
            .update(FUNCTION, Some(&path), Some("app.handler"))
            .await
            .unwrap();

        assert!(update.is_success());
        assert_eq!(update.handler.as_deref(), Some("app.handler"));
        assert_eq!(
            api.calls(),
            vec![
                StubFunctionCall::UpdateCode {
                    name: FUNCTION.to_string(),
                    size: 4,
                },
                StubFunctionCall::UpdateHandler {
                    name: FUNCTION.to_string(),
                    handler: "app.handler".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_code_upload_skips_handler() {
        let dir = TempDir::new().unwrap();
        let path = code_file(&dir);
        let api = Arc::new(StubFunctionApi::new());
        api.set_code_status(UpdateStatus::Failed {
            reason: Some("Code storage limit exceeded".to_string()),
        });

        let update = FunctionUpdater::new(api.clone())
            .update(FUNCTION, Some(&path), Some("app.handler"))
            .await
            .unwrap();

        assert!(!update.is_success());
        assert_eq!(api.calls().len(), 1);
    }
}
