//! Stack deployment
//!
//! Deploys replace the whole stack: an existing stack of the same name is
//! deleted, the deletion is waited out, and a fresh stack is created from
//! the current graph. Delete and create are two separate provider calls; a
//! crash in between leaves no stack behind and the next deploy just creates
//! one.

use crate::error::{CloudError, Result};
use crate::poll::{PollConfig, poll_until};
use crate::provider::{Capability, CreateStackOutput, StackApi, StackStatus};
use crate::template::ResourceGraph;
use std::sync::Arc;

/// What a deploy did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// Nothing was sent to the provider
    DryRun { template_body: String },
    /// A new stack was requested
    Created(CreateStackOutput),
}

impl DeployOutcome {
    pub fn stack_id(&self) -> Option<&str> {
        match self {
            DeployOutcome::DryRun { .. } => None,
            DeployOutcome::Created(output) => Some(&output.stack_id),
        }
    }
}

/// Drives one named stack through CloudFormation
pub struct StackDeployer {
    api: Arc<dyn StackApi>,
    stack_name: String,
    delete_poll: PollConfig,
}

impl StackDeployer {
    pub fn new(api: Arc<dyn StackApi>, stack_name: impl Into<String>) -> Self {
        Self {
            api,
            stack_name: stack_name.into(),
            delete_poll: PollConfig::default(),
        }
    }

    /// Polling used while waiting for an old stack to disappear
    pub fn with_delete_poll(mut self, delete_poll: PollConfig) -> Self {
        self.delete_poll = delete_poll;
        self
    }

    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    /// Whether `stack_name` is in any status other than fully deleted
    pub async fn exists(&self, stack_name: &str) -> Result<bool> {
        self.api.has_stack(stack_name, &StackStatus::PRESENT).await
    }

    /// Whether `stack_name` finished creating successfully
    pub async fn ready(&self, stack_name: &str) -> Result<bool> {
        self.api.has_stack(stack_name, &StackStatus::READY).await
    }

    /// Poll [`ready`](Self::ready) until it holds or `poll` runs out
    pub async fn stack_ready(&self, stack_name: &str, poll: &PollConfig) -> Result<bool> {
        let what = format!("stack {} to be ready", stack_name);
        poll_until(poll, &what, move || self.ready(stack_name)).await
    }

    /// Delete the stack and wait until it no longer exists
    pub async fn delete_and_wait(&self) -> Result<()> {
        tracing::info!("Cloudformation stack exists, deleting...");
        self.api.delete_stack(&self.stack_name).await?;

        let what = format!("stack {} to be deleted", self.stack_name);
        let gone = poll_until(&self.delete_poll, &what, move || async move {
            self.exists(&self.stack_name).await.map(|present| !present)
        })
        .await?;

        if gone {
            Ok(())
        } else {
            Err(CloudError::DeleteTimeout {
                stack: self.stack_name.clone(),
                attempts: self.delete_poll.max_attempts,
            })
        }
    }

    /// Replace the stack with one built from `graph`
    ///
    /// The graph is validated before anything is sent. With `dry_run` the
    /// provider is not contacted at all.
    pub async fn deploy(&self, graph: &ResourceGraph, dry_run: bool) -> Result<DeployOutcome> {
        tracing::info!("Deploying Cloudformation Template...");
        let template_body = graph.to_json()?;
        tracing::debug!("Template body is {} bytes", template_body.len());

        if dry_run {
            tracing::warn!("Running in dry mode, not deploying...");
            return Ok(DeployOutcome::DryRun { template_body });
        }

        if self.exists(&self.stack_name).await? {
            self.delete_and_wait().await?;
        }

        tracing::info!("Creating Cloudformation stack {}", self.stack_name);
        let output = self
            .api
            .create_stack(&self.stack_name, &template_body, &[Capability::Iam])
            .await?;
        tracing::info!("Created stack {}", output.stack_id);

        Ok(DeployOutcome::Created(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TemplateBuilder;
    use crate::testing::{StubStackApi, StubStackCall};
    use std::time::Duration;

    const STACK: &str = "UnitTestStack";

    fn scaffold_graph() -> ResourceGraph {
        let mut builder = TemplateBuilder::new();
        builder.add_lambda("EchoFunction").unwrap();
        builder.add_api_gateway("EchoApi").unwrap();
        builder.into_graph()
    }

    fn deployer(api: &Arc<StubStackApi>) -> StackDeployer {
        StackDeployer::new(api.clone(), STACK)
            .with_delete_poll(PollConfig::new(5, Duration::ZERO))
    }

    #[tokio::test]
    async fn test_exists_and_ready_for_complete_stack() {
        let api = Arc::new(StubStackApi::new());
        api.push_listing(vec![(STACK, StackStatus::CreateComplete)]);
        let deployer = deployer(&api);

        assert!(deployer.exists(STACK).await.unwrap());
        assert!(deployer.ready(STACK).await.unwrap());
        assert!(!deployer.exists("SomeOtherStack").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_stack_exists_but_is_not_ready() {
        let api = Arc::new(StubStackApi::new());
        api.push_listing(vec![(STACK, StackStatus::CreateFailed)]);
        let deployer = deployer(&api);

        assert!(deployer.exists(STACK).await.unwrap());
        assert!(!deployer.ready(STACK).await.unwrap());
    }

    #[tokio::test]
    async fn test_deleted_stack_is_absent() {
        let api = Arc::new(StubStackApi::new());
        api.push_listing(vec![(STACK, StackStatus::DeleteComplete)]);

        assert!(!deployer(&api).exists(STACK).await.unwrap());
    }

    #[tokio::test]
    async fn test_dry_run_never_touches_provider() {
        let api = Arc::new(StubStackApi::new());
        api.push_listing(vec![(STACK, StackStatus::CreateComplete)]);

        let outcome = deployer(&api).deploy(&scaffold_graph(), true).await.unwrap();

        assert!(matches!(outcome, DeployOutcome::DryRun { ref template_body }
            if template_body.contains("EchoFunction")));
        assert_eq!(outcome.stack_id(), None);
        assert_eq!(api.create_count(), 0);
        assert_eq!(api.delete_count(), 0);
    }

    #[tokio::test]
    async fn test_deploy_into_empty_account_creates_once() {
        let api = Arc::new(StubStackApi::new());
        api.push_listing(Vec::new());

        let outcome = deployer(&api).deploy(&scaffold_graph(), false).await.unwrap();
        assert!(outcome.stack_id().is_some());

        let calls = api.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0], StubStackCall::ListStacks));
        let StubStackCall::CreateStack {
            name,
            template_body,
            capabilities,
        } = &calls[1]
        else {
            panic!("expected CreateStack, got {:?}", calls[1]);
        };
        assert_eq!(name, STACK);
        assert_eq!(capabilities, &vec![Capability::Iam]);

        let doc: serde_json::Value = serde_json::from_str(template_body).unwrap();
        assert!(doc["Resources"].get("EchoFunction").is_some());
        assert!(doc["Resources"].get("EchoApi").is_some());
    }

    #[tokio::test]
    async fn test_deploy_replaces_existing_stack() {
        let api = Arc::new(StubStackApi::new());
        api.push_listing(vec![(STACK, StackStatus::CreateComplete)]);
        api.push_listing(vec![(STACK, StackStatus::DeleteInProgress)]);
        api.push_listing(vec![(STACK, StackStatus::DeleteInProgress)]);
        api.push_listing(Vec::new());

        deployer(&api).deploy(&scaffold_graph(), false).await.unwrap();

        let calls = api.calls();
        let kinds: Vec<&str> = calls.iter().map(StubStackCall::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "ListStacks",
                "DeleteStack",
                "ListStacks",
                "ListStacks",
                "ListStacks",
                "CreateStack",
            ]
        );
        assert_eq!(api.create_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_wait_is_bounded() {
        let api = Arc::new(StubStackApi::new());
        // The last listing repeats forever once the queue is drained
        api.push_listing(vec![(STACK, StackStatus::DeleteInProgress)]);

        let err = deployer(&api)
            .deploy(&scaffold_graph(), false)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CloudError::DeleteTimeout { ref stack, attempts: 5 } if stack == STACK
        ));
        assert_eq!(api.create_count(), 0);
        assert_eq!(api.delete_count(), 1);
    }

    #[tokio::test]
    async fn test_provider_errors_propagate_unchanged() {
        let api = Arc::new(StubStackApi::new());
        api.push_listing(Vec::new());
        api.fail_create(CloudError::provider(
            400,
            "InsufficientCapabilitiesException: Requires capabilities",
        ));

        let err = deployer(&api)
            .deploy(&scaffold_graph(), false)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("InsufficientCapabilitiesException"));
        assert_eq!(api.create_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_graph_never_reaches_provider() {
        let api = Arc::new(StubStackApi::new());
        let mut graph = scaffold_graph();
        graph.resource_mut("EchoApiLambdaMethod").unwrap().depends_on =
            Some("Nowhere".to_string());

        let err = deployer(&api).deploy(&graph, false).await.unwrap_err();
        assert!(matches!(err, CloudError::Validation(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_stack_ready_polls_until_complete() {
        let api = Arc::new(StubStackApi::new());
        api.push_listing(vec![(STACK, StackStatus::CreateInProgress)]);
        api.push_listing(vec![(STACK, StackStatus::CreateInProgress)]);
        api.push_listing(vec![(STACK, StackStatus::CreateComplete)]);
        let deployer = deployer(&api);

        let poll = PollConfig::new(5, Duration::ZERO);
        assert!(deployer.stack_ready(STACK, &poll).await.unwrap());
        assert_eq!(api.calls().len(), 3);

        let short = PollConfig::new(2, Duration::ZERO);
        assert!(!deployer.stack_ready("UnitTestStackNot", &short).await.unwrap());
    }
}
