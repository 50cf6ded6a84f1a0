//! Project-level orchestration behind the CLI commands

use anyhow::Context;
use sapling_build::PackageBuilder;
use sapling_cloud::{
    DeployOutcome, FunctionApi, FunctionUpdate, FunctionUpdater, PollConfig, StackApi,
    StackDeployer, StackResourceIndex, TemplateBuilder,
};
use sapling_config::{LAMBDA_ZIP, Settings};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One project directory and the stack it deploys to
///
/// The stack is named after the application.
pub struct App {
    project_dir: PathBuf,
    settings: Settings,
    stacks: Arc<dyn StackApi>,
    functions: Arc<dyn FunctionApi>,
    poll: PollConfig,
}

impl App {
    /// Load `settings.json` from `project_dir` and settle the app name
    pub fn new(
        project_dir: &Path,
        requested_name: Option<&str>,
        stacks: Arc<dyn StackApi>,
        functions: Arc<dyn FunctionApi>,
    ) -> anyhow::Result<Self> {
        tracing::info!("Current working directory is {}", project_dir.display());
        sapling_config::ensure_lambda_dir(project_dir)?;

        let mut settings = Settings::load(project_dir)
            .with_context(|| format!("Failed to load settings in {}", project_dir.display()))?;
        settings.resolve_name(requested_name);

        Ok(Self {
            project_dir: project_dir.to_path_buf(),
            settings,
            stacks,
            functions,
            poll: PollConfig::default(),
        })
    }

    /// Polling used for delete waits and `--wait`
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn name(&self) -> &str {
        self.settings.name.as_deref().unwrap_or_default()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn save_settings(&self) -> anyhow::Result<PathBuf> {
        Ok(self.settings.save(&self.project_dir)?)
    }

    fn deployer(&self) -> StackDeployer {
        StackDeployer::new(self.stacks.clone(), self.name()).with_delete_poll(self.poll)
    }

    /// Deploy a function behind a REST API as this app's stack
    ///
    /// Names fall back to the settings, then to `<name>Function` and
    /// `<name>Api`. Unless `dry`, the names are saved once the stack
    /// has been requested.
    pub async fn scaffold(
        &mut self,
        function_name: Option<String>,
        rest_name: Option<String>,
        dry: bool,
    ) -> anyhow::Result<DeployOutcome> {
        tracing::info!("Creating scaffold in AWS cloud...");
        let app_name = self.name().to_string();
        let function_name =
            function_name.unwrap_or_else(|| self.settings.function_name_or_default(&app_name));
        let rest_name = rest_name.unwrap_or_else(|| self.settings.rest_name_or_default(&app_name));

        let mut builder = TemplateBuilder::new();
        builder.add_lambda(&function_name)?;
        builder.add_api_gateway(&rest_name)?;

        let outcome = self.deployer().deploy(builder.graph(), dry).await?;

        if !dry {
            self.settings.function_name = Some(function_name);
            self.settings.rest_name = Some(rest_name);
            let path = self.save_settings()?;
            tracing::info!("Saved settings to {}", path.display());
        }

        Ok(outcome)
    }

    pub async fn stack_exists(&self, stack_name: Option<&str>) -> anyhow::Result<bool> {
        let stack_name = stack_name.unwrap_or(self.name());
        Ok(self.deployer().exists(stack_name).await?)
    }

    pub async fn stack_ready(&self, stack_name: Option<&str>) -> anyhow::Result<bool> {
        let stack_name = stack_name.unwrap_or(self.name());
        Ok(self.deployer().ready(stack_name).await?)
    }

    /// Poll until the stack is ready or the poll budget runs out
    pub async fn wait_until_ready(&self, stack_name: Option<&str>) -> anyhow::Result<bool> {
        let stack_name = stack_name.unwrap_or(self.name());
        Ok(self.deployer().stack_ready(stack_name, &self.poll).await?)
    }

    /// Package `lambda/` and upload it to the stack's function
    ///
    /// Returns the physical function name with the provider's response.
    pub async fn update(&self) -> anyhow::Result<(String, FunctionUpdate)> {
        let lambda_dir = sapling_config::ensure_lambda_dir(&self.project_dir)?;
        let zip_path = PackageBuilder::package_dir(&lambda_dir, &self.project_dir.join(LAMBDA_ZIP))
            .map_err(|e| {
                let hint = e.hint().unwrap_or("Failed to package lambda sources");
                anyhow::Error::new(e).context(hint)
            })?;

        let function_name = StackResourceIndex::new(self.stacks.clone())
            .function_name(self.name())
            .await
            .with_context(|| format!("Failed to find the lambda function of {}", self.name()))?;

        let update = FunctionUpdater::new(self.functions.clone())
            .update(&function_name, Some(&zip_path), None)
            .await?;

        Ok((function_name, update))
    }
}
