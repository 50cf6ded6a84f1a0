use crate::app::App;
use sapling_cloud::DeployOutcome;

pub async fn handle(
    app: &mut App,
    function_name: Option<String>,
    rest_name: Option<String>,
    dry: bool,
) -> anyhow::Result<()> {
    println!("scaffolding...");

    match app.scaffold(function_name, rest_name, dry).await? {
        DeployOutcome::DryRun { template_body } => {
            tracing::debug!("Template:\n{}", template_body);
        }
        DeployOutcome::Created(output) => {
            tracing::info!("Stack {} requested", output.stack_id);
        }
    }

    Ok(())
}
