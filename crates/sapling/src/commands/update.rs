use crate::app::App;

pub async fn handle(app: &App) -> anyhow::Result<()> {
    let (function_name, update) = app.update().await?;

    let status = if update.is_success() {
        "updated"
    } else {
        "not updated"
    };
    tracing::debug!(
        "Update of {} reported {:?} ({} bytes)",
        function_name,
        update.status,
        update.code_size
    );

    println!("lambda function {} {}", function_name, status);
    Ok(())
}
