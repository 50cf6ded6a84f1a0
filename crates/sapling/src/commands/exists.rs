use crate::app::App;

pub async fn handle(
    app: &App,
    stack: Option<String>,
    ready: bool,
    wait: bool,
) -> anyhow::Result<()> {
    let stack_name = stack.as_deref().unwrap_or(app.name());

    let status = if wait {
        status_text(app.wait_until_ready(Some(stack_name)).await?, "ready", "not ready")
    } else if ready {
        status_text(app.stack_ready(Some(stack_name)).await?, "ready", "not ready")
    } else {
        status_text(app.stack_exists(Some(stack_name)).await?, "exists", "does not exist")
    };

    println!("stack {} {}", stack_name, status);
    Ok(())
}

fn status_text(flag: bool, yes: &'static str, no: &'static str) -> &'static str {
    if flag { yes } else { no }
}
