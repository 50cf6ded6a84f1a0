mod app;
mod commands;

use app::App;
use clap::{Parser, Subcommand};
use colored::Colorize;
use sapling_cloud_aws::AwsProviders;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sapling", version)]
#[command(about = "Scaffold and update a Lambda + API Gateway web application", long_about = None)]
struct Cli {
    /// Print debug logs to stderr
    #[arg(long, global = true, overrides_with = "no_debug")]
    debug: bool,

    #[arg(long = "no-debug", global = true, hide = true, overrides_with = "debug")]
    no_debug: bool,

    /// Project directory holding settings.json and lambda/
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,

    /// Application name, used when settings.json has none
    #[arg(long, global = true)]
    name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a Lambda function behind a REST API
    Scaffold {
        /// Lambda function name (default: settings, then <name>Function)
        function_name: Option<String>,
        /// REST API name (default: settings, then <name>Api)
        rest_name: Option<String>,
        /// Build the template only; nothing is sent to AWS or saved locally
        #[arg(long)]
        dry: bool,
    },
    /// Check whether a stack exists
    Exists {
        /// Stack name (default: the application name)
        #[arg(long)]
        stack: Option<String>,
        /// Check that the stack finished creating instead
        #[arg(long)]
        ready: bool,
        /// Poll until the stack is ready
        #[arg(long)]
        wait: bool,
    },
    /// Package lambda/ and upload it to the deployed function
    Update,
    /// Show version information
    Version,
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Version needs neither a project nor AWS
    if matches!(cli.command, Commands::Version) {
        println!("sapling {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let project_dir = sapling_config::project_dir(cli.cwd.as_deref())?;
    let providers = AwsProviders::from_env().await;
    let mut app = App::new(
        &project_dir,
        cli.name.as_deref(),
        providers.stacks,
        providers.functions,
    )?;

    match cli.command {
        Commands::Scaffold {
            function_name,
            rest_name,
            dry,
        } => {
            commands::scaffold::handle(&mut app, function_name, rest_name, dry).await?;
        }
        Commands::Exists { stack, ready, wait } => {
            commands::exists::handle(&app, stack, ready, wait).await?;
        }
        Commands::Update => {
            commands::update::handle(&app).await?;
        }
        Commands::Version => {
            unreachable!("Version is handled before the project is loaded");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug && !cli.no_debug);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
