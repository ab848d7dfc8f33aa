//! Claudebin CLI binary entry point.

use claudebin::cli::{AuthCommands, Cli, Commands};
use claudebin::config::ClaudebinConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClaudebinConfig::from_env();
    config.validate()?;

    match cli.command {
        Commands::Auth(auth_args) => match auth_args.command {
            AuthCommands::Login => claudebin::cli::auth::handle_login(&config).await,
            AuthCommands::Status => claudebin::cli::auth::handle_status(&config).await,
            AuthCommands::Logout => claudebin::cli::auth::handle_logout(&config).await,
        },
        Commands::Extract(args) => claudebin::cli::share::handle_extract(&args.project_path).await,
        Commands::Share(args) => claudebin::cli::share::handle_share(&config, args).await,
        Commands::Publish(args) => claudebin::cli::share::handle_publish(&config, args).await,
    }
}
