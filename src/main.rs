mod cli;
mod commands;

use casebox::config::Config;
use casebox::observability;
use casebox::state::AppState;
use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    observability::init_tracing(&config.logging.filter);

    let state = AppState::new(config)?;
    commands::run(cli.command, &state).await?;

    Ok(())
}
