//! PUBG Scout - Main Entry Point
//!
//! Trains the pro-player classifier and serves it from the command line or
//! over HTTP.

use clap::Parser;
use pubg_scout::cli::{cmd_info, cmd_predict, cmd_serve, cmd_train, show_help, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pubg_scout=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Train {
            data,
            output_dir,
            c,
            max_iter,
            tol,
            solver,
            learning_rate,
            min_class_count,
        }) => {
            cmd_train(&data, &output_dir, c, max_iter, tol, &solver, learning_rate, min_class_count)?;
        }
        Some(Commands::Predict { artifacts, features, json }) => {
            cmd_predict(&artifacts, features.into(), json)?;
        }
        Some(Commands::Serve { port, host, artifacts }) => {
            cmd_serve(host, port, artifacts).await?;
        }
        Some(Commands::Info { artifacts, json }) => {
            cmd_info(&artifacts, json)?;
        }
        None => show_help(),
    }

    Ok(())
}
