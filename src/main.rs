//! Iris classifier - main entry point

use clap::Parser;
use iris_classifier::cli::{cmd_predict, cmd_serve, cmd_train, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "iris_classifier=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { output, max_iter, seed } => {
            cmd_train(&output, max_iter, seed)?;
        }
        Commands::Serve { host, port, model } => {
            cmd_serve(host, port, model).await?;
        }
        Commands::Predict { model, sepal_length, sepal_width, petal_length, petal_width } => {
            cmd_predict(&model, [sepal_length, sepal_width, petal_length, petal_width])?;
        }
    }

    Ok(())
}
