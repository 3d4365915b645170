//! Command-line interface for training, serving and one-off predictions.

use clap::{Parser, Subcommand};
use colored::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::dataset;
use crate::inference::{Predictor, Sample};
use crate::training::{ClassificationReport, TrainEngine, TrainingConfig, DEFAULT_MODEL_PATH};

// ─── Output helpers ────────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString { s.truecolor(100, 100, 100) }
fn muted(s: &str) -> ColoredString { s.truecolor(140, 140, 140) }

/// Aligned `label value` line
fn field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<16} {}", muted(label), value);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", "›".truecolor(120, 170, 255), msg);
    let _ = std::io::stdout().flush();
}

fn step_done(detail: &str) {
    println!("{} {}", "done".truecolor(100, 210, 120), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "iris-classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train and serve an iris species classifier")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train on the bundled iris dataset and write the model artifact
    Train {
        /// Output model file
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        output: PathBuf,

        /// Maximum solver iterations
        #[arg(long, default_value = "200")]
        max_iter: usize,

        /// Seed for the train/test split
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Start the prediction server
    Serve {
        /// Server host (defaults to API_HOST or 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Server port (defaults to API_PORT or 8000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Model artifact (defaults to MODEL_PATH or model.bin)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Classify a single sample with a trained model
    #[command(allow_negative_numbers = true)]
    Predict {
        /// Trained model file
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        sepal_length: f64,
        sepal_width: f64,
        petal_length: f64,
        petal_width: f64,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

fn print_report(report: &ClassificationReport) {
    println!();
    field("Accuracy", format!("{:.4}", report.accuracy).white().bold());
    println!();
    for line in report.to_string().lines() {
        println!("  {}", line);
    }
}

pub fn cmd_train(output: &Path, max_iter: usize, seed: u64) -> anyhow::Result<()> {
    section("Train");

    step_run("Loading iris dataset");
    let start = Instant::now();
    let data = dataset::load_iris()?;
    step_done(&format!("{} rows × {} features in {:?}", data.n_samples(), data.n_features(), start.elapsed()));

    let config = TrainingConfig::new(output)
        .with_max_iter(max_iter)
        .with_random_state(seed);
    let mut engine = TrainEngine::new(config);

    step_run(&format!("Training {}", "logistic regression".cyan()));
    let start = Instant::now();
    engine.fit(&data)?;
    step_done(&format!("{:?}", start.elapsed()));

    if let Some(report) = engine.report() {
        print_report(report);
    }

    println!();
    step_run(&format!("Saving → {}", output.display()));
    engine.save(output)?;
    step_done("");
    println!();

    Ok(())
}

pub async fn cmd_serve(
    host: Option<String>,
    port: Option<u16>,
    model: Option<PathBuf>,
) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    let mut config = ServerConfig::default();
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(model) = model {
        config = config.with_model_path(model);
    }

    let base = format!("http://{}:{}", config.host, config.port);
    section(&format!("Iris Classifier v{}", env!("CARGO_PKG_VERSION")));
    field("Model", config.model_path.display().to_string().white());
    field("Health", format!("{}/health", base).white());
    field("Predict", format!("{}/predict", base).white());
    println!();
    println!("  {}", dim("ctrl+c to stop"));
    println!();

    run_server(config).await
}

pub fn cmd_predict(model_path: &Path, measurements: [f64; 4]) -> anyhow::Result<()> {
    section("Predict");

    let [sepal_length, sepal_width, petal_length, petal_width] = measurements;
    let sample = Sample::new(sepal_length, sepal_width, petal_length, petal_width).map_err(|violations| {
        let fields: Vec<String> = violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect();
        anyhow::anyhow!("invalid sample ({})", fields.join("; "))
    })?;

    let predictor = Predictor::load(model_path)?;
    let prediction = predictor.predict(&sample)?;

    field("Class", prediction.class_name.white().bold());
    field("Label", prediction.prediction.to_string().white());
    field("Confidence", format!("{:.4}", prediction.confidence).white());
    for (name, p) in predictor.class_names().iter().zip(&prediction.probabilities) {
        field(name, dim(&format!("{:.4}", p)));
    }
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_predict() {
        let cli = Cli::parse_from(["iris-classifier", "predict", "--model", "m.bin", "5.1", "3.5", "1.4", "0.2"]);
        match cli.command {
            Commands::Predict { model, sepal_length, petal_width, .. } => {
                assert_eq!(model, PathBuf::from("m.bin"));
                assert_eq!(sepal_length, 5.1);
                assert_eq!(petal_width, 0.2);
            }
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn test_parse_train_defaults() {
        let cli = Cli::parse_from(["iris-classifier", "train"]);
        match cli.command {
            Commands::Train { output, max_iter, seed } => {
                assert_eq!(output, PathBuf::from(DEFAULT_MODEL_PATH));
                assert_eq!(max_iter, 200);
                assert_eq!(seed, 42);
            }
            _ => panic!("expected train"),
        }
    }
}
