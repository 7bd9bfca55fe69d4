//! Trains the loan approval random forest and writes the model artifact.
//!
//! Flags override the `LOAN_*` environment variables, which override the
//! built-in defaults (100 trees, seed 42, 20% held out).

use anyhow::{Context, Result};
use clap::Parser;
use loan_approval::application::ml::{TrainingPipeline, TrainingReport};
use loan_approval::config::TrainingEnvConfig;
use loan_approval::infrastructure::ArtifactStore;
use loan_approval::interfaces::report::render_training_report;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the training CSV (overrides LOAN_DATASET_PATH)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Path to the model artifact (overrides LOAN_MODEL_PATH)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of trees in the random forest
    #[arg(long)]
    n_trees: Option<usize>,

    /// Maximum depth of trees (unlimited when unset)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Minimum samples required to split an internal node
    #[arg(long)]
    min_split: Option<usize>,

    /// Held-out share of rows used for the accuracy report
    #[arg(long)]
    test_size: Option<f64>,

    /// Seed for both the split and the forest
    #[arg(long)]
    seed: Option<u64>,

    /// Print the training report as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn apply(&self, mut config: TrainingEnvConfig) -> TrainingEnvConfig {
        if let Some(input) = &self.input {
            config.dataset_path = input.clone();
        }
        if let Some(output) = &self.output {
            config.model_path = output.clone();
        }
        if let Some(n_trees) = self.n_trees {
            config.n_trees = n_trees;
        }
        if self.max_depth.is_some() {
            config.max_depth = self.max_depth;
        }
        if let Some(min_split) = self.min_split {
            config.min_samples_split = min_split;
        }
        if let Some(test_size) = self.test_size {
            config.test_size = test_size;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    let args = Args::parse();
    let config = args.apply(TrainingEnvConfig::from_env()?);
    info!(
        "Training on {:?} -> {:?}",
        config.dataset_path, config.model_path
    );

    let pipeline = TrainingPipeline::new(config.training_options());
    let store = ArtifactStore::new(&config.model_path);
    let report: TrainingReport = pipeline
        .run(&config.dataset_path, &store)
        .with_context(|| format!("Training from {:?} failed", config.dataset_path))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_training_report(&report));
    }

    Ok(())
}
