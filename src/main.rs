//! Loan approval decision aid.
//!
//! Scores one applicant against the trained model artifact and prints the
//! verdict, class probabilities, rule-based explanations and feature importances.
//!
//! # Usage
//! ```sh
//! cargo run --bin train_model
//! cargo run -- --cibil-score 750 --loan-amount 20000000 --bank-asset-value 30000000
//! cargo run -- --input applicant.json --json
//! ```
//!
//! # Environment Variables
//! - `LOAN_MODEL_PATH` - Model artifact to load (default: data/loan_model_rf.json)

use anyhow::{Context, Result};
use clap::Parser;
use loan_approval::application::ml::LoanApprovalService;
use loan_approval::config::InferenceEnvConfig;
use loan_approval::domain::errors::LoanError;
use loan_approval::interfaces::report::render_prediction;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, error, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file holding one applicant as an object of named fields.
    /// Field flags are ignored when this is set.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Model artifact path (overrides LOAN_MODEL_PATH)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Print the prediction as JSON
    #[arg(long)]
    json: bool,

    /// Number of dependents (0-5)
    #[arg(long, default_value_t = 1)]
    no_of_dependents: u64,

    /// "Graduate" or "Not Graduate"
    #[arg(long, default_value = "Graduate")]
    education: String,

    /// "Yes" or "No"
    #[arg(long, default_value = "No")]
    self_employed: String,

    #[arg(long, default_value_t = 50_000_000)]
    income_annum: u64,

    #[arg(long, default_value_t = 10_000_000)]
    loan_amount: u64,

    /// Loan term (0-240)
    #[arg(long, default_value_t = 12)]
    loan_term: u64,

    /// CIBIL credit score (300-900)
    #[arg(long, default_value_t = 600)]
    cibil_score: u64,

    #[arg(long, default_value_t = 0)]
    residential_assets_value: u64,

    #[arg(long, default_value_t = 0)]
    commercial_assets_value: u64,

    #[arg(long, default_value_t = 0)]
    luxury_assets_value: u64,

    #[arg(long, default_value_t = 0)]
    bank_asset_value: u64,
}

impl Args {
    fn applicant_fields(&self) -> BTreeMap<String, Value> {
        [
            ("no_of_dependents", Value::from(self.no_of_dependents)),
            ("education", Value::from(self.education.as_str())),
            ("self_employed", Value::from(self.self_employed.as_str())),
            ("income_annum", Value::from(self.income_annum)),
            ("loan_amount", Value::from(self.loan_amount)),
            ("loan_term", Value::from(self.loan_term)),
            ("cibil_score", Value::from(self.cibil_score)),
            (
                "residential_assets_value",
                Value::from(self.residential_assets_value),
            ),
            (
                "commercial_assets_value",
                Value::from(self.commercial_assets_value),
            ),
            ("luxury_assets_value", Value::from(self.luxury_assets_value)),
            ("bank_asset_value", Value::from(self.bank_asset_value)),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
    }
}

fn read_applicant_file(path: &Path) -> Result<BTreeMap<String, Value>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read applicant file {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{:?} must hold a single JSON object of applicant fields", path))
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so `--json` output stays machine-readable
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    let args = Args::parse();
    let config = InferenceEnvConfig::from_env()?;
    let model_path = args.model.clone().unwrap_or(config.model_path);

    let service = match LoanApprovalService::load(&model_path) {
        Ok(service) => service,
        Err(e @ LoanError::ArtifactNotFound { .. }) => {
            error!("{}", e);
            return Err(e.into());
        }
        Err(e) => return Err(e).context("Failed to load model artifact"),
    };

    let fields = match &args.input {
        Some(path) => read_applicant_file(path)?,
        None => args.applicant_fields(),
    };

    let result = service.predict_named(&fields)?;
    info!(
        "Verdict: {} ({:.2}% approval)",
        result.verdict,
        result.probabilities.approved * 100.0
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_prediction(&result));
    }

    Ok(())
}
