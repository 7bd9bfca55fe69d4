//! Plain-text reports printed by the binaries.

use crate::application::ml::trainer::TrainingReport;
use crate::domain::explanation::Sentiment;
use crate::domain::prediction::{FeatureWeight, PredictionResult};
use std::fmt::Write;

const RULE: &str = "══════════════════════════════════════════════════════";
const BAR_WIDTH: usize = 40;

fn marker(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Warning => "[!]",
        Sentiment::Positive => "[+]",
        Sentiment::Caution => "[~]",
        Sentiment::Neutral => "[i]",
    }
}

/// Scales `weight` against the largest weight. Any non-zero weight gets at least one block.
fn bar(weight: f64, max_weight: f64) -> String {
    if max_weight <= 0.0 || weight <= 0.0 {
        return String::new();
    }
    let len = (weight / max_weight * BAR_WIDTH as f64).ceil() as usize;
    "█".repeat(len.clamp(1, BAR_WIDTH))
}

fn write_importances(out: &mut String, weights: &[FeatureWeight]) {
    let mut sorted: Vec<&FeatureWeight> = weights.iter().collect();
    sorted.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    let max_weight = sorted.first().map_or(0.0, |w| w.weight);
    let name_width = sorted.iter().map(|w| w.feature.len()).max().unwrap_or(0);
    for w in sorted {
        let _ = writeln!(
            out,
            "    {:<width$} {:>6.2}% {}",
            w.feature,
            w.weight * 100.0,
            bar(w.weight, max_weight),
            width = name_width
        );
    }
}

pub fn render_prediction(result: &PredictionResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", RULE);
    let verdict = if result.is_approved() {
        "LOAN APPROVED"
    } else {
        "LOAN REJECTED"
    };
    let _ = writeln!(out, "  {}", verdict);
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "  Approval probability:  {:.2}%",
        result.probabilities.approved * 100.0
    );
    let _ = writeln!(
        out,
        "  Rejection probability: {:.2}%",
        result.probabilities.rejected * 100.0
    );

    let _ = writeln!(out, "\n  Why this decision:");
    for explanation in &result.explanations {
        let _ = writeln!(
            out,
            "    {} {}",
            marker(explanation.sentiment()),
            explanation.message()
        );
    }

    if !result.feature_importances.is_empty() {
        let _ = writeln!(out, "\n  Feature importance (model-wide):");
        write_importances(&mut out, &result.feature_importances);
    }
    out
}

pub fn render_training_report(report: &TrainingReport) -> String {
    let mut out = String::new();
    let (rejected, approved) = report.class_balance;
    let cm = &report.evaluation.confusion;

    let _ = writeln!(out, "\n{}", RULE);
    let _ = writeln!(out, "  TRAINING REPORT");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(
        out,
        "  Rows: {} (approved {}, rejected {})",
        report.n_rows, approved, rejected
    );
    let _ = writeln!(
        out,
        "  Split: {} train / {} test",
        report.split.train.len(),
        report.split.test.len()
    );
    let _ = writeln!(
        out,
        "  Accuracy: {:.2}%",
        report.evaluation.accuracy * 100.0
    );
    let _ = writeln!(
        out,
        "  Precision (approved): {:.2}%   Recall (approved): {:.2}%",
        cm.precision() * 100.0,
        cm.recall() * 100.0
    );

    let _ = writeln!(out, "\n  Confusion matrix (rows = actual):");
    let _ = writeln!(out, "    {:<10} {:>10} {:>10}", "", "Approved", "Rejected");
    let _ = writeln!(
        out,
        "    {:<10} {:>10} {:>10}",
        "Approved", cm.true_approved, cm.false_rejected
    );
    let _ = writeln!(
        out,
        "    {:<10} {:>10} {:>10}",
        "Rejected", cm.false_approved, cm.true_rejected
    );

    let _ = writeln!(out, "\n  Feature importance:");
    write_importances(&mut out, &report.feature_importances);

    if let Some(path) = &report.artifact_path {
        let _ = writeln!(out, "\n  Model saved to {}", path.display());
    }
    out
}
