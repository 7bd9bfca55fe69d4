#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER: [&str; 13] = [
    "loan_id",
    "no_of_dependents",
    "education",
    "self_employed",
    "income_annum",
    "loan_amount",
    "loan_term",
    "cibil_score",
    "residential_assets_value",
    "commercial_assets_value",
    "luxury_assets_value",
    "bank_asset_value",
    "loan_status",
];

/// Kaggle-style loan rows where approval depends only on the credit score
/// (approved from 550 up). Values are deterministic for a given seed.
pub fn synthetic_rows(rows: usize, seed: u64) -> Vec<Vec<String>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (1..=rows)
        .map(|id| {
            let cibil: u32 = rng.random_range(300..=900);
            let income: u64 = rng.random_range(2..=99) * 100_000;
            let status = if cibil >= 550 { "Approved" } else { "Rejected" };
            vec![
                id.to_string(),
                rng.random_range(0..=5u32).to_string(),
                if rng.random::<bool>() { "Graduate" } else { "Not Graduate" }.to_string(),
                if rng.random::<bool>() { "Yes" } else { "No" }.to_string(),
                income.to_string(),
                (income * rng.random_range(1..=4u64)).to_string(),
                (rng.random_range(1..=10u32) * 2).to_string(),
                cibil.to_string(),
                (rng.random_range(0..=200u64) * 100_000).to_string(),
                (rng.random_range(0..=100u64) * 100_000).to_string(),
                (rng.random_range(0..=300u64) * 100_000).to_string(),
                (rng.random_range(0..=100u64) * 100_000).to_string(),
                status.to_string(),
            ]
        })
        .collect()
}

/// Renders rows as CSV. `padded` adds the stray spaces the public dataset carries
/// around headers and cells.
pub fn to_csv(rows: &[Vec<String>], padded: bool) -> String {
    let pad = if padded { " " } else { "" };
    let mut out = HEADER
        .iter()
        .enumerate()
        .map(|(i, h)| if i == 0 { h.to_string() } else { format!("{}{}", pad, h) })
        .collect::<Vec<_>>()
        .join(",");
    out.push('\n');
    for row in rows {
        let line = row
            .iter()
            .map(|cell| format!("{}{}{}", pad, cell, pad))
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(out, "{}", line);
    }
    out
}

pub fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

pub fn write_dataset(dir: &Path, rows: usize, seed: u64) -> PathBuf {
    write_csv(dir, "loans.csv", &to_csv(&synthetic_rows(rows, seed), true))
}
