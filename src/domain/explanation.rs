//! Rule-based explanations for a loan decision.
//!
//! The rules look only at the applicant record, never at the model, so the same
//! record always yields the same ordered list.

use crate::domain::applicant::ApplicantRecord;
use serde::{Deserialize, Serialize};

pub const LOW_CREDIT_SCORE: u16 = 550;
pub const EXCELLENT_CREDIT_SCORE: u16 = 700;
/// Loan above this multiple of annual income is flagged.
pub const MAX_LOAN_TO_INCOME: u128 = 5;
/// Loan below this multiple of annual income is a positive signal.
pub const HEALTHY_LOAN_TO_INCOME: u128 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Warning,
    Positive,
    Caution,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Explanation {
    VeryLowCreditScore,
    ExcellentCreditScore,
    LoanTooLarge,
    LoanHealthy,
    InsufficientCollateral,
    ComplexPattern,
}

impl Explanation {
    pub fn sentiment(self) -> Sentiment {
        match self {
            Explanation::VeryLowCreditScore | Explanation::LoanTooLarge => Sentiment::Warning,
            Explanation::ExcellentCreditScore | Explanation::LoanHealthy => Sentiment::Positive,
            Explanation::InsufficientCollateral => Sentiment::Caution,
            Explanation::ComplexPattern => Sentiment::Neutral,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Explanation::VeryLowCreditScore => {
                "very low credit score (below 550): the main reason applications are rejected"
            }
            Explanation::ExcellentCreditScore => "excellent credit score (above 700)",
            Explanation::LoanTooLarge => {
                "loan too large relative to income (more than 5x annual income)"
            }
            Explanation::LoanHealthy => {
                "loan amount healthy relative to income (less than 2x annual income)"
            }
            Explanation::InsufficientCollateral => {
                "insufficient collateral: total assets are below the requested loan amount"
            }
            Explanation::ComplexPattern => {
                "decision based on complex historical pattern combination"
            }
        }
    }
}

impl std::fmt::Display for Explanation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Evaluates every rule in order; none short-circuits another.
pub fn explain(record: &ApplicantRecord) -> Vec<Explanation> {
    let income = record.income_annum as u128;
    let loan = record.loan_amount as u128;
    let mut reasons = Vec::new();

    if record.cibil_score < LOW_CREDIT_SCORE {
        reasons.push(Explanation::VeryLowCreditScore);
    }
    if record.cibil_score > EXCELLENT_CREDIT_SCORE {
        reasons.push(Explanation::ExcellentCreditScore);
    }
    if loan > MAX_LOAN_TO_INCOME * income {
        reasons.push(Explanation::LoanTooLarge);
    }
    if loan < HEALTHY_LOAN_TO_INCOME * income {
        reasons.push(Explanation::LoanHealthy);
    }
    if record.total_assets() < loan {
        reasons.push(Explanation::InsufficientCollateral);
    }

    if reasons.is_empty() {
        reasons.push(Explanation::ComplexPattern);
    }
    reasons
}
