use crate::domain::errors::LoanError;
use crate::domain::ml::feature_registry::FEATURE_NAMES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

pub const DEPENDENTS_RANGE: RangeInclusive<u8> = 0..=5;
pub const CIBIL_SCORE_RANGE: RangeInclusive<u16> = 300..=900;
pub const LOAN_TERM_RANGE: RangeInclusive<u16> = 0..=240;

/// Fixed two-way mapping between a categorical label and its numeric code.
///
/// Training and inference both encode through this trait, so the mapping can
/// never drift between the two sides.
pub trait BinaryCategory: Copy + PartialEq + Sized + 'static {
    /// Dataset column holding this category.
    const COLUMN: &'static str;
    /// `(variant, label, code)` triples; codes are 0 and 1.
    const VARIANTS: [(Self, &'static str, u8); 2];

    fn code(self) -> u8 {
        Self::VARIANTS
            .iter()
            .find(|(v, _, _)| *v == self)
            .map(|(_, _, c)| *c)
            .unwrap_or_default()
    }

    fn label(self) -> &'static str {
        Self::VARIANTS
            .iter()
            .find(|(v, _, _)| *v == self)
            .map(|(_, l, _)| *l)
            .unwrap_or_default()
    }

    fn from_label(label: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .find(|(_, l, _)| *l == label)
            .map(|(v, _, _)| *v)
    }

    fn from_code(code: u8) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .find(|(_, _, c)| *c == code)
            .map(|(v, _, _)| *v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Education {
    #[serde(rename = "Not Graduate")]
    NotGraduate,
    Graduate,
}

impl BinaryCategory for Education {
    const COLUMN: &'static str = "education";
    const VARIANTS: [(Self, &'static str, u8); 2] = [
        (Education::NotGraduate, "Not Graduate", 0),
        (Education::Graduate, "Graduate", 1),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelfEmployment {
    No,
    Yes,
}

impl BinaryCategory for SelfEmployment {
    const COLUMN: &'static str = "self_employed";
    const VARIANTS: [(Self, &'static str, u8); 2] = [
        (SelfEmployment::No, "No", 0),
        (SelfEmployment::Yes, "Yes", 1),
    ];
}

/// Loan outcome. The code doubles as the classifier's class index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    Rejected,
    Approved,
}

impl BinaryCategory for LoanStatus {
    const COLUMN: &'static str = "loan_status";
    const VARIANTS: [(Self, &'static str, u8); 2] = [
        (LoanStatus::Rejected, "Rejected", 0),
        (LoanStatus::Approved, "Approved", 1),
    ];
}

impl LoanStatus {
    pub fn class_index(self) -> usize {
        self.code() as usize
    }

    pub fn from_class_index(index: usize) -> Option<Self> {
        u8::try_from(index).ok().and_then(Self::from_code)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One loan application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplicantRecord {
    pub no_of_dependents: u8,
    pub education: Education,
    pub self_employed: SelfEmployment,
    pub income_annum: u64,
    pub loan_amount: u64,
    pub loan_term: u16,
    pub cibil_score: u16,
    pub residential_assets_value: u64,
    pub commercial_assets_value: u64,
    pub luxury_assets_value: u64,
    pub bank_asset_value: u64,
}

impl Default for ApplicantRecord {
    fn default() -> Self {
        Self {
            no_of_dependents: 1,
            education: Education::Graduate,
            self_employed: SelfEmployment::No,
            income_annum: 50_000_000,
            loan_amount: 10_000_000,
            loan_term: 12,
            cibil_score: 600,
            residential_assets_value: 0,
            commercial_assets_value: 0,
            luxury_assets_value: 0,
            bank_asset_value: 0,
        }
    }
}

impl ApplicantRecord {
    /// Rejects out-of-range fields before they reach a model.
    pub fn validate(&self) -> Result<(), LoanError> {
        if !DEPENDENTS_RANGE.contains(&self.no_of_dependents) {
            return Err(out_of_range(
                "no_of_dependents",
                self.no_of_dependents,
                &DEPENDENTS_RANGE,
            ));
        }
        if !CIBIL_SCORE_RANGE.contains(&self.cibil_score) {
            return Err(out_of_range(
                "cibil_score",
                self.cibil_score,
                &CIBIL_SCORE_RANGE,
            ));
        }
        if !LOAN_TERM_RANGE.contains(&self.loan_term) {
            return Err(out_of_range("loan_term", self.loan_term, &LOAN_TERM_RANGE));
        }
        Ok(())
    }

    pub fn total_assets(&self) -> u128 {
        [
            self.residential_assets_value,
            self.commercial_assets_value,
            self.luxury_assets_value,
            self.bank_asset_value,
        ]
        .iter()
        .map(|&v| v as u128)
        .sum()
    }

    /// Encoded feature values keyed by dataset column name.
    pub fn named_features(&self) -> BTreeMap<String, f64> {
        let values = [
            self.no_of_dependents as f64,
            self.education.code() as f64,
            self.self_employed.code() as f64,
            self.income_annum as f64,
            self.loan_amount as f64,
            self.loan_term as f64,
            self.cibil_score as f64,
            self.residential_assets_value as f64,
            self.commercial_assets_value as f64,
            self.luxury_assets_value as f64,
            self.bank_asset_value as f64,
        ];
        FEATURE_NAMES
            .iter()
            .zip(values)
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    /// Builds a record from loosely typed named fields, e.g. a JSON object.
    ///
    /// The field set is checked first (`SchemaMismatch`), then each value
    /// (`InvalidInput`), then ranges. Categoricals accept either their label
    /// or their numeric code.
    pub fn from_named_values(
        fields: &BTreeMap<String, serde_json::Value>,
    ) -> Result<Self, LoanError> {
        let missing: Vec<String> = FEATURE_NAMES
            .iter()
            .filter(|n| !fields.contains_key(**n))
            .map(|n| n.to_string())
            .collect();
        let unexpected: Vec<String> = fields
            .keys()
            .filter(|k| !FEATURE_NAMES.contains(&k.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(LoanError::SchemaMismatch {
                missing,
                unexpected,
            });
        }

        let record = Self {
            no_of_dependents: narrow(fields, "no_of_dependents")?,
            education: category(fields)?,
            self_employed: category(fields)?,
            income_annum: integer(fields, "income_annum")?,
            loan_amount: integer(fields, "loan_amount")?,
            loan_term: narrow(fields, "loan_term")?,
            cibil_score: narrow(fields, "cibil_score")?,
            residential_assets_value: integer(fields, "residential_assets_value")?,
            commercial_assets_value: integer(fields, "commercial_assets_value")?,
            luxury_assets_value: integer(fields, "luxury_assets_value")?,
            bank_asset_value: integer(fields, "bank_asset_value")?,
        };
        record.validate()?;
        Ok(record)
    }
}

fn out_of_range<T: std::fmt::Display>(
    field: &str,
    value: T,
    range: &RangeInclusive<T>,
) -> LoanError {
    LoanError::invalid_input(
        field,
        format!(
            "{} is outside [{}, {}]",
            value,
            range.start(),
            range.end()
        ),
    )
}

fn integer(fields: &BTreeMap<String, serde_json::Value>, field: &str) -> Result<u64, LoanError> {
    let value = &fields[field];
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                // `u64::MAX as f64` rounds up to 2^64, which itself does not fit
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
                .map(|f| f as u64)
        })
        .ok_or_else(|| {
            LoanError::invalid_input(field, format!("expected a non-negative integer, got {}", value))
        })
}

fn narrow<T: TryFrom<u64>>(
    fields: &BTreeMap<String, serde_json::Value>,
    field: &str,
) -> Result<T, LoanError> {
    let wide = integer(fields, field)?;
    T::try_from(wide).map_err(|_| LoanError::invalid_input(field, format!("{} is too large", wide)))
}

fn category<C: BinaryCategory>(
    fields: &BTreeMap<String, serde_json::Value>,
) -> Result<C, LoanError> {
    let value = &fields[C::COLUMN];
    let parsed = match value {
        serde_json::Value::String(label) => C::from_label(label.trim()),
        other => other
            .as_u64()
            .and_then(|c| u8::try_from(c).ok())
            .and_then(C::from_code),
    };
    parsed.ok_or_else(|| {
        let expected: Vec<String> = C::VARIANTS
            .iter()
            .map(|(_, label, code)| format!("\"{}\" or {}", label, code))
            .collect();
        LoanError::invalid_input(
            C::COLUMN,
            format!("expected one of {}, got {}", expected.join(", "), value),
        )
    })
}
