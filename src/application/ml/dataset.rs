use crate::domain::applicant::{BinaryCategory, Education, LoanStatus, SelfEmployment};
use crate::domain::errors::TrainingError;
use crate::domain::ml::feature_registry::{FEATURE_NAMES, FeatureSchema, ID_COLUMN, LABEL_COLUMN};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

/// Cleaned, fully numeric training data.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Every column except the id and label, in file order.
    pub schema: FeatureSchema,
    pub ids: Vec<String>,
    pub x: Vec<Vec<f64>>,
    /// Class indices, see `LoanStatus::class_index`.
    pub y: Vec<usize>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Row count per `LoanStatus`, as `(rejected, approved)`.
    pub fn class_balance(&self) -> (usize, usize) {
        let approved = self
            .y
            .iter()
            .filter(|&&c| c == LoanStatus::Approved.class_index())
            .count();
        (self.y.len() - approved, approved)
    }

    pub fn load_csv(path: &Path) -> Result<Self, TrainingError> {
        let file = File::open(path).map_err(|source| TrainingError::DatasetUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(BufReader::new(file))?;
        info!(
            "Loaded {} rows x {} features from {:?}",
            dataset.len(),
            dataset.schema.len(),
            path
        );
        Ok(dataset)
    }

    /// Parses CSV data: trims headers and cells, encodes the categorical
    /// columns, and splits the id and label columns off the features.
    ///
    /// The header must hold the id, the label and exactly the applicant
    /// features (in any order), each once. Anything else is rejected before
    /// any row is read.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TrainingError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let mut seen = HashSet::new();
        if let Some(dup) = headers.iter().find(|h| !seen.insert(*h)) {
            return Err(TrainingError::DuplicateColumn {
                column: dup.to_string(),
            });
        }

        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| TrainingError::MissingColumn {
                    column: column.to_string(),
                })
        };
        let id_idx = find(ID_COLUMN)?;
        let label_idx = find(LABEL_COLUMN)?;
        let feature_cols: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != id_idx && *i != label_idx)
            .map(|(i, h)| (i, h.to_string()))
            .collect();
        check_feature_columns(&feature_cols)?;

        let mut ids = Vec::new();
        let mut x = Vec::new();
        let mut y = Vec::new();

        for result in rdr.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let cell = |i: usize| record.get(i).unwrap_or("");

            let row = feature_cols
                .iter()
                .map(|(i, name)| encode_cell(name, cell(*i), line))
                .collect::<Result<Vec<f64>, _>>()?;
            let label = encode_category::<LoanStatus>(cell(label_idx), line)?;

            ids.push(cell(id_idx).to_string());
            x.push(row);
            y.push(label.class_index());
        }

        Ok(Self {
            schema: FeatureSchema::new(feature_cols.into_iter().map(|(_, n)| n).collect()),
            ids,
            x,
            y,
        })
    }

    /// Copies the rows at `indices` into a new feature matrix and label vector.
    pub fn select(&self, indices: &[usize]) -> (Vec<Vec<f64>>, Vec<usize>) {
        indices
            .iter()
            .map(|&i| (self.x[i].clone(), self.y[i]))
            .unzip()
    }
}

fn check_feature_columns(feature_cols: &[(usize, String)]) -> Result<(), TrainingError> {
    if let Some(missing) = FEATURE_NAMES
        .iter()
        .find(|name| !feature_cols.iter().any(|(_, col)| col == *name))
    {
        return Err(TrainingError::MissingColumn {
            column: missing.to_string(),
        });
    }
    if let Some((_, extra)) = feature_cols
        .iter()
        .find(|(_, col)| !FEATURE_NAMES.contains(&col.as_str()))
    {
        return Err(TrainingError::UnexpectedColumn {
            column: extra.clone(),
        });
    }
    Ok(())
}

fn encode_cell(column: &str, raw: &str, line: u64) -> Result<f64, TrainingError> {
    if column == Education::COLUMN {
        return encode_category::<Education>(raw, line).map(|c| c.code() as f64);
    }
    if column == SelfEmployment::COLUMN {
        return encode_category::<SelfEmployment>(raw, line).map(|c| c.code() as f64);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| TrainingError::MalformedValue {
            line,
            column: column.to_string(),
            value: raw.to_string(),
        })
}

fn encode_category<C: BinaryCategory>(raw: &str, line: u64) -> Result<C, TrainingError> {
    C::from_label(raw).ok_or_else(|| TrainingError::UnmappableCategory {
        line,
        column: C::COLUMN.to_string(),
        value: raw.to_string(),
    })
}
