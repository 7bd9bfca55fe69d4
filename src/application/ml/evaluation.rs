use super::forest::ProbabilisticClassifier;
use crate::domain::applicant::LoanStatus;
use serde::{Deserialize, Serialize};

/// Binary confusion matrix with `Approved` as the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_approved: usize,
    pub false_approved: usize,
    pub true_rejected: usize,
    pub false_rejected: usize,
}

impl ConfusionMatrix {
    pub fn record(&mut self, actual: usize, predicted: usize) {
        let approved = LoanStatus::Approved.class_index();
        match (actual == approved, predicted == approved) {
            (true, true) => self.true_approved += 1,
            (false, true) => self.false_approved += 1,
            (false, false) => self.true_rejected += 1,
            (true, false) => self.false_rejected += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_approved + self.false_approved + self.true_rejected + self.false_rejected
    }

    pub fn accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            n => (self.true_approved + self.true_rejected) as f64 / n as f64,
        }
    }

    /// Share of predicted approvals that were real approvals.
    pub fn precision(&self) -> f64 {
        ratio(self.true_approved, self.true_approved + self.false_approved)
    }

    /// Share of real approvals that were predicted.
    pub fn recall(&self) -> f64 {
        ratio(self.true_approved, self.true_approved + self.false_rejected)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Held-out evaluation result. Reported only; never gates persistence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
}

pub fn evaluate<C: ProbabilisticClassifier + ?Sized>(
    classifier: &C,
    x: &[Vec<f64>],
    y: &[usize],
) -> Evaluation {
    let mut confusion = ConfusionMatrix::default();
    for (row, &actual) in x.iter().zip(y) {
        confusion.record(actual, classifier.predict(row));
    }
    Evaluation {
        accuracy: confusion.accuracy(),
        confusion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Approves whenever the first column is positive.
    struct SignClassifier;

    impl ProbabilisticClassifier for SignClassifier {
        fn n_features(&self) -> usize {
            1
        }

        fn n_classes(&self) -> usize {
            2
        }

        fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
            if row[0] > 0.0 {
                vec![0.0, 1.0]
            } else {
                vec![1.0, 0.0]
            }
        }
    }

    #[test]
    fn test_evaluate_counts_each_cell() {
        let x = vec![vec![1.0], vec![1.0], vec![-1.0], vec![-1.0], vec![1.0]];
        let y = vec![1, 0, 0, 1, 1];

        let eval = evaluate(&SignClassifier, &x, &y);

        assert_eq!(
            eval.confusion,
            ConfusionMatrix {
                true_approved: 2,
                false_approved: 1,
                true_rejected: 1,
                false_rejected: 1,
            }
        );
        assert!((eval.accuracy - 0.6).abs() < 1e-12);
        assert!((eval.confusion.precision() - 2.0 / 3.0).abs() < 1e-12);
        assert!((eval.confusion.recall() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_evaluation() {
        let eval = evaluate(&SignClassifier, &[], &[]);
        assert_eq!(eval.accuracy, 0.0);
        assert_eq!(eval.confusion.total(), 0);
    }
}
