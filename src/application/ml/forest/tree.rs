//! CART decision tree with Gini impurity.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// A node in a decision tree. Children are indices into the tree's node array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Rows with `row[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { class: usize },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
    /// Weighted impurity decrease accumulated per feature, unnormalized.
    impurity_decrease: Vec<f64>,
}

struct Pending {
    node: usize,
    samples: Vec<usize>,
    depth: usize,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

impl DecisionTree {
    /// Grows a tree on the given sample indices (duplicates allowed, as drawn by bootstrap).
    ///
    /// `x` rows must all have the same length and `y` holds class indices below `n_classes`.
    pub fn fit<R: Rng>(
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
        samples: Vec<usize>,
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let n_features = x.first().map(Vec::len).unwrap_or(0);
        let mut tree = Self {
            nodes: vec![Node::Leaf { class: 0 }],
            n_features,
            impurity_decrease: vec![0.0; n_features],
        };
        let mut features: Vec<usize> = (0..n_features).collect();
        let mut stack = vec![Pending {
            node: 0,
            samples,
            depth: 0,
        }];

        while let Some(Pending {
            node,
            samples,
            depth,
        }) = stack.pop()
        {
            let counts = class_counts(y, &samples, n_classes);
            let impurity = gini(&counts, samples.len());

            let depth_reached = params.max_depth.is_some_and(|max| depth >= max);
            if depth_reached || samples.len() < params.min_samples_split || impurity <= 0.0 {
                tree.nodes[node] = Node::Leaf {
                    class: majority(&counts),
                };
                continue;
            }

            features.shuffle(rng);
            let Some(best) = best_split(x, y, n_classes, &samples, &features, params) else {
                tree.nodes[node] = Node::Leaf {
                    class: majority(&counts),
                };
                continue;
            };

            let n = samples.len() as f64;
            tree.impurity_decrease[best.feature] += n * impurity - n * best.impurity;

            let left = tree.nodes.len();
            let right = left + 1;
            tree.nodes.push(Node::Leaf { class: 0 });
            tree.nodes.push(Node::Leaf { class: 0 });
            tree.nodes[node] = Node::Split {
                feature: best.feature,
                threshold: best.threshold,
                left,
                right,
            };
            stack.push(Pending {
                node: right,
                samples: best.right,
                depth: depth + 1,
            });
            stack.push(Pending {
                node: left,
                samples: best.left,
                depth: depth + 1,
            });
        }

        tree
    }

    /// Class index of the leaf reached by `row`.
    pub fn predict(&self, row: &[f64]) -> usize {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { class } => return *class,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }

    /// Impurity-based importances normalized to sum to 1; all zeros for a single-leaf tree.
    pub fn feature_importances(&self) -> Vec<f64> {
        normalize(&self.impurity_decrease)
    }

    /// Verifies a deserialized tree before it serves predictions: every split
    /// reads a column below `n_features`, every leaf names a class below
    /// `n_classes`, and children sit after their parent inside the node array,
    /// so `predict` always terminates in bounds.
    pub fn check_structure(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        if self.n_features != n_features || self.impurity_decrease.len() != n_features {
            return Err(format!(
                "tree is sized for {} features, forest has {}",
                self.n_features, n_features
            ));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Leaf { class } if class >= n_classes => {
                    return Err(format!(
                        "node {} predicts class {} outside 0..{}",
                        idx, class, n_classes
                    ));
                }
                Node::Leaf { .. } => {}
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if feature >= n_features {
                        return Err(format!(
                            "node {} splits on feature {} outside 0..{}",
                            idx, feature, n_features
                        ));
                    }
                    for child in [left, right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!(
                                "node {} has child {} outside {}..{}",
                                idx,
                                child,
                                idx + 1,
                                self.nodes.len()
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn normalize(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total > 0.0 {
        values.iter().map(|v| v / total).collect()
    } else {
        vec![0.0; values.len()]
    }
}

fn class_counts(y: &[usize], samples: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &s in samples {
        counts[y[s]] += 1;
    }
    counts
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Most frequent class; ties go to the lower class index.
fn majority(counts: &[usize]) -> usize {
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}

/// Scans features in the given (shuffled) order until `max_features` non-constant
/// features have been evaluated. Constant features do not count toward the budget.
fn best_split(
    x: &[Vec<f64>],
    y: &[usize],
    n_classes: usize,
    samples: &[usize],
    features: &[usize],
    params: &TreeParams,
) -> Option<BestSplit> {
    let n = samples.len();
    let parent_counts = class_counts(y, samples, n_classes);
    let mut best: Option<(usize, f64, f64)> = None;
    let mut evaluated = 0;
    let mut sorted = samples.to_vec();

    for &feature in features {
        if evaluated >= params.max_features && best.is_some() {
            break;
        }

        sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));
        let lowest = x[sorted[0]][feature];
        let highest = x[sorted[n - 1]][feature];
        if lowest == highest {
            continue;
        }
        evaluated += 1;

        let mut left_counts = vec![0usize; n_classes];
        for i in 0..n - 1 {
            left_counts[y[sorted[i]]] += 1;
            let here = x[sorted[i]][feature];
            let next = x[sorted[i + 1]][feature];
            if here == next {
                continue;
            }

            let n_left = i + 1;
            let n_right = n - n_left;
            if n_left < params.min_samples_leaf || n_right < params.min_samples_leaf {
                continue;
            }

            let right_counts: Vec<usize> = parent_counts
                .iter()
                .zip(&left_counts)
                .map(|(p, l)| p - l)
                .collect();
            let impurity = (n_left as f64 * gini(&left_counts, n_left)
                + n_right as f64 * gini(&right_counts, n_right))
                / n as f64;

            if best.is_none_or(|(_, _, b)| impurity < b) {
                let mut threshold = here + (next - here) / 2.0;
                if threshold >= next {
                    threshold = here;
                }
                best = Some((feature, threshold, impurity));
            }
        }
    }

    let (feature, threshold, impurity) = best?;
    let (left, right): (Vec<usize>, Vec<usize>) =
        samples.iter().copied().partition(|&s| x[s][feature] <= threshold);

    Some(BestSplit {
        feature,
        threshold,
        impurity,
        left,
        right,
    })
}
