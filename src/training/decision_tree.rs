//! Regression tree

use crate::error::{PriceError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf {
        value: f64,
        n_samples: usize,
    },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Best split found for one node
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Regression tree grown by minimizing mean squared error.
///
/// Trees are grown until every leaf is pure or holds a single sample, and
/// every feature is considered at each split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    /// Tree root
    root: Option<TreeNode>,
    /// Number of features
    n_features: usize,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
}

impl Default for RegressionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RegressionTree {
    /// Create a fully grown tree
    pub fn new() -> Self {
        Self {
            root: None,
            n_features: 0,
            feature_importances: None,
        }
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(PriceError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        if n_samples == 0 {
            return Err(PriceError::ValidationError("cannot fit a tree on zero samples".to_string()));
        }

        self.n_features = n_features;
        let mut importances = vec![0.0; n_features];

        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, y, indices, &mut importances));

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: Vec<usize>,
        importances: &mut [f64],
    ) -> TreeNode {
        let n_samples = indices.len();
        let value = mean(indices.iter().map(|&i| y[i]), n_samples);
        let impurity = indices.iter().map(|&i| (y[i] - value).powi(2)).sum::<f64>() / n_samples as f64;

        if n_samples < 2 || impurity <= f64::EPSILON * value.abs().max(1.0) {
            return TreeNode::Leaf { value, n_samples };
        }

        let Some(best) = self.find_best_split(x, y, &indices, value, impurity) else {
            return TreeNode::Leaf { value, n_samples };
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| x[[i, best.feature_idx]] <= best.threshold);

        importances[best.feature_idx] += n_samples as f64 * best.gain;

        let left = Box::new(self.build_tree(x, y, left_indices, importances));
        let right = Box::new(self.build_tree(x, y, right_indices, importances));

        TreeNode::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            left,
            right,
            n_samples,
            impurity,
        }
    }

    /// Sweep each feature in sorted order, tracking left/right sums
    /// of centered targets so the weighted MSE of every boundary is O(1).
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        node_mean: f64,
        node_impurity: f64,
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let total_sum: f64 = indices.iter().map(|&i| y[i] - node_mean).sum();
        let total_sq: f64 = indices.iter().map(|&i| (y[i] - node_mean).powi(2)).sum();

        let mut best: Option<SplitCandidate> = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);

        for feature_idx in 0..self.n_features {
            pairs.clear();
            pairs.extend(indices.iter().map(|&i| (x[[i, feature_idx]], y[i] - node_mean)));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            if pairs[0].0 == pairs[n - 1].0 {
                continue;
            }

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for split_at in 1..n {
                let (prev_value, prev_y) = pairs[split_at - 1];
                left_sum += prev_y;
                left_sq += prev_y * prev_y;

                let next_value = pairs[split_at].0;
                if prev_value == next_value {
                    continue;
                }

                let left_count = split_at;
                let right_count = n - split_at;

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let left_sse = left_sq - left_sum * left_sum / left_count as f64;
                let right_sse = right_sq - right_sum * right_sum / right_count as f64;
                let gain = node_impurity - (left_sse + right_sse) / n as f64;

                if gain > best.map_or(0.0, |b| b.gain) {
                    let mut threshold = (prev_value + next_value) / 2.0;
                    if threshold >= next_value {
                        threshold = prev_value;
                    }
                    best = Some(SplitCandidate { feature_idx, threshold, gain });
                }
            }
        }

        best
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(PriceError::ModelNotFitted)?;

        if x.ncols() != self.n_features {
            return Err(PriceError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok(x.rows().into_iter().map(|row| Self::predict_sample(root, row)).collect())
    }

    fn predict_sample(node: &TreeNode, sample: ArrayView1<f64>) -> f64 {
        match node {
            TreeNode::Leaf { value, .. } => *value,
            TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                if sample[*feature_idx] <= *threshold {
                    Self::predict_sample(left, sample)
                } else {
                    Self::predict_sample(right, sample)
                }
            }
        }
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Get tree depth
    pub fn get_depth(&self) -> usize {
        fn depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        self.root.as_ref().map_or(0, depth)
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        fn leaves(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => leaves(left) + leaves(right),
            }
        }
        self.root.as_ref().map_or(0, leaves)
    }
}

fn mean(values: impl Iterator<Item = f64>, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    values.sum::<f64>() / n as f64
}
