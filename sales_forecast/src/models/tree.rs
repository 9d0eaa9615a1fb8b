//! CART regression tree
//!
//! Splits minimise the within-node sum of squared errors (the ANOVA
//! criterion); leaves predict the mean of their training rows.

use crate::error::{Result, SalesError};
use crate::features::EnrichedRecord;
use crate::models::{feature_matrix, targets, Feature, FittedRegressor, Regressor, BASE_FEATURES};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tree growth limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Maximum depth of tree (the root is depth 0)
    pub max_depth: usize,
    /// Minimum samples required to attempt a split
    pub min_samples_split: usize,
    /// Minimum samples in each leaf
    pub min_samples_leaf: usize,
    /// A split must remove at least this fraction of the root node's SSE
    pub complexity: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 30,
            min_samples_split: 20,
            min_samples_leaf: 7,
            complexity: 0.01,
        }
    }
}

/// Tree node
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        /// Column index into the feature row
        feature: usize,
        /// Rows with `value <= threshold` go left
        threshold: f64,
        n_samples: usize,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    pub fn n_samples(&self) -> usize {
        match self {
            TreeNode::Leaf { n_samples, .. } | TreeNode::Split { n_samples, .. } => *n_samples,
        }
    }

    /// Number of levels, a single leaf has depth 1
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Grows one tree over the rows listed in `indices`
struct TreeGrower<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    config: &'a TreeConfig,
    min_gain: f64,
}

impl<'a> TreeGrower<'a> {
    fn new(x: &'a [Vec<f64>], y: &'a [f64], config: &'a TreeConfig) -> Self {
        Self {
            x,
            y,
            config,
            min_gain: 0.0,
        }
    }

    fn grow(mut self, indices: &[usize]) -> TreeNode {
        let n_features = indices.first().map(|&i| self.x[i].len()).unwrap_or(0);

        // One sorted copy of the indices per feature; children inherit the order.
        let sorted: Vec<Vec<usize>> = (0..n_features)
            .map(|f| {
                let mut order = indices.to_vec();
                order.sort_by(|&a, &b| self.x[a][f].total_cmp(&self.x[b][f]));
                order
            })
            .collect();

        let (_, root_sse) = self.moments(indices);
        self.min_gain = self.config.complexity * root_sse;

        if sorted.is_empty() {
            return self.leaf(indices);
        }
        self.build(sorted, 0)
    }

    fn build(&self, sorted: Vec<Vec<usize>>, depth: usize) -> TreeNode {
        let members = &sorted[0];
        let n = members.len();
        let (_, sse) = self.moments(members);

        if depth >= self.config.max_depth
            || n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf.max(1)
            || sse <= 1e-12
        {
            return self.leaf(members);
        }

        let best = match self.find_best_split(&sorted, sse) {
            Some(best) if best.gain > 0.0 && best.gain >= self.min_gain => best,
            _ => return self.leaf(members),
        };

        let mut goes_left = vec![false; self.x.len()];
        for &i in members {
            goes_left[i] = self.x[i][best.feature] <= best.threshold;
        }

        let (left, right): (Vec<Vec<usize>>, Vec<Vec<usize>>) = sorted
            .iter()
            .map(|order| order.iter().partition::<Vec<usize>, _>(|&&i| goes_left[i]))
            .unzip();

        TreeNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            n_samples: n,
            left: Box::new(self.build(left, depth + 1)),
            right: Box::new(self.build(right, depth + 1)),
        }
    }

    fn find_best_split(&self, sorted: &[Vec<usize>], node_sse: f64) -> Option<BestSplit> {
        let min_leaf = self.config.min_samples_leaf.max(1);
        let mut best: Option<BestSplit> = None;

        for (feature, order) in sorted.iter().enumerate() {
            let n = order.len();
            let total_sum: f64 = order.iter().map(|&i| self.y[i]).sum();
            let total_sq: f64 = order.iter().map(|&i| self.y[i] * self.y[i]).sum();

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 1..n {
                let prev = order[k - 1];
                left_sum += self.y[prev];
                left_sq += self.y[prev] * self.y[prev];

                let a = self.x[prev][feature];
                let b = self.x[order[k]][feature];
                if k < min_leaf || n - k < min_leaf || a >= b {
                    continue;
                }

                let left_sse = left_sq - left_sum * left_sum / k as f64;
                let right_sum = total_sum - left_sum;
                let right_sse = (total_sq - left_sq) - right_sum * right_sum / (n - k) as f64;
                let gain = node_sse - (left_sse.max(0.0) + right_sse.max(0.0));

                if best.as_ref().map_or(true, |b| gain > b.gain) {
                    let mut threshold = a + (b - a) / 2.0;
                    if threshold >= b {
                        threshold = a;
                    }
                    best = Some(BestSplit {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }

    /// (sum, sum of squared deviations) of the targets
    fn moments(&self, members: &[usize]) -> (f64, f64) {
        if members.is_empty() {
            return (0.0, 0.0);
        }
        let n = members.len() as f64;
        let sum: f64 = members.iter().map(|&i| self.y[i]).sum();
        let mean = sum / n;
        let sse = members.iter().map(|&i| (self.y[i] - mean).powi(2)).sum();
        (sum, sse)
    }

    fn leaf(&self, members: &[usize]) -> TreeNode {
        let (sum, _) = self.moments(members);
        let value = if members.is_empty() {
            0.0
        } else {
            sum / members.len() as f64
        };
        TreeNode::Leaf {
            value,
            n_samples: members.len(),
        }
    }
}

/// Regression tree adapter
#[derive(Debug, Clone)]
pub struct TreeModel {
    name: String,
    features: Vec<Feature>,
    config: TreeConfig,
}

/// Fitted regression tree
#[derive(Debug, Clone)]
pub struct FittedTreeModel {
    name: String,
    features: Vec<Feature>,
    root: TreeNode,
}

impl Default for TreeModel {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}

impl TreeModel {
    /// Tree over fuel price, CPI, unemployment and the holiday flag
    pub fn new(config: TreeConfig) -> Self {
        Self {
            name: "Decision Tree".to_string(),
            features: BASE_FEATURES.to_vec(),
            config,
        }
    }

    pub fn with_features(mut self, features: &[Feature]) -> Self {
        self.features = features.to_vec();
        self
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }
}

impl Regressor for TreeModel {
    type Fitted = FittedTreeModel;

    fn name(&self) -> &str {
        &self.name
    }

    fn fit(&self, rows: &[EnrichedRecord]) -> Result<FittedTreeModel> {
        if rows.is_empty() {
            return Err(SalesError::insufficient(&self.name, 1, 0));
        }

        let x = feature_matrix(&self.name, rows, &self.features)?;
        let y = targets(rows);
        let indices: Vec<usize> = (0..rows.len()).collect();
        let root = TreeGrower::new(&x, &y, &self.config).grow(&indices);

        debug!(
            depth = root.depth(),
            leaves = root.n_leaves(),
            rows = rows.len(),
            "fitted regression tree"
        );

        Ok(FittedTreeModel {
            name: self.name.clone(),
            features: self.features.clone(),
            root,
        })
    }
}

impl FittedTreeModel {
    pub fn root(&self) -> &TreeNode {
        &self.root
    }
}

impl FittedRegressor for FittedTreeModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn features(&self) -> &[Feature] {
        &self.features
    }

    fn predict(&self, rows: &[EnrichedRecord]) -> Result<Vec<f64>> {
        let x = feature_matrix(&self.name, rows, &self.features)?;
        Ok(x.iter().map(|row| self.root.predict(row)).collect())
    }
}
