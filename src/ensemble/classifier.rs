use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Capability set every ensemble member must provide. Mirrors the trainer
/// side: a hard label plus a full distribution over the two classes.
pub trait Classifier {
    /// Class probabilities as `[P(class 0), P(class 1)]`.
    fn predict_proba(&self, x: &Array1<f64>) -> [f64; 2];

    /// Predicted label: argmax over the class probabilities.
    /// Ties resolve to class 0, matching argmax-takes-first semantics.
    fn predict(&self, x: &Array1<f64>) -> u8 {
        let p = self.predict_proba(x);
        u8::from(p[1] > p[0])
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

// ---------------------------------------------------------------------------
// Decision trees (classification)
// ---------------------------------------------------------------------------

/// A single fitted tree node. The trainer exports the full recursive
/// structure; inference is a plain threshold walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        /// Class distribution at this leaf, `[P(0), P(1)]`.
        proba: [f64; 2],
    },
}

impl TreeNode {
    /// Largest feature index referenced by any split under this node.
    /// `None` for a bare leaf.
    pub fn max_feature(&self) -> Option<usize> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Split {
                feature,
                left,
                right,
                ..
            } => {
                let mut max = *feature;
                if let Some(m) = left.max_feature() {
                    max = max.max(m);
                }
                if let Some(m) = right.max_feature() {
                    max = max.max(m);
                }
                Some(max)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub root: TreeNode,
}

impl DecisionTree {
    fn walk(&self, x: &Array1<f64>) -> [f64; 2] {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { proba } => return *proba,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

impl Classifier for DecisionTree {
    fn predict_proba(&self, x: &Array1<f64>) -> [f64; 2] {
        self.walk(x)
    }
}

// ---------------------------------------------------------------------------
// Random forest
// ---------------------------------------------------------------------------

/// Bagged classification trees; the forest probability is the unweighted
/// mean over member trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestModel {
    pub trees: Vec<DecisionTree>,
}

impl Classifier for RandomForestModel {
    fn predict_proba(&self, x: &Array1<f64>) -> [f64; 2] {
        if self.trees.is_empty() {
            return [0.5, 0.5];
        }

        let mut acc = [0.0, 0.0];
        for tree in &self.trees {
            let p = tree.walk(x);
            acc[0] += p[0];
            acc[1] += p[1];
        }

        let n = self.trees.len() as f64;
        [acc[0] / n, acc[1] / n]
    }
}

// ---------------------------------------------------------------------------
// Logistic regression
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionModel {
    /// One coefficient per feature, aligned with the artifact's feature order.
    pub weights: Array1<f64>,
    pub intercept: f64,
}

impl Classifier for LogisticRegressionModel {
    fn predict_proba(&self, x: &Array1<f64>) -> [f64; 2] {
        let z = self.weights.dot(x) + self.intercept;
        let p1 = sigmoid(z);
        [1.0 - p1, p1]
    }
}

// ---------------------------------------------------------------------------
// Gradient-boosted trees
// ---------------------------------------------------------------------------

/// Regression tree with scalar leaves; used as the weak learner for boosting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<RegressionNode>,
        right: Box<RegressionNode>,
    },
    Leaf {
        value: f64,
    },
}

impl RegressionNode {
    /// Largest feature index referenced by any split under this node.
    pub fn max_feature(&self) -> Option<usize> {
        match self {
            RegressionNode::Leaf { .. } => None,
            RegressionNode::Split {
                feature,
                left,
                right,
                ..
            } => {
                let mut max = *feature;
                if let Some(m) = left.max_feature() {
                    max = max.max(m);
                }
                if let Some(m) = right.max_feature() {
                    max = max.max(m);
                }
                Some(max)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    pub root: RegressionNode,
}

impl RegressionTree {
    fn walk(&self, x: &Array1<f64>) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                RegressionNode::Leaf { value } => return *value,
                RegressionNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

/// Additive boosted ensemble over logit scores:
/// `p1 = sigmoid(base_score + learning_rate * sum(tree scores))`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostedModel {
    pub base_score: f64,
    pub learning_rate: f64,
    pub trees: Vec<RegressionTree>,
}

impl Classifier for GradientBoostedModel {
    fn predict_proba(&self, x: &Array1<f64>) -> [f64; 2] {
        let raw: f64 = self.trees.iter().map(|t| t.walk(x)).sum();
        let p1 = sigmoid(self.base_score + self.learning_rate * raw);
        [1.0 - p1, p1]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
