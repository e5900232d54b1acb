use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::ModelOutput;

use super::classifier::{
    Classifier, GradientBoostedModel, LogisticRegressionModel, RandomForestModel,
};

/// One fitted ensemble member plus the display metadata baked in by the
/// trainer: a stable name for the per-model breakdown and the held-out
/// accuracy label reported alongside each prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubModel<M> {
    pub name: String,
    pub accuracy: String,
    pub model: M,
}

/// The serialized bundle exported by the offline trainer. Loaded once at
/// startup and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ensemble {
    pub version: u32,
    pub trained_at: DateTime<Utc>,
    /// Fixed feature order; requests are projected onto exactly this order.
    pub feature_names: Vec<String>,
    pub random_forest: SubModel<RandomForestModel>,
    pub logistic_regression: SubModel<LogisticRegressionModel>,
    pub gradient_boost: SubModel<GradientBoostedModel>,
    /// Forest split importances, aligned with `feature_names`. A static
    /// display ranking only; never recomputed per request.
    pub feature_importances: Vec<f64>,
}

impl Ensemble {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open model artifact at {}", path.display()))?;
        let ensemble: Ensemble = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse model artifact at {}", path.display()))?;

        ensemble
            .validate()
            .with_context(|| format!("invalid model artifact at {}", path.display()))?;

        Ok(ensemble)
    }

    /// Reject parseable-but-inconsistent bundles at load time, so corruption
    /// degrades the server instead of surfacing mid-request.
    fn validate(&self) -> anyhow::Result<()> {
        let n = self.feature_names.len();

        if self.feature_importances.len() != n {
            anyhow::bail!(
                "artifact has {} importances for {} features",
                self.feature_importances.len(),
                n,
            );
        }

        let weights = self.logistic_regression.model.weights.len();
        if weights != n {
            anyhow::bail!("logistic model has {weights} weights for {n} features");
        }

        let forest_max = self
            .random_forest
            .model
            .trees
            .iter()
            .filter_map(|t| t.root.max_feature())
            .max();
        if let Some(idx) = forest_max {
            if idx >= n {
                anyhow::bail!("forest splits on feature index {idx} but only {n} features exist");
            }
        }

        let boost_max = self
            .gradient_boost
            .model
            .trees
            .iter()
            .filter_map(|t| t.root.max_feature())
            .max();
        if let Some(idx) = boost_max {
            if idx >= n {
                anyhow::bail!(
                    "boosted tree splits on feature index {idx} but only {n} features exist"
                );
            }
        }

        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer(BufWriter::new(file), self)
            .with_context(|| format!("failed to write model artifact to {}", path.display()))?;
        Ok(())
    }

    /// Project a request body onto the training-time feature order.
    /// Missing or non-numeric fields coerce to 0.0, silently.
    pub fn feature_row(&self, data: &serde_json::Map<String, Value>) -> Array1<f64> {
        let values: Vec<f64> = self
            .feature_names
            .iter()
            .map(|name| coerce(data.get(name)))
            .collect();
        Array1::from(values)
    }

    /// Run all three members against one feature row. Each output carries the
    /// probability the member assigned to its own predicted class.
    pub fn outputs(&self, x: &Array1<f64>) -> [ModelOutput; 3] {
        [
            member_output(&self.random_forest, x),
            member_output(&self.logistic_regression, x),
            member_output(&self.gradient_boost, x),
        ]
    }
}

fn member_output<M: Classifier>(sub: &SubModel<M>, x: &Array1<f64>) -> ModelOutput {
    let proba = sub.model.predict_proba(x);
    let label = sub.model.predict(x);
    ModelOutput {
        name: sub.name.clone(),
        label,
        probability: proba[label as usize],
        accuracy: sub.accuracy.clone(),
    }
}

fn coerce(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::classifier::{DecisionTree, RegressionNode, RegressionTree, TreeNode};
    use ndarray::array;
    use serde_json::json;

    fn tiny_ensemble() -> Ensemble {
        Ensemble {
            version: 1,
            trained_at: Utc::now(),
            feature_names: vec!["age".into(), "chol".into(), "thalach".into()],
            random_forest: SubModel {
                name: "RandomForest".into(),
                accuracy: "88.7%".into(),
                model: RandomForestModel {
                    trees: vec![DecisionTree {
                        root: TreeNode::Leaf { proba: [0.3, 0.7] },
                    }],
                },
            },
            logistic_regression: SubModel {
                name: "LogisticRegression".into(),
                accuracy: "89.6%".into(),
                model: LogisticRegressionModel {
                    weights: array![0.0, 0.0, 0.0],
                    intercept: -1.0,
                },
            },
            gradient_boost: SubModel {
                name: "XGBoost".into(),
                accuracy: "88.7%".into(),
                model: GradientBoostedModel {
                    base_score: 0.0,
                    learning_rate: 0.1,
                    trees: vec![RegressionTree {
                        root: RegressionNode::Leaf { value: 3.0 },
                    }],
                },
            },
            feature_importances: vec![0.5, 0.3, 0.2],
        }
    }

    #[test]
    fn test_feature_row_order_and_defaults() {
        let ensemble = tiny_ensemble();

        let data = json!({ "chol": 240, "age": 63 });
        let row = ensemble.feature_row(data.as_object().unwrap());

        // Projected onto artifact order; missing thalach defaults to 0.
        assert_eq!(row, array![63.0, 240.0, 0.0]);
    }

    #[test]
    fn test_feature_row_coerces_non_numeric() {
        let ensemble = tiny_ensemble();

        let data = json!({
            "age": "63.5",
            "chol": "not a number",
            "thalach": null,
        });
        let row = ensemble.feature_row(data.as_object().unwrap());

        assert_eq!(row, array![63.5, 0.0, 0.0]);
    }

    #[test]
    fn test_outputs_report_own_class_probability() {
        let ensemble = tiny_ensemble();
        let row = ensemble.feature_row(json!({}).as_object().unwrap());

        let [rf, lr, gb] = ensemble.outputs(&row);

        assert_eq!(rf.label, 1);
        assert!((rf.probability - 0.7).abs() < 1e-12);

        // sigmoid(-1) ≈ 0.269 → predicts 0, reports P(0) ≈ 0.731
        assert_eq!(lr.label, 0);
        assert!((lr.probability - 0.7310585786300049).abs() < 1e-12);

        // sigmoid(0.3) ≈ 0.574 → predicts 1, reports P(1)
        assert_eq!(gb.label, 1);
        assert!((gb.probability - 0.574442516811659).abs() < 1e-9);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ensemble.json");

        let ensemble = tiny_ensemble();
        ensemble.save(&path).unwrap();

        let loaded = Ensemble::load(&path).unwrap();
        assert_eq!(loaded.feature_names, ensemble.feature_names);
        assert_eq!(loaded.feature_importances, ensemble.feature_importances);
        assert_eq!(loaded.random_forest.name, "RandomForest");

        let row = loaded.feature_row(json!({}).as_object().unwrap());
        let [rf, _, _] = loaded.outputs(&row);
        assert_eq!(rf.label, 1);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let err = Ensemble::load("/nonexistent/ensemble.json").unwrap_err();
        assert!(err.to_string().contains("failed to open"));
    }

    #[test]
    fn test_load_rejects_misaligned_importances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ensemble.json");

        let mut ensemble = tiny_ensemble();
        ensemble.feature_importances.pop();
        ensemble.save(&path).unwrap();

        let err = Ensemble::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("importances"));
    }

    #[test]
    fn test_load_rejects_out_of_range_forest_split() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ensemble.json");

        // Split on feature 5 in a 3-feature artifact: parses fine, but would
        // index out of bounds on the first scored request.
        let mut ensemble = tiny_ensemble();
        ensemble.random_forest.model.trees.push(DecisionTree {
            root: TreeNode::Split {
                feature: 5,
                threshold: 1.0,
                left: Box::new(TreeNode::Leaf { proba: [1.0, 0.0] }),
                right: Box::new(TreeNode::Leaf { proba: [0.0, 1.0] }),
            },
        });
        ensemble.save(&path).unwrap();

        let err = Ensemble::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("feature index 5"));
    }

    #[test]
    fn test_load_rejects_out_of_range_boosted_split() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ensemble.json");

        let mut ensemble = tiny_ensemble();
        ensemble.gradient_boost.model.trees.push(RegressionTree {
            root: RegressionNode::Split {
                feature: 9,
                threshold: 0.0,
                left: Box::new(RegressionNode::Leaf { value: -1.0 }),
                right: Box::new(RegressionNode::Leaf { value: 1.0 }),
            },
        });
        ensemble.save(&path).unwrap();

        let err = Ensemble::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("feature index 9"));
    }

    #[test]
    fn test_load_rejects_misaligned_logistic_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ensemble.json");

        let mut ensemble = tiny_ensemble();
        ensemble.logistic_regression.model.weights = array![0.1, 0.2];
        ensemble.save(&path).unwrap();

        let err = Ensemble::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("weights"));
    }
}
