use std::sync::{Arc, OnceLock};

use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use ndarray::Array1;

use cardiosense::api::router::create_router;
use cardiosense::config::AppConfig;
use cardiosense::ensemble::{
    DecisionTree, Ensemble, GradientBoostedModel, LogisticRegressionModel, RandomForestModel,
    RegressionNode, RegressionTree, SubModel, TreeNode,
};
use cardiosense::AppState;

pub const FEATURES: [&str; 13] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// Only one Prometheus recorder may exist per process; share it across tests.
fn metrics_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(cardiosense::metrics::init_metrics)
        .clone()
}

/// Hand-built ensemble with known, deterministic behavior.
///
/// With an all-zero feature row:
/// - forest: mean([0.8, 0.2], [0.6, 0.4]) = [0.7, 0.3] → label 0, p 0.7
/// - logistic: sigmoid(-1) → label 0, p ≈ 0.7311
/// - boosted: sigmoid(-0.1) → label 0, p ≈ 0.5250
/// → prediction 0, confidence "65.2%"
#[allow(dead_code)]
pub fn fixture_ensemble() -> Ensemble {
    let forest = RandomForestModel {
        trees: vec![
            DecisionTree {
                root: TreeNode::Split {
                    feature: 0, // age
                    threshold: 50.0,
                    left: Box::new(TreeNode::Leaf { proba: [0.8, 0.2] }),
                    right: Box::new(TreeNode::Leaf { proba: [0.3, 0.7] }),
                },
            },
            DecisionTree {
                root: TreeNode::Leaf { proba: [0.6, 0.4] },
            },
        ],
    };

    // Coefficient on cp only
    let mut weights = vec![0.0; FEATURES.len()];
    weights[2] = 1.0;
    let logistic = LogisticRegressionModel {
        weights: Array1::from(weights),
        intercept: -1.0,
    };

    let boosted = GradientBoostedModel {
        base_score: 0.0,
        learning_rate: 0.1,
        trees: vec![RegressionTree {
            root: RegressionNode::Split {
                feature: 9, // oldpeak
                threshold: 1.0,
                left: Box::new(RegressionNode::Leaf { value: -1.0 }),
                right: Box::new(RegressionNode::Leaf { value: 2.0 }),
            },
        }],
    };

    // thalach, cp, ca lead; the ten others share the remainder evenly.
    let mut importances = vec![0.04; FEATURES.len()];
    importances[7] = 0.25;
    importances[2] = 0.20;
    importances[11] = 0.15;

    Ensemble {
        version: 1,
        trained_at: Utc::now(),
        feature_names: FEATURES.iter().map(|s| s.to_string()).collect(),
        random_forest: SubModel {
            name: "RandomForest".into(),
            accuracy: "88.7%".into(),
            model: forest,
        },
        logistic_regression: SubModel {
            name: "LogisticRegression".into(),
            accuracy: "89.6%".into(),
            model: logistic,
        },
        gradient_boost: SubModel {
            name: "XGBoost".into(),
            accuracy: "88.7%".into(),
            model: boosted,
        },
        feature_importances: importances,
    }
}

#[allow(dead_code)]
pub fn build_test_app(ensemble: Option<Ensemble>) -> axum::Router {
    let config = AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        model_path: "unused.json".into(),
    };

    let state = AppState {
        config,
        ensemble: ensemble.map(Arc::new),
        metrics_handle: metrics_handle(),
    };

    create_router(state)
}
