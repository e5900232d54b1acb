use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DISCLAIMER: &str = "Consensus-based AI assessment. Not a medical diagnosis.";

pub const HIGH_RISK_LABEL: &str = "High Cardiovascular Risk";
pub const HEALTHY_LABEL: &str = "Healthy Cardiovascular Profile";

// ---------------------------------------------------------------------------
// ModelOutput — one classifier's verdict for a single feature vector
// ---------------------------------------------------------------------------

/// The label a classifier assigned plus the probability it gave to *its own*
/// predicted class. This is not always P(class 1): a model predicting 0 with
/// probability 0.9 contributes 0.9 here, not 0.1.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    /// Display name baked into the artifact (e.g. "RandomForest").
    pub name: String,
    pub label: u8,
    /// Probability of the predicted class, in [0, 1].
    pub probability: f64,
    /// Historical held-out accuracy label fixed at training time.
    pub accuracy: String,
}

// ---------------------------------------------------------------------------
// Prediction response — field names are a wire compatibility contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDetail {
    pub pred: u8,
    pub conf: String,
    pub accuracy: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    pub impact: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: u8,
    pub consensus: String,
    pub result: String,
    pub confidence: String,
    pub models_detail: BTreeMap<String, ModelDetail>,
    pub top_factors: Vec<RiskFactor>,
    pub disclaimer: String,
}
