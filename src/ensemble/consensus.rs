//! Majority-vote consensus over the three ensemble members.
//!
//! Known limitation, preserved for wire compatibility: `top_factors` ranks
//! the forest's *global* split importances and ignores the magnitudes of the
//! current request's inputs. A per-patient risk-driver ranking would weight
//! each importance by the input's deviation from a reference profile; the
//! trainer-side contract pins the static ranking instead.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::{
    ModelDetail, ModelOutput, PredictResponse, RiskFactor, DISCLAIMER, HEALTHY_LABEL,
    HIGH_RISK_LABEL,
};

/// Combine three member outputs and the importance vector into the final
/// response. Pure function; all I/O and model inference happen upstream.
pub fn score_consensus(
    outputs: &[ModelOutput; 3],
    feature_names: &[String],
    importances: &[f64],
) -> PredictResponse {
    // Majority vote. With 3 binary voters a tie is impossible.
    let risk_votes: u8 = outputs.iter().map(|o| o.label).sum();
    let prediction = u8::from(risk_votes >= 2);

    // Mean of each member's own-class probability, as a percentage.
    let avg = outputs.iter().map(|o| o.probability).sum::<f64>() / 3.0;
    let confidence = round_to(avg * 100.0, 2);

    let models_detail: BTreeMap<String, ModelDetail> = outputs
        .iter()
        .map(|o| {
            (
                o.name.clone(),
                ModelDetail {
                    pred: o.label,
                    conf: fmt_pct(round_to(o.probability * 100.0, 1)),
                    accuracy: o.accuracy.clone(),
                },
            )
        })
        .collect();

    PredictResponse {
        prediction,
        consensus: format!("{risk_votes}/3 Models Calculated Risk"),
        result: if prediction == 1 {
            HIGH_RISK_LABEL.to_string()
        } else {
            HEALTHY_LABEL.to_string()
        },
        confidence: fmt_pct(confidence),
        models_detail,
        top_factors: top_factors(feature_names, importances),
        disclaimer: DISCLAIMER.to_string(),
    }
}

/// Top-3 features by forest importance, scaled to percent.
pub fn top_factors(feature_names: &[String], importances: &[f64]) -> Vec<RiskFactor> {
    let mut factors: Vec<RiskFactor> = feature_names
        .iter()
        .zip(importances)
        .map(|(name, imp)| RiskFactor {
            name: name.clone(),
            impact: round_to(imp * 100.0, 1),
        })
        .collect();

    factors.sort_by(|a, b| b.impact.partial_cmp(&a.impact).unwrap_or(Ordering::Equal));
    factors.truncate(3);
    factors
}

/// Round half to even, matching the banker's rounding the reference wire
/// format was produced with. Exact halves are rare after binary scaling but
/// do occur (e.g. a raw 72.25 rounds to 72.2, not 72.3).
fn round_to(x: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let scaled = x * factor;
    let floor = scaled.floor();
    let rounded = match scaled - floor {
        diff if diff > 0.5 => floor + 1.0,
        diff if diff < 0.5 => floor,
        _ if floor % 2.0 == 0.0 => floor,
        _ => floor + 1.0,
    };
    rounded / factor
}

/// Render a rounded percentage the way the original wire format does:
/// shortest decimal form, but always with at least one decimal digit
/// ("85.0%", "92.33%").
fn fmt_pct(x: f64) -> String {
    if x == x.trunc() {
        format!("{x:.1}%")
    } else {
        format!("{x}%")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
