//! One-shot merge of the two heart-disease CSV sources.
//!
//! The two files disagree on column names, label polarity, and categorical
//! encodings. Everything here is a fixed data contract, not an algorithm:
//!
//! | clinic column             | canonical | transform                     |
//! |---------------------------|-----------|-------------------------------|
//! | `Age`                     | `age`     | as-is                         |
//! | `Sex`                     | `sex`     | as-is                         |
//! | `Chest pain type`         | `cp`      | 1-based → 0-based (−1)        |
//! | `BP`                      | `trestbps`| as-is                         |
//! | `Cholesterol`             | `chol`    | as-is                         |
//! | `FBS over 120`            | `fbs`     | as-is                         |
//! | `EKG results`             | `restecg` | as-is                         |
//! | `Max HR`                  | `thalach` | as-is                         |
//! | `Exercise angina`         | `exang`   | as-is                         |
//! | `ST depression`           | `oldpeak` | as-is                         |
//! | `Slope of ST`             | `slope`   | 1-based → 0-based (−1)        |
//! | `Number of vessels fluro` | `ca`      | as-is                         |
//! | `Thallium`                | `thal`    | 6→1, 3→2, 7→3, else 2         |
//! | `Heart Disease`           | `target`  | Presence→1, Absence→0         |
//!
//! The legacy file already uses the canonical column names but encodes the
//! target with inverted polarity (1 = healthy), so its labels flip. The
//! combined output uses 1 = disease throughout.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Canonical row schema: legacy column names, 0-based codes, 1 = disease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRecord {
    pub age: f64,
    pub sex: i64,
    pub cp: i64,
    pub trestbps: f64,
    pub chol: f64,
    pub fbs: i64,
    pub restecg: i64,
    pub thalach: f64,
    pub exang: i64,
    pub oldpeak: f64,
    pub slope: i64,
    pub ca: i64,
    pub thal: i64,
    pub target: i64,
}

/// Row shape of the clinic export, prior to normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct ClinicRecord {
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Sex")]
    pub sex: i64,
    #[serde(rename = "Chest pain type")]
    pub cp: i64,
    #[serde(rename = "BP")]
    pub trestbps: f64,
    #[serde(rename = "Cholesterol")]
    pub chol: f64,
    #[serde(rename = "FBS over 120")]
    pub fbs: i64,
    #[serde(rename = "EKG results")]
    pub restecg: i64,
    #[serde(rename = "Max HR")]
    pub thalach: f64,
    #[serde(rename = "Exercise angina")]
    pub exang: i64,
    #[serde(rename = "ST depression")]
    pub oldpeak: f64,
    #[serde(rename = "Slope of ST")]
    pub slope: i64,
    #[serde(rename = "Number of vessels fluro")]
    pub ca: i64,
    #[serde(rename = "Thallium")]
    pub thal: i64,
    #[serde(rename = "Heart Disease")]
    pub target: String,
}

impl From<ClinicRecord> for HeartRecord {
    fn from(r: ClinicRecord) -> Self {
        HeartRecord {
            age: r.age,
            sex: r.sex,
            cp: r.cp - 1,
            trestbps: r.trestbps,
            chol: r.chol,
            fbs: r.fbs,
            restecg: r.restecg,
            thalach: r.thalach,
            exang: r.exang,
            oldpeak: r.oldpeak,
            slope: r.slope - 1,
            ca: r.ca,
            thal: remap_thallium(r.thal),
            target: i64::from(r.target == "Presence"),
        }
    }
}

/// Clinic thallium codes {6, 3, 7} onto the legacy {1, 2, 3} scale.
/// Unmapped codes fall back to 2 (normal).
pub fn remap_thallium(code: i64) -> i64 {
    match code {
        6 => 1, // fixed defect
        3 => 2, // normal
        7 => 3, // reversable defect
        _ => 2,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MergeSummary {
    pub legacy_rows: usize,
    pub clinic_rows: usize,
    pub total: usize,
}

/// Read the legacy CSV and flip its target polarity to 1 = disease.
pub fn read_legacy(path: impl AsRef<Path>) -> anyhow::Result<Vec<HeartRecord>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open legacy dataset at {}", path.display()))?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let mut record: HeartRecord =
            result.with_context(|| format!("malformed row in {}", path.display()))?;
        record.target = 1 - record.target;
        rows.push(record);
    }
    Ok(rows)
}

/// Read the clinic CSV and normalize each row onto the canonical schema.
pub fn read_clinic(path: impl AsRef<Path>) -> anyhow::Result<Vec<HeartRecord>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open clinic dataset at {}", path.display()))?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let record: ClinicRecord =
            result.with_context(|| format!("malformed row in {}", path.display()))?;
        rows.push(record.into());
    }
    Ok(rows)
}

/// Merge both sources into one combined CSV in canonical form.
pub fn merge_datasets(
    legacy_path: impl AsRef<Path>,
    clinic_path: impl AsRef<Path>,
    out_path: impl AsRef<Path>,
) -> anyhow::Result<MergeSummary> {
    let legacy = read_legacy(legacy_path)?;
    let clinic = read_clinic(clinic_path)?;

    let out_path = out_path.as_ref();
    let mut writer = csv::Writer::from_path(out_path)
        .with_context(|| format!("failed to create {}", out_path.display()))?;

    for record in legacy.iter().chain(clinic.iter()) {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(MergeSummary {
        legacy_rows: legacy.len(),
        clinic_rows: clinic.len(),
        total: legacy.len() + clinic.len(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
