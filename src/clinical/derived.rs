//! Metrics derived from the latest body measurements
//!
//! # Formulas
//!
//! - BMI = weight (kg) / height (m)²
//! - Fat mass = weight × body fat % / 100; lean body mass = weight − fat mass
//! - FFMI = LBM / height (m)²; height-normalized FFMI = FFMI + 6.1 × (1.8 − height)
//!   (Kouri et al., 1995)
//! - WHR = waist / hip
//! - Relative strength = 1RM / body weight

use serde::{Deserialize, Serialize};

use super::round_to;
use crate::models::{MeasurementHistory, MetricId};

/// A recorded one-repetition maximum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiftRecord {
    pub lift: String,
    /// Estimated or tested 1RM in kg
    pub one_rep_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelativeStrength {
    pub lift: String,
    pub one_rep_max: f64,
    /// 1RM divided by body weight
    pub ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub bmi: Option<f64>,
    pub fat_mass: Option<f64>,
    pub lean_body_mass: Option<f64>,
    pub ffmi: Option<f64>,
    pub ffmi_normalized: Option<f64>,
    pub whr: Option<f64>,
    pub relative_strength: Vec<RelativeStrength>,
}

impl DerivedMetrics {
    fn is_empty(&self) -> bool {
        self.bmi.is_none()
            && self.lean_body_mass.is_none()
            && self.whr.is_none()
            && self.relative_strength.is_empty()
    }
}

/// Derive metrics from the most recent value of each input metric
pub fn compute_derived(
    history: &MeasurementHistory<'_>,
    lifts: &[LiftRecord],
) -> Option<DerivedMetrics> {
    let latest = |metric| {
        history
            .latest(metric)
            .map(|(_, v)| v)
            .filter(|v: &f64| *v > 0.0)
    };

    let weight = latest(MetricId::Weight);
    let height_m = latest(MetricId::Height).map(|cm| cm / 100.0);
    let body_fat = history
        .latest(MetricId::BodyFat)
        .map(|(_, v)| v)
        .filter(|v| (0.0..100.0).contains(v));

    let bmi = weight.zip(height_m).map(|(w, h)| w / (h * h));
    let fat_mass = weight.zip(body_fat).map(|(w, bf)| w * bf / 100.0);
    let lean_body_mass = weight.zip(fat_mass).map(|(w, fm)| w - fm);
    let ffmi = lean_body_mass.zip(height_m).map(|(lbm, h)| lbm / (h * h));
    let ffmi_normalized = ffmi.zip(height_m).map(|(f, h)| f + 6.1 * (1.8 - h));
    let whr = latest(MetricId::Waist)
        .zip(latest(MetricId::Hip))
        .map(|(waist, hip)| waist / hip);

    let relative_strength = match weight {
        Some(w) => lifts
            .iter()
            .filter(|l| l.one_rep_max.is_finite() && l.one_rep_max > 0.0)
            .map(|l| RelativeStrength {
                lift: l.lift.clone(),
                one_rep_max: l.one_rep_max,
                ratio: round_to(l.one_rep_max / w, 2),
            })
            .collect(),
        None => Vec::new(),
    };

    let metrics = DerivedMetrics {
        bmi: bmi.map(|v| round_to(v, 1)),
        fat_mass: fat_mass.map(|v| round_to(v, 1)),
        lean_body_mass: lean_body_mass.map(|v| round_to(v, 1)),
        ffmi: ffmi.map(|v| round_to(v, 1)),
        ffmi_normalized: ffmi_normalized.map(|v| round_to(v, 1)),
        whr: whr.map(|v| round_to(v, 2)),
        relative_strength,
    };

    if metrics.is_empty() {
        None
    } else {
        Some(metrics)
    }
}
