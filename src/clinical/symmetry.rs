//! Bilateral circumference symmetry

use chrono::NaiveDate;
use serde::Serialize;

use super::round_to;
use crate::models::{LimbPair, MeasurementHistory, Severity, SymmetryDeficit};

/// Absolute-cm cutoffs (warning, alert) for a limb pair
pub fn thresholds(pair: LimbPair) -> (f64, f64) {
    match pair {
        LimbPair::Arm => (1.0, 2.0),
        LimbPair::Thigh => (1.5, 3.0),
        LimbPair::Calf => (1.0, 2.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DominantSide {
    Right,
    Left,
    Balanced,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymmetryPair {
    pub pair: LimbPair,
    pub date: NaiveDate,
    pub right: f64,
    pub left: f64,
    /// Absolute difference in cm
    pub delta_cm: f64,
    /// Difference relative to the larger side, in percent
    pub relative_pct: f64,
    pub dominant: DominantSide,
    pub severity: Severity,
}

impl SymmetryPair {
    /// Deficit carried into the client profile; `None` when within range
    pub fn to_deficit(&self) -> Option<SymmetryDeficit> {
        (self.severity != Severity::Ok).then(|| SymmetryDeficit {
            pair: self.pair,
            delta_cm: self.delta_cm,
            severity: self.severity,
        })
    }
}

/// Classify one pair of right/left readings
pub fn compare(pair: LimbPair, date: NaiveDate, right: f64, left: f64) -> SymmetryPair {
    let delta_cm = round_to((right - left).abs(), 2);
    let larger = right.max(left);
    let relative_pct = if larger > 0.0 {
        round_to(delta_cm / larger * 100.0, 1)
    } else {
        0.0
    };
    let dominant = if delta_cm == 0.0 {
        DominantSide::Balanced
    } else if right > left {
        DominantSide::Right
    } else {
        DominantSide::Left
    };

    let (warning, alert) = thresholds(pair);
    let severity = if delta_cm >= alert {
        Severity::Alert
    } else if delta_cm >= warning {
        Severity::Warning
    } else {
        Severity::Ok
    };

    SymmetryPair {
        pair,
        date,
        right,
        left,
        delta_cm,
        relative_pct,
        dominant,
        severity,
    }
}

/// Compare each limb pair using the latest snapshot that records both sides
pub fn analyze_symmetry(history: &MeasurementHistory<'_>) -> Vec<SymmetryPair> {
    LimbPair::all()
        .iter()
        .filter_map(|pair| {
            let (right_id, left_id) = pair.metrics();
            let (date, right, left) = *history.paired(right_id, left_id).last()?;
            Some(compare(*pair, date, right, left))
        })
        .collect()
}
