//! Pairwise metric correlations
//!
//! Pairs readings of two metrics taken in the same snapshot and reports the
//! Pearson correlation with an interpretation for the trainer. Strength bands
//! follow the conventional |r| ≥ 0.7 strong, ≥ 0.4 moderate split.

use serde::Serialize;
use statrs::statistics::Statistics;
use tracing::debug;

use crate::clinical::ClinicalSettings;
use crate::models::{Measurement, MeasurementHistory, MetricId};

/// Metric pairs analyzed by default
pub const CORRELATED_PAIRS: [(MetricId, MetricId); 3] = [
    (MetricId::Weight, MetricId::BodyFat),
    (MetricId::Waist, MetricId::Hip),
    (MetricId::SystolicBp, MetricId::DiastolicBp),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

impl CorrelationStrength {
    pub fn from_r(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude >= 0.7 {
            CorrelationStrength::Strong
        } else if magnitude >= 0.4 {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CorrelationStrength::Strong => "forte",
            CorrelationStrength::Moderate => "moderata",
            CorrelationStrength::Weak => "debole",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationInsight {
    pub first: MetricId,
    pub second: MetricId,
    pub r: f64,
    pub samples: usize,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
    pub message: String,
}

/// Pearson correlation coefficient; `None` when either series is constant
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let sx = xs.iter().std_dev();
    let sy = ys.iter().std_dev();
    if !(sx > 0.0 && sy > 0.0) {
        return None;
    }
    let r = xs.iter().covariance(ys.iter()) / (sx * sy);
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Correlate one metric pair
pub fn correlate(
    history: &MeasurementHistory<'_>,
    first: MetricId,
    second: MetricId,
    min_samples: usize,
) -> Option<CorrelationInsight> {
    let paired = history.paired(first, second);
    if paired.len() < min_samples {
        debug!(?first, ?second, samples = paired.len(), "not enough paired samples");
        return None;
    }

    let xs: Vec<f64> = paired.iter().map(|(_, x, _)| *x).collect();
    let ys: Vec<f64> = paired.iter().map(|(_, _, y)| *y).collect();
    let r = pearson(&xs, &ys)?;

    let strength = CorrelationStrength::from_r(r);
    let direction = if r >= 0.0 {
        CorrelationDirection::Positive
    } else {
        CorrelationDirection::Negative
    };

    Some(CorrelationInsight {
        first,
        second,
        r: (r * 100.0).round() / 100.0,
        samples: paired.len(),
        strength,
        direction,
        message: insight_message(first, second, strength, direction),
    })
}

/// Correlate every default pair with enough data
pub fn analyze_correlations(
    measurements: &[Measurement],
    settings: &ClinicalSettings,
) -> Vec<CorrelationInsight> {
    let history = MeasurementHistory::new(measurements);
    CORRELATED_PAIRS
        .iter()
        .filter_map(|(a, b)| correlate(&history, *a, *b, settings.min_correlation_samples))
        .collect()
}

fn insight_message(
    first: MetricId,
    second: MetricId,
    strength: CorrelationStrength,
    direction: CorrelationDirection,
) -> String {
    use CorrelationDirection::*;
    use CorrelationStrength::*;

    let specific = match (first, second, strength, direction) {
        (MetricId::Weight, MetricId::BodyFat, Weak, _) => {
            "le variazioni di peso non seguono la massa grassa: possibile ricomposizione corporea"
        }
        (MetricId::Weight, MetricId::BodyFat, _, Positive) => {
            "peso e massa grassa si muovono insieme: \
             le variazioni di peso riguardano soprattutto il grasso"
        }
        (MetricId::Weight, MetricId::BodyFat, _, Negative) => {
            "il peso sale mentre la massa grassa scende: indicativo di guadagno di massa magra"
        }
        (MetricId::Waist, MetricId::Hip, Weak, _) => {
            "vita e fianchi variano in modo indipendente: controllare la distribuzione del grasso"
        }
        (MetricId::Waist, MetricId::Hip, _, Positive) => {
            "vita e fianchi variano insieme: distribuzione del grasso uniforme"
        }
        (MetricId::Waist, MetricId::Hip, _, Negative) => {
            "vita e fianchi divergono: monitorare il rapporto vita-fianchi"
        }
        (MetricId::SystolicBp, MetricId::DiastolicBp, Weak, _) => {
            "sistolica e diastolica poco correlate: verificare le condizioni di misurazione"
        }
        (MetricId::SystolicBp, MetricId::DiastolicBp, _, Positive) => {
            "sistolica e diastolica coerenti: andamento pressorio affidabile"
        }
        (MetricId::SystolicBp, MetricId::DiastolicBp, _, Negative) => {
            "pressione differenziale in aumento: segnalare al medico se persistente"
        }
        _ => "",
    };

    let dir = match direction {
        Positive => "positiva",
        Negative => "negativa",
    };
    let base = format!(
        "Correlazione {} {} tra {} e {}",
        strength.label(),
        dir,
        first.label(),
        second.label()
    );
    if specific.is_empty() {
        base
    } else {
        format!("{}: {}", base, specific)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(pairs: &[(f64, f64)], a: MetricId, b: MetricId) -> Vec<Measurement> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, (x, y))| {
                Measurement::new(NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).unwrap())
                    .with(a, *x)
                    .with(b, *y)
            })
            .collect()
    }

    #[test]
    fn test_pearson_known_values() {
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[8.0, 6.0, 4.0, 2.0]).unwrap();
        assert!((r + 1.0).abs() < 1e-9);
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_strength_bands() {
        assert_eq!(CorrelationStrength::from_r(0.7), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::from_r(-0.45), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::from_r(0.39), CorrelationStrength::Weak);
    }

    #[test]
    fn test_minimum_samples() {
        let data = series(
            &[(80.0, 20.0), (79.0, 19.5), (78.0, 19.0)],
            MetricId::Weight,
            MetricId::BodyFat,
        );
        let insights = analyze_correlations(&data, &ClinicalSettings::default());
        assert!(insights.is_empty());
    }

    #[test]
    fn test_weight_body_fat_insight() {
        let data = series(
            &[(80.0, 20.0), (79.0, 19.5), (78.5, 19.3), (77.0, 18.4)],
            MetricId::Weight,
            MetricId::BodyFat,
        );
        let insights = analyze_correlations(&data, &ClinicalSettings::default());

        assert_eq!(insights.len(), 1);
        let i = &insights[0];
        assert_eq!(i.strength, CorrelationStrength::Strong);
        assert_eq!(i.direction, CorrelationDirection::Positive);
        assert_eq!(i.samples, 4);
        assert!(i.message.contains("soprattutto il grasso"));
    }

    #[test]
    fn test_blood_pressure_pair() {
        let data = series(
            &[(120.0, 80.0), (130.0, 84.0), (125.0, 83.0), (140.0, 90.0), (118.0, 78.0)],
            MetricId::SystolicBp,
            MetricId::DiastolicBp,
        );
        let history = MeasurementHistory::new(&data);
        let i = correlate(&history, MetricId::SystolicBp, MetricId::DiastolicBp, 4).unwrap();
        assert!(i.r > 0.9);
        assert!(i.message.starts_with("Correlazione forte positiva"));
    }
}
