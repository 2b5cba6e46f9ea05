//! Composite metabolic and cardiovascular risk profile

use serde::Serialize;

use super::derived::DerivedMetrics;
use crate::models::{MeasurementHistory, MetricId, Severity, Sex};
use crate::normative::{NormativeClassifier, NormativeMetric};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFactor {
    pub metric: NormativeMetric,
    pub value: f64,
    pub label: &'static str,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskProfile {
    /// BMI, WHR, body fat
    pub metabolic: Vec<RiskFactor>,
    /// Blood pressure, resting heart rate
    pub cardiovascular: Vec<RiskFactor>,
    /// Worst individual factor
    pub composite: Severity,
    /// Present only when some factor is in the alert range
    pub referral: Option<String>,
}

impl RiskProfile {
    pub fn factors(&self) -> impl Iterator<Item = &RiskFactor> {
        self.metabolic.iter().chain(self.cardiovascular.iter())
    }
}

/// Classify every available marker; `None` when nothing can be classified
pub fn assess_risk(
    derived: Option<&DerivedMetrics>,
    history: &MeasurementHistory<'_>,
    sex: Option<Sex>,
    age: Option<u32>,
    classifier: &NormativeClassifier<'_>,
) -> Option<RiskProfile> {
    let latest = |metric| history.latest(metric).map(|(_, v)| v);
    let classify = |metric: NormativeMetric, value: Option<f64>| {
        value
            .and_then(|v| classifier.classify(metric, v, sex, age))
            .map(|c| RiskFactor {
                metric,
                value: c.value,
                label: c.label,
                severity: c.severity,
            })
    };

    let metabolic: Vec<RiskFactor> = [
        classify(NormativeMetric::Bmi, derived.and_then(|d| d.bmi)),
        classify(NormativeMetric::Whr, derived.and_then(|d| d.whr)),
        classify(NormativeMetric::BodyFat, latest(MetricId::BodyFat)),
    ]
    .into_iter()
    .flatten()
    .collect();

    let cardiovascular: Vec<RiskFactor> = [
        classify(NormativeMetric::SystolicBp, latest(MetricId::SystolicBp)),
        classify(NormativeMetric::DiastolicBp, latest(MetricId::DiastolicBp)),
        classify(NormativeMetric::RestingHeartRate, latest(MetricId::RestingHeartRate)),
    ]
    .into_iter()
    .flatten()
    .collect();

    let composite = metabolic
        .iter()
        .chain(cardiovascular.iter())
        .map(|f| f.severity)
        .max()?;

    let alerts: Vec<String> = metabolic
        .iter()
        .chain(cardiovascular.iter())
        .filter(|f| f.severity == Severity::Alert)
        .map(|f| format!("{} ({})", f.metric.label(), f.label))
        .collect();
    let referral = (!alerts.is_empty()).then(|| {
        format!(
            "Si consiglia una valutazione medica prima di proseguire: {}",
            alerts.join(", ")
        )
    });

    Some(RiskProfile {
        metabolic,
        cardiovascular,
        composite,
        referral,
    })
}
