//! Rate-of-change assessment
//!
//! The weekly rate is the least-squares slope of the readings inside a
//! lookback window ending at the latest reading. Thresholds follow ACSM
//! guidance on safe weight change (0.5–1% of body weight per week) and common
//! clinical alerting ranges for blood pressure and resting heart rate.

use chrono::NaiveDate;
use serde::Serialize;
use statrs::statistics::Statistics;

use super::{round_to, ClinicalSettings};
use crate::models::{MeasurementHistory, MetricId, Severity};

/// Metrics with a rate assessment
pub const TRACKED_METRICS: [MetricId; 4] = [
    MetricId::Weight,
    MetricId::BodyFat,
    MetricId::SystolicBp,
    MetricId::RestingHeartRate,
];

/// Weekly-rate thresholds for one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateThresholds {
    pub warning: f64,
    pub alert: f64,
    /// Whether a decreasing value is the favorable direction
    pub lower_is_better: bool,
}

impl RateThresholds {
    pub fn for_metric(metric: MetricId) -> Option<Self> {
        let (warning, alert, lower_is_better) = match metric {
            MetricId::Weight => (1.0, 1.5, false),
            MetricId::BodyFat => (0.5, 1.0, true),
            MetricId::SystolicBp => (3.0, 5.0, true),
            MetricId::RestingHeartRate => (2.0, 4.0, true),
            _ => return None,
        };
        Some(RateThresholds {
            warning,
            alert,
            lower_is_better,
        })
    }

    /// Severity of a weekly rate
    ///
    /// A change in the favorable direction is at most a warning, and only
    /// once it reaches the alert threshold.
    pub fn classify(&self, weekly_rate: f64) -> Severity {
        let magnitude = weekly_rate.abs();
        let favorable = self.lower_is_better && weekly_rate < 0.0;

        if favorable {
            return if magnitude >= self.alert {
                Severity::Warning
            } else {
                Severity::Ok
            };
        }

        if magnitude >= self.alert {
            Severity::Alert
        } else if magnitude >= self.warning {
            Severity::Warning
        } else {
            Severity::Ok
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    fn from_rate(rate: f64) -> Self {
        if round_to(rate, 2) == 0.0 {
            TrendDirection::Stable
        } else if rate > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateAssessment {
    pub metric: MetricId,
    /// Change per week in the metric's unit
    pub weekly_rate: f64,
    /// Weekly change as a percentage of current body weight (weight only)
    pub percent_bodyweight: Option<f64>,
    pub direction: TrendDirection,
    /// `None` for metrics without a preferred direction
    pub favorable: Option<bool>,
    pub severity: Severity,
    pub samples: usize,
    pub span_days: i64,
    pub message: String,
}

/// Least-squares weekly slope over the lookback window
///
/// Returns `(rate, samples, span_days)`, or `None` with fewer than two
/// readings or a window shorter than the minimum span.
pub fn weekly_rate(
    points: &[(NaiveDate, f64)],
    settings: &ClinicalSettings,
) -> Option<(f64, usize, i64)> {
    let (last_date, _) = *points.last()?;
    let window: Vec<(NaiveDate, f64)> = points
        .iter()
        .copied()
        .filter(|(d, _)| (last_date - *d).num_days() <= i64::from(settings.lookback_days))
        .collect();

    let first_date = window.first()?.0;
    let span_days = (last_date - first_date).num_days();
    if window.len() < 2 || span_days < i64::from(settings.min_span_days) {
        return None;
    }

    let xs: Vec<f64> = window
        .iter()
        .map(|(d, _)| (*d - first_date).num_days() as f64)
        .collect();
    let ys: Vec<f64> = window.iter().map(|(_, v)| *v).collect();

    let variance = xs.iter().variance();
    if !(variance > 0.0) {
        return None;
    }
    let slope_per_day = xs.iter().covariance(ys.iter()) / variance;
    let rate = slope_per_day * 7.0;

    rate.is_finite().then_some((rate, window.len(), span_days))
}

/// Assess one tracked metric
pub fn assess_rate(
    history: &MeasurementHistory<'_>,
    metric: MetricId,
    settings: &ClinicalSettings,
) -> Option<RateAssessment> {
    let thresholds = RateThresholds::for_metric(metric)?;
    let series = history.series(metric);
    let (rate, samples, span_days) = weekly_rate(&series, settings)?;

    let percent_bodyweight = match metric {
        MetricId::Weight => series
            .last()
            .filter(|(_, w)| *w > 0.0)
            .map(|(_, w)| round_to(rate / w * 100.0, 2)),
        _ => None,
    };
    let favorable = thresholds.lower_is_better.then_some(rate < 0.0);
    let severity = thresholds.classify(rate);
    let direction = TrendDirection::from_rate(rate);

    let message = rate_message(metric, rate, direction, percent_bodyweight, severity);

    Some(RateAssessment {
        metric,
        weekly_rate: round_to(rate, 2),
        percent_bodyweight,
        direction,
        favorable,
        severity,
        samples,
        span_days,
        message,
    })
}

/// Assess every tracked metric that has enough data
pub fn assess_rates(
    history: &MeasurementHistory<'_>,
    settings: &ClinicalSettings,
) -> Vec<RateAssessment> {
    TRACKED_METRICS
        .iter()
        .filter_map(|metric| assess_rate(history, *metric, settings))
        .collect()
}

fn rate_message(
    metric: MetricId,
    rate: f64,
    direction: TrendDirection,
    percent_bodyweight: Option<f64>,
    severity: Severity,
) -> String {
    let trend = match direction {
        TrendDirection::Increasing => "in aumento",
        TrendDirection::Decreasing => "in calo",
        TrendDirection::Stable => "stabile",
    };
    let mut message = format!(
        "{} {}: {:+.2} {}/settimana",
        capitalize(metric.label()),
        trend,
        rate,
        metric.unit()
    );
    if let Some(pct) = percent_bodyweight {
        message.push_str(&format!(" ({:+.2}% del peso corporeo)", pct));
    }
    match severity {
        Severity::Ok => {}
        Severity::Warning => message.push_str(". Variazione rapida, monitorare"),
        Severity::Alert => message.push_str(". Variazione eccessiva, rivedere il programma"),
    }
    message
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Measurement;

    fn date(day_offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(day_offset)
    }

    fn weights(points: &[(i64, f64)]) -> Vec<Measurement> {
        points
            .iter()
            .map(|(d, w)| Measurement::new(date(*d)).with(MetricId::Weight, *w))
            .collect()
    }

    #[test]
    fn test_linear_slope() {
        let series = vec![(date(0), 80.0), (date(7), 79.5), (date(14), 79.0)];
        let (rate, n, span) = weekly_rate(&series, &ClinicalSettings::default()).unwrap();
        assert!((rate + 0.5).abs() < 1e-9);
        assert_eq!(n, 3);
        assert_eq!(span, 14);
    }

    #[test]
    fn test_requires_two_points_and_min_span() {
        let settings = ClinicalSettings::default();
        assert!(weekly_rate(&[(date(0), 80.0)], &settings).is_none());
        assert!(weekly_rate(&[(date(0), 80.0), (date(6), 79.0)], &settings).is_none());
        assert!(weekly_rate(&[(date(0), 80.0), (date(7), 79.0)], &settings).is_some());
        assert!(weekly_rate(&[], &settings).is_none());
    }

    #[test]
    fn test_lookback_window_excludes_old_points() {
        let settings = ClinicalSettings::default();
        // The day-0 spike is outside the 56-day window ending at day 70
        let series = vec![(date(0), 100.0), (date(56), 80.0), (date(63), 80.0), (date(70), 80.0)];
        let (rate, n, _) = weekly_rate(&series, &settings).unwrap();
        assert_eq!(n, 3);
        assert!(rate.abs() < 1e-9);
    }

    #[test]
    fn test_weight_rate_severity_and_percent() {
        let measurements = weights(&[(0, 90.0), (7, 88.4), (14, 86.8)]);
        let history = MeasurementHistory::new(&measurements);
        let a = assess_rate(&history, MetricId::Weight, &ClinicalSettings::default()).unwrap();

        assert_eq!(a.weekly_rate, -1.6);
        assert_eq!(a.severity, Severity::Alert);
        assert_eq!(a.direction, TrendDirection::Decreasing);
        assert_eq!(a.favorable, None);
        assert_eq!(a.percent_bodyweight, Some(-1.84));
    }

    #[test]
    fn test_lower_is_better_direction() {
        let t = RateThresholds::for_metric(MetricId::BodyFat).unwrap();
        assert_eq!(t.classify(-0.7), Severity::Ok);
        assert_eq!(t.classify(-1.2), Severity::Warning);
        assert_eq!(t.classify(0.7), Severity::Warning);
        assert_eq!(t.classify(1.2), Severity::Alert);

        let t = RateThresholds::for_metric(MetricId::Weight).unwrap();
        assert_eq!(t.classify(-1.2), Severity::Warning);
        assert_eq!(t.classify(1.2), Severity::Warning);
        assert_eq!(t.classify(0.4), Severity::Ok);
    }

    #[test]
    fn test_untracked_metric() {
        let measurements = vec![
            Measurement::new(date(0)).with(MetricId::Waist, 90.0),
            Measurement::new(date(14)).with(MetricId::Waist, 88.0),
        ];
        let history = MeasurementHistory::new(&measurements);
        assert!(assess_rate(&history, MetricId::Waist, &ClinicalSettings::default()).is_none());
        assert!(assess_rates(&history, &ClinicalSettings::default()).is_empty());
    }

    #[test]
    fn test_message_mentions_bodyweight() {
        let measurements = weights(&[(0, 80.0), (14, 79.0)]);
        let history = MeasurementHistory::new(&measurements);
        let a = assess_rate(&history, MetricId::Weight, &ClinicalSettings::default()).unwrap();
        assert!(a.message.starts_with("Peso in calo"));
        assert!(a.message.contains("del peso corporeo"));
    }
}
