//! Body-composition phase detection and goal projection

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::fmt;

use super::rate::weekly_rate;
use super::{round_to, ClinicalSettings};
use crate::models::{Goal, MeasurementHistory, MetricId};

/// Phase of a body-recomposition trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionPhase {
    /// Weight down, fat down
    Cutting,
    /// Weight up, fat flat
    LeanBulk,
    /// Weight flat, fat down
    Recomposition,
    /// Weight up, fat up
    Bulk,
    /// Lean mass lost without fat loss
    MuscleLoss,
    /// Weight up, fat down
    OptimalGrowth,
    /// Weight down, fat up
    Critical,
    /// No meaningful change
    Plateau,
}

impl CompositionPhase {
    pub fn label(&self) -> &'static str {
        match self {
            CompositionPhase::Cutting => "Definizione",
            CompositionPhase::LeanBulk => "Massa pulita",
            CompositionPhase::Recomposition => "Ricomposizione",
            CompositionPhase::Bulk => "Massa",
            CompositionPhase::MuscleLoss => "Perdita muscolare",
            CompositionPhase::OptimalGrowth => "Crescita ottimale",
            CompositionPhase::Critical => "Critico",
            CompositionPhase::Plateau => "Stallo",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CompositionPhase::Cutting => "Calo di peso sostenuto da perdita di massa grassa",
            CompositionPhase::LeanBulk => "Aumento di peso con massa grassa stabile",
            CompositionPhase::Recomposition => "Peso stabile con riduzione della massa grassa",
            CompositionPhase::Bulk => "Aumento sia del peso sia della massa grassa",
            CompositionPhase::MuscleLoss => {
                "Riduzione della massa magra, rivedere apporto proteico e carichi"
            }
            CompositionPhase::OptimalGrowth => "Aumento di peso con riduzione della massa grassa",
            CompositionPhase::Critical => {
                "Calo di peso con aumento della massa grassa, valutare con attenzione"
            }
            CompositionPhase::Plateau => "Nessuna variazione significativa",
        }
    }
}

impl fmt::Display for CompositionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trend {
    Down,
    Flat,
    Up,
}

impl Trend {
    fn of(rate: f64, dead_zone: f64) -> Self {
        if rate > dead_zone {
            Trend::Up
        } else if rate < -dead_zone {
            Trend::Down
        } else {
            Trend::Flat
        }
    }
}

/// Phase from the weekly weight rate (kg) and body-fat rate (% points)
pub fn classify_phase(weight_rate: f64, fat_rate: f64, dead_zone: f64) -> CompositionPhase {
    use CompositionPhase::*;

    match (Trend::of(weight_rate, dead_zone), Trend::of(fat_rate, dead_zone)) {
        (Trend::Down, Trend::Down) => Cutting,
        (Trend::Down, Trend::Flat) => MuscleLoss,
        (Trend::Down, Trend::Up) => Critical,
        (Trend::Flat, Trend::Down) => Recomposition,
        (Trend::Flat, Trend::Flat) => Plateau,
        (Trend::Flat, Trend::Up) => MuscleLoss,
        (Trend::Up, Trend::Down) => OptimalGrowth,
        (Trend::Up, Trend::Flat) => LeanBulk,
        (Trend::Up, Trend::Up) => Bulk,
    }
}

/// Split of the latest weight change into fat and lean mass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MassDecomposition {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub weight_delta: f64,
    pub fat_mass_delta: f64,
    pub lean_mass_delta: f64,
}

/// Weeks needed to reach the active weight goal at the current rate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProjection {
    pub current: f64,
    pub target: f64,
    pub weekly_rate: f64,
    pub weeks: f64,
    /// The projection hit the cap
    pub capped: bool,
    pub estimated_date: NaiveDate,
    pub deadline: Option<NaiveDate>,
    /// The goal will not be reached by its deadline at the current rate
    pub misses_deadline: bool,
}

impl GoalProjection {
    /// Check the projection against the goal's deadline
    pub fn against_deadline(mut self, deadline: Option<NaiveDate>) -> Self {
        self.deadline = deadline;
        self.misses_deadline =
            deadline.is_some_and(|d| self.capped || self.estimated_date > d);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionAnalysis {
    pub phase: Option<CompositionPhase>,
    pub weight_rate: Option<f64>,
    pub fat_rate: Option<f64>,
    pub decomposition: Option<MassDecomposition>,
    pub projection: Option<GoalProjection>,
}

/// Combine phase, decomposition and projection; `None` when none applies
pub fn analyze_composition(
    history: &MeasurementHistory<'_>,
    goals: &[Goal],
    settings: &ClinicalSettings,
) -> Option<CompositionAnalysis> {
    let weight_series = history.series(MetricId::Weight);
    let weight_rate = weekly_rate(&weight_series, settings).map(|(r, _, _)| r);
    let fat_rate = weekly_rate(&history.series(MetricId::BodyFat), settings).map(|(r, _, _)| r);

    let phase = weight_rate
        .zip(fat_rate)
        .map(|(w, f)| classify_phase(w, f, settings.dead_zone));
    let decomposition = decompose_latest(history);
    let projection = weight_rate.and_then(|rate| {
        let (date, current) = *weight_series.last()?;
        let goal = goals
            .iter()
            .find(|g| g.active && g.metric == MetricId::Weight)?;
        project_goal(current, goal.target, rate, date, settings)
            .map(|p| p.against_deadline(goal.deadline))
    });

    if phase.is_none() && decomposition.is_none() && projection.is_none() {
        return None;
    }

    Some(CompositionAnalysis {
        phase,
        weight_rate: weight_rate.map(|r| round_to(r, 2)),
        fat_rate: fat_rate.map(|r| round_to(r, 2)),
        decomposition,
        projection,
    })
}

/// Decompose the change between the last two snapshots carrying both weight
/// and body fat
pub fn decompose_latest(history: &MeasurementHistory<'_>) -> Option<MassDecomposition> {
    let paired = history.paired(MetricId::Weight, MetricId::BodyFat);
    let [.., (from, w0, bf0), (to, w1, bf1)] = paired.as_slice() else {
        return None;
    };

    let fat_mass = |w: f64, bf: f64| w * bf / 100.0;
    let fm0 = fat_mass(*w0, *bf0);
    let fm1 = fat_mass(*w1, *bf1);
    let fat_mass_delta = fm1 - fm0;
    let weight_delta = w1 - w0;

    Some(MassDecomposition {
        from: *from,
        to: *to,
        weight_delta: round_to(weight_delta, 2),
        fat_mass_delta: round_to(fat_mass_delta, 2),
        lean_mass_delta: round_to(weight_delta - fat_mass_delta, 2),
    })
}

/// Project weeks to a target weight
///
/// Only projects when the rate is above the minimum and moves toward the
/// target. Projections are capped at the configured maximum.
pub fn project_goal(
    current: f64,
    target: f64,
    weekly_rate: f64,
    as_of: NaiveDate,
    settings: &ClinicalSettings,
) -> Option<GoalProjection> {
    let gap = target - current;
    if gap.abs() < f64::EPSILON || weekly_rate.abs() <= settings.min_projection_rate {
        return None;
    }
    if gap.signum() != weekly_rate.signum() {
        return None;
    }

    let raw_weeks = gap / weekly_rate;
    let capped = raw_weeks > settings.max_projection_weeks;
    let weeks = raw_weeks.min(settings.max_projection_weeks);
    let estimated_date = as_of + Duration::days((weeks * 7.0).ceil() as i64);

    Some(GoalProjection {
        current,
        target,
        weekly_rate: round_to(weekly_rate, 2),
        weeks: round_to(weeks, 1),
        capped,
        estimated_date,
        deadline: None,
        misses_deadline: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Measurement;

    fn date(day_offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(day_offset)
    }

    #[test]
    fn test_phase_dead_zone() {
        assert_eq!(classify_phase(-0.05, -0.05, 0.1), CompositionPhase::Plateau);
        assert_eq!(classify_phase(-0.3, -0.3, 0.1), CompositionPhase::Cutting);
        assert_eq!(classify_phase(0.1, -0.1, 0.1), CompositionPhase::Plateau);
    }

    #[test]
    fn test_phase_table() {
        assert_eq!(classify_phase(0.3, 0.0, 0.1), CompositionPhase::LeanBulk);
        assert_eq!(classify_phase(0.0, -0.3, 0.1), CompositionPhase::Recomposition);
        assert_eq!(classify_phase(0.4, 0.3, 0.1), CompositionPhase::Bulk);
        assert_eq!(classify_phase(-0.4, 0.0, 0.1), CompositionPhase::MuscleLoss);
        assert_eq!(classify_phase(0.0, 0.3, 0.1), CompositionPhase::MuscleLoss);
        assert_eq!(classify_phase(0.3, -0.3, 0.1), CompositionPhase::OptimalGrowth);
        assert_eq!(classify_phase(-0.3, 0.3, 0.1), CompositionPhase::Critical);
    }

    #[test]
    fn test_decomposition() {
        let measurements = vec![
            Measurement::new(date(0)).with(MetricId::Weight, 100.0).with(MetricId::BodyFat, 30.0),
            Measurement::new(date(7)).with(MetricId::Weight, 99.0),
            Measurement::new(date(14)).with(MetricId::Weight, 98.0).with(MetricId::BodyFat, 29.0),
        ];
        let history = MeasurementHistory::new(&measurements);
        let d = decompose_latest(&history).unwrap();

        // FM 30.0 → 28.42
        assert_eq!(d.from, date(0));
        assert_eq!(d.to, date(14));
        assert_eq!(d.weight_delta, -2.0);
        assert_eq!(d.fat_mass_delta, -1.58);
        assert_eq!(d.lean_mass_delta, -0.42);
    }

    #[test]
    fn test_projection_rules() {
        let s = ClinicalSettings::default();
        let p = project_goal(90.0, 85.0, -0.5, date(0), &s).unwrap();
        assert_eq!(p.weeks, 10.0);
        assert!(!p.capped);
        assert_eq!(p.estimated_date, date(70));

        // Moving away from the target
        assert!(project_goal(90.0, 85.0, 0.5, date(0), &s).is_none());
        // Trivial rate
        assert!(project_goal(90.0, 85.0, -0.05, date(0), &s).is_none());
        // Already at target
        assert!(project_goal(85.0, 85.0, -0.5, date(0), &s).is_none());

        let p = project_goal(120.0, 70.0, -0.1, date(0), &s).unwrap();
        assert!(p.capped);
        assert_eq!(p.weeks, 104.0);
    }

    #[test]
    fn test_projection_deadline() {
        let s = ClinicalSettings::default();
        let on_track = project_goal(90.0, 85.0, -0.5, date(0), &s).unwrap();
        assert_eq!(on_track.deadline, None);
        assert!(!on_track.misses_deadline);

        // Reached on date(70)
        let p = on_track.clone().against_deadline(Some(date(70)));
        assert_eq!(p.deadline, Some(date(70)));
        assert!(!p.misses_deadline);
        assert!(on_track.clone().against_deadline(Some(date(69))).misses_deadline);

        let capped = project_goal(120.0, 70.0, -0.1, date(0), &s).unwrap();
        assert!(capped.against_deadline(Some(date(2000))).misses_deadline);
    }

    #[test]
    fn test_analysis_needs_some_input() {
        let measurements = vec![Measurement::new(date(0)).with(MetricId::Weight, 80.0)];
        let history = MeasurementHistory::new(&measurements);
        assert!(analyze_composition(&history, &[], &ClinicalSettings::default()).is_none());
    }

    #[test]
    fn test_analysis_with_goal() {
        let measurements: Vec<Measurement> = (0..5)
            .map(|i| {
                Measurement::new(date(i * 7))
                    .with(MetricId::Weight, 90.0 - 0.5 * i as f64)
                    .with(MetricId::BodyFat, 25.0 - 0.3 * i as f64)
            })
            .collect();
        let history = MeasurementHistory::new(&measurements);
        let goals = vec![Goal {
            metric: MetricId::Weight,
            target: 85.0,
            active: true,
            deadline: Some(date(56)),
        }];

        let a = analyze_composition(&history, &goals, &ClinicalSettings::default()).unwrap();
        assert_eq!(a.phase, Some(CompositionPhase::Cutting));
        assert_eq!(a.weight_rate, Some(-0.5));
        // 88 → 85 at 0.5 kg/week from date(28), due date(70)
        let projection = a.projection.unwrap();
        assert_eq!(projection.weeks, 6.0);
        assert_eq!(projection.deadline, Some(date(56)));
        assert!(projection.misses_deadline);
        assert!(a.decomposition.is_some());
    }
}
