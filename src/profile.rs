//! Client profile assembly
//!
//! A [`ClientProfile`] is the normalized view of a client that the scorer,
//! the plan generator and the clinical engine read. It is built fresh for
//! every call from the raw client record plus the already-derived inputs
//! (safety map, strength ratios, goals, symmetry deficits).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    ActivityLevel, FitnessLevel, Goal, Measurement, MeasurementHistory, MetricId, SafetyMap, Sex,
    StrengthRatio, SymmetryDeficit,
};

/// Raw client fields as stored by the surrounding application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub activity_level: Option<ActivityLevel>,
    /// Body weight in kg
    #[serde(default)]
    pub weight: Option<f64>,
    /// Height in cm
    #[serde(default)]
    pub height: Option<f64>,
    /// Body fat percentage
    #[serde(default)]
    pub body_fat: Option<f64>,
}

/// Normalized client profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub sex: Option<Sex>,
    pub age: Option<u32>,
    pub activity_level: Option<ActivityLevel>,
    #[serde(default)]
    pub safety: SafetyMap,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub body_fat: Option<f64>,
    #[serde(default)]
    pub strength_ratios: Vec<StrengthRatio>,
    /// Active goals only
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub symmetry_deficits: Vec<SymmetryDeficit>,
    pub fitness_level: FitnessLevel,
}

/// Builder for [`ClientProfile`]
#[derive(Debug, Clone)]
pub struct ClientProfileBuilder<'a> {
    record: ClientRecord,
    safety: SafetyMap,
    strength_ratios: Vec<StrengthRatio>,
    goals: Vec<Goal>,
    symmetry_deficits: Vec<SymmetryDeficit>,
    measurements: Option<&'a [Measurement]>,
}

impl<'a> ClientProfileBuilder<'a> {
    pub fn new(record: ClientRecord) -> Self {
        Self {
            record,
            safety: SafetyMap::new(),
            strength_ratios: Vec::new(),
            goals: Vec::new(),
            symmetry_deficits: Vec::new(),
            measurements: None,
        }
    }

    pub fn safety(mut self, safety: SafetyMap) -> Self {
        self.safety = safety;
        self
    }

    pub fn strength_ratios(mut self, ratios: Vec<StrengthRatio>) -> Self {
        self.strength_ratios = ratios;
        self
    }

    pub fn goals(mut self, goals: Vec<Goal>) -> Self {
        self.goals = goals;
        self
    }

    pub fn symmetry_deficits(mut self, deficits: Vec<SymmetryDeficit>) -> Self {
        self.symmetry_deficits = deficits;
        self
    }

    /// Measurement history used to fill body metrics the record lacks
    pub fn measurements(mut self, measurements: &'a [Measurement]) -> Self {
        self.measurements = Some(measurements);
        self
    }

    /// Assemble the profile with ages computed against `as_of`
    pub fn build(self, as_of: NaiveDate) -> ClientProfile {
        let history = self.measurements.map(MeasurementHistory::new);
        let latest = |metric: MetricId| {
            history
                .as_ref()
                .and_then(|h| h.latest(metric))
                .map(|(_, value)| value)
        };

        let weight = self.record.weight.or_else(|| latest(MetricId::Weight));
        let height = self.record.height.or_else(|| latest(MetricId::Height));
        let body_fat = self.record.body_fat.or_else(|| latest(MetricId::BodyFat));

        let age = self
            .record
            .birth_date
            .and_then(|birth| age_on(birth, as_of));
        let fitness_level = assess_fitness_level(&self.strength_ratios, self.record.activity_level);
        debug!(?fitness_level, ?age, "built client profile");

        ClientProfile {
            sex: self.record.sex,
            age,
            activity_level: self.record.activity_level,
            safety: self.safety,
            weight,
            height,
            body_fat,
            strength_ratios: self.strength_ratios,
            goals: self.goals.into_iter().filter(|g| g.active).collect(),
            symmetry_deficits: self.symmetry_deficits,
            fitness_level,
        }
    }
}

/// Full years between `birth` and `as_of`; `None` for a birth date in the future
pub fn age_on(birth: NaiveDate, as_of: NaiveDate) -> Option<u32> {
    if birth > as_of {
        return None;
    }
    let mut years = as_of.year() - birth.year();
    if (as_of.month(), as_of.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Infer the overall fitness level
///
/// Strength ratios take precedence: the best rating found decides the level.
/// Without ratios the self-reported activity level is mapped instead, and a
/// client with neither is a beginner.
pub fn assess_fitness_level(
    ratios: &[StrengthRatio],
    activity: Option<ActivityLevel>,
) -> FitnessLevel {
    if !ratios.is_empty() {
        return ratios
            .iter()
            .map(|r| r.rating)
            .max()
            .map(|rating| rating.as_level())
            .unwrap_or(FitnessLevel::Beginner);
    }

    match activity {
        Some(ActivityLevel::Sedentary) | Some(ActivityLevel::Light) => FitnessLevel::Beginner,
        Some(ActivityLevel::Moderate) => FitnessLevel::Intermediate,
        Some(ActivityLevel::Intense) => FitnessLevel::Advanced,
        None => FitnessLevel::Beginner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MovementPattern, StrengthRating};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ratio(rating: StrengthRating) -> StrengthRatio {
        StrengthRatio {
            lift: "squat".to_string(),
            pattern: MovementPattern::Squat,
            ratio: 1.2,
            rating,
        }
    }

    #[test]
    fn test_age_is_calendar_correct() {
        let birth = date(1990, 6, 15);
        assert_eq!(age_on(birth, date(2024, 6, 14)), Some(33));
        assert_eq!(age_on(birth, date(2024, 6, 15)), Some(34));
        assert_eq!(age_on(birth, date(2024, 12, 1)), Some(34));
        assert_eq!(age_on(birth, date(1989, 1, 1)), None);
    }

    #[test]
    fn test_leap_day_birthday() {
        let birth = date(2000, 2, 29);
        assert_eq!(age_on(birth, date(2023, 2, 28)), Some(22));
        assert_eq!(age_on(birth, date(2023, 3, 1)), Some(23));
    }

    #[test]
    fn test_fitness_level_from_ratios() {
        let ratios = vec![ratio(StrengthRating::Novice), ratio(StrengthRating::Elite)];
        assert_eq!(assess_fitness_level(&ratios, None), FitnessLevel::Advanced);

        let ratios = vec![ratio(StrengthRating::Intermediate), ratio(StrengthRating::Novice)];
        assert_eq!(
            assess_fitness_level(&ratios, Some(ActivityLevel::Intense)),
            FitnessLevel::Intermediate
        );

        let ratios = vec![ratio(StrengthRating::Untrained)];
        assert_eq!(
            assess_fitness_level(&ratios, Some(ActivityLevel::Intense)),
            FitnessLevel::Beginner
        );
    }

    #[test]
    fn test_fitness_level_from_activity() {
        assert_eq!(
            assess_fitness_level(&[], Some(ActivityLevel::Light)),
            FitnessLevel::Beginner
        );
        assert_eq!(
            assess_fitness_level(&[], Some(ActivityLevel::Moderate)),
            FitnessLevel::Intermediate
        );
        assert_eq!(
            assess_fitness_level(&[], Some(ActivityLevel::Intense)),
            FitnessLevel::Advanced
        );
        assert_eq!(assess_fitness_level(&[], None), FitnessLevel::Beginner);
    }

    #[test]
    fn test_builder_fills_metrics_from_history() {
        let measurements = vec![
            Measurement::new(date(2024, 1, 1)).with(MetricId::Weight, 84.0),
            Measurement::new(date(2024, 2, 1))
                .with(MetricId::Weight, 82.5)
                .with(MetricId::Height, 178.0),
        ];
        let record = ClientRecord {
            sex: Some(Sex::Male),
            birth_date: Some(date(1985, 3, 10)),
            body_fat: Some(18.0),
            ..Default::default()
        };
        let inactive = Goal {
            metric: MetricId::Weight,
            target: 78.0,
            active: false,
            deadline: None,
        };

        let profile = ClientProfileBuilder::new(record)
            .goals(vec![inactive])
            .measurements(&measurements)
            .build(date(2024, 3, 1));

        assert_eq!(profile.weight, Some(82.5));
        assert_eq!(profile.height, Some(178.0));
        assert_eq!(profile.body_fat, Some(18.0));
        assert_eq!(profile.age, Some(38));
        assert!(profile.goals.is_empty());
        assert_eq!(profile.fitness_level, FitnessLevel::Beginner);
    }

    #[test]
    fn test_empty_record() {
        let profile = ClientProfileBuilder::new(ClientRecord::default()).build(date(2024, 1, 1));
        assert!(profile.sex.is_none());
        assert!(profile.age.is_none());
        assert!(profile.weight.is_none());
        assert!(profile.symmetry_deficits.is_empty());
    }
}
