//! Normative band classification
//!
//! Static reference tables mapping a physiological value onto a labelled band
//! with a severity. Tables are keyed by metric, optional sex and an age
//! bracket; each table lists contiguous, non-overlapping bands authored at the
//! table's decimal precision.
//!
//! # References
//!
//! - BMI: WHO classification of adult weight status
//! - Body fat %: Gallagher et al. (2000), Am J Clin Nutr 72:694-701
//! - Blood pressure: ACC/AHA 2017 guideline, with an added hypotension band
//! - WHR: WHO Expert Consultation (2008) on waist circumference and waist-hip ratio
//!
//! The classifier never validates the tables at runtime; contiguity is a
//! property of the data and is checked by the unit tests below.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoachError;
use crate::models::{Severity, Sex};
use Severity::{Alert, Ok as Fine, Warning};

/// Age used when the client's age is unknown
pub const DEFAULT_AGE: u32 = 30;

/// Metrics with a normative table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormativeMetric {
    Bmi,
    BodyFat,
    RestingHeartRate,
    SystolicBp,
    DiastolicBp,
    Whr,
}

impl NormativeMetric {
    pub fn label(&self) -> &'static str {
        match self {
            NormativeMetric::Bmi => "BMI",
            NormativeMetric::BodyFat => "massa grassa",
            NormativeMetric::RestingHeartRate => "FC a riposo",
            NormativeMetric::SystolicBp => "pressione sistolica",
            NormativeMetric::DiastolicBp => "pressione diastolica",
            NormativeMetric::Whr => "rapporto vita-fianchi",
        }
    }
}

impl fmt::Display for NormativeMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for NormativeMetric {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "bmi" => Ok(NormativeMetric::Bmi),
            "body_fat" | "bodyfat" | "massa_grassa" => Ok(NormativeMetric::BodyFat),
            "resting_heart_rate" | "resting_hr" | "hr" => Ok(NormativeMetric::RestingHeartRate),
            "systolic_bp" | "systolic" | "sistolica" => Ok(NormativeMetric::SystolicBp),
            "diastolic_bp" | "diastolic" | "diastolica" => Ok(NormativeMetric::DiastolicBp),
            "whr" | "waist_hip" => Ok(NormativeMetric::Whr),
            _ => Err(CoachError::parse("normative metric", s)),
        }
    }
}

/// One labelled band; `None` bounds are open-ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub label: &'static str,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub severity: Severity,
}

impl Band {
    const fn new(
        label: &'static str,
        min: Option<f64>,
        max: Option<f64>,
        severity: Severity,
    ) -> Self {
        Band {
            label,
            min,
            max,
            severity,
        }
    }

    /// Inclusive containment on both bounds
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Band table for one metric, sex and age bracket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormativeTable {
    pub metric: NormativeMetric,
    /// `None` marks the universal table
    pub sex: Option<Sex>,
    /// Inclusive age bracket
    pub age: (u32, u32),
    /// Decimal places the bands are authored at
    pub precision: u32,
    pub bands: &'static [Band],
}

impl NormativeTable {
    fn covers_age(&self, age: u32) -> bool {
        age >= self.age.0 && age <= self.age.1
    }

    /// Round a raw value to the precision the bands were authored at
    pub fn round(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.precision as i32);
        (value * factor).round() / factor
    }

    /// First band in table order containing the rounded value
    pub fn band_for(&self, value: f64) -> Option<&'static Band> {
        let rounded = self.round(value);
        self.bands.iter().find(|band| band.contains(rounded))
    }
}

/// Result of a successful classification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub metric: NormativeMetric,
    pub value: f64,
    pub label: &'static str,
    pub severity: Severity,
}

const ADULT: (u32, u32) = (0, u32::MAX);
const YOUNG: (u32, u32) = (0, 39);
const MIDDLE: (u32, u32) = (40, 59);
const OLDER: (u32, u32) = (60, u32::MAX);

static BMI_BANDS: [Band; 6] = [
    Band::new("Sottopeso", None, Some(18.4), Warning),
    Band::new("Normopeso", Some(18.5), Some(24.9), Fine),
    Band::new("Sovrappeso", Some(25.0), Some(29.9), Warning),
    Band::new("Obesità I", Some(30.0), Some(34.9), Alert),
    Band::new("Obesità II", Some(35.0), Some(39.9), Alert),
    Band::new("Obesità III", Some(40.0), None, Alert),
];

static RESTING_HR_BANDS: [Band; 5] = [
    Band::new("Bradicardia", None, Some(39.0), Warning),
    Band::new("Atletico", Some(40.0), Some(59.0), Fine),
    Band::new("Normale", Some(60.0), Some(80.0), Fine),
    Band::new("Elevata", Some(81.0), Some(100.0), Warning),
    Band::new("Tachicardia", Some(101.0), None, Alert),
];

static SYSTOLIC_BANDS: [Band; 6] = [
    Band::new("Ipotensione", None, Some(89.0), Warning),
    Band::new("Normale", Some(90.0), Some(119.0), Fine),
    Band::new("Elevata", Some(120.0), Some(129.0), Warning),
    Band::new("Ipertensione stadio 1", Some(130.0), Some(139.0), Warning),
    Band::new("Ipertensione stadio 2", Some(140.0), Some(179.0), Alert),
    Band::new("Crisi ipertensiva", Some(180.0), None, Alert),
];

static DIASTOLIC_BANDS: [Band; 5] = [
    Band::new("Ipotensione", None, Some(59.0), Warning),
    Band::new("Normale", Some(60.0), Some(79.0), Fine),
    Band::new("Ipertensione stadio 1", Some(80.0), Some(89.0), Warning),
    Band::new("Ipertensione stadio 2", Some(90.0), Some(119.0), Alert),
    Band::new("Crisi ipertensiva", Some(120.0), None, Alert),
];

static WHR_MALE_BANDS: [Band; 3] = [
    Band::new("Rischio basso", None, Some(0.90), Fine),
    Band::new("Rischio moderato", Some(0.91), Some(0.99), Warning),
    Band::new("Rischio elevato", Some(1.00), None, Alert),
];

static WHR_FEMALE_BANDS: [Band; 3] = [
    Band::new("Rischio basso", None, Some(0.80), Fine),
    Band::new("Rischio moderato", Some(0.81), Some(0.85), Warning),
    Band::new("Rischio elevato", Some(0.86), None, Alert),
];

/// Gallagher body-fat bands for one sex and age bracket
macro_rules! body_fat_bands {
    ($low_max:expr, $normal:expr, $normal_max:expr, $high:expr, $high_max:expr, $obese:expr) => {
        [
            Band::new("Basso", None, Some($low_max), Warning),
            Band::new("Normale", Some($normal), Some($normal_max), Fine),
            Band::new("Elevato", Some($high), Some($high_max), Warning),
            Band::new("Obesità", Some($obese), None, Alert),
        ]
    };
}

static BF_MALE_YOUNG: [Band; 4] = body_fat_bands!(7.9, 8.0, 19.9, 20.0, 24.9, 25.0);
static BF_MALE_MIDDLE: [Band; 4] = body_fat_bands!(10.9, 11.0, 21.9, 22.0, 27.9, 28.0);
static BF_MALE_OLDER: [Band; 4] = body_fat_bands!(12.9, 13.0, 24.9, 25.0, 29.9, 30.0);
static BF_FEMALE_YOUNG: [Band; 4] = body_fat_bands!(20.9, 21.0, 32.9, 33.0, 38.9, 39.0);
static BF_FEMALE_MIDDLE: [Band; 4] = body_fat_bands!(22.9, 23.0, 33.9, 34.0, 39.9, 40.0);
static BF_FEMALE_OLDER: [Band; 4] = body_fat_bands!(23.9, 24.0, 35.9, 36.0, 41.9, 42.0);

const fn table(
    metric: NormativeMetric,
    sex: Option<Sex>,
    age: (u32, u32),
    precision: u32,
    bands: &'static [Band],
) -> NormativeTable {
    NormativeTable {
        metric,
        sex,
        age,
        precision,
        bands,
    }
}

/// Built-in reference tables
pub static STANDARD_TABLES: [NormativeTable; 13] = [
    table(NormativeMetric::Bmi, None, ADULT, 1, &BMI_BANDS),
    table(NormativeMetric::BodyFat, Some(Sex::Male), YOUNG, 1, &BF_MALE_YOUNG),
    table(NormativeMetric::BodyFat, Some(Sex::Male), MIDDLE, 1, &BF_MALE_MIDDLE),
    table(NormativeMetric::BodyFat, Some(Sex::Male), OLDER, 1, &BF_MALE_OLDER),
    table(NormativeMetric::BodyFat, Some(Sex::Female), YOUNG, 1, &BF_FEMALE_YOUNG),
    table(NormativeMetric::BodyFat, Some(Sex::Female), MIDDLE, 1, &BF_FEMALE_MIDDLE),
    table(NormativeMetric::BodyFat, Some(Sex::Female), OLDER, 1, &BF_FEMALE_OLDER),
    table(NormativeMetric::RestingHeartRate, None, ADULT, 0, &RESTING_HR_BANDS),
    table(NormativeMetric::SystolicBp, None, ADULT, 0, &SYSTOLIC_BANDS),
    table(NormativeMetric::DiastolicBp, None, ADULT, 0, &DIASTOLIC_BANDS),
    table(NormativeMetric::Whr, Some(Sex::Male), ADULT, 2, &WHR_MALE_BANDS),
    table(NormativeMetric::Whr, Some(Sex::Female), ADULT, 2, &WHR_FEMALE_BANDS),
    table(NormativeMetric::Whr, None, ADULT, 2, &WHR_MALE_BANDS),
];

/// Band classifier over a set of reference tables
#[derive(Debug, Clone, Copy)]
pub struct NormativeClassifier<'a> {
    tables: &'a [NormativeTable],
}

impl Default for NormativeClassifier<'static> {
    fn default() -> Self {
        Self::standard()
    }
}

impl NormativeClassifier<'static> {
    /// Classifier over the built-in tables
    pub fn standard() -> Self {
        Self::with_tables(&STANDARD_TABLES)
    }
}

impl<'a> NormativeClassifier<'a> {
    /// Classifier over caller-supplied tables
    pub fn with_tables(tables: &'a [NormativeTable]) -> Self {
        NormativeClassifier { tables }
    }

    /// Select the table for a metric: sex-specific for the age bracket first,
    /// then the universal table.
    pub fn table_for(
        &self,
        metric: NormativeMetric,
        sex: Option<Sex>,
        age: Option<u32>,
    ) -> Option<&'a NormativeTable> {
        let age = age.unwrap_or(DEFAULT_AGE);
        let candidates = || {
            self.tables
                .iter()
                .filter(move |t| t.metric == metric && t.covers_age(age))
        };

        sex.and_then(|sex| candidates().find(|t| t.sex == Some(sex)))
            .or_else(|| candidates().find(|t| t.sex.is_none()))
    }

    /// Classify a value; `None` when no table applies or the value is not finite
    pub fn classify(
        &self,
        metric: NormativeMetric,
        value: f64,
        sex: Option<Sex>,
        age: Option<u32>,
    ) -> Option<Classification> {
        if !value.is_finite() {
            return None;
        }
        let table = self.table_for(metric, sex, age)?;
        let band = table.band_for(value)?;
        Some(Classification {
            metric,
            value,
            label: band.label,
            severity: band.severity,
        })
    }
}

/// Classify against the built-in tables
pub fn classify(
    metric: NormativeMetric,
    value: f64,
    sex: Option<Sex>,
    age: Option<u32>,
) -> Option<Classification> {
    NormativeClassifier::standard().classify(metric, value, sex, age)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(
        metric: NormativeMetric,
        value: f64,
        sex: Option<Sex>,
        age: Option<u32>,
    ) -> &'static str {
        classify(metric, value, sex, age).map(|c| c.label).unwrap_or("-")
    }

    #[test]
    fn test_bmi_boundaries() {
        assert_eq!(label(NormativeMetric::Bmi, 18.4, None, None), "Sottopeso");
        assert_eq!(label(NormativeMetric::Bmi, 18.5, None, None), "Normopeso");
        assert_eq!(label(NormativeMetric::Bmi, 24.9, None, None), "Normopeso");
        assert_eq!(label(NormativeMetric::Bmi, 25.0, None, None), "Sovrappeso");
        assert_eq!(label(NormativeMetric::Bmi, 24.94, None, None), "Normopeso");
        assert_eq!(label(NormativeMetric::Bmi, 42.0, None, None), "Obesità III");
    }

    #[test]
    fn test_bmi_severity() {
        let c = classify(NormativeMetric::Bmi, 31.2, None, None).unwrap();
        assert_eq!(c.severity, Severity::Alert);
        assert_eq!(c.value, 31.2);
    }

    #[test]
    fn test_body_fat_sex_and_age_brackets() {
        assert_eq!(label(NormativeMetric::BodyFat, 21.0, Some(Sex::Male), Some(25)), "Elevato");
        assert_eq!(label(NormativeMetric::BodyFat, 21.0, Some(Sex::Male), Some(45)), "Normale");
        assert_eq!(label(NormativeMetric::BodyFat, 21.0, Some(Sex::Female), Some(25)), "Normale");
        assert_eq!(label(NormativeMetric::BodyFat, 20.9, Some(Sex::Female), Some(25)), "Basso");
        assert_eq!(label(NormativeMetric::BodyFat, 30.0, Some(Sex::Male), Some(70)), "Obesità");
    }

    #[test]
    fn test_body_fat_without_sex_is_unclassified() {
        assert!(classify(NormativeMetric::BodyFat, 20.0, None, Some(30)).is_none());
    }

    #[test]
    fn test_default_age_is_thirty() {
        // 20.0 is "Elevato" for men under 40 but "Normale" between 40 and 59
        assert_eq!(label(NormativeMetric::BodyFat, 20.0, Some(Sex::Male), None), "Elevato");
    }

    #[test]
    fn test_blood_pressure_and_heart_rate() {
        assert_eq!(label(NormativeMetric::SystolicBp, 119.0, None, None), "Normale");
        assert_eq!(label(NormativeMetric::SystolicBp, 135.0, None, None), "Ipertensione stadio 1");
        assert_eq!(label(NormativeMetric::DiastolicBp, 95.0, None, None), "Ipertensione stadio 2");
        assert_eq!(label(NormativeMetric::DiastolicBp, 55.0, None, None), "Ipotensione");
        assert_eq!(label(NormativeMetric::RestingHeartRate, 52.0, None, None), "Atletico");
        assert_eq!(label(NormativeMetric::RestingHeartRate, 100.4, None, None), "Elevata");
        assert_eq!(label(NormativeMetric::RestingHeartRate, 104.0, None, None), "Tachicardia");
    }

    #[test]
    fn test_whr_sex_fallback() {
        assert_eq!(label(NormativeMetric::Whr, 0.84, Some(Sex::Female), None), "Rischio moderato");
        assert_eq!(label(NormativeMetric::Whr, 0.84, Some(Sex::Male), None), "Rischio basso");
        assert_eq!(label(NormativeMetric::Whr, 0.95, None, None), "Rischio moderato");
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("BMI".parse::<NormativeMetric>().unwrap(), NormativeMetric::Bmi);
        assert_eq!("body-fat".parse::<NormativeMetric>().unwrap(), NormativeMetric::BodyFat);
        assert_eq!("sistolica".parse::<NormativeMetric>().unwrap(), NormativeMetric::SystolicBp);
        assert!("vo2max".parse::<NormativeMetric>().is_err());
    }

    #[test]
    fn test_non_finite_value() {
        assert!(classify(NormativeMetric::Bmi, f64::NAN, None, None).is_none());
    }

    #[test]
    fn test_custom_tables_without_metric() {
        let tables = [table(NormativeMetric::Bmi, None, ADULT, 1, &BMI_BANDS)];
        let classifier = NormativeClassifier::with_tables(&tables);
        assert!(classifier.classify(NormativeMetric::Whr, 0.9, None, None).is_none());
        assert!(classifier.classify(NormativeMetric::Bmi, 22.0, None, None).is_some());
    }

    #[test]
    fn test_tables_are_contiguous() {
        for t in STANDARD_TABLES.iter() {
            let step = 10f64.powi(-(t.precision as i32));
            assert!(t.bands.first().unwrap().min.is_none(), "{:?} lower edge", t.metric);
            assert!(t.bands.last().unwrap().max.is_none(), "{:?} upper edge", t.metric);
            for pair in t.bands.windows(2) {
                let gap = pair[1].min.unwrap() - pair[0].max.unwrap();
                assert!(
                    (gap - step).abs() < step / 10.0,
                    "{:?} gap at {}",
                    t.metric,
                    pair[1].label
                );
            }
        }
    }
}
