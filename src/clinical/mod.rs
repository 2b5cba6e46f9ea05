//! Clinical analysis over a client's measurement history
//!
//! Five independent analyses feed one [`ClinicalReport`]:
//!
//! - **Derived metrics**: BMI, lean body mass, FFMI, WHR and relative strength
//! - **Rate assessment**: weekly rate of change of weight, body fat, systolic
//!   pressure and resting heart rate against safe-rate thresholds
//! - **Composition**: body-recomposition phase, fat/lean decomposition of the
//!   last change and a weeks-to-goal projection
//! - **Symmetry**: right/left circumference deltas per limb pair
//! - **Risk profile**: normative classification of metabolic and
//!   cardiovascular markers
//!
//! Every analysis returns `None` or an empty list when its inputs are missing,
//! so a report built from an empty history is well formed with
//! `has_data == false`.

pub mod composition;
pub mod derived;
pub mod rate;
pub mod risk;
pub mod symmetry;

pub use composition::{
    analyze_composition, classify_phase, CompositionAnalysis, CompositionPhase, GoalProjection,
    MassDecomposition,
};
pub use derived::{compute_derived, DerivedMetrics, LiftRecord, RelativeStrength};
pub use rate::{assess_rate, assess_rates, RateAssessment, RateThresholds, TrendDirection};
pub use risk::{assess_risk, RiskFactor, RiskProfile};
pub use symmetry::{analyze_symmetry, DominantSide, SymmetryPair};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::models::{Goal, Measurement, MeasurementHistory, Sex};
use crate::normative::NormativeClassifier;

/// Analysis windows and thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalSettings {
    /// Days of history, ending at the latest point, used for rate slopes
    pub lookback_days: u32,
    /// Minimum days between first and last point of a rate window
    pub min_span_days: u32,
    /// Weekly rates within ±dead_zone count as flat for phase detection
    pub dead_zone: f64,
    /// Minimum weekly weight change (kg) for a goal projection
    pub min_projection_rate: f64,
    /// Projection cap in weeks
    pub max_projection_weeks: f64,
    /// Minimum paired samples for a correlation
    pub min_correlation_samples: usize,
}

impl Default for ClinicalSettings {
    fn default() -> Self {
        ClinicalSettings {
            lookback_days: 56,
            min_span_days: 7,
            dead_zone: 0.1,
            min_projection_rate: 0.05,
            max_projection_weeks: 104.0,
            min_correlation_samples: 4,
        }
    }
}

/// Client data the report needs besides the measurement history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportContext {
    pub sex: Option<Sex>,
    pub age: Option<u32>,
    pub goals: Vec<Goal>,
    pub lifts: Vec<LiftRecord>,
}

/// Combined clinical report for one client at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClinicalReport {
    pub derived: Option<DerivedMetrics>,
    pub rates: Vec<RateAssessment>,
    pub composition: Option<CompositionAnalysis>,
    pub symmetry: Vec<SymmetryPair>,
    pub risk: Option<RiskProfile>,
    pub has_data: bool,
}

/// Runs the clinical analyses with a fixed configuration
#[derive(Debug, Clone)]
pub struct ClinicalAnalysisEngine<'a> {
    settings: ClinicalSettings,
    classifier: NormativeClassifier<'a>,
}

impl Default for ClinicalAnalysisEngine<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl ClinicalAnalysisEngine<'static> {
    pub fn new() -> Self {
        Self::with_settings(ClinicalSettings::default())
    }

    pub fn with_settings(settings: ClinicalSettings) -> Self {
        ClinicalAnalysisEngine {
            settings,
            classifier: NormativeClassifier::standard(),
        }
    }
}

impl<'a> ClinicalAnalysisEngine<'a> {
    pub fn settings(&self) -> &ClinicalSettings {
        &self.settings
    }

    /// Build the full report; never fails, sparse input yields sparse output
    #[instrument(skip_all, fields(measurements = measurements.len()))]
    pub fn generate_report(
        &self,
        measurements: &[Measurement],
        ctx: &ReportContext,
    ) -> ClinicalReport {
        let history = MeasurementHistory::new(measurements);
        if history.is_empty() {
            debug!("empty measurement history");
            return ClinicalReport::default();
        }

        let derived = compute_derived(&history, &ctx.lifts);
        let rates = assess_rates(&history, &self.settings);
        let composition = analyze_composition(&history, &ctx.goals, &self.settings);
        let symmetry = analyze_symmetry(&history);
        let risk = assess_risk(
            derived.as_ref(),
            &history,
            ctx.sex,
            ctx.age,
            &self.classifier,
        );

        let has_data = derived.is_some()
            || !rates.is_empty()
            || composition.is_some()
            || !symmetry.is_empty()
            || risk.is_some();
        debug!(
            rates = rates.len(),
            symmetry = symmetry.len(),
            has_data,
            "clinical report generated"
        );

        ClinicalReport {
            derived,
            rates,
            composition,
            symmetry,
            risk,
            has_data,
        }
    }
}

/// Report with the default settings and tables
pub fn generate_report(measurements: &[Measurement], ctx: &ReportContext) -> ClinicalReport {
    ClinicalAnalysisEngine::new().generate_report(measurements, ctx)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
