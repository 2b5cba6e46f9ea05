//! Post-hoc analysis of an assembled plan
//!
//! Works on the plan-editing format ([`PlanSession`]), so it applies equally
//! to generated plans and to plans a trainer edited by hand. Every output is
//! recomputed from scratch on each call.
//!
//! Weekly volume assumes every session runs once per week. Set targets follow
//! NSCA hypertrophy guidance per training level.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::catalog::ExerciseCatalog;
use crate::models::{
    ContractionType, Exercise, FitnessLevel, KineticChain, MovementPlane, MuscleGroup, RepRange,
    SafetyMap, SafetySeverity, Severity, SlotSection,
};
use crate::profile::ClientProfile;

/// Credit per set for a primary mover
pub const PRIMARY_CREDIT: f64 = 1.0;
/// Credit per set for a secondary mover
pub const SECONDARY_CREDIT: f64 = 0.5;
/// Required/available ratio above which a conflict is an alert
pub const ALERT_RECOVERY_RATIO: f64 = 1.5;

const HOURS_PER_WEEK: f64 = 168.0;

/// One exercise as placed in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedExercise {
    pub exercise_id: String,
    pub section: SlotSection,
    pub sets: u32,
    #[serde(default)]
    pub reps: Option<RepRange>,
    #[serde(default)]
    pub rest_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSession {
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<PlannedExercise>,
}

impl PlanSession {
    pub fn main_exercises(&self) -> impl Iterator<Item = &PlannedExercise> {
        self.exercises.iter().filter(|e| e.section == SlotSection::Main)
    }
}

/// Inclusive weekly set range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SetRange {
    pub min: f64,
    pub max: f64,
}

impl SetRange {
    /// Weekly sets per muscle group
    pub fn per_muscle(level: FitnessLevel) -> Self {
        match level {
            FitnessLevel::Beginner => SetRange { min: 10.0, max: 12.0 },
            FitnessLevel::Intermediate => SetRange { min: 14.0, max: 18.0 },
            FitnessLevel::Advanced => SetRange { min: 18.0, max: 25.0 },
        }
    }

    /// Total principal sets per week
    pub fn total(level: FitnessLevel) -> Self {
        match level {
            FitnessLevel::Beginner => SetRange { min: 30.0, max: 50.0 },
            FitnessLevel::Intermediate => SetRange { min: 50.0, max: 80.0 },
            FitnessLevel::Advanced => SetRange { min: 70.0, max: 120.0 },
        }
    }

    pub fn status(&self, sets: f64) -> CoverageStatus {
        if sets < self.min {
            CoverageStatus::Deficit
        } else if sets > self.max {
            CoverageStatus::Excess
        } else {
            CoverageStatus::Optimal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageStatus {
    Deficit,
    Optimal,
    Excess,
}

impl CoverageStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CoverageStatus::Deficit => "insufficiente",
            CoverageStatus::Optimal => "ottimale",
            CoverageStatus::Excess => "eccessivo",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MuscleCoverage {
    pub muscle: MuscleGroup,
    pub weekly_sets: f64,
    pub target: SetRange,
    pub status: CoverageStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeAnalysis {
    pub total_sets: u32,
    pub target: SetRange,
    pub status: CoverageStatus,
}

/// Descriptive histograms over principal exercises
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BiomechanicalVariety {
    pub planes: BTreeMap<MovementPlane, usize>,
    pub chains: BTreeMap<KineticChain, usize>,
    pub contractions: BTreeMap<ContractionType, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryConflict {
    pub from_session: String,
    pub to_session: String,
    pub muscle: MuscleGroup,
    pub required_hours: u32,
    pub available_hours: f64,
    pub severity: Severity,
}

/// Everything [`analyze_plan`] computes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanAnalysis {
    pub coverage: Vec<MuscleCoverage>,
    pub volume: VolumeAnalysis,
    pub variety: BiomechanicalVariety,
    pub conflicts: Vec<RecoveryConflict>,
    pub safety_score: u32,
}

/// Resolve planned main-section exercises against the catalog
fn resolved_main<'c>(
    session: &'c PlanSession,
    catalog: &'c ExerciseCatalog,
) -> impl Iterator<Item = (&'c PlannedExercise, &'c Exercise)> {
    session.main_exercises().filter_map(move |planned| {
        let found = catalog.get(&planned.exercise_id);
        if found.is_none() {
            debug!(exercise = %planned.exercise_id, "planned exercise not in catalog");
        }
        found.map(|exercise| (planned, exercise))
    })
}

/// Weekly sets per muscle group against the level target
#[instrument(skip_all, fields(sessions = sessions.len(), ?level))]
pub fn compute_muscle_coverage(
    sessions: &[PlanSession],
    catalog: &ExerciseCatalog,
    level: FitnessLevel,
) -> Vec<MuscleCoverage> {
    let mut sets: BTreeMap<MuscleGroup, f64> = BTreeMap::new();
    for session in sessions {
        for (planned, exercise) in resolved_main(session, catalog) {
            let n = planned.sets as f64;
            for muscle in &exercise.primary_muscles {
                *sets.entry(*muscle).or_default() += n * PRIMARY_CREDIT;
            }
            for muscle in exercise.secondary_only() {
                *sets.entry(muscle).or_default() += n * SECONDARY_CREDIT;
            }
        }
    }

    let target = SetRange::per_muscle(level);
    MuscleGroup::all()
        .iter()
        .map(|muscle| {
            let weekly_sets = sets.get(muscle).copied().unwrap_or(0.0);
            MuscleCoverage {
                muscle: *muscle,
                weekly_sets,
                target,
                status: target.status(weekly_sets),
            }
        })
        .collect()
}

/// Total principal sets per week
pub fn analyze_volume(sessions: &[PlanSession], level: FitnessLevel) -> VolumeAnalysis {
    let total_sets: u32 = sessions
        .iter()
        .flat_map(|s| s.main_exercises())
        .map(|e| e.sets)
        .sum();
    let target = SetRange::total(level);
    VolumeAnalysis {
        total_sets,
        target,
        status: target.status(total_sets as f64),
    }
}

pub fn analyze_variety(
    sessions: &[PlanSession],
    catalog: &ExerciseCatalog,
) -> BiomechanicalVariety {
    sessions
        .iter()
        .flat_map(|s| resolved_main(s, catalog))
        .fold(BiomechanicalVariety::default(), |mut variety, (_, exercise)| {
            *variety.planes.entry(exercise.plane).or_default() += 1;
            *variety.chains.entry(exercise.kinetic_chain).or_default() += 1;
            *variety.contractions.entry(exercise.contraction).or_default() += 1;
            variety
        })
}

/// Muscles loaded by one session, with the longest recovery each needs
fn required_recovery(
    session: &PlanSession,
    catalog: &ExerciseCatalog,
) -> BTreeMap<MuscleGroup, u32> {
    let mut required = BTreeMap::new();
    for (_, exercise) in resolved_main(session, catalog) {
        for muscle in &exercise.primary_muscles {
            let hours = required.entry(*muscle).or_insert(0);
            *hours = (*hours).max(exercise.recovery_hours);
        }
    }
    required
}

fn touches(session: &PlanSession, catalog: &ExerciseCatalog, muscle: MuscleGroup) -> bool {
    resolved_main(session, catalog).any(|(_, exercise)| exercise.works(muscle))
}

/// Recovery conflicts between cyclically adjacent sessions
///
/// The last session wraps around to the first. A single session is compared
/// with its own repeat the following week.
#[instrument(skip_all, fields(sessions = sessions.len(), sessions_per_week = sessions_per_week))]
pub fn find_recovery_conflicts(
    sessions: &[PlanSession],
    catalog: &ExerciseCatalog,
    sessions_per_week: u32,
) -> Vec<RecoveryConflict> {
    if sessions.is_empty() || sessions_per_week == 0 {
        return Vec::new();
    }
    let available = HOURS_PER_WEEK / sessions_per_week as f64;

    let mut conflicts = Vec::new();
    for (i, from) in sessions.iter().enumerate() {
        let to = &sessions[(i + 1) % sessions.len()];
        for (muscle, required) in required_recovery(from, catalog) {
            if required as f64 <= available || !touches(to, catalog, muscle) {
                continue;
            }
            let severity = if required as f64 <= available * ALERT_RECOVERY_RATIO {
                Severity::Warning
            } else {
                Severity::Alert
            };
            debug!(from = %from.name, to = %to.name, ?muscle, required, "recovery conflict");
            conflicts.push(RecoveryConflict {
                from_session: from.name.clone(),
                to_session: to.name.clone(),
                muscle,
                required_hours: required,
                available_hours: available,
                severity,
            });
        }
    }
    conflicts
}

/// Percentage of plan exercises without a contraindication
///
/// Caution earns half credit, avoid none. An absent or empty map scores 100.
pub fn safety_score(sessions: &[PlanSession], safety: Option<&SafetyMap>) -> u32 {
    let Some(map) = safety.filter(|m| !m.is_empty()) else {
        return 100;
    };
    let exercises: Vec<&PlannedExercise> =
        sessions.iter().flat_map(|s| s.exercises.iter()).collect();
    if exercises.is_empty() {
        return 100;
    }
    let credit: f64 = exercises
        .iter()
        .map(|e| match map.get(&e.exercise_id).map(|entry| entry.severity) {
            None => 1.0,
            Some(SafetySeverity::Caution) => 0.5,
            Some(SafetySeverity::Avoid) => 0.0,
        })
        .sum();
    (100.0 * credit / exercises.len() as f64).round() as u32
}

/// Run every analysis for a client's plan
#[instrument(skip_all, fields(sessions = sessions.len()))]
pub fn analyze_plan(
    sessions: &[PlanSession],
    catalog: &ExerciseCatalog,
    profile: &ClientProfile,
    sessions_per_week: u32,
) -> PlanAnalysis {
    let level = profile.fitness_level;
    PlanAnalysis {
        coverage: compute_muscle_coverage(sessions, catalog, level),
        volume: analyze_volume(sessions, level),
        variety: analyze_variety(sessions, catalog),
        conflicts: find_recovery_conflicts(sessions, catalog, sessions_per_week),
        safety_score: safety_score(sessions, Some(&profile.safety)),
    }
}
