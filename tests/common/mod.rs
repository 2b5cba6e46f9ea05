//! Shared fixtures for the integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;

use coachrs::catalog::ExerciseCatalog;
use coachrs::clinical::LiftRecord;
use coachrs::models::{
    ContractionType, DifficultyTier, Equipment, Exercise, ExerciseCategory, ForceType, Goal,
    KineticChain, LateralPattern, Measurement, MovementPattern, MovementPlane, MuscleGroup,
    SafetyMap, StrengthRatio,
};
use coachrs::profile::{ClientProfile, ClientProfileBuilder, ClientRecord};

pub const CATALOG_JSON: &str = include_str!("../../demos/catalog.json");
pub const CLIENT_JSON: &str = include_str!("../../demos/client.json");

/// Demo client file, as read by the command-line driver
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClientFixture {
    pub record: ClientRecord,
    pub safety: SafetyMap,
    pub strength_ratios: Vec<StrengthRatio>,
    pub goals: Vec<Goal>,
    pub lifts: Vec<LiftRecord>,
    pub measurements: Vec<Measurement>,
}

impl ClientFixture {
    pub fn profile(&self, as_of: NaiveDate) -> ClientProfile {
        ClientProfileBuilder::new(self.record.clone())
            .safety(self.safety.clone())
            .strength_ratios(self.strength_ratios.clone())
            .goals(self.goals.clone())
            .measurements(&self.measurements)
            .build(as_of)
    }
}

pub fn catalog() -> ExerciseCatalog {
    ExerciseCatalog::from_json(CATALOG_JSON).expect("demo catalog parses")
}

pub fn client() -> ClientFixture {
    serde_json::from_str(CLIENT_JSON).expect("demo client parses")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Minimal main-section exercise
pub fn exercise(
    id: &str,
    pattern: MovementPattern,
    primary: &[MuscleGroup],
    recovery_hours: u32,
) -> Exercise {
    Exercise {
        id: id.to_string(),
        name: id.replace('_', " "),
        category: ExerciseCategory::Compound,
        pattern,
        primary_muscles: primary.to_vec(),
        secondary_muscles: vec![],
        equipment: Equipment::Dumbbell,
        difficulty: DifficultyTier::Beginner,
        force: ForceType::Push,
        laterality: LateralPattern::Bilateral,
        kinetic_chain: KineticChain::Closed,
        plane: MovementPlane::Sagittal,
        contraction: ContractionType::Isotonic,
        rep_ranges: BTreeMap::new(),
        recovery_hours,
    }
}
