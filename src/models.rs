use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CoachError;

/// Severity shared by every classification in the engine.
///
/// Ordering is meaningful: `Ok < Warning < Alert`, so the worst of a set of
/// findings is simply its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Warning,
    Alert,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Ok => write!(f, "ok"),
            Severity::Warning => write!(f, "warning"),
            Severity::Alert => write!(f, "alert"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" | "maschio" | "uomo" => Ok(Sex::Male),
            "f" | "female" | "femmina" | "donna" => Ok(Sex::Female),
            _ => Err(CoachError::parse("sex", s)),
        }
    }
}

/// Self-reported activity level from the anamnesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Intense,
}

impl FromStr for ActivityLevel {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sedentary" | "sedentario" => Ok(ActivityLevel::Sedentary),
            "light" | "leggero" => Ok(ActivityLevel::Light),
            "moderate" | "moderato" => Ok(ActivityLevel::Moderate),
            "intense" | "intenso" => Ok(ActivityLevel::Intense),
            _ => Err(CoachError::parse("activity level", s)),
        }
    }
}

/// Overall training level of a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl FitnessLevel {
    pub fn rank(&self) -> i32 {
        match self {
            FitnessLevel::Beginner => 0,
            FitnessLevel::Intermediate => 1,
            FitnessLevel::Advanced => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FitnessLevel::Beginner => "principiante",
            FitnessLevel::Intermediate => "intermedio",
            FitnessLevel::Advanced => "avanzato",
        }
    }
}

impl Default for FitnessLevel {
    fn default() -> Self {
        FitnessLevel::Beginner
    }
}

impl FromStr for FitnessLevel {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "principiante" => Ok(FitnessLevel::Beginner),
            "intermediate" | "intermedio" => Ok(FitnessLevel::Intermediate),
            "advanced" | "avanzato" => Ok(FitnessLevel::Advanced),
            _ => Err(CoachError::parse("fitness level", s)),
        }
    }
}

/// Stated goal of a training plan; also keys the per-goal rep ranges of an exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingGoal {
    Strength,
    Hypertrophy,
    Endurance,
    WeightLoss,
    GeneralFitness,
}

impl TrainingGoal {
    pub fn label(&self) -> &'static str {
        match self {
            TrainingGoal::Strength => "forza",
            TrainingGoal::Hypertrophy => "ipertrofia",
            TrainingGoal::Endurance => "resistenza",
            TrainingGoal::WeightLoss => "dimagrimento",
            TrainingGoal::GeneralFitness => "fitness generale",
        }
    }
}

impl FromStr for TrainingGoal {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "strength" | "forza" => Ok(TrainingGoal::Strength),
            "hypertrophy" | "ipertrofia" => Ok(TrainingGoal::Hypertrophy),
            "endurance" | "resistenza" => Ok(TrainingGoal::Endurance),
            "weight_loss" | "dimagrimento" => Ok(TrainingGoal::WeightLoss),
            "general_fitness" | "general" | "generale" | "tonificazione" => {
                Ok(TrainingGoal::GeneralFitness)
            }
            _ => Err(CoachError::parse("training goal", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseCategory {
    Compound,
    Isolation,
    Bodyweight,
    Cardio,
    Mobility,
    Stretching,
}

impl FromStr for ExerciseCategory {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compound" | "multiarticolare" => Ok(ExerciseCategory::Compound),
            "isolation" | "monoarticolare" => Ok(ExerciseCategory::Isolation),
            "bodyweight" | "corpo libero" => Ok(ExerciseCategory::Bodyweight),
            "cardio" => Ok(ExerciseCategory::Cardio),
            "mobility" | "mobilità" => Ok(ExerciseCategory::Mobility),
            "stretching" => Ok(ExerciseCategory::Stretching),
            _ => Err(CoachError::parse("exercise category", s)),
        }
    }
}

/// Force family of an exercise or a movement pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceType {
    Push,
    Pull,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPattern {
    Squat,
    Hinge,
    Lunge,
    HorizontalPush,
    VerticalPush,
    HorizontalPull,
    VerticalPull,
    Core,
    Carry,
    Isolation,
    Cardio,
    Mobility,
    Stretch,
}

impl MovementPattern {
    /// Force family a slot asking for this pattern accepts; `None` for
    /// patterns outside the push/pull/static taxonomy.
    pub fn force_family(&self) -> Option<ForceType> {
        match self {
            MovementPattern::Squat
            | MovementPattern::Lunge
            | MovementPattern::HorizontalPush
            | MovementPattern::VerticalPush => Some(ForceType::Push),
            MovementPattern::Hinge
            | MovementPattern::HorizontalPull
            | MovementPattern::VerticalPull => Some(ForceType::Pull),
            MovementPattern::Core | MovementPattern::Carry => Some(ForceType::Static),
            MovementPattern::Isolation
            | MovementPattern::Cardio
            | MovementPattern::Mobility
            | MovementPattern::Stretch => None,
        }
    }

    /// Prime movers a pattern trains
    pub fn prime_movers(&self) -> &'static [MuscleGroup] {
        use MuscleGroup::*;
        match self {
            MovementPattern::Squat => &[Quadriceps, Glutes],
            MovementPattern::Hinge => &[Hamstrings, Glutes, LowerBack],
            MovementPattern::Lunge => &[Quadriceps, Glutes],
            MovementPattern::HorizontalPush => &[Chest, Shoulders],
            MovementPattern::VerticalPush => &[Shoulders],
            MovementPattern::HorizontalPull => &[Back, Trapezius],
            MovementPattern::VerticalPull => &[Back],
            MovementPattern::Core => &[Core],
            MovementPattern::Carry => &[Forearms, Trapezius, Core],
            MovementPattern::Isolation
            | MovementPattern::Cardio
            | MovementPattern::Mobility
            | MovementPattern::Stretch => &[],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MovementPattern::Squat => "squat",
            MovementPattern::Hinge => "hip hinge",
            MovementPattern::Lunge => "affondo",
            MovementPattern::HorizontalPush => "spinta orizzontale",
            MovementPattern::VerticalPush => "spinta verticale",
            MovementPattern::HorizontalPull => "tirata orizzontale",
            MovementPattern::VerticalPull => "tirata verticale",
            MovementPattern::Core => "core",
            MovementPattern::Carry => "trasporto",
            MovementPattern::Isolation => "isolamento",
            MovementPattern::Cardio => "cardio",
            MovementPattern::Mobility => "mobilità",
            MovementPattern::Stretch => "allungamento",
        }
    }
}

/// Normalized muscle groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Forearms,
    Trapezius,
    Core,
    LowerBack,
    Quadriceps,
    Hamstrings,
    Glutes,
    Adductors,
    Calves,
}

impl MuscleGroup {
    /// All muscle groups for iteration
    pub fn all() -> &'static [MuscleGroup] {
        &[
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Shoulders,
            MuscleGroup::Biceps,
            MuscleGroup::Triceps,
            MuscleGroup::Forearms,
            MuscleGroup::Trapezius,
            MuscleGroup::Core,
            MuscleGroup::LowerBack,
            MuscleGroup::Quadriceps,
            MuscleGroup::Hamstrings,
            MuscleGroup::Glutes,
            MuscleGroup::Adductors,
            MuscleGroup::Calves,
        ]
    }

    /// Map a free-form muscle name (Italian or English, anatomical or gym
    /// slang) onto its normalized group.
    pub fn from_alias(alias: &str) -> Option<MuscleGroup> {
        let normalized = alias.trim().to_lowercase().replace(['-', '_'], " ");
        let group = match normalized.as_str() {
            "chest" | "pecs" | "pectorals" | "petto" | "pettorali" | "gran pettorale" => {
                MuscleGroup::Chest
            }
            "back" | "lats" | "latissimus" | "dorsali" | "gran dorsale" | "schiena"
            | "romboidi" | "rhomboids" => MuscleGroup::Back,
            "shoulders" | "delts" | "deltoids" | "spalle" | "deltoidi" | "deltoide anteriore"
            | "deltoide laterale" | "deltoide posteriore" => MuscleGroup::Shoulders,
            "biceps" | "bicipiti" | "bicipite" | "brachiale" => MuscleGroup::Biceps,
            "triceps" | "tricipiti" | "tricipite" => MuscleGroup::Triceps,
            "forearms" | "avambracci" | "grip" | "presa" => MuscleGroup::Forearms,
            "trapezius" | "traps" | "trapezio" => MuscleGroup::Trapezius,
            "core" | "abs" | "abdominals" | "addominali" | "retto addominale" | "obliqui"
            | "obliques" => MuscleGroup::Core,
            "lower back" | "erectors" | "erector spinae" | "lombari" | "erettori spinali" => {
                MuscleGroup::LowerBack
            }
            "quadriceps" | "quads" | "quadricipiti" | "quadricipite" => MuscleGroup::Quadriceps,
            "hamstrings" | "ischiocrurali" | "femorali" | "bicipite femorale" => {
                MuscleGroup::Hamstrings
            }
            "glutes" | "glutei" | "gluteo" | "grande gluteo" | "medio gluteo" => {
                MuscleGroup::Glutes
            }
            "adductors" | "adduttori" => MuscleGroup::Adductors,
            "calves" | "polpacci" | "gastrocnemio" | "soleo" | "soleus" => MuscleGroup::Calves,
            _ => return None,
        };
        Some(group)
    }

    pub fn label(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "pettorali",
            MuscleGroup::Back => "dorsali",
            MuscleGroup::Shoulders => "spalle",
            MuscleGroup::Biceps => "bicipiti",
            MuscleGroup::Triceps => "tricipiti",
            MuscleGroup::Forearms => "avambracci",
            MuscleGroup::Trapezius => "trapezio",
            MuscleGroup::Core => "core",
            MuscleGroup::LowerBack => "lombari",
            MuscleGroup::Quadriceps => "quadricipiti",
            MuscleGroup::Hamstrings => "ischiocrurali",
            MuscleGroup::Glutes => "glutei",
            MuscleGroup::Adductors => "adduttori",
            MuscleGroup::Calves => "polpacci",
        }
    }
}

impl FromStr for MuscleGroup {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MuscleGroup::from_alias(s).ok_or_else(|| CoachError::parse("muscle group", s))
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Kettlebell,
    Machine,
    Cable,
    Band,
    Bodyweight,
    Cardio,
    Other,
}

/// Technical difficulty of an exercise, on the same scale as `FitnessLevel`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyTier {
    pub fn rank(&self) -> i32 {
        match self {
            DifficultyTier::Beginner => 0,
            DifficultyTier::Intermediate => 1,
            DifficultyTier::Advanced => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LateralPattern {
    Bilateral,
    Unilateral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KineticChain {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementPlane {
    Sagittal,
    Frontal,
    Transverse,
    Multiplanar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractionType {
    Isotonic,
    Isometric,
    Eccentric,
    Plyometric,
}

/// Inclusive repetition range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepRange {
    pub min: u32,
    pub max: u32,
}

impl RepRange {
    pub const fn new(min: u32, max: u32) -> Self {
        RepRange { min, max }
    }
}

impl fmt::Display for RepRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// Catalog entry for one exercise. Reference data, never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Stable catalog identifier, also the key of the safety map
    pub id: String,

    /// Display name
    pub name: String,

    pub category: ExerciseCategory,

    pub pattern: MovementPattern,

    #[serde(default)]
    pub primary_muscles: Vec<MuscleGroup>,

    #[serde(default)]
    pub secondary_muscles: Vec<MuscleGroup>,

    pub equipment: Equipment,

    pub difficulty: DifficultyTier,

    pub force: ForceType,

    pub laterality: LateralPattern,

    pub kinetic_chain: KineticChain,

    pub plane: MovementPlane,

    pub contraction: ContractionType,

    /// Rep ranges the exercise is programmed with, per training goal
    #[serde(default)]
    pub rep_ranges: BTreeMap<TrainingGoal, RepRange>,

    /// Hours the primary muscles need before being loaded again
    pub recovery_hours: u32,
}

impl Exercise {
    /// True when the group is a primary or secondary target
    pub fn works(&self, muscle: MuscleGroup) -> bool {
        self.primary_muscles.contains(&muscle) || self.secondary_muscles.contains(&muscle)
    }

    /// Secondary muscles that are not also listed as primary
    pub fn secondary_only(&self) -> impl Iterator<Item = MuscleGroup> + '_ {
        self.secondary_muscles
            .iter()
            .copied()
            .filter(move |m| !self.primary_muscles.contains(m))
    }
}

/// Section of a session an exercise or slot belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SlotSection {
    #[serde(rename = "riscaldamento")]
    WarmUp,
    #[serde(rename = "principale")]
    Main,
    #[serde(rename = "stretching")]
    Stretch,
}

impl SlotSection {
    /// Exercise categories eligible to fill a slot of this section
    pub fn allowed_categories(&self) -> &'static [ExerciseCategory] {
        match self {
            SlotSection::WarmUp => &[ExerciseCategory::Cardio, ExerciseCategory::Mobility],
            SlotSection::Main => &[
                ExerciseCategory::Compound,
                ExerciseCategory::Isolation,
                ExerciseCategory::Bodyweight,
            ],
            SlotSection::Stretch => &[ExerciseCategory::Stretching, ExerciseCategory::Mobility],
        }
    }

    pub fn accepts(&self, category: ExerciseCategory) -> bool {
        self.allowed_categories().contains(&category)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SlotSection::WarmUp => "riscaldamento",
            SlotSection::Main => "principale",
            SlotSection::Stretch => "stretching",
        }
    }
}

/// Metric identifiers recorded in a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricId {
    Weight,
    Height,
    BodyFat,
    Waist,
    Hip,
    Neck,
    Chest,
    ArmRight,
    ArmLeft,
    ThighRight,
    ThighLeft,
    CalfRight,
    CalfLeft,
    SystolicBp,
    DiastolicBp,
    RestingHeartRate,
}

impl MetricId {
    pub fn label(&self) -> &'static str {
        match self {
            MetricId::Weight => "peso",
            MetricId::Height => "altezza",
            MetricId::BodyFat => "massa grassa",
            MetricId::Waist => "vita",
            MetricId::Hip => "fianchi",
            MetricId::Neck => "collo",
            MetricId::Chest => "torace",
            MetricId::ArmRight => "braccio destro",
            MetricId::ArmLeft => "braccio sinistro",
            MetricId::ThighRight => "coscia destra",
            MetricId::ThighLeft => "coscia sinistra",
            MetricId::CalfRight => "polpaccio destro",
            MetricId::CalfLeft => "polpaccio sinistro",
            MetricId::SystolicBp => "pressione sistolica",
            MetricId::DiastolicBp => "pressione diastolica",
            MetricId::RestingHeartRate => "frequenza cardiaca a riposo",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricId::Weight => "kg",
            MetricId::BodyFat => "%",
            MetricId::SystolicBp | MetricId::DiastolicBp => "mmHg",
            MetricId::RestingHeartRate => "bpm",
            _ => "cm",
        }
    }
}

impl FromStr for MetricId {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "weight" | "peso" => Ok(MetricId::Weight),
            "height" | "altezza" => Ok(MetricId::Height),
            "body_fat" | "bodyfat" | "massa_grassa" => Ok(MetricId::BodyFat),
            "waist" | "vita" => Ok(MetricId::Waist),
            "hip" | "hips" | "fianchi" => Ok(MetricId::Hip),
            "neck" | "collo" => Ok(MetricId::Neck),
            "chest" | "torace" => Ok(MetricId::Chest),
            "arm_right" => Ok(MetricId::ArmRight),
            "arm_left" => Ok(MetricId::ArmLeft),
            "thigh_right" => Ok(MetricId::ThighRight),
            "thigh_left" => Ok(MetricId::ThighLeft),
            "calf_right" => Ok(MetricId::CalfRight),
            "calf_left" => Ok(MetricId::CalfLeft),
            "systolic_bp" | "systolic" | "sistolica" => Ok(MetricId::SystolicBp),
            "diastolic_bp" | "diastolic" | "diastolica" => Ok(MetricId::DiastolicBp),
            "resting_heart_rate" | "resting_hr" | "fc_riposo" => Ok(MetricId::RestingHeartRate),
            _ => Err(CoachError::parse("metric", s)),
        }
    }
}

/// One recorded value inside a measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub metric: MetricId,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
}

/// Dated snapshot of a client's body metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub date: NaiveDate,
    #[serde(default)]
    pub values: Vec<MetricValue>,
}

impl Measurement {
    pub fn new(date: NaiveDate) -> Self {
        Measurement {
            date,
            values: Vec::new(),
        }
    }

    /// Builder-style helper used by callers assembling snapshots in code
    pub fn with(mut self, metric: MetricId, value: f64) -> Self {
        self.values.push(MetricValue {
            metric,
            value,
            unit: metric.unit().to_string(),
        });
        self
    }

    /// First recorded value for a metric; non-finite values count as absent
    pub fn value(&self, metric: MetricId) -> Option<f64> {
        self.values
            .iter()
            .find(|v| v.metric == metric)
            .map(|v| v.value)
            .filter(|v| v.is_finite())
    }
}

/// Date-ordered, read-only view over a client's measurement history
#[derive(Debug, Clone)]
pub struct MeasurementHistory<'a> {
    entries: Vec<&'a Measurement>,
}

impl<'a> MeasurementHistory<'a> {
    /// Borrow a history, ordering it by date. Same-day snapshots keep their
    /// input order.
    pub fn new(measurements: &'a [Measurement]) -> Self {
        let mut entries: Vec<&Measurement> = measurements.iter().collect();
        entries.sort_by_key(|m| m.date);
        MeasurementHistory { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All (date, value) points for a metric, oldest first
    pub fn series(&self, metric: MetricId) -> Vec<(NaiveDate, f64)> {
        self.entries
            .iter()
            .filter_map(|m| m.value(metric).map(|v| (m.date, v)))
            .collect()
    }

    /// Most recent value of a metric
    pub fn latest(&self, metric: MetricId) -> Option<(NaiveDate, f64)> {
        self.entries
            .iter()
            .rev()
            .find_map(|m| m.value(metric).map(|v| (m.date, v)))
    }

    /// Points where both metrics were recorded in the same snapshot
    pub fn paired(&self, a: MetricId, b: MetricId) -> Vec<(NaiveDate, f64, f64)> {
        self.entries
            .iter()
            .filter_map(|m| match (m.value(a), m.value(b)) {
                (Some(x), Some(y)) => Some((m.date, x, y)),
                _ => None,
            })
            .collect()
    }
}

/// A client goal on a tracked metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub metric: MetricId,
    pub target: f64,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

fn default_true() -> bool {
    true
}

/// Strength standard rating of a lift relative to bodyweight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthRating {
    Untrained,
    Novice,
    Intermediate,
    Advanced,
    Elite,
}

impl StrengthRating {
    pub fn label(&self) -> &'static str {
        match self {
            StrengthRating::Untrained => "non allenato",
            StrengthRating::Novice => "novizio",
            StrengthRating::Intermediate => "intermedio",
            StrengthRating::Advanced => "avanzato",
            StrengthRating::Elite => "élite",
        }
    }

    /// Fitness level a rating corresponds to
    pub fn as_level(&self) -> FitnessLevel {
        match self {
            StrengthRating::Untrained | StrengthRating::Novice => FitnessLevel::Beginner,
            StrengthRating::Intermediate => FitnessLevel::Intermediate,
            StrengthRating::Advanced | StrengthRating::Elite => FitnessLevel::Advanced,
        }
    }
}

/// Previously computed strength ratio for one lift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthRatio {
    pub lift: String,
    pub pattern: MovementPattern,
    /// Load lifted divided by bodyweight
    pub ratio: f64,
    pub rating: StrengthRating,
}

/// Left/right limb pairs tracked for bilateral symmetry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimbPair {
    Arm,
    Thigh,
    Calf,
}

impl LimbPair {
    pub fn all() -> &'static [LimbPair] {
        &[LimbPair::Arm, LimbPair::Thigh, LimbPair::Calf]
    }

    /// (right, left) metric ids
    pub fn metrics(&self) -> (MetricId, MetricId) {
        match self {
            LimbPair::Arm => (MetricId::ArmRight, MetricId::ArmLeft),
            LimbPair::Thigh => (MetricId::ThighRight, MetricId::ThighLeft),
            LimbPair::Calf => (MetricId::CalfRight, MetricId::CalfLeft),
        }
    }

    /// Muscle groups whose unilateral work addresses an imbalance on this pair
    pub fn muscles(&self) -> &'static [MuscleGroup] {
        match self {
            LimbPair::Arm => &[MuscleGroup::Biceps, MuscleGroup::Triceps, MuscleGroup::Forearms],
            LimbPair::Thigh => &[
                MuscleGroup::Quadriceps,
                MuscleGroup::Hamstrings,
                MuscleGroup::Glutes,
                MuscleGroup::Adductors,
            ],
            LimbPair::Calf => &[MuscleGroup::Calves],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LimbPair::Arm => "braccia",
            LimbPair::Thigh => "cosce",
            LimbPair::Calf => "polpacci",
        }
    }
}

/// Measured left/right imbalance carried into the client profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetryDeficit {
    pub pair: LimbPair,
    pub delta_cm: f64,
    pub severity: Severity,
}

/// Contraindication severity derived from the anamnesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetySeverity {
    Caution,
    Avoid,
}

impl SafetySeverity {
    pub fn label(&self) -> &'static str {
        match self {
            SafetySeverity::Caution => "cautela",
            SafetySeverity::Avoid => "da evitare",
        }
    }
}

/// Matched contraindication for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyEntry {
    pub severity: SafetySeverity,
    #[serde(default)]
    pub conditions: Vec<String>,
}

/// Exercise id → matched contraindication
pub type SafetyMap = BTreeMap<String, SafetyEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muscle_alias_normalization() {
        assert_eq!(MuscleGroup::from_alias("Pettorali"), Some(MuscleGroup::Chest));
        assert_eq!(MuscleGroup::from_alias("lats"), Some(MuscleGroup::Back));
        assert_eq!(MuscleGroup::from_alias("lower-back"), Some(MuscleGroup::LowerBack));
        assert_eq!(MuscleGroup::from_alias("bicipite femorale"), Some(MuscleGroup::Hamstrings));
        assert_eq!(MuscleGroup::from_alias("spleen"), None);
        assert!("spleen".parse::<MuscleGroup>().is_err());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("intermedio".parse::<FitnessLevel>().unwrap(), FitnessLevel::Intermediate);
        assert_eq!("weight-loss".parse::<TrainingGoal>().unwrap(), TrainingGoal::WeightLoss);
        assert_eq!("F".parse::<Sex>().unwrap(), Sex::Female);
        assert!("elite".parse::<FitnessLevel>().is_err());
        assert!("plyo".parse::<ExerciseCategory>().is_err());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Alert > Severity::Warning);
        assert!(Severity::Warning > Severity::Ok);
        assert_eq!(
            [Severity::Ok, Severity::Alert, Severity::Warning].iter().max(),
            Some(&Severity::Alert)
        );
    }

    #[test]
    fn test_slot_section_serialization() {
        let json = serde_json::to_string(&SlotSection::Main).unwrap();
        assert_eq!(json, "\"principale\"");
        assert!(SlotSection::Main.accepts(ExerciseCategory::Bodyweight));
        assert!(!SlotSection::Main.accepts(ExerciseCategory::Stretching));
        assert!(SlotSection::Stretch.accepts(ExerciseCategory::Mobility));
    }

    #[test]
    fn test_history_is_date_ordered() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        let measurements = vec![
            Measurement::new(d(20)).with(MetricId::Weight, 80.0),
            Measurement::new(d(1)).with(MetricId::Weight, 82.0).with(MetricId::BodyFat, 20.0),
            Measurement::new(d(10)).with(MetricId::BodyFat, 19.5),
        ];
        let history = MeasurementHistory::new(&measurements);

        assert_eq!(history.series(MetricId::Weight), vec![(d(1), 82.0), (d(20), 80.0)]);
        assert_eq!(history.latest(MetricId::BodyFat), Some((d(10), 19.5)));
        assert_eq!(history.paired(MetricId::Weight, MetricId::BodyFat).len(), 1);
    }

    #[test]
    fn test_exercise_rep_ranges_deserialize() {
        let json = r#"{
            "id": "back_squat", "name": "Back squat", "category": "compound",
            "pattern": "squat", "primary_muscles": ["quadriceps", "glutes"],
            "secondary_muscles": ["glutes", "lower_back"], "equipment": "barbell",
            "difficulty": "intermediate", "force": "push", "laterality": "bilateral",
            "kinetic_chain": "closed", "plane": "sagittal", "contraction": "isotonic",
            "rep_ranges": {"strength": {"min": 3, "max": 6}}, "recovery_hours": 72
        }"#;
        let exercise: Exercise = serde_json::from_str(json).unwrap();
        assert_eq!(exercise.rep_ranges[&TrainingGoal::Strength], RepRange::new(3, 6));
        assert_eq!(exercise.secondary_only().collect::<Vec<_>>(), vec![MuscleGroup::LowerBack]);
        assert!(exercise.works(MuscleGroup::Glutes));
    }
}
