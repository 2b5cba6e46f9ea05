//! Multi-criteria exercise scoring
//!
//! Every candidate exercise for a slot is scored on 14 independent
//! dimensions, each normalized to `[0, 1]` with a human-readable reason. The
//! total is the weighted mean scaled to 0–100:
//!
//! ```text
//! total = round(100 × Σ(score_i × weight_i) / Σ weight_i)
//! ```
//!
//! Scoring informs and never blocks: an exercise the client should avoid
//! still receives a 0.1 safety score and stays in the ranking so the trainer
//! keeps the final say. Dimensions without applicable data return a neutral
//! 0.5 with an explanatory reason.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

use crate::models::{
    ContractionType, Equipment, Exercise, ExerciseCategory, KineticChain, LateralPattern,
    MovementPattern, MovementPlane, MuscleGroup, SafetySeverity, SlotSection, TrainingGoal,
};
use crate::profile::ClientProfile;

/// Neutral score for dimensions without applicable data
pub const NEUTRAL: f64 = 0.5;

/// Safety score of an exercise flagged "avoid"
pub const AVOID_FLOOR: f64 = 0.1;

/// Relative weights of the scoring dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub safety: f64,
    pub muscle_match: f64,
    pub pattern_match: f64,
    pub difficulty: f64,
    pub goal_alignment: f64,
    pub strength_level: f64,
    pub recovery_fit: f64,
    pub compound_priority: f64,
    pub equipment_variety: f64,
    pub uniqueness: f64,
    pub plane_variety: f64,
    pub chain_variety: f64,
    pub bilateral_balance: f64,
    pub contraction_variety: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            safety: 0.15,
            muscle_match: 0.15,
            pattern_match: 0.12,
            difficulty: 0.08,
            goal_alignment: 0.07,
            strength_level: 0.05,
            recovery_fit: 0.05,
            compound_priority: 0.07,
            equipment_variety: 0.04,
            uniqueness: 0.10,
            plane_variety: 0.03,
            chain_variety: 0.03,
            bilateral_balance: 0.03,
            contraction_variety: 0.03,
        }
    }
}

impl ScoringWeights {
    /// Weights in [`DimensionId::all`] order
    pub fn as_array(&self) -> [f64; 14] {
        [
            self.safety,
            self.muscle_match,
            self.pattern_match,
            self.difficulty,
            self.goal_alignment,
            self.strength_level,
            self.recovery_fit,
            self.compound_priority,
            self.equipment_variety,
            self.uniqueness,
            self.plane_variety,
            self.chain_variety,
            self.bilateral_balance,
            self.contraction_variety,
        ]
    }

    pub fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }

    pub fn weight(&self, id: DimensionId) -> f64 {
        match id {
            DimensionId::Safety => self.safety,
            DimensionId::MuscleMatch => self.muscle_match,
            DimensionId::PatternMatch => self.pattern_match,
            DimensionId::Difficulty => self.difficulty,
            DimensionId::GoalAlignment => self.goal_alignment,
            DimensionId::StrengthLevel => self.strength_level,
            DimensionId::RecoveryFit => self.recovery_fit,
            DimensionId::CompoundPriority => self.compound_priority,
            DimensionId::EquipmentVariety => self.equipment_variety,
            DimensionId::Uniqueness => self.uniqueness,
            DimensionId::PlaneVariety => self.plane_variety,
            DimensionId::ChainVariety => self.chain_variety,
            DimensionId::BilateralBalance => self.bilateral_balance,
            DimensionId::ContractionVariety => self.contraction_variety,
        }
    }
}

/// Scoring dimension identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionId {
    Safety,
    MuscleMatch,
    PatternMatch,
    Difficulty,
    GoalAlignment,
    StrengthLevel,
    RecoveryFit,
    CompoundPriority,
    EquipmentVariety,
    Uniqueness,
    PlaneVariety,
    ChainVariety,
    BilateralBalance,
    ContractionVariety,
}

impl DimensionId {
    pub fn all() -> &'static [DimensionId; 14] {
        &[
            DimensionId::Safety,
            DimensionId::MuscleMatch,
            DimensionId::PatternMatch,
            DimensionId::Difficulty,
            DimensionId::GoalAlignment,
            DimensionId::StrengthLevel,
            DimensionId::RecoveryFit,
            DimensionId::CompoundPriority,
            DimensionId::EquipmentVariety,
            DimensionId::Uniqueness,
            DimensionId::PlaneVariety,
            DimensionId::ChainVariety,
            DimensionId::BilateralBalance,
            DimensionId::ContractionVariety,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            DimensionId::Safety => "Sicurezza",
            DimensionId::MuscleMatch => "Muscoli target",
            DimensionId::PatternMatch => "Schema motorio",
            DimensionId::Difficulty => "Difficoltà",
            DimensionId::GoalAlignment => "Obiettivo",
            DimensionId::StrengthLevel => "Livello di forza",
            DimensionId::RecoveryFit => "Recupero",
            DimensionId::CompoundPriority => "Multiarticolare",
            DimensionId::EquipmentVariety => "Varietà attrezzi",
            DimensionId::Uniqueness => "Unicità",
            DimensionId::PlaneVariety => "Varietà piani",
            DimensionId::ChainVariety => "Catena cinetica",
            DimensionId::BilateralBalance => "Equilibrio bilaterale",
            DimensionId::ContractionVariety => "Tipo di contrazione",
        }
    }
}

/// One scored dimension
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreDimension {
    pub id: DimensionId,
    pub label: &'static str,
    pub score: f64,
    pub weight: f64,
    pub reason: String,
}

/// All dimensions of one candidate plus the weighted total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseScore {
    pub exercise_id: String,
    pub exercise_name: String,
    pub dimensions: Vec<ScoreDimension>,
    /// Weighted total, 0–100
    pub total: u32,
    /// Matched contraindication, for display
    pub safety: Option<SafetySeverity>,
}

impl ExerciseScore {
    pub fn dimension(&self, id: DimensionId) -> Option<&ScoreDimension> {
        self.dimensions.iter().find(|d| d.id == id)
    }
}

/// What a slot asks for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotRequest {
    pub section: SlotSection,
    #[serde(default)]
    pub pattern: Option<MovementPattern>,
    #[serde(default)]
    pub target_muscles: Vec<MuscleGroup>,
}

static NO_PLAN_USAGE: BTreeSet<String> = BTreeSet::new();

/// Client and plan state a slot is scored against
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub profile: &'a ClientProfile,
    pub goal: TrainingGoal,
    pub sessions_per_week: u32,
    /// Exercises already committed to the session being filled
    pub session: &'a [&'a Exercise],
    /// Exercise ids committed anywhere in the plan
    pub plan_used: &'a BTreeSet<String>,
}

impl<'a> ScoringContext<'a> {
    pub fn new(profile: &'a ClientProfile, goal: TrainingGoal, sessions_per_week: u32) -> Self {
        ScoringContext {
            profile,
            goal,
            sessions_per_week,
            session: &[],
            plan_used: &NO_PLAN_USAGE,
        }
    }

    pub fn with_session(mut self, session: &'a [&'a Exercise]) -> Self {
        self.session = session;
        self
    }

    pub fn with_plan_used(mut self, plan_used: &'a BTreeSet<String>) -> Self {
        self.plan_used = plan_used;
        self
    }

    /// Hours between sessions at the current frequency
    pub fn interval_hours(&self) -> f64 {
        168.0 / f64::from(self.sessions_per_week.max(1))
    }
}

/// Weighted scorer over the 14 dimensions
#[derive(Debug, Clone, Default)]
pub struct ExerciseScorer {
    weights: ScoringWeights,
}

impl ExerciseScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        ExerciseScorer { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score one exercise against a slot
    pub fn score_exercise(
        &self,
        exercise: &Exercise,
        request: &SlotRequest,
        ctx: &ScoringContext<'_>,
    ) -> ExerciseScore {
        let safety = ctx.profile.safety.get(&exercise.id).map(|e| e.severity);

        let dimensions: Vec<ScoreDimension> = DimensionId::all()
            .iter()
            .map(|&id| {
                let (score, reason) = match id {
                    DimensionId::Safety => score_safety(exercise, ctx),
                    DimensionId::MuscleMatch => score_muscle_match(exercise, request),
                    DimensionId::PatternMatch => score_pattern_match(exercise, request),
                    DimensionId::Difficulty => score_difficulty(exercise, ctx),
                    DimensionId::GoalAlignment => score_goal_alignment(exercise, ctx),
                    DimensionId::StrengthLevel => score_strength_level(exercise, ctx),
                    DimensionId::RecoveryFit => score_recovery_fit(exercise, ctx),
                    DimensionId::CompoundPriority => score_compound_priority(exercise),
                    DimensionId::EquipmentVariety => variety(
                        count_in_session(ctx, |e| e.equipment == exercise.equipment),
                        equipment_label(exercise.equipment),
                    ),
                    DimensionId::Uniqueness => score_uniqueness(exercise, ctx),
                    DimensionId::PlaneVariety => variety(
                        count_in_session(ctx, |e| e.plane == exercise.plane),
                        plane_label(exercise.plane),
                    ),
                    DimensionId::ChainVariety => variety(
                        count_in_session(ctx, |e| e.kinetic_chain == exercise.kinetic_chain),
                        chain_label(exercise.kinetic_chain),
                    ),
                    DimensionId::BilateralBalance => score_bilateral_balance(exercise, ctx),
                    DimensionId::ContractionVariety => variety(
                        count_in_session(ctx, |e| e.contraction == exercise.contraction),
                        contraction_label(exercise.contraction),
                    ),
                };
                ScoreDimension {
                    id,
                    label: id.label(),
                    score,
                    weight: self.weights.weight(id),
                    reason,
                }
            })
            .collect();

        let total = weighted_total(&dimensions);

        ExerciseScore {
            exercise_id: exercise.id.clone(),
            exercise_name: exercise.name.clone(),
            dimensions,
            total,
            safety,
        }
    }

    /// Score the candidates that fit the slot's section and rank them
    ///
    /// Sorting is stable, so equal totals keep candidate order.
    #[instrument(skip_all, fields(section = ?request.section, pattern = ?request.pattern))]
    pub fn score_exercises_for_slot<'e, I>(
        &self,
        candidates: I,
        request: &SlotRequest,
        ctx: &ScoringContext<'_>,
    ) -> Vec<ExerciseScore>
    where
        I: IntoIterator<Item = &'e Exercise>,
    {
        let mut scores: Vec<ExerciseScore> = candidates
            .into_iter()
            .filter(|e| request.section.accepts(e.category))
            .map(|e| self.score_exercise(e, request, ctx))
            .collect();
        scores.sort_by(|a, b| b.total.cmp(&a.total));

        debug!(
            candidates = scores.len(),
            top = scores.first().map(|s| s.exercise_id.as_str()),
            "ranked slot candidates"
        );
        scores
    }
}

/// Rank candidates with the default weights
pub fn score_exercises_for_slot<'e, I>(
    candidates: I,
    request: &SlotRequest,
    ctx: &ScoringContext<'_>,
) -> Vec<ExerciseScore>
where
    I: IntoIterator<Item = &'e Exercise>,
{
    ExerciseScorer::new().score_exercises_for_slot(candidates, request, ctx)
}

/// `round(100 × Σ(score × weight) / Σ weight)`; 0 when all weights are zero
pub fn weighted_total(dimensions: &[ScoreDimension]) -> u32 {
    let weight_sum: f64 = dimensions.iter().map(|d| d.weight).sum();
    if weight_sum <= 0.0 {
        return 0;
    }
    let weighted: f64 = dimensions.iter().map(|d| d.score * d.weight).sum();
    (100.0 * weighted / weight_sum).round().clamp(0.0, 100.0) as u32
}

fn score_safety(exercise: &Exercise, ctx: &ScoringContext<'_>) -> (f64, String) {
    match ctx.profile.safety.get(&exercise.id) {
        None => (1.0, "Nessuna controindicazione rilevata".to_string()),
        Some(entry) => {
            let conditions = if entry.conditions.is_empty() {
                "anamnesi".to_string()
            } else {
                entry.conditions.join(", ")
            };
            match entry.severity {
                SafetySeverity::Caution => (0.5, format!("Eseguire con cautela: {}", conditions)),
                SafetySeverity::Avoid => (
                    AVOID_FLOOR,
                    format!("Sconsigliato per {}; decide il trainer", conditions),
                ),
            }
        }
    }
}

fn score_muscle_match(exercise: &Exercise, request: &SlotRequest) -> (f64, String) {
    let targets: BTreeSet<MuscleGroup> = request.target_muscles.iter().copied().collect();
    if targets.is_empty() {
        return (NEUTRAL, "Nessun muscolo target per lo slot".to_string());
    }

    let primary: BTreeSet<MuscleGroup> = exercise.primary_muscles.iter().copied().collect();
    let secondary: BTreeSet<MuscleGroup> = exercise.secondary_only().collect();

    let primary_hits = targets.intersection(&primary).count() as f64;
    let secondary_hits = targets.intersection(&secondary).count() as f64;
    let union = targets.union(&primary).count() as f64;

    let score = ((primary_hits + 0.5 * secondary_hits) / union).min(1.0);
    let reason = if primary_hits > 0.0 {
        format!(
            "Coinvolge {} di {} muscoli target come primari",
            primary_hits as usize,
            targets.len()
        )
    } else if secondary_hits > 0.0 {
        "Muscoli target coinvolti solo come secondari".to_string()
    } else {
        "Non coinvolge i muscoli target".to_string()
    };
    (score, reason)
}

fn score_pattern_match(exercise: &Exercise, request: &SlotRequest) -> (f64, String) {
    let Some(hint) = request.pattern else {
        return (NEUTRAL, "Nessuno schema motorio richiesto".to_string());
    };

    if exercise.pattern == hint {
        (1.0, format!("Schema motorio richiesto: {}", hint.label()))
    } else if hint.force_family() == Some(exercise.force) {
        (
            0.6,
            format!(
                "Stessa famiglia di forza ({} invece di {})",
                exercise.pattern.label(),
                hint.label()
            ),
        )
    } else {
        (
            0.2,
            format!(
                "Schema diverso: {} invece di {}",
                exercise.pattern.label(),
                hint.label()
            ),
        )
    }
}

fn score_difficulty(exercise: &Exercise, ctx: &ScoringContext<'_>) -> (f64, String) {
    let level = ctx.profile.fitness_level;
    let distance = exercise.difficulty.rank() - level.rank();
    match distance {
        0 => (1.0, format!("Adatto al livello {}", level.label())),
        -1 => (0.7, "Più semplice del livello del cliente".to_string()),
        1 => (0.4, "Più impegnativo del livello del cliente".to_string()),
        _ => (0.1, "Difficoltà molto distante dal livello del cliente".to_string()),
    }
}

fn score_goal_alignment(exercise: &Exercise, ctx: &ScoringContext<'_>) -> (f64, String) {
    if exercise.rep_ranges.is_empty() {
        return (NEUTRAL, "Nessuna indicazione di ripetizioni per obiettivo".to_string());
    }
    match exercise.rep_ranges.get(&ctx.goal) {
        Some(range) => (
            1.0,
            format!("Programmabile per {} ({} ripetizioni)", ctx.goal.label(), range),
        ),
        None => (0.3, format!("Non previsto per l'obiettivo {}", ctx.goal.label())),
    }
}

fn score_strength_level(exercise: &Exercise, ctx: &ScoringContext<'_>) -> (f64, String) {
    let Some(ratio) = ctx
        .profile
        .strength_ratios
        .iter()
        .find(|r| r.pattern == exercise.pattern)
    else {
        return (NEUTRAL, "Nessun test di forza per questo schema".to_string());
    };

    let distance = (exercise.difficulty.rank() - ratio.rating.as_level().rank()).abs();
    let score = match distance {
        0 => 1.0,
        1 => 0.6,
        _ => 0.2,
    };
    (
        score,
        format!(
            "Forza su {}: {} ({:.2}× peso corporeo)",
            ratio.lift,
            ratio.rating.label(),
            ratio.ratio
        ),
    )
}

fn score_recovery_fit(exercise: &Exercise, ctx: &ScoringContext<'_>) -> (f64, String) {
    let required = f64::from(exercise.recovery_hours);
    let available = ctx.interval_hours();
    let hours = exercise.recovery_hours;
    if required <= available {
        (
            1.0,
            format!("Recupero di {}h compatibile con {:.0}h disponibili", hours, available),
        )
    } else if required <= available * 1.5 {
        (
            0.6,
            format!("Recupero di {}h al limite ({:.0}h disponibili)", hours, available),
        )
    } else {
        (
            0.2,
            format!("Recupero di {}h oltre le {:.0}h disponibili", hours, available),
        )
    }
}

fn score_compound_priority(exercise: &Exercise) -> (f64, String) {
    match exercise.category {
        ExerciseCategory::Compound => (1.0, "Esercizio multiarticolare".to_string()),
        ExerciseCategory::Bodyweight => (0.7, "Esercizio a corpo libero".to_string()),
        ExerciseCategory::Isolation => (0.4, "Esercizio di isolamento".to_string()),
        ExerciseCategory::Cardio | ExerciseCategory::Mobility | ExerciseCategory::Stretching => {
            (NEUTRAL, "Categoria non rilevante per la priorità".to_string())
        }
    }
}

fn score_uniqueness(exercise: &Exercise, ctx: &ScoringContext<'_>) -> (f64, String) {
    if ctx.session.iter().any(|e| e.id == exercise.id) {
        (0.0, "Già presente in questa seduta".to_string())
    } else if ctx.plan_used.contains(&exercise.id) {
        (0.3, "Già usato in un'altra seduta del piano".to_string())
    } else {
        (1.0, "Non ancora usato nel piano".to_string())
    }
}

fn score_bilateral_balance(exercise: &Exercise, ctx: &ScoringContext<'_>) -> (f64, String) {
    let deficits = &ctx.profile.symmetry_deficits;
    if deficits.is_empty() {
        return (NEUTRAL, "Nessuna asimmetria misurata".to_string());
    }

    let unilateral = exercise.laterality == LateralPattern::Unilateral;
    let targeted = deficits
        .iter()
        .find(|d| d.pair.muscles().iter().any(|m| exercise.works(*m)));

    match (unilateral, targeted) {
        (true, Some(deficit)) => (
            1.0,
            format!(
                "Lavoro unilaterale utile per l'asimmetria {} ({:.1} cm)",
                deficit.pair.label(),
                deficit.delta_cm
            ),
        ),
        (true, None) => (0.7, "Lavoro unilaterale".to_string()),
        (false, _) => (0.4, "Esercizio bilaterale con asimmetria presente".to_string()),
    }
}

fn count_in_session(ctx: &ScoringContext<'_>, same: impl Fn(&Exercise) -> bool) -> usize {
    ctx.session.iter().filter(|e| same(e)).count()
}

fn variety(repeats: usize, what: &str) -> (f64, String) {
    match repeats {
        0 => (1.0, format!("{}: nuovo nella seduta", what)),
        1 => (0.6, format!("{}: già presente una volta", what)),
        n => (0.3, format!("{}: già presente {} volte", what, n)),
    }
}

fn equipment_label(equipment: Equipment) -> &'static str {
    match equipment {
        Equipment::Barbell => "Bilanciere",
        Equipment::Dumbbell => "Manubri",
        Equipment::Kettlebell => "Kettlebell",
        Equipment::Machine => "Macchina",
        Equipment::Cable => "Cavi",
        Equipment::Band => "Elastici",
        Equipment::Bodyweight => "Corpo libero",
        Equipment::Cardio => "Attrezzo cardio",
        Equipment::Other => "Altro attrezzo",
    }
}

fn plane_label(plane: MovementPlane) -> &'static str {
    match plane {
        MovementPlane::Sagittal => "Piano sagittale",
        MovementPlane::Frontal => "Piano frontale",
        MovementPlane::Transverse => "Piano trasverso",
        MovementPlane::Multiplanar => "Multiplanare",
    }
}

fn chain_label(chain: KineticChain) -> &'static str {
    match chain {
        KineticChain::Open => "Catena aperta",
        KineticChain::Closed => "Catena chiusa",
    }
}

fn contraction_label(contraction: ContractionType) -> &'static str {
    match contraction {
        ContractionType::Isotonic => "Isotonica",
        ContractionType::Isometric => "Isometrica",
        ContractionType::Eccentric => "Eccentrica",
        ContractionType::Plyometric => "Pliometrica",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DifficultyTier, FitnessLevel, ForceType, LimbPair, RepRange, SafetyEntry, Severity,
        StrengthRating, StrengthRatio, SymmetryDeficit,
    };
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn exercise(
        id: &str,
        category: ExerciseCategory,
        pattern: MovementPattern,
        primary: &[MuscleGroup],
    ) -> Exercise {
        Exercise {
            id: id.to_string(),
            name: id.replace('_', " "),
            category,
            pattern,
            primary_muscles: primary.to_vec(),
            secondary_muscles: vec![],
            equipment: Equipment::Barbell,
            difficulty: DifficultyTier::Beginner,
            force: ForceType::Push,
            laterality: LateralPattern::Bilateral,
            kinetic_chain: KineticChain::Closed,
            plane: MovementPlane::Sagittal,
            contraction: ContractionType::Isotonic,
            rep_ranges: BTreeMap::new(),
            recovery_hours: 48,
        }
    }

    fn bench() -> Exercise {
        let mut e = exercise(
            "panca_piana",
            ExerciseCategory::Compound,
            MovementPattern::HorizontalPush,
            &[MuscleGroup::Chest],
        );
        e.secondary_muscles = vec![MuscleGroup::Triceps, MuscleGroup::Shoulders];
        e
    }

    fn main_request(pattern: Option<MovementPattern>, targets: &[MuscleGroup]) -> SlotRequest {
        SlotRequest {
            section: SlotSection::Main,
            pattern,
            target_muscles: targets.to_vec(),
        }
    }

    fn score_of(score: &ExerciseScore, id: DimensionId) -> f64 {
        score.dimension(id).unwrap().score
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((ScoringWeights::default().total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_safety_scores() {
        let e = bench();
        let req = main_request(None, &[]);
        let mut profile = ClientProfile::default();
        let scorer = ExerciseScorer::new();

        let ctx = ScoringContext::new(&profile, TrainingGoal::Hypertrophy, 3);
        let s = scorer.score_exercise(&e, &req, &ctx);
        assert_eq!(score_of(&s, DimensionId::Safety), 1.0);
        assert!(s.safety.is_none());

        profile.safety.insert(
            "panca_piana".to_string(),
            SafetyEntry {
                severity: SafetySeverity::Avoid,
                conditions: vec!["lussazione spalla".to_string()],
            },
        );
        let ctx = ScoringContext::new(&profile, TrainingGoal::Hypertrophy, 3);
        let s = scorer.score_exercise(&e, &req, &ctx);
        assert_eq!(score_of(&s, DimensionId::Safety), AVOID_FLOOR);
        assert_eq!(s.safety, Some(SafetySeverity::Avoid));
        assert!(s.dimension(DimensionId::Safety).unwrap().reason.contains("lussazione spalla"));
    }

    #[test]
    fn test_muscle_match() {
        let e = bench();
        let (score, _) = score_muscle_match(&e, &main_request(None, &[MuscleGroup::Chest]));
        assert_eq!(score, 1.0);

        // 1 primary hit + 0.5 × 1 secondary hit over |{chest, triceps}| = 2
        let chest_and_triceps = main_request(None, &[MuscleGroup::Chest, MuscleGroup::Triceps]);
        let (score, _) = score_muscle_match(&e, &chest_and_triceps);
        assert_eq!(score, 0.75);

        let (score, _) = score_muscle_match(&e, &main_request(None, &[MuscleGroup::Triceps]));
        assert_eq!(score, 0.25);

        let (score, _) = score_muscle_match(&e, &main_request(None, &[MuscleGroup::Quadriceps]));
        assert_eq!(score, 0.0);

        let (score, _) = score_muscle_match(&e, &main_request(None, &[]));
        assert_eq!(score, NEUTRAL);
    }

    #[test]
    fn test_pattern_match() {
        let e = bench();
        let hinted = |e: &Exercise, pattern: MovementPattern| {
            score_pattern_match(e, &main_request(Some(pattern), &[])).0
        };
        assert_eq!(hinted(&e, MovementPattern::HorizontalPush), 1.0);
        assert_eq!(hinted(&e, MovementPattern::VerticalPush), 0.6);
        assert_eq!(hinted(&e, MovementPattern::Squat), 0.6);
        assert_eq!(hinted(&e, MovementPattern::VerticalPull), 0.2);
        assert_eq!(score_pattern_match(&e, &main_request(None, &[])).0, NEUTRAL);

        let mut curl = exercise(
            "curl",
            ExerciseCategory::Isolation,
            MovementPattern::Isolation,
            &[MuscleGroup::Biceps],
        );
        curl.force = ForceType::Pull;
        assert_eq!(hinted(&curl, MovementPattern::VerticalPull), 0.6);
        assert_eq!(hinted(&curl, MovementPattern::HorizontalPush), 0.2);
        assert_eq!(hinted(&curl, MovementPattern::Cardio), 0.2);
    }

    #[test]
    fn test_pattern_family_follows_declared_force() {
        // hinge by pattern, push by force
        let mut thrust = exercise(
            "hip_thrust",
            ExerciseCategory::Compound,
            MovementPattern::Hinge,
            &[MuscleGroup::Glutes],
        );
        thrust.force = ForceType::Push;
        let squat_slot = main_request(Some(MovementPattern::Squat), &[]);
        let row_slot = main_request(Some(MovementPattern::HorizontalPull), &[]);
        assert_eq!(score_pattern_match(&thrust, &squat_slot).0, 0.6);
        assert_eq!(score_pattern_match(&thrust, &row_slot).0, 0.2);
        assert_eq!(
            score_pattern_match(&thrust, &main_request(Some(MovementPattern::Hinge), &[])).0,
            1.0
        );
    }

    #[test]
    fn test_difficulty_distance() {
        let mut profile = ClientProfile::default();
        profile.fitness_level = FitnessLevel::Intermediate;
        let ctx = ScoringContext::new(&profile, TrainingGoal::Strength, 3);
        let mut e = bench();

        e.difficulty = DifficultyTier::Intermediate;
        assert_eq!(score_difficulty(&e, &ctx).0, 1.0);
        e.difficulty = DifficultyTier::Beginner;
        assert_eq!(score_difficulty(&e, &ctx).0, 0.7);
        e.difficulty = DifficultyTier::Advanced;
        assert_eq!(score_difficulty(&e, &ctx).0, 0.4);

        profile.fitness_level = FitnessLevel::Beginner;
        let ctx = ScoringContext::new(&profile, TrainingGoal::Strength, 3);
        assert_eq!(score_difficulty(&e, &ctx).0, 0.1);
    }

    #[test]
    fn test_goal_alignment() {
        let profile = ClientProfile::default();
        let ctx = ScoringContext::new(&profile, TrainingGoal::Strength, 3);
        let mut e = bench();
        assert_eq!(score_goal_alignment(&e, &ctx).0, NEUTRAL);

        e.rep_ranges.insert(TrainingGoal::Hypertrophy, RepRange::new(8, 12));
        assert_eq!(score_goal_alignment(&e, &ctx).0, 0.3);

        e.rep_ranges.insert(TrainingGoal::Strength, RepRange::new(3, 6));
        assert_eq!(score_goal_alignment(&e, &ctx).0, 1.0);
    }

    #[test]
    fn test_strength_level_match() {
        let mut profile = ClientProfile::default();
        let e = bench();
        let ctx = ScoringContext::new(&profile, TrainingGoal::Strength, 3);
        assert_eq!(score_strength_level(&e, &ctx).0, NEUTRAL);

        profile.strength_ratios.push(StrengthRatio {
            lift: "panca piana".to_string(),
            pattern: MovementPattern::HorizontalPush,
            ratio: 1.5,
            rating: StrengthRating::Elite,
        });
        // Beginner exercise vs advanced-equivalent rating
        let ctx = ScoringContext::new(&profile, TrainingGoal::Strength, 3);
        assert_eq!(score_strength_level(&e, &ctx).0, 0.2);
    }

    #[test]
    fn test_recovery_fit() {
        let profile = ClientProfile::default();
        let mut e = bench();
        e.recovery_hours = 72;

        // 168 / 2 = 84h available
        let fit = |spw: u32| {
            let ctx = ScoringContext::new(&profile, TrainingGoal::Strength, spw);
            score_recovery_fit(&e, &ctx).0
        };
        assert_eq!(fit(2), 1.0);
        // 168 / 3 = 56h, 72 ≤ 84
        assert_eq!(fit(3), 0.6);
        // 168 / 6 = 28h, 72 > 42
        assert_eq!(fit(6), 0.2);
    }

    #[test]
    fn test_uniqueness_levels() {
        let profile = ClientProfile::default();
        let e = bench();
        let other = exercise(
            "squat",
            ExerciseCategory::Compound,
            MovementPattern::Squat,
            &[MuscleGroup::Quadriceps],
        );

        let ctx = ScoringContext::new(&profile, TrainingGoal::Strength, 3);
        assert_eq!(score_uniqueness(&e, &ctx).0, 1.0);

        let used: BTreeSet<String> = ["panca_piana".to_string()].into_iter().collect();
        let ctx = ScoringContext::new(&profile, TrainingGoal::Strength, 3).with_plan_used(&used);
        assert_eq!(score_uniqueness(&e, &ctx).0, 0.3);

        let session = [&other, &e];
        let ctx = ScoringContext::new(&profile, TrainingGoal::Strength, 3)
            .with_session(&session)
            .with_plan_used(&used);
        assert_eq!(score_uniqueness(&e, &ctx).0, 0.0);
    }

    #[test]
    fn test_variety_dimensions() {
        let profile = ClientProfile::default();
        let e = bench();
        let squat = exercise(
            "squat",
            ExerciseCategory::Compound,
            MovementPattern::Squat,
            &[MuscleGroup::Quadriceps],
        );
        let mut row = exercise(
            "rematore",
            ExerciseCategory::Compound,
            MovementPattern::HorizontalPull,
            &[MuscleGroup::Back],
        );
        row.equipment = Equipment::Cable;
        row.plane = MovementPlane::Transverse;

        let session = [&squat, &row];
        let ctx = ScoringContext::new(&profile, TrainingGoal::Strength, 3).with_session(&session);
        let s = ExerciseScorer::new().score_exercise(&e, &main_request(None, &[]), &ctx);

        assert_eq!(score_of(&s, DimensionId::EquipmentVariety), 0.6);
        assert_eq!(score_of(&s, DimensionId::PlaneVariety), 0.6);
        assert_eq!(score_of(&s, DimensionId::ChainVariety), 0.3);
        assert_eq!(score_of(&s, DimensionId::ContractionVariety), 0.3);
    }

    #[test]
    fn test_bilateral_balance() {
        let mut profile = ClientProfile::default();
        let mut lunge = exercise(
            "affondi",
            ExerciseCategory::Compound,
            MovementPattern::Lunge,
            &[MuscleGroup::Quadriceps],
        );
        lunge.laterality = LateralPattern::Unilateral;
        let mut one_arm_row = exercise(
            "rematore_1_braccio",
            ExerciseCategory::Compound,
            MovementPattern::HorizontalPull,
            &[MuscleGroup::Back],
        );
        one_arm_row.laterality = LateralPattern::Unilateral;
        let squat = exercise(
            "squat",
            ExerciseCategory::Compound,
            MovementPattern::Squat,
            &[MuscleGroup::Quadriceps],
        );

        let ctx = ScoringContext::new(&profile, TrainingGoal::Strength, 3);
        assert_eq!(score_bilateral_balance(&lunge, &ctx).0, NEUTRAL);

        profile.symmetry_deficits.push(SymmetryDeficit {
            pair: LimbPair::Thigh,
            delta_cm: 2.0,
            severity: Severity::Warning,
        });
        let ctx = ScoringContext::new(&profile, TrainingGoal::Strength, 3);
        assert_eq!(score_bilateral_balance(&lunge, &ctx).0, 1.0);
        assert_eq!(score_bilateral_balance(&one_arm_row, &ctx).0, 0.7);
        assert_eq!(score_bilateral_balance(&squat, &ctx).0, 0.4);
    }

    #[test]
    fn test_ranking_filters_section_and_is_stable() {
        let profile = ClientProfile::default();
        let a = exercise(
            "a",
            ExerciseCategory::Compound,
            MovementPattern::Squat,
            &[MuscleGroup::Quadriceps],
        );
        let b = exercise(
            "b",
            ExerciseCategory::Compound,
            MovementPattern::Squat,
            &[MuscleGroup::Quadriceps],
        );
        let stretch = exercise(
            "stretch",
            ExerciseCategory::Stretching,
            MovementPattern::Stretch,
            &[MuscleGroup::Quadriceps],
        );
        let curl = exercise(
            "curl",
            ExerciseCategory::Isolation,
            MovementPattern::Isolation,
            &[MuscleGroup::Biceps],
        );

        let candidates = vec![curl.clone(), a.clone(), stretch, b.clone()];
        let ctx = ScoringContext::new(&profile, TrainingGoal::Strength, 3);
        let req = main_request(Some(MovementPattern::Squat), &[MuscleGroup::Quadriceps]);
        let ranked = score_exercises_for_slot(&candidates, &req, &ctx);

        let ids: Vec<&str> = ranked.iter().map(|s| s.exercise_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "curl"]);
        assert!(ranked.windows(2).all(|w| w[0].total >= w[1].total));
    }

    #[test]
    fn test_zero_weights_total() {
        let scorer = ExerciseScorer::with_weights(ScoringWeights {
            safety: 0.0,
            muscle_match: 0.0,
            pattern_match: 0.0,
            difficulty: 0.0,
            goal_alignment: 0.0,
            strength_level: 0.0,
            recovery_fit: 0.0,
            compound_priority: 0.0,
            equipment_variety: 0.0,
            uniqueness: 0.0,
            plane_variety: 0.0,
            chain_variety: 0.0,
            bilateral_balance: 0.0,
            contraction_variety: 0.0,
        });
        let profile = ClientProfile::default();
        let ctx = ScoringContext::new(&profile, TrainingGoal::Strength, 3);
        let s = scorer.score_exercise(&bench(), &main_request(None, &[]), &ctx);
        assert_eq!(s.total, 0);
    }

    fn any_category() -> impl Strategy<Value = ExerciseCategory> {
        prop_oneof![
            Just(ExerciseCategory::Compound),
            Just(ExerciseCategory::Isolation),
            Just(ExerciseCategory::Bodyweight),
        ]
    }

    fn any_muscle() -> impl Strategy<Value = MuscleGroup> {
        (0..MuscleGroup::all().len()).prop_map(|i| MuscleGroup::all()[i])
    }

    proptest! {
        #[test]
        fn prop_total_is_weighted_mean(
            category in any_category(),
            primary in proptest::collection::vec(any_muscle(), 0..3),
            targets in proptest::collection::vec(any_muscle(), 0..4),
            recovery in 12u32..120,
            sessions in 1u32..8,
            avoid in any::<bool>(),
        ) {
            let mut e = exercise("x", category, MovementPattern::Hinge, &primary);
            e.recovery_hours = recovery;
            let mut profile = ClientProfile::default();
            if avoid {
                profile.safety.insert("x".to_string(), SafetyEntry {
                    severity: SafetySeverity::Avoid,
                    conditions: vec![],
                });
            }
            let ctx = ScoringContext::new(&profile, TrainingGoal::Hypertrophy, sessions);
            let req = main_request(Some(MovementPattern::Squat), &targets);
            let s = ExerciseScorer::new().score_exercise(&e, &req, &ctx);

            prop_assert_eq!(s.dimensions.len(), 14);
            let weight_sum: f64 = s.dimensions.iter().map(|d| d.weight).sum();
            prop_assert!((weight_sum - 1.0).abs() < 1e-9);
            let weighted: f64 = s.dimensions.iter().map(|d| d.score * d.weight).sum();
            let expected = (100.0 * weighted / weight_sum).round() as u32;
            prop_assert_eq!(s.total, expected);
            prop_assert!(s.dimensions.iter().all(|d| (0.0..=1.0).contains(&d.score)));

            let safety = s.dimension(DimensionId::Safety).unwrap().score;
            prop_assert!(safety >= AVOID_FLOOR);

            let again = ExerciseScorer::new().score_exercise(&e, &req, &ctx);
            prop_assert_eq!(s, again);
        }
    }
}
