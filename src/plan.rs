//! Smart plan generation
//!
//! Generation runs in two steps:
//!
//! 1. [`SmartPlanGenerator::generate_smart_plan`] picks a split and expands
//!    every session into slots: warm-up, one main slot per required movement
//!    pattern, accessory slots for focus muscles the patterns miss, and
//!    closing stretches for the muscles worked.
//! 2. [`SmartPlanGenerator::fill_smart_plan`] walks sessions and slots in
//!    order, ranks the catalog for each slot and commits the top candidate.
//!
//! Filling is greedy and order dependent: a committed exercise is never
//! revisited, so an early session can take the best option for a pattern and
//! leave a weaker one for later sessions. The session-local and plan-wide
//! usage sets are threaded through the walk as an explicit accumulator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

use crate::analysis::{PlanSession, PlannedExercise};
use crate::catalog::ExerciseCatalog;
use crate::config::EngineConfig;
use crate::models::{
    Exercise, FitnessLevel, MovementPattern, MuscleGroup, RepRange, SlotSection, TrainingGoal,
};
use crate::profile::ClientProfile;
use crate::scoring::{ExerciseScore, ExerciseScorer, ScoringContext, SlotRequest};
use crate::split::{clamp_sessions, select_split, SessionTemplate};

/// Accessory muscles in the order gaps are filled
pub const ACCESSORY_PRIORITY: [MuscleGroup; 6] = [
    MuscleGroup::Calves,
    MuscleGroup::Biceps,
    MuscleGroup::Triceps,
    MuscleGroup::Adductors,
    MuscleGroup::Forearms,
    MuscleGroup::Trapezius,
];

/// Plan generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningSettings {
    /// Ranked alternatives kept per filled slot
    pub candidates_per_slot: usize,
}

impl Default for PlanningSettings {
    fn default() -> Self {
        PlanningSettings {
            candidates_per_slot: 5,
        }
    }
}

/// What the trainer asks for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub goal: TrainingGoal,
    pub sessions_per_week: u32,
    #[serde(default = "default_weeks")]
    pub weeks: u32,
}

fn default_weeks() -> u32 {
    8
}

/// Sets, reps and rest for one slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub sets: u32,
    pub reps: Option<RepRange>,
    pub rest_seconds: u32,
    /// Timed work (cardio warm-up, static stretch)
    pub hold_seconds: Option<u32>,
}

impl Prescription {
    /// Main-block prescription for a training goal
    pub fn for_goal(goal: TrainingGoal) -> Self {
        match goal {
            TrainingGoal::Strength => Prescription {
                sets: 4,
                reps: Some(RepRange::new(5, 6)),
                rest_seconds: 120,
                hold_seconds: None,
            },
            _ => Prescription {
                sets: 3,
                reps: Some(RepRange::new(8, 12)),
                rest_seconds: 90,
                hold_seconds: None,
            },
        }
    }

    pub fn accessory() -> Self {
        Prescription {
            sets: 3,
            reps: Some(RepRange::new(10, 15)),
            rest_seconds: 60,
            hold_seconds: None,
        }
    }

    pub fn general_warm_up() -> Self {
        Prescription {
            sets: 1,
            reps: None,
            rest_seconds: 0,
            hold_seconds: Some(300),
        }
    }

    pub fn mobility() -> Self {
        Prescription {
            sets: 2,
            reps: Some(RepRange::new(10, 12)),
            rest_seconds: 30,
            hold_seconds: None,
        }
    }

    pub fn stretch() -> Self {
        Prescription {
            sets: 2,
            reps: None,
            rest_seconds: 0,
            hold_seconds: Some(30),
        }
    }
}

/// One planned exercise position before an exercise is assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartSlot {
    pub section: SlotSection,
    pub pattern: Option<MovementPattern>,
    pub target_muscles: Vec<MuscleGroup>,
    pub prescription: Prescription,
    /// Short description for display
    pub note: String,
}

impl SmartSlot {
    pub fn request(&self) -> SlotRequest {
        SlotRequest {
            section: self.section,
            pattern: self.pattern,
            target_muscles: self.target_muscles.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartSession {
    pub name: String,
    pub focus: Vec<MuscleGroup>,
    pub slots: Vec<SmartSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartPlan {
    pub split_name: String,
    pub level: FitnessLevel,
    pub goal: TrainingGoal,
    pub weeks: u32,
    pub sessions_per_week: u32,
    pub sessions: Vec<SmartSession>,
}

/// A slot with its committed exercise and ranked alternatives
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilledSlot {
    pub slot: SmartSlot,
    pub exercise_id: Option<String>,
    pub exercise_name: Option<String>,
    pub candidates: Vec<ExerciseScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilledSession {
    pub name: String,
    pub slots: Vec<FilledSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilledPlan {
    pub split_name: String,
    pub level: FitnessLevel,
    pub goal: TrainingGoal,
    pub weeks: u32,
    pub sessions_per_week: u32,
    pub sessions: Vec<FilledSession>,
}

impl FilledPlan {
    /// Convert into the plan-editing format; unfilled slots are dropped
    pub fn to_plan_sessions(&self) -> Vec<PlanSession> {
        self.sessions
            .iter()
            .map(|session| PlanSession {
                name: session.name.clone(),
                exercises: session
                    .slots
                    .iter()
                    .filter_map(|filled| {
                        let id = filled.exercise_id.clone()?;
                        let p = filled.slot.prescription;
                        Some(PlannedExercise {
                            exercise_id: id,
                            section: filled.slot.section,
                            sets: p.sets,
                            reps: p.reps,
                            rest_seconds: p.rest_seconds,
                        })
                    })
                    .collect(),
            })
            .collect()
    }

    /// Ids of all committed exercises, plan order
    pub fn exercise_ids(&self) -> impl Iterator<Item = &str> {
        self.sessions
            .iter()
            .flat_map(|s| s.slots.iter())
            .filter_map(|slot| slot.exercise_id.as_deref())
    }
}

/// Usage state threaded through the slots of one session
struct SessionAccumulator<'c> {
    plan_used: BTreeSet<String>,
    exercises: Vec<&'c Exercise>,
    slots: Vec<FilledSlot>,
}

/// Usage state threaded through the sessions of a plan
#[derive(Default)]
struct PlanAccumulator {
    plan_used: BTreeSet<String>,
    sessions: Vec<FilledSession>,
}

/// Generates and fills smart plans
#[derive(Debug, Clone, Default)]
pub struct SmartPlanGenerator {
    scorer: ExerciseScorer,
    settings: PlanningSettings,
}

impl SmartPlanGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        SmartPlanGenerator {
            scorer: ExerciseScorer::with_weights(config.scoring.clone()),
            settings: config.planning.clone(),
        }
    }

    /// Build the slot skeleton of a plan
    #[instrument(skip(self), fields(goal = ?request.goal))]
    pub fn generate_smart_plan(&self, request: &PlanRequest, level: FitnessLevel) -> SmartPlan {
        let sessions_per_week = clamp_sessions(request.sessions_per_week);
        let split = select_split(sessions_per_week, level);

        let sessions = split
            .sessions
            .iter()
            .map(|template| expand_session(template, level, request.goal))
            .collect::<Vec<_>>();

        info!(
            split = split.name,
            sessions = sessions.len(),
            slots = sessions.iter().map(|s| s.slots.len()).sum::<usize>(),
            "generated plan skeleton"
        );

        SmartPlan {
            split_name: split.name.to_string(),
            level,
            goal: request.goal,
            weeks: request.weeks,
            sessions_per_week,
            sessions,
        }
    }

    /// Assign exercises to every slot, greedily, in plan order
    #[instrument(skip_all, fields(split = %plan.split_name, catalog = catalog.len()))]
    pub fn fill_smart_plan(
        &self,
        plan: &SmartPlan,
        catalog: &ExerciseCatalog,
        profile: &ClientProfile,
    ) -> FilledPlan {
        let filled = plan
            .sessions
            .iter()
            .fold(PlanAccumulator::default(), |acc, session| {
                self.fill_session(acc, session, plan, catalog, profile)
            });

        FilledPlan {
            split_name: plan.split_name.clone(),
            level: plan.level,
            goal: plan.goal,
            weeks: plan.weeks,
            sessions_per_week: plan.sessions_per_week,
            sessions: filled.sessions,
        }
    }

    fn fill_session(
        &self,
        acc: PlanAccumulator,
        session: &SmartSession,
        plan: &SmartPlan,
        catalog: &ExerciseCatalog,
        profile: &ClientProfile,
    ) -> PlanAccumulator {
        let start = SessionAccumulator {
            plan_used: acc.plan_used,
            exercises: Vec::new(),
            slots: Vec::new(),
        };
        let done = session.slots.iter().fold(start, |state, slot| {
            self.fill_slot(state, slot, plan, catalog, profile)
        });

        let mut sessions = acc.sessions;
        sessions.push(FilledSession {
            name: session.name.clone(),
            slots: done.slots,
        });
        PlanAccumulator {
            plan_used: done.plan_used,
            sessions,
        }
    }

    fn fill_slot<'c>(
        &self,
        mut state: SessionAccumulator<'c>,
        slot: &SmartSlot,
        plan: &SmartPlan,
        catalog: &'c ExerciseCatalog,
        profile: &ClientProfile,
    ) -> SessionAccumulator<'c> {
        let ranked = {
            let ctx = ScoringContext::new(profile, plan.goal, plan.sessions_per_week)
                .with_session(&state.exercises)
                .with_plan_used(&state.plan_used);
            self.scorer.score_exercises_for_slot(
                catalog.for_section(slot.section),
                &slot.request(),
                &ctx,
            )
        };

        let chosen = ranked.first().and_then(|top| catalog.get(&top.exercise_id));
        if let Some(exercise) = chosen {
            debug!(exercise = %exercise.id, section = ?slot.section, "committed slot");
            state.plan_used.insert(exercise.id.clone());
            state.exercises.push(exercise);
        } else {
            debug!(section = ?slot.section, "no candidate for slot");
        }

        state.slots.push(FilledSlot {
            slot: slot.clone(),
            exercise_id: chosen.map(|e| e.id.clone()),
            exercise_name: chosen.map(|e| e.name.clone()),
            candidates: ranked
                .into_iter()
                .take(self.settings.candidates_per_slot)
                .collect(),
        });
        state
    }
}

/// Skeleton with default settings
pub fn generate_smart_plan(request: &PlanRequest, level: FitnessLevel) -> SmartPlan {
    SmartPlanGenerator::new().generate_smart_plan(request, level)
}

/// Fill with default weights and settings
pub fn fill_smart_plan(
    plan: &SmartPlan,
    catalog: &ExerciseCatalog,
    profile: &ClientProfile,
) -> FilledPlan {
    SmartPlanGenerator::new().fill_smart_plan(plan, catalog, profile)
}

fn expand_session(
    template: &SessionTemplate,
    level: FitnessLevel,
    goal: TrainingGoal,
) -> SmartSession {
    let mut slots = warm_up_slots(template, level);

    let main = Prescription::for_goal(goal);
    slots.extend(template.patterns.iter().map(|pattern| SmartSlot {
        section: SlotSection::Main,
        pattern: Some(*pattern),
        target_muscles: pattern.prime_movers().to_vec(),
        prescription: main,
        note: format!("Principale: {}", pattern.label()),
    }));

    let covered: BTreeSet<MuscleGroup> = template
        .patterns
        .iter()
        .flat_map(|p| p.prime_movers().iter().copied())
        .collect();
    let accessory_limit = if level == FitnessLevel::Beginner { 1 } else { 2 };
    slots.extend(
        ACCESSORY_PRIORITY
            .iter()
            .filter(|m| template.focus.contains(m) && !covered.contains(m))
            .take(accessory_limit)
            .map(|muscle| SmartSlot {
                section: SlotSection::Main,
                pattern: Some(MovementPattern::Isolation),
                target_muscles: vec![*muscle],
                prescription: Prescription::accessory(),
                note: format!("Complementare: {}", muscle.label()),
            }),
    );

    let worked = worked_muscles(&slots);
    slots.extend(stretch_slots(&worked));

    SmartSession {
        name: template.name.to_string(),
        focus: template.focus.to_vec(),
        slots,
    }
}

fn warm_up_slots(template: &SessionTemplate, level: FitnessLevel) -> Vec<SmartSlot> {
    let count = if level == FitnessLevel::Beginner { 2 } else { 3 };

    let general = SmartSlot {
        section: SlotSection::WarmUp,
        pattern: Some(MovementPattern::Cardio),
        target_muscles: Vec::new(),
        prescription: Prescription::general_warm_up(),
        note: "Riscaldamento generale".to_string(),
    };

    let mobility = template
        .patterns
        .iter()
        .cycle()
        .take(count - 1)
        .map(|pattern| SmartSlot {
            section: SlotSection::WarmUp,
            pattern: Some(MovementPattern::Mobility),
            target_muscles: pattern.prime_movers().to_vec(),
            prescription: Prescription::mobility(),
            note: format!("Mobilità per {}", pattern.label()),
        });

    std::iter::once(general).chain(mobility).collect()
}

/// Main-block target muscles, first appearance order
fn worked_muscles(slots: &[SmartSlot]) -> Vec<MuscleGroup> {
    let mut seen = BTreeSet::new();
    slots
        .iter()
        .filter(|s| s.section == SlotSection::Main)
        .flat_map(|s| s.target_muscles.iter().copied())
        .filter(|m| seen.insert(*m))
        .collect()
}

fn stretch_slots(worked: &[MuscleGroup]) -> Vec<SmartSlot> {
    let count = if worked.len() >= 5 { 3 } else { 2 };
    (0..count)
        .map(|i| {
            let targets: Vec<MuscleGroup> = worked.iter().copied().skip(i).step_by(count).collect();
            let note = targets
                .iter()
                .map(|m| m.label())
                .collect::<Vec<_>>()
                .join(", ");
            SmartSlot {
                section: SlotSection::Stretch,
                pattern: Some(MovementPattern::Stretch),
                target_muscles: targets,
                prescription: Prescription::stretch(),
                note: format!("Allungamento: {}", note),
            }
        })
        .collect()
}
