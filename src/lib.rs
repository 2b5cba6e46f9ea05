// Library interface for coachrs
// The binary and the integration tests both drive the engine through here.

pub mod analysis;
pub mod catalog;
pub mod clinical;
pub mod config;
pub mod correlation;
pub mod error;
pub mod logging;
pub mod models;
pub mod normative;
pub mod plan;
pub mod profile;
pub mod scoring;
pub mod split;

// Re-export commonly used types for convenience
pub use models::*;
pub use analysis::{
    analyze_plan, compute_muscle_coverage, PlanAnalysis, PlanSession, PlannedExercise,
};
pub use catalog::ExerciseCatalog;
pub use clinical::{generate_report, ClinicalAnalysisEngine, ClinicalReport, ReportContext};
pub use config::EngineConfig;
pub use correlation::{analyze_correlations, CorrelationInsight};
pub use error::{CoachError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use normative::{classify, NormativeClassifier, NormativeMetric};
pub use plan::{
    fill_smart_plan, generate_smart_plan, FilledPlan, PlanRequest, SmartPlan, SmartPlanGenerator,
};
pub use profile::{ClientProfile, ClientProfileBuilder, ClientRecord};
pub use scoring::{
    score_exercises_for_slot, ExerciseScore, ExerciseScorer, ScoringContext, SlotRequest,
};
pub use split::select_split;
