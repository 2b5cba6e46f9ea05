//! Weekly split selection
//!
//! Maps (sessions per week × fitness level) onto a named split. Each session
//! template lists the movement patterns its main block must cover and the
//! muscle groups it focuses on.
//!
//! | Sessions | Beginner                  | Intermediate / Advanced |
//! |----------|---------------------------|-------------------------|
//! | 2        | Full Body A/B             | Full Body A/B           |
//! | 3        | Full Body A/B/C           | Push/Pull/Legs          |
//! | 4        | Upper/Lower ×2            | Upper/Lower ×2          |
//! | 5        | Upper/Lower/Full Body/Upper/Lower | Push/Pull/Legs/Upper/Lower |
//! | 6        | Push/Pull/Legs ×2         | Push/Pull/Legs ×2       |

use serde::Serialize;
use tracing::warn;

use crate::models::{FitnessLevel, MovementPattern, MuscleGroup};

pub const MIN_SESSIONS: u32 = 2;
pub const MAX_SESSIONS: u32 = 6;

/// One session of a split
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionTemplate {
    pub name: &'static str,
    pub focus: &'static [MuscleGroup],
    /// Patterns required in the main block, in order
    pub patterns: &'static [MovementPattern],
}

/// A named weekly split
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SplitTemplate {
    pub name: &'static str,
    pub sessions: &'static [&'static SessionTemplate],
}

impl SplitTemplate {
    pub fn sessions_per_week(&self) -> u32 {
        self.sessions.len() as u32
    }
}

use MovementPattern::*;
use MuscleGroup::{
    Adductors, Back, Biceps, Calves, Chest, Core as CoreMuscles, Forearms, Glutes, Hamstrings,
    Quadriceps, Shoulders, Trapezius, Triceps,
};

const FULL_BODY_FOCUS: &[MuscleGroup] = &[
    Chest, Back, Shoulders, Quadriceps, Hamstrings, Glutes, CoreMuscles, Biceps, Triceps, Calves,
];
const PUSH_FOCUS: &[MuscleGroup] = &[Chest, Shoulders, Triceps];
const PULL_FOCUS: &[MuscleGroup] = &[Back, Trapezius, Biceps, Forearms];
const LEGS_FOCUS: &[MuscleGroup] =
    &[Quadriceps, Hamstrings, Glutes, Adductors, Calves, CoreMuscles];
const UPPER_FOCUS: &[MuscleGroup] = &[Chest, Back, Shoulders, Biceps, Triceps];

static FULL_BODY_A: SessionTemplate = SessionTemplate {
    name: "Full Body A",
    focus: FULL_BODY_FOCUS,
    patterns: &[Squat, HorizontalPush, HorizontalPull, Core],
};
static FULL_BODY_B: SessionTemplate = SessionTemplate {
    name: "Full Body B",
    focus: FULL_BODY_FOCUS,
    patterns: &[Hinge, VerticalPush, VerticalPull, Core],
};
static FULL_BODY_C: SessionTemplate = SessionTemplate {
    name: "Full Body C",
    focus: FULL_BODY_FOCUS,
    patterns: &[Lunge, HorizontalPush, VerticalPull, Core],
};
static PUSH_A: SessionTemplate = SessionTemplate {
    name: "Push",
    focus: PUSH_FOCUS,
    patterns: &[HorizontalPush, VerticalPush, HorizontalPush],
};
static PULL_A: SessionTemplate = SessionTemplate {
    name: "Pull",
    focus: PULL_FOCUS,
    patterns: &[VerticalPull, HorizontalPull, Hinge],
};
static LEGS_A: SessionTemplate = SessionTemplate {
    name: "Legs",
    focus: LEGS_FOCUS,
    patterns: &[Squat, Hinge, Lunge, Core],
};
static PUSH_B: SessionTemplate = SessionTemplate {
    name: "Push B",
    focus: PUSH_FOCUS,
    patterns: &[VerticalPush, HorizontalPush, HorizontalPush],
};
static PULL_B: SessionTemplate = SessionTemplate {
    name: "Pull B",
    focus: PULL_FOCUS,
    patterns: &[HorizontalPull, VerticalPull, Hinge],
};
static LEGS_B: SessionTemplate = SessionTemplate {
    name: "Legs B",
    focus: LEGS_FOCUS,
    patterns: &[Hinge, Squat, Lunge, Core],
};
static UPPER_A: SessionTemplate = SessionTemplate {
    name: "Upper A",
    focus: UPPER_FOCUS,
    patterns: &[HorizontalPush, HorizontalPull, VerticalPush, VerticalPull],
};
static UPPER_B: SessionTemplate = SessionTemplate {
    name: "Upper B",
    focus: UPPER_FOCUS,
    patterns: &[VerticalPush, VerticalPull, HorizontalPush, HorizontalPull],
};
static LOWER_A: SessionTemplate = SessionTemplate {
    name: "Lower A",
    focus: LEGS_FOCUS,
    patterns: &[Squat, Hinge, Lunge, Core],
};
static LOWER_B: SessionTemplate = SessionTemplate {
    name: "Lower B",
    focus: LEGS_FOCUS,
    patterns: &[Hinge, Lunge, Squat, Core],
};

static FULL_BODY_2: SplitTemplate = SplitTemplate {
    name: "Full Body A/B",
    sessions: &[&FULL_BODY_A, &FULL_BODY_B],
};
static FULL_BODY_3: SplitTemplate = SplitTemplate {
    name: "Full Body A/B/C",
    sessions: &[&FULL_BODY_A, &FULL_BODY_B, &FULL_BODY_C],
};
static PPL_3: SplitTemplate = SplitTemplate {
    name: "Push/Pull/Legs",
    sessions: &[&PUSH_A, &PULL_A, &LEGS_A],
};
static UPPER_LOWER_4: SplitTemplate = SplitTemplate {
    name: "Upper/Lower ×2",
    sessions: &[&UPPER_A, &LOWER_A, &UPPER_B, &LOWER_B],
};
static UL_FB_5: SplitTemplate = SplitTemplate {
    name: "Upper/Lower/Full Body",
    sessions: &[&UPPER_A, &LOWER_A, &FULL_BODY_A, &UPPER_B, &LOWER_B],
};
static PPL_UL_5: SplitTemplate = SplitTemplate {
    name: "Push/Pull/Legs/Upper/Lower",
    sessions: &[&PUSH_A, &PULL_A, &LEGS_A, &UPPER_B, &LOWER_B],
};
static PPL_6: SplitTemplate = SplitTemplate {
    name: "Push/Pull/Legs ×2",
    sessions: &[&PUSH_A, &PULL_A, &LEGS_A, &PUSH_B, &PULL_B, &LEGS_B],
};

/// Clamp a requested frequency to the supported range
pub fn clamp_sessions(sessions_per_week: u32) -> u32 {
    let clamped = sessions_per_week.clamp(MIN_SESSIONS, MAX_SESSIONS);
    if clamped != sessions_per_week {
        warn!(
            requested = sessions_per_week,
            used = clamped,
            "unsupported sessions per week, clamping"
        );
    }
    clamped
}

/// Pick the split for a frequency and level
pub fn select_split(sessions_per_week: u32, level: FitnessLevel) -> &'static SplitTemplate {
    let beginner = level == FitnessLevel::Beginner;
    match clamp_sessions(sessions_per_week) {
        2 => &FULL_BODY_2,
        3 if beginner => &FULL_BODY_3,
        3 => &PPL_3,
        4 => &UPPER_LOWER_4,
        5 if beginner => &UL_FB_5,
        5 => &PPL_UL_5,
        _ => &PPL_6,
    }
}
