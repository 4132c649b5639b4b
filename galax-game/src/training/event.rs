//! UI-facing events and the terminal outcome of a training session.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use super::physics::Vec3;

/// Events produced by one call into the session; most calls yield a handful.
pub type EventBuffer = SmallVec<[TrainingEvent; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    OxygenDepleted,
    TimeExpired,
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OxygenDepleted => write!(f, "oxygen depleted"),
            Self::TimeExpired => write!(f, "time expired"),
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "cause", rename_all = "snake_case")]
pub enum Ending {
    Success,
    Failure(FailureCause),
    Cancelled,
}

impl Ending {
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for Ending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure(cause) => write!(f, "failure ({cause})"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Score committed when a session is cancelled. The end bonus is never awarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelPolicy {
    /// Keep the score accumulated so far.
    #[default]
    ForfeitBonus,
    /// Commit nothing.
    ForfeitAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingOutcome {
    pub ending: Ending,
    pub accumulated_score: u32,
    pub bonus: u32,
    /// Value handed to the player's point total.
    pub final_score: u32,
    pub tasks_completed: usize,
}

/// Numeric HUD state after a batch of ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub oxygen: f32,
    pub time_remaining: u32,
    pub score: u32,
    pub current_task_index: usize,
    pub tasks_completed: usize,
    pub total_tasks: usize,
    pub position: Vec3,
    pub grabbed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrainingEvent {
    Message { text: String, duration_ms: u32 },
    Briefing {
        index: usize,
        title: String,
        objective: String,
    },
    Hud(HudSnapshot),
    Ended(TrainingOutcome),
}

impl TrainingEvent {
    pub(crate) fn message(text: impl Into<String>, duration_ms: u32) -> Self {
        Self::Message {
            text: text.into(),
            duration_ms,
        }
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<&TrainingOutcome> {
        match self {
            Self::Ended(outcome) => Some(outcome),
            _ => None,
        }
    }
}
