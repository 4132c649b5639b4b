//! Player snapshot, per-path progress counters, and validated updates.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::constants::{DEFAULT_MENTOR, MISSIONS_PER_PATH};
use crate::paths::{Location, TrainingPath};

/// Mission counters for every track, each within `0..=MISSIONS_PER_PATH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, i64>", into = "BTreeMap<TrainingPath, u8>")]
pub struct Progress([u8; 6]);

impl Progress {
    #[must_use]
    pub const fn new() -> Self {
        Self([0; 6])
    }

    /// Build progress from explicit counts, clamping each to the cap.
    #[must_use]
    pub fn from_counts(counts: impl IntoIterator<Item = (TrainingPath, u8)>) -> Self {
        let mut progress = Self::new();
        for (path, count) in counts {
            progress.0[path.index()] = count.min(MISSIONS_PER_PATH);
        }
        progress
    }

    #[must_use]
    pub const fn get(&self, path: TrainingPath) -> u8 {
        self.0[path.index()]
    }

    /// Count for a display name; unknown names have made no progress.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> u8 {
        TrainingPath::from_name(name).map_or(0, |path| self.get(path))
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.iter().map(|&count| u32::from(count)).sum()
    }

    #[must_use]
    pub const fn is_complete(&self, path: TrainingPath) -> bool {
        self.get(path) >= MISSIONS_PER_PATH
    }

    #[must_use]
    pub fn all_complete(&self) -> bool {
        TrainingPath::ALL.iter().all(|&path| self.is_complete(path))
    }

    #[must_use]
    pub fn completed_paths(&self) -> usize {
        TrainingPath::ALL
            .iter()
            .filter(|&&path| self.is_complete(path))
            .count()
    }

    /// No mission has been recorded on any track yet.
    #[must_use]
    pub fn is_untouched(&self) -> bool {
        self.0.iter().all(|&count| count == 0)
    }

    /// Copy with one more mission on `path`, saturating at the cap.
    #[must_use]
    pub fn incremented(mut self, path: TrainingPath) -> Self {
        let slot = &mut self.0[path.index()];
        *slot = slot.saturating_add(1).min(MISSIONS_PER_PATH);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrainingPath, u8)> + '_ {
        TrainingPath::ALL.iter().map(|&path| (path, self.get(path)))
    }
}

impl From<BTreeMap<String, i64>> for Progress {
    fn from(value: BTreeMap<String, i64>) -> Self {
        let mut progress = Self::new();
        for (name, count) in value {
            let Some(path) = TrainingPath::from_name(&name) else {
                continue;
            };
            let clamped = count.clamp(0, i64::from(MISSIONS_PER_PATH));
            progress.0[path.index()] = u8::try_from(clamped).unwrap_or(0);
        }
        progress
    }
}

impl From<Progress> for BTreeMap<TrainingPath, u8> {
    fn from(value: Progress) -> Self {
        value.iter().collect()
    }
}

/// Persisted player document, exchanged by value with the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub player_id: String,
    pub name: String,
    #[serde(default)]
    pub current_path: Location,
    #[serde(default = "default_mentor")]
    pub mentor: String,
    #[serde(default)]
    pub progress: Progress,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub astronaut_mode: bool,
    #[serde(default)]
    pub completed_missions: Vec<String>,
    #[serde(default)]
    pub current_mission: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_mentor() -> String {
    DEFAULT_MENTOR.to_string()
}

impl Player {
    /// Fresh player parked at the hub with the default mentor.
    #[must_use]
    pub fn new(player_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            name: name.into(),
            current_path: Location::Hub,
            mentor: default_mentor(),
            progress: Progress::new(),
            points: 0,
            astronaut_mode: false,
            completed_missions: Vec::new(),
            current_mission: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Apply an update after validating every field, so nothing changes on error.
    ///
    /// # Errors
    ///
    /// Returns `PlayerUpdateError` when the update would lower a progress
    /// counter or overflow the point total.
    pub fn apply(&mut self, update: &PlayerUpdate) -> Result<(), PlayerUpdateError> {
        let points = self
            .points
            .checked_add(update.points_delta)
            .ok_or(PlayerUpdateError::PointsOverflow {
                current: self.points,
                delta: update.points_delta,
            })?;
        if let Some(progress) = update.progress {
            for (path, before) in self.progress.iter() {
                let after = progress.get(path);
                if after < before {
                    return Err(PlayerUpdateError::ProgressRegressed {
                        path,
                        from: before,
                        to: after,
                    });
                }
            }
            self.progress = progress;
        }
        if let Some(path) = update.increment_path {
            self.progress = self.progress.incremented(path);
        }

        self.points = points;
        self.astronaut_mode |= update.astronaut_mode;
        if let Some(mission_id) = &update.completed_mission {
            self.completed_missions.push(mission_id.clone());
        }
        if let Some(location) = update.current_path {
            self.current_path = location;
        }
        if let Some(mentor) = &update.mentor {
            self.mentor.clone_from(mentor);
        }
        match &update.current_mission {
            MissionSlot::Keep => {}
            MissionSlot::Set(id) => self.current_mission = Some(id.clone()),
            MissionSlot::Clear => self.current_mission = None,
        }
        Ok(())
    }
}

/// How an update treats the in-progress mission slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionSlot {
    #[default]
    Keep,
    Set(String),
    Clear,
}

/// Every change to a player, applied by the store in one atomic write.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerUpdate {
    #[serde(default)]
    pub points_delta: u32,
    /// Absolute counters; no track may go down.
    #[serde(default)]
    pub progress: Option<Progress>,
    /// One more mission on this track against the stored counters, capped.
    #[serde(default)]
    pub increment_path: Option<TrainingPath>,
    /// OR-ed into the stored flag; `false` never clears it.
    #[serde(default)]
    pub astronaut_mode: bool,
    #[serde(default)]
    pub completed_mission: Option<String>,
    #[serde(default)]
    pub current_path: Option<Location>,
    #[serde(default)]
    pub mentor: Option<String>,
    #[serde(default)]
    pub current_mission: MissionSlot,
}

impl PlayerUpdate {
    /// Points-only update, used for the training score handoff.
    #[must_use]
    pub fn points(delta: u32) -> Self {
        Self {
            points_delta: delta,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlayerUpdateError {
    #[error("adding {delta} points to {current} overflows")]
    PointsOverflow { current: u32, delta: u32 },
    #[error("progress on {path} cannot drop from {from} to {to}")]
    ProgressRegressed {
        path: TrainingPath,
        from: u8,
        to: u8,
    },
}
