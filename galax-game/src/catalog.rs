//! Mission catalog: per-path mission sequences plus a general fallback list.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::paths::TrainingPath;

const DEFAULT_MISSION_DATA: &str = include_str!("../assets/data/missions.json");

/// Mission difficulty; drives the awarded points schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(()),
        }
    }
}

/// Presentation style of a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionKind {
    Quiz,
    Simulation,
    Exploration,
    Analysis,
}

/// Quiz or briefing payload attached to a mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MissionContent {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: Option<usize>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub facts: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<String>,
}

impl MissionContent {
    /// Whether `answer` matches the quiz key. Non-quiz content never matches.
    #[must_use]
    pub fn is_correct(&self, answer: usize) -> bool {
        self.correct_answer == Some(answer) && answer < self.options.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionDescriptor {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: MissionKind,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Catalog-declared value, shown to players but not used for awards.
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub content: MissionContent,
}

/// Optional filters for [`MissionCatalog::pick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MissionFilter {
    pub difficulty: Option<Difficulty>,
    pub kind: Option<MissionKind>,
}

impl MissionFilter {
    #[must_use]
    pub const fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: MissionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    fn accepts(&self, mission: &MissionDescriptor) -> bool {
        self.difficulty.is_none_or(|d| d == mission.difficulty)
            && self.kind.is_none_or(|k| k == mission.kind)
    }
}

/// Read-only mission tables keyed by path display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MissionCatalog {
    #[serde(default)]
    pub paths: BTreeMap<String, Vec<MissionDescriptor>>,
    #[serde(default)]
    pub general: Vec<MissionDescriptor>,
}

impl MissionCatalog {
    /// Create an empty catalog (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into mission data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_MISSION_DATA).unwrap_or_else(|err| {
            log::warn!("mission catalog asset unreadable, using empty catalog: {err}");
            Self::empty()
        })
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }

    /// Ordered missions for a track; sparse or missing tracks yield a short slice.
    #[must_use]
    pub fn missions_for(&self, path: TrainingPath) -> &[MissionDescriptor] {
        self.paths.get(path.as_str()).map_or(&[], Vec::as_slice)
    }

    /// Missions offered for a path name, falling back to the general list.
    #[must_use]
    pub fn missions_or_general(&self, name: &str) -> &[MissionDescriptor] {
        self.paths
            .get(name)
            .map_or(self.general.as_slice(), Vec::as_slice)
    }

    /// Mission at a progression index, if the catalog defines one.
    #[must_use]
    pub fn mission_at(&self, path: TrainingPath, index: usize) -> Option<&MissionDescriptor> {
        self.missions_for(path).get(index)
    }

    /// Look a mission up by id across every path and the general list.
    #[must_use]
    pub fn find(&self, mission_id: &str) -> Option<&MissionDescriptor> {
        self.paths
            .values()
            .flatten()
            .chain(self.general.iter())
            .find(|mission| mission.id == mission_id)
    }

    /// Track that owns a mission id; general missions belong to no track.
    #[must_use]
    pub fn path_of(&self, mission_id: &str) -> Option<TrainingPath> {
        self.paths
            .iter()
            .find(|(_, missions)| missions.iter().any(|m| m.id == mission_id))
            .and_then(|(name, _)| TrainingPath::from_name(name))
    }

    /// Pick a random mission for a path name that passes the filter.
    pub fn pick<R: Rng>(
        &self,
        name: &str,
        filter: MissionFilter,
        rng: &mut R,
    ) -> Option<&MissionDescriptor> {
        let candidates: Vec<&MissionDescriptor> = self
            .missions_or_general(name)
            .iter()
            .filter(|mission| filter.accepts(mission))
            .collect();
        candidates.choose(rng).copied()
    }
}
