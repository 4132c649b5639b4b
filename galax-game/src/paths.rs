//! Training paths, board locations, and the per-path presentation directory.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{DEFAULT_MENTOR, DEFAULT_PATH_COLOR, DEFAULT_PATH_DESCRIPTION, HUB_NAME};

const DEFAULT_PATH_DATA: &str = include_str!("../assets/data/paths.json");

/// One of the six specialization tracks, declared in unlock order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrainingPath {
    #[serde(rename = "Science & Research")]
    ScienceResearch,
    #[serde(rename = "Engineering & Systems")]
    EngineeringSystems,
    #[serde(rename = "Medicine & Human Factors")]
    MedicineHumanFactors,
    #[serde(rename = "Communications & Exploration")]
    CommunicationsExploration,
    #[serde(rename = "Astronomy & Navigation")]
    AstronomyNavigation,
    #[serde(rename = "Technology & Innovation")]
    TechnologyInnovation,
}

impl TrainingPath {
    /// Every track in unlock order.
    pub const ALL: [Self; 6] = [
        Self::ScienceResearch,
        Self::EngineeringSystems,
        Self::MedicineHumanFactors,
        Self::CommunicationsExploration,
        Self::AstronomyNavigation,
        Self::TechnologyInnovation,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ScienceResearch => "Science & Research",
            Self::EngineeringSystems => "Engineering & Systems",
            Self::MedicineHumanFactors => "Medicine & Human Factors",
            Self::CommunicationsExploration => "Communications & Exploration",
            Self::AstronomyNavigation => "Astronomy & Navigation",
            Self::TechnologyInnovation => "Technology & Innovation",
        }
    }

    /// Position of the track in the unlock sequence.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::ScienceResearch => 0,
            Self::EngineeringSystems => 1,
            Self::MedicineHumanFactors => 2,
            Self::CommunicationsExploration => 3,
            Self::AstronomyNavigation => 4,
            Self::TechnologyInnovation => 5,
        }
    }

    /// Resolve a display name; unknown names yield `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|path| path.as_str() == name)
    }

    /// Track that must be completed before this one unlocks.
    #[must_use]
    pub fn predecessor(self) -> Option<Self> {
        self.index()
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(idx).copied())
    }

    /// Track unlocked by completing this one.
    #[must_use]
    pub fn successor(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }
}

impl fmt::Display for TrainingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainingPath {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or(())
    }
}

/// Where a player stands on the board: the hub or a chosen track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Location {
    #[default]
    Hub,
    Track(TrainingPath),
}

impl Location {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hub => HUB_NAME,
            Self::Track(path) => path.as_str(),
        }
    }

    #[must_use]
    pub const fn track(self) -> Option<TrainingPath> {
        match self {
            Self::Hub => None,
            Self::Track(path) => Some(path),
        }
    }

    #[must_use]
    pub const fn is_hub(self) -> bool {
        matches!(self, Self::Hub)
    }

    /// Resolve a display name, treating anything unknown as the hub.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        TrainingPath::from_name(name).map_or(Self::Hub, Self::Track)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TrainingPath> for Location {
    fn from(value: TrainingPath) -> Self {
        Self::Track(value)
    }
}

impl From<String> for Location {
    fn from(value: String) -> Self {
        Self::from_name(&value)
    }
}

impl From<Location> for String {
    fn from(value: Location) -> Self {
        value.as_str().to_string()
    }
}

/// Presentation metadata for one board location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathInfo {
    pub name: String,
    pub mentor: String,
    pub color: String,
    pub description: String,
}

/// Mentor, colour, and description lookups keyed by location name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PathDirectory {
    #[serde(default)]
    pub paths: Vec<PathInfo>,
}

impl PathDirectory {
    /// Load the directory from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into path metadata.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_PATH_DATA).unwrap_or_else(|err| {
            log::warn!("path directory asset unreadable, using empty directory: {err}");
            Self::default()
        })
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PathInfo> {
        self.paths.iter().find(|info| info.name == name)
    }

    #[must_use]
    pub fn mentor_for(&self, name: &str) -> &str {
        self.get(name).map_or(DEFAULT_MENTOR, |info| info.mentor.as_str())
    }

    #[must_use]
    pub fn color_for(&self, name: &str) -> &str {
        self.get(name)
            .map_or(DEFAULT_PATH_COLOR, |info| info.color.as_str())
    }

    #[must_use]
    pub fn description_for(&self, name: &str) -> &str {
        self.get(name)
            .map_or(DEFAULT_PATH_DESCRIPTION, |info| info.description.as_str())
    }

    /// Reverse lookup used when a player picks a mentor instead of a path.
    #[must_use]
    pub fn path_for_mentor(&self, mentor: &str) -> Option<TrainingPath> {
        self.paths
            .iter()
            .filter(|info| info.mentor == mentor)
            .find_map(|info| TrainingPath::from_name(&info.name))
    }
}
