//! Path progression, unlock rules, and player level classification.
//!
//! Every function here is pure: it reads a [`Player`] snapshot plus injected
//! tables and returns a description of the change. Callers persist the change
//! through [`PlayerUpdate`], which the store applies atomically.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::catalog::{Difficulty, MissionCatalog, MissionDescriptor};
use crate::constants::{
    ASTRONAUT_MODE_THRESHOLD, MISSIONS_PER_PATH, POINTS_EASY, POINTS_HARD, POINTS_MEDIUM,
    RANK_CADET_PCT, RANK_JUNIOR_CADET_PCT, RANK_SENIOR_CADET_PCT, TIER_ASTRONAUT_MIN,
    TIER_EXPERT_MIN, TIER_INTERMEDIATE_MIN,
};
use crate::numbers::{round_f64_to_u8, u32_to_f64};
use crate::paths::{Location, PathDirectory, TrainingPath};
use crate::player::{MissionSlot, Player, PlayerUpdate, Progress};

/// Points awarded per difficulty; authoritative over catalog `points`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsSchedule {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl Default for PointsSchedule {
    fn default() -> Self {
        Self {
            easy: POINTS_EASY,
            medium: POINTS_MEDIUM,
            hard: POINTS_HARD,
        }
    }
}

/// Minimum point totals for each tier above Beginner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub intermediate: u32,
    pub expert: u32,
    pub astronaut: u32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            intermediate: TIER_INTERMEDIATE_MIN,
            expert: TIER_EXPERT_MIN,
            astronaut: TIER_ASTRONAUT_MIN,
        }
    }
}

/// Static tables the progression functions read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionRules {
    pub points: PointsSchedule,
    pub astronaut_threshold: u32,
    pub tiers: TierThresholds,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesConfigError {
    #[error("tier thresholds must ascend: intermediate={intermediate} expert={expert} astronaut={astronaut}")]
    TiersOutOfOrder {
        intermediate: u32,
        expert: u32,
        astronaut: u32,
    },
    #[error("astronaut threshold must be positive")]
    ZeroAstronautThreshold,
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self {
            points: PointsSchedule::default(),
            astronaut_threshold: ASTRONAUT_MODE_THRESHOLD,
            tiers: TierThresholds::default(),
        }
    }
}

impl ProgressionRules {
    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `RulesConfigError` when tiers are not strictly ascending or the
    /// astronaut threshold is zero.
    pub fn validate(&self) -> Result<(), RulesConfigError> {
        let TierThresholds {
            intermediate,
            expert,
            astronaut,
        } = self.tiers;
        if !(0 < intermediate && intermediate < expert && expert < astronaut) {
            return Err(RulesConfigError::TiersOutOfOrder {
                intermediate,
                expert,
                astronaut,
            });
        }
        if self.astronaut_threshold == 0 {
            return Err(RulesConfigError::ZeroAstronautThreshold);
        }
        Ok(())
    }

    #[must_use]
    pub const fn points_for(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.points.easy,
            Difficulty::Medium => self.points.medium,
            Difficulty::Hard => self.points.hard,
        }
    }
}

/// Share of all missions completed, rounded to a whole percent.
#[must_use]
pub fn progress_percentage(progress: &Progress) -> u8 {
    let total_missions = u32::from(MISSIONS_PER_PATH) * 6;
    let ratio = u32_to_f64(progress.total()) / u32_to_f64(total_missions);
    round_f64_to_u8(ratio * 100.0)
}

/// Next catalog mission for a track at the given completion count.
///
/// Sparse catalogs run out before the cap; that is "nothing to show".
#[must_use]
pub fn next_mission(
    catalog: &MissionCatalog,
    path: TrainingPath,
    completed: u8,
) -> Option<&MissionDescriptor> {
    if completed >= MISSIONS_PER_PATH {
        return None;
    }
    catalog.mission_at(path, usize::from(completed))
}

/// [`next_mission`] keyed by display name; unknown names have nothing next.
#[must_use]
pub fn next_mission_by_name<'a>(
    catalog: &'a MissionCatalog,
    player: &Player,
    name: &str,
) -> Option<&'a MissionDescriptor> {
    let path = TrainingPath::from_name(name)?;
    next_mission(catalog, path, player.progress.get(path))
}

/// Outcome of finishing one mission; the player is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionResult {
    pub mission_id: String,
    pub points_earned: u32,
    pub new_progress: Progress,
    /// Track the mission counted toward; `None` from the hub.
    pub path: Option<TrainingPath>,
    /// Track that reached the cap with this mission, if any.
    pub path_completed: Option<TrainingPath>,
    pub unlocked_paths: Option<Vec<TrainingPath>>,
    pub astronaut_mode_triggered: bool,
}

impl MissionResult {
    /// Store payload: points, a track increment, astronaut flag, and the mission log entry.
    #[must_use]
    pub fn into_update(self) -> PlayerUpdate {
        PlayerUpdate {
            points_delta: self.points_earned,
            increment_path: self.path,
            astronaut_mode: self.astronaut_mode_triggered,
            completed_mission: Some(self.mission_id),
            current_mission: MissionSlot::Clear,
            ..PlayerUpdate::default()
        }
    }
}

#[must_use]
pub fn complete_mission(
    player: &Player,
    mission_id: &str,
    difficulty: Difficulty,
    rules: &ProgressionRules,
) -> MissionResult {
    let points_earned = rules.points_for(difficulty);
    let prior = player.progress;
    let new_progress = match player.current_path {
        Location::Track(path) => prior.incremented(path),
        Location::Hub => prior,
    };

    let path_completed = player
        .current_path
        .track()
        .filter(|&path| new_progress.is_complete(path) && !prior.is_complete(path));

    let mut unlocked = Vec::new();
    if player.current_path.is_hub() && prior.is_untouched() {
        unlocked.extend(TrainingPath::ALL.iter().take(2).copied());
    } else if let Some(next) = path_completed.and_then(TrainingPath::successor) {
        unlocked.push(next);
    }

    let astronaut_mode_triggered = new_progress.all_complete()
        && player.points.saturating_add(points_earned) >= rules.astronaut_threshold;

    MissionResult {
        mission_id: mission_id.to_string(),
        points_earned,
        new_progress,
        path: player.current_path.track(),
        path_completed,
        unlocked_paths: (!unlocked.is_empty()).then_some(unlocked),
        astronaut_mode_triggered,
    }
}

/// Hub and the first track are always open; later tracks need their predecessor capped.
#[must_use]
pub fn validate_path_selection(player: &Player, target: Location) -> bool {
    match target {
        Location::Hub => true,
        Location::Track(path) => path
            .predecessor()
            .is_none_or(|previous| player.progress.is_complete(previous)),
    }
}

/// Every location the player may currently select, in board order.
#[must_use]
pub fn unlocked_paths(player: &Player) -> Vec<Location> {
    std::iter::once(Location::Hub)
        .chain(
            TrainingPath::ALL
                .iter()
                .map(|&path| Location::Track(path))
                .filter(|&location| validate_path_selection(player, location)),
        )
        .collect()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressionError {
    #[error("{path} is locked until {requires} is complete")]
    PathLocked {
        path: TrainingPath,
        requires: TrainingPath,
    },
}

/// Validated move to a new board location with its derived mentor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSelection {
    pub location: Location,
    pub mentor: String,
}

impl PathSelection {
    #[must_use]
    pub fn into_update(self) -> PlayerUpdate {
        PlayerUpdate {
            current_path: Some(self.location),
            mentor: Some(self.mentor),
            ..PlayerUpdate::default()
        }
    }
}

/// # Errors
///
/// Returns `ProgressionError::PathLocked` when the target track's
/// predecessor is not yet complete.
pub fn select_path(
    player: &Player,
    target: Location,
    directory: &PathDirectory,
) -> Result<PathSelection, ProgressionError> {
    if let Location::Track(path) = target
        && let Some(requires) = path.predecessor()
        && !player.progress.is_complete(requires)
    {
        return Err(ProgressionError::PathLocked { path, requires });
    }
    Ok(PathSelection {
        location: target,
        mentor: directory.mentor_for(target.as_str()).to_string(),
    })
}

/// Points-only update handing a training session's final score to the player.
#[must_use]
pub fn training_reward(final_score: u32) -> PlayerUpdate {
    PlayerUpdate::points(final_score)
}

/// Point-based tier, ordered lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelTier {
    Beginner,
    Intermediate,
    Expert,
    Astronaut,
}

impl LevelTier {
    pub const ALL: [Self; 4] = [
        Self::Beginner,
        Self::Intermediate,
        Self::Expert,
        Self::Astronaut,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Expert => "Expert",
            Self::Astronaut => "Astronaut",
        }
    }

    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Beginner => Some(Self::Intermediate),
            Self::Intermediate => Some(Self::Expert),
            Self::Expert => Some(Self::Astronaut),
            Self::Astronaut => None,
        }
    }

    const fn minimum(self, tiers: &TierThresholds) -> u32 {
        match self {
            Self::Beginner => 0,
            Self::Intermediate => tiers.intermediate,
            Self::Expert => tiers.expert,
            Self::Astronaut => tiers.astronaut,
        }
    }
}

impl fmt::Display for LevelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStatus {
    pub tier: LevelTier,
    pub next_tier: Option<LevelTier>,
    pub points_to_next: Option<u32>,
    pub message: String,
}

#[must_use]
pub fn level_classification(points: u32, rules: &ProgressionRules) -> LevelStatus {
    let tier = LevelTier::ALL
        .iter()
        .rev()
        .copied()
        .find(|tier| points >= tier.minimum(&rules.tiers))
        .unwrap_or(LevelTier::Beginner);
    let next_tier = tier.next();
    let points_to_next = next_tier.map(|next| next.minimum(&rules.tiers).saturating_sub(points));
    let message = match (next_tier, points_to_next) {
        (Some(next), Some(remaining)) => format!("{remaining} points to reach {next}"),
        _ => "Highest tier reached. Training complete!".to_string(),
    };
    LevelStatus {
        tier,
        next_tier,
        points_to_next,
        message,
    }
}

/// Completion-based rank shown on the status panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Trainee,
    #[serde(rename = "Junior Cadet")]
    JuniorCadet,
    Cadet,
    #[serde(rename = "Senior Cadet")]
    SeniorCadet,
    Astronaut,
}

impl Rank {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trainee => "Trainee",
            Self::JuniorCadet => "Junior Cadet",
            Self::Cadet => "Cadet",
            Self::SeniorCadet => "Senior Cadet",
            Self::Astronaut => "Astronaut",
        }
    }

    #[must_use]
    pub const fn from_percentage(percentage: u8) -> Self {
        if percentage >= 100 {
            Self::Astronaut
        } else if percentage >= RANK_SENIOR_CADET_PCT {
            Self::SeniorCadet
        } else if percentage >= RANK_CADET_PCT {
            Self::Cadet
        } else if percentage >= RANK_JUNIOR_CADET_PCT {
            Self::JuniorCadet
        } else {
            Self::Trainee
        }
    }

    #[must_use]
    pub const fn next_milestone(self) -> &'static str {
        match self {
            Self::Trainee => "Complete your first path to become Junior Cadet",
            Self::JuniorCadet => "Complete 3 more paths to become Cadet",
            Self::Cadet => "Complete 2 more paths to become Senior Cadet",
            Self::SeniorCadet => "Complete final missions to become an Astronaut",
            Self::Astronaut => "Mission accomplished!",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatus {
    pub progress_percentage: u8,
    pub completed_paths: usize,
    pub total_paths: usize,
    pub rank: Rank,
    pub next_milestone: String,
}

#[must_use]
pub fn game_status(player: &Player) -> GameStatus {
    let progress_percentage = progress_percentage(&player.progress);
    let rank = Rank::from_percentage(progress_percentage);
    GameStatus {
        progress_percentage,
        completed_paths: player.progress.completed_paths(),
        total_paths: TrainingPath::ALL.len(),
        rank,
        next_milestone: rank.next_milestone().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ProgressionRules {
        ProgressionRules::default_config()
    }

    fn player_on(path: TrainingPath, counts: &[(TrainingPath, u8)]) -> Player {
        let mut player = Player::new("p1", "Trainee");
        player.current_path = Location::Track(path);
        player.progress = Progress::from_counts(counts.iter().copied());
        player
    }

    #[test]
    fn first_easy_mission_awards_points_without_unlock() {
        let player = player_on(TrainingPath::ScienceResearch, &[]);
        let result = complete_mission(&player, "science-1", Difficulty::Easy, &rules());
        assert_eq!(result.points_earned, 40);
        assert_eq!(result.new_progress.get(TrainingPath::ScienceResearch), 1);
        assert_eq!(result.path_completed, None);
        assert_eq!(result.unlocked_paths, None);
        assert!(!result.astronaut_mode_triggered);
        assert_eq!(player.progress.total(), 0);
    }

    #[test]
    fn finishing_a_track_unlocks_its_successor() {
        let player = player_on(
            TrainingPath::ScienceResearch,
            &[(TrainingPath::ScienceResearch, 2)],
        );
        let result = complete_mission(&player, "science-3", Difficulty::Hard, &rules());
        assert_eq!(result.points_earned, 80);
        assert_eq!(result.new_progress.get(TrainingPath::ScienceResearch), 3);
        assert_eq!(result.path_completed, Some(TrainingPath::ScienceResearch));
        assert_eq!(
            result.unlocked_paths,
            Some(vec![TrainingPath::EngineeringSystems])
        );
    }

    #[test]
    fn capped_track_keeps_awarding_points_without_reunlocking() {
        let player = player_on(
            TrainingPath::ScienceResearch,
            &[(TrainingPath::ScienceResearch, 3)],
        );
        let result = complete_mission(&player, "science-3", Difficulty::Medium, &rules());
        assert_eq!(result.points_earned, 60);
        assert_eq!(result.new_progress.get(TrainingPath::ScienceResearch), 3);
        assert_eq!(result.path_completed, None);
        assert_eq!(result.unlocked_paths, None);
    }

    #[test]
    fn hub_bootstrap_unlocks_first_two_tracks() {
        let player = Player::new("p1", "Trainee");
        let result = complete_mission(&player, "general-1", Difficulty::Easy, &rules());
        assert_eq!(result.new_progress, Progress::new());
        assert_eq!(
            result.unlocked_paths,
            Some(vec![
                TrainingPath::ScienceResearch,
                TrainingPath::EngineeringSystems
            ])
        );

        let mut seasoned = Player::new("p2", "Trainee");
        seasoned.progress = Progress::from_counts([(TrainingPath::ScienceResearch, 1)]);
        let later = complete_mission(&seasoned, "general-1", Difficulty::Easy, &rules());
        assert_eq!(later.unlocked_paths, None);
    }

    #[test]
    fn astronaut_mode_requires_every_track_and_threshold() {
        let mut player = player_on(TrainingPath::TechnologyInnovation, &[]);
        player.progress = Progress::from_counts(TrainingPath::ALL.map(|path| {
            let count = if path == TrainingPath::TechnologyInnovation { 2 } else { 3 };
            (path, count)
        }));
        player.points = 719;
        let short = complete_mission(&player, "tech-3", Difficulty::Hard, &rules());
        assert!(short.new_progress.all_complete());
        assert!(!short.astronaut_mode_triggered);
        assert_eq!(short.unlocked_paths, None);

        player.points = 720;
        let enough = complete_mission(&player, "tech-3", Difficulty::Hard, &rules());
        assert!(enough.astronaut_mode_triggered);
    }

    #[test]
    fn path_selection_follows_predecessors() {
        let player = player_on(
            TrainingPath::ScienceResearch,
            &[(TrainingPath::ScienceResearch, 3), (TrainingPath::MedicineHumanFactors, 3)],
        );
        assert!(validate_path_selection(&player, Location::Hub));
        assert!(validate_path_selection(
            &player,
            Location::Track(TrainingPath::ScienceResearch)
        ));
        assert!(validate_path_selection(
            &player,
            Location::Track(TrainingPath::EngineeringSystems)
        ));
        assert!(!validate_path_selection(
            &player,
            Location::Track(TrainingPath::MedicineHumanFactors)
        ));
        assert_eq!(
            unlocked_paths(&player),
            vec![
                Location::Hub,
                Location::Track(TrainingPath::ScienceResearch),
                Location::Track(TrainingPath::EngineeringSystems),
                Location::Track(TrainingPath::CommunicationsExploration),
            ]
        );
    }

    #[test]
    fn select_path_derives_mentor_or_reports_lock() {
        let directory = PathDirectory::load_from_static();
        let player = Player::new("p1", "Trainee");
        let selection = select_path(
            &player,
            Location::Track(TrainingPath::ScienceResearch),
            &directory,
        )
        .unwrap();
        assert_eq!(selection.mentor, "Dr. Mae Jemison");
        let update = selection.into_update();
        assert_eq!(
            update.current_path,
            Some(Location::Track(TrainingPath::ScienceResearch))
        );

        let err = select_path(
            &player,
            Location::Track(TrainingPath::EngineeringSystems),
            &directory,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ProgressionError::PathLocked {
                path: TrainingPath::EngineeringSystems,
                requires: TrainingPath::ScienceResearch
            }
        );
    }

    #[test]
    fn next_mission_tolerates_sparse_catalogs() {
        let catalog = MissionCatalog::load_from_static();
        let player = player_on(
            TrainingPath::CommunicationsExploration,
            &[(TrainingPath::CommunicationsExploration, 1)],
        );
        assert!(next_mission_by_name(&catalog, &player, "Communications & Exploration").is_none());
        assert!(next_mission_by_name(&catalog, &player, "Quantum Gardening").is_none());
        let first = next_mission(&catalog, TrainingPath::ScienceResearch, 0).unwrap();
        assert_eq!(first.id, "science-1");
        assert!(next_mission(&catalog, TrainingPath::ScienceResearch, 3).is_none());
    }

    #[test]
    fn level_tiers_report_remaining_points() {
        let rules = rules();
        let beginner = level_classification(0, &rules);
        assert_eq!(beginner.tier, LevelTier::Beginner);
        assert_eq!(beginner.points_to_next, Some(250));
        assert_eq!(level_classification(249, &rules).tier, LevelTier::Beginner);
        let intermediate = level_classification(250, &rules);
        assert_eq!(intermediate.tier, LevelTier::Intermediate);
        assert_eq!(intermediate.message, "250 points to reach Expert");
        assert_eq!(level_classification(799, &rules).tier, LevelTier::Expert);
        let top = level_classification(800, &rules);
        assert_eq!(top.tier, LevelTier::Astronaut);
        assert_eq!(top.next_tier, None);
        assert_eq!(top.points_to_next, None);
    }

    #[test]
    fn status_rank_tracks_percentage() {
        let mut player = Player::new("p1", "Trainee");
        assert_eq!(game_status(&player).rank, Rank::Trainee);
        player.progress = Progress::from_counts([
            (TrainingPath::ScienceResearch, 3),
            (TrainingPath::EngineeringSystems, 2),
        ]);
        let status = game_status(&player);
        assert_eq!(status.progress_percentage, 28);
        assert_eq!(status.rank, Rank::JuniorCadet);
        assert_eq!(status.completed_paths, 1);
        assert_eq!(status.total_paths, 6);
        player.progress = Progress::from_counts(TrainingPath::ALL.map(|path| (path, 3)));
        let done = game_status(&player);
        assert_eq!(done.progress_percentage, 100);
        assert_eq!(done.next_milestone, "Mission accomplished!");
    }

    #[test]
    fn rules_validation_rejects_unordered_tiers() {
        assert!(rules().validate().is_ok());
        let mut broken = rules();
        broken.tiers.expert = 100;
        assert!(matches!(
            broken.validate(),
            Err(RulesConfigError::TiersOutOfOrder { .. })
        ));
        let parsed: ProgressionRules =
            serde_json::from_str(r#"{"points": {"hard": 120}, "astronaut_threshold": 900}"#)
                .unwrap();
        assert_eq!(parsed.points_for(Difficulty::Hard), 120);
        assert_eq!(parsed.points_for(Difficulty::Easy), 40);
        assert_eq!(parsed.astronaut_threshold, 900);
    }

    #[test]
    fn mission_result_update_appends_and_clears() {
        let player = player_on(TrainingPath::ScienceResearch, &[]);
        let update = complete_mission(&player, "science-1", Difficulty::Easy, &rules()).into_update();
        assert_eq!(update.points_delta, 40);
        assert_eq!(update.increment_path, Some(TrainingPath::ScienceResearch));
        assert!(update.progress.is_none());
        assert_eq!(update.completed_mission.as_deref(), Some("science-1"));
        assert_eq!(update.current_mission, MissionSlot::Clear);
        assert_eq!(training_reward(575).points_delta, 575);
    }
}
