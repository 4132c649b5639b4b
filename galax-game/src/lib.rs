//! GALAX Training Core
//!
//! Platform-agnostic game logic for the GALAX astronaut training program:
//! path progression and unlock rules, the underwater training simulation,
//! mission and mentor catalogs, and the collaborator contracts a host
//! application implements. No UI, network, or database dependencies.

pub mod catalog;
pub mod constants;
pub mod memory_store;
pub mod mentor;
pub mod numbers;
pub mod paths;
pub mod player;
pub mod progression;
pub mod training;

use anyhow::Context;
use std::convert::Infallible;

// Re-export commonly used types
pub use catalog::{
    Difficulty, MissionCatalog, MissionContent, MissionDescriptor, MissionFilter, MissionKind,
};
pub use memory_store::{MemoryPlayerStore, MemoryStoreError};
pub use mentor::{
    ChatMessage, MentorAdvisor, MentorContext, MentorDirectory, MentorError, MentorFailure,
    MentorProfile, MentorRequest, MentorResponse, advise_or_fallback, fallback_response,
    parse_mentor_reply,
};
pub use paths::{Location, PathDirectory, PathInfo, TrainingPath};
pub use player::{MissionSlot, Player, PlayerUpdate, PlayerUpdateError, Progress};
pub use progression::{
    GameStatus, LevelStatus, LevelTier, MissionResult, PathSelection, ProgressionError,
    ProgressionRules, Rank, RulesConfigError, complete_mission, game_status, level_classification,
    next_mission, next_mission_by_name, progress_percentage, select_path, training_reward,
    unlocked_paths, validate_path_selection,
};
pub use training::{
    CancelPolicy, Ending, FailureCause, HudSnapshot, MoveSet, ScenarioConfigError, SessionState,
    TrainingConfig, TrainingError, TrainingEvent, TrainingInput, TrainingOutcome,
    TrainingScenario, TrainingSession, TrainingTuning,
};

/// Trait for abstracting catalog and configuration loading.
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// # Errors
    ///
    /// Returns an error if the mission catalog cannot be loaded.
    fn load_mission_catalog(&self) -> Result<MissionCatalog, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the path directory cannot be loaded.
    fn load_path_directory(&self) -> Result<PathDirectory, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the progression tables cannot be loaded.
    fn load_progression_rules(&self) -> Result<ProgressionRules, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the training configuration cannot be loaded.
    fn load_training_config(&self) -> Result<TrainingConfig, Self::Error>;
}

/// Loader backed by the JSON assets compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDataLoader;

impl DataLoader for StaticDataLoader {
    type Error = Infallible;

    fn load_mission_catalog(&self) -> Result<MissionCatalog, Self::Error> {
        Ok(MissionCatalog::load_from_static())
    }

    fn load_path_directory(&self) -> Result<PathDirectory, Self::Error> {
        Ok(PathDirectory::load_from_static())
    }

    fn load_progression_rules(&self) -> Result<ProgressionRules, Self::Error> {
        Ok(ProgressionRules::default_config())
    }

    fn load_training_config(&self) -> Result<TrainingConfig, Self::Error> {
        Ok(TrainingConfig::load_from_static())
    }
}

/// Persistence for player documents.
///
/// Implementations must apply a [`PlayerUpdate`] in one atomic write so
/// concurrent requests for the same player cannot lose updates.
pub trait PlayerStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load_player(&self, player_id: &str) -> Result<Option<Player>, Self::Error>;

    /// Insert a new player, returning the stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if the player cannot be written.
    fn create_player(&self, player: &Player) -> Result<Player, Self::Error>;

    /// Apply every field of `update` at once, returning the stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if the player is missing or the update is rejected.
    fn apply_update(&self, player_id: &str, update: &PlayerUpdate) -> Result<Player, Self::Error>;
}

/// Result of a mission completion after it has been persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionCompletion {
    pub result: MissionResult,
    pub player: Player,
}

/// Main engine wiring progression and training to a loader and a store
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: PlayerStore,
{
    data_loader: L,
    store: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: PlayerStore,
{
    /// Create a new game engine with the provided data loader and store
    pub const fn new(data_loader: L, store: S) -> Self {
        Self { data_loader, store }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Fetch a player, creating the default document on first contact.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn load_or_create_player(&self, player_id: &str, name: &str) -> anyhow::Result<Player> {
        if let Some(player) = self
            .store
            .load_player(player_id)
            .with_context(|| format!("loading player {player_id}"))?
        {
            return Ok(player);
        }
        log::info!("creating player {player_id}");
        self.store
            .create_player(&Player::new(player_id, name))
            .with_context(|| format!("creating player {player_id}"))
    }

    fn require_player(&self, player_id: &str) -> anyhow::Result<Player> {
        self.store
            .load_player(player_id)
            .with_context(|| format!("loading player {player_id}"))?
            .with_context(|| format!("player {player_id} not found"))
    }

    /// Record a finished mission and persist the result in one update.
    ///
    /// # Errors
    ///
    /// Returns an error if the player is unknown, the tables cannot be
    /// loaded, or the store rejects the update.
    pub fn complete_mission(
        &self,
        player_id: &str,
        mission_id: &str,
        difficulty: Difficulty,
    ) -> anyhow::Result<MissionCompletion> {
        let player = self.require_player(player_id)?;
        let rules = self
            .data_loader
            .load_progression_rules()
            .context("loading progression rules")?;
        let result = progression::complete_mission(&player, mission_id, difficulty, &rules);
        let player = self
            .store
            .apply_update(player_id, &result.clone().into_update())
            .with_context(|| format!("recording mission {mission_id} for {player_id}"))?;

        log::info!(
            "{player_id} completed {mission_id}: +{} points",
            result.points_earned
        );
        if let Some(unlocked) = &result.unlocked_paths {
            let names: Vec<&str> = unlocked.iter().map(|path| path.as_str()).collect();
            log::info!("{player_id} unlocked {}", names.join(", "));
        }
        if result.astronaut_mode_triggered {
            log::info!("{player_id} reached astronaut mode");
        }
        Ok(MissionCompletion { result, player })
    }

    /// Like [`Self::complete_mission`], taking the difficulty from the catalog.
    /// Missions missing from the catalog count as easy.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Self::complete_mission`].
    pub fn complete_catalog_mission(
        &self,
        player_id: &str,
        mission_id: &str,
    ) -> anyhow::Result<MissionCompletion> {
        let catalog = self
            .data_loader
            .load_mission_catalog()
            .context("loading mission catalog")?;
        let difficulty = catalog
            .find(mission_id)
            .map_or(Difficulty::Easy, |mission| mission.difficulty);
        self.complete_mission(player_id, mission_id, difficulty)
    }

    /// Move a player to a new location if it is unlocked.
    ///
    /// # Errors
    ///
    /// Returns an error if the player is unknown, the path is locked, or the
    /// store rejects the update.
    pub fn select_path(&self, player_id: &str, target: Location) -> anyhow::Result<Player> {
        let player = self.require_player(player_id)?;
        let directory = self
            .data_loader
            .load_path_directory()
            .context("loading path directory")?;
        let selection = progression::select_path(&player, target, &directory)?;
        log::info!("{player_id} moved to {}", selection.location);
        self.store
            .apply_update(player_id, &selection.into_update())
            .with_context(|| format!("moving {player_id} to {target}"))
    }

    /// Next mission on the player's current track, if the catalog has one.
    ///
    /// # Errors
    ///
    /// Returns an error if the player is unknown or the catalog cannot be loaded.
    pub fn next_mission(&self, player_id: &str) -> anyhow::Result<Option<MissionDescriptor>> {
        let player = self.require_player(player_id)?;
        let catalog = self
            .data_loader
            .load_mission_catalog()
            .context("loading mission catalog")?;
        Ok(next_mission_by_name(&catalog, &player, player.current_path.as_str()).cloned())
    }

    /// Build a fresh training session from the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub fn start_training(&self) -> anyhow::Result<TrainingSession> {
        let config = self
            .data_loader
            .load_training_config()
            .context("loading training config")?;
        Ok(TrainingSession::new(config)?)
    }

    /// Add a finished session's score to the player.
    ///
    /// # Errors
    ///
    /// Returns an error if the player is unknown or the store rejects the update.
    pub fn commit_training(
        &self,
        player_id: &str,
        outcome: &TrainingOutcome,
    ) -> anyhow::Result<Player> {
        log::info!(
            "{player_id} finished training ({}) for {} points",
            outcome.ending,
            outcome.final_score
        );
        self.store
            .apply_update(player_id, &training_reward(outcome.final_score))
            .with_context(|| format!("committing training score for {player_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("asset bundle offline")]
    struct OfflineError;

    struct OfflineLoader;

    impl DataLoader for OfflineLoader {
        type Error = OfflineError;

        fn load_mission_catalog(&self) -> Result<MissionCatalog, Self::Error> {
            Err(OfflineError)
        }

        fn load_path_directory(&self) -> Result<PathDirectory, Self::Error> {
            Err(OfflineError)
        }

        fn load_progression_rules(&self) -> Result<ProgressionRules, Self::Error> {
            Err(OfflineError)
        }

        fn load_training_config(&self) -> Result<TrainingConfig, Self::Error> {
            Err(OfflineError)
        }
    }

    #[test]
    fn engine_creates_player_once() {
        let engine = GameEngine::new(StaticDataLoader, MemoryPlayerStore::new());
        let first = engine.load_or_create_player("demo", "Trainee").unwrap();
        assert_eq!(first.current_path, Location::Hub);
        assert_eq!(first.mentor, "Dr. Ellen Ochoa");
        let again = engine.load_or_create_player("demo", "Renamed").unwrap();
        assert_eq!(again.name, "Trainee");
        assert_eq!(engine.store().len(), 1);
    }

    #[test]
    fn mission_completion_is_persisted() {
        let engine = GameEngine::new(StaticDataLoader, MemoryPlayerStore::new());
        engine.load_or_create_player("demo", "Trainee").unwrap();
        engine
            .select_path("demo", Location::Track(TrainingPath::ScienceResearch))
            .unwrap();
        let next = engine.next_mission("demo").unwrap().unwrap();
        assert_eq!(next.id, "science-1");

        for mission in ["science-1", "science-2", "science-3"] {
            engine.complete_catalog_mission("demo", mission).unwrap();
        }
        let stored = engine.store().load_player("demo").unwrap().unwrap();
        assert_eq!(stored.points, 40 + 60 + 80);
        assert_eq!(stored.completed_missions.len(), 3);
        assert!(stored.progress.is_complete(TrainingPath::ScienceResearch));
        assert_eq!(stored.mentor, "Dr. Mae Jemison");
        assert!(engine.next_mission("demo").unwrap().is_none());

        let moved = engine
            .select_path("demo", Location::Track(TrainingPath::EngineeringSystems))
            .unwrap();
        assert_eq!(moved.mentor, "Bob Behnken");
    }

    #[test]
    fn locked_paths_surface_progression_errors() {
        let engine = GameEngine::new(StaticDataLoader, MemoryPlayerStore::new());
        engine.load_or_create_player("demo", "Trainee").unwrap();
        let err = engine
            .select_path("demo", Location::Track(TrainingPath::AstronomyNavigation))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProgressionError>(),
            Some(ProgressionError::PathLocked { .. })
        ));
        assert!(engine.complete_mission("ghost", "x", Difficulty::Easy).is_err());
    }

    #[test]
    fn training_score_is_committed() {
        let engine = GameEngine::new(StaticDataLoader, MemoryPlayerStore::new());
        engine.load_or_create_player("demo", "Trainee").unwrap();
        let mut session = engine.start_training().unwrap();
        session.start().unwrap();
        session.cancel().unwrap();
        let outcome = *session.outcome().unwrap();
        assert_eq!(outcome.final_score, 0);

        let reward = TrainingOutcome {
            final_score: 575,
            ..outcome
        };
        let player = engine.commit_training("demo", &reward).unwrap();
        assert_eq!(player.points, 575);
    }

    #[test]
    fn loader_failures_carry_context() {
        let engine = GameEngine::new(OfflineLoader, MemoryPlayerStore::new());
        engine.load_or_create_player("demo", "Trainee").unwrap();
        let err = engine
            .complete_mission("demo", "science-1", Difficulty::Easy)
            .unwrap_err();
        assert_eq!(err.to_string(), "loading progression rules");
        assert!(engine.start_training().is_err());
    }
}
