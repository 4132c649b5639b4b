//! Centralized balance and tuning constants for GALAX game logic.
//!
//! These values define the deterministic math for progression and the
//! training simulation. Keeping them together ensures that gameplay can only
//! be adjusted via code changes reviewed in version control. The JSON assets
//! carry content (missions, mentors, pool layout), never balance.

// Progression ----------------------------------------------------------------
/// Missions required to complete a single training path.
pub const MISSIONS_PER_PATH: u8 = 3;
pub(crate) const POINTS_EASY: u32 = 40;
pub(crate) const POINTS_MEDIUM: u32 = 60;
pub(crate) const POINTS_HARD: u32 = 80;
/// Total points needed (alongside every path at cap) to unlock astronaut mode.
pub const ASTRONAUT_MODE_THRESHOLD: u32 = 800;
pub(crate) const TIER_INTERMEDIATE_MIN: u32 = 250;
pub(crate) const TIER_EXPERT_MIN: u32 = 500;
pub(crate) const TIER_ASTRONAUT_MIN: u32 = ASTRONAUT_MODE_THRESHOLD;
pub(crate) const RANK_JUNIOR_CADET_PCT: u8 = 25;
pub(crate) const RANK_CADET_PCT: u8 = 50;
pub(crate) const RANK_SENIOR_CADET_PCT: u8 = 75;

// Directory fallbacks --------------------------------------------------------
pub(crate) const HUB_NAME: &str = "Central Hub";
pub(crate) const DEFAULT_MENTOR: &str = "Dr. Ellen Ochoa";
pub(crate) const DEFAULT_PATH_COLOR: &str = "#3b82f6";
pub(crate) const DEFAULT_PATH_DESCRIPTION: &str = "Explore the mysteries of space";

// Training physics -----------------------------------------------------------
pub(crate) const WATER_DRAG: f32 = 0.92;
pub(crate) const MOVE_SPEED: f32 = 2.5;
pub(crate) const ASCEND_FACTOR: f32 = 0.3;
pub(crate) const DESCEND_FACTOR: f32 = 0.2;
pub(crate) const LATERAL_FACTOR: f32 = 0.25;
pub(crate) const DEPTH_FACTOR: f32 = 0.2;
pub(crate) const ROTATION_SPEED: f32 = 0.08;
pub(crate) const BUOYANCY_DRIFT: f32 = 0.08;
pub(crate) const MAX_LATERAL_SPEED: f32 = 5.0;
pub(crate) const MAX_VERTICAL_SPEED: f32 = 5.0;
pub(crate) const MAX_DEPTH_SPEED: f32 = 3.0;
pub(crate) const HANDRAIL_DAMPING: f32 = 0.3;
pub(crate) const INTERACTION_RADIUS: f32 = 50.0;

// Pool geometry --------------------------------------------------------------
pub(crate) const POOL_MIN_X: f32 = 50.0;
pub(crate) const POOL_MAX_X: f32 = 750.0;
pub(crate) const POOL_MIN_Y: f32 = 50.0;
pub(crate) const POOL_MAX_Y: f32 = 550.0;
pub(crate) const POOL_MIN_Z: f32 = 100.0;
pub(crate) const POOL_MAX_Z: f32 = 300.0;
pub(crate) const SPAWN_X: f32 = 400.0;
pub(crate) const SPAWN_Y: f32 = 500.0;
pub(crate) const SPAWN_Z: f32 = 200.0;

// Training session -----------------------------------------------------------
pub(crate) const TICK_RATE_HZ: u32 = 60;
pub(crate) const MAX_TICKS_PER_ADVANCE: u32 = 240;
pub(crate) const STARTING_OXYGEN: f32 = 100.0;
pub(crate) const STARTING_TIME_SECS: u32 = 480;
pub(crate) const OXYGEN_DECAY_PER_SEC: f32 = 0.05;
pub(crate) const GRAB_BONUS: u32 = 50;
pub(crate) const BASE_TASK_POINTS: u32 = 200;
pub(crate) const CELEBRATION_SECS: f32 = 2.0;
pub(crate) const OXYGEN_BONUS_PER_PCT: f32 = 3.0;
pub(crate) const TIME_BONUS_PER_SEC: u32 = 2;

// HUD message durations ------------------------------------------------------
pub(crate) const MESSAGE_DEFAULT_MS: u32 = 2_000;
pub(crate) const MESSAGE_START_MS: u32 = 3_000;
pub(crate) const MESSAGE_TASK_DONE_MS: u32 = 3_000;
pub(crate) const MESSAGE_BRIEFING_MS: u32 = 4_000;
