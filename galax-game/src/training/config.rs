//! Training session configuration: physics tuning plus the pool scenario.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use super::event::CancelPolicy;
use super::physics::Vec3;
use crate::constants::{
    ASCEND_FACTOR, BASE_TASK_POINTS, BUOYANCY_DRIFT, CELEBRATION_SECS, DEPTH_FACTOR,
    DESCEND_FACTOR, GRAB_BONUS, HANDRAIL_DAMPING, INTERACTION_RADIUS, LATERAL_FACTOR,
    MAX_DEPTH_SPEED, MAX_LATERAL_SPEED, MAX_TICKS_PER_ADVANCE, MAX_VERTICAL_SPEED, MOVE_SPEED,
    OXYGEN_BONUS_PER_PCT, OXYGEN_DECAY_PER_SEC, POOL_MAX_X, POOL_MAX_Y, POOL_MAX_Z, POOL_MIN_X,
    POOL_MIN_Y, POOL_MIN_Z, ROTATION_SPEED, SPAWN_X, SPAWN_Y, SPAWN_Z, STARTING_OXYGEN,
    STARTING_TIME_SECS, TICK_RATE_HZ, TIME_BONUS_PER_SEC, WATER_DRAG,
};

const DEFAULT_SCENARIO_DATA: &str = include_str!("../../assets/data/training.json");

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for PoolBounds {
    fn default() -> Self {
        Self {
            min: Vec3::new(POOL_MIN_X, POOL_MIN_Y, POOL_MIN_Z),
            max: Vec3::new(POOL_MAX_X, POOL_MAX_Y, POOL_MAX_Z),
        }
    }
}

impl PoolBounds {
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        (self.min.x..=self.max.x).contains(&point.x)
            && (self.min.y..=self.max.y).contains(&point.y)
            && (self.min.z..=self.max.z).contains(&point.z)
    }
}

/// Physics, resource, and scoring knobs for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingTuning {
    pub drag: f32,
    pub move_speed: f32,
    pub ascend_factor: f32,
    pub descend_factor: f32,
    pub lateral_factor: f32,
    pub depth_factor: f32,
    pub rotation_speed: f32,
    pub buoyancy: f32,
    pub max_lateral_speed: f32,
    pub max_vertical_speed: f32,
    pub max_depth_speed: f32,
    pub handrail_damping: f32,
    pub interaction_radius: f32,
    pub bounds: PoolBounds,
    pub spawn: Vec3,
    /// Fixed physics steps per simulated second.
    pub tick_rate_hz: u32,
    /// Physics ticks per advance; time beyond this only runs the clock.
    pub max_ticks_per_advance: u32,
    pub starting_oxygen: f32,
    pub starting_time_secs: u32,
    pub oxygen_decay_per_sec: f32,
    pub grab_bonus: u32,
    pub base_task_points: u32,
    pub celebration_secs: f32,
    pub oxygen_bonus_per_pct: f32,
    pub time_bonus_per_sec: u32,
}

impl Default for TrainingTuning {
    fn default() -> Self {
        Self {
            drag: WATER_DRAG,
            move_speed: MOVE_SPEED,
            ascend_factor: ASCEND_FACTOR,
            descend_factor: DESCEND_FACTOR,
            lateral_factor: LATERAL_FACTOR,
            depth_factor: DEPTH_FACTOR,
            rotation_speed: ROTATION_SPEED,
            buoyancy: BUOYANCY_DRIFT,
            max_lateral_speed: MAX_LATERAL_SPEED,
            max_vertical_speed: MAX_VERTICAL_SPEED,
            max_depth_speed: MAX_DEPTH_SPEED,
            handrail_damping: HANDRAIL_DAMPING,
            interaction_radius: INTERACTION_RADIUS,
            bounds: PoolBounds::default(),
            spawn: Vec3::new(SPAWN_X, SPAWN_Y, SPAWN_Z),
            tick_rate_hz: TICK_RATE_HZ,
            max_ticks_per_advance: MAX_TICKS_PER_ADVANCE,
            starting_oxygen: STARTING_OXYGEN,
            starting_time_secs: STARTING_TIME_SECS,
            oxygen_decay_per_sec: OXYGEN_DECAY_PER_SEC,
            grab_bonus: GRAB_BONUS,
            base_task_points: BASE_TASK_POINTS,
            celebration_secs: CELEBRATION_SECS,
            oxygen_bonus_per_pct: OXYGEN_BONUS_PER_PCT,
            time_bonus_per_sec: TIME_BONUS_PER_SEC,
        }
    }
}

impl TrainingTuning {
    /// Per-axis velocity ceilings as a vector.
    #[must_use]
    pub const fn speed_limits(&self) -> Vec3 {
        Vec3::new(
            self.max_lateral_speed,
            self.max_vertical_speed,
            self.max_depth_speed,
        )
    }

    /// # Errors
    ///
    /// Returns `ScenarioConfigError` when any knob is outside its usable range.
    pub fn validate(&self) -> Result<(), ScenarioConfigError> {
        check_range("drag", self.drag, 0.0, 1.0)?;
        check_range("handrail_damping", self.handrail_damping, 0.0, 1.0)?;
        check_positive("move_speed", self.move_speed)?;
        check_positive("max_lateral_speed", self.max_lateral_speed)?;
        check_positive("max_vertical_speed", self.max_vertical_speed)?;
        check_positive("max_depth_speed", self.max_depth_speed)?;
        check_positive("interaction_radius", self.interaction_radius)?;
        check_positive("oxygen_decay_per_sec", self.oxygen_decay_per_sec)?;
        check_range("starting_oxygen", self.starting_oxygen, f32::EPSILON, 100.0)?;
        check_range("celebration_secs", self.celebration_secs, 0.0, 60.0)?;
        if self.tick_rate_hz == 0 {
            return Err(ScenarioConfigError::ZeroCount("tick_rate_hz"));
        }
        if self.max_ticks_per_advance == 0 {
            return Err(ScenarioConfigError::ZeroCount("max_ticks_per_advance"));
        }
        if self.starting_time_secs == 0 {
            return Err(ScenarioConfigError::ZeroCount("starting_time_secs"));
        }
        let PoolBounds { min, max } = self.bounds;
        if min.x >= max.x || min.y >= max.y || min.z >= max.z {
            return Err(ScenarioConfigError::EmptyBounds);
        }
        if !self.bounds.contains(self.spawn) {
            return Err(ScenarioConfigError::SpawnOutOfBounds);
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ScenarioConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ScenarioConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        })
    }
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ScenarioConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ScenarioConfigError::NotPositive { field, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Tool,
    Component,
    Workstation,
    Handrail,
    Target,
}

impl ObjectKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Component => "component",
            Self::Workstation => "workstation",
            Self::Handrail => "handrail",
            Self::Target => "target",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolObject {
    pub id: String,
    pub kind: ObjectKind,
    pub position: Vec3,
    #[serde(default)]
    pub size: f32,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    /// Only field that changes during a session.
    #[serde(default)]
    pub installed: bool,
}

impl PoolObject {
    /// HUD label, falling back to the id.
    #[must_use]
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub objective: String,
    pub required_object_ids: Vec<String>,
    pub target: Vec3,
    #[serde(default)]
    pub time_bonus: u32,
    #[serde(default)]
    pub fact: String,
}

/// Pool layout and the ordered task checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrainingScenario {
    #[serde(default)]
    pub objects: Vec<PoolObject>,
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
}

impl TrainingScenario {
    /// Load a scenario from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a scenario.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_SCENARIO_DATA).unwrap_or_else(|err| {
            log::warn!("training scenario asset unreadable, using empty scenario: {err}");
            Self::default()
        })
    }

    #[must_use]
    pub fn object(&self, id: &str) -> Option<&PoolObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    /// # Errors
    ///
    /// Returns `ScenarioConfigError` for empty lists, duplicate object ids,
    /// dangling task references, or tasks without a workstation to finish at.
    pub fn validate(&self) -> Result<(), ScenarioConfigError> {
        if self.tasks.is_empty() {
            return Err(ScenarioConfigError::NoTasks);
        }
        if self.objects.is_empty() {
            return Err(ScenarioConfigError::NoObjects);
        }
        let mut seen = HashSet::new();
        for object in &self.objects {
            if !seen.insert(object.id.as_str()) {
                return Err(ScenarioConfigError::DuplicateObject(object.id.clone()));
            }
        }
        for task in &self.tasks {
            for id in &task.required_object_ids {
                if !seen.contains(id.as_str()) {
                    return Err(ScenarioConfigError::MissingObject {
                        task: task.id.clone(),
                        object: id.clone(),
                    });
                }
            }
            let has_workstation = task.required_object_ids.iter().any(|id| {
                self.object(id)
                    .is_some_and(|object| object.kind == ObjectKind::Workstation)
            });
            if !has_workstation {
                return Err(ScenarioConfigError::NoWorkstation(task.id.clone()));
            }
        }
        Ok(())
    }
}

/// Everything a [`super::TrainingSession`] needs to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrainingConfig {
    #[serde(default)]
    pub tuning: TrainingTuning,
    #[serde(default)]
    pub scenario: TrainingScenario,
    #[serde(default)]
    pub cancel_policy: CancelPolicy,
}

impl TrainingConfig {
    #[must_use]
    pub fn load_from_static() -> Self {
        Self {
            tuning: TrainingTuning::default(),
            scenario: TrainingScenario::load_from_static(),
            cancel_policy: CancelPolicy::default(),
        }
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }

    #[must_use]
    pub const fn with_cancel_policy(mut self, policy: CancelPolicy) -> Self {
        self.cancel_policy = policy;
        self
    }

    /// # Errors
    ///
    /// Returns `ScenarioConfigError` when the tuning or scenario is unusable.
    pub fn validate(&self) -> Result<(), ScenarioConfigError> {
        self.tuning.validate()?;
        self.scenario.validate()
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScenarioConfigError {
    #[error("scenario has no tasks")]
    NoTasks,
    #[error("scenario has no pool objects")]
    NoObjects,
    #[error("object id {0} appears more than once")]
    DuplicateObject(String),
    #[error("task {task} requires unknown object {object}")]
    MissingObject { task: String, object: String },
    #[error("task {0} has no workstation to complete at")]
    NoWorkstation(String),
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f32,
        max: f32,
        value: f32,
    },
    #[error("{field} must be positive (got {value:.2})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{0} must be at least 1")]
    ZeroCount(&'static str),
    #[error("pool bounds enclose no volume")]
    EmptyBounds,
    #[error("spawn point lies outside the pool")]
    SpawnOutOfBounds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_scenario_is_valid() {
        let config = TrainingConfig::load_from_static();
        assert_eq!(config.scenario.tasks.len(), 3);
        assert_eq!(config.scenario.objects.len(), 12);
        assert_eq!(config.cancel_policy, CancelPolicy::ForfeitBonus);
        config.validate().unwrap();
        let wrench = config.scenario.object("wrench").unwrap();
        assert_eq!(wrench.kind, ObjectKind::Tool);
        assert_eq!(wrench.display_label(), "🔧 Wrench");
    }

    #[test]
    fn empty_scenarios_are_rejected() {
        let mut scenario = TrainingScenario::load_from_static();
        scenario.tasks.clear();
        assert_eq!(scenario.validate(), Err(ScenarioConfigError::NoTasks));

        let mut scenario = TrainingScenario::load_from_static();
        scenario.objects.clear();
        assert_eq!(scenario.validate(), Err(ScenarioConfigError::NoObjects));
    }

    #[test]
    fn dangling_and_duplicate_ids_are_rejected() {
        let mut scenario = TrainingScenario::load_from_static();
        scenario.tasks[1].required_object_ids.push("laser".into());
        assert_eq!(
            scenario.validate(),
            Err(ScenarioConfigError::MissingObject {
                task: "task-2".into(),
                object: "laser".into()
            })
        );

        let mut scenario = TrainingScenario::load_from_static();
        let copy = scenario.objects[0].clone();
        scenario.objects.push(copy);
        assert_eq!(
            scenario.validate(),
            Err(ScenarioConfigError::DuplicateObject("wrench".into()))
        );

        let mut scenario = TrainingScenario::load_from_static();
        scenario.tasks[2].required_object_ids = vec!["emergency-kit".into()];
        assert_eq!(
            scenario.validate(),
            Err(ScenarioConfigError::NoWorkstation("task-3".into()))
        );
    }

    #[test]
    fn tuning_bounds_are_enforced() {
        let mut tuning = TrainingTuning::default();
        tuning.validate().unwrap();
        tuning.oxygen_decay_per_sec = 0.0;
        assert!(matches!(
            tuning.validate(),
            Err(ScenarioConfigError::NotPositive {
                field: "oxygen_decay_per_sec",
                ..
            })
        ));

        let mut tuning = TrainingTuning::default();
        tuning.tick_rate_hz = 0;
        assert_eq!(
            tuning.validate(),
            Err(ScenarioConfigError::ZeroCount("tick_rate_hz"))
        );

        let mut tuning = TrainingTuning::default();
        tuning.spawn = Vec3::new(0.0, 0.0, 0.0);
        assert_eq!(tuning.validate(), Err(ScenarioConfigError::SpawnOutOfBounds));
    }
}
