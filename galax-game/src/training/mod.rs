//! Underwater training simulation.
//!
//! A [`TrainingSession`] owns the actor, pool objects, task checklist, and
//! depleting resources for one run. Hosts feed it elapsed time and held input,
//! render the returned [`TrainingEvent`]s, and hand the single
//! [`TrainingOutcome::final_score`] back to progression.

mod config;
mod event;
mod interaction;
mod physics;
mod session;

pub use config::{
    ObjectKind, PoolBounds, PoolObject, ScenarioConfigError, TaskSpec, TrainingConfig,
    TrainingScenario, TrainingTuning,
};
pub use event::{
    CancelPolicy, Ending, EventBuffer, FailureCause, HudSnapshot, TrainingEvent, TrainingOutcome,
};
pub use interaction::{Interaction, nearest_within, resolve};
pub use physics::{Actor, MoveSet, TrainingInput, Vec3};
pub use session::{SessionState, TrainingError, TrainingSession};
