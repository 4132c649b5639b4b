use std::fmt;

use galax_game::training::{ObjectKind, Vec3};
use galax_game::{MoveSet, TrainingInput, TrainingSession};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Distance at which the pilot stops steering and presses interact.
const ARRIVAL_DISTANCE: f32 = 8.0;
/// Ticks of distance the pilot plans to cover; larger values approach more gently.
const APPROACH_TICKS: f32 = 12.0;
const VELOCITY_DEADBAND: f32 = 0.3;
const CRUISE_SPEED: f32 = 2.5;

/// Input source for an automated training run.
pub trait PilotPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Controls to hold for the next tick.
    fn next_input(&mut self, session: &TrainingSession) -> TrainingInput;
}

/// Built-in pilots for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PilotStrategy {
    /// Flies straight to each objective.
    Direct,
    /// Like `Direct` but drops controls at random, seeded per run.
    Jittery,
    /// Never touches the controls.
    Idle,
}

impl PilotStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Direct => "Direct",
            Self::Jittery => "Jittery",
            Self::Idle => "Idle",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PilotPolicy> {
        match self {
            Self::Direct => Box::new(DirectPilot::default()),
            Self::Jittery => Box::new(JitteryPilot::new(seed)),
            Self::Idle => Box::new(IdlePilot),
        }
    }
}

impl fmt::Display for PilotStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Default)]
struct DirectPilot {
    pressed_last: bool,
}

struct JitteryPilot {
    inner: DirectPilot,
    rng: ChaCha20Rng,
    dropout: f64,
}

impl JitteryPilot {
    fn new(seed: u64) -> Self {
        Self {
            inner: DirectPilot::default(),
            rng: ChaCha20Rng::seed_from_u64(seed),
            dropout: 0.25,
        }
    }
}

struct IdlePilot;

impl PilotPolicy for DirectPilot {
    fn name(&self) -> &'static str {
        "Direct"
    }

    fn next_input(&mut self, session: &TrainingSession) -> TrainingInput {
        let Some(target) = objective(session) else {
            self.pressed_last = false;
            return TrainingInput::idle();
        };
        let actor = session.actor();
        if actor.position.distance(target) < ARRIVAL_DISTANCE {
            // Interact is edge-triggered, so release between presses.
            let press = !self.pressed_last;
            self.pressed_last = press;
            return TrainingInput {
                moves: MoveSet::default(),
                interact: press,
            };
        }
        self.pressed_last = false;
        TrainingInput::with_moves(steer(target - actor.position, actor.velocity))
    }
}

impl PilotPolicy for JitteryPilot {
    fn name(&self) -> &'static str {
        "Jittery"
    }

    fn next_input(&mut self, session: &TrainingSession) -> TrainingInput {
        let input = self.inner.next_input(session);
        if input.interact || !self.rng.gen_bool(self.dropout) {
            return input;
        }
        TrainingInput::idle()
    }
}

impl PilotPolicy for IdlePilot {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn next_input(&mut self, _session: &TrainingSession) -> TrainingInput {
        TrainingInput::idle()
    }
}

/// Position the pilot is heading for: the current task's tool, then its workstation.
#[must_use]
pub fn objective(session: &TrainingSession) -> Option<Vec3> {
    let task = session.current_task()?;
    let wanted = if session.actor().grabbed.is_some() {
        ObjectKind::Workstation
    } else {
        ObjectKind::Tool
    };
    task.required_object_ids
        .iter()
        .filter_map(|id| session.object(id))
        .find(|object| object.kind == wanted)
        .map(|object| object.position)
}

fn steer(delta: Vec3, velocity: Vec3) -> MoveSet {
    let (left, right) = axis(delta.x, velocity.x);
    let (up, down) = axis(delta.y, velocity.y);
    let (back, forward) = axis(delta.z, velocity.z);
    MoveSet {
        up,
        down,
        left,
        right,
        forward,
        back,
        ..MoveSet::default()
    }
}

/// (negative, positive) presses tracking a velocity proportional to distance.
fn axis(delta: f32, velocity: f32) -> (bool, bool) {
    let desired = (delta / APPROACH_TICKS).clamp(-CRUISE_SPEED, CRUISE_SPEED);
    (
        velocity > desired + VELOCITY_DEADBAND,
        velocity < desired - VELOCITY_DEADBAND,
    )
}
