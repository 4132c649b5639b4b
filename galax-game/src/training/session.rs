use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;

use super::config::{
    ObjectKind, PoolObject, ScenarioConfigError, TaskSpec, TrainingConfig, TrainingTuning,
};
use super::event::{
    CancelPolicy, Ending, EventBuffer, FailureCause, HudSnapshot, TrainingEvent, TrainingOutcome,
};
use super::interaction::{Interaction, nearest_within, resolve};
use super::physics::{Actor, MoveSet, TrainingInput};
use crate::constants::{
    MESSAGE_BRIEFING_MS, MESSAGE_DEFAULT_MS, MESSAGE_START_MS, MESSAGE_TASK_DONE_MS,
};
use crate::numbers::floor_f32_to_u32;

const NANOS_PER_SEC: u64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "ending", rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    Running,
    Paused,
    Ended(Ending),
}

#[derive(Debug, Error, PartialEq)]
pub enum TrainingError {
    #[error("invalid training configuration: {0}")]
    Config(#[from] ScenarioConfigError),
    #[error("training session is not running")]
    NotRunning,
    #[error("training session already started")]
    AlreadyStarted,
    #[error("training session already ended")]
    AlreadyEnded,
}

/// One underwater training run, stepped at a fixed rate.
///
/// Wall-clock time fed to [`TrainingSession::advance`] is converted to whole
/// physics ticks; paused time is discarded, so resource decay tracks
/// simulated running time only.
#[derive(Debug, Clone)]
pub struct TrainingSession {
    tuning: TrainingTuning,
    objects: Vec<PoolObject>,
    tasks: Vec<TaskSpec>,
    cancel_policy: CancelPolicy,
    actor: Actor,
    state: SessionState,
    oxygen: f32,
    time_remaining: u32,
    score: u32,
    current_task_index: usize,
    tasks_completed: usize,
    grab_bonus_claimed: BTreeSet<String>,
    step: Duration,
    accumulator: Duration,
    ticks_into_second: u32,
    celebration_ticks: Option<u32>,
    interact_held: bool,
    pending_interact: bool,
    simulated_ticks: u64,
    outcome: Option<TrainingOutcome>,
}

impl TrainingSession {
    /// # Errors
    ///
    /// Returns `TrainingError::Config` when the tuning or scenario fails validation.
    pub fn new(config: TrainingConfig) -> Result<Self, TrainingError> {
        config.validate()?;
        let TrainingConfig {
            tuning,
            scenario,
            cancel_policy,
        } = config;
        let step = Duration::from_nanos(NANOS_PER_SEC / u64::from(tuning.tick_rate_hz));
        Ok(Self {
            actor: Actor::spawn(tuning.spawn),
            oxygen: tuning.starting_oxygen,
            time_remaining: tuning.starting_time_secs,
            objects: scenario.objects,
            tasks: scenario.tasks,
            cancel_policy,
            state: SessionState::NotStarted,
            score: 0,
            current_task_index: 0,
            tasks_completed: 0,
            grab_bonus_claimed: BTreeSet::new(),
            step,
            accumulator: Duration::ZERO,
            ticks_into_second: 0,
            celebration_ticks: None,
            interact_held: false,
            pending_interact: false,
            simulated_ticks: 0,
            outcome: None,
            tuning,
        })
    }

    /// # Errors
    ///
    /// Returns `AlreadyStarted` or `AlreadyEnded` unless the session is fresh.
    pub fn start(&mut self) -> Result<EventBuffer, TrainingError> {
        match self.state {
            SessionState::NotStarted => {}
            SessionState::Ended(_) => return Err(TrainingError::AlreadyEnded),
            SessionState::Running | SessionState::Paused => {
                return Err(TrainingError::AlreadyStarted);
            }
        }
        self.state = SessionState::Running;
        log::debug!(
            "training started: {} tasks, {} objects",
            self.tasks.len(),
            self.objects.len()
        );

        let mut events = EventBuffer::new();
        events.push(TrainingEvent::message(self.start_message(), MESSAGE_START_MS));
        self.push_briefing(&mut events);
        events.push(TrainingEvent::Hud(self.hud()));
        Ok(events)
    }

    fn start_message(&self) -> String {
        let first_tool = self.tasks.first().and_then(|task| {
            task.required_object_ids.iter().find(|id| {
                self.object(id)
                    .is_some_and(|object| object.kind == ObjectKind::Tool)
            })
        });
        first_tool.map_or_else(
            || "Mission started!".to_string(),
            |tool| format!("Mission started! Navigate to retrieve the {tool}."),
        )
    }

    /// Flip between running and paused, returning the new state.
    ///
    /// # Errors
    ///
    /// Returns `NotRunning` before start and `AlreadyEnded` after the end.
    pub fn toggle_pause(&mut self) -> Result<SessionState, TrainingError> {
        self.state = match self.state {
            SessionState::Running => {
                log::debug!("training paused at tick {}", self.simulated_ticks);
                self.pending_interact = false;
                SessionState::Paused
            }
            SessionState::Paused => {
                log::debug!("training resumed at tick {}", self.simulated_ticks);
                SessionState::Running
            }
            SessionState::NotStarted => return Err(TrainingError::NotRunning),
            SessionState::Ended(_) => return Err(TrainingError::AlreadyEnded),
        };
        Ok(self.state)
    }

    /// Feed elapsed wall time and the held input; runs as many fixed ticks as fit.
    ///
    /// While paused, nothing advances and the elapsed time is discarded.
    ///
    /// # Errors
    ///
    /// Returns `NotRunning` before start and `AlreadyEnded` after the end.
    pub fn advance(
        &mut self,
        elapsed: Duration,
        input: &TrainingInput,
    ) -> Result<EventBuffer, TrainingError> {
        let mut events = EventBuffer::new();
        if !self.accepts_input()? {
            return Ok(events);
        }
        self.latch_interact(input.interact);
        self.accumulator += elapsed;

        let mut ran = 0;
        while self.accumulator >= self.step && ran < self.tuning.max_ticks_per_advance {
            self.accumulator -= self.step;
            ran += 1;
            self.step_once(&input.moves, &mut events);
            if self.is_ended() {
                return Ok(events);
            }
        }
        // Physics stops at the cap; the rest of the running time still drains
        // the clock one skipped tick at a time.
        let mut skipped: u64 = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            skipped += 1;
            self.run_clock(&mut events);
            if self.is_ended() {
                return Ok(events);
            }
        }
        if skipped > 0 {
            log::debug!("physics capped at {ran} ticks, clock caught up {skipped} more");
        }
        if ran > 0 {
            events.push(TrainingEvent::Hud(self.hud()));
        }
        Ok(events)
    }

    /// Run exactly one fixed tick regardless of elapsed time.
    ///
    /// # Errors
    ///
    /// Returns `NotRunning` before start and `AlreadyEnded` after the end.
    pub fn tick(&mut self, input: &TrainingInput) -> Result<EventBuffer, TrainingError> {
        let mut events = EventBuffer::new();
        if !self.accepts_input()? {
            return Ok(events);
        }
        self.latch_interact(input.interact);
        self.step_once(&input.moves, &mut events);
        if !self.is_ended() {
            events.push(TrainingEvent::Hud(self.hud()));
        }
        Ok(events)
    }

    /// Close the session early without the end bonus. During the celebration
    /// window the verdict is already in, so the run ends as a success.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyEnded` when the session has already produced an outcome.
    pub fn cancel(&mut self) -> Result<EventBuffer, TrainingError> {
        if self.is_ended() {
            return Err(TrainingError::AlreadyEnded);
        }
        let mut events = EventBuffer::new();
        if self.celebration_ticks.take().is_some() {
            log::debug!("cancel during celebration, closing as success");
            self.finish(Ending::Success, &mut events);
        } else {
            self.finish(Ending::Cancelled, &mut events);
        }
        Ok(events)
    }

    /// `Ok(true)` when ticks may run, `Ok(false)` while paused.
    fn accepts_input(&self) -> Result<bool, TrainingError> {
        match self.state {
            SessionState::Running => Ok(true),
            SessionState::Paused => Ok(false),
            SessionState::NotStarted => Err(TrainingError::NotRunning),
            SessionState::Ended(_) => Err(TrainingError::AlreadyEnded),
        }
    }

    fn latch_interact(&mut self, pressed: bool) {
        if pressed && !self.interact_held {
            self.pending_interact = true;
        }
        self.interact_held = pressed;
    }

    fn step_once(&mut self, moves: &MoveSet, events: &mut EventBuffer) {
        self.actor.step(moves, &self.tuning);
        self.simulated_ticks += 1;

        let interacted = std::mem::take(&mut self.pending_interact);
        if self.celebration_ticks.is_some() {
            self.count_down_celebration(events);
            return;
        }

        let finished_last_task = interacted && self.interact(events);
        if let Some(cause) = self.decay_resources() {
            self.finish(Ending::Failure(cause), events);
            return;
        }
        if finished_last_task {
            let ticks = floor_f32_to_u32(
                self.tuning.celebration_secs * tick_rate_f32(self.tuning.tick_rate_hz),
            );
            log::debug!("all tasks complete, celebrating for {ticks} ticks");
            if ticks == 0 {
                self.finish(Ending::Success, events);
            } else {
                self.celebration_ticks = Some(ticks);
            }
        }
    }

    /// Clock-only tick for running time past the physics cap.
    fn run_clock(&mut self, events: &mut EventBuffer) {
        if self.celebration_ticks.is_some() {
            self.count_down_celebration(events);
        } else if let Some(cause) = self.decay_resources() {
            self.finish(Ending::Failure(cause), events);
        }
    }

    fn count_down_celebration(&mut self, events: &mut EventBuffer) {
        // Verdict is locked; resources and score stay frozen.
        match self.celebration_ticks {
            Some(remaining) if remaining > 1 => self.celebration_ticks = Some(remaining - 1),
            _ => {
                self.celebration_ticks = None;
                self.finish(Ending::Success, events);
            }
        }
    }

    /// Returns true when this interaction completed the final task.
    fn interact(&mut self, events: &mut EventBuffer) -> bool {
        let Some(idx) = nearest_within(
            &self.objects,
            self.actor.position,
            self.tuning.interaction_radius,
        ) else {
            log::trace!("interact with nothing in reach");
            return false;
        };
        let object = &self.objects[idx];
        let action = resolve(&self.actor, object, self.tasks.get(self.current_task_index));
        let label = object.display_label().to_string();
        let id = object.id.clone();
        log::trace!("interact with {id}: {action:?}");

        match action {
            Interaction::Release => {
                self.actor.grabbed = None;
                events.push(TrainingEvent::message(
                    format!("Released {label}"),
                    MESSAGE_DEFAULT_MS,
                ));
            }
            Interaction::Grab => {
                self.actor.grabbed = Some(id.clone());
                let text = if self.grab_bonus_claimed.insert(id) {
                    self.score = self.score.saturating_add(self.tuning.grab_bonus);
                    format!("Grabbed {label}! +{} points", self.tuning.grab_bonus)
                } else {
                    format!("Grabbed {label}")
                };
                events.push(TrainingEvent::message(text, MESSAGE_DEFAULT_MS));
            }
            Interaction::Install => return self.complete_task(idx, events),
            Interaction::Stabilize => {
                self.actor.stabilize(self.tuning.handrail_damping);
                events.push(TrainingEvent::message(
                    "Using handrail for stability",
                    MESSAGE_DEFAULT_MS,
                ));
            }
            Interaction::Ignored => {}
        }
        false
    }

    fn complete_task(&mut self, workstation: usize, events: &mut EventBuffer) -> bool {
        let Some(task) = self.tasks.get(self.current_task_index) else {
            return false;
        };
        let points = self.tuning.base_task_points.saturating_add(task.time_bonus);
        log::debug!("task {} complete at tick {}, +{points}", task.id, self.simulated_ticks);

        self.objects[workstation].installed = true;
        self.actor.grabbed = None;
        self.score = self.score.saturating_add(points);
        self.tasks_completed += 1;
        self.current_task_index += 1;
        events.push(TrainingEvent::message(
            format!("✅ Task completed! +{points} points"),
            MESSAGE_TASK_DONE_MS,
        ));

        if self.current_task_index >= self.tasks.len() {
            return true;
        }
        self.push_briefing(events);
        false
    }

    fn push_briefing(&self, events: &mut EventBuffer) {
        let Some(task) = self.current_task() else {
            return;
        };
        if self.current_task_index > 0 {
            events.push(TrainingEvent::message(
                format!("Next task: {}", task.title),
                MESSAGE_BRIEFING_MS,
            ));
        }
        events.push(TrainingEvent::Briefing {
            index: self.current_task_index,
            title: task.title.clone(),
            objective: task.objective.clone(),
        });
    }

    /// Applies the once-per-second decay when this tick closes a second.
    fn decay_resources(&mut self) -> Option<FailureCause> {
        self.ticks_into_second += 1;
        if self.ticks_into_second < self.tuning.tick_rate_hz {
            return None;
        }
        self.ticks_into_second = 0;
        self.time_remaining = self.time_remaining.saturating_sub(1);
        self.oxygen = (self.oxygen - self.tuning.oxygen_decay_per_sec).max(0.0);

        if self.oxygen <= 0.0 {
            Some(FailureCause::OxygenDepleted)
        } else if self.time_remaining == 0 {
            Some(FailureCause::TimeExpired)
        } else {
            None
        }
    }

    /// Remaining-resource bonus awarded on success.
    #[must_use]
    pub fn end_bonus(&self) -> u32 {
        floor_f32_to_u32(self.oxygen * self.tuning.oxygen_bonus_per_pct).saturating_add(
            self.time_remaining
                .saturating_mul(self.tuning.time_bonus_per_sec),
        )
    }

    fn finish(&mut self, ending: Ending, events: &mut EventBuffer) {
        let bonus = if ending.is_success() { self.end_bonus() } else { 0 };
        let final_score = match (ending, self.cancel_policy) {
            (Ending::Success, _) => self.score.saturating_add(bonus),
            (Ending::Failure(_), _) | (Ending::Cancelled, CancelPolicy::ForfeitBonus) => self.score,
            (Ending::Cancelled, CancelPolicy::ForfeitAll) => 0,
        };
        let outcome = TrainingOutcome {
            ending,
            accumulated_score: self.score,
            bonus,
            final_score,
            tasks_completed: self.tasks_completed,
        };
        log::debug!(
            "training ended ({ending}) after {} ticks: score {} bonus {bonus} final {final_score}",
            self.simulated_ticks,
            self.score
        );
        self.state = SessionState::Ended(ending);
        self.outcome = Some(outcome);
        self.pending_interact = false;
        events.push(TrainingEvent::Ended(outcome));
    }

    #[must_use]
    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            oxygen: self.oxygen,
            time_remaining: self.time_remaining,
            score: self.score,
            current_task_index: self.current_task_index,
            tasks_completed: self.tasks_completed,
            total_tasks: self.tasks.len(),
            position: self.actor.position,
            grabbed: self.actor.grabbed.clone(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn is_ended(&self) -> bool {
        matches!(self.state, SessionState::Ended(_))
    }

    /// Final outcome, available once the session has ended.
    #[must_use]
    pub const fn outcome(&self) -> Option<&TrainingOutcome> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    #[must_use]
    pub fn objects(&self) -> &[PoolObject] {
        &self.objects
    }

    #[must_use]
    pub fn object(&self, id: &str) -> Option<&PoolObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    #[must_use]
    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    #[must_use]
    pub fn current_task(&self) -> Option<&TaskSpec> {
        self.tasks.get(self.current_task_index)
    }

    #[must_use]
    pub const fn oxygen(&self) -> f32 {
        self.oxygen
    }

    #[must_use]
    pub const fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub const fn tasks_completed(&self) -> usize {
        self.tasks_completed
    }

    /// Celebration window is open: the verdict is in but not yet emitted.
    #[must_use]
    pub const fn is_celebrating(&self) -> bool {
        self.celebration_ticks.is_some()
    }

    #[must_use]
    pub const fn simulated_ticks(&self) -> u64 {
        self.simulated_ticks
    }

    #[must_use]
    pub const fn tuning(&self) -> &TrainingTuning {
        &self.tuning
    }
}

fn tick_rate_f32(rate: u32) -> f32 {
    num_traits::cast::<u32, f32>(rate).unwrap_or(0.0)
}
