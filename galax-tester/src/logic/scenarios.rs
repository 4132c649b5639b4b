use anyhow::{Context, Result, bail, ensure};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::ops::RangeInclusive;
use std::time::Duration;

use galax_game::{
    CancelPolicy, Difficulty, Ending, FailureCause, GameEngine, Location, MemoryPlayerStore,
    PlayerStore, ProgressionRules, Rank, StaticDataLoader, TrainingConfig, TrainingPath,
    TrainingSession, game_status,
};

use super::policy::{PilotPolicy, PilotStrategy};

const PLAYER_ID: &str = "qa-trainee";
const MAX_FRAMES: usize = 100_000;
/// Render-like frame lengths: sometimes no tick, sometimes two.
const FRAME_MS: RangeInclusive<u64> = 8..=34;

type Engine = GameEngine<StaticDataLoader, MemoryPlayerStore>;

/// What one scenario iteration observed.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub seed: u64,
    pub pilot: Option<PilotStrategy>,
    pub ticks: u64,
    pub ending: Option<Ending>,
    pub final_score: u32,
    pub player_points: u32,
}

impl RunSummary {
    fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn describe(&self) -> String {
        let pilot = self.pilot.map_or("-", PilotStrategy::label);
        let ending = self
            .ending
            .map_or_else(|| "-".to_string(), |ending| ending.to_string());
        format!(
            "seed {} pilot {pilot} ticks {} ending {ending} score {} points {}",
            self.seed, self.ticks, self.final_score, self.player_points
        )
    }
}

type ScenarioRunner = fn(u64) -> Result<RunSummary>;

#[derive(Clone)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    runner: ScenarioRunner,
}

impl TestScenario {
    const fn new(
        key: &'static str,
        name: &'static str,
        description: &'static str,
        runner: ScenarioRunner,
    ) -> Self {
        Self {
            key,
            name,
            description,
            runner,
        }
    }

    /// # Errors
    ///
    /// Returns the first violated expectation for this seed.
    pub fn run(&self, seed: u64) -> Result<RunSummary> {
        (self.runner)(seed)
    }
}

pub fn catalog_scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario::new(
            "progression",
            "Progression Walkthrough",
            "Complete every track in order and check unlocks, points, and astronaut mode",
            progression_walkthrough,
        ),
        TestScenario::new(
            "training-success",
            "Training Autopilot",
            "Fly every training task with the direct pilot and commit the score",
            |seed| training_success(seed, PilotStrategy::Direct),
        ),
        TestScenario::new(
            "training-jittery",
            "Training Jittery Pilot",
            "Fly every training task while dropping controls at random",
            |seed| training_success(seed, PilotStrategy::Jittery),
        ),
        TestScenario::new(
            "training-timeout",
            "Training Timeout",
            "Leave the trainee idle until the clock runs out",
            training_timeout,
        ),
        TestScenario::new(
            "pause-resume",
            "Pause and Resume",
            "Pause at random points and confirm paused time never simulates",
            pause_resume,
        ),
        TestScenario::new(
            "cancellation",
            "Cancellation",
            "Cancel after the first grab under a random cancel policy",
            cancellation,
        ),
    ]
}

pub fn find_scenario(key: &str) -> Option<TestScenario> {
    catalog_scenarios()
        .into_iter()
        .find(|scenario| scenario.key.eq_ignore_ascii_case(key))
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog_scenarios()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

fn engine() -> Result<Engine> {
    let engine = GameEngine::new(StaticDataLoader, MemoryPlayerStore::new());
    engine.load_or_create_player(PLAYER_ID, "QA Trainee")?;
    Ok(engine)
}

fn progression_walkthrough(seed: u64) -> Result<RunSummary> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let engine = engine()?;
    let rules = ProgressionRules::default_config();
    let mut expected_points = 0;

    let opening = *Difficulty::ALL.choose(&mut rng).context("no difficulties")?;
    let first = engine.complete_mission(PLAYER_ID, "orientation", opening)?;
    expected_points += rules.points_for(opening);
    ensure!(
        first.result.unlocked_paths.as_deref()
            == Some(&[TrainingPath::ScienceResearch, TrainingPath::EngineeringSystems][..]),
        "hub orientation unlocked {:?}",
        first.result.unlocked_paths
    );

    for path in TrainingPath::ALL {
        engine.select_path(PLAYER_ID, Location::Track(path))?;
        if let Some(next) = path.successor() {
            ensure!(
                engine.select_path(PLAYER_ID, Location::Track(next)).is_err(),
                "{next} opened before {path} was complete"
            );
        }

        for count in 1..=3 {
            let completion = if let Some(mission) = engine.next_mission(PLAYER_ID)? {
                expected_points += rules.points_for(mission.difficulty);
                engine.complete_catalog_mission(PLAYER_ID, &mission.id)?
            } else {
                let difficulty = *Difficulty::ALL.choose(&mut rng).context("no difficulties")?;
                expected_points += rules.points_for(difficulty);
                let id = format!("{}-drill-{count}", path.index());
                engine.complete_mission(PLAYER_ID, &id, difficulty)?
            };
            let progress = completion.player.progress.get(path);
            ensure!(progress == count, "{path} progress {progress} after {count} missions");
            let unlocked = completion.result.unlocked_paths;
            if count == 3 {
                ensure!(
                    unlocked == path.successor().map(|next| vec![next]),
                    "{path} completion unlocked {unlocked:?}"
                );
            } else {
                ensure!(unlocked.is_none(), "{path} unlocked {unlocked:?} early");
            }
        }
    }

    let player = engine
        .store()
        .load_player(PLAYER_ID)?
        .context("player vanished")?;
    ensure!(
        player.points == expected_points,
        "points {} expected {expected_points}",
        player.points
    );
    ensure!(
        player.astronaut_mode == (player.points >= rules.astronaut_threshold),
        "astronaut mode {} with {} points",
        player.astronaut_mode,
        player.points
    );
    let status = game_status(&player);
    ensure!(status.progress_percentage == 100, "status {status:?}");
    ensure!(status.rank == Rank::Astronaut, "rank {}", status.rank);
    ensure!(
        player.completed_missions.len() == 19,
        "mission log {:?}",
        player.completed_missions
    );

    Ok(RunSummary {
        player_points: player.points,
        ..RunSummary::new(seed)
    })
}

struct Flight {
    ended_events: usize,
}

/// Drive a session with seeded frame lengths until it ends or `stop` holds.
fn fly(
    session: &mut TrainingSession,
    pilot: &mut dyn PilotPolicy,
    rng: &mut ChaCha20Rng,
    frame_ms: RangeInclusive<u64>,
    stop: impl Fn(&TrainingSession) -> bool,
) -> Result<Flight> {
    let mut ended_events = 0;
    for _ in 0..MAX_FRAMES {
        if session.is_ended() || stop(session) {
            return Ok(Flight { ended_events });
        }
        let input = pilot.next_input(session);
        let frame = Duration::from_millis(rng.gen_range(frame_ms.clone()));
        let events = session.advance(frame, &input)?;
        ended_events += events.iter().filter(|e| e.outcome().is_some()).count();
    }
    bail!(
        "{} pilot still running after {MAX_FRAMES} frames ({} tasks done)",
        pilot.name(),
        session.tasks_completed()
    )
}

fn started_session(engine: &Engine) -> Result<TrainingSession> {
    let mut session = engine.start_training()?;
    session.start()?;
    Ok(session)
}

fn training_success(seed: u64, strategy: PilotStrategy) -> Result<RunSummary> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let engine = engine()?;
    let mut session = started_session(&engine)?;
    let mut pilot = strategy.create_policy(seed);
    let flight = fly(&mut session, pilot.as_mut(), &mut rng, FRAME_MS, |_| false)?;

    let outcome = *session.outcome().context("no outcome recorded")?;
    ensure!(outcome.ending == Ending::Success, "ended with {}", outcome.ending);
    ensure!(flight.ended_events == 1, "{} end events", flight.ended_events);
    ensure!(
        outcome.tasks_completed == session.tasks().len(),
        "{} of {} tasks",
        outcome.tasks_completed,
        session.tasks().len()
    );
    ensure!(
        outcome.final_score == outcome.accumulated_score + outcome.bonus,
        "final {} != {} + {}",
        outcome.final_score,
        outcome.accumulated_score,
        outcome.bonus
    );
    let player = engine.commit_training(PLAYER_ID, &outcome)?;
    ensure!(player.points == outcome.final_score, "committed {}", player.points);

    Ok(RunSummary {
        pilot: Some(strategy),
        ticks: session.simulated_ticks(),
        ending: Some(outcome.ending),
        final_score: outcome.final_score,
        player_points: player.points,
        ..RunSummary::new(seed)
    })
}

fn training_timeout(seed: u64) -> Result<RunSummary> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let engine = engine()?;
    let mut session = started_session(&engine)?;
    let mut pilot = PilotStrategy::Idle.create_policy(seed);
    // Frames stay under the per-advance tick cap so physics never skips.
    let flight = fly(&mut session, pilot.as_mut(), &mut rng, 100..=1_000, |_| false)?;

    let outcome = *session.outcome().context("no outcome recorded")?;
    ensure!(
        outcome.ending == Ending::Failure(FailureCause::TimeExpired),
        "ended with {}",
        outcome.ending
    );
    ensure!(flight.ended_events == 1, "{} end events", flight.ended_events);
    ensure!(outcome.bonus == 0, "failure paid bonus {}", outcome.bonus);
    ensure!(
        outcome.final_score == outcome.accumulated_score,
        "final {} accumulated {}",
        outcome.final_score,
        outcome.accumulated_score
    );
    let expected_ticks = u64::from(session.tuning().starting_time_secs)
        * u64::from(session.tuning().tick_rate_hz);
    ensure!(
        session.simulated_ticks() == expected_ticks,
        "timed out after {} ticks, expected {expected_ticks}",
        session.simulated_ticks()
    );

    Ok(RunSummary {
        pilot: Some(PilotStrategy::Idle),
        ticks: session.simulated_ticks(),
        ending: Some(outcome.ending),
        final_score: outcome.final_score,
        ..RunSummary::new(seed)
    })
}

fn pause_resume(seed: u64) -> Result<RunSummary> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let engine = engine()?;
    let mut session = started_session(&engine)?;
    let mut pilot = PilotStrategy::Direct.create_policy(seed);
    let mut ended_events = 0;

    while !session.is_ended() {
        let burst = rng.gen_range(30..=240);
        let target = session.simulated_ticks() + burst;
        ended_events += fly(&mut session, pilot.as_mut(), &mut rng, FRAME_MS, |s| {
            s.simulated_ticks() >= target
        })?
        .ended_events;
        if session.is_ended() || session.is_celebrating() {
            continue;
        }

        let ticks = session.simulated_ticks();
        let time = session.time_remaining();
        session.toggle_pause()?;
        for _ in 0..rng.gen_range(1..=20) {
            let frame = Duration::from_millis(rng.gen_range(16..=500));
            let input = pilot.next_input(&session);
            let events = session.advance(frame, &input)?;
            ensure!(events.is_empty(), "paused session emitted {events:?}");
        }
        ensure!(session.simulated_ticks() == ticks, "ticks ran while paused");
        ensure!(session.time_remaining() == time, "clock ran while paused");
        session.toggle_pause()?;
    }

    let outcome = *session.outcome().context("no outcome recorded")?;
    ensure!(outcome.ending == Ending::Success, "ended with {}", outcome.ending);
    ensure!(ended_events == 1, "{ended_events} end events");

    Ok(RunSummary {
        pilot: Some(PilotStrategy::Direct),
        ticks: session.simulated_ticks(),
        ending: Some(outcome.ending),
        final_score: outcome.final_score,
        ..RunSummary::new(seed)
    })
}

fn cancellation(seed: u64) -> Result<RunSummary> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let policy = if rng.gen_bool(0.5) {
        CancelPolicy::ForfeitBonus
    } else {
        CancelPolicy::ForfeitAll
    };
    let engine = engine()?;
    let config = TrainingConfig::default_config().with_cancel_policy(policy);
    let mut session = TrainingSession::new(config)?;
    session.start()?;
    let mut pilot = PilotStrategy::Direct.create_policy(seed);
    fly(&mut session, pilot.as_mut(), &mut rng, FRAME_MS, |s| s.score() > 0)?;

    let events = session.cancel()?;
    let outcome = *events
        .iter()
        .find_map(|event| event.outcome())
        .context("cancel produced no outcome")?;
    ensure!(outcome.ending == Ending::Cancelled, "ended with {}", outcome.ending);
    ensure!(outcome.bonus == 0, "cancel paid bonus {}", outcome.bonus);
    let expected = match policy {
        CancelPolicy::ForfeitBonus => outcome.accumulated_score,
        CancelPolicy::ForfeitAll => 0,
    };
    ensure!(
        outcome.final_score == expected,
        "{policy:?} committed {}",
        outcome.final_score
    );
    ensure!(session.cancel().is_err(), "second cancel accepted");

    let player = engine.commit_training(PLAYER_ID, &outcome)?;
    Ok(RunSummary {
        pilot: Some(PilotStrategy::Direct),
        ticks: session.simulated_ticks(),
        ending: Some(outcome.ending),
        final_score: outcome.final_score,
        player_points: player.points,
        ..RunSummary::new(seed)
    })
}
