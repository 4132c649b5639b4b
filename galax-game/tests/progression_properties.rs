use galax_game::constants::MISSIONS_PER_PATH;
use galax_game::{
    Difficulty, Location, MissionCatalog, PathDirectory, Player, ProgressionRules, Progress,
    TrainingPath, complete_mission, next_mission, progress_percentage, select_path,
    unlocked_paths, validate_path_selection,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

const SWEEP_SEEDS: [u64; 4] = [7, 1337, 0x00C0_FFEE, 0xDEAD_BEEF];
const DIFFICULTIES: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

fn random_progress(rng: &mut ChaCha20Rng) -> Progress {
    Progress::from_counts(
        TrainingPath::ALL.map(|path| (path, rng.gen_range(0..=MISSIONS_PER_PATH))),
    )
}

fn random_player(rng: &mut ChaCha20Rng) -> Player {
    let mut player = Player::new("sweep", "Sweep");
    player.progress = random_progress(rng);
    player.points = rng.gen_range(0..2_000);
    player.current_path = if rng.gen_bool(0.2) {
        Location::Hub
    } else {
        Location::Track(*TrainingPath::ALL.choose(rng).unwrap())
    };
    player
}

#[test]
fn percentage_stays_in_range_and_hits_100_only_when_complete() {
    for seed in SWEEP_SEEDS {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        for _ in 0..500 {
            let progress = random_progress(&mut rng);
            let pct = progress_percentage(&progress);
            assert!(pct <= 100);
            assert_eq!(pct == 100, progress.all_complete(), "{progress:?}");
        }
    }
}

#[test]
fn completion_never_exceeds_cap_or_regresses() {
    let rules = ProgressionRules::default_config();
    for seed in SWEEP_SEEDS {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        for round in 0..300 {
            let mut player = random_player(&mut rng);
            let difficulty = *DIFFICULTIES.choose(&mut rng).unwrap();
            let result = complete_mission(&player, &format!("m-{round}"), difficulty, &rules);

            assert_eq!(result.points_earned, rules.points_for(difficulty));
            for path in TrainingPath::ALL {
                let before = player.progress.get(path);
                let after = result.new_progress.get(path);
                assert!(after <= MISSIONS_PER_PATH);
                assert!(after >= before);
                let is_current = player.current_path == Location::Track(path);
                if is_current {
                    assert_eq!(after, (before + 1).min(MISSIONS_PER_PATH));
                } else {
                    assert_eq!(after, before);
                }
            }

            let was_astronaut = player.astronaut_mode;
            player.apply(&result.into_update()).unwrap();
            assert!(player.astronaut_mode || !was_astronaut);
        }
    }
}

#[test]
fn capped_track_stays_capped() {
    let rules = ProgressionRules::default_config();
    let mut player = Player::new("cap", "Cap");
    player.current_path = Location::Track(TrainingPath::MedicineHumanFactors);
    player.progress = Progress::from_counts([(TrainingPath::MedicineHumanFactors, 3)]);

    let result = complete_mission(&player, "medicine-1", Difficulty::Medium, &rules);
    assert_eq!(result.new_progress, player.progress);
    assert_eq!(result.path_completed, None);
    assert_eq!(result.unlocked_paths, None);
    assert_eq!(result.points_earned, 60);
}

#[test]
fn astronaut_mode_is_sticky_across_random_walks() {
    let rules = ProgressionRules::default_config();
    let mut rng = ChaCha20Rng::seed_from_u64(0x0A57_0A17);
    let mut player = Player::new("walk", "Walker");
    let mut triggered_at = None;

    for step in 0..200 {
        let location = *unlocked_paths(&player).choose(&mut rng).unwrap();
        player.current_path = location;
        let difficulty = *DIFFICULTIES.choose(&mut rng).unwrap();
        let result = complete_mission(&player, &format!("walk-{step}"), difficulty, &rules);
        player.apply(&result.into_update()).unwrap();
        if player.astronaut_mode && triggered_at.is_none() {
            triggered_at = Some(step);
        }
        if triggered_at.is_some() {
            assert!(player.astronaut_mode, "astronaut mode lost at step {step}");
        }
    }
    if player.astronaut_mode {
        assert!(player.progress.all_complete());
        assert!(player.points >= rules.astronaut_threshold);
    }
}

#[test]
fn unlock_chain_follows_track_order() {
    let directory = PathDirectory::load_from_static();
    let mut player = Player::new("chain", "Chain");

    for (idx, path) in TrainingPath::ALL.into_iter().enumerate() {
        let target = Location::Track(path);
        assert!(validate_path_selection(&player, target), "{path} should be open");
        let selection = select_path(&player, target, &directory).unwrap();
        assert_eq!(selection.mentor, directory.mentor_for(path.as_str()));

        if let Some(next) = path.successor() {
            assert!(!validate_path_selection(&player, Location::Track(next)));
            assert!(select_path(&player, Location::Track(next), &directory).is_err());
        }
        assert_eq!(unlocked_paths(&player).len(), idx + 2);
        player.progress = player.progress.incremented(path).incremented(path).incremented(path);
    }
    assert_eq!(unlocked_paths(&player).len(), 7);
}

#[test]
fn next_mission_walks_catalog_order() {
    let catalog = MissionCatalog::load_from_static();
    let path = TrainingPath::ScienceResearch;
    let ids: Vec<&str> = (0..=MISSIONS_PER_PATH)
        .filter_map(|completed| next_mission(&catalog, path, completed))
        .map(|mission| mission.id.as_str())
        .collect();
    assert_eq!(ids, ["science-1", "science-2", "science-3"]);

    let sparse = TrainingPath::CommunicationsExploration;
    assert!(next_mission(&catalog, sparse, 0).is_some());
    assert!(next_mission(&catalog, sparse, 1).is_none());
    assert!(next_mission(&MissionCatalog::empty(), path, 0).is_none());
}
