use std::collections::HashSet;

use galax_game::{
    Location, MentorDirectory, MissionCatalog, PathDirectory, ProgressionRules, TrainingConfig,
    TrainingPath, TrainingScenario,
};

#[test]
fn bundled_assets_parse_and_validate() {
    let catalog = MissionCatalog::from_json(include_str!("../assets/data/missions.json")).unwrap();
    assert_eq!(catalog, MissionCatalog::load_from_static());

    let scenario =
        TrainingScenario::from_json(include_str!("../assets/data/training.json")).unwrap();
    scenario.validate().unwrap();
    TrainingConfig::default_config().validate().unwrap();
    ProgressionRules::default_config().validate().unwrap();
}

#[test]
fn every_track_has_catalog_and_directory_entries() {
    let catalog = MissionCatalog::load_from_static();
    let directory = PathDirectory::load_from_static();
    let mentors = MentorDirectory::load_from_static();

    for path in TrainingPath::ALL {
        assert!(
            !catalog.missions_for(path).is_empty(),
            "{path} has no missions"
        );
        let info = directory.get(path.as_str()).unwrap();
        assert!(info.color.starts_with('#'), "{path} colour {}", info.color);
        let mentor = mentors.mentor_for_path(Location::Track(path)).unwrap();
        assert_eq!(mentor.name, info.mentor);
        assert_eq!(directory.path_for_mentor(&info.mentor), Some(path));
    }
    assert_eq!(
        directory.mentor_for(Location::Hub.as_str()),
        "Dr. Ellen Ochoa"
    );
}

#[test]
fn mission_ids_are_unique_and_owned_by_their_track() {
    let catalog = MissionCatalog::load_from_static();
    let mut seen = HashSet::new();
    for path in TrainingPath::ALL {
        for mission in catalog.missions_for(path) {
            assert!(seen.insert(mission.id.clone()), "duplicate {}", mission.id);
            assert_eq!(catalog.path_of(&mission.id), Some(path));
        }
    }
    for mission in &catalog.general {
        assert!(seen.insert(mission.id.clone()), "duplicate {}", mission.id);
        assert_eq!(catalog.path_of(&mission.id), None);
    }
}

#[test]
fn quiz_keys_point_at_real_options() {
    let catalog = MissionCatalog::load_from_static();
    let quizzes = catalog
        .paths
        .values()
        .flatten()
        .chain(catalog.general.iter())
        .filter(|mission| mission.content.question.is_some());
    for mission in quizzes {
        let key = mission.content.correct_answer.unwrap();
        assert!(mission.content.is_correct(key), "{} key {key}", mission.id);
    }
}

#[test]
fn unknown_names_fall_back() {
    let catalog = MissionCatalog::load_from_static();
    let directory = PathDirectory::load_from_static();
    assert_eq!(
        catalog.missions_or_general("Underwater Basket Weaving"),
        catalog.general.as_slice()
    );
    assert_eq!(directory.mentor_for("Nowhere"), "Dr. Ellen Ochoa");
    assert_eq!(Location::from_name("Nowhere"), Location::Hub);
}

#[test]
fn training_tasks_reference_scenario_objects() {
    let scenario = TrainingScenario::load_from_static();
    let bounds = TrainingConfig::default_config().tuning.bounds;
    for object in &scenario.objects {
        assert!(bounds.contains(object.position), "{} out of pool", object.id);
    }
    for task in &scenario.tasks {
        for id in &task.required_object_ids {
            assert!(scenario.object(id).is_some(), "{} needs {id}", task.id);
        }
    }
}
