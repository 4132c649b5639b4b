//! Proximity interaction rules.
use super::config::{ObjectKind, PoolObject, TaskSpec};
use super::physics::{Actor, Vec3};

/// Effect of pressing interact next to an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Release,
    Grab,
    Install,
    Stabilize,
    Ignored,
}

/// Index of the closest object strictly inside `radius`; ties keep the earlier object.
#[must_use]
pub fn nearest_within(objects: &[PoolObject], position: Vec3, radius: f32) -> Option<usize> {
    objects
        .iter()
        .enumerate()
        .map(|(idx, object)| (idx, object.position.distance(position)))
        .filter(|&(_, distance)| distance < radius)
        .fold(None, |best: Option<(usize, f32)>, candidate| match best {
            Some((_, best_distance)) if best_distance <= candidate.1 => best,
            _ => Some(candidate),
        })
        .map(|(idx, _)| idx)
}

/// Decide what interacting with `object` does, in priority order.
#[must_use]
pub fn resolve(actor: &Actor, object: &PoolObject, task: Option<&TaskSpec>) -> Interaction {
    match (&actor.grabbed, object.kind) {
        (Some(held), _) if *held == object.id => Interaction::Release,
        (None, ObjectKind::Tool) => Interaction::Grab,
        (Some(_), ObjectKind::Workstation) => {
            let required = task.is_some_and(|task| {
                task.required_object_ids.iter().any(|id| *id == object.id)
            });
            if required && !object.installed {
                Interaction::Install
            } else {
                Interaction::Ignored
            }
        }
        (_, ObjectKind::Handrail) => Interaction::Stabilize,
        _ => Interaction::Ignored,
    }
}
