//! Actor kinematics for the neutral-buoyancy pool.
//!
//! Coordinates follow the pool layout: `y` grows toward the floor, so moving
//! up lowers `y` and buoyancy pushes velocity negative.
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

use super::config::TrainingTuning;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn length(self) -> f32 {
        self.z
            .mul_add(self.z, self.x.mul_add(self.x, self.y * self.y))
            .sqrt()
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    #[must_use]
    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Component-wise clamp into `[min, max]`.
    #[must_use]
    pub fn clamp(self, min: Self, max: Self) -> Self {
        Self::new(
            self.x.clamp(min.x, max.x),
            self.y.clamp(min.y, max.y),
            self.z.clamp(min.z, max.z),
        )
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Held movement controls for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveSet {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Toward the far wall (+z).
    pub forward: bool,
    /// Toward the near wall (-z).
    pub back: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
}

/// Input snapshot delivered with each advance; `interact` is edge-triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingInput {
    pub moves: MoveSet,
    pub interact: bool,
}

impl TrainingInput {
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_moves(moves: MoveSet) -> Self {
        Self {
            moves,
            interact: false,
        }
    }

    #[must_use]
    pub const fn press_interact() -> Self {
        Self {
            moves: MoveSet {
                up: false,
                down: false,
                left: false,
                right: false,
                forward: false,
                back: false,
                rotate_left: false,
                rotate_right: false,
            },
            interact: true,
        }
    }
}

/// The trainee in the pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Heading in radians.
    pub rotation: f32,
    #[serde(default)]
    pub grabbed: Option<String>,
}

impl Actor {
    #[must_use]
    pub const fn spawn(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            rotation: 0.0,
            grabbed: None,
        }
    }

    /// Advance one fixed physics step: drag, thrust, buoyancy, clamps, integrate.
    pub fn step(&mut self, moves: &MoveSet, tuning: &TrainingTuning) {
        let mut velocity = self.velocity.scale(tuning.drag);
        let thrust = tuning.move_speed;

        if moves.up {
            velocity.y -= thrust * tuning.ascend_factor;
        }
        if moves.down {
            velocity.y += thrust * tuning.descend_factor;
        }
        if moves.left {
            velocity.x -= thrust * tuning.lateral_factor;
        }
        if moves.right {
            velocity.x += thrust * tuning.lateral_factor;
        }
        if moves.back {
            velocity.z -= thrust * tuning.depth_factor;
        }
        if moves.forward {
            velocity.z += thrust * tuning.depth_factor;
        }
        if moves.rotate_left {
            self.rotation -= tuning.rotation_speed;
        }
        if moves.rotate_right {
            self.rotation += tuning.rotation_speed;
        }

        velocity.y -= tuning.buoyancy;

        let limit = tuning.speed_limits();
        self.velocity = velocity.clamp(limit.scale(-1.0), limit);
        self.position =
            (self.position + self.velocity).clamp(tuning.bounds.min, tuning.bounds.max);
    }

    /// Handrail grip: damp every velocity component.
    pub fn stabilize(&mut self, damping: f32) {
        self.velocity = self.velocity.scale(damping);
    }
}
