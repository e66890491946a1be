//! Velocity integration.
//!
//! Planar velocity is exponentially smoothed toward a desired velocity;
//! steep-slope slide is tracked separately and added on top; vertical
//! velocity accumulates gravity, with ground stick and jump overrides.

use bevy::prelude::*;

use crate::config::{LocomotionConfig, SlideConfig};
use crate::detection::GroundContact;
use crate::intent::flatten;

/// Dot product against the flattened uphill direction above which movement
/// on steep ground is blocked.
pub const UPHILL_BLOCK_DOT: f32 = 0.2;

/// Controller velocity, split into a ground-plane part and a vertical part.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionVector {
    /// Smoothed movement velocity. Lies in the ground plane on walkable slopes.
    pub planar: Vec3,
    /// Gravity and jump accumulator (positive is up).
    pub vertical: f32,
}

impl MotionVector {
    /// Combined velocity with the slide contribution added.
    pub fn velocity(&self, slide: Vec3) -> Vec3 {
        self.planar + slide + Vec3::Y * self.vertical
    }
}

/// Steep-slope slide velocity.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct SlideState {
    velocity: Vec3,
    was_bracing: bool,
}

impl SlideState {
    /// Current slide velocity.
    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Whether the previous update was bracing against the slope.
    #[inline]
    pub fn was_bracing(&self) -> bool {
        self.was_bracing
    }

    /// Advance the slide one tick and return the new slide velocity.
    pub fn update(
        &mut self,
        ground: &GroundContact,
        bracing: bool,
        config: &SlideConfig,
        max_slope_angle: f32,
        dt: f32,
    ) -> Vec3 {
        if !config.enabled {
            *self = Self::default();
            return Vec3::ZERO;
        }

        let ramp = lerp_factor(config.acceleration, dt);

        if !ground.is_steep() {
            self.velocity = self.velocity.lerp(Vec3::ZERO, ramp);
            self.was_bracing = false;
            return self.velocity;
        }

        if bracing {
            self.velocity = Vec3::ZERO;
            self.was_bracing = true;
            return self.velocity;
        }

        let steepness = steepness_fraction(ground.angle, max_slope_angle);
        let target = ground.downhill() * config.speed * steepness;
        let blend = if self.was_bracing {
            config.kick_factor.clamp(0.0, 1.0)
        } else {
            ramp
        };
        self.velocity = self.velocity.lerp(target, blend);
        self.was_bracing = false;
        self.velocity
    }
}

/// How far past the walkable limit a slope is: 0 at the limit, 1 at vertical.
pub fn steepness_fraction(angle: f32, max_slope_angle: f32) -> f32 {
    let span = 90.0 - max_slope_angle;
    if span <= f32::EPSILON {
        return 1.0;
    }
    ((angle - max_slope_angle) / span).clamp(0.0, 1.0)
}

/// `rate * dt` as a lerp factor in `[0, 1]`.
#[inline]
pub fn lerp_factor(rate: f32, dt: f32) -> f32 {
    let t = rate * dt;
    if t.is_finite() {
        t.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Target planar velocity for a normalized world direction.
///
/// Uphill travel on steep ground is blocked; on walkable ground the result
/// is projected onto the surface.
pub fn desired_planar_velocity(direction: Vec3, speed: f32, ground: &GroundContact) -> Vec3 {
    let desired = direction * speed;

    if ground.is_steep() {
        let uphill = ground.uphill_flat();
        if flatten(direction).dot(uphill) > UPHILL_BLOCK_DOT {
            return Vec3::ZERO;
        }
        return desired;
    }

    if ground.is_walkable_ground() {
        return ground.project(desired);
    }

    desired
}

/// Smooth `current` toward `desired`, accelerating while there is input and
/// decelerating otherwise.
pub fn integrate_planar(
    current: Vec3,
    desired: Vec3,
    has_input: bool,
    config: &LocomotionConfig,
    dt: f32,
) -> Vec3 {
    let rate = if has_input {
        config.acceleration
    } else {
        config.deceleration
    };
    current.lerp(desired, lerp_factor(rate, dt))
}

/// Advance vertical velocity: ground stick, then an optional jump impulse,
/// then gravity.
pub fn integrate_vertical(
    vertical: f32,
    grounded: bool,
    jump: Option<f32>,
    config: &LocomotionConfig,
    dt: f32,
) -> f32 {
    let mut vertical = vertical;
    if grounded && vertical < 0.0 {
        vertical = config.ground_stick_velocity;
    }
    if let Some(impulse) = jump {
        vertical = impulse;
    }
    vertical - config.gravity.abs() * dt
}

/// Launch speed that peaks at `height` under constant `gravity`.
#[inline]
pub fn jump_impulse(height: f32, gravity: f32) -> f32 {
    (2.0 * height.max(0.0) * gravity.abs()).sqrt()
}

/// Yaw rotation whose forward (-Z) faces the flattened `direction`.
pub fn facing_rotation(direction: Vec3) -> Option<Quat> {
    let flat = flatten(direction);
    if flat == Vec3::ZERO {
        return None;
    }
    Some(Quat::from_rotation_y(f32::atan2(-flat.x, -flat.z)))
}

/// Slerp `current` toward facing `direction` at `turn_speed`.
pub fn turn_toward(current: Quat, direction: Vec3, turn_speed: f32, dt: f32) -> Quat {
    match facing_rotation(direction) {
        Some(target) => current.slerp(target, lerp_factor(turn_speed, dt)),
        None => current,
    }
}
