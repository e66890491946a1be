//! Raw physics query results.
//!
//! Backends translate their own hit types into [`CollisionData`] so the rest
//! of the controller never sees engine specifics.

use bevy::prelude::*;

/// Information about a raycast/shapecast collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionData {
    /// Distance travelled by the cast before the hit.
    pub distance: f32,
    /// Normal of the surface at hit point.
    pub normal: Vec3,
    /// World position of the hit point.
    pub point: Vec3,
    /// Entity that was hit (if any).
    pub entity: Option<Entity>,
}

impl CollisionData {
    /// Create a collision result.
    pub fn new(distance: f32, normal: Vec3, point: Vec3, entity: Option<Entity>) -> Self {
        Self {
            distance,
            normal,
            point,
            entity,
        }
    }
}

/// Capability to sweep a sphere straight down through the world.
///
/// This is the only read the ground sensor needs from a physics engine.
/// Implemented by the Rapier backend and by analytic test grounds.
pub trait GroundQuery {
    /// Sweep a sphere of `radius` from `origin` along -Y for at most `distance`.
    ///
    /// `filter` is a collision-group bit mask selecting which surfaces count as
    /// ground. Returns `None` when nothing was hit.
    fn cast_down(
        &self,
        origin: Vec3,
        radius: f32,
        distance: f32,
        filter: u32,
    ) -> Option<CollisionData>;
}
