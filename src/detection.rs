//! Ground detection.
//!
//! One downward sphere sweep per tick produces a [`GroundContact`]. The
//! contact is rebuilt from scratch every tick; nothing from the previous
//! tick is carried over.

use bevy::prelude::*;

use crate::collision::{CollisionData, GroundQuery};
use crate::config::GroundProbeConfig;

/// Ground contact for the current tick.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct GroundContact {
    /// Whether the probe hit anything.
    pub grounded: bool,

    /// Whether the surface is shallow enough to walk on.
    pub walkable: bool,

    /// Surface normal (world up when not grounded).
    pub normal: Vec3,

    /// Angle between the surface normal and world up, in degrees.
    pub angle: f32,
}

impl Default for GroundContact {
    fn default() -> Self {
        Self::airborne()
    }
}

impl GroundContact {
    /// Contact for a probe that hit nothing.
    pub fn airborne() -> Self {
        Self {
            grounded: false,
            walkable: false,
            normal: Vec3::Y,
            angle: 0.0,
        }
    }

    /// Contact on a surface with the given normal.
    ///
    /// A degenerate normal falls back to world up.
    pub fn from_normal(normal: Vec3, max_slope_angle: f32) -> Self {
        let normal = normal.try_normalize().unwrap_or(Vec3::Y);
        let angle = normal.angle_between(Vec3::Y).to_degrees();
        Self {
            grounded: true,
            walkable: angle <= max_slope_angle,
            normal,
            angle,
        }
    }

    /// Build the contact from an optional probe hit.
    pub fn from_hit(hit: Option<&CollisionData>, max_slope_angle: f32) -> Self {
        hit.map_or_else(Self::airborne, |hit| {
            Self::from_normal(hit.normal, max_slope_angle)
        })
    }

    /// Grounded on a slope steeper than the walkable limit.
    #[inline]
    pub fn is_steep(&self) -> bool {
        self.grounded && !self.walkable
    }

    /// Grounded on a walkable slope.
    #[inline]
    pub fn is_walkable_ground(&self) -> bool {
        self.grounded && self.walkable
    }

    /// Unit direction pointing down the slope, in the surface plane.
    ///
    /// Zero on flat ground.
    pub fn downhill(&self) -> Vec3 {
        Vec3::NEG_Y.reject_from(self.normal).normalize_or_zero()
    }

    /// Flattened unit direction pointing up the slope. Zero on flat ground.
    pub fn uphill_flat(&self) -> Vec3 {
        let downhill = self.downhill();
        -Vec3::new(downhill.x, 0.0, downhill.z).normalize_or_zero()
    }

    /// Remove the component of `v` along the surface normal.
    pub fn project(&self, v: Vec3) -> Vec3 {
        v.reject_from(self.normal)
    }
}

/// Sweep the ground probe below a body whose base sits at `base`.
pub fn sense_ground<Q: GroundQuery + ?Sized>(
    query: &Q,
    base: Vec3,
    probe: &GroundProbeConfig,
) -> GroundContact {
    let origin = base + Vec3::Y * probe.origin_height;
    let hit = query.cast_down(origin, probe.radius, probe.distance, probe.surface_filter);
    GroundContact::from_hit(hit.as_ref(), probe.max_slope_angle)
}
