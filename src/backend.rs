//! Physics backend abstraction.
//!
//! The controller needs exactly two things from a physics engine: a
//! downward sweep for the ground probe and a "move by displacement and
//! resolve collisions" call. Sweeps go through [`GroundQuery`] inside the
//! backend's own sensing system; movement goes through this trait.
//!
//! [`GroundQuery`]: crate::collision::GroundQuery

use bevy::prelude::*;

/// Trait for physics backend implementations.
///
/// Implement this trait to integrate a physics engine with the locomotion
/// controller. The backend plugin is expected to add a system to
/// [`LocomotionSet::Sensors`](crate::LocomotionSet::Sensors) that writes each
/// controller's ground contact.
///
/// For an example implementation, see the `rapier` module's
/// `Rapier3dBackend`.
pub trait LocomotionPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Move an entity by `displacement`, resolving collisions on the way.
    fn move_character(world: &mut World, entity: Entity, displacement: Vec3);

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}

/// Backend that moves entities by writing their `Transform` directly.
///
/// No collision resolution and no ground sensing: useful in tests and for
/// entities whose ground contact is written by hand.
pub struct TransformBackend;

impl LocomotionPhysicsBackend for TransformBackend {
    fn plugin() -> impl Plugin {
        NoOpBackendPlugin
    }

    fn move_character(world: &mut World, entity: Entity, displacement: Vec3) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation += displacement;
        }
    }
}
