//! Rapier3D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier3D.
//! Enable with the `rapier3d` feature.
//!
//! Characters are kinematic: the displacement computed each tick is handed to
//! Rapier's [`KinematicCharacterController`], which resolves collisions. The
//! ground probe is a ball shape-cast run by a dedicated sensing system that
//! receives `RapierContext` as a system parameter.

use bevy::prelude::*;
use bevy_rapier3d::geometry::Group;
use bevy_rapier3d::prelude::*;

use crate::backend::LocomotionPhysicsBackend;
use crate::collision::{CollisionData, GroundQuery};
use crate::config::GroundProbeConfig;
use crate::controller::LocomotionController;
use crate::detection::sense_ground;

/// Rapier3D physics backend for the locomotion controller.
pub struct Rapier3dBackend;

impl LocomotionPhysicsBackend for Rapier3dBackend {
    fn plugin() -> impl Plugin {
        Rapier3dBackendPlugin
    }

    fn move_character(world: &mut World, entity: Entity, displacement: Vec3) {
        if let Some(mut controller) = world.get_mut::<KinematicCharacterController>(entity) {
            controller.translation = Some(displacement);
        } else if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation += displacement;
        }
    }
}

/// Plugin that sets up Rapier3D-specific systems for the locomotion controller.
pub struct Rapier3dBackendPlugin;

impl Plugin for Rapier3dBackendPlugin {
    fn build(&self, app: &mut App) {
        use crate::LocomotionSet;

        app.add_systems(
            FixedUpdate,
            rapier_ground_detection.in_set(LocomotionSet::Sensors),
        );
    }
}

/// Get the distance from collider center to bottom for a given collider.
/// For capsules, this is half_height + radius.
pub fn get_collider_bottom_offset(collider: &Collider) -> f32 {
    if let Some(capsule) = collider.as_capsule() {
        let segment = capsule.segment();
        let half_height = (segment.a().y - segment.b().y).abs() / 2.0;
        half_height + capsule.radius()
    } else if let Some(ball) = collider.as_ball() {
        ball.radius()
    } else if let Some(cuboid) = collider.as_cuboid() {
        cuboid.half_extents().y
    } else {
        0.0
    }
}

/// [`GroundQuery`] over a Rapier context, excluding the probing body.
pub struct RapierGroundQuery<'c, 'w> {
    context: &'c RapierContext<'w>,
    exclude: Entity,
    memberships: Group,
}

impl<'c, 'w> RapierGroundQuery<'c, 'w> {
    /// Query on behalf of `exclude`, using its collision memberships.
    pub fn new(context: &'c RapierContext<'w>, exclude: Entity, memberships: Group) -> Self {
        Self {
            context,
            exclude,
            memberships,
        }
    }
}

impl GroundQuery for RapierGroundQuery<'_, '_> {
    fn cast_down(
        &self,
        origin: Vec3,
        radius: f32,
        distance: f32,
        filter: u32,
    ) -> Option<CollisionData> {
        let shape = Collider::ball(radius.max(0.001));
        let filter = QueryFilter::default()
            .exclude_rigid_body(self.exclude)
            .exclude_collider(self.exclude)
            .exclude_sensors()
            .groups(CollisionGroups::new(
                self.memberships,
                Group::from_bits_truncate(filter),
            ));

        self.context
            .cast_shape(
                origin,
                Quat::IDENTITY,
                Vec3::NEG_Y,
                &shape,
                ShapeCastOptions {
                    max_time_of_impact: distance,
                    stop_at_penetration: false,
                    ..default()
                },
                filter,
            )
            .map(|(hit_entity, hit)| {
                let normal = hit.details.map(|d| d.normal1).unwrap_or(Vec3::Y);
                let point = hit
                    .details
                    .map(|d| d.witness1)
                    .unwrap_or(origin + Vec3::NEG_Y * (hit.time_of_impact + radius));
                CollisionData::new(hit.time_of_impact, normal, point, Some(hit_entity))
            })
    }
}

/// Rapier-specific ground detection system.
///
/// The probe starts at the bottom of the character's collider and uses the
/// character's collision memberships together with the configured surface
/// filter.
fn rapier_ground_detection(
    rapier_context: ReadRapierContext,
    mut q_controllers: Query<(
        Entity,
        &GlobalTransform,
        &mut LocomotionController,
        Option<&GroundProbeConfig>,
        Option<&CollisionGroups>,
        Option<&Collider>,
    )>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    for (entity, transform, mut controller, probe, collision_groups, collider) in
        &mut q_controllers
    {
        let probe = probe.copied().unwrap_or_default();
        let bottom = collider.map(get_collider_bottom_offset).unwrap_or(0.0);
        let base = transform.translation() - Vec3::Y * bottom;

        let (memberships, filter) = match collision_groups {
            Some(groups) => (groups.memberships, groups.filters.bits() & probe.surface_filter),
            None => (Group::ALL, probe.surface_filter),
        };
        let probe = probe.with_surface_filter(filter);

        let query = RapierGroundQuery::new(&context, entity, memberships);
        controller.set_ground(sense_ground(&query, base, &probe));
    }
}

/// Bundle of Rapier3D components needed by a locomotion character.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use msg_locomotion_controller::prelude::*;
/// use msg_locomotion_controller::rapier::Rapier3dCharacterBundle;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 1.0, 0.0),
///         LocomotionController::default(),
///         LocomotionConfig::player(),
///         Rapier3dCharacterBundle::new(),
///         Collider::capsule_y(0.5, 0.3),
///     ));
/// }
/// ```
///
/// # Defaults
///
/// - `rigid_body`: [`RigidBody::KinematicPositionBased`]
/// - `character_controller`: up is +Y, sliding enabled, snaps to ground
///   within 0.2 units, climbs slopes up to 45°, never slides on its own
///   (steep-slope sliding is handled by the locomotion controller)
#[derive(Bundle)]
pub struct Rapier3dCharacterBundle {
    /// The rigid body type. Kinematic so that only the controller moves it.
    pub rigid_body: RigidBody,
    /// Rapier's collide-and-slide mover fed by the backend.
    pub character_controller: KinematicCharacterController,
}

impl Default for Rapier3dCharacterBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier3dCharacterBundle {
    /// Create a new kinematic character bundle.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::KinematicPositionBased,
            character_controller: KinematicCharacterController {
                up: Vec3::Y,
                offset: CharacterLength::Absolute(0.01),
                slide: true,
                snap_to_ground: Some(CharacterLength::Absolute(0.2)),
                max_slope_climb_angle: 45.0_f32.to_radians(),
                min_slope_slide_angle: 90.0_f32.to_radians(),
                ..default()
            },
        }
    }

    /// Match Rapier's climb limit to the walkable slope angle (degrees).
    pub fn with_max_slope_angle(mut self, degrees: f32) -> Self {
        self.character_controller.max_slope_climb_angle = degrees.to_radians();
        self
    }

    /// Set the ground snap distance, or disable snapping with `None`.
    pub fn with_snap_to_ground(mut self, distance: Option<f32>) -> Self {
        self.character_controller.snap_to_ground = distance.map(CharacterLength::Absolute);
        self
    }

    /// Enable automatic stepping over small obstacles.
    pub fn with_autostep(mut self, max_height: f32, min_width: f32) -> Self {
        self.character_controller.autostep = Some(CharacterAutostep {
            max_height: CharacterLength::Absolute(max_height),
            min_width: CharacterLength::Absolute(min_width),
            include_dynamic_bodies: false,
        });
        self
    }
}
