//! Controller systems.
//!
//! These systems drive [`LocomotionController`] from the ECS. The tick and
//! movement systems are exclusive and generic over the physics backend, the
//! same way every backend call is made through `B::`.

use bevy::prelude::*;

use crate::backend::LocomotionPhysicsBackend;
use crate::config::{
    FacingReference, GroundProbeConfig, LocomotionConfig, LocomotionSettings, RollConfig,
    SlideConfig, StaminaConfig, VisualBody,
};
use crate::controller::{LocomotionController, PendingMotion};
use crate::intent::{InputSnapshot, MovementBasis, MovementIntent};
use crate::state::{Airborne, Grounded, LocomotionStateChanged};

/// Query fragment for the optional tuning components.
pub type SettingsQuery<'a> = (
    Option<&'a LocomotionConfig>,
    Option<&'a GroundProbeConfig>,
    Option<&'a SlideConfig>,
    Option<&'a StaminaConfig>,
    Option<&'a RollConfig>,
);

/// Collapse a [`SettingsQuery`] item into [`LocomotionSettings`].
pub fn settings_from(
    (locomotion, probe, slide, stamina, roll): (
        Option<&LocomotionConfig>,
        Option<&GroundProbeConfig>,
        Option<&SlideConfig>,
        Option<&StaminaConfig>,
        Option<&RollConfig>,
    ),
) -> LocomotionSettings {
    LocomotionSettings::from_components(locomotion, probe, slide, stamina, roll)
}

/// Size the stamina pool of newly added controllers and report invalid
/// configuration once.
pub fn validate_new_configs(
    mut q_controllers: Query<
        (Entity, &mut LocomotionController, SettingsQuery),
        Added<LocomotionController>,
    >,
) {
    for (entity, mut controller, settings) in &mut q_controllers {
        let settings = settings_from(settings);
        if let Err(err) = settings.validate() {
            warn!("invalid locomotion configuration on {entity}: {err}");
        }
        controller.reset_stamina(&settings);
    }
}

/// Run one controller tick per entity and store the result in
/// [`PendingMotion`].
///
/// Movement input is resolved against the [`FacingReference`] when it exists
/// and yields a usable basis, otherwise against the controller entity. The
/// [`VisualBody`] only supplies the roll direction when there is no input and
/// no camera. Edge-triggered buttons are latched afterwards.
pub fn tick_controllers<B: LocomotionPhysicsBackend>(world: &mut World) {
    let dt = B::get_fixed_timestep(world);

    let entities: Vec<(Entity, InputSnapshot, Option<Entity>, Option<Entity>, LocomotionSettings)> =
        world
            .query_filtered::<(
                Entity,
                &MovementIntent,
                Option<&FacingReference>,
                Option<&VisualBody>,
                SettingsQuery,
            ), With<LocomotionController>>()
            .iter(world)
            .map(|(entity, intent, facing, visual, settings)| {
                (
                    entity,
                    intent.snapshot(),
                    facing.map(|f| f.0),
                    visual.map(|v| v.0),
                    settings_from(settings),
                )
            })
            .collect();

    for (entity, input, facing, visual, settings) in entities {
        let camera = facing.and_then(|e| world_rotation(world, e));
        let body = world_rotation(world, entity).unwrap_or_default();
        let visual = visual.and_then(|e| world_rotation(world, e));
        let basis = MovementBasis::resolve_with_facing(body, camera, visual);

        let Some(mut controller) = world.get_mut::<LocomotionController>(entity) else {
            continue;
        };
        let previous_state = controller.state();
        let output = controller.tick(&input, basis, &settings, dt);

        if let Some(mut pending) = world.get_mut::<PendingMotion>(entity) {
            *pending = PendingMotion {
                displacement: output.displacement,
                facing: output.facing,
                dt,
                previous_state,
            };
        }
        if let Some(mut intent) = world.get_mut::<MovementIntent>(entity) {
            intent.latch();
        }
    }
}

/// Hand each pending displacement to the physics backend.
pub fn apply_motion<B: LocomotionPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, Vec3)> = world
        .query::<(Entity, &PendingMotion)>()
        .iter(world)
        .map(|(entity, pending)| (entity, pending.displacement))
        .collect();

    for (entity, displacement) in entities {
        B::move_character(world, entity, displacement);
        if let Some(mut pending) = world.get_mut::<PendingMotion>(entity) {
            pending.displacement = Vec3::ZERO;
        }
    }
}

/// Rotate the [`VisualBody`] as requested by the last tick.
///
/// Controllers without a visual body are skipped.
pub fn apply_facing(
    mut q_controllers: Query<(&mut PendingMotion, &VisualBody, Option<&LocomotionConfig>)>,
    mut q_transforms: Query<&mut Transform>,
) {
    for (mut pending, visual, config) in &mut q_controllers {
        let turn_speed = config.copied().unwrap_or_default().turn_speed;
        let Ok(mut transform) = q_transforms.get_mut(visual.0) else {
            continue;
        };
        transform.rotation = pending
            .facing
            .apply(transform.rotation, turn_speed, pending.dt);
        pending.facing = default();
    }
}

/// Keep `Grounded`/`Airborne` markers in sync with the ground contact and
/// report state label changes.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<(
        Entity,
        &LocomotionController,
        &PendingMotion,
        Has<Grounded>,
        Has<Airborne>,
    )>,
    mut state_changes: EventWriter<LocomotionStateChanged>,
) {
    for (entity, controller, pending, has_grounded, has_airborne) in &q_controllers {
        let grounded = controller.ground().grounded;
        if grounded && !has_grounded {
            commands.entity(entity).insert(Grounded).remove::<Airborne>();
        } else if !grounded && !has_airborne {
            commands.entity(entity).insert(Airborne).remove::<Grounded>();
        }

        if pending.previous_state != controller.state() {
            state_changes.write(LocomotionStateChanged {
                entity,
                from: pending.previous_state,
                to: controller.state(),
            });
        }
    }
}

fn world_rotation(world: &World, entity: Entity) -> Option<Quat> {
    world
        .get::<GlobalTransform>(entity)
        .map(|t| t.compute_transform().rotation)
        .or_else(|| world.get::<Transform>(entity).map(|t| t.rotation))
}
