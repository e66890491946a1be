//! App-level tests for the locomotion plugin.
//!
//! A fake backend provides an analytic ground plane and moves entities by
//! writing their transform, so the whole system chain can run under
//! `MinimalPlugins` without a physics engine.

use bevy::prelude::*;
use msg_locomotion_controller::prelude::*;

/// Infinite plane through `height` with the given normal.
#[derive(Resource, Clone, Copy)]
struct AnalyticGround {
    height: f32,
    normal: Vec3,
}

impl GroundQuery for AnalyticGround {
    fn cast_down(
        &self,
        origin: Vec3,
        radius: f32,
        distance: f32,
        _filter: u32,
    ) -> Option<CollisionData> {
        let gap = origin.y - radius - self.height;
        (gap <= distance).then(|| {
            let point = Vec3::new(origin.x, self.height, origin.z);
            CollisionData::new(gap.max(0.0), self.normal, point, None)
        })
    }
}

struct FakeBackend;

impl LocomotionPhysicsBackend for FakeBackend {
    fn plugin() -> impl Plugin {
        FakeBackendPlugin
    }

    fn move_character(world: &mut World, entity: Entity, displacement: Vec3) {
        let floor = world.resource::<AnalyticGround>().height;
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation += displacement;
            transform.translation.y = transform.translation.y.max(floor);
        }
    }
}

struct FakeBackendPlugin;

impl Plugin for FakeBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            fake_ground_detection.in_set(LocomotionSet::Sensors),
        );
    }
}

fn fake_ground_detection(
    ground: Res<AnalyticGround>,
    mut q_controllers: Query<(
        &Transform,
        &mut LocomotionController,
        Option<&GroundProbeConfig>,
    )>,
) {
    for (transform, mut controller, probe) in &mut q_controllers {
        let probe = probe.copied().unwrap_or_default();
        controller.set_ground(sense_ground(&*ground, transform.translation, &probe));
    }
}

fn create_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(LocomotionControllerPlugin::<FakeBackend>::default());
    app.insert_resource(Time::<Fixed>::from_hz(60.0));
    app.insert_resource(AnalyticGround {
        height: 0.0,
        normal: Vec3::Y,
    });
    app.finish();
    app.cleanup();
    app
}

fn spawn_character(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_translation(position),
            LocomotionController::default(),
            LocomotionConfig::player(),
        ))
        .id()
}

fn tick(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        tick(app);
    }
}

fn set_intent(app: &mut App, entity: Entity, apply: impl FnOnce(&mut MovementIntent)) {
    let mut intent = app
        .world_mut()
        .get_mut::<MovementIntent>(entity)
        .expect("controller requires MovementIntent");
    apply(&mut intent);
}

fn controller(app: &App, entity: Entity) -> &LocomotionController {
    app.world().get::<LocomotionController>(entity).unwrap()
}

fn translation(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<Transform>(entity).unwrap().translation
}

fn state_changes(app: &App) -> Vec<LocomotionStateChanged> {
    let events = app.world().resource::<Events<LocomotionStateChanged>>();
    events.get_cursor().read(events).copied().collect()
}

mod setup {
    use super::*;

    #[test]
    fn required_components_are_added() {
        let mut app = create_test_app();
        let entity = spawn_character(&mut app, Vec3::ZERO);
        assert!(app.world().get::<MovementIntent>(entity).is_some());
        assert!(app.world().get::<PendingMotion>(entity).is_some());
    }

    #[test]
    fn stamina_pool_sized_from_config() {
        let mut app = create_test_app();
        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                LocomotionController::default(),
                StaminaConfig::default().with_max(150.0),
            ))
            .id();
        tick(&mut app);
        let stamina = controller(&app, entity).stamina();
        assert_eq!(stamina.max(), 150.0);
        assert_eq!(stamina.current(), 150.0);
    }

    #[test]
    fn invalid_config_keeps_running() {
        let mut app = create_test_app();
        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                LocomotionController::default(),
                LocomotionConfig::default().with_movement(-5.0, 10.0, 15.0),
            ))
            .id();
        run_ticks(&mut app, 3);
        assert_eq!(controller(&app, entity).state(), LocomotionState::Idle);
    }
}

mod markers {
    use super::*;

    #[test]
    fn grounded_on_the_plane() {
        let mut app = create_test_app();
        let entity = spawn_character(&mut app, Vec3::ZERO);
        tick(&mut app);
        assert!(app.world().get::<Grounded>(entity).is_some());
        assert!(app.world().get::<Airborne>(entity).is_none());
    }

    #[test]
    fn airborne_above_the_plane_and_falls() {
        let mut app = create_test_app();
        let entity = spawn_character(&mut app, Vec3::new(0.0, 5.0, 0.0));
        tick(&mut app);
        assert!(app.world().get::<Airborne>(entity).is_some());
        assert!(app.world().get::<Grounded>(entity).is_none());

        run_ticks(&mut app, 10);
        assert!(translation(&app, entity).y < 5.0);
        assert_eq!(controller(&app, entity).state(), LocomotionState::Airborne);
    }

    #[test]
    fn lands_and_switches_markers() {
        let mut app = create_test_app();
        let entity = spawn_character(&mut app, Vec3::new(0.0, 1.0, 0.0));
        run_ticks(&mut app, 120);
        assert!(app.world().get::<Grounded>(entity).is_some());
        assert!(app.world().get::<Airborne>(entity).is_none());
    }
}

mod movement {
    use super::*;

    #[test]
    fn walking_forward_moves_along_neg_z() {
        let mut app = create_test_app();
        let entity = spawn_character(&mut app, Vec3::ZERO);
        set_intent(&mut app, entity, |intent| {
            intent.set_axes(0.0, 1.0);
            intent.set_forward_held(true);
        });
        run_ticks(&mut app, 30);

        assert!(translation(&app, entity).z < -0.5);
        assert_eq!(controller(&app, entity).state(), LocomotionState::Walking);

        let changes = state_changes(&app);
        assert!(changes.iter().any(|change| change.entity == entity
            && change.from == LocomotionState::Idle
            && change.to == LocomotionState::Walking));
    }

    #[test]
    fn held_jump_fires_once() {
        let mut app = create_test_app();
        let entity = spawn_character(&mut app, Vec3::ZERO);
        tick(&mut app);

        set_intent(&mut app, entity, |intent| intent.set_jump_pressed(true));
        tick(&mut app);
        assert!(translation(&app, entity).y > 0.0);
        assert!(controller(&app, entity).motion().vertical > 0.0);

        // Still holding the button: no second jump after landing.
        run_ticks(&mut app, 120);
        assert_eq!(translation(&app, entity).y, 0.0);
        assert!(controller(&app, entity).motion().vertical <= 0.0);
    }

    #[test]
    fn roll_spends_stamina_and_locks_input() {
        let mut app = create_test_app();
        let entity = spawn_character(&mut app, Vec3::ZERO);
        tick(&mut app);

        set_intent(&mut app, entity, |intent| {
            intent.set_axes(1.0, 0.0);
            intent.set_roll_pressed(true);
        });
        tick(&mut app);

        let controller = controller(&app, entity);
        assert_eq!(controller.state(), LocomotionState::Rolling);
        assert!(controller.is_input_locked());
        assert_eq!(controller.stamina().current(), 75.0);
        assert!(translation(&app, entity).x > 0.0);
    }

    #[test]
    fn camera_reference_rotates_input() {
        let mut app = create_test_app();
        let camera_transform = Transform::from_rotation(Quat::from_rotation_y(
            std::f32::consts::FRAC_PI_2,
        ));
        let camera = app
            .world_mut()
            .spawn((camera_transform, GlobalTransform::from(camera_transform)))
            .id();
        let entity = spawn_character(&mut app, Vec3::ZERO);
        app.world_mut()
            .entity_mut(entity)
            .insert(FacingReference(camera));

        set_intent(&mut app, entity, |intent| intent.set_axes(0.0, 1.0));
        run_ticks(&mut app, 30);

        let position = translation(&app, entity);
        assert!(position.x < -0.5);
        assert!(position.z.abs() < 0.01);
    }
}

mod facing {
    use super::*;

    #[test]
    fn visual_body_turns_toward_movement() {
        let mut app = create_test_app();
        let body = app.world_mut().spawn(Transform::default()).id();
        let entity = spawn_character(&mut app, Vec3::ZERO);
        app.world_mut().entity_mut(entity).insert(VisualBody(body));

        // Backward input turns the body around toward +Z.
        set_intent(&mut app, entity, |intent| intent.set_axes(0.0, -1.0));
        run_ticks(&mut app, 60);

        let rotation = app.world().get::<Transform>(body).unwrap().rotation;
        let forward = rotation * Vec3::NEG_Z;
        assert!(forward.z > 0.9);
    }

    #[test]
    fn strafing_keeps_visual_body_orientation() {
        let mut app = create_test_app();
        let body = app.world_mut().spawn(Transform::default()).id();
        let entity = spawn_character(&mut app, Vec3::ZERO);
        app.world_mut().entity_mut(entity).insert(VisualBody(body));

        set_intent(&mut app, entity, |intent| intent.set_axes(1.0, 0.0));
        run_ticks(&mut app, 30);

        let rotation = app.world().get::<Transform>(body).unwrap().rotation;
        assert!(rotation.angle_between(Quat::IDENTITY) < 1e-4);
        assert!(translation(&app, entity).x > 0.0);
    }

    fn create_propagating_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(TransformPlugin);
        app.add_plugins(LocomotionControllerPlugin::<FakeBackend>::default());
        app.insert_resource(Time::<Fixed>::from_hz(60.0));
        app.insert_resource(AnalyticGround {
            height: 0.0,
            normal: Vec3::Y,
        });
        app.finish();
        app.cleanup();
        app
    }

    /// One fixed tick followed by transform propagation, so the visual body's
    /// `GlobalTransform` carries the rotation applied this tick.
    fn tick_and_propagate(app: &mut App) {
        app.world_mut().run_schedule(FixedUpdate);
        app.world_mut().run_schedule(PostUpdate);
    }

    fn spawn_with_child_body(app: &mut App) -> (Entity, Entity) {
        let entity = spawn_character(app, Vec3::ZERO);
        let body = app
            .world_mut()
            .spawn((Transform::default(), ChildOf(entity)))
            .id();
        app.world_mut().entity_mut(entity).insert(VisualBody(body));
        (entity, body)
    }

    #[test]
    fn diagonal_input_keeps_heading_while_body_turns() {
        let mut app = create_propagating_app();
        let (entity, body) = spawn_with_child_body(&mut app);
        set_intent(&mut app, entity, |intent| intent.set_axes(1.0, 1.0));

        let expected = Vec3::new(1.0, 0.0, -1.0).normalize();
        let mut previous = translation(&app, entity);
        for _ in 0..180 {
            tick_and_propagate(&mut app);
            let current = translation(&app, entity);
            let step = (current - previous).normalize_or_zero();
            assert!(step.dot(expected) > 0.999, "heading drifted to {step:?}");
            previous = current;
        }

        let rotation = app.world().get::<GlobalTransform>(body).unwrap().rotation();
        assert!((rotation * Vec3::NEG_Z).dot(expected) > 0.99);
    }

    #[test]
    fn backward_input_turns_body_around_once() {
        let mut app = create_propagating_app();
        let (entity, body) = spawn_with_child_body(&mut app);
        set_intent(&mut app, entity, |intent| intent.set_axes(0.0, -1.0));

        for _ in 0..120 {
            tick_and_propagate(&mut app);
        }
        let settled = app.world().get::<Transform>(body).unwrap().rotation;
        assert!((settled * Vec3::NEG_Z).z > 0.99);

        for _ in 0..60 {
            tick_and_propagate(&mut app);
        }
        let later = app.world().get::<Transform>(body).unwrap().rotation;
        assert!(later.angle_between(settled) < 0.01);
        assert!(translation(&app, entity).z > 1.0);
    }

    #[test]
    fn missing_visual_body_is_skipped() {
        let mut app = create_test_app();
        let entity = spawn_character(&mut app, Vec3::ZERO);
        let ghost = app.world_mut().spawn_empty().id();
        app.world_mut().despawn(ghost);
        app.world_mut().entity_mut(entity).insert(VisualBody(ghost));

        set_intent(&mut app, entity, |intent| intent.set_axes(0.0, 1.0));
        run_ticks(&mut app, 5);
        assert!(translation(&app, entity).z < 0.0);
    }
}

#[cfg(feature = "rapier3d")]
mod rapier {
    use super::*;
    use bevy::time::Virtual;
    use bevy_rapier3d::prelude::*;
    use msg_locomotion_controller::rapier::{Rapier3dBackend, Rapier3dCharacterBundle};

    fn create_rapier_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(TransformPlugin);
        app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
        app.add_plugins(LocomotionControllerPlugin::<Rapier3dBackend>::default());
        app.insert_resource(Time::<Fixed>::from_hz(60.0));
        app.finish();
        app.cleanup();
        app
    }

    fn step(app: &mut App) {
        let timestep = std::time::Duration::from_secs_f64(1.0 / 60.0);
        app.world_mut()
            .resource_mut::<Time<Virtual>>()
            .advance_by(timestep);
        app.update();
        app.world_mut().run_schedule(FixedUpdate);
        app.update();
    }

    #[test]
    fn character_on_rapier_ground_is_grounded() {
        let mut app = create_rapier_app();

        let ground = Transform::from_xyz(0.0, -0.5, 0.0);
        app.world_mut().spawn((
            ground,
            GlobalTransform::from(ground),
            RigidBody::Fixed,
            Collider::cuboid(10.0, 0.5, 10.0),
        ));

        let start = Transform::from_xyz(0.0, 0.82, 0.0);
        let entity = app
            .world_mut()
            .spawn((
                start,
                GlobalTransform::from(start),
                LocomotionController::default(),
                LocomotionConfig::player(),
                Rapier3dCharacterBundle::new(),
                Collider::capsule_y(0.5, 0.3),
            ))
            .id();

        for _ in 0..3 {
            step(&mut app);
        }

        let controller = app.world().get::<LocomotionController>(entity).unwrap();
        assert!(controller.ground().grounded);
        assert!(controller.ground().walkable);
        assert!(app.world().get::<Grounded>(entity).is_some());
    }
}
