//! Third Person Example
//!
//! A playable example with a character on a small test course featuring:
//! - A flat floor
//! - A walkable ramp
//! - A steep slope the character slides down unless bracing
//!
//! ## Controls
//! - **WASD**: Move relative to the camera
//! - **Shift** (hold): Sprint while moving forward
//! - **Space**: Jump
//! - **Ctrl**: Dodge roll
//! - **Arrow keys**: Orbit the camera
//!
//! The camera follows the player and is its facing reference.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use msg_locomotion_controller::prelude::*;

// ==================== Constants ====================

const PLAYER_HALF_HEIGHT: f32 = 0.5;
const PLAYER_RADIUS: f32 = 0.3;

const FLOOR_SIZE: f32 = 60.0;

const RAMP_ANGLE_DEG: f32 = 25.0;
const STEEP_ANGLE_DEG: f32 = 55.0;

const CAMERA_DISTANCE: f32 = 7.0;
const CAMERA_ORBIT_SPEED: f32 = 2.0;
const CAMERA_PITCH_LIMIT: f32 = 1.2;

// ==================== Components ====================

#[derive(Component)]
struct Player;

#[derive(Component)]
struct HudText;

#[derive(Component)]
struct OrbitCamera {
    yaw: f32,
    pitch: f32,
}

// ==================== Main ====================

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Third Person - Locomotion Controller Example".into(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        // Physics
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
        .add_plugins(RapierDebugRenderPlugin::default())
        // Character controller
        .add_plugins(LocomotionControllerPlugin::<Rapier3dBackend>::default())
        .add_systems(Startup, (setup_world, setup_player, setup_hud).chain())
        .add_systems(Update, (handle_input, orbit_camera, update_hud))
        .run();
}

// ==================== Setup ====================

fn setup_world(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(10.0, 20.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let ground = materials.add(Color::srgb(0.35, 0.45, 0.35));
    let ramp = materials.add(Color::srgb(0.55, 0.5, 0.4));
    let steep = materials.add(Color::srgb(0.6, 0.35, 0.3));

    spawn_static_box(
        &mut commands,
        &mut meshes,
        ground,
        Vec3::new(FLOOR_SIZE / 2.0, 0.5, FLOOR_SIZE / 2.0),
        Transform::from_xyz(0.0, -0.5, 0.0),
    );
    spawn_slope(
        &mut commands,
        &mut meshes,
        ramp,
        Vec3::new(-6.0, 0.0, -8.0),
        RAMP_ANGLE_DEG,
        8.0,
    );
    spawn_slope(
        &mut commands,
        &mut meshes,
        steep,
        Vec3::new(6.0, 0.0, -8.0),
        STEEP_ANGLE_DEG,
        8.0,
    );
}

/// A plank tilted about X that rises away from the camera, resting on the floor.
fn spawn_slope(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    material: Handle<StandardMaterial>,
    foot: Vec3,
    angle_deg: f32,
    length: f32,
) {
    let angle = angle_deg.to_radians();
    let half = Vec3::new(2.5, 0.25, length / 2.0);
    let rotation = Quat::from_rotation_x(angle);
    let center = foot + rotation * Vec3::new(0.0, 0.0, -half.z);
    spawn_static_box(
        commands,
        meshes,
        material,
        half,
        Transform::from_translation(center).with_rotation(rotation),
    );
}

fn spawn_static_box(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    material: Handle<StandardMaterial>,
    half_extents: Vec3,
    transform: Transform,
) {
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::from_size(half_extents * 2.0))),
        MeshMaterial3d(material),
        transform,
        RigidBody::Fixed,
        Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
    ));
}

fn setup_player(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let camera = commands
        .spawn((
            Camera3d::default(),
            Transform::from_xyz(0.0, 4.0, CAMERA_DISTANCE).looking_at(Vec3::Y, Vec3::Y),
            OrbitCamera {
                yaw: 0.0,
                pitch: -0.35,
            },
        ))
        .id();

    let player = commands
        .spawn((
            Player,
            Transform::from_xyz(0.0, PLAYER_HALF_HEIGHT + PLAYER_RADIUS + 0.1, 4.0),
            Visibility::default(),
            LocomotionController::default(),
            LocomotionConfig::player(),
            GroundProbeConfig::default(),
            SlideConfig::default(),
            StaminaConfig::default(),
            RollConfig::default(),
            Rapier3dCharacterBundle::new().with_autostep(0.3, 0.2),
            Collider::capsule_y(PLAYER_HALF_HEIGHT, PLAYER_RADIUS),
            FacingReference(camera),
        ))
        .id();

    // The visible body turns independently of the kinematic collider.
    let body_material = materials.add(Color::srgb(0.2, 0.5, 0.9));
    let nose_material = materials.add(Color::srgb(0.95, 0.85, 0.2));
    let visual = commands
        .spawn((
            Mesh3d(meshes.add(Capsule3d::new(PLAYER_RADIUS, PLAYER_HALF_HEIGHT * 2.0))),
            MeshMaterial3d(body_material),
            Transform::default(),
            ChildOf(player),
        ))
        .id();
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(0.15, 0.15, 0.3))),
        MeshMaterial3d(nose_material),
        Transform::from_xyz(0.0, 0.3, -PLAYER_RADIUS),
        ChildOf(visual),
    ));

    commands.entity(player).insert(VisualBody(visual));
}

fn setup_hud(mut commands: Commands) {
    commands.spawn((
        HudText,
        Text::new(""),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
    ));
}

// ==================== Systems ====================

/// Writes keyboard state into the player's `MovementIntent`.
///
/// Buttons are forwarded as held states; press edges are detected by the
/// controller.
fn handle_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<&mut MovementIntent, With<Player>>,
) {
    for mut intent in &mut query {
        let mut lateral = 0.0;
        let mut forward = 0.0;
        if keyboard.pressed(KeyCode::KeyA) {
            lateral -= 1.0;
        }
        if keyboard.pressed(KeyCode::KeyD) {
            lateral += 1.0;
        }
        if keyboard.pressed(KeyCode::KeyW) {
            forward += 1.0;
        }
        if keyboard.pressed(KeyCode::KeyS) {
            forward -= 1.0;
        }
        intent.set_axes(lateral, forward);
        intent.set_forward_held(keyboard.pressed(KeyCode::KeyW));
        intent.set_sprint_held(keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]));
        intent.set_jump_pressed(keyboard.pressed(KeyCode::Space));
        intent.set_roll_pressed(
            keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]),
        );
    }
}

fn orbit_camera(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    q_player: Query<&Transform, (With<Player>, Without<OrbitCamera>)>,
    mut q_camera: Query<(&mut Transform, &mut OrbitCamera)>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };
    let Ok((mut transform, mut orbit)) = q_camera.single_mut() else {
        return;
    };

    let step = CAMERA_ORBIT_SPEED * time.delta_secs();
    if keyboard.pressed(KeyCode::ArrowLeft) {
        orbit.yaw += step;
    }
    if keyboard.pressed(KeyCode::ArrowRight) {
        orbit.yaw -= step;
    }
    if keyboard.pressed(KeyCode::ArrowUp) {
        orbit.pitch -= step;
    }
    if keyboard.pressed(KeyCode::ArrowDown) {
        orbit.pitch += step;
    }
    orbit.pitch = orbit.pitch.clamp(-CAMERA_PITCH_LIMIT, CAMERA_PITCH_LIMIT);

    let target = player.translation + Vec3::Y * 0.8;
    let rotation = Quat::from_euler(EulerRot::YXZ, orbit.yaw, orbit.pitch, 0.0);
    *transform = Transform::from_translation(target + rotation * Vec3::Z * CAMERA_DISTANCE)
        .looking_at(target, Vec3::Y);
}

fn update_hud(
    q_player: Query<&LocomotionController, With<Player>>,
    mut q_text: Query<&mut Text, With<HudText>>,
) {
    let Ok(controller) = q_player.single() else {
        return;
    };
    for mut text in &mut q_text {
        text.0 = format!(
            "{}\n\nWASD move, Shift sprint, Space jump, Ctrl roll, arrows orbit",
            controller.summary()
        );
    }
}
