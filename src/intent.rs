//! Movement intent components.
//!
//! Intents represent what the player (or AI) wants this tick: two movement
//! axes and four action signals. The controller never reads input devices;
//! whatever drives the character writes a [`MovementIntent`], and each tick
//! it is reduced to an [`InputSnapshot`] with edges already detected.

use bevy::prelude::*;

/// Movement magnitude below which there is no movement input.
pub const MOVE_EPSILON: f32 = 0.001;

/// Forward/back component needed before the body turns toward movement.
pub const TURN_INPUT_THRESHOLD: f32 = 0.1;

/// Raw movement intent written by input handling or AI.
///
/// Action buttons are plain held states; the controller derives press edges
/// from them and latches the previous state after each tick.
///
/// # Example
///
/// ```rust
/// use msg_locomotion_controller::prelude::*;
///
/// let mut intent = MovementIntent::new();
/// intent.set_axes(0.0, 1.0);
/// intent.set_jump_pressed(true);
///
/// let snapshot = intent.snapshot();
/// assert!(snapshot.has_move_input());
/// assert!(snapshot.jump_pressed);
///
/// // Once latched, a held button is no longer a fresh press.
/// intent.latch();
/// assert!(!intent.snapshot().jump_pressed);
/// ```
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct MovementIntent {
    /// Lateral axis (-1.0 = left, 1.0 = right).
    pub lateral: f32,
    /// Forward axis (-1.0 = back, 1.0 = forward).
    pub forward: f32,
    /// Forward button held. Drives sprint gating and steep-slope bracing.
    pub forward_held: bool,
    /// Sprint button held.
    pub sprint_held: bool,
    /// Jump button held.
    pub jump_pressed: bool,
    /// Roll button held.
    pub roll_pressed: bool,
    pub(crate) jump_pressed_prev: bool,
    pub(crate) roll_pressed_prev: bool,
}

impl MovementIntent {
    /// Create a new empty movement intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set both movement axes, each clamped to [-1, 1].
    pub fn set_axes(&mut self, lateral: f32, forward: f32) {
        self.lateral = sanitize_axis(lateral);
        self.forward = sanitize_axis(forward);
    }

    /// Set the forward-hold signal.
    pub fn set_forward_held(&mut self, held: bool) {
        self.forward_held = held;
    }

    /// Set the sprint-hold signal.
    pub fn set_sprint_held(&mut self, held: bool) {
        self.sprint_held = held;
    }

    /// Set the jump button state. Call every frame with the current state.
    pub fn set_jump_pressed(&mut self, pressed: bool) {
        self.jump_pressed = pressed;
    }

    /// Set the roll button state. Call every frame with the current state.
    pub fn set_roll_pressed(&mut self, pressed: bool) {
        self.roll_pressed = pressed;
    }

    /// Clear axes and held signals. Press history is kept so a button that is
    /// still physically held does not register a new press afterwards.
    pub fn clear(&mut self) {
        self.lateral = 0.0;
        self.forward = 0.0;
        self.forward_held = false;
        self.sprint_held = false;
        self.jump_pressed = false;
        self.roll_pressed = false;
    }

    /// Reduce the intent to this tick's snapshot, detecting press edges.
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            move_vector: clamp_move(Vec2::new(self.lateral, self.forward)),
            forward_held: self.forward_held,
            sprint_held: self.sprint_held,
            jump_pressed: self.jump_pressed && !self.jump_pressed_prev,
            roll_pressed: self.roll_pressed && !self.roll_pressed_prev,
        }
    }

    /// Remember the current button states for next tick's edge detection.
    pub fn latch(&mut self) {
        self.jump_pressed_prev = self.jump_pressed;
        self.roll_pressed_prev = self.roll_pressed;
    }
}

/// One tick of resolved input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    /// Movement axes (x = lateral, y = forward), magnitude at most 1.
    pub move_vector: Vec2,
    /// Forward button held.
    pub forward_held: bool,
    /// Sprint button held.
    pub sprint_held: bool,
    /// Jump was pressed this tick.
    pub jump_pressed: bool,
    /// Roll was pressed this tick.
    pub roll_pressed: bool,
}

impl InputSnapshot {
    /// Snapshot with only movement axes set.
    pub fn moving(lateral: f32, forward: f32) -> Self {
        Self {
            move_vector: clamp_move(Vec2::new(sanitize_axis(lateral), sanitize_axis(forward))),
            ..default()
        }
    }

    /// Whether the movement axes are meaningfully deflected.
    #[inline]
    pub fn has_move_input(&self) -> bool {
        self.move_vector.length() > MOVE_EPSILON
    }

    /// Whether the forward/back axis is strong enough to turn the body.
    #[inline]
    pub fn turns_body(&self) -> bool {
        self.move_vector.y.abs() > TURN_INPUT_THRESHOLD
    }
}

/// Ground-flattened forward/right pair that input axes are rotated into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementBasis {
    /// Unit forward on the ground plane.
    pub forward: Vec3,
    /// Unit right on the ground plane.
    pub right: Vec3,
    /// Direction of a roll started without movement input.
    pub facing: Vec3,
}

impl Default for MovementBasis {
    fn default() -> Self {
        Self {
            forward: Vec3::NEG_Z,
            right: Vec3::X,
            facing: Vec3::NEG_Z,
        }
    }
}

impl MovementBasis {
    /// Flatten a transform's forward/right onto the ground plane.
    ///
    /// Returns `None` when the transform looks straight up or down.
    pub fn from_transform(transform: &Transform) -> Option<Self> {
        Self::from_rotation(transform.rotation)
    }

    /// Flatten a rotation's forward/right onto the ground plane.
    pub fn from_rotation(rotation: Quat) -> Option<Self> {
        let forward = flatten(rotation * Vec3::NEG_Z);
        let right = flatten(rotation * Vec3::X);
        if forward == Vec3::ZERO || right == Vec3::ZERO {
            return None;
        }
        Some(Self {
            forward,
            right,
            facing: forward,
        })
    }

    /// Pick the camera basis when available and usable, else the body basis.
    pub fn resolve(body: Quat, camera: Option<Quat>) -> Self {
        Self::resolve_with_facing(body, camera, None)
    }

    /// Like [`resolve`](Self::resolve), but without a usable camera the roll
    /// fallback follows `facing` (the visible body) instead of `body`.
    ///
    /// Movement never follows `facing`: the controller turns that rotation
    /// toward the movement direction, so input relative to it would chase
    /// itself.
    pub fn resolve_with_facing(body: Quat, camera: Option<Quat>, facing: Option<Quat>) -> Self {
        if let Some(basis) = camera.and_then(Self::from_rotation) {
            return basis;
        }
        let mut basis = Self::from_rotation(body).unwrap_or_default();
        if let Some(forward) = facing
            .map(|rotation| flatten(rotation * Vec3::NEG_Z))
            .filter(|forward| *forward != Vec3::ZERO)
        {
            basis.facing = forward;
        }
        basis
    }

    /// Rotate a move vector into a normalized world direction (zero if none).
    pub fn world_direction(&self, move_vector: Vec2) -> Vec3 {
        (self.forward * move_vector.y + self.right * move_vector.x).normalize_or_zero()
    }
}

/// Drop the vertical component and renormalize.
///
/// Vectors that are (nearly) vertical flatten to zero.
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    let flat = Vec3::new(v.x, 0.0, v.z);
    if flat.length_squared() < 1e-6 {
        Vec3::ZERO
    } else {
        flat.normalize()
    }
}

fn sanitize_axis(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

fn clamp_move(v: Vec2) -> Vec2 {
    v.clamp_length_max(1.0)
}
