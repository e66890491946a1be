//! The integrated per-tick locomotion update.
//!
//! [`LocomotionController`] owns every piece of mutable controller state and
//! advances it through [`LocomotionController::tick`] in a fixed order:
//! roll timers, roll trigger, state classification, stamina, planar
//! velocity, vertical velocity, facing. The tick is pure with respect to
//! the engine: ground contact is written in beforehand, and the returned
//! [`TickOutput`] carries the displacement for the physics backend.

use std::fmt;

use bevy::prelude::*;

use crate::config::LocomotionSettings;
use crate::detection::GroundContact;
use crate::intent::{InputSnapshot, MovementBasis, MovementIntent};
use crate::jump::JumpRequest;
use crate::motion::{
    desired_planar_velocity, integrate_planar, integrate_vertical, jump_impulse, lerp_factor,
    turn_toward, MotionVector, SlideState,
};
use crate::roll::{RollRejection, RollSession};
use crate::stamina::StaminaPool;
use crate::state::{classify, LocomotionState, StateInputs};

/// How the visual body should rotate after a tick.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub enum FacingUpdate {
    /// Keep the current orientation.
    #[default]
    None,
    /// Turn smoothly toward a direction at the configured turn speed.
    TurnToward(Vec3),
    /// Face a direction immediately (roll start).
    Snap(Vec3),
}

impl FacingUpdate {
    /// Apply to a rotation.
    pub fn apply(self, current: Quat, turn_speed: f32, dt: f32) -> Quat {
        match self {
            Self::None => current,
            Self::TurnToward(direction) => turn_toward(current, direction, turn_speed, dt),
            Self::Snap(direction) => turn_toward(current, direction, 1.0, 1.0),
        }
    }
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickOutput {
    /// World-space displacement to hand to the physics backend.
    pub displacement: Vec3,
    /// A jump fired this tick.
    pub jumped: bool,
    /// A roll started this tick.
    pub roll_started: bool,
    /// Requested body rotation.
    pub facing: FacingUpdate,
}

/// Output of the latest tick waiting to be applied by the backend.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct PendingMotion {
    /// Displacement for this tick.
    pub displacement: Vec3,
    /// Requested body rotation.
    pub facing: FacingUpdate,
    /// Tick length the output was computed with.
    pub dt: f32,
    /// State label before the tick.
    pub previous_state: LocomotionState,
}

/// Runtime state of a third-person locomotion controller.
///
/// Configuration lives in separate components (see [`LocomotionSettings`]);
/// this component only holds what changes from tick to tick.
#[derive(Component, Reflect, Debug, Clone, Default, PartialEq)]
#[reflect(Component)]
#[require(MovementIntent, PendingMotion)]
pub struct LocomotionController {
    ground: GroundContact,
    motion: MotionVector,
    slide: SlideState,
    stamina: StaminaPool,
    roll: RollSession,
    jump: JumpRequest,
    state: LocomotionState,
}

impl LocomotionController {
    /// A fresh controller with a full stamina pool sized from `settings`.
    pub fn new(settings: &LocomotionSettings) -> Self {
        Self {
            stamina: StaminaPool::full(&settings.stamina),
            ..default()
        }
    }

    /// Ground contact used by the next tick.
    #[inline]
    pub fn ground(&self) -> &GroundContact {
        &self.ground
    }

    /// Replace the ground contact. Written by the sensing step every tick.
    #[inline]
    pub fn set_ground(&mut self, ground: GroundContact) {
        self.ground = ground;
    }

    /// Current state label.
    #[inline]
    pub fn state(&self) -> LocomotionState {
        self.state
    }

    /// Stamina pool.
    #[inline]
    pub fn stamina(&self) -> &StaminaPool {
        &self.stamina
    }

    /// Roll session.
    #[inline]
    pub fn roll(&self) -> &RollSession {
        &self.roll
    }

    /// Jump buffer and coyote counters.
    #[inline]
    pub fn jump(&self) -> &JumpRequest {
        &self.jump
    }

    /// Planar and vertical velocity.
    #[inline]
    pub fn motion(&self) -> &MotionVector {
        &self.motion
    }

    /// Slide contribution.
    #[inline]
    pub fn slide(&self) -> &SlideState {
        &self.slide
    }

    /// Total velocity, slide included.
    pub fn velocity(&self) -> Vec3 {
        self.motion.velocity(self.slide.velocity())
    }

    /// Whether rolling or recovering.
    #[inline]
    pub fn is_input_locked(&self) -> bool {
        self.roll.is_locked()
    }

    /// Refill stamina and resize the pool to the configured max.
    pub fn reset_stamina(&mut self, settings: &LocomotionSettings) {
        self.stamina = StaminaPool::full(&settings.stamina);
    }

    /// Display-only snapshot of the observable values.
    pub fn summary(&self) -> LocomotionSummary {
        LocomotionSummary {
            state: self.state,
            stamina: self.stamina.current(),
            max_stamina: self.stamina.max(),
            grounded: self.ground.grounded,
            walkable: self.ground.walkable,
            slope_angle: self.ground.angle,
            roll_timer: self.roll.roll_timer(),
            recovery_timer: self.roll.recovery_timer(),
            cooldown_timer: self.roll.cooldown_timer(),
        }
    }

    /// Attempt to start a roll.
    ///
    /// Returns the roll direction on success. On rejection nothing changes.
    pub fn try_roll(
        &mut self,
        move_direction: Vec3,
        basis: MovementBasis,
        settings: &LocomotionSettings,
    ) -> Result<Vec3, RollRejection> {
        let ground = self.ground;
        self.roll.check_ready(ground.grounded, ground.walkable)?;
        if !self.stamina.try_spend(settings.roll.cost, &settings.stamina) {
            return Err(RollRejection::Stamina);
        }

        let direction = if move_direction == Vec3::ZERO {
            basis.facing
        } else if ground.is_walkable_ground() {
            ground
                .project(move_direction)
                .try_normalize()
                .unwrap_or(move_direction)
        } else {
            move_direction
        };

        self.roll.start(direction, &settings.roll);
        self.slide = SlideState::default();
        self.motion.planar = direction * settings.roll.speed;
        debug!(
            "roll started toward {direction:?}, stamina left {:.1}",
            self.stamina.current()
        );
        Ok(direction)
    }

    /// Advance the controller by `dt` seconds.
    ///
    /// A non-positive or non-finite `dt` is a no-op.
    pub fn tick(
        &mut self,
        input: &InputSnapshot,
        basis: MovementBasis,
        settings: &LocomotionSettings,
        dt: f32,
    ) -> TickOutput {
        if !(dt.is_finite() && dt > 0.0) {
            return TickOutput::default();
        }

        let locomotion = &settings.locomotion;
        let ground = self.ground;
        let has_move_input = input.has_move_input();
        let move_direction = basis.world_direction(input.move_vector);
        let mut output = TickOutput::default();

        // Roll timers, then trigger.
        let expired = self.roll.advance(dt, &settings.roll);
        if let Some(expired) = expired {
            self.motion.planar =
                expired.direction * settings.roll.speed * settings.roll.carry_fraction;
        }
        if input.roll_pressed {
            match self.try_roll(move_direction, basis, settings) {
                Ok(direction) => {
                    output.roll_started = true;
                    output.facing = FacingUpdate::Snap(direction);
                }
                Err(RollRejection::Stamina) => trace!(
                    "roll rejected: stamina {:.1} < {:.1}",
                    self.stamina.current(),
                    settings.roll.cost
                ),
                Err(reason) => trace!("roll rejected: {reason:?}"),
            }
        }
        let locked = self.roll.is_locked();

        // State.
        let can_sprint = self.stamina.can_sprint(&settings.stamina);
        let sprint_permitted = ground.is_walkable_ground()
            && input.forward_held
            && input.sprint_held
            && can_sprint
            && !locked;
        let next = classify(&StateInputs {
            rolling: self.roll.is_rolling(),
            grounded: ground.grounded,
            walkable: ground.walkable,
            forward_held: input.forward_held,
            sprint_held: input.sprint_held,
            stamina_depleted: !can_sprint,
            has_move_input,
            sprint_permitted,
        });
        if next != self.state {
            debug!("locomotion state {} -> {}", self.state, next);
            self.state = next;
        }
        let sprinting = self.state == LocomotionState::Sprinting;

        if self.stamina.update(sprinting, dt, &settings.stamina) {
            debug!("stamina exhausted");
        }

        // Planar velocity.
        if let Some(direction) = self.roll.direction() {
            self.motion.planar = direction * settings.roll.speed;
        } else if locked {
            if expired.is_none() {
                self.motion.planar = self
                    .motion
                    .planar
                    .lerp(Vec3::ZERO, lerp_factor(locomotion.deceleration, dt));
            }
        } else {
            let speed = if sprinting {
                locomotion.move_speed * locomotion.sprint_multiplier
            } else {
                locomotion.move_speed
            };
            let desired = if has_move_input {
                desired_planar_velocity(move_direction, speed, &ground)
            } else {
                Vec3::ZERO
            };
            self.motion.planar =
                integrate_planar(self.motion.planar, desired, has_move_input, locomotion, dt);
            self.slide.update(
                &ground,
                input.forward_held,
                &settings.slide,
                settings.probe.max_slope_angle,
                dt,
            );
        }

        // Vertical velocity.
        let jumped = self
            .jump
            .update(input.jump_pressed, ground.grounded, locked, dt, locomotion);
        let impulse = jumped.then(|| jump_impulse(locomotion.jump_height, locomotion.gravity));
        if let Some(impulse) = impulse {
            debug!("jump fired with impulse {impulse:.2}");
        }
        self.motion.vertical =
            integrate_vertical(self.motion.vertical, ground.grounded, impulse, locomotion, dt);
        output.jumped = jumped;

        // Facing.
        if !output.roll_started && !locked && input.turns_body() && move_direction != Vec3::ZERO {
            output.facing = FacingUpdate::TurnToward(move_direction);
        }

        output.displacement = self.velocity() * dt;
        output
    }
}

/// Observable controller values, formatted for a debug overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionSummary {
    /// Current state label.
    pub state: LocomotionState,
    /// Stamina left.
    pub stamina: f32,
    /// Stamina pool capacity.
    pub max_stamina: f32,
    /// Whether the ground probe hit something.
    pub grounded: bool,
    /// Whether the ground is shallow enough to walk on.
    pub walkable: bool,
    /// Ground slope in degrees.
    pub slope_angle: f32,
    /// Seconds of roll left.
    pub roll_timer: f32,
    /// Seconds of post-roll recovery left.
    pub recovery_timer: f32,
    /// Seconds until the next roll may start.
    pub cooldown_timer: f32,
}

impl fmt::Display for LocomotionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "State: {}", self.state)?;
        writeln!(f, "Stamina: {:.1} / {:.1}", self.stamina, self.max_stamina)?;
        writeln!(
            f,
            "Grounded: {}  Walkable: {}  Slope: {:.1}°",
            self.grounded, self.walkable, self.slope_angle
        )?;
        write!(
            f,
            "Roll: {:.2}s  Recovery: {:.2}s  Cooldown: {:.2}s",
            self.roll_timer, self.recovery_timer, self.cooldown_timer
        )
    }
}
