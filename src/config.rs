//! Controller configuration components.
//!
//! Tuning is split into small, independently tunable components: movement and
//! jump, the ground probe, steep-slope sliding, stamina and the dodge roll.
//! Each one has sensible defaults, builder methods and a `validate` check.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{fraction, non_negative, ConfigError};

/// Movement, turning, jump and gravity tuning.
#[derive(Component, Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[serde(default)]
pub struct LocomotionConfig {
    // === Movement ===
    /// Base ground speed (units/second).
    pub move_speed: f32,

    /// Smoothing rate toward the desired velocity while input is held.
    pub acceleration: f32,

    /// Smoothing rate toward zero while no input is held.
    pub deceleration: f32,

    /// Speed multiplier applied while sprinting.
    pub sprint_multiplier: f32,

    /// Slerp rate of the visual body toward the movement direction.
    pub turn_speed: f32,

    // === Jump ===
    /// Apex height of a jump under constant gravity (units).
    pub jump_height: f32,

    /// How long an early jump press stays valid (seconds).
    pub jump_buffer_time: f32,

    /// Buffer duration for presses made while input-locked (seconds).
    /// Longer than `jump_buffer_time` so a press during a roll survives it.
    pub locked_jump_buffer_time: f32,

    /// Grace window after leaving the ground during which a jump still fires.
    pub coyote_time: f32,

    // === Gravity ===
    /// Gravity magnitude (units/second^2). Applied along -Y.
    pub gravity: f32,

    /// Vertical velocity held while grounded so the body hugs uneven ground.
    pub ground_stick_velocity: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            acceleration: 10.0,
            deceleration: 15.0,
            sprint_multiplier: 1.8,
            turn_speed: 10.0,

            jump_height: 1.2,
            jump_buffer_time: 0.15,
            locked_jump_buffer_time: 0.6,
            coyote_time: 0.15,

            gravity: 20.0,
            ground_stick_velocity: -2.0,
        }
    }
}

impl LocomotionConfig {
    /// Snappy tuning for a player-controlled character.
    pub fn player() -> Self {
        Self {
            acceleration: 14.0,
            deceleration: 20.0,
            turn_speed: 14.0,
            ..default()
        }
    }

    /// Builder: set base speed and smoothing rates.
    pub fn with_movement(mut self, move_speed: f32, acceleration: f32, deceleration: f32) -> Self {
        self.move_speed = move_speed;
        self.acceleration = acceleration;
        self.deceleration = deceleration;
        self
    }

    /// Builder: set sprint multiplier.
    pub fn with_sprint_multiplier(mut self, multiplier: f32) -> Self {
        self.sprint_multiplier = multiplier;
        self
    }

    /// Builder: set turn speed.
    pub fn with_turn_speed(mut self, turn_speed: f32) -> Self {
        self.turn_speed = turn_speed;
        self
    }

    /// Builder: set jump height.
    pub fn with_jump_height(mut self, height: f32) -> Self {
        self.jump_height = height;
        self
    }

    /// Builder: set jump buffer durations (normal and while locked).
    pub fn with_jump_buffer(mut self, buffer: f32, locked_buffer: f32) -> Self {
        self.jump_buffer_time = buffer;
        self.locked_jump_buffer_time = locked_buffer;
        self
    }

    /// Builder: set coyote time.
    pub fn with_coyote_time(mut self, time: f32) -> Self {
        self.coyote_time = time;
        self
    }

    /// Builder: set gravity magnitude.
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Check every field for values the simulation cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("move_speed", self.move_speed)?;
        non_negative("acceleration", self.acceleration)?;
        non_negative("deceleration", self.deceleration)?;
        non_negative("sprint_multiplier", self.sprint_multiplier)?;
        non_negative("turn_speed", self.turn_speed)?;
        non_negative("jump_height", self.jump_height)?;
        non_negative("jump_buffer_time", self.jump_buffer_time)?;
        non_negative("locked_jump_buffer_time", self.locked_jump_buffer_time)?;
        non_negative("coyote_time", self.coyote_time)?;
        non_negative("gravity", self.gravity.abs())?;
        if !self.ground_stick_velocity.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "ground_stick_velocity",
                value: self.ground_stick_velocity,
            });
        }
        Ok(())
    }
}

/// Ground probe geometry and walkability threshold.
///
/// The probe is a sphere swept straight down from just above the body's base.
#[derive(Component, Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[serde(default)]
pub struct GroundProbeConfig {
    /// Radius of the swept sphere.
    pub radius: f32,

    /// Height of the sphere's center above the body base when the sweep starts.
    pub origin_height: f32,

    /// Sweep length below the start point.
    pub distance: f32,

    /// Collision-group bits of surfaces that count as ground.
    pub surface_filter: u32,

    /// Steepest walkable slope (degrees).
    pub max_slope_angle: f32,
}

impl Default for GroundProbeConfig {
    fn default() -> Self {
        Self {
            radius: 0.3,
            origin_height: 0.35,
            distance: 0.2,
            surface_filter: u32::MAX,
            max_slope_angle: 45.0,
        }
    }
}

impl GroundProbeConfig {
    /// Builder: set probe sphere radius and sweep distance.
    pub fn with_probe(mut self, radius: f32, distance: f32) -> Self {
        self.radius = radius;
        self.distance = distance;
        self
    }

    /// Builder: set the collision-group filter.
    pub fn with_surface_filter(mut self, filter: u32) -> Self {
        self.surface_filter = filter;
        self
    }

    /// Builder: set max walkable slope (degrees).
    pub fn with_max_slope_angle(mut self, degrees: f32) -> Self {
        self.max_slope_angle = degrees;
        self
    }

    /// Check every field for values the sensor cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("probe radius", self.radius)?;
        non_negative("probe origin_height", self.origin_height)?;
        non_negative("probe distance", self.distance)?;
        if !self.max_slope_angle.is_finite() || !(0.0..90.0).contains(&self.max_slope_angle) {
            return Err(ConfigError::SlopeOutOfRange(self.max_slope_angle));
        }
        Ok(())
    }
}

/// Steep-slope sliding.
#[derive(Component, Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[serde(default)]
pub struct SlideConfig {
    /// Whether steep slopes push the character downhill.
    pub enabled: bool,

    /// Slide speed at a vertical wall; scaled down by the steepness fraction.
    pub speed: f32,

    /// Ramp rate toward the slide target (and back to zero off the slope).
    pub acceleration: f32,

    /// Immediate blend factor toward the target on the tick bracing ends.
    pub kick_factor: f32,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 8.0,
            acceleration: 4.0,
            kick_factor: 0.6,
        }
    }
}

impl SlideConfig {
    /// Sliding switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..default()
        }
    }

    /// Builder: set slide speed and ramp rate.
    pub fn with_slide(mut self, speed: f32, acceleration: f32) -> Self {
        self.speed = speed;
        self.acceleration = acceleration;
        self
    }

    /// Builder: set kick factor.
    pub fn with_kick_factor(mut self, kick: f32) -> Self {
        self.kick_factor = kick;
        self
    }

    /// Check every field for values the slide cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("slide speed", self.speed)?;
        non_negative("slide acceleration", self.acceleration)?;
        fraction("slide kick_factor", self.kick_factor)
    }
}

/// Stamina pool tuning.
#[derive(Component, Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[serde(default)]
pub struct StaminaConfig {
    /// Pool capacity.
    pub max: f32,

    /// Drain per second while sprinting.
    pub drain_rate: f32,

    /// Regeneration per second once the exhaustion delay has elapsed.
    pub regen_rate: f32,

    /// Seconds of suppressed regen after hitting zero or spending stamina.
    pub exhaustion_delay: f32,

    /// Stamina at or below this blocks sprinting.
    pub sprint_threshold: f32,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            drain_rate: 25.0,
            regen_rate: 18.0,
            exhaustion_delay: 0.6,
            sprint_threshold: 0.1,
        }
    }
}

impl StaminaConfig {
    /// Builder: set capacity.
    pub fn with_max(mut self, max: f32) -> Self {
        self.max = max;
        self
    }

    /// Builder: set drain and regen rates.
    pub fn with_rates(mut self, drain: f32, regen: f32) -> Self {
        self.drain_rate = drain;
        self.regen_rate = regen;
        self
    }

    /// Builder: set exhaustion delay.
    pub fn with_exhaustion_delay(mut self, delay: f32) -> Self {
        self.exhaustion_delay = delay;
        self
    }

    /// Check every field for values the pool cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("stamina max", self.max)?;
        if self.max == 0.0 {
            return Err(ConfigError::ZeroStamina);
        }
        non_negative("stamina drain_rate", self.drain_rate)?;
        non_negative("stamina regen_rate", self.regen_rate)?;
        non_negative("stamina exhaustion_delay", self.exhaustion_delay)?;
        non_negative("stamina sprint_threshold", self.sprint_threshold)
    }
}

/// Dodge roll tuning.
#[derive(Component, Reflect, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
#[serde(default)]
pub struct RollConfig {
    /// Seconds spent rolling.
    pub duration: f32,

    /// Ground speed while rolling.
    pub speed: f32,

    /// Stamina spent on a successful roll.
    pub cost: f32,

    /// Seconds after a roll ends before the next may start.
    pub cooldown: f32,

    /// Seconds of input lock after the roll itself ends.
    pub recovery: f32,

    /// Fraction of roll speed carried into recovery.
    pub carry_fraction: f32,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            duration: 0.45,
            speed: 9.0,
            cost: 25.0,
            cooldown: 0.35,
            recovery: 0.2,
            carry_fraction: 0.25,
        }
    }
}

impl RollConfig {
    /// Builder: set duration and speed.
    pub fn with_roll(mut self, duration: f32, speed: f32) -> Self {
        self.duration = duration;
        self.speed = speed;
        self
    }

    /// Builder: set stamina cost.
    pub fn with_cost(mut self, cost: f32) -> Self {
        self.cost = cost;
        self
    }

    /// Builder: set cooldown and recovery durations.
    pub fn with_timing(mut self, cooldown: f32, recovery: f32) -> Self {
        self.cooldown = cooldown;
        self.recovery = recovery;
        self
    }

    /// Check every field for values the roll cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("roll duration", self.duration)?;
        non_negative("roll speed", self.speed)?;
        non_negative("roll cost", self.cost)?;
        non_negative("roll cooldown", self.cooldown)?;
        non_negative("roll recovery", self.recovery)?;
        fraction("roll carry_fraction", self.carry_fraction)
    }
}

/// Every tuning component the tick needs, gathered into one value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocomotionSettings {
    /// Movement, jump and gravity tuning.
    pub locomotion: LocomotionConfig,
    /// Ground probe shape and walkable slope limit.
    pub probe: GroundProbeConfig,
    /// Steep-slope sliding.
    pub slide: SlideConfig,
    /// Stamina pool.
    pub stamina: StaminaConfig,
    /// Dodge roll.
    pub roll: RollConfig,
}

impl LocomotionSettings {
    /// Gather settings from optional components, defaulting what is missing.
    pub fn from_components(
        locomotion: Option<&LocomotionConfig>,
        probe: Option<&GroundProbeConfig>,
        slide: Option<&SlideConfig>,
        stamina: Option<&StaminaConfig>,
        roll: Option<&RollConfig>,
    ) -> Self {
        Self {
            locomotion: locomotion.copied().unwrap_or_default(),
            probe: probe.copied().unwrap_or_default(),
            slide: slide.copied().unwrap_or_default(),
            stamina: stamina.copied().unwrap_or_default(),
            roll: roll.copied().unwrap_or_default(),
        }
    }

    /// Validate all parts, reporting the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.locomotion.validate()?;
        self.probe.validate()?;
        self.slide.validate()?;
        self.stamina.validate()?;
        self.roll.validate()
    }
}

/// Optional external facing reference, usually the follow camera.
///
/// When present, movement input is interpreted relative to this entity's
/// ground-flattened forward/right instead of the body's own.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Component)]
pub struct FacingReference(pub Entity);

/// Optional visual body (mesh root) turned toward the movement direction.
///
/// When absent, orientation updates are skipped.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Component)]
pub struct VisualBody(pub Entity);
