//! Locomotion state label and marker components.
//!
//! The discrete state is never set directly. It is recomputed every tick by
//! [`classify`] from grounding, slope, stamina and action flags, in a fixed
//! precedence order. `Grounded`/`Airborne` markers mirror the ground contact
//! for queries that only care about that.

use std::fmt;

use bevy::prelude::*;

/// Discrete locomotion state, one per tick.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LocomotionState {
    #[default]
    Idle,
    Walking,
    Sprinting,
    Sliding,
    Airborne,
    Exhausted,
    Rolling,
}

impl LocomotionState {
    /// Short display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Walking => "Walking",
            Self::Sprinting => "Sprinting",
            Self::Sliding => "Sliding",
            Self::Airborne => "Airborne",
            Self::Exhausted => "Exhausted",
            Self::Rolling => "Rolling",
        }
    }
}

impl fmt::Display for LocomotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the state label is derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateInputs {
    /// Roll timer still running.
    pub rolling: bool,
    /// Ground probe hit.
    pub grounded: bool,
    /// Surface is walkable.
    pub walkable: bool,
    /// Forward intent held (bracing on steep ground).
    pub forward_held: bool,
    /// Sprint intent held.
    pub sprint_held: bool,
    /// Stamina at or below the sprint threshold.
    pub stamina_depleted: bool,
    /// Movement axes deflected.
    pub has_move_input: bool,
    /// Sprint gating passed this tick.
    pub sprint_permitted: bool,
}

/// Derive the state label. First match wins:
/// rolling, airborne, steep ground (bracing → walking, else sliding),
/// exhausted, idle, then sprinting or walking.
pub fn classify(inputs: &StateInputs) -> LocomotionState {
    if inputs.rolling {
        return LocomotionState::Rolling;
    }
    if !inputs.grounded {
        return LocomotionState::Airborne;
    }
    if !inputs.walkable {
        return if inputs.forward_held {
            LocomotionState::Walking
        } else {
            LocomotionState::Sliding
        };
    }
    if inputs.sprint_held && inputs.forward_held && inputs.stamina_depleted {
        return LocomotionState::Exhausted;
    }
    if !inputs.has_move_input {
        return LocomotionState::Idle;
    }
    if inputs.sprint_permitted {
        LocomotionState::Sprinting
    } else {
        LocomotionState::Walking
    }
}

/// Marker component indicating the character is grounded.
///
/// Added automatically when the ground probe finds a surface. Removed when the
/// character becomes airborne.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is airborne.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Sent when a controller's state label changes.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocomotionStateChanged {
    /// Controller entity.
    pub entity: Entity,
    /// Label before the tick.
    pub from: LocomotionState,
    /// Label after the tick.
    pub to: LocomotionState,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walking_ground() -> StateInputs {
        StateInputs {
            grounded: true,
            walkable: true,
            ..default()
        }
    }

    #[test]
    fn rolling_beats_airborne() {
        let inputs = StateInputs {
            rolling: true,
            grounded: false,
            ..default()
        };
        assert_eq!(classify(&inputs), LocomotionState::Rolling);
    }

    #[test]
    fn airborne_when_not_grounded() {
        let inputs = StateInputs {
            has_move_input: true,
            sprint_permitted: true,
            ..default()
        };
        assert_eq!(classify(&inputs), LocomotionState::Airborne);
    }

    #[test]
    fn steep_ground_slides_unless_bracing() {
        let mut inputs = StateInputs {
            walkable: false,
            ..walking_ground()
        };
        assert_eq!(classify(&inputs), LocomotionState::Sliding);

        inputs.forward_held = true;
        assert_eq!(classify(&inputs), LocomotionState::Walking);
    }

    #[test]
    fn steep_ground_beats_exhaustion() {
        let inputs = StateInputs {
            walkable: false,
            sprint_held: true,
            stamina_depleted: true,
            ..walking_ground()
        };
        assert_eq!(classify(&inputs), LocomotionState::Sliding);
    }

    #[test]
    fn exhausted_when_sprinting_on_empty() {
        let inputs = StateInputs {
            forward_held: true,
            sprint_held: true,
            stamina_depleted: true,
            has_move_input: true,
            ..walking_ground()
        };
        assert_eq!(classify(&inputs), LocomotionState::Exhausted);
    }

    #[test]
    fn exhausted_needs_forward_and_sprint() {
        let inputs = StateInputs {
            sprint_held: true,
            stamina_depleted: true,
            has_move_input: true,
            ..walking_ground()
        };
        assert_eq!(classify(&inputs), LocomotionState::Walking);
    }

    #[test]
    fn idle_walk_sprint() {
        let mut inputs = walking_ground();
        assert_eq!(classify(&inputs), LocomotionState::Idle);

        inputs.has_move_input = true;
        assert_eq!(classify(&inputs), LocomotionState::Walking);

        inputs.sprint_permitted = true;
        assert_eq!(classify(&inputs), LocomotionState::Sprinting);
    }

    #[test]
    fn display_names() {
        assert_eq!(LocomotionState::Sliding.to_string(), "Sliding");
        assert_eq!(LocomotionState::default(), LocomotionState::Idle);
    }
}
