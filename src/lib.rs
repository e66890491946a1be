//! # `msg_locomotion_controller`
//!
//! A third-person locomotion controller for Bevy with a physics backend
//! abstraction.
//!
//! This crate turns per-tick movement intent into a displacement for a
//! kinematic character:
//! - Ground sensing with a downward sphere sweep and slope classification
//! - Camera-relative walking and sprinting with exponential smoothing
//! - Steep-slope sliding that the player can brace against
//! - Stamina that gates sprinting and pays for dodge rolls
//! - Buffered and coyote-time jumping
//! - Dodge rolls with an input-locked recovery window and a cooldown
//! - Abstracts the physics backend for easy swapping (Rapier3D included)
//!
//! ## Architecture
//!
//! All gameplay logic lives in [`LocomotionController::tick`], which is
//! independent of the engine and testable without a world. The ECS side
//! runs every fixed tick in four ordered phases ([`LocomotionSet`]):
//! 1. **Sensors**: the backend sweeps for ground and writes the contact
//! 2. **Simulation**: the tick classifies the state and integrates velocity
//! 3. **Apply**: the backend moves the body, the visual body is turned
//! 4. **Sync**: marker components and state change events are updated
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use msg_locomotion_controller::prelude::*;
//!
//! let settings = LocomotionSettings::default();
//! let mut controller = LocomotionController::new(&settings);
//! controller.set_ground(GroundContact::from_normal(Vec3::Y, 45.0));
//!
//! let mut intent = MovementIntent::new();
//! intent.set_axes(0.0, 1.0);
//!
//! let output = controller.tick(
//!     &intent.snapshot(),
//!     MovementBasis::default(),
//!     &settings,
//!     1.0 / 60.0,
//! );
//! assert_eq!(controller.state(), LocomotionState::Walking);
//! assert!(output.displacement.z < 0.0);
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod collision;
pub mod config;
pub mod controller;
pub mod detection;
pub mod error;
pub mod intent;
pub mod jump;
pub mod motion;
pub mod roll;
pub mod stamina;
pub mod state;
pub mod systems;

#[cfg(feature = "rapier3d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::{LocomotionPhysicsBackend, TransformBackend};
    pub use crate::collision::{CollisionData, GroundQuery};
    pub use crate::config::{
        FacingReference, GroundProbeConfig, LocomotionConfig, LocomotionSettings, RollConfig,
        SlideConfig, StaminaConfig, VisualBody,
    };
    pub use crate::controller::{
        FacingUpdate, LocomotionController, LocomotionSummary, PendingMotion, TickOutput,
    };
    pub use crate::detection::{sense_ground, GroundContact};
    pub use crate::error::ConfigError;
    pub use crate::intent::{InputSnapshot, MovementBasis, MovementIntent};
    pub use crate::roll::{RollPhase, RollRejection};
    pub use crate::state::{Airborne, Grounded, LocomotionState, LocomotionStateChanged};
    pub use crate::{LocomotionControllerPlugin, LocomotionSet};

    #[cfg(feature = "rapier3d")]
    pub use crate::rapier::{Rapier3dBackend, Rapier3dCharacterBundle};
}

/// System sets for the locomotion controller, run in order in `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocomotionSet {
    /// Ground sensing (backend) and setup of new controllers.
    Sensors,
    /// The controller tick.
    Simulation,
    /// Displacement and facing application.
    Apply,
    /// Marker components and events.
    Sync,
}

/// Main plugin for the locomotion controller.
///
/// This plugin is generic over a physics backend `B` which provides ground
/// sensing and collision-resolving movement.
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier3dBackend`)
///
/// # Examples
///
/// With Rapier3D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier3d::prelude::*;
/// use msg_locomotion_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
///     .add_plugins(LocomotionControllerPlugin::<Rapier3dBackend>::default())
///     .run();
/// ```
pub struct LocomotionControllerPlugin<B: backend::LocomotionPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::LocomotionPhysicsBackend> Default for LocomotionControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::LocomotionPhysicsBackend> Plugin for LocomotionControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        app.register_type::<controller::LocomotionController>();
        app.register_type::<controller::PendingMotion>();
        app.register_type::<config::LocomotionConfig>();
        app.register_type::<config::GroundProbeConfig>();
        app.register_type::<config::SlideConfig>();
        app.register_type::<config::StaminaConfig>();
        app.register_type::<config::RollConfig>();
        app.register_type::<config::FacingReference>();
        app.register_type::<config::VisualBody>();
        app.register_type::<intent::MovementIntent>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();

        app.add_event::<state::LocomotionStateChanged>();

        app.configure_sets(
            FixedUpdate,
            (
                LocomotionSet::Sensors,
                LocomotionSet::Simulation,
                LocomotionSet::Apply,
                LocomotionSet::Sync,
            )
                .chain(),
        );

        app.add_plugins(B::plugin());

        app.add_systems(
            FixedUpdate,
            systems::validate_new_configs.in_set(LocomotionSet::Sensors),
        );
        app.add_systems(
            FixedUpdate,
            systems::tick_controllers::<B>.in_set(LocomotionSet::Simulation),
        );
        app.add_systems(
            FixedUpdate,
            (systems::apply_motion::<B>, systems::apply_facing)
                .chain()
                .in_set(LocomotionSet::Apply),
        );
        app.add_systems(
            FixedUpdate,
            systems::sync_state_markers.in_set(LocomotionSet::Sync),
        );
    }
}
