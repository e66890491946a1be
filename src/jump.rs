//! Buffered and coyote-time jumping.
//!
//! Two countdowns decide when a jump fires. The buffer is armed by a press
//! and remembers it for a short while; the coyote counter is armed while
//! grounded and lingers briefly after leaving the ground. A jump fires when
//! both are positive in the same unlocked tick.

use bevy::prelude::*;

use crate::config::LocomotionConfig;

/// Pending jump bookkeeping.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct JumpRequest {
    buffer: f32,
    coyote: f32,
}

impl JumpRequest {
    /// Remaining buffer time of the latest press.
    #[inline]
    pub fn buffer(&self) -> f32 {
        self.buffer
    }

    /// Remaining coyote grace.
    #[inline]
    pub fn coyote(&self) -> f32 {
        self.coyote
    }

    /// Whether a press is still waiting to be consumed.
    #[inline]
    pub fn is_buffered(&self) -> bool {
        self.buffer > 0.0
    }

    /// Advance one tick and report whether a jump fires.
    ///
    /// While `locked`, a press arms the longer locked buffer, and the buffer
    /// neither decays nor gets consumed, so it survives the whole lock.
    pub fn update(
        &mut self,
        pressed: bool,
        grounded: bool,
        locked: bool,
        dt: f32,
        config: &LocomotionConfig,
    ) -> bool {
        if pressed {
            self.buffer = if locked {
                config.locked_jump_buffer_time
            } else {
                config.jump_buffer_time
            };
        }

        if grounded {
            self.coyote = config.coyote_time;
        } else {
            self.coyote = (self.coyote - dt).max(0.0);
        }

        if locked {
            return false;
        }

        if self.buffer > 0.0 && self.coyote > 0.0 {
            self.buffer = 0.0;
            self.coyote = 0.0;
            return true;
        }

        self.buffer = (self.buffer - dt).max(0.0);
        false
    }
}
