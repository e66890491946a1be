//! Dodge roll state machine.
//!
//! `Ready` → (trigger) → `Rolling` → `Recovering` → `Ready`. Rolling and
//! recovering together form the input lock. A cooldown is armed when the
//! roll itself ends and runs independently of recovery.

use bevy::prelude::*;

use crate::config::RollConfig;

/// Phase of the dodge roll.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub enum RollPhase {
    /// No roll in progress.
    #[default]
    Ready,
    /// Rolling along a direction fixed at trigger time.
    Rolling {
        /// Unit roll direction.
        direction: Vec3,
        /// Seconds of roll left.
        remaining: f32,
    },
    /// Post-roll lock.
    Recovering {
        /// Seconds of recovery left.
        remaining: f32,
    },
}

/// Emitted on the tick a roll runs out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollExpired {
    /// Direction the roll travelled in.
    pub direction: Vec3,
}

/// Why a roll trigger was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollRejection {
    /// Already rolling or recovering.
    Locked,
    /// Cooldown from the previous roll still running.
    Cooldown,
    /// Not on the ground.
    Airborne,
    /// On ground too steep to walk on.
    NotWalkable,
    /// Not enough stamina for the cost.
    Stamina,
}

/// Roll session plus cooldown.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct RollSession {
    phase: RollPhase,
    cooldown: f32,
}

impl RollSession {
    /// Current phase.
    #[inline]
    pub fn phase(&self) -> RollPhase {
        self.phase
    }

    /// Whether the roll itself is in progress.
    #[inline]
    pub fn is_rolling(&self) -> bool {
        matches!(self.phase, RollPhase::Rolling { .. })
    }

    /// Whether in post-roll recovery.
    #[inline]
    pub fn is_recovering(&self) -> bool {
        matches!(self.phase, RollPhase::Recovering { .. })
    }

    /// Whether normal input is suspended (rolling or recovering).
    #[inline]
    pub fn is_locked(&self) -> bool {
        !matches!(self.phase, RollPhase::Ready)
    }

    /// Roll direction while rolling.
    pub fn direction(&self) -> Option<Vec3> {
        match self.phase {
            RollPhase::Rolling { direction, .. } => Some(direction),
            _ => None,
        }
    }

    /// Seconds of roll left (zero when not rolling).
    pub fn roll_timer(&self) -> f32 {
        match self.phase {
            RollPhase::Rolling { remaining, .. } => remaining,
            _ => 0.0,
        }
    }

    /// Seconds of recovery left (zero when not recovering).
    pub fn recovery_timer(&self) -> f32 {
        match self.phase {
            RollPhase::Recovering { remaining } => remaining,
            _ => 0.0,
        }
    }

    /// Seconds until another roll may start.
    #[inline]
    pub fn cooldown_timer(&self) -> f32 {
        self.cooldown
    }

    /// Gate checks that do not touch stamina.
    pub fn check_ready(&self, grounded: bool, walkable: bool) -> Result<(), RollRejection> {
        if self.is_locked() {
            return Err(RollRejection::Locked);
        }
        if self.cooldown > 0.0 {
            return Err(RollRejection::Cooldown);
        }
        if !grounded {
            return Err(RollRejection::Airborne);
        }
        if !walkable {
            return Err(RollRejection::NotWalkable);
        }
        Ok(())
    }

    /// Enter the rolling phase. Callers check gating first.
    pub fn start(&mut self, direction: Vec3, config: &RollConfig) {
        self.phase = RollPhase::Rolling {
            direction,
            remaining: config.duration.max(0.0),
        };
    }

    /// Advance timers by `dt`.
    ///
    /// Returns the finished roll on the tick the roll timer runs out; that
    /// same tick recovery begins and the cooldown is armed.
    pub fn advance(&mut self, dt: f32, config: &RollConfig) -> Option<RollExpired> {
        self.cooldown = (self.cooldown - dt).max(0.0);

        match self.phase {
            RollPhase::Ready => None,
            RollPhase::Rolling {
                direction,
                remaining,
            } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = RollPhase::Rolling {
                        direction,
                        remaining,
                    };
                    return None;
                }
                self.cooldown = config.cooldown.max(0.0);
                self.phase = if config.recovery > 0.0 {
                    RollPhase::Recovering {
                        remaining: config.recovery,
                    }
                } else {
                    RollPhase::Ready
                };
                Some(RollExpired { direction })
            }
            RollPhase::Recovering { remaining } => {
                let remaining = remaining - dt;
                self.phase = if remaining > 0.0 {
                    RollPhase::Recovering { remaining }
                } else {
                    RollPhase::Ready
                };
                None
            }
        }
    }
}
