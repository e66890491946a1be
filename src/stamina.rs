//! Stamina pool gating sprint and roll.

use bevy::prelude::*;

use crate::config::StaminaConfig;

/// Resource pool drained by sprinting and spent by rolling.
///
/// `current` always stays within `[0, max]`. Regeneration is suppressed while
/// `exhausted_timer` is positive; the timer is re-armed whenever the pool
/// hits zero and on every successful spend.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct StaminaPool {
    current: f32,
    max: f32,
    exhausted_timer: f32,
}

impl Default for StaminaPool {
    fn default() -> Self {
        Self::full(&StaminaConfig::default())
    }
}

impl StaminaPool {
    /// A full pool sized from config.
    pub fn full(config: &StaminaConfig) -> Self {
        let max = config.max.max(0.0);
        Self {
            current: max,
            max,
            exhausted_timer: 0.0,
        }
    }

    /// Current stamina.
    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Pool capacity.
    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Remaining regen suppression (seconds).
    #[inline]
    pub fn exhausted_timer(&self) -> f32 {
        self.exhausted_timer
    }

    /// Current stamina as a fraction of max.
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    /// Whether there is enough left to start or keep sprinting.
    #[inline]
    pub fn can_sprint(&self, config: &StaminaConfig) -> bool {
        self.current > config.sprint_threshold
    }

    /// Advance one tick: count down the exhaustion delay, then drain while
    /// sprinting or regenerate once the delay had already elapsed.
    ///
    /// The delay runs on every tick, sprinting or not.
    ///
    /// Returns `true` on the tick the pool runs dry.
    pub fn update(&mut self, sprinting: bool, dt: f32, config: &StaminaConfig) -> bool {
        self.max = config.max.max(0.0);
        let delayed = self.exhausted_timer > 0.0;
        self.exhausted_timer = (self.exhausted_timer - dt).max(0.0);
        let mut ran_dry = false;

        if sprinting {
            let before = self.current;
            self.set_current(self.current - config.drain_rate * dt);
            if before > 0.0 && self.current <= 0.0 {
                self.exhausted_timer = config.exhaustion_delay;
                ran_dry = true;
            }
        } else if !delayed {
            self.set_current(self.current + config.regen_rate * dt);
        }

        ran_dry
    }

    /// Spend a fixed cost atomically.
    ///
    /// Fails without any effect when less than `cost` is available. A
    /// successful spend re-arms the exhaustion delay.
    pub fn try_spend(&mut self, cost: f32, config: &StaminaConfig) -> bool {
        if !cost.is_finite() || cost < 0.0 || self.current < cost {
            return false;
        }
        self.set_current(self.current - cost);
        self.exhausted_timer = config.exhaustion_delay;
        true
    }

    fn set_current(&mut self, value: f32) {
        self.current = if value.is_finite() {
            value.clamp(0.0, self.max)
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StaminaConfig {
        StaminaConfig::default()
    }

    #[test]
    fn starts_full() {
        let pool = StaminaPool::full(&config());
        assert_eq!(pool.current(), 100.0);
        assert_eq!(pool.max(), 100.0);
        assert_eq!(pool.fraction(), 1.0);
    }

    #[test]
    fn sprinting_one_second_drains_to_75() {
        let config = config();
        let mut pool = StaminaPool::full(&config);
        for _ in 0..60 {
            pool.update(true, 1.0 / 60.0, &config);
        }
        assert!((pool.current() - 75.0).abs() < 0.01);
    }

    #[test]
    fn regen_never_exceeds_max() {
        let config = config();
        let mut pool = StaminaPool::full(&config);
        pool.update(false, 10.0, &config);
        assert_eq!(pool.current(), 100.0);
    }

    #[test]
    fn drain_never_goes_negative() {
        let config = config();
        let mut pool = StaminaPool::full(&config);
        let ran_dry = pool.update(true, 10.0, &config);
        assert!(ran_dry);
        assert_eq!(pool.current(), 0.0);
        assert_eq!(pool.exhausted_timer(), config.exhaustion_delay);
    }

    #[test]
    fn exhaustion_delay_suppresses_regen() {
        let config = config();
        let mut pool = StaminaPool::full(&config);
        pool.update(true, 10.0, &config);

        // Within the delay, nothing comes back.
        pool.update(false, 0.5, &config);
        assert_eq!(pool.current(), 0.0);

        // Delay elapses, then regen resumes.
        pool.update(false, 0.15, &config);
        assert_eq!(pool.exhausted_timer(), 0.0);
        assert_eq!(pool.current(), 0.0);
        pool.update(false, 1.0, &config);
        assert!((pool.current() - 18.0).abs() < 0.001);
    }

    #[test]
    fn roll_costs_exactly_four_times_from_full() {
        let config = config();
        let mut pool = StaminaPool::full(&config);

        assert!(pool.try_spend(25.0, &config));
        assert!(pool.try_spend(25.0, &config));
        assert!(pool.try_spend(25.0, &config));
        assert_eq!(pool.current(), 25.0);

        // Exactly enough still succeeds.
        assert!(pool.try_spend(25.0, &config));
        assert_eq!(pool.current(), 0.0);

        let before = pool;
        assert!(!pool.try_spend(25.0, &config));
        assert_eq!(pool, before);
    }

    #[test]
    fn failed_spend_has_no_effect() {
        let config = config();
        let mut pool = StaminaPool::full(&config);
        pool.update(true, 3.5, &config); // 12.5 left
        let before = pool;
        assert!(!pool.try_spend(25.0, &config));
        assert_eq!(pool, before);
    }

    #[test]
    fn spend_rearms_exhaustion_delay() {
        let config = config();
        let mut pool = StaminaPool::full(&config);
        assert!(pool.try_spend(10.0, &config));
        assert_eq!(pool.exhausted_timer(), config.exhaustion_delay);

        pool.update(false, 0.3, &config);
        assert_eq!(pool.current(), 90.0);
    }

    #[test]
    fn sprint_threshold() {
        let config = config();
        let mut pool = StaminaPool::full(&config);
        assert!(pool.can_sprint(&config));
        pool.update(true, 3.999, &config);
        assert!(pool.current() <= 0.1);
        assert!(!pool.can_sprint(&config));
    }

    #[test]
    fn exhaustion_delay_runs_down_while_sprinting() {
        let config = config();
        let mut pool = StaminaPool::full(&config);
        assert!(pool.try_spend(25.0, &config));

        // Sprinting through the whole delay still uses it up.
        pool.update(true, 0.5, &config);
        pool.update(true, 0.25, &config);
        assert_eq!(pool.exhausted_timer(), 0.0);
        let after_sprint = pool.current();

        pool.update(false, 0.5, &config);
        assert!((pool.current() - (after_sprint + 9.0)).abs() < 0.001);
    }
}
