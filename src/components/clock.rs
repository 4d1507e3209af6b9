//! Free-running clock source.
//!
//! The clock alternates between a low and a high phase whose lengths come
//! from the frequency and the duty cycle (fraction of the period spent high).

use super::{Component, ComponentConfig, PinLayout, PinSpec};
use crate::engine::{ComputeContext, TIME_EPSILON, TIME_UNITS_PER_SECOND};
use crate::value::Signal;

/// Periodic square-wave source.
#[derive(Debug, Clone)]
pub struct Clock {
    /// Toggle rate in Hz
    frequency: f64,
    /// Fraction of each period spent high
    duty: f64,
    /// Current output level
    level: bool,
    /// Time units until the next toggle
    remaining: f64,
}

impl Clock {
    pub const DEFAULT_FREQUENCY: f64 = 10.0;

    /// Create a clock that starts low at the beginning of its low phase.
    pub fn new(frequency: f64, duty: f64) -> Self {
        let mut clock = Self {
            frequency,
            duty: duty.clamp(0.01, 0.99),
            level: false,
            remaining: 0.0,
        };
        clock.remaining = clock.phase_length(false);
        clock
    }

    /// Period in time units.
    pub fn period(&self) -> f64 {
        TIME_UNITS_PER_SECOND / self.frequency
    }

    /// Length of the shorter of the two phases.
    pub fn shortest_phase(&self) -> f64 {
        self.phase_length(true).min(self.phase_length(false))
    }

    fn phase_length(&self, high: bool) -> f64 {
        if high {
            self.period() * self.duty
        } else {
            self.period() * (1.0 - self.duty)
        }
    }

    pub fn level(&self) -> bool {
        self.level
    }

    /// Restart at the beginning of the low phase.
    pub fn reset(&mut self) {
        self.level = false;
        self.remaining = self.phase_length(false);
    }
}

impl Component for Clock {
    fn kind(&self) -> &'static str {
        "CLOCK"
    }

    fn layout(&self) -> PinLayout {
        PinLayout::new(vec![], vec![PinSpec::scalar("out")])
    }

    fn compute(&mut self, _inputs: &[Signal], outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {
        outputs[0] = Signal::from(self.level);
    }

    fn advance(&mut self, dt: f64) -> bool {
        self.remaining -= dt;
        // Whole periods leave the level where it was.
        let period = self.period();
        if -self.remaining > period {
            self.remaining += period * (-self.remaining / period).floor();
        }
        let mut toggled = false;
        while self.remaining <= TIME_EPSILON {
            self.level = !self.level;
            self.remaining += self.phase_length(self.level);
            toggled = true;
        }
        toggled
    }

    fn time_to_next_event(&self) -> Option<f64> {
        Some(self.remaining.max(0.0))
    }

    fn config(&self) -> ComponentConfig {
        ComponentConfig::new()
            .with("freq", self.frequency)
            .with("duty", self.duty)
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clock_phases_follow_duty_cycle() {
        // 100 Hz -> 10 time units per period, high for 2.5
        let mut clock = Clock::new(100.0, 0.25);
        assert_relative_eq!(clock.period(), 10.0);
        assert_relative_eq!(clock.time_to_next_event().unwrap(), 7.5);

        assert!(!clock.advance(7.0));
        assert!(!clock.level());
        assert!(clock.advance(0.5));
        assert!(clock.level());
        assert_relative_eq!(clock.time_to_next_event().unwrap(), 2.5);

        assert!(clock.advance(2.5));
        assert!(!clock.level());
        assert_relative_eq!(clock.time_to_next_event().unwrap(), 7.5);
    }

    #[test]
    fn test_clock_rearms_after_each_toggle() {
        let mut clock = Clock::new(1000.0, 0.5);
        let mut toggles = 0;
        for _ in 0..10 {
            let step = clock.time_to_next_event().unwrap();
            if clock.advance(step) {
                toggles += 1;
            }
        }
        assert_eq!(toggles, 10);
        assert!(!clock.level());
    }

    #[test]
    fn test_long_step_skips_whole_periods() {
        let mut clock = Clock::new(1000.0, 0.5);
        assert!(clock.advance(1000.25));
        assert!(!clock.level());
        assert_relative_eq!(clock.time_to_next_event().unwrap(), 0.25, epsilon = 1e-9);

        assert!(clock.advance(0.5));
        assert!(clock.level());
        assert_relative_eq!(clock.time_to_next_event().unwrap(), 0.25, epsilon = 1e-9);
    }

    #[test]
    fn test_reset() {
        let mut clock = Clock::new(100.0, 0.5);
        clock.advance(5.0);
        assert!(clock.level());
        clock.reset();
        assert!(!clock.level());
        assert_relative_eq!(clock.time_to_next_event().unwrap(), 5.0);
    }
}
