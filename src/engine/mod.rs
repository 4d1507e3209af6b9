//! Propagation and timing engine.
//!
//! This module drives a circuit through simulated time.
//!
//! ## Propagation passes
//!
//! A pass evaluates every component once per round, in arena order, writing
//! outputs as it goes so later components in the same round already see
//! them. Rounds repeat until one produces no output change (the pass has
//! *settled*) or the round ceiling is hit (the pass has *stalled*; values
//! are frozen and a [`SimFault::Stall`] is reported). Feedback loops need
//! no special handling: they either reach a fixed point or stall.
//!
//! ```text
//! Pending -> Settling -> Settled
//!                     -> Stalled
//! ```
//!
//! After the rounds every component's `settle` hook runs once, which is
//! where edge-triggered parts commit.
//!
//! ## Time
//!
//! Time is measured in milliseconds. [`Simulator::advance`] splits each
//! interval at every component timer expiry and queued event so no clock
//! edge is skipped, running a pass after each one.

mod propagate;
mod scheduler;
mod simulator;

pub use propagate::{advance_components, next_event_time, propagate, run_rounds, PassPhase, PassReport, PassStatus};
pub use scheduler::{EventQueue, ScheduledEvent};
pub use simulator::{AdvanceReport, SetOutcome, Simulator};

use crate::error::SimFault;

/// Default round ceiling for one propagation pass.
pub const DEFAULT_MAX_ROUNDS: usize = 1000;

/// Default ceiling on sub-steps within one `advance` call.
pub const DEFAULT_MAX_STEPS: usize = 100_000;

/// Tolerance when comparing simulated times.
pub const TIME_EPSILON: f64 = 1e-9;

/// Simulated time units per second (time is in milliseconds).
pub const TIME_UNITS_PER_SECOND: f64 = 1000.0;

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Rounds before a pass is declared stalled.
    pub max_rounds: usize,
    /// Sub-steps before an `advance` call gives up on the rest of its
    /// interval.
    pub max_steps: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the round ceiling.
    ///
    /// A lower ceiling reports oscillating circuits sooner; a circuit with a
    /// long combinational chain needs at least as many rounds as the chain
    /// has stages wired against arena order.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Set the sub-step ceiling for `advance`.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

/// Shared state handed to every `compute` call.
#[derive(Debug)]
pub struct ComputeContext<'a> {
    config: &'a SimulatorConfig,
    faults: &'a mut Vec<SimFault>,
}

impl<'a> ComputeContext<'a> {
    pub fn new(config: &'a SimulatorConfig, faults: &'a mut Vec<SimFault>) -> Self {
        Self { config, faults }
    }

    pub fn config(&self) -> &SimulatorConfig {
        self.config
    }

    /// Record a fault. A fault already reported in this pass is not
    /// repeated.
    pub fn report(&mut self, fault: SimFault) {
        if !self.faults.contains(&fault) {
            self.faults.push(fault);
        }
    }
}
