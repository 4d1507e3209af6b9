//! Round-robin propagation to a fixed point.

use tracing::{debug, warn};

use super::{ComputeContext, SimulatorConfig};
use crate::circuit::{Circuit, CircuitLibrary, ComponentId};
use crate::components::refresh_references;
use crate::error::SimFault;

/// Lifecycle of a propagation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassPhase {
    /// Structure or inputs changed since the last pass
    #[default]
    Pending,
    /// Rounds are running
    Settling,
    /// A round produced no output change
    Settled,
    /// The round ceiling was hit; values are frozen
    Stalled,
}

/// Outcome of running rounds on one circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassStatus {
    pub phase: PassPhase,
    pub rounds: usize,
}

/// Outcome of a full pass, including faults from nested circuits.
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    pub phase: PassPhase,
    pub rounds: usize,
    pub faults: Vec<SimFault>,
}

impl PassReport {
    pub fn is_settled(&self) -> bool {
        self.phase == PassPhase::Settled
    }
}

/// Evaluate every component round after round until nothing changes or the
/// ceiling in `ctx` is reached. Does not run `settle` hooks.
pub fn run_rounds(circuit: &mut Circuit, ctx: &mut ComputeContext<'_>) -> PassStatus {
    let ids: Vec<ComponentId> = circuit.component_ids().collect();
    let max_rounds = ctx.config().max_rounds;
    let mut rounds = 0;
    loop {
        if rounds >= max_rounds {
            warn!(circuit = circuit.name(), rounds, "propagation stalled");
            ctx.report(SimFault::Stall { rounds });
            return PassStatus {
                phase: PassPhase::Stalled,
                rounds,
            };
        }
        rounds += 1;

        let mut changed = false;
        for id in &ids {
            changed |= circuit.evaluate(*id, ctx);
        }
        if !changed {
            return PassStatus {
                phase: PassPhase::Settled,
                rounds,
            };
        }
    }
}

/// Run one full pass: resolve references, run rounds, then settle.
///
/// `library` is only needed when the circuit contains references.
pub fn propagate(circuit: &mut Circuit, library: Option<&CircuitLibrary>, config: &SimulatorConfig) -> PassReport {
    let mut faults = Vec::new();
    let mut ctx = ComputeContext::new(config, &mut faults);
    if let Some(library) = library {
        refresh_references(circuit, library, &mut ctx);
    }
    let status = run_rounds(circuit, &mut ctx);
    circuit.settle_all();
    debug!(
        circuit = circuit.name(),
        rounds = status.rounds,
        phase = ?status.phase,
        faults = faults.len(),
        "propagation pass"
    );
    PassReport {
        phase: status.phase,
        rounds: status.rounds,
        faults,
    }
}

/// Move every component's timers forward. Returns whether any changed.
pub fn advance_components(circuit: &mut Circuit, dt: f64) -> bool {
    let ids: Vec<ComponentId> = circuit.component_ids().collect();
    let mut changed = false;
    for id in ids {
        if let Some(component) = circuit.component_mut(id) {
            changed |= component.advance(dt);
        }
    }
    changed
}

/// Earliest timer expiry of any component, relative to now.
pub fn next_event_time(circuit: &Circuit) -> Option<f64> {
    circuit
        .component_ids()
        .filter_map(|id| circuit.component(id)?.time_to_next_event())
        .min_by(f64::total_cmp)
}
