//! Main simulator interface.

use tracing::{debug, warn};

use super::propagate::{advance_components, next_event_time, propagate, PassPhase, PassReport};
use super::scheduler::EventQueue;
use super::{SimulatorConfig, TIME_EPSILON};
use crate::circuit::{Circuit, CircuitLibrary, ComponentId, Design, PinId};
use crate::components::{Component, Injection};
use crate::error::{LogicError, Result, SimFault};
use crate::value::Signal;

/// What happened to a value passed to [`Simulator::set`].
#[derive(Debug, Clone, PartialEq)]
pub enum SetOutcome {
    /// Applied at once; the pass that followed.
    Applied(PassReport),
    /// Queued; it will apply at this absolute time.
    Scheduled { at: f64 },
}

/// Summary of one [`Simulator::advance`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvanceReport {
    /// Sub-steps the interval was split into
    pub steps: usize,
    /// Propagation passes run
    pub passes: usize,
    /// Queued events delivered
    pub events: usize,
    /// Faults from every pass, without repeats
    pub faults: Vec<SimFault>,
    /// Phase of the last pass, if any ran
    pub phase: Option<PassPhase>,
    /// The step ceiling cut the interval short
    pub truncated: bool,
}

impl AdvanceReport {
    fn absorb(&mut self, pass: PassReport) {
        self.passes += 1;
        self.phase = Some(pass.phase);
        for fault in pass.faults {
            if !self.faults.contains(&fault) {
                self.faults.push(fault);
            }
        }
    }
}

/// The logic simulator.
///
/// Owns the circuit library, a running copy of the top circuit, and the
/// event queue. Every mutation runs to completion before the next.
#[derive(Debug)]
pub struct Simulator {
    library: CircuitLibrary,
    circuit: Circuit,
    config: SimulatorConfig,
    queue: EventQueue<Signal>,
    now: f64,
    phase: PassPhase,
}

impl Simulator {
    /// Simulate the circuit named `top` with default configuration.
    pub fn new(library: CircuitLibrary, top: &str) -> Result<Self> {
        Self::with_config(library, top, SimulatorConfig::default())
    }

    /// Simulate the circuit named `top` with custom configuration.
    pub fn with_config(library: CircuitLibrary, top: &str, config: SimulatorConfig) -> Result<Self> {
        if config.max_rounds == 0 {
            return Err(LogicError::InvalidSimulationParam {
                message: "max_rounds must be at least 1".to_string(),
            });
        }
        let circuit = library
            .get(top)
            .cloned()
            .ok_or_else(|| LogicError::UnknownCircuit { name: top.to_string() })?;
        Ok(Self {
            library,
            circuit,
            config,
            queue: EventQueue::new(),
            now: 0.0,
            phase: PassPhase::Pending,
        })
    }

    /// Simulate a standalone circuit with an empty library.
    pub fn from_circuit(circuit: Circuit) -> Self {
        Self {
            library: CircuitLibrary::new(),
            circuit,
            config: SimulatorConfig::default(),
            queue: EventQueue::new(),
            now: 0.0,
            phase: PassPhase::Pending,
        }
    }

    pub fn from_design(design: &Design) -> Result<Self> {
        Self::new(design.library.clone(), &design.top)
    }

    /// Parse, build, and load a netlist.
    pub fn from_netlist(source: &str) -> Result<Self> {
        let design = Design::from_netlist(source)?;
        Self::new(design.library, &design.top)
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Current simulated time.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn phase(&self) -> PassPhase {
        self.phase
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Structural access to the running circuit. The next `advance` starts
    /// with a fresh pass.
    pub fn circuit_mut(&mut self) -> &mut Circuit {
        self.phase = PassPhase::Pending;
        &mut self.circuit
    }

    pub fn library(&self) -> &CircuitLibrary {
        &self.library
    }

    /// Access to the definitions. Edits made through
    /// [`CircuitLibrary::edit`] rebind references on the next pass.
    pub fn library_mut(&mut self) -> &mut CircuitLibrary {
        self.phase = PassPhase::Pending;
        &mut self.library
    }

    /// Number of queued events.
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Run one propagation pass.
    pub fn propagate(&mut self) -> PassReport {
        self.phase = PassPhase::Settling;
        let report = propagate(&mut self.circuit, Some(&self.library), &self.config);
        self.phase = report.phase;
        report
    }

    pub fn find(&self, label: &str) -> Option<ComponentId> {
        self.circuit.find(label)
    }

    fn label_of(&self, id: ComponentId) -> String {
        self.circuit.label(id).map_or_else(|| id.to_string(), str::to_string)
    }

    /// Inject a value into a source component.
    ///
    /// The component decides whether the value applies now (followed by a
    /// pass) or goes through the event queue.
    pub fn set(&mut self, id: ComponentId, value: Signal) -> Result<SetOutcome> {
        let component = self
            .circuit
            .component(id)
            .ok_or_else(|| LogicError::UnknownComponent { name: id.to_string() })?;
        match component.injection(&value) {
            Injection::Rejected(message) => Err(LogicError::InvalidInjection {
                component: self.label_of(id),
                message,
            }),
            Injection::Delayed(delay) => {
                let at = self.now + delay;
                debug!(component = self.label_of(id).as_str(), at, "scheduled injection");
                self.queue.schedule(id, at, value);
                Ok(SetOutcome::Scheduled { at })
            }
            Injection::Immediate => {
                // An immediate value supersedes anything still queued for
                // the component, such as a pending button release.
                let purged = self.queue.purge(id);
                if purged > 0 {
                    debug!(component = self.label_of(id).as_str(), purged, "superseded queued injections");
                }
                if let Some(part) = self.circuit.component_mut(id) {
                    part.inject(&value);
                }
                Ok(SetOutcome::Applied(self.propagate()))
            }
        }
    }

    pub fn set_by_label(&mut self, label: &str, value: Signal) -> Result<SetOutcome> {
        let id = self
            .find(label)
            .ok_or_else(|| LogicError::UnknownComponent { name: label.to_string() })?;
        self.set(id, value)
    }

    /// Current value on a pin.
    pub fn get(&self, pin: PinId) -> Option<Signal> {
        self.circuit.pin_value(pin)
    }

    /// Read a named net, or the first output (else first input) of a
    /// component with that label.
    pub fn probe(&self, name: &str) -> Result<Signal> {
        let pin = self.circuit.net(name).or_else(|| {
            let id = self.circuit.find(name)?;
            self.circuit.output_pin(id, 0).or_else(|| self.circuit.input_pin(id, 0))
        });
        pin.and_then(|pin| self.circuit.pin_value(pin))
            .ok_or_else(|| LogicError::UnknownNet { net: name.to_string() })
    }

    /// Remove a component along with its wiring and pending events.
    pub fn remove_component(&mut self, id: ComponentId) -> Option<Box<dyn Component>> {
        let purged = self.queue.purge(id);
        if purged > 0 {
            debug!(component = %id, purged, "dropped pending events");
        }
        self.phase = PassPhase::Pending;
        self.circuit.remove_component(id)
    }

    /// Move simulated time forward by `dt`.
    ///
    /// The interval is split at each component timer expiry and each queued
    /// event; after every split point where something fired, a pass runs.
    pub fn advance(&mut self, dt: f64) -> Result<AdvanceReport> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(LogicError::InvalidSimulationParam {
                message: format!("time step must be a non-negative number, got {}", dt),
            });
        }

        let end = self.now + dt;
        let mut report = AdvanceReport::default();
        if self.phase == PassPhase::Pending {
            report.absorb(self.propagate());
        }

        loop {
            let timer = next_event_time(&self.circuit).map(|t| self.now + t);
            let queued = self.queue.peek_time();
            let next = match (timer, queued) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
            let Some(next) = next.filter(|t| *t <= end + TIME_EPSILON) else {
                break;
            };
            if report.steps >= self.config.max_steps {
                warn!(steps = report.steps, now = self.now, "advance hit the step ceiling");
                report.truncated = true;
                break;
            }
            report.steps += 1;

            let mut dirty = advance_components(&mut self.circuit, (next - self.now).max(0.0));
            self.now = next.max(self.now);
            for event in self.queue.pop_due(self.now + TIME_EPSILON) {
                if let Some(part) = self.circuit.component_mut(event.target) {
                    part.inject(&event.payload);
                    report.events += 1;
                    dirty = true;
                }
            }
            if dirty {
                report.absorb(self.propagate());
            }
        }

        let rest = end - self.now;
        if rest > 0.0 {
            if advance_components(&mut self.circuit, rest) {
                report.absorb(self.propagate());
            }
            self.now = end;
        }
        Ok(report)
    }
}
