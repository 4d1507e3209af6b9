//! Sub-circuit references.
//!
//! A [`CircuitRef`] names another circuit in the library. It resolves lazily:
//! the first pass that sees it clones the target definition into a private
//! [`Instance`], so two references to the same circuit never share state.
//! Its pins mirror the target's boundary ports and are matched to them by
//! the inner port's component id, which lets a reference keep its outer
//! wiring when the target is edited.

use tracing::debug;

use super::{Component, ComponentConfig, PinLayout, PinSpec};
use crate::circuit::{Boundary, BoundaryPin, Circuit, CircuitLibrary, ComponentId, RebindSummary};
use crate::engine::{advance_components, next_event_time, run_rounds, ComputeContext};
use crate::error::{LogicError, Result, SimFault};
use crate::value::Signal;

/// A resolved private copy of a referenced circuit.
#[derive(Debug, Clone)]
pub struct Instance {
    circuit: Circuit,
    /// Inner `IN` ports, in outer input pin order
    inputs: Vec<ComponentId>,
    /// Inner `OUT` ports, in outer output pin order
    outputs: Vec<ComponentId>,
    /// Library revision the copy was taken from
    revision: u64,
}

impl Instance {
    fn new(circuit: Circuit, boundary: &Boundary, revision: u64) -> Self {
        Self {
            circuit,
            inputs: boundary.inputs.iter().map(|p| p.id).collect(),
            outputs: boundary.outputs.iter().map(|p| p.id).collect(),
            revision,
        }
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn circuit_mut(&mut self) -> &mut Circuit {
        &mut self.circuit
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Value arriving at an inner `OUT` port.
    fn port_value(&self, port: ComponentId, spec: &PinSpec) -> Signal {
        let value = self
            .circuit
            .input_pin(port, 0)
            .and_then(|pin| self.circuit.pin_value(pin))
            .unwrap_or_else(|| spec.kind.unknown());
        if spec.kind.is_bus() {
            Signal::Bus(value.bus(spec.kind.width()))
        } else {
            Signal::Scalar(value.scalar())
        }
    }
}

/// Reference to a named circuit, instanced on demand.
///
/// While the target is missing (or part of a reference cycle) the reference
/// keeps the boundary pins and outer wiring it last had and drives unknown on
/// every output. It does not drop to an empty pin list, so the outer wiring
/// is restored as-is once the target exists again.
#[derive(Debug)]
pub struct CircuitRef {
    target: String,
    inputs: Vec<PinSpec>,
    outputs: Vec<PinSpec>,
    instance: Option<Box<Instance>>,
}

impl CircuitRef {
    /// Create an unbound reference. It has no pins until bound to the
    /// target's boundary.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            instance: None,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Point at another circuit. The instance is dropped and pins rebind on
    /// the next pass.
    pub fn set_target(&mut self, target: impl Into<String>) {
        self.target = target.into();
        self.instance = None;
    }

    pub fn instance(&self) -> Option<&Instance> {
        self.instance.as_deref()
    }

    pub fn instance_mut(&mut self) -> Option<&mut Instance> {
        self.instance.as_deref_mut()
    }

    pub fn is_resolved(&self) -> bool {
        self.instance.is_some()
    }
}

impl Component for CircuitRef {
    fn kind(&self) -> &'static str {
        "REF"
    }

    fn layout(&self) -> PinLayout {
        PinLayout::new(self.inputs.clone(), self.outputs.clone())
    }

    fn compute(&mut self, inputs: &[Signal], outputs: &mut [Signal], ctx: &mut ComputeContext<'_>) {
        let Some(instance) = self.instance.as_deref_mut() else {
            for (out, spec) in outputs.iter_mut().zip(&self.outputs) {
                *out = spec.kind.unknown();
            }
            return;
        };

        for (value, port) in inputs.iter().zip(&instance.inputs) {
            if let Some(part) = instance.circuit.component_mut(*port) {
                part.inject(value);
            }
        }
        run_rounds(&mut instance.circuit, ctx);
        for ((out, port), spec) in outputs.iter_mut().zip(&instance.outputs).zip(&self.outputs) {
            *out = instance.port_value(*port, spec);
        }
    }

    fn settle(&mut self, _inputs: &[Signal]) {
        if let Some(instance) = self.instance.as_deref_mut() {
            instance.circuit.settle_all();
        }
    }

    fn advance(&mut self, dt: f64) -> bool {
        match self.instance.as_deref_mut() {
            Some(instance) => advance_components(&mut instance.circuit, dt),
            None => false,
        }
    }

    fn time_to_next_event(&self) -> Option<f64> {
        self.instance.as_deref().and_then(|instance| next_event_time(&instance.circuit))
    }

    fn config(&self) -> ComponentConfig {
        ComponentConfig::new().with("target", &self.target)
    }

    fn as_circuit_ref(&self) -> Option<&CircuitRef> {
        Some(self)
    }

    fn as_circuit_ref_mut(&mut self) -> Option<&mut CircuitRef> {
        Some(self)
    }

    /// Copies share the target and pins but never the instance.
    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(CircuitRef {
            target: self.target.clone(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            instance: None,
        })
    }
}

/// Shape a reference's pins after `boundary`, keeping wiring where the
/// inner port survived.
pub(crate) fn bind_reference(circuit: &mut Circuit, id: ComponentId, boundary: &Boundary) -> Result<RebindSummary> {
    let reference = circuit
        .component_mut(id)
        .and_then(|c| c.as_circuit_ref_mut())
        .ok_or_else(|| LogicError::UnknownComponent { name: id.to_string() })?;
    reference.inputs = boundary.inputs.iter().map(BoundaryPin::spec).collect();
    reference.outputs = boundary.outputs.iter().map(BoundaryPin::spec).collect();
    circuit.rebind_pins(id, boundary)
}

/// Resolve every reference in `circuit`, recursively.
///
/// Unresolved references are instanced, references whose target changed
/// revision are rebound and re-instanced, and references whose target is
/// missing or cyclic drop their instance and report a fault.
pub(crate) fn refresh_references(circuit: &mut Circuit, library: &CircuitLibrary, ctx: &mut ComputeContext<'_>) {
    let references: Vec<ComponentId> = circuit
        .component_ids()
        .filter(|id| circuit.component(*id).and_then(|c| c.as_circuit_ref()).is_some())
        .collect();

    for id in references {
        let label = circuit.label(id).unwrap_or_default().to_string();
        let Some((target, bound)) = circuit
            .component(id)
            .and_then(|c| c.as_circuit_ref())
            .map(|r| (r.target.clone(), r.instance().map(Instance::revision)))
        else {
            continue;
        };

        let fault = match (library.get(&target), library.revision(&target)) {
            (Some(_), Some(_)) => library
                .reference_cycle(&target)
                .map(|cycle| SimFault::CyclicReference {
                    component: label.clone(),
                    cycle,
                }),
            _ => Some(SimFault::UnboundReference {
                component: label.clone(),
                target: target.clone(),
            }),
        };
        if let Some(fault) = fault {
            if let Some(reference) = circuit.component_mut(id).and_then(|c| c.as_circuit_ref_mut()) {
                reference.instance = None;
            }
            ctx.report(fault);
            continue;
        }

        let (Some(definition), Some(revision)) = (library.get(&target), library.revision(&target)) else {
            continue;
        };
        if bound != Some(revision) {
            let boundary = definition.boundary();
            match bind_reference(circuit, id, &boundary) {
                Ok(summary) => debug!(
                    reference = label.as_str(),
                    target = target.as_str(),
                    kept = summary.kept,
                    added = summary.added,
                    removed = summary.removed,
                    retyped = summary.retyped,
                    "bound reference"
                ),
                Err(_) => continue,
            }
            let instance = Instance::new(definition.clone(), &boundary, revision);
            if let Some(reference) = circuit.component_mut(id).and_then(|c| c.as_circuit_ref_mut()) {
                reference.instance = Some(Box::new(instance));
            }
        }

        if let Some(instance) = circuit
            .component_mut(id)
            .and_then(|c| c.as_circuit_ref_mut())
            .and_then(|r| r.instance_mut())
        {
            refresh_references(&mut instance.circuit, library, ctx);
        }
    }
}
