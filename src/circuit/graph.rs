//! Circuit graph structure.
//!
//! Components and pins live in arenas indexed by [`ComponentId`] and
//! [`PinId`]. Removed slots are left empty and never reused, so an id stays
//! valid for the life of the circuit and survives cloning.

use std::collections::BTreeMap;

use super::pin::Pin;
use super::types::{ComponentId, Direction, PinId, Position};
use crate::components::{Component, PinSpec};
use crate::engine::ComputeContext;
use crate::error::{ConnectionError, LogicError, Result};
use crate::value::Signal;

/// A placed component and the pins it owns.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) component: Box<dyn Component>,
    pub(crate) label: String,
    pub(crate) position: Position,
    pub(crate) inputs: Vec<PinId>,
    pub(crate) outputs: Vec<PinId>,
}

/// An owned collection of components plus their wiring.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    name: String,
    pub(crate) nodes: Vec<Option<Node>>,
    pub(crate) pins: Vec<Option<Pin>>,
    /// Named nets from a netlist, mapped to a representative pin
    nets: BTreeMap<String, PinId>,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Number of live components.
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of live components in arena order.
    pub fn component_ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_some())
            .map(|(idx, _)| ComponentId(idx))
    }

    /// Place a component at the origin.
    pub fn add_component(&mut self, label: impl Into<String>, component: Box<dyn Component>) -> ComponentId {
        self.add_component_at(label, component, Position::default())
    }

    /// Place a component at a grid position.
    pub fn add_component_at(
        &mut self,
        label: impl Into<String>,
        component: Box<dyn Component>,
        position: Position,
    ) -> ComponentId {
        let id = ComponentId(self.nodes.len());
        self.nodes.push(None);
        self.place(id, label.into(), component, position);
        id
    }

    /// Place a component in a specific slot, as when loading a saved circuit.
    pub(crate) fn insert_component(
        &mut self,
        id: ComponentId,
        label: impl Into<String>,
        component: Box<dyn Component>,
        position: Position,
    ) -> Result<()> {
        let label = label.into();
        if self.nodes.get(id.0).map_or(false, Option::is_some) {
            return Err(LogicError::DuplicateComponent { name: id.to_string() });
        }
        if self.nodes.len() <= id.0 {
            self.nodes.resize_with(id.0 + 1, || None);
        }
        self.place(id, label, component, position);
        Ok(())
    }

    fn place(&mut self, id: ComponentId, label: String, component: Box<dyn Component>, position: Position) {
        let layout = component.layout();
        let inputs = layout
            .inputs
            .iter()
            .map(|spec| self.alloc_pin(id, Direction::In, spec))
            .collect();
        let outputs = layout
            .outputs
            .iter()
            .map(|spec| self.alloc_pin(id, Direction::Out, spec))
            .collect();
        self.nodes[id.0] = Some(Node {
            component,
            label,
            position,
            inputs,
            outputs,
        });
    }

    pub(crate) fn alloc_pin(&mut self, owner: ComponentId, direction: Direction, spec: &PinSpec) -> PinId {
        let id = PinId(self.pins.len());
        let mut pin = Pin::new(owner, direction, spec.kind, spec.name.clone());
        pin.clock = spec.clock;
        self.pins.push(Some(pin));
        id
    }

    /// Clear a pin's edges and release its slot.
    pub(crate) fn free_pin(&mut self, pin: PinId) {
        self.clear_pin(pin);
        if let Some(slot) = self.pins.get_mut(pin.0) {
            *slot = None;
        }
        self.nets.retain(|_, p| *p != pin);
    }

    /// Remove a component, clearing every edge that touches its pins.
    pub fn remove_component(&mut self, id: ComponentId) -> Option<Box<dyn Component>> {
        let node = self.nodes.get_mut(id.0)?.take()?;
        for pin in node.inputs.iter().chain(&node.outputs) {
            self.free_pin(*pin);
        }
        Some(node.component)
    }

    pub(crate) fn node(&self, id: ComponentId) -> Option<&Node> {
        self.nodes.get(id.0)?.as_ref()
    }

    pub(crate) fn node_mut(&mut self, id: ComponentId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)?.as_mut()
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.node(id).is_some()
    }

    pub fn component(&self, id: ComponentId) -> Option<&dyn Component> {
        self.node(id).map(|node| node.component.as_ref())
    }

    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut (dyn Component + 'static)> {
        self.node_mut(id).map(|node| node.component.as_mut())
    }

    /// Find a component by label.
    pub fn find(&self, label: &str) -> Option<ComponentId> {
        self.component_ids()
            .find(|id| self.node(*id).map_or(false, |node| node.label == label))
    }

    pub fn label(&self, id: ComponentId) -> Option<&str> {
        self.node(id).map(|node| node.label.as_str())
    }

    /// Rename a component. Labels are unique within a circuit.
    pub fn set_label(&mut self, id: ComponentId, label: impl Into<String>) -> Result<()> {
        let label = label.into();
        if let Some(other) = self.find(&label) {
            if other != id {
                return Err(LogicError::DuplicateComponent { name: label });
            }
        }
        let node = self
            .node_mut(id)
            .ok_or_else(|| LogicError::UnknownComponent { name: id.to_string() })?;
        node.label = label;
        Ok(())
    }

    pub fn position(&self, id: ComponentId) -> Option<Position> {
        self.node(id).map(|node| node.position)
    }

    pub fn set_position(&mut self, id: ComponentId, position: Position) -> Result<()> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| LogicError::UnknownComponent { name: id.to_string() })?;
        node.position = position;
        Ok(())
    }

    /// Input pins of a component, in layout order.
    pub fn inputs(&self, id: ComponentId) -> &[PinId] {
        self.node(id).map_or(&[], |node| node.inputs.as_slice())
    }

    /// Output pins of a component, in layout order.
    pub fn outputs(&self, id: ComponentId) -> &[PinId] {
        self.node(id).map_or(&[], |node| node.outputs.as_slice())
    }

    pub fn input_pin(&self, id: ComponentId, index: usize) -> Option<PinId> {
        self.inputs(id).get(index).copied()
    }

    pub fn output_pin(&self, id: ComponentId, index: usize) -> Option<PinId> {
        self.outputs(id).get(index).copied()
    }

    pub fn pin(&self, pin: PinId) -> Option<&Pin> {
        self.pins.get(pin.0)?.as_ref()
    }

    pub(crate) fn pin_mut(&mut self, pin: PinId) -> Option<&mut Pin> {
        self.pins.get_mut(pin.0)?.as_mut()
    }

    /// Current value seen on a pin. An input reads its driver, or unknown
    /// when undriven.
    pub fn pin_value(&self, pin: PinId) -> Option<Signal> {
        let p = self.pin(pin)?;
        match p.direction() {
            Direction::Out => Some(p.value.clone()),
            Direction::In => Some(self.read_input(p)),
        }
    }

    fn read_input(&self, pin: &Pin) -> Signal {
        pin.driver
            .and_then(|driver| self.pin(driver))
            .map_or_else(|| pin.kind.unknown(), |driver| driver.value.clone())
    }

    fn checked_pin(&self, pin: PinId, expected: Direction) -> std::result::Result<&Pin, ConnectionError> {
        let p = self.pin(pin).ok_or(ConnectionError::UnknownPin { pin })?;
        if p.direction() != expected {
            return Err(ConnectionError::Direction {
                pin,
                expected,
                actual: p.direction(),
            });
        }
        Ok(p)
    }

    /// Wire an output pin to an input pin.
    ///
    /// An input has at most one driver; an existing driver is replaced.
    pub fn connect(&mut self, output: PinId, input: PinId) -> std::result::Result<(), ConnectionError> {
        let out_kind = self.checked_pin(output, Direction::Out)?.kind();
        let in_kind = self.checked_pin(input, Direction::In)?.kind();
        if !out_kind.same_polarity(in_kind) {
            return Err(ConnectionError::PolarityMismatch {
                from: output,
                to: input,
                from_kind: out_kind,
                to_kind: in_kind,
            });
        }

        self.disconnect(input)?;
        if let Some(p) = self.pin_mut(input) {
            p.driver = Some(output);
        }
        if let Some(p) = self.pin_mut(output) {
            p.fanout.push(input);
        }
        Ok(())
    }

    /// Remove the driver of an input pin. Returns the former driver.
    pub fn disconnect(&mut self, input: PinId) -> std::result::Result<Option<PinId>, ConnectionError> {
        self.checked_pin(input, Direction::In)?;
        let previous = self.pin_mut(input).and_then(|p| p.driver.take());
        if let Some(driver) = previous {
            if let Some(p) = self.pin_mut(driver) {
                p.fanout.retain(|pin| *pin != input);
            }
        }
        Ok(previous)
    }

    /// Remove every edge touching a pin.
    pub fn clear_pin(&mut self, pin: PinId) {
        let Some(p) = self.pin_mut(pin) else {
            return;
        };
        let driver = p.driver.take();
        let fanout = std::mem::take(&mut p.fanout);
        if let Some(driver) = driver {
            if let Some(d) = self.pin_mut(driver) {
                d.fanout.retain(|x| *x != pin);
            }
        }
        for input in fanout {
            if let Some(i) = self.pin_mut(input) {
                i.driver = None;
            }
        }
    }

    /// Give a net name to a pin so it can be probed by name.
    pub fn name_net(&mut self, name: impl Into<String>, pin: PinId) {
        self.nets.insert(name.into(), pin);
    }

    pub fn net(&self, name: &str) -> Option<PinId> {
        self.nets.get(name).copied()
    }

    pub fn nets(&self) -> impl Iterator<Item = (&str, PinId)> {
        self.nets.iter().map(|(name, pin)| (name.as_str(), *pin))
    }

    /// Input values of a component, in layout order.
    pub(crate) fn input_values(&self, id: ComponentId) -> Vec<Signal> {
        self.inputs(id)
            .iter()
            .map(|pin| self.pin(*pin).map_or(Signal::UNKNOWN, |p| self.read_input(p)))
            .collect()
    }

    /// Run one component's `compute` and store its outputs. Returns whether
    /// any output changed.
    pub(crate) fn evaluate(&mut self, id: ComponentId, ctx: &mut ComputeContext<'_>) -> bool {
        let inputs = self.input_values(id);
        let output_pins = self.outputs(id).to_vec();
        let mut outputs: Vec<Signal> = output_pins
            .iter()
            .map(|pin| self.pin(*pin).map_or(Signal::UNKNOWN, |p| p.value.clone()))
            .collect();

        let Some(node) = self.node_mut(id) else {
            return false;
        };
        node.component.compute(&inputs, &mut outputs, ctx);

        let mut changed = false;
        for (pin, value) in output_pins.into_iter().zip(outputs) {
            if let Some(p) = self.pin_mut(pin) {
                if p.value != value {
                    p.value = value;
                    changed = true;
                }
            }
        }
        changed
    }

    /// Call every component's `settle` hook with its final inputs.
    pub(crate) fn settle_all(&mut self) {
        let ids: Vec<ComponentId> = self.component_ids().collect();
        for id in ids {
            let inputs = self.input_values(id);
            if let Some(node) = self.node_mut(id) {
                node.component.settle(&inputs);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Gate, Not, Probe, Switch};
    use crate::engine::SimulatorConfig;
    use crate::value::Value;

    fn two_gates() -> (Circuit, ComponentId, ComponentId) {
        let mut circuit = Circuit::new("test");
        let a = circuit.add_component("a", Box::new(Switch::new(true)));
        let n = circuit.add_component("n", Box::new(Not));
        (circuit, a, n)
    }

    #[test]
    fn test_connect_records_both_ends() {
        let (mut circuit, a, n) = two_gates();
        let out = circuit.output_pin(a, 0).unwrap();
        let input = circuit.input_pin(n, 0).unwrap();
        circuit.connect(out, input).unwrap();

        assert_eq!(circuit.pin(input).unwrap().driver(), Some(out));
        assert_eq!(circuit.pin(out).unwrap().fanout(), &[input]);

        circuit.disconnect(input).unwrap();
        assert!(!circuit.pin(out).unwrap().is_connected());
    }

    #[test]
    fn test_second_driver_replaces_first() {
        let (mut circuit, a, n) = two_gates();
        let b = circuit.add_component("b", Box::new(Switch::new(false)));
        let input = circuit.input_pin(n, 0).unwrap();
        let out_a = circuit.output_pin(a, 0).unwrap();
        let out_b = circuit.output_pin(b, 0).unwrap();

        circuit.connect(out_a, input).unwrap();
        circuit.connect(out_b, input).unwrap();
        assert_eq!(circuit.pin(input).unwrap().driver(), Some(out_b));
        assert!(circuit.pin(out_a).unwrap().fanout().is_empty());
    }

    #[test]
    fn test_connect_rejects_bad_wiring() {
        let (mut circuit, a, n) = two_gates();
        let probe = circuit.add_component("p", Box::new(Probe::new(8)));
        let out = circuit.output_pin(a, 0).unwrap();
        let bus_in = circuit.input_pin(probe, 0).unwrap();
        assert!(matches!(
            circuit.connect(out, bus_in),
            Err(ConnectionError::PolarityMismatch { .. })
        ));

        let input = circuit.input_pin(n, 0).unwrap();
        assert!(matches!(
            circuit.connect(input, out),
            Err(ConnectionError::Direction { .. })
        ));
        assert!(matches!(
            circuit.connect(out, PinId(999)),
            Err(ConnectionError::UnknownPin { .. })
        ));
    }

    #[test]
    fn test_remove_component_clears_edges_and_keeps_ids() {
        let (mut circuit, a, n) = two_gates();
        let g = circuit.add_component("g", Box::new(Gate::and(2)));
        let out = circuit.output_pin(a, 0).unwrap();
        circuit.connect(out, circuit.input_pin(n, 0).unwrap()).unwrap();
        circuit.connect(out, circuit.input_pin(g, 0).unwrap()).unwrap();
        circuit.name_net("sig", out);

        assert!(circuit.remove_component(a).is_some());
        assert!(circuit.pin_value(circuit.input_pin(n, 0).unwrap()).is_some());
        assert_eq!(circuit.pin(circuit.input_pin(g, 0).unwrap()).unwrap().driver(), None);
        assert_eq!(circuit.net("sig"), None);
        assert_eq!(circuit.find("g"), Some(g));
        assert_eq!(circuit.component_ids().collect::<Vec<_>>(), vec![n, g]);

        let again = circuit.add_component("a2", Box::new(Switch::new(false)));
        assert_eq!(again, ComponentId(3));
    }

    #[test]
    fn test_evaluate_reports_changes() {
        let (mut circuit, a, n) = two_gates();
        let out = circuit.output_pin(a, 0).unwrap();
        circuit.connect(out, circuit.input_pin(n, 0).unwrap()).unwrap();

        let config = SimulatorConfig::default();
        let mut faults = Vec::new();
        let mut ctx = ComputeContext::new(&config, &mut faults);
        // Outputs power up low, so the inverter sees 0 before the switch runs.
        assert!(circuit.evaluate(n, &mut ctx));
        assert!(circuit.evaluate(a, &mut ctx));
        assert!(circuit.evaluate(n, &mut ctx));
        assert!(!circuit.evaluate(n, &mut ctx));
        let not_out = circuit.output_pin(n, 0).unwrap();
        assert_eq!(circuit.pin_value(not_out), Some(Signal::Scalar(Value::False)));
    }

    #[test]
    fn test_labels_are_unique() {
        let (mut circuit, a, n) = two_gates();
        assert!(circuit.set_label(n, "a").is_err());
        circuit.set_label(a, "a").unwrap();
        circuit.set_label(n, "inv").unwrap();
        assert_eq!(circuit.find("inv"), Some(n));
    }
}
