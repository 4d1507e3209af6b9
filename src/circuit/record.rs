//! Serializable circuit records.
//!
//! A record holds only what is needed to rebuild a circuit: each
//! component's kind, label, position, and configuration, plus the wires as
//! pin-index pairs. Pin values and internal state are recomputed after load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::graph::Circuit;
use super::library::CircuitLibrary;
use super::types::{ComponentId, Direction, PinId, Position};
use crate::components::{bind_reference, build_component, ComponentConfig};
use crate::error::{LogicError, Result};

/// A pin addressed by its owner and index within one side of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinRef {
    pub component: ComponentId,
    pub direction: Direction,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub id: ComponentId,
    pub kind: String,
    pub label: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "ComponentConfig::is_empty")]
    pub config: ComponentConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRecord {
    pub from: PinRef,
    pub to: PinRef,
}

/// Flat, serde-friendly form of a [`Circuit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitRecord {
    pub name: String,
    pub components: Vec<ComponentRecord>,
    #[serde(default)]
    pub wires: Vec<WireRecord>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub nets: BTreeMap<String, PinRef>,
}

impl Circuit {
    /// Address a pin by owner and index.
    pub fn pin_ref(&self, pin: PinId) -> Option<PinRef> {
        let p = self.pin(pin)?;
        let side = match p.direction() {
            Direction::In => self.inputs(p.owner()),
            Direction::Out => self.outputs(p.owner()),
        };
        let index = side.iter().position(|x| *x == pin)?;
        Some(PinRef {
            component: p.owner(),
            direction: p.direction(),
            index,
        })
    }

    /// Resolve an owner-and-index address to a pin.
    pub fn resolve_pin_ref(&self, pin: &PinRef) -> Option<PinId> {
        match pin.direction {
            Direction::In => self.input_pin(pin.component, pin.index),
            Direction::Out => self.output_pin(pin.component, pin.index),
        }
    }

    pub fn to_record(&self) -> CircuitRecord {
        let components = self
            .component_ids()
            .filter_map(|id| {
                let node = self.node(id)?;
                Some(ComponentRecord {
                    id,
                    kind: node.component.kind().to_string(),
                    label: node.label.clone(),
                    position: node.position,
                    config: node.component.config(),
                })
            })
            .collect();

        let mut wires = Vec::new();
        for id in self.component_ids() {
            for input in self.inputs(id) {
                let Some(driver) = self.pin(*input).and_then(|p| p.driver()) else {
                    continue;
                };
                if let (Some(from), Some(to)) = (self.pin_ref(driver), self.pin_ref(*input)) {
                    wires.push(WireRecord { from, to });
                }
            }
        }

        let nets = self
            .nets()
            .filter_map(|(name, pin)| Some((name.to_string(), self.pin_ref(pin)?)))
            .collect();

        CircuitRecord {
            name: self.name().to_string(),
            components,
            wires,
            nets,
        }
    }

    /// Rebuild a circuit from a record. References are given pins from the
    /// boundary of their target in `library`.
    pub fn from_record(record: &CircuitRecord, library: &CircuitLibrary) -> Result<Self> {
        let mut circuit = Circuit::new(record.name.clone());
        for rec in &record.components {
            let component = build_component(&rec.label, &rec.kind, &rec.config)?;
            circuit.insert_component(rec.id, rec.label.clone(), component, rec.position)?;

            let target = circuit
                .component(rec.id)
                .and_then(|c| c.as_circuit_ref())
                .map(|r| r.target().to_string());
            if let Some(target) = target {
                let boundary = library
                    .get(&target)
                    .map(Circuit::boundary)
                    .ok_or(LogicError::UnknownCircuit { name: target })?;
                bind_reference(&mut circuit, rec.id, &boundary)?;
            }
        }

        for wire in &record.wires {
            let from = resolve(&circuit, &wire.from)?;
            let to = resolve(&circuit, &wire.to)?;
            circuit.connect(from, to)?;
        }

        for (name, pin) in &record.nets {
            if let Some(pin) = circuit.resolve_pin_ref(pin) {
                circuit.name_net(name.clone(), pin);
            }
        }
        Ok(circuit)
    }
}

fn resolve(circuit: &Circuit, pin: &PinRef) -> Result<PinId> {
    circuit.resolve_pin_ref(pin).ok_or_else(|| LogicError::UnknownComponent {
        name: format!("{} {} pin {}", pin.component, pin.direction, pin.index),
    })
}
