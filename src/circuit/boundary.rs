//! Boundary discovery and reference pin rebinding.

use super::graph::Circuit;
use super::types::{ComponentId, Direction, PinId, PinKind, Position};
use crate::components::PinSpec;
use crate::error::{LogicError, Result};

/// One boundary port of a circuit, as seen from a reference to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryPin {
    /// The port component inside the circuit; the pin's stable identity
    pub id: ComponentId,
    pub label: String,
    pub kind: PinKind,
    pub position: Position,
}

impl BoundaryPin {
    pub fn spec(&self) -> PinSpec {
        PinSpec::bus(self.label.clone(), self.kind.width())
    }
}

/// Ordered input and output ports of a circuit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Boundary {
    pub inputs: Vec<BoundaryPin>,
    pub outputs: Vec<BoundaryPin>,
}

impl Boundary {
    pub fn side(&self, direction: Direction) -> &[BoundaryPin] {
        match direction {
            Direction::In => &self.inputs,
            Direction::Out => &self.outputs,
        }
    }
}

/// What a rebind did to a reference's pins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebindSummary {
    /// Pins whose wiring survived
    pub kept: usize,
    /// New, unconnected pins
    pub added: usize,
    /// Pins dropped along with their wiring
    pub removed: usize,
    /// Pins kept in place whose polarity changed; their wiring was cleared
    pub retyped: usize,
}

impl Circuit {
    /// Discover the boundary ports, each side sorted row-major by position
    /// with ties broken by component id.
    pub fn boundary(&self) -> Boundary {
        let mut boundary = Boundary::default();
        for id in self.component_ids() {
            let Some(node) = self.node(id) else {
                continue;
            };
            let Some(port) = node.component.port() else {
                continue;
            };
            let pin = BoundaryPin {
                id,
                label: node.label.clone(),
                kind: port.kind,
                position: node.position,
            };
            match port.direction {
                Direction::In => boundary.inputs.push(pin),
                Direction::Out => boundary.outputs.push(pin),
            }
        }
        boundary.inputs.sort_by_key(|p| (p.position, p.id));
        boundary.outputs.sort_by_key(|p| (p.position, p.id));
        boundary
    }

    /// Reshape a reference's pins to match `boundary`.
    ///
    /// Pins are matched by the inner port id they were bound to. A matched
    /// pin keeps its outer wiring unless its polarity changed; unmatched old
    /// pins are cleared and freed; new ports get fresh unconnected pins.
    pub fn rebind_pins(&mut self, id: ComponentId, boundary: &Boundary) -> Result<RebindSummary> {
        if !self.contains(id) {
            return Err(LogicError::UnknownComponent { name: id.to_string() });
        }
        let mut summary = RebindSummary::default();
        let inputs = self.rebind_side(id, Direction::In, boundary.side(Direction::In), &mut summary);
        let outputs = self.rebind_side(id, Direction::Out, boundary.side(Direction::Out), &mut summary);
        if let Some(node) = self.node_mut(id) {
            node.inputs = inputs;
            node.outputs = outputs;
        }
        Ok(summary)
    }

    fn rebind_side(
        &mut self,
        id: ComponentId,
        direction: Direction,
        ports: &[BoundaryPin],
        summary: &mut RebindSummary,
    ) -> Vec<PinId> {
        let mut old: Vec<PinId> = match direction {
            Direction::In => self.inputs(id).to_vec(),
            Direction::Out => self.outputs(id).to_vec(),
        };

        let mut pins = Vec::with_capacity(ports.len());
        for port in ports {
            let matched = old
                .iter()
                .position(|pin| self.pin(*pin).and_then(|p| p.binding()) == Some(port.id))
                .map(|idx| old.remove(idx));

            let pin = match matched {
                Some(pin) => {
                    let retyped = self
                        .pin(pin)
                        .map_or(false, |p| !p.kind().same_polarity(port.kind));
                    if retyped {
                        self.clear_pin(pin);
                        summary.retyped += 1;
                    } else {
                        summary.kept += 1;
                    }
                    if let Some(p) = self.pin_mut(pin) {
                        let width_changed = p.kind != port.kind;
                        p.kind = port.kind;
                        p.name = port.label.clone();
                        if width_changed {
                            p.reset_value();
                        }
                    }
                    pin
                }
                None => {
                    let pin = self.alloc_pin(id, direction, &port.spec());
                    if let Some(p) = self.pin_mut(pin) {
                        p.binding = Some(port.id);
                    }
                    summary.added += 1;
                    pin
                }
            };
            pins.push(pin);
        }

        for pin in old {
            self.free_pin(pin);
            summary.removed += 1;
        }
        pins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{InputPort, OutputPort};

    #[test]
    fn test_boundary_is_row_major() {
        let mut circuit = Circuit::new("sub");
        let b = circuit.add_component_at("b", Box::new(InputPort::new(1)), Position::new(0, 2));
        let a = circuit.add_component_at("a", Box::new(InputPort::new(4)), Position::new(3, 0));
        let c = circuit.add_component_at("c", Box::new(InputPort::new(1)), Position::new(0, 2));
        let q = circuit.add_component_at("q", Box::new(OutputPort::new(1)), Position::new(9, 9));

        let boundary = circuit.boundary();
        let ids: Vec<ComponentId> = boundary.inputs.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a, b, c]);
        assert_eq!(boundary.inputs[0].kind, PinKind::Bus(4));
        assert_eq!(boundary.outputs.len(), 1);
        assert_eq!(boundary.outputs[0].id, q);
        assert_eq!(boundary.outputs[0].label, "q");
    }
}
