//! Building circuit libraries from a parsed netlist.

use std::collections::BTreeMap;

use tracing::debug;

use super::boundary::Boundary;
use super::graph::Circuit;
use super::library::CircuitLibrary;
use super::types::{ComponentId, Direction, PinId, Position};
use super::validate::validate_circuit;
use crate::components::{bind_reference, build_component, is_known_kind, ComponentConfig};
use crate::dsl::{self, CircuitDef, ComponentDef, NetlistAst, NO_NET};
use crate::error::{ConnectionError, LogicError, Result};

/// A loaded netlist: its circuits, the one to simulate, and the nets to
/// report.
#[derive(Debug, Clone)]
pub struct Design {
    pub library: CircuitLibrary,
    pub top: String,
    pub probes: Vec<String>,
}

impl Design {
    /// Parse and build a netlist.
    pub fn from_netlist(source: &str) -> Result<Self> {
        Self::from_ast(&dsl::parse(source)?)
    }

    /// Build a netlist file.
    #[cfg(feature = "cli")]
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        Self::from_ast(&dsl::parse_file(path)?)
    }

    /// Build every circuit of a parsed netlist.
    ///
    /// Runs in three phases so references can point at circuits defined
    /// later in the file: place all components, give every reference the
    /// pins of its target's boundary, then wire the nets.
    pub fn from_ast(ast: &NetlistAst) -> Result<Self> {
        let top = ast.top_name().ok_or(LogicError::MissingTop)?.to_string();

        let mut circuits = Vec::with_capacity(ast.circuits.len());
        for def in &ast.circuits {
            if circuits.iter().any(|(c, _): &(Circuit, Vec<ComponentId>)| c.name() == def.name) {
                return Err(LogicError::DuplicateCircuit { name: def.name.clone() });
            }
            circuits.push(place_components(def)?);
        }

        let boundaries: BTreeMap<String, Boundary> = circuits
            .iter()
            .map(|(c, _)| (c.name().to_string(), c.boundary()))
            .collect();

        let mut library = CircuitLibrary::new();
        for ((mut circuit, ids), def) in circuits.into_iter().zip(&ast.circuits) {
            for (id, comp) in ids.iter().zip(&def.components) {
                if let Some(target) = comp.target() {
                    let boundary = boundaries
                        .get(target)
                        .ok_or_else(|| LogicError::UnknownCircuit { name: target.to_string() })?;
                    bind_reference(&mut circuit, *id, boundary)?;
                }
            }
            wire_nets(&mut circuit, &ids, def)?;
            validate_circuit(&circuit)?;
            debug!(circuit = circuit.name(), components = circuit.len(), "built circuit");
            library.insert(circuit)?;
        }

        if !library.contains(&top) {
            return Err(LogicError::UnknownCircuit { name: top });
        }
        Ok(Self {
            library,
            top,
            probes: ast.probes.clone(),
        })
    }
}

fn place_components(def: &CircuitDef) -> Result<(Circuit, Vec<ComponentId>)> {
    let mut circuit = Circuit::new(def.name.clone());
    let mut ids = Vec::with_capacity(def.components.len());
    for comp in &def.components {
        if circuit.find(&comp.name).is_some() {
            return Err(LogicError::DuplicateComponent { name: comp.name.clone() });
        }
        if !is_known_kind(&comp.kind) {
            return Err(LogicError::UnknownComponentType {
                component_type: comp.kind.clone(),
                line: comp.line,
            });
        }
        let (config, position) = split_params(comp)?;
        let component = build_component(&comp.name, &comp.kind, &config)?;
        ids.push(circuit.add_component_at(comp.name.clone(), component, position));
    }
    Ok((circuit, ids))
}

/// Separate the reserved placement keys from the component configuration.
fn split_params(comp: &ComponentDef) -> Result<(ComponentConfig, Position)> {
    let mut config: ComponentConfig = comp.params.clone().into_iter().collect();
    let mut coordinate = |key: &str| -> Result<i32> {
        match config.remove(key) {
            None => Ok(0),
            Some(text) => text.parse().map_err(|_| {
                LogicError::invalid_component(&comp.name, comp.line, format!("{} must be an integer, got '{}'", key, text))
            }),
        }
    };
    let x = coordinate("x")?;
    let y = coordinate("y")?;
    Ok((config, Position::new(x, y)))
}

#[derive(Default)]
struct NetPins {
    drivers: Vec<PinId>,
    sinks: Vec<PinId>,
}

fn wire_nets(circuit: &mut Circuit, ids: &[ComponentId], def: &CircuitDef) -> Result<()> {
    let mut nets: BTreeMap<&str, NetPins> = BTreeMap::new();
    for (id, comp) in ids.iter().zip(&def.components) {
        let pins: Vec<PinId> = circuit.inputs(*id).iter().chain(circuit.outputs(*id)).copied().collect();
        if comp.nets.len() > pins.len() {
            return Err(LogicError::invalid_component(
                &comp.name,
                comp.line,
                format!("{} takes at most {} nets, got {}", comp.kind, pins.len(), comp.nets.len()),
            ));
        }
        for (net, pin) in comp.nets.iter().zip(pins) {
            if net == NO_NET {
                continue;
            }
            let entry = nets.entry(net.as_str()).or_default();
            match circuit.pin(pin).map(|p| p.direction()) {
                Some(Direction::Out) => entry.drivers.push(pin),
                _ => entry.sinks.push(pin),
            }
        }
    }

    for (name, pins) in nets {
        if pins.drivers.len() > 1 {
            return Err(ConnectionError::MultipleDrivers { net: name.to_string() }.into());
        }
        if let Some(&driver) = pins.drivers.first() {
            for &sink in &pins.sinks {
                circuit.connect(driver, sink)?;
            }
            circuit.name_net(name, driver);
        } else if let Some(&sink) = pins.sinks.first() {
            circuit.name_net(name, sink);
        }
    }
    Ok(())
}
