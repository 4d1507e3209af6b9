//! Component models for logic simulation.
//!
//! This module provides every part that can be placed in a circuit:
//! - Gates: AND, OR, NAND, NOR, XOR, XNOR, NOT, buffer
//! - Sources and sinks: constant, switch, button, keypad, probe
//! - Timing: clock
//! - Sequential: D flip-flop, register
//! - Bus plumbing: splitter, merger, extender, multiplexer, adder
//! - Boundary ports and sub-circuit references
//!
//! Every part implements the [`Component`] trait. The engine never needs to
//! know which concrete part it is driving.

mod arith;
mod bus;
mod circuit_ref;
mod clock;
mod gates;
mod io;
mod ports;
mod sequential;

pub use arith::{Adder, Mux};
pub use bus::{Extend, Merger, Splitter};
pub use circuit_ref::{CircuitRef, Instance};
pub use clock::Clock;
pub use gates::{Buffer, Gate, GateOp, Not};
pub use io::{Button, Constant, Keypad, Probe, Switch};
pub use ports::{InputPort, OutputPort};
pub use sequential::{DFlipFlop, EdgeTrigger, Register};

pub(crate) use circuit_ref::{bind_reference, refresh_references};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::circuit::{Direction, PinKind};
use crate::dsl::parse_value;
use crate::engine::{ComputeContext, TIME_EPSILON};
use crate::error::{LogicError, Result};
use crate::value::Signal;

/// Every component type the factory can build, as written in a netlist.
pub const KINDS: &[&str] = &[
    "AND", "OR", "NAND", "NOR", "XOR", "XNOR", "NOT", "BUF", "CONST", "SWITCH", "BUTTON",
    "KEYPAD", "PROBE", "CLOCK", "DFF", "REG", "SPLIT", "MERGE", "EXTEND", "MUX", "ADD", "IN",
    "OUT", "REF",
];

/// Check whether `kind` names a buildable component.
pub fn is_known_kind(kind: &str) -> bool {
    let upper = kind.to_ascii_uppercase();
    KINDS.contains(&upper.as_str())
}

/// Shape of one pin as declared by its component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinSpec {
    pub name: String,
    pub kind: PinKind,
    /// Edge-sensitive input
    pub clock: bool,
}

impl PinSpec {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PinKind::Scalar,
            clock: false,
        }
    }

    pub fn bus(name: impl Into<String>, width: usize) -> Self {
        Self {
            name: name.into(),
            kind: PinKind::from_width(width),
            clock: false,
        }
    }

    pub fn clock(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PinKind::Scalar,
            clock: true,
        }
    }
}

/// Ordered input and output pins of a component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinLayout {
    pub inputs: Vec<PinSpec>,
    pub outputs: Vec<PinSpec>,
}

impl PinLayout {
    pub fn new(inputs: Vec<PinSpec>, outputs: Vec<PinSpec>) -> Self {
        Self { inputs, outputs }
    }
}

/// How a component wants an externally injected value applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Injection {
    /// Apply now and run a propagation pass.
    Immediate,
    /// Queue through the scheduler and apply after this many time units.
    Delayed(f64),
    /// The component does not accept this value.
    Rejected(String),
}

/// A boundary port as seen from outside its circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSpec {
    /// `In` for ports that receive values from the enclosing reference
    pub direction: Direction,
    pub kind: PinKind,
}

/// The capability interface shared by all parts.
///
/// `compute` must be a deterministic function of the inputs and internal
/// state. It is called once per round, possibly many times per pass, so any
/// state change that should happen once per pass belongs in `settle`.
pub trait Component: fmt::Debug {
    /// Type identifier as written in a netlist.
    fn kind(&self) -> &'static str;

    /// Current pin layout.
    fn layout(&self) -> PinLayout;

    /// Compute outputs from inputs. `outputs` holds the previous round's
    /// values on entry.
    fn compute(&mut self, inputs: &[Signal], outputs: &mut [Signal], ctx: &mut ComputeContext<'_>);

    /// Called once after every propagation pass with the final input values.
    fn settle(&mut self, _inputs: &[Signal]) {}

    /// Move internal timers forward. Returns whether visible state changed.
    fn advance(&mut self, _dt: f64) -> bool {
        false
    }

    /// Time until this component's next timer expiry, if it has one.
    fn time_to_next_event(&self) -> Option<f64> {
        None
    }

    /// Decide how an external value should be applied.
    fn injection(&self, _value: &Signal) -> Injection {
        Injection::Rejected(format!("{} does not accept external values", self.kind()))
    }

    /// Apply an external value previously accepted by [`Component::injection`].
    fn inject(&mut self, _value: &Signal) {}

    /// Persistable configuration; never transient values.
    fn config(&self) -> ComponentConfig {
        ComponentConfig::new()
    }

    /// Boundary port description, for `IN`/`OUT` parts only.
    fn port(&self) -> Option<PortSpec> {
        None
    }

    fn as_circuit_ref(&self) -> Option<&CircuitRef> {
        None
    }

    fn as_circuit_ref_mut(&mut self) -> Option<&mut CircuitRef> {
        None
    }

    fn clone_box(&self) -> Box<dyn Component>;
}

impl Clone for Box<dyn Component> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Flat key-value configuration record of a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentConfig(BTreeMap<String, String>);

impl ComponentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read a non-negative integer, accepting SI suffixes (`1k`).
    pub fn usize_or(&self, component: &str, key: &str, default: usize) -> Result<usize> {
        match self.get(key) {
            None => Ok(default),
            Some(text) => parse_value(text)
                .filter(|v| *v >= 0.0 && v.fract() == 0.0)
                .map(|v| v as usize)
                .ok_or_else(|| {
                    LogicError::invalid_parameter(component, key, format!("expected an integer, got '{}'", text))
                }),
        }
    }

    /// Read a floating point number, accepting SI suffixes.
    pub fn f64_or(&self, component: &str, key: &str, default: f64) -> Result<f64> {
        match self.get(key) {
            None => Ok(default),
            Some(text) => parse_value(text).ok_or_else(|| {
                LogicError::invalid_parameter(component, key, format!("expected a number, got '{}'", text))
            }),
        }
    }

    /// Read a boolean (`1`/`0`/`true`/`false`/`on`/`off`).
    pub fn bool_or(&self, component: &str, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(text) => match text.to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => Ok(true),
                "0" | "false" | "off" | "no" => Ok(false),
                _ => Err(LogicError::invalid_parameter(
                    component,
                    key,
                    format!("expected a boolean, got '{}'", text),
                )),
            },
        }
    }
}

impl FromIterator<(String, String)> for ComponentConfig {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Upper bound on declared bus and gate widths.
pub const MAX_WIDTH: usize = 64;

fn width_param(name: &str, config: &ComponentConfig, key: &str, default: usize) -> Result<usize> {
    let width = config.usize_or(name, key, default)?;
    if width == 0 || width > MAX_WIDTH {
        return Err(LogicError::invalid_parameter(
            name,
            key,
            format!("must be between 1 and {}", MAX_WIDTH),
        ));
    }
    Ok(width)
}

/// Build a component from its type identifier and configuration.
///
/// `name` is only used for error messages.
pub fn build_component(name: &str, kind: &str, config: &ComponentConfig) -> Result<Box<dyn Component>> {
    let upper = kind.to_ascii_uppercase();
    let component: Box<dyn Component> = match upper.as_str() {
        "AND" | "OR" | "NAND" | "NOR" | "XOR" | "XNOR" => {
            let op = GateOp::from_kind(&upper).ok_or_else(|| LogicError::UnknownComponentType {
                component_type: kind.to_string(),
                line: 0,
            })?;
            let inputs = config.usize_or(name, "inputs", 2)?;
            if !(1..=MAX_WIDTH).contains(&inputs) {
                return Err(LogicError::invalid_parameter(name, "inputs", "must be between 1 and 64"));
            }
            Box::new(Gate::new(op, inputs))
        }
        "NOT" => Box::new(Not),
        "BUF" => Box::new(Buffer),
        "CONST" => {
            let width = width_param(name, config, "width", 1)?;
            let text = config.get("value").unwrap_or("0");
            let value = Signal::parse(text, (width > 1).then_some(width)).ok_or_else(|| {
                LogicError::invalid_parameter(name, "value", format!("cannot parse '{}'", text))
            })?;
            Box::new(Constant::new(value, width))
        }
        "SWITCH" => Box::new(Switch::new(config.bool_or(name, "state", false)?)),
        "BUTTON" => Box::new(Button::new(config.f64_or(name, "release", 0.0)?)),
        "KEYPAD" => Box::new(Keypad::new(config.f64_or(name, "delay", Keypad::DEFAULT_DELAY)?)),
        "PROBE" => Box::new(Probe::new(width_param(name, config, "width", 1)?)),
        "CLOCK" => {
            let frequency = config.f64_or(name, "freq", Clock::DEFAULT_FREQUENCY)?;
            let duty = config.f64_or(name, "duty", 0.5)?;
            if !(frequency > 0.0) || !frequency.is_finite() {
                return Err(LogicError::invalid_parameter(name, "freq", "must be positive"));
            }
            if !(duty > 0.0 && duty < 1.0) {
                return Err(LogicError::invalid_parameter(name, "duty", "must be strictly between 0 and 1"));
            }
            let clock = Clock::new(frequency, duty);
            if clock.shortest_phase() <= TIME_EPSILON {
                return Err(LogicError::invalid_parameter(
                    name,
                    "freq",
                    format!("{} Hz is too fast to resolve in simulated time", frequency),
                ));
            }
            Box::new(clock)
        }
        "DFF" => Box::new(DFlipFlop::new()),
        "REG" => Box::new(Register::new(width_param(name, config, "width", 8)?)),
        "SPLIT" => Box::new(Splitter::new(width_param(name, config, "width", 8)?)),
        "MERGE" => Box::new(Merger::new(width_param(name, config, "width", 8)?)),
        "EXTEND" => {
            let from = width_param(name, config, "from", 8)?;
            let to = width_param(name, config, "to", 16)?;
            Box::new(Extend::new(from, to, config.bool_or(name, "signed", false)?))
        }
        "MUX" => {
            let select = config.usize_or(name, "select", 1)?;
            if !(1..=6).contains(&select) {
                return Err(LogicError::invalid_parameter(name, "select", "must be between 1 and 6"));
            }
            Box::new(Mux::new(select))
        }
        "ADD" => Box::new(Adder::new(width_param(name, config, "width", 8)?)),
        "IN" => Box::new(InputPort::new(width_param(name, config, "width", 1)?)),
        "OUT" => Box::new(OutputPort::new(width_param(name, config, "width", 1)?)),
        "REF" => {
            let target = config
                .get("target")
                .ok_or_else(|| LogicError::invalid_parameter(name, "target", "reference needs a target circuit"))?;
            Box::new(CircuitRef::new(target))
        }
        _ => {
            return Err(LogicError::UnknownComponentType {
                component_type: kind.to_string(),
                line: 0,
            })
        }
    };
    Ok(component)
}
