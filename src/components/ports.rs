//! Boundary ports.
//!
//! An `IN` port inside a circuit becomes an input pin on every reference to
//! that circuit; an `OUT` port becomes an output pin. At the top level an
//! `IN` port behaves like a switch so a whole design can be driven directly.

use super::{Component, ComponentConfig, Injection, PinLayout, PinSpec, PortSpec};
use crate::circuit::{Direction, PinKind};
use crate::engine::ComputeContext;
use crate::value::Signal;

/// Value entering a circuit.
#[derive(Debug, Clone)]
pub struct InputPort {
    width: usize,
    value: Signal,
}

impl InputPort {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            value: PinKind::from_width(width).unknown(),
        }
    }

    pub fn value(&self) -> &Signal {
        &self.value
    }

    /// Drive the port from the enclosing reference.
    pub fn drive(&mut self, value: &Signal) {
        self.value = normalize(value, self.width);
    }
}

impl Component for InputPort {
    fn kind(&self) -> &'static str {
        "IN"
    }

    fn layout(&self) -> PinLayout {
        PinLayout::new(vec![], vec![PinSpec::bus("out", self.width)])
    }

    fn compute(&mut self, _inputs: &[Signal], outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {
        outputs[0] = self.value.clone();
    }

    fn injection(&self, _value: &Signal) -> Injection {
        Injection::Immediate
    }

    fn inject(&mut self, value: &Signal) {
        self.drive(value);
    }

    fn config(&self) -> ComponentConfig {
        ComponentConfig::new().with("width", self.width)
    }

    fn port(&self) -> Option<PortSpec> {
        Some(PortSpec {
            direction: Direction::In,
            kind: PinKind::from_width(self.width),
        })
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// Value leaving a circuit. Holds whatever reached its input during the
/// latest round.
#[derive(Debug, Clone)]
pub struct OutputPort {
    width: usize,
    value: Signal,
}

impl OutputPort {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            value: PinKind::from_width(width).unknown(),
        }
    }

    pub fn value(&self) -> &Signal {
        &self.value
    }
}

impl Component for OutputPort {
    fn kind(&self) -> &'static str {
        "OUT"
    }

    fn layout(&self) -> PinLayout {
        PinLayout::new(vec![PinSpec::bus("in", self.width)], vec![])
    }

    fn compute(&mut self, inputs: &[Signal], _outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {
        self.value = normalize(&inputs[0], self.width);
    }

    fn config(&self) -> ComponentConfig {
        ComponentConfig::new().with("width", self.width)
    }

    fn port(&self) -> Option<PortSpec> {
        Some(PortSpec {
            direction: Direction::Out,
            kind: PinKind::from_width(self.width),
        })
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

fn normalize(value: &Signal, width: usize) -> Signal {
    if width > 1 {
        Signal::Bus(value.bus(width))
    } else {
        Signal::Scalar(value.scalar())
    }
}
