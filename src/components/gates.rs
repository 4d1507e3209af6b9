//! Combinational gates.
//!
//! A gate is a base operator folded over its inputs plus an optional output
//! inversion, so NAND is AND with `inverted` set rather than a separate type.

use super::{Component, ComponentConfig, PinLayout, PinSpec};
use crate::engine::ComputeContext;
use crate::value::{Signal, Value};

/// Gate operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOp {
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Xnor,
}

impl GateOp {
    /// Parse from a netlist type name.
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind.to_ascii_uppercase().as_str() {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NAND" => Some(Self::Nand),
            "NOR" => Some(Self::Nor),
            "XOR" => Some(Self::Xor),
            "XNOR" => Some(Self::Xnor),
            _ => None,
        }
    }

    pub fn kind(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Nand => "NAND",
            Self::Nor => "NOR",
            Self::Xor => "XOR",
            Self::Xnor => "XNOR",
        }
    }

    fn inverted(self) -> bool {
        matches!(self, Self::Nand | Self::Nor | Self::Xnor)
    }

    /// Fold the base operator over `inputs`. An empty input list reads as
    /// unknown.
    pub fn eval(self, inputs: impl IntoIterator<Item = Value>) -> Value {
        let base = |a: Value, b: Value| match self {
            Self::And | Self::Nand => a.and(b),
            Self::Or | Self::Nor => a.or(b),
            Self::Xor | Self::Xnor => a.xor(b),
        };
        let folded = inputs.into_iter().reduce(base).unwrap_or(Value::Unknown);
        if self.inverted() {
            folded.invert()
        } else {
            folded
        }
    }
}

/// An n-input gate.
#[derive(Debug, Clone)]
pub struct Gate {
    op: GateOp,
    inputs: usize,
}

impl Gate {
    pub fn new(op: GateOp, inputs: usize) -> Self {
        Self {
            op,
            inputs: inputs.max(1),
        }
    }

    pub fn and(inputs: usize) -> Self {
        Self::new(GateOp::And, inputs)
    }

    pub fn or(inputs: usize) -> Self {
        Self::new(GateOp::Or, inputs)
    }

    pub fn nand(inputs: usize) -> Self {
        Self::new(GateOp::Nand, inputs)
    }

    pub fn nor(inputs: usize) -> Self {
        Self::new(GateOp::Nor, inputs)
    }

    pub fn xor(inputs: usize) -> Self {
        Self::new(GateOp::Xor, inputs)
    }

    pub fn op(&self) -> GateOp {
        self.op
    }
}

impl Component for Gate {
    fn kind(&self) -> &'static str {
        self.op.kind()
    }

    fn layout(&self) -> PinLayout {
        let inputs = (0..self.inputs).map(|i| PinSpec::scalar(format!("in{}", i))).collect();
        PinLayout::new(inputs, vec![PinSpec::scalar("out")])
    }

    fn compute(&mut self, inputs: &[Signal], outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {
        outputs[0] = Signal::Scalar(self.op.eval(inputs.iter().map(Signal::scalar)));
    }

    fn config(&self) -> ComponentConfig {
        ComponentConfig::new().with("inputs", self.inputs)
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// Inverter.
#[derive(Debug, Clone, Copy)]
pub struct Not;

impl Component for Not {
    fn kind(&self) -> &'static str {
        "NOT"
    }

    fn layout(&self) -> PinLayout {
        PinLayout::new(vec![PinSpec::scalar("in")], vec![PinSpec::scalar("out")])
    }

    fn compute(&mut self, inputs: &[Signal], outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {
        outputs[0] = Signal::Scalar(!inputs[0].scalar());
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(*self)
    }
}

/// Non-inverting buffer.
#[derive(Debug, Clone, Copy)]
pub struct Buffer;

impl Component for Buffer {
    fn kind(&self) -> &'static str {
        "BUF"
    }

    fn layout(&self) -> PinLayout {
        PinLayout::new(vec![PinSpec::scalar("in")], vec![PinSpec::scalar("out")])
    }

    fn compute(&mut self, inputs: &[Signal], outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {
        outputs[0] = Signal::Scalar(inputs[0].scalar());
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SimulatorConfig;

    const T: Value = Value::True;
    const F: Value = Value::False;
    const X: Value = Value::Unknown;

    fn run(part: &mut dyn Component, inputs: &[Value]) -> Value {
        let config = SimulatorConfig::default();
        let mut faults = Vec::new();
        let mut ctx = ComputeContext::new(&config, &mut faults);
        let inputs: Vec<Signal> = inputs.iter().copied().map(Signal::Scalar).collect();
        let mut outputs = vec![Signal::UNKNOWN];
        part.compute(&inputs, &mut outputs, &mut ctx);
        outputs[0].scalar()
    }

    #[test]
    fn test_and_gate_scenario() {
        let mut and = Gate::and(2);
        assert_eq!(run(&mut and, &[T, T]), T);
        assert_eq!(run(&mut and, &[T, F]), F);
        assert_eq!(run(&mut and, &[T, X]), X);
        assert_eq!(run(&mut and, &[F, X]), F);
    }

    #[test]
    fn test_inverted_variants() {
        assert_eq!(run(&mut Gate::nand(2), &[T, T]), F);
        assert_eq!(run(&mut Gate::nand(2), &[F, X]), T);
        assert_eq!(run(&mut Gate::nor(2), &[F, F]), T);
        assert_eq!(run(&mut Gate::nor(2), &[T, X]), F);
        assert_eq!(run(&mut Gate::new(GateOp::Xnor, 2), &[T, T]), T);
        assert_eq!(run(&mut Not, &[X]), X);
        assert_eq!(run(&mut Buffer, &[F]), F);
    }

    #[test]
    fn test_wide_gates() {
        assert_eq!(run(&mut Gate::or(4), &[F, X, F, T]), T);
        assert_eq!(run(&mut Gate::xor(3), &[T, T, T]), T);
        assert_eq!(run(&mut Gate::and(3), &[T, T, X]), X);
    }

    #[test]
    fn test_gates_commute() {
        let values = [T, F, X];
        for op in [GateOp::And, GateOp::Or, GateOp::Nand, GateOp::Nor, GateOp::Xor, GateOp::Xnor] {
            for a in values {
                for b in values {
                    let mut gate = Gate::new(op, 2);
                    assert_eq!(run(&mut gate, &[a, b]), run(&mut gate, &[b, a]), "{:?}({}, {})", op, a, b);
                }
            }
        }
    }

    #[test]
    fn test_wide_gates_ignore_input_order() {
        let values = [T, F, X];
        for op in [GateOp::And, GateOp::Or, GateOp::Nand, GateOp::Nor, GateOp::Xor, GateOp::Xnor] {
            let mut gate = Gate::new(op, 3);
            for a in values {
                for b in values {
                    for c in values {
                        let expected = run(&mut gate, &[a, b, c]);
                        for order in [[a, c, b], [b, a, c], [b, c, a], [c, a, b], [c, b, a]] {
                            assert_eq!(run(&mut gate, &order), expected, "{:?}{:?}", op, order);
                        }
                    }
                }
            }
        }
    }
}
