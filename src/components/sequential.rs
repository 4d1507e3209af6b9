//! Edge-triggered storage.
//!
//! Edge detection compares the clock against its level at the end of the
//! previous pass, not the previous round. The data a part stores on an edge
//! is the data it saw at the end of that same previous pass, so every part
//! clocked by one edge samples the circuit as it stood before the edge,
//! whatever order the parts are evaluated in.
//!
//! While a pass sees a rising edge the part presents the sampled data; the
//! sample is committed in `settle` only if the clock is still high when the
//! pass ends. A clock that glitches high and low again inside one pass
//! therefore never stores anything, and one that stays high stores once.

use super::{Component, PinLayout, PinSpec, ComponentConfig};
use crate::engine::ComputeContext;
use crate::value::{Bus, Signal, Value};

/// Rising-edge detector keyed on the last settled clock level.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeTrigger {
    last_settled: Value,
}

impl EdgeTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `clock` is a `false -> true` transition from the settled level.
    pub fn is_rising(&self, clock: Value) -> bool {
        self.last_settled == Value::False && clock == Value::True
    }

    pub fn settle(&mut self, clock: Value) {
        self.last_settled = clock;
    }

    pub fn last_settled(&self) -> Value {
        self.last_settled
    }
}

/// D flip-flop. Inputs `D`, `CLK`; outputs `Q`, `Q'`. Powers up storing 0.
#[derive(Debug, Clone)]
pub struct DFlipFlop {
    stored: Value,
    /// `D` at the end of the last pass
    sampled: Value,
    edge: EdgeTrigger,
}

impl DFlipFlop {
    pub fn new() -> Self {
        Self {
            stored: Value::False,
            sampled: Value::Unknown,
            edge: EdgeTrigger::new(),
        }
    }

    pub fn stored(&self) -> Value {
        self.stored
    }
}

impl Default for DFlipFlop {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for DFlipFlop {
    fn kind(&self) -> &'static str {
        "DFF"
    }

    fn layout(&self) -> PinLayout {
        PinLayout::new(
            vec![PinSpec::scalar("D"), PinSpec::clock("CLK")],
            vec![PinSpec::scalar("Q"), PinSpec::scalar("Q'")],
        )
    }

    fn compute(&mut self, inputs: &[Signal], outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {
        let q = if self.edge.is_rising(inputs[1].scalar()) {
            self.sampled
        } else {
            self.stored
        };
        outputs[0] = Signal::Scalar(q);
        outputs[1] = Signal::Scalar(!q);
    }

    fn settle(&mut self, inputs: &[Signal]) {
        let clock = inputs[1].scalar();
        if self.edge.is_rising(clock) {
            self.stored = self.sampled;
        }
        self.sampled = inputs[0].scalar();
        self.edge.settle(clock);
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// Multi-bit register with enable. Inputs `D` (bus), `EN`, `CLK`; output `Q`.
///
/// `D` and `EN` are both sampled at the end of the pass before the edge. An
/// unknown enable stores an all-unknown word.
#[derive(Debug, Clone)]
pub struct Register {
    width: usize,
    stored: Bus,
    /// Word the next rising edge stores, if enabled
    sampled: Option<Bus>,
    edge: EdgeTrigger,
}

impl Register {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            stored: Bus::from_u64(0, width),
            sampled: None,
            edge: EdgeTrigger::new(),
        }
    }

    pub fn stored(&self) -> &Bus {
        &self.stored
    }

    fn capture(&self, inputs: &[Signal]) -> Option<Bus> {
        match inputs[1].scalar() {
            Value::True => Some(inputs[0].bus(self.width)),
            Value::False => None,
            Value::Unknown => Some(Bus::unknown(self.width)),
        }
    }
}

impl Component for Register {
    fn kind(&self) -> &'static str {
        "REG"
    }

    fn layout(&self) -> PinLayout {
        PinLayout::new(
            vec![PinSpec::bus("D", self.width), PinSpec::scalar("EN"), PinSpec::clock("CLK")],
            vec![PinSpec::bus("Q", self.width)],
        )
    }

    fn compute(&mut self, inputs: &[Signal], outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {
        let q = match &self.sampled {
            Some(word) if self.edge.is_rising(inputs[2].scalar()) => word,
            _ => &self.stored,
        };
        outputs[0] = if self.width > 1 {
            Signal::Bus(q.clone())
        } else {
            Signal::Scalar(q.get(0))
        };
    }

    fn settle(&mut self, inputs: &[Signal]) {
        let clock = inputs[2].scalar();
        if self.edge.is_rising(clock) {
            if let Some(word) = self.sampled.take() {
                self.stored = word;
            }
        }
        self.sampled = self.capture(inputs);
        self.edge.settle(clock);
    }

    fn config(&self) -> ComponentConfig {
        ComponentConfig::new().with("width", self.width)
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SimulatorConfig;

    const T: Value = Value::True;
    const F: Value = Value::False;

    /// Run `rounds` compute calls with fixed inputs, then settle.
    fn pass(part: &mut dyn Component, inputs: &[Signal], rounds: usize) -> Vec<Signal> {
        let config = SimulatorConfig::default();
        let mut faults = Vec::new();
        let mut ctx = ComputeContext::new(&config, &mut faults);
        let mut outputs = vec![Signal::UNKNOWN; part.layout().outputs.len()];
        for _ in 0..rounds {
            part.compute(inputs, &mut outputs, &mut ctx);
        }
        part.settle(inputs);
        outputs
    }

    fn dff_inputs(d: Value, clk: Value) -> Vec<Signal> {
        vec![Signal::Scalar(d), Signal::Scalar(clk)]
    }

    #[test]
    fn test_dff_stores_on_rising_edge_only() {
        let mut ff = DFlipFlop::new();
        pass(&mut ff, &dff_inputs(T, F), 1);
        assert_eq!(ff.stored(), F);

        let out = pass(&mut ff, &dff_inputs(T, T), 3);
        assert_eq!(out[0].scalar(), T);
        assert_eq!(out[1].scalar(), F);
        assert_eq!(ff.stored(), T);

        // Falling edge and a high clock never store.
        pass(&mut ff, &dff_inputs(F, T), 2);
        assert_eq!(ff.stored(), T);
        pass(&mut ff, &dff_inputs(F, F), 2);
        assert_eq!(ff.stored(), T);
    }

    #[test]
    fn test_dff_stores_data_from_before_the_edge() {
        let mut ff = DFlipFlop::new();
        pass(&mut ff, &dff_inputs(F, F), 1);

        // D rises in the same pass as the clock; the edge still stores the
        // earlier 0.
        let out = pass(&mut ff, &dff_inputs(T, T), 2);
        assert_eq!(out[0].scalar(), F);
        assert_eq!(ff.stored(), F);

        pass(&mut ff, &dff_inputs(T, F), 1);
        pass(&mut ff, &dff_inputs(F, T), 1);
        assert_eq!(ff.stored(), T);
    }

    #[test]
    fn test_dff_glitch_stores_nothing() {
        let mut ff = DFlipFlop::new();
        pass(&mut ff, &dff_inputs(T, F), 1);

        let config = SimulatorConfig::default();
        let mut faults = Vec::new();
        let mut ctx = ComputeContext::new(&config, &mut faults);
        let mut outputs = vec![Signal::UNKNOWN; 2];
        ff.compute(&dff_inputs(T, T), &mut outputs, &mut ctx);
        assert_eq!(outputs[0].scalar(), T);
        ff.compute(&dff_inputs(T, F), &mut outputs, &mut ctx);
        assert_eq!(outputs[0].scalar(), F);
        ff.settle(&dff_inputs(T, F));
        assert_eq!(ff.stored(), F);
    }

    #[test]
    fn test_register_enable() {
        let mut reg = Register::new(4);
        let word = |n: u64| Signal::Bus(Bus::from_u64(n, 4));
        let bit = |b: bool| Signal::from(b);

        pass(&mut reg, &[word(9), bit(false), bit(false)], 1);
        let out = pass(&mut reg, &[word(9), bit(true), bit(true)], 2);
        assert_eq!(out[0].to_u64(), Some(0));

        pass(&mut reg, &[word(9), bit(true), bit(false)], 1);
        let out = pass(&mut reg, &[word(5), bit(false), bit(true)], 2);
        assert_eq!(out[0].to_u64(), Some(9));
        assert_eq!(reg.stored().to_u64(), Some(9));

        pass(&mut reg, &[word(3), Signal::UNKNOWN, bit(false)], 1);
        pass(&mut reg, &[word(3), Signal::UNKNOWN, bit(true)], 1);
        assert_eq!(reg.stored().to_u64(), None);
    }
}
