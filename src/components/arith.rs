//! Selection and arithmetic on buses.

use super::{Component, ComponentConfig, PinLayout, PinSpec};
use crate::engine::ComputeContext;
use crate::value::{Bus, Signal, Value};

/// 2^n-to-1 multiplexer. Inputs: `SEL` (n-bit), then `in0..`; output `out`.
///
/// With a partly unknown select the output is still known when every data
/// input the select could address agrees.
#[derive(Debug, Clone)]
pub struct Mux {
    select: usize,
}

impl Mux {
    pub fn new(select: usize) -> Self {
        Self { select }
    }

    fn data_inputs(&self) -> usize {
        1 << self.select
    }
}

impl Component for Mux {
    fn kind(&self) -> &'static str {
        "MUX"
    }

    fn layout(&self) -> PinLayout {
        let mut inputs = vec![PinSpec::bus("SEL", self.select)];
        inputs.extend((0..self.data_inputs()).map(|i| PinSpec::scalar(format!("in{}", i))));
        PinLayout::new(inputs, vec![PinSpec::scalar("out")])
    }

    fn compute(&mut self, inputs: &[Signal], outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {
        let select = inputs[0].bus(self.select);
        let data = &inputs[1..];
        let candidates = (0..self.data_inputs()).filter(|&index| {
            select
                .bits()
                .iter()
                .enumerate()
                .all(|(bit, v)| v.to_bool().map_or(true, |b| b == ((index >> bit) & 1 == 1)))
        });

        let mut result: Option<Value> = None;
        for index in candidates {
            let v = data[index].scalar();
            result = match result {
                None => Some(v),
                Some(prev) if prev == v => Some(prev),
                Some(_) => Some(Value::Unknown),
            };
        }
        outputs[0] = Signal::Scalar(result.unwrap_or(Value::Unknown));
    }

    fn config(&self) -> ComponentConfig {
        ComponentConfig::new().with("select", self.select)
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// Ripple-carry adder. Inputs `A`, `B` (buses), `CIN`; outputs `S`, `COUT`.
///
/// Bits are added one at a time with ternary logic so an unknown input bit
/// only poisons the sum bits it can actually reach.
#[derive(Debug, Clone)]
pub struct Adder {
    width: usize,
}

impl Adder {
    pub fn new(width: usize) -> Self {
        Self { width }
    }
}

impl Component for Adder {
    fn kind(&self) -> &'static str {
        "ADD"
    }

    fn layout(&self) -> PinLayout {
        PinLayout::new(
            vec![PinSpec::bus("A", self.width), PinSpec::bus("B", self.width), PinSpec::scalar("CIN")],
            vec![PinSpec::bus("S", self.width), PinSpec::scalar("COUT")],
        )
    }

    fn compute(&mut self, inputs: &[Signal], outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {
        let a = inputs[0].bus(self.width);
        let b = inputs[1].bus(self.width);
        let mut carry = inputs[2].scalar();
        let mut sum = Bus::unknown(self.width);
        for i in 0..self.width {
            let (x, y) = (a.get(i), b.get(i));
            sum.set(i, x ^ y ^ carry);
            carry = (x & y) | (carry & (x ^ y));
        }
        outputs[0] = if self.width > 1 {
            Signal::Bus(sum)
        } else {
            Signal::Scalar(sum.get(0))
        };
        outputs[1] = Signal::Scalar(carry);
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

    fn run(part: &mut dyn Component, inputs: &[Signal]) -> Vec<Signal> {
        let config = SimulatorConfig::default();
        let mut faults = Vec::new();
        let mut ctx = ComputeContext::new(&config, &mut faults);
        let mut outputs = vec![Signal::UNKNOWN; part.layout().outputs.len()];
        part.compute(inputs, &mut outputs, &mut ctx);
        outputs
    }

    #[test]
    fn test_mux_selects() {
        let mut mux = Mux::new(1);
        let data = |sel: Signal| vec![sel, Signal::from(false), Signal::from(true)];
        assert_eq!(run(&mut mux, &data(Signal::from(false)))[0].scalar(), Value::False);
        assert_eq!(run(&mut mux, &data(Signal::from(true)))[0].scalar(), Value::True);
        assert_eq!(run(&mut mux, &data(Signal::UNKNOWN))[0].scalar(), Value::Unknown);

        let agree = vec![Signal::UNKNOWN, Signal::from(true), Signal::from(true)];
        assert_eq!(run(&mut mux, &agree)[0].scalar(), Value::True);
    }

    #[test]
    fn test_adder() {
        let mut adder = Adder::new(4);
        let word = |n: u64| Signal::Bus(Bus::from_u64(n, 4));
        let out = run(&mut adder, &[word(9), word(8), Signal::from(false)]);
        assert_eq!(out[0].to_u64(), Some(1));
        assert_eq!(out[1].scalar(), Value::True);

        let out = run(&mut adder, &[word(2), word(3), Signal::from(true)]);
        assert_eq!(out[0].to_u64(), Some(6));
        assert_eq!(out[1].scalar(), Value::False);
    }

    #[test]
    fn test_adder_unknown_bit_is_contained() {
        let mut adder = Adder::new(4);
        let mut a = Bus::from_u64(0, 4);
        a.set(3, Value::Unknown);
        let out = run(
            &mut adder,
            &[Signal::Bus(a), Signal::Bus(Bus::from_u64(1, 4)), Signal::from(false)],
        );
        let sum = out[0].bus(4);
        assert_eq!(sum.get(0), Value::True);
        assert_eq!(sum.get(3), Value::Unknown);
        assert_eq!(out[1].scalar(), Value::False);
    }
}
