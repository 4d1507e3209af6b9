//! Bus plumbing: splitting, merging, and width extension.

use super::{Component, ComponentConfig, PinLayout, PinSpec};
use crate::engine::ComputeContext;
use crate::value::{Bus, Signal};

/// Fans a bus out into one scalar per bit (`out0` is the LSB).
#[derive(Debug, Clone)]
pub struct Splitter {
    width: usize,
}

impl Splitter {
    pub fn new(width: usize) -> Self {
        Self { width }
    }
}

impl Component for Splitter {
    fn kind(&self) -> &'static str {
        "SPLIT"
    }

    fn layout(&self) -> PinLayout {
        let outputs = (0..self.width).map(|i| PinSpec::scalar(format!("out{}", i))).collect();
        PinLayout::new(vec![PinSpec::bus("in", self.width)], outputs)
    }

    fn compute(&mut self, inputs: &[Signal], outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {
        let bus = inputs[0].bus(self.width);
        for (i, out) in outputs.iter_mut().enumerate() {
            *out = Signal::Scalar(bus.get(i));
        }
    }

    fn config(&self) -> ComponentConfig {
        ComponentConfig::new().with("width", self.width)
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// Gathers scalars into a bus (`in0` is the LSB).
#[derive(Debug, Clone)]
pub struct Merger {
    width: usize,
}

impl Merger {
    pub fn new(width: usize) -> Self {
        Self { width }
    }
}

impl Component for Merger {
    fn kind(&self) -> &'static str {
        "MERGE"
    }

    fn layout(&self) -> PinLayout {
        let inputs = (0..self.width).map(|i| PinSpec::scalar(format!("in{}", i))).collect();
        PinLayout::new(inputs, vec![PinSpec::bus("out", self.width)])
    }

    fn compute(&mut self, inputs: &[Signal], outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {
        let bus: Bus = inputs.iter().map(Signal::scalar).collect();
        outputs[0] = if self.width > 1 {
            Signal::Bus(bus)
        } else {
            Signal::Scalar(bus.get(0))
        };
    }

    fn config(&self) -> ComponentConfig {
        ComponentConfig::new().with("width", self.width)
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// Widens (or narrows) a bus with sign or zero extension.
#[derive(Debug, Clone)]
pub struct Extend {
    from: usize,
    to: usize,
    signed: bool,
}

impl Extend {
    pub fn new(from: usize, to: usize, signed: bool) -> Self {
        Self { from, to, signed }
    }
}

impl Component for Extend {
    fn kind(&self) -> &'static str {
        "EXTEND"
    }

    fn layout(&self) -> PinLayout {
        PinLayout::new(vec![PinSpec::bus("in", self.from)], vec![PinSpec::bus("out", self.to)])
    }

    fn compute(&mut self, inputs: &[Signal], outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {
        let input = inputs[0].bus(self.from);
        let extended = if self.signed {
            input.sign_extend(self.to)
        } else {
            input.zero_extend(self.to)
        };
        outputs[0] = if self.to > 1 {
            Signal::Bus(extended)
        } else {
            Signal::Scalar(extended.get(0))
        };
    }

    fn config(&self) -> ComponentConfig {
        ComponentConfig::new()
            .with("from", self.from)
            .with("to", self.to)
            .with("signed", self.signed)
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SimulatorConfig;
    use crate::value::Value;

    fn run(part: &mut dyn Component, inputs: &[Signal]) -> Vec<Signal> {
        let config = SimulatorConfig::default();
        let mut faults = Vec::new();
        let mut ctx = ComputeContext::new(&config, &mut faults);
        let mut outputs = vec![Signal::UNKNOWN; part.layout().outputs.len()];
        part.compute(inputs, &mut outputs, &mut ctx);
        outputs
    }

    #[test]
    fn test_split_and_merge() {
        let out = run(&mut Splitter::new(3), &[Signal::Bus(Bus::from_u64(0b110, 3))]);
        assert_eq!(
            out.iter().map(Signal::scalar).collect::<Vec<_>>(),
            vec![Value::False, Value::True, Value::True]
        );

        let out = run(&mut Merger::new(3), &out);
        assert_eq!(out[0].to_u64(), Some(0b110));

        let out = run(
            &mut Merger::new(2),
            &[Signal::from(true), Signal::UNKNOWN],
        );
        assert_eq!(out[0].to_u64(), None);
    }

    #[test]
    fn test_extend() {
        let input = [Signal::Bus(Bus::from_u64(0b1001, 4))];
        let signed = run(&mut Extend::new(4, 8, true), &input);
        assert_eq!(signed[0].to_u64(), Some(0b1111_1001));
        let unsigned = run(&mut Extend::new(4, 8, false), &input);
        assert_eq!(unsigned[0].to_u64(), Some(0b0000_1001));
    }
}
