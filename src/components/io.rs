//! Sources and sinks: constants, user inputs, and probes.

use super::{Component, ComponentConfig, Injection, PinLayout, PinSpec};
use crate::engine::ComputeContext;
use crate::value::{Bus, Signal, Value};

/// Drives a fixed value.
#[derive(Debug, Clone)]
pub struct Constant {
    value: Signal,
    width: usize,
}

impl Constant {
    pub fn new(value: Signal, width: usize) -> Self {
        let value = if width > 1 {
            let bus = match value {
                Signal::Bus(b) => b,
                Signal::Scalar(v) => Bus::from_iter([v]),
            };
            Signal::Bus(bus.zero_extend(width))
        } else {
            Signal::Scalar(value.scalar())
        };
        Self { value, width }
    }

    pub fn scalar(value: Value) -> Self {
        Self::new(Signal::Scalar(value), 1)
    }
}

impl Component for Constant {
    fn kind(&self) -> &'static str {
        "CONST"
    }

    fn layout(&self) -> PinLayout {
        PinLayout::new(vec![], vec![PinSpec::bus("out", self.width)])
    }

    fn compute(&mut self, _inputs: &[Signal], outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {
        outputs[0] = self.value.clone();
    }

    fn config(&self) -> ComponentConfig {
        let value = match &self.value {
            Signal::Scalar(v) => v.as_char().to_string(),
            Signal::Bus(b) => format!("0b{}", b),
        };
        ComponentConfig::new().with("width", self.width).with("value", value)
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// A latching toggle switch; values apply immediately.
#[derive(Debug, Clone)]
pub struct Switch {
    state: Value,
}

impl Switch {
    pub fn new(on: bool) -> Self {
        Self {
            state: Value::from(on),
        }
    }

    pub fn state(&self) -> Value {
        self.state
    }
}

impl Component for Switch {
    fn kind(&self) -> &'static str {
        "SWITCH"
    }

    fn layout(&self) -> PinLayout {
        PinLayout::new(vec![], vec![PinSpec::scalar("out")])
    }

    fn compute(&mut self, _inputs: &[Signal], outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {
        outputs[0] = Signal::Scalar(self.state);
    }

    fn injection(&self, value: &Signal) -> Injection {
        match value {
            Signal::Scalar(_) => Injection::Immediate,
            Signal::Bus(_) => Injection::Rejected("switch takes a single bit".to_string()),
        }
    }

    fn inject(&mut self, value: &Signal) {
        self.state = value.scalar();
    }

    fn config(&self) -> ComponentConfig {
        match self.state.to_bool() {
            Some(on) => ComponentConfig::new().with("state", u8::from(on)),
            None => ComponentConfig::new(),
        }
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// A momentary push button.
///
/// Presses apply immediately; releases are held back by `release_delay` time
/// units to model contact debounce.
#[derive(Debug, Clone)]
pub struct Button {
    pressed: bool,
    release_delay: f64,
}

impl Button {
    pub fn new(release_delay: f64) -> Self {
        Self {
            pressed: false,
            release_delay: release_delay.max(0.0),
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

impl Component for Button {
    fn kind(&self) -> &'static str {
        "BUTTON"
    }

    fn layout(&self) -> PinLayout {
        PinLayout::new(vec![], vec![PinSpec::scalar("out")])
    }

    fn compute(&mut self, _inputs: &[Signal], outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {
        outputs[0] = Signal::from(self.pressed);
    }

    fn injection(&self, value: &Signal) -> Injection {
        match value {
            Signal::Scalar(Value::True) => Injection::Immediate,
            Signal::Scalar(Value::False) if self.release_delay > 0.0 => Injection::Delayed(self.release_delay),
            Signal::Scalar(Value::False) => Injection::Immediate,
            _ => Injection::Rejected("button is either pressed (1) or released (0)".to_string()),
        }
    }

    fn inject(&mut self, value: &Signal) {
        self.pressed = value.scalar() == Value::True;
    }

    fn config(&self) -> ComponentConfig {
        ComponentConfig::new().with("release", self.release_delay)
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// A 16-key hex keypad.
///
/// Outputs the 4-bit code of the last key and a `pressed` strobe. Both are
/// committed `delay` time units after the touch, modeling debounce. Inject a
/// key code to press, or an unknown value to release.
#[derive(Debug, Clone)]
pub struct Keypad {
    code: Option<u8>,
    pressed: bool,
    delay: f64,
}

impl Keypad {
    /// Debounce delay applied when none is configured.
    pub const DEFAULT_DELAY: f64 = 50.0;

    pub fn new(delay: f64) -> Self {
        Self {
            code: None,
            pressed: false,
            delay: delay.max(0.0),
        }
    }
}

impl Component for Keypad {
    fn kind(&self) -> &'static str {
        "KEYPAD"
    }

    fn layout(&self) -> PinLayout {
        PinLayout::new(vec![], vec![PinSpec::bus("code", 4), PinSpec::scalar("pressed")])
    }

    fn compute(&mut self, _inputs: &[Signal], outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {
        outputs[0] = match self.code {
            Some(code) => Signal::Bus(Bus::from_u64(u64::from(code), 4)),
            None => Signal::Bus(Bus::unknown(4)),
        };
        outputs[1] = Signal::from(self.pressed);
    }

    fn injection(&self, value: &Signal) -> Injection {
        let valid = match value.to_u64() {
            Some(code) => code < 16,
            None => !value.is_known(),
        };
        if !valid {
            Injection::Rejected("keypad codes range from 0 to 15".to_string())
        } else if self.delay > 0.0 {
            Injection::Delayed(self.delay)
        } else {
            Injection::Immediate
        }
    }

    fn inject(&mut self, value: &Signal) {
        match value.to_u64() {
            Some(code) => {
                self.code = Some(code as u8);
                self.pressed = true;
            }
            None => self.pressed = false,
        }
    }

    fn config(&self) -> ComponentConfig {
        ComponentConfig::new().with("delay", self.delay)
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}

/// Observes a net; the value seen at the end of the last pass is kept for
/// display.
#[derive(Debug, Clone)]
pub struct Probe {
    width: usize,
    last: Signal,
}

impl Probe {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            last: Signal::UNKNOWN,
        }
    }

    pub fn value(&self) -> &Signal {
        &self.last
    }
}

impl Component for Probe {
    fn kind(&self) -> &'static str {
        "PROBE"
    }

    fn layout(&self) -> PinLayout {
        PinLayout::new(vec![PinSpec::bus("in", self.width)], vec![])
    }

    fn compute(&mut self, _inputs: &[Signal], _outputs: &mut [Signal], _ctx: &mut ComputeContext<'_>) {}

    fn settle(&mut self, inputs: &[Signal]) {
        self.last = inputs[0].clone();
    }

    fn config(&self) -> ComponentConfig {
        ComponentConfig::new().with("width", self.width)
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }
}
