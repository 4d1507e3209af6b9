//! WASM bindings for logicsim.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmLogicSim } from 'logicsim_core';
//!
//! await init();
//!
//! const sim = new WasmLogicSim(`
//!   SWITCH a a
//!   SWITCH b b
//!   AND g a b y
//!   .probe y
//! `);
//!
//! sim.set("a", "1");
//! sim.set("b", "1");
//! sim.probe("y"); // "1"
//! sim.advance(16.7);
//! ```

use wasm_bindgen::prelude::*;

use crate::engine::{SetOutcome, Simulator, SimulatorConfig};
use crate::error::LogicError;
use crate::value::Signal;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(error: LogicError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// WASM-compatible logic simulator.
#[wasm_bindgen]
pub struct WasmLogicSim {
    simulator: Simulator,
}

#[wasm_bindgen]
impl WasmLogicSim {
    /// Load a netlist and run the first propagation pass.
    #[wasm_bindgen(constructor)]
    pub fn new(netlist: &str) -> Result<WasmLogicSim, JsValue> {
        Self::with_max_rounds(netlist, crate::engine::DEFAULT_MAX_ROUNDS)
    }

    /// Load a netlist with a custom round ceiling.
    #[wasm_bindgen]
    pub fn with_max_rounds(netlist: &str, max_rounds: usize) -> Result<WasmLogicSim, JsValue> {
        let design = crate::circuit::Design::from_netlist(netlist).map_err(to_js)?;
        let config = SimulatorConfig::new().with_max_rounds(max_rounds);
        let mut simulator = Simulator::with_config(design.library, &design.top, config).map_err(to_js)?;
        simulator.propagate();
        Ok(WasmLogicSim { simulator })
    }

    /// Set a source by label. `value` uses netlist literal syntax
    /// (`1`, `0`, `x`, `0b0101`, `0xA`). Returns true if the value applied
    /// immediately, false if it was scheduled.
    #[wasm_bindgen]
    pub fn set(&mut self, label: &str, value: &str) -> Result<bool, JsValue> {
        let signal = Signal::parse(value, None)
            .ok_or_else(|| JsValue::from_str(&format!("cannot parse value '{}'", value)))?;
        let outcome = self.simulator.set_by_label(label, signal).map_err(to_js)?;
        Ok(matches!(outcome, SetOutcome::Applied(_)))
    }

    /// Advance simulated time by `dt` milliseconds. Returns the number of
    /// faults reported along the way.
    #[wasm_bindgen]
    pub fn advance(&mut self, dt: f64) -> Result<usize, JsValue> {
        let report = self.simulator.advance(dt).map_err(to_js)?;
        Ok(report.faults.len())
    }

    /// Current value of a net or component as text, or `undefined`.
    #[wasm_bindgen]
    pub fn probe(&self, name: &str) -> Option<String> {
        self.simulator.probe(name).ok().map(|value| value.to_string())
    }

    /// Current simulated time in milliseconds.
    #[wasm_bindgen(getter)]
    pub fn now(&self) -> f64 {
        self.simulator.now()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
