//! # Logicsim Core
//!
//! A three-valued digital logic simulator.
//!
//! This library provides:
//! - Ternary signal values (`0`, `1`, unknown) on scalar pins and buses
//! - A circuit graph of components, pins, and nets
//! - A fixed-point propagation engine with a stall ceiling
//! - Clocks, debounced inputs, and a time-ordered event queue
//! - Sub-circuit references that follow edits to their definitions
//! - A line-oriented netlist language
//!
//! ## Architecture
//!
//! - [`value`] - Ternary values, buses, and signals
//! - [`circuit`] - Circuit graph, library, boundaries, and records
//! - [`components`] - Gates, sources, sequential parts, bus plumbing, references
//! - [`dsl`] - Parser for the netlist language
//! - [`engine`] - Propagation passes, scheduling, and the [`Simulator`]
//! - [`waveform`] - Tabular probe output (CLI only)
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! RUST_LOG=logicsim_core=debug logicsim counter.lsn --steps 20 --dt 5 --probe q
//! ```
//!
//! ### Library
//!
//! ```
//! use logicsim_core::{Simulator, value::{Signal, Value}};
//!
//! let mut sim = Simulator::from_netlist("SWITCH a a\nSWITCH b b\nAND g a b y\n").unwrap();
//! sim.set_by_label("a", Signal::from(true)).unwrap();
//! sim.set_by_label("b", Signal::from(true)).unwrap();
//! assert_eq!(sim.probe("y").unwrap().scalar(), Value::True);
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmLogicSim } from 'logicsim_core';
//!
//! const sim = new WasmLogicSim(netlist);
//! sim.set("a", "1");
//! sim.advance(16.7);
//! ```
//!
//! ## Simulation Method
//!
//! Each propagation pass evaluates every component in arena order, round
//! after round, until a round changes nothing or the round ceiling is hit:
//!
//! 1. Resolve sub-circuit references against the library
//! 2. Run rounds until a fixed point (settled) or the ceiling (stalled)
//! 3. Let edge-triggered parts commit what they captured
//!
//! Simulated time is in milliseconds. Advancing splits each interval at
//! every timer expiry and queued event.

pub mod circuit;
pub mod components;
pub mod dsl;
pub mod engine;
pub mod error;
pub mod value;

#[cfg(feature = "cli")]
pub mod waveform;

// Re-export main types for convenience
pub use circuit::{Circuit, CircuitLibrary, ComponentId, PinId};
pub use engine::{Simulator, SimulatorConfig, DEFAULT_MAX_ROUNDS, TIME_UNITS_PER_SECOND};
pub use error::{LogicError, Result, SimFault};
pub use value::{Bus, Signal, Value};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmLogicSim;
