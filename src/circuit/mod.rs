//! Circuit graph representation and validation.
//!
//! This module provides the internal representation of a circuit: the
//! [`Circuit`] arena of components and pins with their wiring, boundary
//! discovery for sub-circuits, the [`CircuitLibrary`] of named definitions,
//! and serializable records.

mod boundary;
mod build;
mod graph;
mod library;
mod pin;
mod record;
mod types;
mod validate;

pub use boundary::{Boundary, BoundaryPin, RebindSummary};
pub use build::Design;
pub use graph::Circuit;
pub use library::CircuitLibrary;
pub use pin::Pin;
pub use record::{CircuitRecord, ComponentRecord, PinRef, WireRecord};
pub use types::*;
pub use validate::{floating_inputs, validate_circuit};
