//! Core types for circuit representation.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{Bus, Signal, Value};

/// A unique identifier for a component within one circuit.
///
/// Ids are arena indices that are never reused, so they stay stable across
/// edits and are preserved when a circuit is cloned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// A unique identifier for a pin within one circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PinId(pub usize);

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Signal flow direction of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    In,
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}

/// Polarity of a pin: a single wire or a bus of `width` wires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinKind {
    Scalar,
    Bus(usize),
}

impl PinKind {
    /// Build from a configured width; width 0 or 1 is a plain wire.
    pub fn from_width(width: usize) -> Self {
        if width <= 1 {
            PinKind::Scalar
        } else {
            PinKind::Bus(width)
        }
    }

    pub fn is_bus(self) -> bool {
        matches!(self, PinKind::Bus(_))
    }

    pub fn width(self) -> usize {
        match self {
            PinKind::Scalar => 1,
            PinKind::Bus(w) => w,
        }
    }

    /// Two pins may be wired together only if both are buses or both are
    /// scalars.
    pub fn same_polarity(self, other: PinKind) -> bool {
        self.is_bus() == other.is_bus()
    }

    /// The value an undriven pin of this kind reads.
    pub fn unknown(self) -> Signal {
        match self {
            PinKind::Scalar => Signal::UNKNOWN,
            PinKind::Bus(w) => Signal::Bus(Bus::unknown(w)),
        }
    }

    /// The level an output pin powers up at: 0 on every bit.
    pub fn low(self) -> Signal {
        match self {
            PinKind::Scalar => Signal::Scalar(Value::False),
            PinKind::Bus(w) => Signal::Bus(Bus::from_bits(vec![Value::False; w])),
        }
    }
}

impl fmt::Display for PinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinKind::Scalar => write!(f, "scalar"),
            PinKind::Bus(w) => write!(f, "bus[{}]", w),
        }
    }
}

/// Grid position of a component on the editor canvas.
///
/// Only boundary ordering reads it: ports sort row-major, top-to-bottom then
/// left-to-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
