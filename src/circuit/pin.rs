//! Pins and the edges recorded on them.

use super::types::{ComponentId, Direction, PinId, PinKind};
use crate::value::Signal;

/// One pin of a placed component.
///
/// Nets are not stored separately: an input pin records its single driver
/// and an output pin records its fan-out.
#[derive(Debug, Clone)]
pub struct Pin {
    owner: ComponentId,
    direction: Direction,
    pub(crate) kind: PinKind,
    pub(crate) clock: bool,
    pub(crate) name: String,
    /// Inner boundary port this pin stands for, on sub-circuit references
    pub(crate) binding: Option<ComponentId>,
    pub(crate) driver: Option<PinId>,
    pub(crate) fanout: Vec<PinId>,
    /// Driven value; only meaningful on output pins
    pub(crate) value: Signal,
}

impl Pin {
    pub(crate) fn new(owner: ComponentId, direction: Direction, kind: PinKind, name: String) -> Self {
        Self {
            owner,
            direction,
            kind,
            clock: false,
            name,
            binding: None,
            driver: None,
            fanout: Vec::new(),
            value: kind.low(),
        }
    }

    pub fn owner(&self) -> ComponentId {
        self.owner
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn kind(&self) -> PinKind {
        self.kind
    }

    pub fn is_clock(&self) -> bool {
        self.clock
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binding(&self) -> Option<ComponentId> {
        self.binding
    }

    /// Driving output pin of an input pin.
    pub fn driver(&self) -> Option<PinId> {
        self.driver
    }

    /// Input pins driven by an output pin.
    pub fn fanout(&self) -> &[PinId] {
        &self.fanout
    }

    pub fn is_connected(&self) -> bool {
        self.driver.is_some() || !self.fanout.is_empty()
    }

    /// Reset the driven value to the power-up level, as after a retype.
    pub(crate) fn reset_value(&mut self) {
        self.value = self.kind.low();
    }
}
