//! Error types for the logic simulator.
//!
//! Two kinds of failure exist and they are kept apart:
//!
//! - [`LogicError`] (and the wiring-specific [`ConnectionError`]) covers
//!   configuration mistakes: bad netlists, bad parameters, illegal wiring.
//!   These come back as `Err`.
//! - [`SimFault`] covers simulation-level conditions (a circuit that does not
//!   stabilize, a sub-circuit reference that cannot be resolved). These are
//!   reported inside pass and advance reports; the simulation keeps running.

use thiserror::Error;

use crate::circuit::{Direction, PinId, PinKind};

/// Result type alias using [`LogicError`].
pub type Result<T> = std::result::Result<T, LogicError>;

/// Errors raised while wiring pins together.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Bus pin wired to a scalar pin or vice versa
    #[error("Cannot connect {from_kind} pin {from} to {to_kind} pin {to}: bus/scalar mismatch")]
    PolarityMismatch {
        from: PinId,
        to: PinId,
        from_kind: PinKind,
        to_kind: PinKind,
    },

    /// Pin used against its direction (connect is always out -> in)
    #[error("Pin {pin} is an {actual} pin, expected an {expected} pin")]
    Direction {
        pin: PinId,
        expected: Direction,
        actual: Direction,
    },

    /// Pin id does not exist (or its component was removed)
    #[error("Pin {pin} does not exist")]
    UnknownPin { pin: PinId },

    /// More than one output pin drives the same net
    #[error("Net '{net}' has more than one driver")]
    MultipleDrivers { net: String },
}

/// Unified error type for configuration and loading.
#[derive(Error, Debug)]
pub enum LogicError {
    // ============ Netlist Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Invalid component definition
    #[error("Invalid component '{name}' at line {line}: {message}")]
    InvalidComponent {
        name: String,
        line: usize,
        message: String,
    },

    /// Unknown component type
    #[error("Unknown component type '{component_type}' at line {line}")]
    UnknownComponentType { component_type: String, line: usize },

    /// Invalid parameter value
    #[error("Invalid parameter '{param}' for component '{component}': {message}")]
    InvalidParameter {
        component: String,
        param: String,
        message: String,
    },

    // ============ Circuit Structure Errors ============
    /// Named circuit is not in the library
    #[error("Circuit '{name}' not found in library")]
    UnknownCircuit { name: String },

    /// Circuit name defined twice
    #[error("Duplicate circuit name '{name}'")]
    DuplicateCircuit { name: String },

    /// Component label defined twice in one circuit
    #[error("Duplicate component name '{name}'")]
    DuplicateComponent { name: String },

    /// Component not found by id or label
    #[error("Component '{name}' not found in circuit")]
    UnknownComponent { name: String },

    /// Net not found by name
    #[error("Net '{net}' not found in circuit")]
    UnknownNet { net: String },

    /// No top-level circuit was selected
    #[error("No top-level circuit specified (use '.top <name>')")]
    MissingTop,

    /// Illegal wiring
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    // ============ Simulation Errors ============
    /// Component does not accept injected values, or the value has the wrong shape
    #[error("Cannot set '{component}': {message}")]
    InvalidInjection { component: String, message: String },

    /// Invalid simulation parameter
    #[error("Invalid simulation parameter: {message}")]
    InvalidSimulationParam { message: String },

    // ============ I/O Errors ============
    /// Error reading netlist file
    #[error("Failed to read netlist file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing waveform output
    #[error("Waveform output error: {message}")]
    OutputError { message: String },
}

impl LogicError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid component error
    pub fn invalid_component(name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidComponent {
            name: name.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        component: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            component: component.into(),
            param: param.into(),
            message: message.into(),
        }
    }
}

/// Non-fatal simulation faults.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimFault {
    /// Propagation pass hit the round ceiling without reaching a fixed point
    #[error("Circuit did not stabilize after {rounds} rounds")]
    Stall { rounds: usize },

    /// A sub-circuit reference names a circuit that does not exist
    #[error("Reference '{component}' names unknown circuit '{target}'")]
    UnboundReference { component: String, target: String },

    /// The circuit reference graph contains a cycle
    #[error("Cyclic circuit reference: {}", .cycle.join(" -> "))]
    CyclicReference { component: String, cycle: Vec<String> },
}
