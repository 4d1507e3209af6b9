//! Abstract Syntax Tree types for the netlist DSL.

use std::collections::BTreeMap;

/// Name of the circuit that collects lines outside any `.circuit` block.
pub const IMPLICIT_CIRCUIT: &str = "main";

/// Net placeholder that leaves a pin unconnected.
pub const NO_NET: &str = "_";

/// Complete AST representation of a parsed netlist.
#[derive(Debug, Clone, Default)]
pub struct NetlistAst {
    /// Circuit definitions in source order
    pub circuits: Vec<CircuitDef>,
    /// Circuit named by `.top`
    pub top: Option<String>,
    /// Nets named by `.probe`, in order
    pub probes: Vec<String>,
}

impl NetlistAst {
    /// Create a new empty netlist AST.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn circuit(&self, name: &str) -> Option<&CircuitDef> {
        self.circuits.iter().find(|c| c.name == name)
    }

    /// The circuit to simulate: `.top` if given, else the only circuit,
    /// else the implicit one.
    pub fn top_name(&self) -> Option<&str> {
        if let Some(top) = &self.top {
            return Some(top);
        }
        match self.circuits.as_slice() {
            [only] => Some(&only.name),
            _ => self.circuit(IMPLICIT_CIRCUIT).map(|c| c.name.as_str()),
        }
    }
}

/// One `.circuit` block.
#[derive(Debug, Clone)]
pub struct CircuitDef {
    pub name: String,
    pub components: Vec<ComponentDef>,
    /// Source line of the `.circuit` directive (0 for the implicit circuit)
    pub line: usize,
}

impl CircuitDef {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
            line,
        }
    }
}

/// A component line.
#[derive(Debug, Clone)]
pub struct ComponentDef {
    /// Component type as written (`AND`, `DFF`, `REF`, ...)
    pub kind: String,
    /// Unique component name
    pub name: String,
    /// Net names: inputs first, then outputs, in pin order
    pub nets: Vec<String>,
    /// `key=value` parameters
    pub params: BTreeMap<String, String>,
    /// Source line number for error reporting
    pub line: usize,
}

impl ComponentDef {
    /// Target circuit of a `REF` line.
    pub fn target(&self) -> Option<&str> {
        self.params.get("target").map(String::as_str)
    }

    pub fn is_reference(&self) -> bool {
        self.kind.eq_ignore_ascii_case("REF")
    }
}
