//! Named circuit definitions.

use std::collections::BTreeMap;

use super::graph::Circuit;
use crate::error::{LogicError, Result};

#[derive(Debug, Clone)]
struct Definition {
    circuit: Circuit,
    revision: u64,
}

/// The set of circuits a design is made of, keyed by name.
///
/// Every definition carries a revision number. Structural edits go through
/// [`CircuitLibrary::edit`], which bumps it, so references to the circuit
/// know to rebind on their next pass.
#[derive(Debug, Clone, Default)]
pub struct CircuitLibrary {
    definitions: BTreeMap<String, Definition>,
    next_revision: u64,
}

impl CircuitLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self) -> u64 {
        self.next_revision += 1;
        self.next_revision
    }

    /// Add a circuit under its own name.
    pub fn insert(&mut self, circuit: Circuit) -> Result<()> {
        let name = circuit.name().to_string();
        if self.definitions.contains_key(&name) {
            return Err(LogicError::DuplicateCircuit { name });
        }
        let revision = self.bump();
        self.definitions.insert(name, Definition { circuit, revision });
        Ok(())
    }

    /// Remove a definition. References to it become unbound.
    pub fn remove(&mut self, name: &str) -> Option<Circuit> {
        self.definitions.remove(name).map(|def| def.circuit)
    }

    pub fn get(&self, name: &str) -> Option<&Circuit> {
        self.definitions.get(name).map(|def| &def.circuit)
    }

    /// Mutable access without a revision bump, for load-time wiring only.
    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Circuit> {
        self.definitions.get_mut(name).map(|def| &mut def.circuit)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn revision(&self, name: &str) -> Option<u64> {
        self.definitions.get(name).map(|def| def.revision)
    }

    /// Edit a definition in place and bump its revision.
    pub fn edit<R>(&mut self, name: &str, f: impl FnOnce(&mut Circuit) -> R) -> Result<R> {
        let revision = self.bump();
        let def = self
            .definitions
            .get_mut(name)
            .ok_or_else(|| LogicError::UnknownCircuit { name: name.to_string() })?;
        let result = f(&mut def.circuit);
        def.revision = revision;
        def.circuit.set_name(name);
        Ok(result)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Names of the circuits `name` references directly.
    pub fn references(&self, name: &str) -> Vec<String> {
        let Some(circuit) = self.get(name) else {
            return Vec::new();
        };
        circuit
            .component_ids()
            .filter_map(|id| circuit.component(id)?.as_circuit_ref())
            .map(|r| r.target().to_string())
            .collect()
    }

    /// Find a reference path leading from `name` back to itself.
    ///
    /// Returns the cycle as a list of circuit names starting and ending with
    /// `name`, or `None` if `name` cannot reach itself.
    pub fn reference_cycle(&self, name: &str) -> Option<Vec<String>> {
        let mut path = vec![name.to_string()];
        let mut visited = Vec::new();
        if self.search_cycle(name, &mut path, &mut visited) {
            Some(path)
        } else {
            None
        }
    }

    fn search_cycle(&self, start: &str, path: &mut Vec<String>, visited: &mut Vec<String>) -> bool {
        let Some(current) = path.last().cloned() else {
            return false;
        };
        for target in self.references(&current) {
            if target == start {
                path.push(target);
                return true;
            }
            if visited.contains(&target) || !self.contains(&target) {
                continue;
            }
            visited.push(target.clone());
            path.push(target);
            if self.search_cycle(start, path, visited) {
                return true;
            }
            path.pop();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{CircuitRef, InputPort};

    fn with_ref(name: &str, target: &str) -> Circuit {
        let mut circuit = Circuit::new(name);
        circuit.add_component("r", Box::new(CircuitRef::new(target)));
        circuit
    }

    #[test]
    fn test_edit_bumps_revision() {
        let mut library = CircuitLibrary::new();
        library.insert(Circuit::new("sub")).unwrap();
        let before = library.revision("sub").unwrap();

        let id = library
            .edit("sub", |c| c.add_component("a", Box::new(InputPort::new(1))))
            .unwrap();
        assert!(library.revision("sub").unwrap() > before);
        assert_eq!(library.get("sub").unwrap().label(id), Some("a"));

        assert!(matches!(
            library.insert(Circuit::new("sub")),
            Err(LogicError::DuplicateCircuit { .. })
        ));
        assert!(library.edit("missing", |_| ()).is_err());
    }

    #[test]
    fn test_reference_cycles() {
        let mut library = CircuitLibrary::new();
        library.insert(with_ref("a", "b")).unwrap();
        library.insert(with_ref("b", "c")).unwrap();
        library.insert(with_ref("c", "a")).unwrap();
        library.insert(with_ref("d", "a")).unwrap();
        library.insert(with_ref("self", "self")).unwrap();

        assert_eq!(
            library.reference_cycle("a"),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string(), "a".to_string()])
        );
        assert_eq!(library.reference_cycle("d"), None);
        assert_eq!(
            library.reference_cycle("self"),
            Some(vec!["self".to_string(), "self".to_string()])
        );
    }
}
