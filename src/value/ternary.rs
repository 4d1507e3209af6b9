//! Three-valued scalar logic.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

use serde::{Deserialize, Serialize};

/// A single logic level.
///
/// `Unknown` means "not yet determined" (an undriven wire, an uninitialized
/// latch, or a gate whose inputs do not force its output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Value {
    False,
    True,
    #[default]
    Unknown,
}

impl Value {
    /// Convert to a plain boolean, or `None` when unknown.
    pub fn to_bool(self) -> Option<bool> {
        match self {
            Value::False => Some(false),
            Value::True => Some(true),
            Value::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        self != Value::Unknown
    }

    /// Ternary AND: a single `False` forces the result.
    pub fn and(self, other: Value) -> Value {
        match (self, other) {
            (Value::False, _) | (_, Value::False) => Value::False,
            (Value::True, Value::True) => Value::True,
            _ => Value::Unknown,
        }
    }

    /// Ternary OR: a single `True` forces the result.
    pub fn or(self, other: Value) -> Value {
        match (self, other) {
            (Value::True, _) | (_, Value::True) => Value::True,
            (Value::False, Value::False) => Value::False,
            _ => Value::Unknown,
        }
    }

    /// Ternary XOR: never forced by one side alone.
    pub fn xor(self, other: Value) -> Value {
        match (self.to_bool(), other.to_bool()) {
            (Some(a), Some(b)) => Value::from(a != b),
            _ => Value::Unknown,
        }
    }

    pub fn invert(self) -> Value {
        match self {
            Value::False => Value::True,
            Value::True => Value::False,
            Value::Unknown => Value::Unknown,
        }
    }

    /// Parse the single-character form used by the netlist and the CLI.
    pub fn from_char(c: char) -> Option<Value> {
        match c {
            '0' => Some(Value::False),
            '1' => Some(Value::True),
            'x' | 'X' | '?' => Some(Value::Unknown),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Value::False => '0',
            Value::True => '1',
            Value::Unknown => 'x',
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        if b {
            Value::True
        } else {
            Value::False
        }
    }
}

impl From<Option<bool>> for Value {
    fn from(b: Option<bool>) -> Self {
        b.map(Value::from).unwrap_or(Value::Unknown)
    }
}

impl Not for Value {
    type Output = Value;

    fn not(self) -> Value {
        self.invert()
    }
}

impl BitAnd for Value {
    type Output = Value;

    fn bitand(self, rhs: Value) -> Value {
        self.and(rhs)
    }
}

impl BitOr for Value {
    type Output = Value;

    fn bitor(self, rhs: Value) -> Value {
        self.or(rhs)
    }
}

impl BitXor for Value {
    type Output = Value;

    fn bitxor(self, rhs: Value) -> Value {
        self.xor(rhs)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
