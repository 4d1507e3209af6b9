//! Multi-bit buses of ternary values.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Value;

/// Widest bus that still round-trips through an integer.
pub const MAX_INT_WIDTH: usize = 64;

/// An ordered vector of ternary values; index 0 is the least significant bit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Bus {
    bits: Vec<Value>,
}

impl Bus {
    /// A bus of `width` unknown bits.
    pub fn unknown(width: usize) -> Self {
        Self {
            bits: vec![Value::Unknown; width],
        }
    }

    pub fn from_bits(bits: Vec<Value>) -> Self {
        Self { bits }
    }

    /// Little-endian encoding of the low `width` bits of `value`.
    pub fn from_u64(value: u64, width: usize) -> Self {
        let bits = (0..width)
            .map(|i| {
                if i >= MAX_INT_WIDTH {
                    Value::False
                } else {
                    Value::from((value >> i) & 1 == 1)
                }
            })
            .collect();
        Self { bits }
    }

    /// Two's complement encoding of `value` into `width` bits.
    pub fn from_i64(value: i64, width: usize) -> Self {
        let bus = Self::from_u64(value as u64, width.min(MAX_INT_WIDTH));
        if width > MAX_INT_WIDTH {
            bus.sign_extend(width)
        } else {
            bus
        }
    }

    pub fn width(&self) -> usize {
        self.bits.len()
    }

    pub fn bits(&self) -> &[Value] {
        &self.bits
    }

    /// Read bit `index`; bits past the end read as unknown.
    pub fn get(&self, index: usize) -> Value {
        self.bits.get(index).copied().unwrap_or(Value::Unknown)
    }

    /// Write bit `index`, ignoring writes past the end.
    pub fn set(&mut self, index: usize, value: Value) {
        if let Some(bit) = self.bits.get_mut(index) {
            *bit = value;
        }
    }

    pub fn is_known(&self) -> bool {
        self.bits.iter().all(|b| b.is_known())
    }

    /// Unsigned little-endian read-back; `None` if any bit is unknown or the
    /// bus is too wide for a `u64`.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width() > MAX_INT_WIDTH {
            return None;
        }
        self.bits.iter().enumerate().try_fold(0u64, |acc, (i, bit)| {
            bit.to_bool().map(|b| acc | (u64::from(b) << i))
        })
    }

    /// Signed (two's complement) read-back.
    pub fn to_i64(&self) -> Option<i64> {
        let raw = self.to_u64()?;
        let width = self.width();
        if width == 0 {
            return Some(0);
        }
        if width == MAX_INT_WIDTH {
            return Some(raw as i64);
        }
        let sign = 1u64 << (width - 1);
        Some(if raw & sign != 0 {
            (raw | !((1u64 << width) - 1)) as i64
        } else {
            raw as i64
        })
    }

    /// Widen (or truncate) to `width`, replicating the most significant bit.
    pub fn sign_extend(&self, width: usize) -> Bus {
        let fill = self.bits.last().copied().unwrap_or(Value::False);
        self.resized(width, fill)
    }

    /// Widen (or truncate) to `width`, padding with `False`.
    pub fn zero_extend(&self, width: usize) -> Bus {
        self.resized(width, Value::False)
    }

    fn resized(&self, width: usize, fill: Value) -> Bus {
        let mut bits = self.bits.clone();
        bits.resize(width, fill);
        Bus { bits }
    }

    /// Bits `[start, start + len)`, unknown past the end.
    pub fn slice(&self, start: usize, len: usize) -> Bus {
        Bus {
            bits: (start..start + len).map(|i| self.get(i)).collect(),
        }
    }

    /// Concatenate `high` above `self`.
    pub fn concat(&self, high: &Bus) -> Bus {
        let mut bits = self.bits.clone();
        bits.extend_from_slice(&high.bits);
        Bus { bits }
    }

    /// Parse an MSB-first string such as `"10x1"`.
    pub fn parse(text: &str) -> Option<Bus> {
        let bits = text
            .chars()
            .rev()
            .filter(|c| *c != '_')
            .map(Value::from_char)
            .collect::<Option<Vec<_>>>()?;
        Some(Bus { bits })
    }
}

impl FromIterator<Value> for Bus {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Bus {
            bits: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Bus {
    /// MSB first, the way buses are written on a schematic.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits.iter().rev() {
            write!(f, "{}", bit)?;
        }
        Ok(())
    }
}
