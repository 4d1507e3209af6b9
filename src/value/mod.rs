//! Signal values carried on pins.
//!
//! A pin is either scalar (one [`Value`]) or a bus (a [`Bus`] of values).
//! [`Signal`] is the union the propagation engine moves between pins.

mod bus;
mod ternary;

pub use bus::{Bus, MAX_INT_WIDTH};
pub use ternary::Value;

use std::fmt;

use serde::{Deserialize, Serialize};

/// The value held by a pin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Scalar(Value),
    Bus(Bus),
}

impl Signal {
    pub const UNKNOWN: Signal = Signal::Scalar(Value::Unknown);

    /// Scalar view. A one-bit bus reads as its only bit; wider buses are
    /// not scalars and read as unknown.
    pub fn scalar(&self) -> Value {
        match self {
            Signal::Scalar(v) => *v,
            Signal::Bus(b) if b.width() == 1 => b.get(0),
            Signal::Bus(_) => Value::Unknown,
        }
    }

    /// Bus view of `width` bits. A scalar reads as a one-bit bus.
    pub fn bus(&self, width: usize) -> Bus {
        match self {
            Signal::Bus(b) if b.width() == width => b.clone(),
            Signal::Bus(b) => b.slice(0, width),
            Signal::Scalar(v) => Bus::from_iter([*v]).slice(0, width),
        }
    }

    pub fn is_known(&self) -> bool {
        match self {
            Signal::Scalar(v) => v.is_known(),
            Signal::Bus(b) => b.is_known(),
        }
    }

    /// Integer read-back; `None` when any bit is unknown.
    pub fn to_u64(&self) -> Option<u64> {
        match self {
            Signal::Scalar(v) => v.to_bool().map(u64::from),
            Signal::Bus(b) => b.to_u64(),
        }
    }

    /// Parse `"1"`, `"0"`, `"x"` as scalars and `0b…`, `0x…`, decimal, or
    /// MSB-first bit strings as buses of `width` bits.
    pub fn parse(text: &str, width: Option<usize>) -> Option<Signal> {
        let text = text.trim();
        match width {
            None | Some(0) => {
                let mut chars = text.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                Value::from_char(c).map(Signal::Scalar)
            }
            Some(width) => {
                let number = if let Some(hex) = text.strip_prefix("0x") {
                    u64::from_str_radix(hex, 16).ok()
                } else if let Some(bin) = text.strip_prefix("0b") {
                    if bin.contains(['x', 'X']) {
                        return Bus::parse(bin).map(|b| Signal::Bus(b.zero_extend(width)));
                    }
                    u64::from_str_radix(bin, 2).ok()
                } else {
                    text.parse::<u64>().ok()
                };
                number.map(|n| Signal::Bus(Bus::from_u64(n, width)))
            }
        }
    }
}

impl Default for Signal {
    fn default() -> Self {
        Signal::UNKNOWN
    }
}

impl From<Value> for Signal {
    fn from(v: Value) -> Self {
        Signal::Scalar(v)
    }
}

impl From<bool> for Signal {
    fn from(b: bool) -> Self {
        Signal::Scalar(Value::from(b))
    }
}

impl From<Bus> for Signal {
    fn from(b: Bus) -> Self {
        Signal::Bus(b)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Scalar(v) => write!(f, "{}", v),
            Signal::Bus(b) => match b.to_u64() {
                Some(n) if b.width() > 4 => write!(f, "0x{:x}", n),
                _ => write!(f, "{}", b),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_and_bus_views() {
        let bus = Signal::Bus(Bus::from_u64(1, 1));
        assert_eq!(bus.scalar(), Value::True);
        assert_eq!(Signal::Bus(Bus::from_u64(3, 2)).scalar(), Value::Unknown);
        assert_eq!(Signal::from(true).bus(2).to_string(), "x1");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Signal::parse("1", None), Some(Signal::from(true)));
        assert_eq!(Signal::parse("x", None), Some(Signal::UNKNOWN));
        assert_eq!(Signal::parse("0x1f", Some(8)).and_then(|s| s.to_u64()), Some(31));
        assert_eq!(Signal::parse("0b101", Some(4)).and_then(|s| s.to_u64()), Some(5));
        assert_eq!(Signal::parse("12", Some(4)).and_then(|s| s.to_u64()), Some(12));
        assert!(!Signal::parse("0b1x", Some(4)).unwrap().is_known());
        assert_eq!(Signal::parse("10", None), None);
    }
}
