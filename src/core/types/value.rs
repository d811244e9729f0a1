//! Memory value enum for the supported semantic types

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A decoded value read from, or about to be written to, process memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum MemoryValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl MemoryValue {
    /// Gets the value type enum for this value
    pub fn value_type(&self) -> ValueType {
        match self {
            MemoryValue::Bool(_) => ValueType::Bool,
            MemoryValue::Int(_) => ValueType::Int,
            MemoryValue::Float(_) => ValueType::Float,
            MemoryValue::Text(_) => ValueType::Text,
        }
    }

    /// Orders two values of the same kind.
    ///
    /// Text orders by its UTF-8 bytes. Values of different kinds, and NaN,
    /// are unordered.
    pub fn compare(&self, other: &MemoryValue) -> Option<Ordering> {
        match (self, other) {
            (MemoryValue::Bool(a), MemoryValue::Bool(b)) => Some(a.cmp(b)),
            (MemoryValue::Int(a), MemoryValue::Int(b)) => Some(a.cmp(b)),
            (MemoryValue::Float(a), MemoryValue::Float(b)) => a.partial_cmp(b),
            (MemoryValue::Text(a), MemoryValue::Text(b)) => {
                Some(a.as_bytes().cmp(b.as_bytes()))
            }
            _ => None,
        }
    }
}

/// Type selector for reads, writes and scans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Text,
}

impl ValueType {
    /// Byte widths accepted for this type, `None` for any positive length
    pub fn widths(&self) -> Option<&'static [usize]> {
        match self {
            ValueType::Bool => Some(&[1]),
            ValueType::Int => Some(&[1, 2, 4, 8]),
            ValueType::Float => Some(&[4, 8]),
            ValueType::Text => None,
        }
    }

    /// Whether the type has a fixed encoding width
    pub fn is_fixed_width(&self) -> bool {
        self.widths().is_some()
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Text => "text",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(ValueType::Bool),
            "int" | "integer" => Ok(ValueType::Int),
            "float" | "double" => Ok(ValueType::Float),
            "text" | "str" | "string" => Ok(ValueType::Text),
            other => Err(format!("unknown value type '{}'", other)),
        }
    }
}

impl fmt::Display for MemoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryValue::Bool(v) => write!(f, "{}", v),
            MemoryValue::Int(v) => write!(f, "{}", v),
            MemoryValue::Float(v) => write!(f, "{}", v),
            MemoryValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<bool> for MemoryValue {
    fn from(value: bool) -> Self {
        MemoryValue::Bool(value)
    }
}

impl From<i64> for MemoryValue {
    fn from(value: i64) -> Self {
        MemoryValue::Int(value)
    }
}

impl From<i32> for MemoryValue {
    fn from(value: i32) -> Self {
        MemoryValue::Int(value.into())
    }
}

impl From<f64> for MemoryValue {
    fn from(value: f64) -> Self {
        MemoryValue::Float(value)
    }
}

impl From<&str> for MemoryValue {
    fn from(value: &str) -> Self {
        MemoryValue::Text(value.to_string())
    }
}

impl From<String> for MemoryValue {
    fn from(value: String) -> Self {
        MemoryValue::Text(value)
    }
}
