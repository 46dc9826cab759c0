//! Dynamically-typed values exchanged with the host's scripting layer.
//!
//! The host hands the bridge arguments as tagged values and receives a tagged
//! value back. The bridge only reads inputs and writes one result; it never
//! retains references past a call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dynamically-typed value crossing the native/managed boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum DynValue {
    /// Numeric value. The host's scripting layer represents all numbers as
    /// doubles, so integers arrive and leave through this variant too.
    Real(f64),

    /// Boolean value.
    Bool(bool),

    /// String value, UTF-8 on the bridge side.
    Str(String),

    /// Absent/undefined value.
    Undefined,

    /// Ordered array of values. Accepted from the host but not marshallable
    /// into a managed call.
    Array(Vec<DynValue>),
}

impl DynValue {
    /// The kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            DynValue::Real(_) => ValueKind::Real,
            DynValue::Bool(_) => ValueKind::Bool,
            DynValue::Str(_) => ValueKind::Str,
            DynValue::Undefined => ValueKind::Undefined,
            DynValue::Array(_) => ValueKind::Array,
        }
    }

    /// The numeric payload, if this is a `Real`.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            DynValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// The boolean payload, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The string payload, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynValue::Real(v) => write!(f, "{}", v),
            DynValue::Bool(v) => write!(f, "{}", v),
            DynValue::Str(s) => write!(f, "{}", s),
            DynValue::Undefined => write!(f, "undefined"),
            DynValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<f64> for DynValue {
    fn from(v: f64) -> Self {
        DynValue::Real(v)
    }
}

impl From<bool> for DynValue {
    fn from(v: bool) -> Self {
        DynValue::Bool(v)
    }
}

impl From<&str> for DynValue {
    fn from(v: &str) -> Self {
        DynValue::Str(v.to_string())
    }
}

impl From<String> for DynValue {
    fn from(v: String) -> Self {
        DynValue::Str(v)
    }
}

/// The kind tag of a [`DynValue`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Real,
    Bool,
    Str,
    Undefined,
    Array,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Real => "real",
            ValueKind::Bool => "bool",
            ValueKind::Str => "string",
            ValueKind::Undefined => "undefined",
            ValueKind::Array => "array",
        };
        write!(f, "{}", name)
    }
}
