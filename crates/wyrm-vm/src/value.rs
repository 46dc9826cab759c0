//! Runtime values for the Wyrm interpreter.

use std::fmt;

/// A value on the interpreter stack or in a local slot.
#[derive(Debug, Clone, PartialEq)]
pub enum VmValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    Str(String),
}

impl VmValue {
    /// Truthiness used by conditional jumps: `Null`, `false`, `0`, and
    /// `0.0` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            VmValue::Null => false,
            VmValue::Bool(b) => *b,
            VmValue::Int(i) => *i != 0,
            VmValue::Float(f) => *f != 0.0,
            VmValue::Str(_) => true,
        }
    }

    /// Numeric view of this value, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            VmValue::Int(i) => Some(*i as f64),
            VmValue::Float(f) => Some(*f),
            VmValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

impl fmt::Display for VmValue {
    /// The canonical string form, used when `Add` concatenates with a
    /// string operand.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmValue::Null => write!(f, "null"),
            VmValue::Bool(b) => write!(f, "{}", b),
            VmValue::Int(i) => write!(f, "{}", i),
            VmValue::Float(v) => write!(f, "{}", v),
            VmValue::Str(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!VmValue::Null.is_truthy());
        assert!(!VmValue::Bool(false).is_truthy());
        assert!(!VmValue::Int(0).is_truthy());
        assert!(!VmValue::Float(0.0).is_truthy());
        assert!(VmValue::Bool(true).is_truthy());
        assert!(VmValue::Int(-1).is_truthy());
        assert!(VmValue::Str(String::new()).is_truthy());
    }

    #[test]
    fn test_as_number() {
        assert_eq!(VmValue::Int(3).as_number(), Some(3.0));
        assert_eq!(VmValue::Float(1.5).as_number(), Some(1.5));
        assert_eq!(VmValue::Bool(true).as_number(), Some(1.0));
        assert_eq!(VmValue::Str("x".into()).as_number(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(VmValue::Null.to_string(), "null");
        assert_eq!(VmValue::Int(7).to_string(), "7");
        assert_eq!(VmValue::Str("hi".into()).to_string(), "hi");
    }
}
