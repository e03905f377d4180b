//! Self-describing values for configurations, results, and stored records.

use core::fmt;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A job configuration: parameter names mapped to values.
pub type Config = BTreeMap<String, Value>;

/// Marker prefix of an encoded failure result.
///
/// A run function that wants downstream consumers to see "ran but failed"
/// (rather than crashing with an error) returns a string value starting
/// with this marker, e.g. `"F_timeout"`.
pub const FAILURE_MARKER: &str = "F";

/// A dynamically typed value.
///
/// This enum is the uniform currency of the engine: configuration
/// parameters, run function results, and everything written to a
/// [`Storage`](crate::Storage) record are `Value`s.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// A boolean value.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A string value.
    Str(String),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A string-keyed mapping of values.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Builds an encoded failure result with the given reason.
    ///
    /// # Examples
    ///
    /// ```
    /// use evaluator::Value;
    ///
    /// let result = Value::failure("timeout");
    /// assert!(result.is_failure());
    /// assert_eq!(result.as_str(), Some("F_timeout"));
    /// ```
    #[must_use]
    pub fn failure(reason: &str) -> Self {
        Value::Str(format!("{FAILURE_MARKER}_{reason}"))
    }

    /// Returns `true` if this value encodes a failed evaluation: a string
    /// starting with [`FAILURE_MARKER`].
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Value::Str(s) if s.starts_with(FAILURE_MARKER))
    }

    /// Returns the numeric value, widening `Int` to `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the string slice for `Str` values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the inner mapping for `Map` values.
    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "{v}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_widening() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::Str("3".to_string()).as_f64(), None);
    }

    #[test]
    fn failure_convention() {
        assert!(Value::failure("timeout").is_failure());
        assert!(Value::Str("F_oom".to_string()).is_failure());
        assert!(!Value::Str("fine".to_string()).is_failure());
        assert!(!Value::Float(1.0).is_failure());
    }

    #[test]
    fn display_is_compact() {
        let value = Value::Map(BTreeMap::from([
            ("x".to_string(), Value::Float(1.5)),
            ("tags".to_string(), Value::List(vec![Value::Int(1), Value::Int(2)])),
        ]));
        assert_eq!(value.to_string(), "{tags: [1, 2], x: 1.5}");
    }
}
