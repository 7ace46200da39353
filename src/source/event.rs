//! # Environment events delivered to task groups.
//!
//! An [`Event`] is a tag plus an ordered list of [`Value`]s. The tag is what
//! tasks filter on; the values are handed to the resumed task untouched.
//!
//! ## Example
//! ```rust
//! use cotask::{Event, Value};
//!
//! let ev = Event::new("key").with_value(28).with_value(false);
//!
//! assert_eq!(ev.tag(), "key");
//! assert_eq!(ev.value(0), Some(&Value::Int(28)));
//! assert_eq!(ev.value(1).and_then(Value::as_bool), Some(false));
//! assert!(ev.value(2).is_none());
//! ```

use std::fmt;
use std::sync::Arc;

/// Tag the host uses for its shutdown request.
pub const TERMINATE_TAG: &str = "terminate";

/// Dynamically typed value carried by an event or passed as a task argument.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Nil,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Shared string.
    Str(Arc<str>),
}

impl Value {
    /// Returns the boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns a numeric payload as `f64` (integers are widened).
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Returns the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

/// One environment event: a tag and its associated values.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    tag: Arc<str>,
    values: Vec<Value>,
}

impl Event {
    /// Creates an event with the given tag and no values.
    pub fn new(tag: impl Into<Arc<str>>) -> Self {
        Self {
            tag: tag.into(),
            values: Vec::new(),
        }
    }

    /// Creates an event with the given tag and values.
    pub fn with_values(tag: impl Into<Arc<str>>, values: Vec<Value>) -> Self {
        Self {
            tag: tag.into(),
            values,
        }
    }

    /// Creates the host's shutdown event ([`TERMINATE_TAG`]).
    pub fn terminate() -> Self {
        Self::new(TERMINATE_TAG)
    }

    /// Appends one value.
    #[inline]
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    /// The event tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Shared handle to the tag.
    pub fn tag_arc(&self) -> &Arc<str> {
        &self.tag
    }

    /// All associated values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The value at `idx`, if present.
    pub fn value(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Splits the event into its tag and values.
    pub fn into_parts(self) -> (Arc<str>, Vec<Value>) {
        (self.tag, self.values)
    }

    #[inline]
    pub fn is_tagged(&self, tag: &str) -> bool {
        &*self.tag == tag
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)?;
        for v in &self.values {
            write!(f, " {v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_maps_to_nil() {
        assert_eq!(Value::from(None::<i64>), Value::Nil);
        assert_eq!(Value::from(Some("x")), Value::Str("x".into()));
    }

    #[test]
    fn test_int_widens_to_float() {
        assert_eq!(Value::Int(3).as_float(), Some(3.0));
        assert_eq!(Value::Str("3".into()).as_float(), None);
    }

    #[test]
    fn test_display_lists_values() {
        let ev = Event::new("mouse_click").with_value(1).with_value(10).with_value("left");
        assert_eq!(ev.to_string(), "mouse_click 1 10 \"left\"");
        assert!(ev.is_tagged("mouse_click"));
        assert!(Event::terminate().is_tagged(TERMINATE_TAG));
    }
}
