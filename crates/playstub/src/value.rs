//! Values returned by snippet evaluation.

use crate::element::ElementState;
use crate::result::StubResult;
use serde_json::Value;
use std::fmt;

/// What `page.evaluate` hands back
#[derive(Debug, Clone, PartialEq)]
pub enum EvalValue {
    /// The snippet produced no value (assignments and bridge calls)
    Undefined,
    /// A JSON-representable value
    Json(Value),
    /// Handle to a DOM element (snapshot at evaluation time)
    Element(ElementState),
}

impl EvalValue {
    /// JavaScript truthiness: `undefined`, `null`, `false`, `0`, `NaN` and
    /// `""` are falsy; arrays, objects and elements are truthy
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined => false,
            Self::Element(_) => true,
            Self::Json(value) => match value {
                Value::Null => false,
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
                Value::String(s) => !s.is_empty(),
                Value::Array(_) | Value::Object(_) => true,
            },
        }
    }

    /// Whether this is `undefined`
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Boolean payload, if any
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Json(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload, if any
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Json(value) => value.as_i64(),
            _ => None,
        }
    }

    /// JSON payload, if any
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Element payload, if any
    #[must_use]
    pub const fn as_element(&self) -> Option<&ElementState> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Array of strings payload, e.g. `speakCalls`
    #[must_use]
    pub fn as_strings(&self) -> Option<Vec<String>> {
        self.as_json()?
            .as_array()?
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    /// Convert to JSON; `undefined` becomes `null` and elements serialize
    /// as their record
    pub fn to_json(&self) -> StubResult<Value> {
        Ok(match self {
            Self::Undefined => Value::Null,
            Self::Json(value) => value.clone(),
            Self::Element(element) => serde_json::to_value(element)?,
        })
    }
}

impl From<Value> for EvalValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<bool> for EvalValue {
    fn from(value: bool) -> Self {
        Self::Json(Value::Bool(value))
    }
}

impl fmt::Display for EvalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Json(value) => write!(f, "{value}"),
            Self::Element(element) => match serde_json::to_string(element) {
                Ok(json) => f.write_str(&json),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}
