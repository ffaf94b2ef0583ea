//! Shared test-state record observed by assertions.
//!
//! The record is what the injected init script exposes as `window.__testState`
//! in a real browser. Both the page (through path assignment and reads) and
//! the fake app (through counters and the speech log) mutate it, so it is a
//! cheap clonable handle over one shared map.

use crate::result::{StubError, StubResult};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Spoken utterances, in order
pub const SPEAK_CALLS: &str = "speakCalls";
/// Speech recognition `start()` count
pub const RECOGNITION_START_CALLS: &str = "recognitionStartCalls";
/// Speech recognition `stop()` count
pub const RECOGNITION_STOP_CALLS: &str = "recognitionStopCalls";
/// `getUserMedia()` count
pub const GET_USER_MEDIA_CALLS: &str = "getUserMediaCalls";

/// Pseudo-segment resolving to the length of the current value
const LENGTH_SEGMENT: &str = "length";

/// A dotted path into the test state, e.g. `speakCalls.length`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatePath {
    segments: Vec<String>,
}

impl StatePath {
    /// Parse a dotted path, dropping empty segments
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Build a path from already split segments
    #[must_use]
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// The path segments
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether the path names the state root
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Shared handle to the page's test state
#[derive(Debug, Clone)]
pub struct TestState {
    inner: Rc<RefCell<Map<String, Value>>>,
}

impl Default for TestState {
    fn default() -> Self {
        let mut map = Map::new();
        map.insert(SPEAK_CALLS.to_string(), Value::Array(Vec::new()));
        map.insert(RECOGNITION_START_CALLS.to_string(), Value::from(0));
        map.insert(RECOGNITION_STOP_CALLS.to_string(), Value::from(0));
        map.insert(GET_USER_MEDIA_CALLS.to_string(), Value::from(0));
        Self {
            inner: Rc::new(RefCell::new(map)),
        }
    }
}

impl TestState {
    /// Create a fresh state with all counters at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the whole record
    #[must_use]
    pub fn snapshot(&self) -> Value {
        Value::Object(self.inner.borrow().clone())
    }

    /// Resolve a path, substituting `length` segments with the length of the
    /// value reached so far
    pub fn resolve(&self, path: &StatePath) -> StubResult<Value> {
        let root = self.inner.borrow();
        let mut current = Value::Object(root.clone());
        for segment in path.segments() {
            current = if segment == LENGTH_SEGMENT {
                Value::from(length_of(&current, path)?)
            } else {
                match current {
                    Value::Object(mut map) => map
                        .remove(segment)
                        .ok_or_else(|| StubError::missing_key(segment.clone()))?,
                    other => {
                        return Err(StubError::type_mismatch(format!(
                            "cannot read '{segment}' of {} in '{path}'",
                            kind_of(&other)
                        )))
                    }
                }
            };
        }
        Ok(current)
    }

    /// Assign a value at a path; every segment but the last must already be
    /// a mapping
    pub fn assign(&self, path: &StatePath, value: Value) -> StubResult<()> {
        let Some((last, parents)) = path.segments().split_last() else {
            return Err(StubError::type_mismatch(
                "cannot assign to the test state root",
            ));
        };

        let mut root = self.inner.borrow_mut();
        let mut target: &mut Map<String, Value> = &mut root;
        for segment in parents {
            target = match target.get_mut(segment) {
                Some(Value::Object(map)) => map,
                Some(other) => {
                    return Err(StubError::type_mismatch(format!(
                        "cannot assign through {} at '{segment}' in '{path}'",
                        kind_of(other)
                    )))
                }
                None => return Err(StubError::missing_key(segment.clone())),
            };
        }
        target.insert(last.clone(), value);
        Ok(())
    }

    /// Append an utterance to `speakCalls`
    pub fn push_speak(&self, message: &str) -> StubResult<()> {
        let mut root = self.inner.borrow_mut();
        match root.get_mut(SPEAK_CALLS) {
            Some(Value::Array(calls)) => {
                calls.push(Value::String(message.to_string()));
                Ok(())
            }
            Some(other) => Err(StubError::type_mismatch(format!(
                "{SPEAK_CALLS} is {}, expected array",
                kind_of(other)
            ))),
            None => Err(StubError::missing_key(SPEAK_CALLS)),
        }
    }

    /// Increment an integer counter, returning the new value
    pub fn increment(&self, key: &str) -> StubResult<i64> {
        let mut root = self.inner.borrow_mut();
        let slot = root
            .get_mut(key)
            .ok_or_else(|| StubError::missing_key(key))?;
        let Some(current) = slot.as_i64() else {
            return Err(StubError::type_mismatch(format!(
                "{key} is {}, expected integer",
                kind_of(slot)
            )));
        };
        let next = current.checked_add(1).ok_or_else(|| {
            StubError::type_mismatch(format!("{key} is {current}, cannot increment past i64::MAX"))
        })?;
        *slot = Value::from(next);
        Ok(next)
    }

    /// Current value of an integer counter
    pub fn counter(&self, key: &str) -> StubResult<i64> {
        let root = self.inner.borrow();
        let value = root.get(key).ok_or_else(|| StubError::missing_key(key))?;
        value.as_i64().ok_or_else(|| {
            StubError::type_mismatch(format!("{key} is {}, expected integer", kind_of(value)))
        })
    }

    /// Spoken utterances as strings; non-string entries are skipped
    pub fn speak_calls(&self) -> StubResult<Vec<String>> {
        let root = self.inner.borrow();
        match root.get(SPEAK_CALLS) {
            Some(Value::Array(calls)) => Ok(calls
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()),
            Some(other) => Err(StubError::type_mismatch(format!(
                "{SPEAK_CALLS} is {}, expected array",
                kind_of(other)
            ))),
            None => Err(StubError::missing_key(SPEAK_CALLS)),
        }
    }
}

fn length_of(value: &Value, path: &StatePath) -> StubResult<usize> {
    match value {
        Value::Array(items) => Ok(items.len()),
        Value::String(s) => Ok(s.chars().count()),
        Value::Object(map) => Ok(map.len()),
        other => Err(StubError::type_mismatch(format!(
            "{} has no length in '{path}'",
            kind_of(other)
        ))),
    }
}

/// Short JavaScript-flavoured name of a value's type for error messages
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
