//! Minimal DOM node records and the fixed selectors that address them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Observable attributes of one DOM node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState {
    /// Display text
    pub text: String,
    /// Class names
    pub classes: BTreeSet<String>,
    /// `data-*` attributes, keyed without the prefix
    pub dataset: BTreeMap<String, String>,
}

impl ElementState {
    /// Create an element with the given text
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Add a class (builder form)
    #[must_use]
    pub fn with_class(mut self, name: impl Into<String>) -> Self {
        self.classes.insert(name.into());
        self
    }

    /// Set a dataset entry (builder form)
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.dataset.insert(key.into(), value.into());
        self
    }

    /// `classList.contains`
    #[must_use]
    pub fn class_contains(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    /// `classList.add`
    pub fn add_class(&mut self, name: &str) {
        self.classes.insert(name.to_string());
    }

    /// `classList.remove`
    pub fn remove_class(&mut self, name: &str) {
        self.classes.remove(name);
    }

    /// `classList.toggle(name, force)`
    pub fn toggle_class(&mut self, name: &str, on: bool) {
        if on {
            self.add_class(name);
        } else {
            self.remove_class(name);
        }
    }

    /// Read a dataset entry
    #[must_use]
    pub fn data(&self, key: &str) -> Option<&str> {
        self.dataset.get(key).map(String::as_str)
    }

    /// Write a dataset entry
    pub fn set_data(&mut self, key: &str, value: &str) {
        self.dataset.insert(key.to_string(), value.to_string());
    }
}

/// The selectors the voice UI test suite queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownSelector {
    /// `body`
    Body,
    /// `[data-role="user"]`
    UserCircle,
    /// `#mute-indicator`
    MuteIndicator,
    /// `#mute-indicator .indicator-text`
    IndicatorText,
}

impl KnownSelector {
    /// Every known selector
    pub const ALL: [Self; 4] = [
        Self::Body,
        Self::UserCircle,
        Self::MuteIndicator,
        Self::IndicatorText,
    ];

    /// The literal selector text
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::UserCircle => "[data-role=\"user\"]",
            Self::MuteIndicator => "#mute-indicator",
            Self::IndicatorText => "#mute-indicator .indicator-text",
        }
    }

    /// Match selector text exactly (surrounding whitespace ignored)
    #[must_use]
    pub fn parse(selector: &str) -> Option<Self> {
        let selector = selector.trim();
        Self::ALL.into_iter().find(|known| known.as_str() == selector)
    }
}

impl fmt::Display for KnownSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_class() {
        let mut el = ElementState::default();
        el.toggle_class("is-listening", true);
        assert!(el.class_contains("is-listening"));
        el.toggle_class("is-listening", true);
        assert_eq!(el.classes.len(), 1);
        el.toggle_class("is-listening", false);
        assert!(!el.class_contains("is-listening"));
    }

    #[test]
    fn test_builders() {
        let el = ElementState::with_text("hi")
            .with_class("js-enabled")
            .with_data("theme", "dark");
        assert_eq!(el.text, "hi");
        assert!(el.class_contains("js-enabled"));
        assert_eq!(el.data("theme"), Some("dark"));
        assert_eq!(el.data("state"), None);
    }

    #[test]
    fn test_serializes_as_plain_record() {
        let el = ElementState::default().with_class("a").with_data("k", "v");
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"text": "", "classes": ["a"], "dataset": {"k": "v"}})
        );
    }

    #[test]
    fn test_selector_round_trip() {
        for known in KnownSelector::ALL {
            assert_eq!(KnownSelector::parse(known.as_str()), Some(known));
        }
    }

    #[test]
    fn test_selector_is_exact() {
        assert_eq!(KnownSelector::parse("  body "), Some(KnownSelector::Body));
        assert_eq!(KnownSelector::parse("[data-role='user']"), None);
        assert_eq!(KnownSelector::parse("#mute-indicator .other"), None);
    }
}
