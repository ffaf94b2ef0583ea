//! Simulated voice UI front-end.
//!
//! Reproduces the observable behaviour of the page script that the tests
//! drive: the mute toggle (with its speech-recognition side effects), the
//! light/dark theme switch, and spoken announcements routed to the test
//! state's speech log.
//!
//! States are `{muted, unmuted} x {light, dark}`, starting muted and dark.

use crate::element::{ElementState, KnownSelector};
use crate::result::StubResult;
use crate::state::{
    TestState, GET_USER_MEDIA_CALLS, RECOGNITION_START_CALLS, RECOGNITION_STOP_CALLS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Indicator text while muted
pub const MUTED_PROMPT: &str = "Tap or click anywhere to unmute";
/// Indicator text while listening
pub const LISTENING_PROMPT: &str = "Listening… tap to mute";
/// Class toggled on the user circle while listening
pub const LISTENING_CLASS: &str = "is-listening";

/// Colour theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme
    Light,
    /// Dark theme
    #[default]
    Dark,
}

impl Theme {
    /// Anything other than the literal `"light"` is dark
    #[must_use]
    pub fn normalize(name: &str) -> Self {
        if name == "light" {
            Self::Light
        } else {
            Self::Dark
        }
    }

    /// Dataset value
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Capitalised name used in announcements
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fake front-end application backing a page
#[derive(Debug)]
pub struct FakeVoiceLabApp {
    state: TestState,
    theme: Theme,
    muted: bool,
    microphone_granted: bool,
    body: ElementState,
    user_circle: ElementState,
    mute_indicator: ElementState,
    indicator_text: ElementState,
}

impl FakeVoiceLabApp {
    /// Boot the app against a shared test state
    #[must_use]
    pub fn new(state: TestState) -> Self {
        let theme = Theme::default();
        Self {
            state,
            theme,
            muted: true,
            microphone_granted: false,
            body: ElementState::default()
                .with_class("js-enabled")
                .with_data("theme", theme.as_str()),
            user_circle: ElementState::default(),
            mute_indicator: ElementState::default().with_data("state", "muted"),
            indicator_text: ElementState::with_text(MUTED_PROMPT),
        }
    }

    /// Current theme
    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    /// Whether the microphone is muted
    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.muted
    }

    /// The shared test state
    #[must_use]
    pub const fn state(&self) -> &TestState {
        &self.state
    }

    // Event handlers -----------------------------------------------------------

    /// A click anywhere on the page unmutes
    pub fn handle_body_click(&mut self) -> StubResult<()> {
        if self.muted {
            self.set_muted_state(false, false)?;
        }
        Ok(())
    }

    // Core behaviour -----------------------------------------------------------

    /// Queue an utterance; empty text is dropped
    pub fn speak(&self, message: &str) -> StubResult<()> {
        if message.is_empty() {
            return Ok(());
        }
        debug!(utterance = message, "speak");
        self.state.push_speak(message)
    }

    /// Mute or unmute the microphone.
    ///
    /// Counters only move on an actual transition. The element updates run
    /// every time, and `announce` speaks the final state even when nothing
    /// changed.
    pub fn set_muted_state(&mut self, muted: bool, announce: bool) -> StubResult<()> {
        let was_muted = self.muted;
        if muted {
            if !was_muted {
                self.state.increment(RECOGNITION_STOP_CALLS)?;
            }
            self.muted = true;
            self.user_circle.toggle_class(LISTENING_CLASS, false);
            self.mute_indicator.set_data("state", "muted");
            self.indicator_text.text = MUTED_PROMPT.to_string();
        } else {
            if was_muted {
                // A failed unmute must not consume the one-time microphone request
                self.state.increment(RECOGNITION_START_CALLS)?;
                self.request_microphone()?;
            }
            self.muted = false;
            self.user_circle.toggle_class(LISTENING_CLASS, true);
            self.mute_indicator.set_data("state", "listening");
            self.indicator_text.text = LISTENING_PROMPT.to_string();
        }
        debug!(was_muted, muted, announce, "set_muted_state");

        if announce {
            self.speak(if muted {
                "Microphone muted."
            } else {
                "Microphone unmuted."
            })?;
        }
        Ok(())
    }

    /// Switch theme; `force` makes an unchanged theme count as a change for
    /// the announcement
    pub fn apply_theme(&mut self, theme: &str, announce: bool, force: bool) -> StubResult<()> {
        let normalized = Theme::normalize(theme);
        let changed = force || normalized != self.theme;
        self.theme = normalized;
        self.body.set_data("theme", normalized.as_str());
        debug!(theme = %normalized, changed, announce, "apply_theme");

        if announce {
            let message = if changed {
                format!("{} theme activated.", normalized.label())
            } else {
                format!("{} theme is already active.", normalized.label())
            };
            self.speak(&message)?;
        }
        Ok(())
    }

    /// The page asks for microphone access once; later unmutes reuse the
    /// granted stream
    fn request_microphone(&mut self) -> StubResult<()> {
        if !self.microphone_granted {
            self.state.increment(GET_USER_MEDIA_CALLS)?;
            self.microphone_granted = true;
        }
        Ok(())
    }

    // Queries ------------------------------------------------------------------

    /// Only the mute indicator is waited on
    #[must_use]
    pub fn has_selector(&self, selector: &str) -> bool {
        KnownSelector::parse(selector) == Some(KnownSelector::MuteIndicator)
    }

    /// Text of the indicator label, the only node read as text
    #[must_use]
    pub fn text_content(&self, selector: &str) -> Option<String> {
        match KnownSelector::parse(selector)? {
            KnownSelector::IndicatorText => Some(self.indicator_text.text.clone()),
            _ => None,
        }
    }

    /// Element lookup for `document.querySelector`
    #[must_use]
    pub fn query_selector(&self, selector: &str) -> Option<&ElementState> {
        match KnownSelector::parse(selector)? {
            KnownSelector::UserCircle => Some(&self.user_circle),
            KnownSelector::Body => Some(&self.body),
            KnownSelector::MuteIndicator => Some(&self.mute_indicator),
            KnownSelector::IndicatorText => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::state::StatePath;
    use proptest::prelude::*;

    fn app() -> FakeVoiceLabApp {
        FakeVoiceLabApp::new(TestState::new())
    }

    fn counters(app: &FakeVoiceLabApp) -> (i64, i64) {
        (
            app.state().counter(RECOGNITION_START_CALLS).unwrap(),
            app.state().counter(RECOGNITION_STOP_CALLS).unwrap(),
        )
    }

    mod initial_state_tests {
        use super::*;

        #[test]
        fn test_starts_muted_and_dark() {
            let app = app();
            assert!(app.is_muted());
            assert_eq!(app.theme(), Theme::Dark);
            let body = app.query_selector("body").unwrap();
            assert_eq!(body.data("theme"), Some("dark"));
            assert!(body.class_contains("js-enabled"));
            assert_eq!(
                app.query_selector("#mute-indicator").unwrap().data("state"),
                Some("muted")
            );
            assert_eq!(
                app.text_content("#mute-indicator .indicator-text").as_deref(),
                Some(MUTED_PROMPT)
            );
        }

        #[test]
        fn test_queries_only_know_fixed_selectors() {
            let app = app();
            assert!(app.has_selector("#mute-indicator"));
            assert!(!app.has_selector("body"));
            assert!(app.text_content("#mute-indicator").is_none());
            assert!(app.query_selector("#mute-indicator .indicator-text").is_none());
            assert!(app.query_selector("div").is_none());
        }
    }

    mod mute_tests {
        use super::*;

        #[test]
        fn test_unmute_starts_recognition() {
            let mut app = app();
            app.set_muted_state(false, false).unwrap();
            assert!(!app.is_muted());
            assert_eq!(counters(&app), (1, 0));
            assert!(app
                .query_selector("[data-role=\"user\"]")
                .unwrap()
                .class_contains(LISTENING_CLASS));
            assert_eq!(
                app.query_selector("#mute-indicator").unwrap().data("state"),
                Some("listening")
            );
            assert_eq!(
                app.text_content("#mute-indicator .indicator-text").as_deref(),
                Some(LISTENING_PROMPT)
            );
        }

        #[test]
        fn test_mute_when_muted_does_not_count() {
            let mut app = app();
            app.set_muted_state(true, false).unwrap();
            assert_eq!(counters(&app), (0, 0));
            assert!(app.state().speak_calls().unwrap().is_empty());
        }

        #[test]
        fn test_announce_without_transition_still_speaks() {
            let mut app = app();
            app.set_muted_state(true, true).unwrap();
            assert_eq!(counters(&app), (0, 0));
            assert_eq!(
                app.state().speak_calls().unwrap(),
                vec!["Microphone muted.".to_string()]
            );
        }

        #[test]
        fn test_announce_unmute() {
            let mut app = app();
            app.set_muted_state(false, true).unwrap();
            assert_eq!(
                app.state().speak_calls().unwrap(),
                vec!["Microphone unmuted.".to_string()]
            );
        }

        #[test]
        fn test_body_click_unmutes_once() {
            let mut app = app();
            app.handle_body_click().unwrap();
            app.handle_body_click().unwrap();
            assert!(!app.is_muted());
            assert_eq!(counters(&app), (1, 0));
        }

        #[test]
        fn test_microphone_requested_once() {
            let mut app = app();
            app.set_muted_state(false, false).unwrap();
            app.set_muted_state(true, false).unwrap();
            app.set_muted_state(false, false).unwrap();
            assert_eq!(app.state().counter(GET_USER_MEDIA_CALLS).unwrap(), 1);
            assert_eq!(counters(&app), (2, 1));
        }

        #[test]
        fn test_failed_unmute_does_not_consume_microphone_request() {
            let mut app = app();
            let start = StatePath::parse(RECOGNITION_START_CALLS);
            app.state().assign(&start, serde_json::json!("zero")).unwrap();
            assert!(app.set_muted_state(false, false).is_err());
            assert!(app.is_muted());
            assert_eq!(app.state().counter(GET_USER_MEDIA_CALLS).unwrap(), 0);

            app.state().assign(&start, serde_json::json!(0)).unwrap();
            app.set_muted_state(false, false).unwrap();
            assert!(!app.is_muted());
            assert_eq!(app.state().counter(GET_USER_MEDIA_CALLS).unwrap(), 1);
            assert_eq!(counters(&app), (1, 0));
        }

        #[test]
        fn test_counter_replaced_with_string_fails() {
            let mut app = app();
            app.state()
                .assign(
                    &StatePath::parse(RECOGNITION_START_CALLS),
                    serde_json::json!("x"),
                )
                .unwrap();
            assert!(app.set_muted_state(false, false).is_err());
        }
    }

    mod theme_tests {
        use super::*;

        #[test]
        fn test_normalize() {
            assert_eq!(Theme::normalize("light"), Theme::Light);
            assert_eq!(Theme::normalize("Light"), Theme::Dark);
            assert_eq!(Theme::normalize("sepia"), Theme::Dark);
            assert_eq!(Theme::normalize(""), Theme::Dark);
        }

        #[test]
        fn test_forced_light_announces_activation() {
            let mut app = app();
            app.apply_theme("light", true, true).unwrap();
            app.apply_theme("light", true, true).unwrap();
            assert_eq!(
                app.state().speak_calls().unwrap(),
                vec![
                    "Light theme activated.".to_string(),
                    "Light theme activated.".to_string()
                ]
            );
            assert_eq!(app.query_selector("body").unwrap().data("theme"), Some("light"));
        }

        #[test]
        fn test_already_active() {
            let mut app = app();
            app.apply_theme("neon", true, false).unwrap();
            assert_eq!(
                app.state().speak_calls().unwrap(),
                vec!["Dark theme is already active.".to_string()]
            );
            assert_eq!(app.query_selector("body").unwrap().data("theme"), Some("dark"));
        }

        #[test]
        fn test_silent_switch() {
            let mut app = app();
            app.apply_theme("light", false, false).unwrap();
            assert_eq!(app.theme(), Theme::Light);
            assert!(app.state().speak_calls().unwrap().is_empty());
            app.apply_theme("dark", true, false).unwrap();
            assert_eq!(
                app.state().speak_calls().unwrap(),
                vec!["Dark theme activated.".to_string()]
            );
        }

        #[test]
        fn test_empty_speech_is_dropped() {
            let app = app();
            app.speak("").unwrap();
            app.speak("hi").unwrap();
            assert_eq!(app.state().speak_calls().unwrap(), vec!["hi".to_string()]);
        }
    }

    proptest! {
        #[test]
        fn prop_counters_track_transitions(sequence in proptest::collection::vec(any::<bool>(), 0..32)) {
            let mut app = app();
            let mut previous = true;
            let mut expected_start = 0;
            let mut expected_stop = 0;
            for muted in sequence {
                if previous && !muted {
                    expected_start += 1;
                }
                if !previous && muted {
                    expected_stop += 1;
                }
                app.set_muted_state(muted, false).unwrap();
                previous = muted;
            }
            prop_assert_eq!(counters(&app), (expected_start, expected_stop));
            prop_assert_eq!(app.is_muted(), previous);
        }

        #[test]
        fn prop_forced_light_speaks_once(prior in "[a-z]{0,8}") {
            let mut app = app();
            app.apply_theme(&prior, false, false).unwrap();
            app.apply_theme("light", true, true).unwrap();
            prop_assert_eq!(
                app.state().speak_calls().unwrap(),
                vec!["Light theme activated.".to_string()]
            );
        }
    }
}
