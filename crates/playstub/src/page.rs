//! Stub of Playwright's synchronous `Page`.
//!
//! A page owns the shared [`TestState`] and, once anything touches the DOM,
//! exactly one [`FakeVoiceLabApp`]. Script evaluation goes through the closed
//! snippet grammar in [`crate::script`].

use crate::app::FakeVoiceLabApp;
use crate::element::ElementState;
use crate::result::StubResult;
use crate::script::{Expr, MuteCall, Snippet};
use crate::state::TestState;
use crate::value::EvalValue;
use crate::wait::{poll_until, LoadState, WaitOptions, WaitResult};
use serde_json::Value;
use tracing::debug;

/// A simulated page
#[derive(Debug)]
pub struct Page {
    state: TestState,
    app: Option<FakeVoiceLabApp>,
    init_scripts: Vec<String>,
    url: String,
    load_state: Option<LoadState>,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            state: TestState::new(),
            app: None,
            init_scripts: Vec::new(),
            url: String::from("about:blank"),
            load_state: None,
        }
    }
}

impl Page {
    /// Create a blank page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Basic page lifecycle ------------------------------------------------------

    /// Register a script to run before page scripts. Stored, never executed.
    pub fn add_init_script(&mut self, script: impl Into<String>) {
        self.init_scripts.push(script.into());
    }

    /// Scripts registered with [`Page::add_init_script`], in order
    #[must_use]
    pub fn init_scripts(&self) -> &[String] {
        &self.init_scripts
    }

    /// Navigate; boots the app on first navigation
    pub fn goto(&mut self, url: &str, wait_until: LoadState) -> StubResult<()> {
        debug!(url, %wait_until, "goto");
        self.url = url.to_string();
        self.load_state = Some(wait_until);
        self.ensure_app();
        Ok(())
    }

    /// Last navigated URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Load state requested by the last navigation
    #[must_use]
    pub const fn load_state(&self) -> Option<LoadState> {
        self.load_state
    }

    /// The page's test state
    #[must_use]
    pub const fn test_state(&self) -> &TestState {
        &self.state
    }

    /// The app, if it has been booted
    #[must_use]
    pub const fn app(&self) -> Option<&FakeVoiceLabApp> {
        self.app.as_ref()
    }

    fn ensure_app(&mut self) -> &mut FakeVoiceLabApp {
        let state = &self.state;
        self.app.get_or_insert_with(|| {
            debug!("booting voice app");
            FakeVoiceLabApp::new(state.clone())
        })
    }

    // DOM helpers ---------------------------------------------------------------

    /// Wait until `selector` is present, polling every 10ms
    pub fn wait_for_selector(&mut self, selector: &str, timeout_ms: u64) -> StubResult<WaitResult> {
        self.wait_for_selector_with(selector, &WaitOptions::for_selector().with_timeout(timeout_ms))
    }

    /// [`Page::wait_for_selector`] with explicit polling options
    pub fn wait_for_selector_with(
        &mut self,
        selector: &str,
        options: &WaitOptions,
    ) -> StubResult<WaitResult> {
        let app = self.ensure_app();
        poll_until(options, &format!("selector {selector:?}"), || {
            Ok(app.has_selector(selector))
        })
    }

    /// Dispatch a DOM event; only `click` on `body` has an effect
    pub fn dispatch_event(&mut self, selector: &str, event: &str) -> StubResult<()> {
        debug!(selector, event, "dispatch_event");
        let app = self.ensure_app();
        if selector == "body" && event == "click" {
            app.handle_body_click()?;
        }
        Ok(())
    }

    /// Wait until a zero-argument function (or bare test-state read) returns
    /// a truthy value, polling every 50ms
    pub fn wait_for_function(&mut self, expression: &str, timeout_ms: u64) -> StubResult<WaitResult> {
        self.wait_for_function_with(
            expression,
            &WaitOptions::for_function().with_timeout(timeout_ms),
        )
    }

    /// [`Page::wait_for_function`] with explicit polling options
    pub fn wait_for_function_with(
        &mut self,
        expression: &str,
        options: &WaitOptions,
    ) -> StubResult<WaitResult> {
        let predicate = Snippet::parse_predicate(expression)?;
        let waited_for = format!("condition {}", expression.trim());
        poll_until(options, &waited_for, || {
            Ok(self.run(&predicate)?.is_truthy())
        })
    }

    /// Text of the node matching `selector`
    pub fn text_content(&mut self, selector: &str) -> Option<String> {
        self.ensure_app().text_content(selector)
    }

    /// Snapshot of the element matching `selector`
    pub fn query_selector(&mut self, selector: &str) -> Option<ElementState> {
        self.ensure_app().query_selector(selector).cloned()
    }

    // JavaScript evaluation -----------------------------------------------------

    /// Evaluate a snippet the way `page.evaluate` would in a browser
    pub fn evaluate(&mut self, expression: &str) -> StubResult<EvalValue> {
        let snippet = Snippet::parse(expression)?;
        debug!(kind = snippet.kind(), "evaluate");
        self.run(&snippet)
    }

    fn run(&mut self, snippet: &Snippet) -> StubResult<EvalValue> {
        match snippet {
            Snippet::AssignState { path, value } => {
                self.state.assign(path, value.clone())?;
                Ok(EvalValue::Undefined)
            }
            Snippet::ApplyTheme(call) => {
                self.ensure_app().apply_theme(
                    &call.theme,
                    call.options.announce(),
                    call.options.force(),
                )?;
                Ok(EvalValue::Undefined)
            }
            Snippet::SetMutedState(call) => {
                self.replay_mute(std::slice::from_ref(call))?;
                Ok(EvalValue::Undefined)
            }
            Snippet::AsyncBlock(calls) => {
                self.replay_mute(calls)?;
                Ok(EvalValue::Undefined)
            }
            Snippet::Function(expr) => self.eval_expr(expr),
            Snippet::ReadState(path) => Ok(EvalValue::Json(self.state.resolve(path)?)),
        }
    }

    fn replay_mute(&mut self, calls: &[MuteCall]) -> StubResult<()> {
        let app = self.ensure_app();
        for call in calls {
            app.set_muted_state(call.muted, call.options.announce())?;
        }
        Ok(())
    }

    fn eval_expr(&mut self, expr: &Expr) -> StubResult<EvalValue> {
        match expr {
            Expr::State { path, comparison } => {
                let value = self.state.resolve(path)?;
                match comparison {
                    Some(comparison) => Ok(EvalValue::from(comparison.apply(&value)?)),
                    None => Ok(EvalValue::Json(value)),
                }
            }
            Expr::QuerySelector {
                selector,
                contains_class,
            } => {
                let Some(element) = self.ensure_app().query_selector(selector) else {
                    return Ok(EvalValue::Json(Value::Null));
                };
                Ok(match contains_class {
                    Some(name) => EvalValue::from(element.class_contains(name)),
                    None => EvalValue::Element(element.clone()),
                })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::result::StubError;
    use serde_json::json;

    const USER_LISTENING: &str =
        r#"() => document.querySelector('[data-role="user"]').classList.contains('is-listening')"#;

    fn loaded() -> Page {
        let mut page = Page::new();
        page.goto("file:///AI/index.html", LoadState::Load).unwrap();
        page
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn test_blank_page_has_no_app() {
            let page = Page::new();
            assert!(page.app().is_none());
            assert_eq!(page.url(), "about:blank");
            assert_eq!(page.load_state(), None);
        }

        #[test]
        fn test_goto_boots_app() {
            let page = loaded();
            assert!(page.app().is_some());
            assert_eq!(page.url(), "file:///AI/index.html");
            assert_eq!(page.load_state(), Some(LoadState::Load));
        }

        #[test]
        fn test_init_scripts_are_recorded() {
            let mut page = Page::new();
            page.add_init_script("window.a = 1");
            page.add_init_script(String::from("window.b = 2"));
            assert_eq!(page.init_scripts(), ["window.a = 1", "window.b = 2"]);
            assert!(page.app().is_none());
        }

        #[test]
        fn test_app_is_never_replaced() {
            let mut page = loaded();
            page.evaluate("setMutedState(false)").unwrap();
            page.goto("file:///other", LoadState::DomContentLoaded).unwrap();
            assert!(!page.app().unwrap().is_muted());
        }

        #[test]
        fn test_state_assignment_does_not_boot_app() {
            let mut page = Page::new();
            page.evaluate("window.__testState.speakCalls = []").unwrap();
            assert!(page.app().is_none());
        }
    }

    mod evaluate_tests {
        use super::*;

        #[test]
        fn test_length_round_trip() {
            let mut page = loaded();
            page.evaluate("window.__testState.speakCalls = []").unwrap();
            let len = page.evaluate("window.__testState.speakCalls.length").unwrap();
            assert_eq!(len.as_i64(), Some(0));

            page.app().unwrap().speak("hi").unwrap();
            let len = page
                .evaluate("() => window.__testState.speakCalls.length")
                .unwrap();
            assert_eq!(len.as_i64(), Some(1));
        }

        #[test]
        fn test_assignment_returns_undefined() {
            let mut page = loaded();
            let result = page
                .evaluate("window.__testState.recognitionStartCalls = 5")
                .unwrap();
            assert!(result.is_undefined());
            assert_eq!(
                page.evaluate("window.__testState.recognitionStartCalls")
                    .unwrap(),
                EvalValue::Json(json!(5))
            );
        }

        #[test]
        fn test_assignment_raw_text() {
            let mut page = Page::new();
            page.evaluate("window.__testState.label = hello world;").unwrap();
            assert_eq!(
                page.test_state().snapshot()["label"],
                json!("hello world")
            );
        }

        #[test]
        fn test_class_check_follows_mute_state() {
            let mut page = Page::new();
            assert_eq!(page.evaluate(USER_LISTENING).unwrap().as_bool(), Some(false));
            page.evaluate("setMutedState(false)").unwrap();
            assert_eq!(page.evaluate(USER_LISTENING).unwrap().as_bool(), Some(true));
        }

        #[test]
        fn test_query_selector_returns_element() {
            let mut page = loaded();
            let body = page
                .evaluate("() => document.querySelector('body')")
                .unwrap();
            assert_eq!(body.as_element().unwrap().data("theme"), Some("dark"));
        }

        #[test]
        fn test_query_selector_unknown_is_null() {
            let mut page = loaded();
            assert_eq!(
                page.evaluate("() => document.querySelector('#nope')").unwrap(),
                EvalValue::Json(Value::Null)
            );
            assert_eq!(
                page.evaluate("() => document.querySelector('#nope').classList.contains('x')")
                    .unwrap(),
                EvalValue::Json(Value::Null)
            );
        }

        #[test]
        fn test_apply_theme_bridge() {
            let mut page = loaded();
            page.evaluate("window.__testState.speakCalls = []").unwrap();
            page.evaluate("applyTheme('light', {announce: true, force: true})")
                .unwrap();
            let calls = page.evaluate("() => window.__testState.speakCalls").unwrap();
            assert_eq!(
                calls.as_strings(),
                Some(vec!["Light theme activated.".to_string()])
            );
            assert_eq!(
                page.query_selector("body").unwrap().data("theme"),
                Some("light")
            );
        }

        #[test]
        fn test_async_block_replays_in_order() {
            let mut page = loaded();
            page.evaluate(
                "(async () => { await setMutedState(false); await setMutedState(true, {announce: true}); })()",
            )
            .unwrap();
            let state = page.test_state();
            assert_eq!(state.counter("recognitionStartCalls").unwrap(), 1);
            assert_eq!(state.counter("recognitionStopCalls").unwrap(), 1);
            assert_eq!(
                state.speak_calls().unwrap(),
                vec!["Microphone muted.".to_string()]
            );
        }

        #[test]
        fn test_comparison() {
            let mut page = loaded();
            assert_eq!(
                page.evaluate("() => window.__testState.recognitionStartCalls > 0")
                    .unwrap(),
                EvalValue::from(false)
            );
            page.dispatch_event("body", "click").unwrap();
            assert_eq!(
                page.evaluate("() => window.__testState.recognitionStartCalls > 0")
                    .unwrap(),
                EvalValue::from(true)
            );
        }

        #[test]
        fn test_unsupported_expression() {
            let mut page = loaded();
            let err = page.evaluate("1 + 1").unwrap_err();
            assert!(matches!(err, StubError::UnsupportedExpression { .. }));
        }

        #[test]
        fn test_counter_at_max_reports_error() {
            let mut page = loaded();
            page.evaluate("window.__testState.recognitionStartCalls = 9223372036854775807")
                .unwrap();
            let err = page.evaluate("setMutedState(false)").unwrap_err();
            assert!(matches!(err, StubError::TypeMismatch { .. }));
            assert!(page.app().unwrap().is_muted());
        }

        #[test]
        fn test_missing_key() {
            let mut page = loaded();
            let err = page.evaluate("() => window.__testState.nothing").unwrap_err();
            assert!(matches!(err, StubError::MissingKey { ref key } if key == "nothing"));
        }
    }

    mod dom_tests {
        use super::*;

        #[test]
        fn test_dispatch_other_events_ignored() {
            let mut page = loaded();
            page.dispatch_event("body", "keydown").unwrap();
            page.dispatch_event("#mute-indicator", "click").unwrap();
            assert!(page.app().unwrap().is_muted());
        }

        #[test]
        fn test_text_content() {
            let mut page = loaded();
            assert_eq!(
                page.text_content("#mute-indicator .indicator-text").as_deref(),
                Some("Tap or click anywhere to unmute")
            );
            page.dispatch_event("body", "click").unwrap();
            assert!(page
                .text_content("#mute-indicator .indicator-text")
                .unwrap()
                .contains("Listening"));
            assert_eq!(page.text_content("body"), None);
        }
    }

    mod wait_tests {
        use super::*;
        use std::time::{Duration, Instant};

        #[test]
        fn test_wait_for_selector_present() {
            let mut page = loaded();
            let result = page.wait_for_selector("#mute-indicator", 100).unwrap();
            assert_eq!(result.attempts, 1);
        }

        #[test]
        fn test_wait_for_selector_timeout() {
            let mut page = loaded();
            let err = page.wait_for_selector("#missing", 50).unwrap_err();
            assert!(err.is_timeout());
        }

        #[test]
        fn test_wait_for_function_satisfied() {
            let mut page = loaded();
            page.dispatch_event("body", "click").unwrap();
            page.wait_for_function("() => window.__testState.getUserMediaCalls === 1", 100)
                .unwrap();
        }

        #[test]
        fn test_wait_for_function_times_out_near_deadline() {
            let mut page = loaded();
            let start = Instant::now();
            let err = page
                .wait_for_function("() => window.__testState.speakCalls.length > 0", 200)
                .unwrap_err();
            let elapsed = start.elapsed();
            assert!(err.is_timeout());
            assert!(elapsed >= Duration::from_millis(200));
            assert!(elapsed < Duration::from_millis(2_000));
        }

        #[test]
        fn test_wait_for_function_rejects_mutation() {
            let mut page = loaded();
            let err = page
                .wait_for_function("window.__testState.speakCalls = []", 100)
                .unwrap_err();
            assert!(matches!(err, StubError::UnsupportedExpression { .. }));
        }

        #[test]
        fn test_wait_for_function_propagates_lookup_errors() {
            let mut page = loaded();
            let start = Instant::now();
            let err = page
                .wait_for_function("() => window.__testState.missing > 0", 5_000)
                .unwrap_err();
            assert!(matches!(err, StubError::MissingKey { .. }));
            assert!(start.elapsed() < Duration::from_secs(1));
        }

        #[test]
        fn test_empty_array_is_truthy() {
            let mut page = loaded();
            page.wait_for_function("() => window.__testState.speakCalls", 100)
                .unwrap();
        }
    }
}
