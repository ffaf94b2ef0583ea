//! Playstub: Browser-Free Playwright Page Stub
//!
//! A drop-in stand-in for Playwright's synchronous page API, used where the
//! "Talk to Unity" voice UI tests run without a real browser. Instead of a
//! JavaScript engine, `Page::evaluate` understands the closed set of snippets
//! the tests send and applies them to a simulated front-end.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      PLAYSTUB Architecture                       │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌─────────────────┐        │
//! │   │ Snippet    │    │ Page       │    │ FakeVoiceLabApp │        │
//! │   │ (script)   │───►│ evaluate / │───►│ mute + theme    │        │
//! │   │            │    │ wait_for_* │    │ state machine   │        │
//! │   └────────────┘    └─────┬──────┘    └────────┬────────┘        │
//! │                           │                    │                 │
//! │                           ▼                    ▼                 │
//! │                    ┌──────────────────────────────┐              │
//! │                    │ TestState (window.__testState)│              │
//! │                    └──────────────────────────────┘              │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use playstub::{sync_playwright, ContextOptions, LaunchOptions, LoadState};
//!
//! let playwright = sync_playwright();
//! let mut browser = playwright.chromium.launch(LaunchOptions::default()).unwrap();
//! let page = browser.new_context(ContextOptions::default()).new_page();
//! page.goto("file:///AI/index.html", LoadState::Load).unwrap();
//!
//! page.dispatch_event("body", "click").unwrap();
//! page.wait_for_function("() => window.__testState.recognitionStartCalls > 0", 1_000)
//!     .unwrap();
//! ```

#![warn(missing_docs)]

mod app;
mod browser;
mod element;
mod page;
mod result;
mod state;
mod value;

/// Snippet grammar: tokenizer, parser and literal rules
pub mod script;

/// Polling waits and load states
pub mod wait;

pub use app::{FakeVoiceLabApp, Theme, LISTENING_CLASS, LISTENING_PROMPT, MUTED_PROMPT};
pub use browser::{
    sync_playwright, Browser, BrowserContext, BrowserType, ContextOptions, LaunchOptions,
    Playwright,
};
pub use element::{ElementState, KnownSelector};
pub use page::Page;
pub use result::{StubError, StubResult};
pub use script::{parse_literal, Snippet};
pub use state::{
    StatePath, TestState, GET_USER_MEDIA_CALLS, RECOGNITION_START_CALLS, RECOGNITION_STOP_CALLS,
    SPEAK_CALLS,
};
pub use value::EvalValue;
pub use wait::{LoadState, WaitOptions, WaitResult};
