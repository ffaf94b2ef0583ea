//! Browser lifecycle wrappers.
//!
//! Mirrors the shape of Playwright's sync API (`sync_playwright()`,
//! `chromium.launch()`, `browser.new_context()`, `context.new_page()`) so
//! test code reads the same. Nothing is spawned; options are recorded and
//! otherwise ignored.

use crate::page::Page;
use crate::result::StubResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Browser launch options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchOptions {
    /// Run in headless mode
    pub headless: bool,
    /// Extra command-line arguments for the browser binary
    pub args: Vec<String>,
    /// Slow operations down by this many milliseconds
    pub slow_mo_ms: u64,
    /// Path to a browser executable (None = bundled)
    pub executable_path: Option<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            args: Vec::new(),
            slow_mo_ms: 0,
            executable_path: None,
        }
    }
}

impl LaunchOptions {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Append a browser argument
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set executable path
    #[must_use]
    pub fn with_executable_path(mut self, path: impl Into<String>) -> Self {
        self.executable_path = Some(path.into());
        self
    }
}

/// Browser context options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextOptions {
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Permissions granted up front, e.g. `microphone`
    pub permissions: Vec<String>,
    /// Locale
    pub locale: Option<String>,
    /// User agent string
    pub user_agent: Option<String>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            viewport_width: 1280,
            viewport_height: 720,
            permissions: Vec::new(),
            locale: None,
            user_agent: None,
        }
    }
}

impl ContextOptions {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Grant a permission
    #[must_use]
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }

    /// Set locale
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Set user agent
    #[must_use]
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }
}

/// Entry point returned by [`sync_playwright`]
#[derive(Debug, Default)]
pub struct Playwright {
    /// The Chromium browser type
    pub chromium: BrowserType,
}

impl Playwright {
    /// Shut down the driver (no-op)
    pub fn close(self) {
        debug!("playwright closed");
    }
}

/// Start the Playwright driver
#[must_use]
pub fn sync_playwright() -> Playwright {
    Playwright::default()
}

/// A launchable browser engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserType {
    name: String,
}

impl Default for BrowserType {
    fn default() -> Self {
        Self {
            name: String::from("chromium"),
        }
    }
}

impl BrowserType {
    /// Engine name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Launch a browser instance
    ///
    /// # Errors
    ///
    /// Returns error if browser cannot be launched
    pub fn launch(&self, options: LaunchOptions) -> StubResult<Browser> {
        debug!(browser = %self.name, headless = options.headless, "launch");
        Ok(Browser {
            options,
            contexts: Vec::new(),
        })
    }
}

/// A launched browser
#[derive(Debug)]
pub struct Browser {
    options: LaunchOptions,
    contexts: Vec<BrowserContext>,
}

impl Browser {
    /// Options the browser was launched with
    #[must_use]
    pub const fn options(&self) -> &LaunchOptions {
        &self.options
    }

    /// Open a new isolated context
    pub fn new_context(&mut self, options: ContextOptions) -> &mut BrowserContext {
        debug!(contexts = self.contexts.len() + 1, "new_context");
        let index = self.contexts.len();
        self.contexts.push(BrowserContext {
            options,
            pages: Vec::new(),
        });
        &mut self.contexts[index]
    }

    /// Open contexts
    #[must_use]
    pub fn contexts(&self) -> &[BrowserContext] {
        &self.contexts
    }

    /// Close every context and the browser itself
    pub fn close(&mut self) {
        for context in &mut self.contexts {
            context.close();
        }
        self.contexts.clear();
        debug!("browser closed");
    }
}

/// An isolated browsing session holding pages
#[derive(Debug)]
pub struct BrowserContext {
    options: ContextOptions,
    pages: Vec<Page>,
}

impl BrowserContext {
    /// Options the context was created with
    #[must_use]
    pub const fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// Open a new page, each with its own test state
    pub fn new_page(&mut self) -> &mut Page {
        let index = self.pages.len();
        self.pages.push(Page::new());
        debug!(pages = index + 1, "new_page");
        &mut self.pages[index]
    }

    /// Open pages
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Mutable access to an open page
    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }

    /// Close all pages
    pub fn close(&mut self) {
        self.pages.clear();
    }
}
