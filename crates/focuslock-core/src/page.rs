//! Platform seams between the session controller and its host page.
//!
//! All DOM and fullscreen effects go through these traits so the engine
//! stays host-agnostic: the browser context supplies real DOM bindings,
//! the CLI supplies a terminal rendering, and tests supply [`MemoryPage`].

use crate::error::PageError;
use crate::session::Section;

/// DOM-side effects the session controller needs from its host page.
///
/// The host page guarantees a designated anchor element for the widget
/// and one removable element per [`Section`]; absence of the anchor is
/// reported through [`PageDom::anchor_present`] rather than a crash.
pub trait PageDom {
    /// Whether the designated anchor element currently exists.
    fn anchor_present(&self) -> bool;

    /// Remove every child of the anchor ahead of mounting the widget.
    fn clear_anchor(&mut self);

    /// Mount the countdown widget into the anchor with an initial display.
    fn mount_widget(&mut self, display: &str) -> Result<(), PageError>;

    /// Update the mounted widget's `MM:SS` text.
    fn update_widget(&mut self, display: &str);

    /// Remove the widget, if mounted.
    fn unmount_widget(&mut self);

    /// Whether the widget is currently in the document.
    fn widget_present(&self) -> bool;

    /// Remove the page section matching `section`.
    fn remove_section(&mut self, section: Section);

    /// Surface a blocking notice ("Time's up!").
    fn show_notice(&mut self, message: &str);

    /// Surface a transient warning.
    fn show_warning(&mut self, message: &str);

    /// Take down the transient warning, if shown.
    fn dismiss_warning(&mut self);
}

/// Fullscreen control for the restricted variant.
pub trait Fullscreen {
    fn is_fullscreen(&self) -> bool;

    /// Request fullscreen. The platform may reject this (user-gesture
    /// requirements and similar); the caller logs and retries on the
    /// next periodic check.
    fn request(&mut self) -> Result<(), PageError>;
}

// ── In-memory implementations ───────────────────────────────────────

/// In-memory page model recording every effect.
///
/// Backs the test suite and the CLI's terminal page. Session state is
/// never persisted; this is scaffolding for a single process lifetime.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    anchor_present: bool,
    anchor_cleared: bool,
    widget: Option<String>,
    removed_sections: Vec<Section>,
    notice: Option<String>,
    warning: Option<String>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self {
            anchor_present: true,
            anchor_cleared: false,
            widget: None,
            removed_sections: Vec::new(),
            notice: None,
            warning: None,
        }
    }
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the anchor element missing (or appearing) in the document.
    pub fn set_anchor_present(&mut self, present: bool) {
        self.anchor_present = present;
    }

    /// Simulate an SPA navigation: the host replaces its DOM, taking the
    /// widget (and the cleared-anchor marker) with it.
    pub fn replace_dom(&mut self) {
        self.widget = None;
        self.anchor_cleared = false;
    }

    pub fn anchor_cleared(&self) -> bool {
        self.anchor_cleared
    }

    pub fn widget(&self) -> Option<&str> {
        self.widget.as_deref()
    }

    pub fn removed_sections(&self) -> &[Section] {
        &self.removed_sections
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }
}

impl PageDom for MemoryPage {
    fn anchor_present(&self) -> bool {
        self.anchor_present
    }

    fn clear_anchor(&mut self) {
        self.anchor_cleared = true;
    }

    fn mount_widget(&mut self, display: &str) -> Result<(), PageError> {
        self.widget = Some(display.to_string());
        Ok(())
    }

    fn update_widget(&mut self, display: &str) {
        if let Some(widget) = &mut self.widget {
            *widget = display.to_string();
        }
    }

    fn unmount_widget(&mut self) {
        self.widget = None;
    }

    fn widget_present(&self) -> bool {
        self.widget.is_some()
    }

    fn remove_section(&mut self, section: Section) {
        if !self.removed_sections.contains(&section) {
            self.removed_sections.push(section);
        }
    }

    fn show_notice(&mut self, message: &str) {
        self.notice = Some(message.to_string());
    }

    fn show_warning(&mut self, message: &str) {
        self.warning = Some(message.to_string());
    }

    fn dismiss_warning(&mut self) {
        self.warning = None;
    }
}

/// In-memory fullscreen model with a switchable rejection mode.
#[derive(Debug, Clone, Default)]
pub struct MemoryFullscreen {
    fullscreen: bool,
    reject_requests: bool,
    requests: u32,
}

impl MemoryFullscreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent request fail, as a platform without a user
    /// gesture would.
    pub fn set_reject_requests(&mut self, reject: bool) {
        self.reject_requests = reject;
    }

    /// Simulate the user leaving fullscreen.
    pub fn exit(&mut self) {
        self.fullscreen = false;
    }

    /// How many requests have been issued so far.
    pub fn requests(&self) -> u32 {
        self.requests
    }
}

impl Fullscreen for MemoryFullscreen {
    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn request(&mut self) -> Result<(), PageError> {
        self.requests += 1;
        if self.reject_requests {
            return Err(PageError::FullscreenRejected(
                "requires a user gesture".to_string(),
            ));
        }
        self.fullscreen = true;
        Ok(())
    }
}
