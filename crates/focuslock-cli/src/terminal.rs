//! Terminal rendering of the session page.
//!
//! Wraps the in-memory page model and mirrors its effects onto stderr so
//! stdout stays reserved for JSON events. The countdown line is redrawn
//! in place with a carriage return.

use std::io::Write;

use focuslock_core::error::PageError;
use focuslock_core::{MemoryPage, PageDom, Section};

pub struct TerminalPage {
    inner: MemoryPage,
}

impl Default for TerminalPage {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPage {
    pub fn new() -> Self {
        Self {
            inner: MemoryPage::new(),
        }
    }

    fn line(text: &str) {
        let mut err = std::io::stderr();
        let _ = writeln!(err, "{text}");
    }

    fn redraw(display: &str) {
        let mut err = std::io::stderr();
        let _ = write!(err, "\r  {display}");
        let _ = err.flush();
    }
}

impl PageDom for TerminalPage {
    fn anchor_present(&self) -> bool {
        self.inner.anchor_present()
    }

    fn clear_anchor(&mut self) {
        self.inner.clear_anchor();
    }

    fn mount_widget(&mut self, display: &str) -> Result<(), PageError> {
        self.inner.mount_widget(display)?;
        Self::redraw(display);
        Ok(())
    }

    fn update_widget(&mut self, display: &str) {
        self.inner.update_widget(display);
        Self::redraw(display);
    }

    fn unmount_widget(&mut self) {
        self.inner.unmount_widget();
    }

    fn widget_present(&self) -> bool {
        self.inner.widget_present()
    }

    fn remove_section(&mut self, section: Section) {
        self.inner.remove_section(section);
        Self::line(&format!("  hidden: {section}"));
    }

    fn show_notice(&mut self, message: &str) {
        self.inner.show_notice(message);
        Self::line(&format!("\n  {message}"));
    }

    fn show_warning(&mut self, message: &str) {
        self.inner.show_warning(message);
        Self::line(&format!("\n  ! {message}"));
    }

    fn dismiss_warning(&mut self) {
        self.inner.dismiss_warning();
    }
}
