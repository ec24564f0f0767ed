//! Popup controller.
//!
//! Presents the duration selector and the four visibility switches, and
//! on confirmation fires exactly one start request at the active page
//! context. The popup never owns authoritative timer state: whatever it
//! displays is cosmetic, and it closes as soon as the page acknowledges.

use crate::config::Config;
use crate::error::MessageError;
use crate::message::{Ack, Request, Transport};
use crate::session::{
    format_mmss, Section, VisibilityFlags, MAX_SESSION_MINUTES, MIN_SESSION_MINUTES,
};

/// Quick-select duration chips, in minutes.
pub const PRESET_MINUTES: [u32; 3] = [5, 10, 30];

/// Duration/visibility option surface for one popup lifetime.
#[derive(Debug, Clone)]
pub struct PopupController {
    selected_minutes: u32,
    switches: VisibilityFlags,
    closed: bool,
}

impl Default for PopupController {
    fn default() -> Self {
        Self::new()
    }
}

impl PopupController {
    pub fn new() -> Self {
        Self {
            selected_minutes: 5,
            switches: VisibilityFlags::default(),
            closed: false,
        }
    }

    /// Seed the selector and switches from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            selected_minutes: config.session.default_minutes.clamp(MIN_SESSION_MINUTES, MAX_SESSION_MINUTES),
            switches: config.session.flags,
            closed: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn selected_minutes(&self) -> u32 {
        self.selected_minutes
    }

    pub fn switches(&self) -> VisibilityFlags {
        self.switches
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Cosmetic `MM:SS` preview of the selected duration.
    pub fn display(&self) -> String {
        format_mmss(u64::from(self.selected_minutes) * 60)
    }

    // ── Option surface ───────────────────────────────────────────────

    pub fn select_minutes(&mut self, minutes: u32) {
        self.selected_minutes = minutes.clamp(MIN_SESSION_MINUTES, MAX_SESSION_MINUTES);
    }

    pub fn increase(&mut self) {
        self.select_minutes(self.selected_minutes.saturating_add(1));
    }

    pub fn decrease(&mut self) {
        self.select_minutes(self.selected_minutes.saturating_sub(1));
    }

    pub fn toggle(&mut self, section: Section) {
        self.switches.toggle(section);
    }

    /// Replace the switch state wholesale (CLI flag parsing).
    pub fn set_switches(&mut self, switches: VisibilityFlags) {
        self.switches = switches;
    }

    // ── Confirmation ─────────────────────────────────────────────────

    /// The request this popup would send right now.
    pub fn start_request(&self) -> Request {
        Request::StartTimer {
            duration: self.selected_minutes,
            states: self.switches,
        }
    }

    /// Fire the one-shot start request at the active page context.
    ///
    /// Failure is logged and given up on -- no retry, no user-facing
    /// error beyond the console. On acknowledgment the popup closes.
    pub fn start<T: Transport>(&mut self, transport: &mut T) -> Result<Ack, MessageError> {
        let Some(page) = transport.active_page() else {
            tracing::error!("no active page context");
            return Err(MessageError::NoActivePage);
        };
        match transport.send(page, &self.start_request()) {
            Ok(ack) => {
                self.closed = true;
                Ok(ack)
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to start session");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::LocalTransport;
    use crate::page::{MemoryFullscreen, MemoryPage};
    use crate::session::{SessionController, SessionState, ACK_STARTED};

    fn transport() -> LocalTransport<MemoryPage, MemoryFullscreen> {
        LocalTransport::new(SessionController::new(
            MemoryPage::new(),
            MemoryFullscreen::new(),
        ))
    }

    #[test]
    fn defaults_to_five_minutes_all_hidden() {
        let popup = PopupController::new();
        assert_eq!(popup.selected_minutes(), 5);
        assert_eq!(popup.switches(), VisibilityFlags::default());
        assert_eq!(popup.display(), "05:00");
    }

    #[test]
    fn steppers_clamp_to_range() {
        let mut popup = PopupController::new();
        popup.select_minutes(1);
        popup.decrease();
        assert_eq!(popup.selected_minutes(), 1);
        popup.select_minutes(60);
        popup.increase();
        assert_eq!(popup.selected_minutes(), 60);
        popup.select_minutes(0);
        assert_eq!(popup.selected_minutes(), 1);
        popup.select_minutes(600);
        assert_eq!(popup.selected_minutes(), 60);
    }

    #[test]
    fn presets_are_in_range() {
        let mut popup = PopupController::new();
        for minutes in PRESET_MINUTES {
            popup.select_minutes(minutes);
            assert_eq!(popup.selected_minutes(), minutes);
        }
    }

    #[test]
    fn start_sends_once_and_closes() {
        let mut popup = PopupController::new();
        popup.select_minutes(10);
        popup.toggle(Section::Discussion);
        let mut transport = transport();
        let ack = popup.start(&mut transport).unwrap();
        assert_eq!(ack.status, ACK_STARTED);
        assert!(popup.is_closed());
        let ctl = transport.controller();
        assert_eq!(ctl.state(), SessionState::Running);
        assert_eq!(ctl.remaining_secs(), 600);
        assert!(!ctl.session().unwrap().flags.discussion);
    }

    #[test]
    fn no_active_page_fails_without_retry() {
        struct DeadTransport;
        impl Transport for DeadTransport {
            fn active_page(&self) -> Option<crate::message::PageId> {
                None
            }
            fn send(
                &mut self,
                _page: crate::message::PageId,
                _request: &Request,
            ) -> Result<Ack, MessageError> {
                panic!("send must not be reached without a page");
            }
        }
        let mut popup = PopupController::new();
        let err = popup.start(&mut DeadTransport).unwrap_err();
        assert!(matches!(err, MessageError::NoActivePage));
        assert!(!popup.is_closed());
    }
}
