//! Page session controller.
//!
//! The controller owns one timed practice session per page context:
//!
//! ```text
//! Idle -> Running -> Expired
//! ```
//!
//! It receives start requests from the popup, mounts the countdown widget
//! into the host page, hides the flagged sections, and (for restricted
//! sessions) drives the enforcement policy. The caller invokes `tick()`
//! once per second and forwards DOM/fullscreen/visibility observations;
//! the controller never spawns threads of its own.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::events::Event;
use crate::message::{Ack, Request};
use crate::page::{Fullscreen, PageDom};
use crate::session::countdown::{format_mmss, Countdown};
use crate::session::enforcement::{EnforcementPolicy, EnforcementTuning, KeyCombo};
use crate::session::flags::VisibilityFlags;

/// Accepted session durations, in minutes.
pub const MIN_SESSION_MINUTES: u32 = 1;
pub const MAX_SESSION_MINUTES: u32 = 60;

/// Acknowledgment statuses returned to the popup.
pub const ACK_STARTED: &str = "Timer started";
pub const ACK_ALREADY_RUNNING: &str = "Timer already running";
pub const ACK_INVALID_DURATION: &str = "Invalid duration";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running,
    Expired,
}

/// One timed practice interval from start to expiry.
///
/// Created when a start request is accepted. The visibility flags are
/// captured here once and never change for the session's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub duration_secs: u64,
    pub restricted: bool,
    pub flags: VisibilityFlags,
    pub started_at: DateTime<Utc>,
}

impl Session {
    fn new(
        minutes: u32,
        flags: VisibilityFlags,
        restricted: bool,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if !(MIN_SESSION_MINUTES..=MAX_SESSION_MINUTES).contains(&minutes) {
            return Err(ValidationError::InvalidDuration { minutes });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            duration_secs: u64::from(minutes) * 60,
            restricted,
            flags,
            started_at: now,
        })
    }
}

/// Tuning for widget injection when the anchor element is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjectionTuning {
    /// Fixed delay between mount attempts.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Total attempts before giving up (unrestricted variant only).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_max_attempts() -> u32 {
    10
}

impl Default for InjectionTuning {
    fn default() -> Self {
        Self {
            retry_delay_ms: default_retry_delay_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Construction-time options for a session controller.
#[derive(Debug, Clone, Default)]
pub struct ControllerOptions {
    /// Whether sessions on this page run in restricted (enforced) mode.
    pub restricted: bool,
    pub injection: InjectionTuning,
    pub enforcement: EnforcementTuning,
}

/// Watches the host document for wholesale DOM replacement (SPA
/// navigation). A single callback, connected for exactly the lifetime of
/// a running session, so tests can start and stop it deterministically.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomObserver {
    connected: bool,
}

impl DomObserver {
    pub fn connect(&mut self) {
        self.connected = true;
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Per-page session controller over injected platform seams.
pub struct SessionController<P: PageDom, F: Fullscreen> {
    page: P,
    fullscreen: F,
    options: ControllerOptions,
    state: SessionState,
    session: Option<Session>,
    countdown: Option<Countdown>,
    policy: EnforcementPolicy,
    observer: DomObserver,
    mount_attempts: u32,
    next_mount_at: Option<DateTime<Utc>>,
}

impl<P: PageDom, F: Fullscreen> SessionController<P, F> {
    pub fn new(page: P, fullscreen: F) -> Self {
        Self::with_options(page, fullscreen, ControllerOptions::default())
    }

    pub fn with_options(page: P, fullscreen: F, options: ControllerOptions) -> Self {
        let policy = EnforcementPolicy::with_tuning(options.enforcement.clone());
        Self {
            page,
            fullscreen,
            options,
            state: SessionState::Idle,
            session: None,
            countdown: None,
            policy,
            observer: DomObserver::default(),
            mount_attempts: 0,
            next_mount_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.countdown.as_ref().map(Countdown::remaining_secs).unwrap_or(0)
    }

    pub fn observer(&self) -> &DomObserver {
        &self.observer
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn fullscreen(&self) -> &F {
        &self.fullscreen
    }

    pub fn fullscreen_mut(&mut self) -> &mut F {
        &mut self.fullscreen
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            remaining_secs: self.remaining_secs(),
            total_secs: self.countdown.as_ref().map(Countdown::total_secs).unwrap_or(0),
            restricted: self.options.restricted,
            display: self
                .countdown
                .as_ref()
                .map(Countdown::display)
                .unwrap_or_else(|| format_mmss(0)),
            at: Utc::now(),
        }
    }

    // ── Message handling ─────────────────────────────────────────────

    /// Handle one cross-context request, producing the acknowledgment the
    /// popup is waiting on plus the events the transition emitted.
    pub fn handle_request(&mut self, request: &Request, now: DateTime<Utc>) -> (Ack, Vec<Event>) {
        match request {
            Request::StartTimer { duration, states } => self.start_session(*duration, *states, now),
        }
    }

    fn start_session(
        &mut self,
        minutes: u32,
        flags: VisibilityFlags,
        now: DateTime<Utc>,
    ) -> (Ack, Vec<Event>) {
        // Duplicate starts are idempotent: a mounted widget or a running
        // session means this request changes nothing.
        if self.state == SessionState::Running
            || (self.state == SessionState::Idle && self.page.widget_present())
        {
            tracing::debug!("start request while a session is active; ignoring");
            let event = Event::SessionAlreadyRunning {
                remaining_secs: self.remaining_secs(),
                at: now,
            };
            return (Ack::new(ACK_ALREADY_RUNNING), vec![event]);
        }

        let session = match Session::new(minutes, flags, self.options.restricted, now) {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "rejecting start request");
                return (Ack::new(ACK_INVALID_DURATION), Vec::new());
            }
        };

        // A fresh start after expiry replaces the spent widget.
        self.page.unmount_widget();

        let mut events = vec![Event::SessionStarted {
            id: session.id,
            duration_secs: session.duration_secs,
            restricted: session.restricted,
            flags: session.flags,
            at: now,
        }];

        self.countdown = Some(Countdown::new(session.duration_secs, now));
        self.mount_attempts = 0;
        self.next_mount_at = None;
        self.try_mount(now);

        if session.restricted {
            self.policy.activate();
            if let Err(err) = self.fullscreen.request() {
                tracing::error!(error = %err, "fullscreen request rejected");
            }
        }

        let hidden = session.flags.hidden_sections();
        for section in &hidden {
            self.page.remove_section(*section);
        }
        if !hidden.is_empty() {
            events.push(Event::SectionsHidden {
                sections: hidden,
                at: now,
            });
        }

        self.observer.connect();
        self.state = SessionState::Running;
        self.session = Some(session);
        (Ack::new(ACK_STARTED), events)
    }

    // ── Periodic tick ────────────────────────────────────────────────

    /// Drive the countdown, pending mount retries, and the enforcement
    /// policy's periodic check. Call once per second.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state != SessionState::Running {
            return events;
        }

        if let Some(at) = self.next_mount_at {
            if now >= at {
                self.try_mount(now);
            }
        }

        let expired = match &mut self.countdown {
            Some(countdown) => {
                let expired = countdown.tick(now);
                if countdown.mounted() {
                    self.page.update_widget(&countdown.display());
                }
                expired
            }
            None => false,
        };
        if expired {
            self.expire(now, &mut events);
            return events;
        }

        let effects = self.policy.tick(self.fullscreen.is_fullscreen(), now);
        if effects.dismiss_warning {
            self.page.dismiss_warning();
            events.push(Event::WarningDismissed { at: now });
        }
        if effects.reassert_fullscreen {
            self.request_fullscreen(now, &mut events);
        }
        events
    }

    fn expire(&mut self, now: DateTime<Utc>, events: &mut Vec<Event>) {
        self.state = SessionState::Expired;
        self.policy.deactivate();
        self.page.dismiss_warning();
        self.page.show_notice("Time's up!");
        self.observer.disconnect();
        self.next_mount_at = None;
        if let Some(session) = &self.session {
            events.push(Event::SessionExpired {
                id: session.id,
                at: now,
            });
        }
    }

    // ── Host observations ────────────────────────────────────────────

    /// The DOM-mutation observer fired. Re-injects the widget if the host
    /// replaced its DOM, preserving the running countdown.
    pub fn on_dom_mutated(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        if !self.observer.is_connected() || self.state != SessionState::Running {
            return events;
        }
        if self.page.widget_present() {
            return events;
        }
        tracing::debug!("countdown widget disappeared; re-injecting");
        if let Some(countdown) = &mut self.countdown {
            countdown.unmount();
        }
        self.mount_attempts = 0;
        self.next_mount_at = None;
        if self.try_mount(now) {
            events.push(Event::WidgetReinjected {
                remaining_secs: self.remaining_secs(),
                at: now,
            });
        }
        events
    }

    /// The page's fullscreen state changed.
    pub fn on_fullscreen_change(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        let fullscreen = self.fullscreen.is_fullscreen();
        if self.policy.on_fullscreen_change(fullscreen, now) {
            if let Some(message) = self.policy.warning().map(str::to_string) {
                self.page.show_warning(&message);
                events.push(Event::WarningShown { message, at: now });
            }
            self.request_fullscreen(now, &mut events);
        }
        events
    }

    /// The tab was hidden or became visible again.
    pub fn on_visibility_change(&mut self, hidden: bool, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        if hidden {
            self.policy.on_visibility_change(true, now);
            if let Some(message) = self.policy.warning().map(str::to_string) {
                self.page.show_warning(&message);
                events.push(Event::WarningShown { message, at: now });
            }
        } else if self.policy.on_visibility_change(false, now) {
            self.request_fullscreen(now, &mut events);
        }
        events
    }

    /// Whether a keydown for `combo` must be swallowed.
    pub fn handle_key(&self, combo: &KeyCombo) -> bool {
        self.policy.blocks_key(combo)
    }

    /// Whether the leave-page confirmation must be forced.
    pub fn blocks_unload(&self) -> bool {
        self.policy.blocks_unload()
    }

    /// Whether the context menu must be suppressed.
    pub fn blocks_context_menu(&self) -> bool {
        self.policy.blocks_context_menu()
    }

    /// The hosting page is going away. Cancels the tick bookkeeping, the
    /// observer, and every interception; nothing survives navigation.
    pub fn teardown(&mut self) {
        if let Some(countdown) = &mut self.countdown {
            countdown.unmount();
        }
        self.page.unmount_widget();
        self.page.dismiss_warning();
        self.policy.deactivate();
        self.observer.disconnect();
        self.state = SessionState::Idle;
        self.session = None;
        self.countdown = None;
        self.mount_attempts = 0;
        self.next_mount_at = None;
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Attempt to mount the widget. Missing anchors retry on a fixed
    /// delay (bounded) for unrestricted pages and warn-and-return for
    /// restricted ones.
    fn try_mount(&mut self, now: DateTime<Utc>) -> bool {
        let Some(countdown) = &mut self.countdown else {
            return false;
        };
        if !self.page.anchor_present() {
            self.mount_attempts += 1;
            if self.options.restricted {
                tracing::warn!("widget anchor not found; skipping injection");
                self.next_mount_at = None;
            } else if self.mount_attempts >= self.options.injection.max_attempts {
                tracing::warn!(
                    attempts = self.mount_attempts,
                    "widget anchor not found; giving up"
                );
                self.next_mount_at = None;
            } else {
                tracing::warn!(
                    attempt = self.mount_attempts,
                    "widget anchor not found; retrying"
                );
                self.next_mount_at =
                    Some(now + Duration::milliseconds(self.options.injection.retry_delay_ms as i64));
            }
            return false;
        }
        self.page.clear_anchor();
        match self.page.mount_widget(&countdown.display()) {
            Ok(()) => {
                countdown.mount(now);
                self.mount_attempts = 0;
                self.next_mount_at = None;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to mount widget");
                false
            }
        }
    }

    fn request_fullscreen(&mut self, now: DateTime<Utc>, events: &mut Vec<Event>) {
        match self.fullscreen.request() {
            Ok(()) => events.push(Event::FullscreenReasserted { at: now }),
            Err(err) => tracing::error!(error = %err, "fullscreen request rejected"),
        }
    }
}
