//! # Focuslock Core Library
//!
//! This library provides the core logic for Focuslock, a focus-session
//! engine for timed coding practice. A popup controller picks a duration
//! and a set of page sections to hide; a per-page session controller
//! renders a countdown, optionally locks the environment into a
//! restricted focus mode, and releases everything when the timer expires.
//!
//! ## Architecture
//!
//! - **Session Controller**: An `Idle -> Running -> Expired` state machine
//!   driven by a caller-supplied 1 Hz `tick()`; all DOM and fullscreen
//!   effects go through injected traits
//! - **Countdown**: Wall-clock-based per-second decrementer backing the
//!   injected `MM:SS` widget
//! - **Enforcement Policy**: Restricted-mode hardening (fullscreen
//!   reassertion, key blocking, unload guard)
//! - **Messages**: One-shot request/acknowledgment protocol between the
//!   popup and page contexts
//!
//! ## Key Components
//!
//! - [`SessionController`]: Per-page session state machine
//! - [`PopupController`]: Duration/visibility option surface
//! - [`EnforcementPolicy`]: Restricted-mode interception
//! - [`Config`]: Application configuration management

pub mod config;
pub mod error;
pub mod events;
pub mod message;
pub mod page;
pub mod popup;
pub mod session;

pub use config::Config;
pub use error::{ConfigError, CoreError, MessageError, PageError, ValidationError};
pub use events::Event;
pub use message::{Ack, LocalTransport, PageId, Request, Transport};
pub use page::{Fullscreen, MemoryFullscreen, MemoryPage, PageDom};
pub use popup::{PopupController, PRESET_MINUTES};
pub use session::{
    ControllerOptions, Countdown, EnforcementPolicy, EnforcementTuning, KeyCombo, Section, Session,
    SessionController, SessionState, VisibilityFlags,
};
