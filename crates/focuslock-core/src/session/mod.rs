mod controller;
mod countdown;
mod enforcement;
mod flags;

pub use controller::{
    ControllerOptions, DomObserver, InjectionTuning, Session, SessionController, SessionState,
    ACK_ALREADY_RUNNING, ACK_INVALID_DURATION, ACK_STARTED, MAX_SESSION_MINUTES,
    MIN_SESSION_MINUTES,
};
pub use countdown::{format_mmss, Countdown};
pub use enforcement::{EnforcementPolicy, EnforcementTuning, KeyCombo, TickEffects};
pub use flags::{Section, VisibilityFlags};
