use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::{Section, SessionState, VisibilityFlags};

/// Every externally observable state change produces an Event.
/// The CLI prints them; a browser shell would relay them to its UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        id: Uuid,
        duration_secs: u64,
        restricted: bool,
        flags: VisibilityFlags,
        at: DateTime<Utc>,
    },
    /// A duplicate start request arrived while a session was running;
    /// it was acknowledged without touching the countdown.
    SessionAlreadyRunning {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SectionsHidden {
        sections: Vec<Section>,
        at: DateTime<Utc>,
    },
    /// The widget vanished with the host's DOM and was mounted again,
    /// countdown intact.
    WidgetReinjected {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    FullscreenReasserted {
        at: DateTime<Utc>,
    },
    WarningShown {
        message: String,
        at: DateTime<Utc>,
    },
    WarningDismissed {
        at: DateTime<Utc>,
    },
    SessionExpired {
        id: Uuid,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SessionState,
        remaining_secs: u64,
        total_secs: u64,
        restricted: bool,
        display: String,
        at: DateTime<Utc>,
    },
}
