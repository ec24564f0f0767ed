//! Countdown widget state.
//!
//! The countdown is a wall-clock-based decrementer. It does not own a
//! thread - the caller invokes `tick()` once per second and the countdown
//! catches up on whatever wall-clock time actually elapsed, so a delayed
//! callback can never make the display drift ahead or go negative.
//!
//! ## Usage
//!
//! ```ignore
//! let mut countdown = Countdown::new(300, Utc::now());
//! countdown.mount(Utc::now());
//! // In a 1 Hz loop:
//! if countdown.tick(Utc::now()) { /* expired */ }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format a number of seconds as zero-padded `MM:SS`.
pub fn format_mmss(total_secs: u64) -> String {
    let minutes = total_secs / 60;
    let secs = total_secs % 60;
    format!("{minutes:02}:{secs:02}")
}

/// Per-second countdown backing the injected widget.
///
/// The session controller owns the periodic callback; the widget itself
/// holds no timer to leak. Unmounting drops the tick baseline so time
/// spent unmounted is not charged retroactively when the widget is
/// re-injected after an in-page navigation -- the countdown keeps
/// running either way, so a missing widget can never stall expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Countdown {
    total_ms: u64,
    remaining_ms: u64,
    running: bool,
    mounted: bool,
    /// Timestamp of the last applied tick; `None` while unmounted.
    #[serde(default)]
    last_tick: Option<DateTime<Utc>>,
}

impl Countdown {
    /// Create a running countdown for `duration_secs` seconds.
    pub fn new(duration_secs: u64, now: DateTime<Utc>) -> Self {
        let total_ms = duration_secs.saturating_mul(1000);
        Self {
            total_ms,
            remaining_ms: total_ms,
            running: true,
            mounted: false,
            last_tick: Some(now),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn mounted(&self) -> bool {
        self.mounted
    }

    pub fn total_secs(&self) -> u64 {
        self.total_ms / 1000
    }

    /// Remaining whole seconds, rounded up so a mid-second tick still
    /// shows the second that is currently elapsing.
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_ms.div_ceil(1000)
    }

    /// Zero-padded `MM:SS` for the widget. Reaches exactly `00:00` at
    /// expiry and never goes below it.
    pub fn display(&self) -> String {
        format_mmss(self.remaining_secs())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Mark the widget as mounted and restart the tick baseline.
    pub fn mount(&mut self, now: DateTime<Utc>) {
        self.mounted = true;
        if self.running {
            self.last_tick = Some(now);
        }
    }

    /// Mark the widget as unmounted, cancelling its tick bookkeeping.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.last_tick = None;
    }

    /// Apply elapsed wall-clock time. Returns `true` exactly once, on the
    /// tick that reaches zero.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if !self.running {
            return false;
        }
        let Some(prev) = self.last_tick else {
            self.last_tick = Some(now);
            return false;
        };
        let elapsed = (now - prev).num_milliseconds().max(0) as u64;
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
        self.last_tick = Some(now);
        if self.remaining_ms == 0 {
            self.running = false;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn initializes_to_exact_seconds() {
        let countdown = Countdown::new(5 * 60, t0());
        assert_eq!(countdown.remaining_secs(), 300);
        assert_eq!(countdown.display(), "05:00");
    }

    #[test]
    fn ticks_decrement_once_per_second() {
        let mut countdown = Countdown::new(300, t0());
        countdown.mount(t0());
        assert!(!countdown.tick(t0() + Duration::seconds(1)));
        assert_eq!(countdown.remaining_secs(), 299);
        assert_eq!(countdown.display(), "04:59");
    }

    #[test]
    fn delayed_tick_catches_up() {
        let mut countdown = Countdown::new(300, t0());
        countdown.mount(t0());
        countdown.tick(t0() + Duration::seconds(7));
        assert_eq!(countdown.remaining_secs(), 293);
    }

    #[test]
    fn mid_second_tick_rounds_up() {
        let mut countdown = Countdown::new(300, t0());
        countdown.mount(t0());
        countdown.tick(t0() + Duration::milliseconds(1003));
        // 298_997 ms left still displays the 299th second.
        assert_eq!(countdown.remaining_secs(), 299);
    }

    #[test]
    fn expires_exactly_once_at_zero() {
        let mut countdown = Countdown::new(2, t0());
        countdown.mount(t0());
        assert!(!countdown.tick(t0() + Duration::seconds(1)));
        assert!(countdown.tick(t0() + Duration::seconds(2)));
        assert_eq!(countdown.display(), "00:00");
        assert!(!countdown.running());
        // Further ticks neither re-signal nor go negative.
        assert!(!countdown.tick(t0() + Duration::seconds(3)));
        assert_eq!(countdown.display(), "00:00");
    }

    #[test]
    fn overshoot_never_goes_negative() {
        let mut countdown = Countdown::new(2, t0());
        countdown.mount(t0());
        assert!(countdown.tick(t0() + Duration::seconds(30)));
        assert_eq!(countdown.remaining_secs(), 0);
        assert_eq!(countdown.display(), "00:00");
    }

    #[test]
    fn unmount_drops_the_baseline() {
        let mut countdown = Countdown::new(300, t0());
        countdown.mount(t0());
        countdown.tick(t0() + Duration::seconds(1));
        countdown.unmount();
        // The first tick after unmounting only re-baselines; the gap is
        // not charged.
        assert!(!countdown.tick(t0() + Duration::seconds(100)));
        assert_eq!(countdown.remaining_secs(), 299);
        // But the countdown keeps running from there.
        countdown.tick(t0() + Duration::seconds(105));
        assert_eq!(countdown.remaining_secs(), 294);
    }

    #[test]
    fn remount_preserves_remaining_without_back_charging() {
        let mut countdown = Countdown::new(300, t0());
        countdown.mount(t0());
        countdown.tick(t0() + Duration::seconds(10));
        countdown.unmount();
        // Re-mounted 60 s later (SPA navigation); the gap is not charged.
        countdown.mount(t0() + Duration::seconds(70));
        countdown.tick(t0() + Duration::seconds(71));
        assert_eq!(countdown.remaining_secs(), 289);
    }

    #[test]
    fn format_pads_both_fields() {
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_mmss(9), "00:09");
        assert_eq!(format_mmss(61), "01:01");
        assert_eq!(format_mmss(3600), "60:00");
    }
}
