//! Enforcement policy for restricted sessions.
//!
//! While active, the policy resists attempts to leave the timed task:
//! fullscreen exits are re-requested, a fixed set of navigation/exit key
//! combinations is blocked, visibility loss draws a warning, and the
//! browser's leave-page confirmation cannot be skipped. The moment the
//! session expires the policy deactivates and every interception stops.
//!
//! This is advisory hardening, not a security boundary: nothing here can
//! stop a user from killing the browser process.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A keyboard combination observed by the host page.
///
/// Serializes as its textual form (`"ctrl+w"`, `"escape"`) so blocked-key
/// lists read naturally in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    /// Lowercased key name, e.g. `"escape"`, `"w"`, `"tab"`.
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Serialize for KeyCombo {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyCombo {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl KeyCombo {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_ascii_lowercase(),
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
        }
    }

    pub fn ctrl(key: &str) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(key)
        }
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "ctrl+")?;
        }
        if self.alt {
            write!(f, "alt+")?;
        }
        if self.shift {
            write!(f, "shift+")?;
        }
        if self.meta {
            write!(f, "meta+")?;
        }
        f.write_str(&self.key)
    }
}

impl FromStr for KeyCombo {
    type Err = ValidationError;

    /// Parse `"ctrl+w"`, `"escape"`, `"ctrl+shift+tab"`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut combo = KeyCombo::plain("");
        let mut parts = s.split('+').map(|p| p.trim().to_ascii_lowercase());
        let Some(mut last) = parts.next() else {
            return Err(ValidationError::InvalidKeyCombo(s.to_string()));
        };
        for part in parts {
            match last.as_str() {
                "ctrl" | "control" => combo.ctrl = true,
                "alt" => combo.alt = true,
                "shift" => combo.shift = true,
                "meta" | "cmd" | "super" => combo.meta = true,
                _ => return Err(ValidationError::InvalidKeyCombo(s.to_string())),
            }
            last = part;
        }
        if last.is_empty() {
            return Err(ValidationError::InvalidKeyCombo(s.to_string()));
        }
        combo.key = last;
        Ok(combo)
    }
}

/// Tuning knobs for the enforcement policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcementTuning {
    /// How long a transient warning stays up before auto-dismissing.
    #[serde(default = "default_warning_dismiss_ms")]
    pub warning_dismiss_ms: u64,
    /// Key combinations swallowed while the policy is active.
    #[serde(default = "default_blocked_keys")]
    pub blocked_keys: Vec<KeyCombo>,
}

fn default_warning_dismiss_ms() -> u64 {
    1000
}

/// Escape, close-tab, tab-switch.
fn default_blocked_keys() -> Vec<KeyCombo> {
    vec![
        KeyCombo::plain("escape"),
        KeyCombo::ctrl("w"),
        KeyCombo::ctrl("tab"),
    ]
}

impl Default for EnforcementTuning {
    fn default() -> Self {
        Self {
            warning_dismiss_ms: default_warning_dismiss_ms(),
            blocked_keys: default_blocked_keys(),
        }
    }
}

/// The transient warning currently on screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Warning {
    message: String,
    shown_at: DateTime<Utc>,
}

/// What the controller must do after a periodic enforcement check.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TickEffects {
    pub reassert_fullscreen: bool,
    pub dismiss_warning: bool,
}

/// Restricted-mode enforcement state machine.
///
/// The policy itself is pure bookkeeping; the session controller executes
/// the resulting effects against the injected page traits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcementPolicy {
    active: bool,
    tuning: EnforcementTuning,
    warning: Option<Warning>,
}

impl Default for EnforcementPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl EnforcementPolicy {
    pub fn new() -> Self {
        Self::with_tuning(EnforcementTuning::default())
    }

    pub fn with_tuning(tuning: EnforcementTuning) -> Self {
        Self {
            active: false,
            tuning,
            warning: None,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Stop every interception immediately. Called unconditionally when
    /// the session expires or the page tears down.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.warning = None;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Whether a keydown for `combo` must be swallowed.
    pub fn blocks_key(&self, combo: &KeyCombo) -> bool {
        self.active && self.tuning.blocked_keys.contains(combo)
    }

    /// Whether the leave-page confirmation must be forced.
    pub fn blocks_unload(&self) -> bool {
        self.active
    }

    /// Whether the context menu must be suppressed.
    pub fn blocks_context_menu(&self) -> bool {
        self.active
    }

    /// The transient warning currently on screen, if any.
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_ref().map(|w| w.message.as_str())
    }

    // ── Observations ─────────────────────────────────────────────────

    /// Page reported a fullscreen change. Returns `true` when fullscreen
    /// was lost and must be re-requested (with a warning shown).
    pub fn on_fullscreen_change(&mut self, fullscreen: bool, now: DateTime<Utc>) -> bool {
        if !self.active || fullscreen {
            return false;
        }
        self.show_warning("Stay focused! Returning to fullscreen.", now);
        true
    }

    /// Tab visibility changed. Warns on loss; returns `true` when the tab
    /// came back and focus/fullscreen should be reattempted.
    pub fn on_visibility_change(&mut self, hidden: bool, now: DateTime<Utc>) -> bool {
        if !self.active {
            return false;
        }
        if hidden {
            self.show_warning("The countdown keeps running while you are away.", now);
            false
        } else {
            true
        }
    }

    /// Periodic check, driven by the same 1 Hz callback as the countdown.
    /// Expires stale warnings and flags fullscreen reassertion.
    pub fn tick(&mut self, fullscreen: bool, now: DateTime<Utc>) -> TickEffects {
        let mut effects = TickEffects::default();
        if !self.active {
            return effects;
        }
        if let Some(warning) = &self.warning {
            let age_ms = (now - warning.shown_at).num_milliseconds().max(0) as u64;
            if age_ms >= self.tuning.warning_dismiss_ms {
                self.warning = None;
                effects.dismiss_warning = true;
            }
        }
        effects.reassert_fullscreen = !fullscreen;
        effects
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn show_warning(&mut self, message: &str, now: DateTime<Utc>) {
        self.warning = Some(Warning {
            message: message.to_string(),
            shown_at: now,
        });
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
    fn inactive_policy_blocks_nothing() {
        let policy = EnforcementPolicy::new();
        assert!(!policy.blocks_key(&KeyCombo::plain("escape")));
        assert!(!policy.blocks_unload());
    }

    #[test]
    fn active_policy_blocks_the_fixed_set() {
        let mut policy = EnforcementPolicy::new();
        policy.activate();
        assert!(policy.blocks_key(&KeyCombo::plain("escape")));
        assert!(policy.blocks_key(&KeyCombo::ctrl("w")));
        assert!(policy.blocks_key(&KeyCombo::ctrl("tab")));
        // Everything else passes through.
        assert!(!policy.blocks_key(&KeyCombo::plain("a")));
        assert!(!policy.blocks_key(&KeyCombo::ctrl("c")));
        assert!(policy.blocks_unload());
        assert!(policy.blocks_context_menu());
    }

    #[test]
    fn fullscreen_loss_warns_and_requests_reassertion() {
        let mut policy = EnforcementPolicy::new();
        policy.activate();
        assert!(policy.on_fullscreen_change(false, t0()));
        assert!(policy.warning().is_some());
        // Entering fullscreen is not an infraction.
        assert!(!policy.on_fullscreen_change(true, t0()));
    }

    #[test]
    fn warning_auto_dismisses_after_interval() {
        let mut policy = EnforcementPolicy::new();
        policy.activate();
        policy.on_fullscreen_change(false, t0());
        let effects = policy.tick(true, t0() + Duration::milliseconds(500));
        assert!(!effects.dismiss_warning);
        let effects = policy.tick(true, t0() + Duration::milliseconds(1001));
        assert!(effects.dismiss_warning);
        assert!(policy.warning().is_none());
    }

    #[test]
    fn tick_reasserts_fullscreen_while_lost() {
        let mut policy = EnforcementPolicy::new();
        policy.activate();
        assert!(policy.tick(false, t0()).reassert_fullscreen);
        assert!(!policy.tick(true, t0()).reassert_fullscreen);
    }

    #[test]
    fn visibility_loss_warns_and_return_reclaims() {
        let mut policy = EnforcementPolicy::new();
        policy.activate();
        assert!(!policy.on_visibility_change(true, t0()));
        assert!(policy.warning().is_some());
        assert!(policy.on_visibility_change(false, t0() + Duration::seconds(5)));
    }

    #[test]
    fn deactivate_stops_everything_at_once() {
        let mut policy = EnforcementPolicy::new();
        policy.activate();
        policy.on_fullscreen_change(false, t0());
        policy.deactivate();
        assert!(!policy.blocks_key(&KeyCombo::plain("escape")));
        assert!(!policy.blocks_unload());
        assert!(policy.warning().is_none());
        assert_eq!(policy.tick(false, t0()), TickEffects::default());
    }

    #[test]
    fn key_combo_parsing() {
        assert_eq!("escape".parse::<KeyCombo>().unwrap(), KeyCombo::plain("escape"));
        assert_eq!("Ctrl+W".parse::<KeyCombo>().unwrap(), KeyCombo::ctrl("w"));
        let combo: KeyCombo = "ctrl+shift+tab".parse().unwrap();
        assert!(combo.ctrl && combo.shift);
        assert_eq!(combo.key, "tab");
        assert!("bogus+w".parse::<KeyCombo>().is_err());
        assert!("ctrl+".parse::<KeyCombo>().is_err());
    }
}
