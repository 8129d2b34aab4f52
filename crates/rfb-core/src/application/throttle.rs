//! Per-key leading/trailing-edge rate limiter.
//!
//! # How the gate works (for beginners)
//!
//! Continuous input streams (pointer moves, resizes) can produce hundreds of
//! events per second, far more than the producer needs.  The gate lets the
//! first event of a burst through immediately, then opens a cooldown window
//! of length `wait`.  Events arriving inside the window are not queued: only
//! the *latest* one is kept and delivered once when the window expires.
//!
//! ```text
//! calls:   a   b      c            d
//!          │   │      │            │
//! time ────┼───┼──────┼────┬───────┼──────►
//!          t  t+5   t+12  t+20    t+30     (wait = 20)
//! fires:   a                c      d
//!          (immediate)   (trailing) (immediate: window is over)
//! ```
//!
//! Every key has its own independent window.
//!
//! The gate does not own a timer.  When a call is deferred it returns the
//! delay after which the caller must invoke [`ThrottleGate::on_expire`].
//! A timer that fires before the window is over gets the remaining delay
//! back as [`Expiry::Rearm`] and must be started again.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// What the caller must do with a value passed to [`ThrottleGate::call`].
#[derive(Debug, PartialEq)]
pub enum ThrottleDecision<T> {
    /// Deliver the value now.
    Fire(T),
    /// The value is held until the window expires.
    ///
    /// `arm` is `Some(delay)` when no expiry timer is pending for the key yet
    /// and the caller must start one; `None` when an earlier deferred value
    /// was replaced and the existing timer still applies.
    Deferred { arm: Option<Duration> },
}

/// Outcome of [`ThrottleGate::on_expire`].
#[derive(Debug, PartialEq)]
pub enum Expiry<T> {
    /// Deliver the deferred value now.
    Fire(T),
    /// The timer came early; start it again with this delay.
    Rearm(Duration),
    /// Nothing to deliver.
    Nothing,
}

/// Observable state of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// The next call fires immediately.
    Ready,
    /// Inside a window with a deferred value waiting.
    CooldownWithPending,
    /// Inside a window with nothing waiting.
    CooldownIdle,
}

#[derive(Debug)]
struct Window<T> {
    expires: Instant,
    pending: Option<T>,
}

/// A set of independent throttle windows keyed by `K`.
#[derive(Debug)]
pub struct ThrottleGate<K, T> {
    windows: HashMap<K, Window<T>>,
}

impl<K, T> Default for ThrottleGate<K, T> {
    fn default() -> Self {
        Self {
            windows: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, T> ThrottleGate<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers `value` under `key` at time `now`.
    pub fn call(&mut self, key: K, wait: Duration, value: T, now: Instant) -> ThrottleDecision<T> {
        match self.windows.get_mut(&key) {
            Some(window) if now < window.expires => {
                let arm = if window.pending.is_none() {
                    Some(window.expires - now)
                } else {
                    None
                };
                window.pending = Some(value);
                ThrottleDecision::Deferred { arm }
            }
            _ => {
                // A late expiry timer may still be outstanding for this key;
                // the fresh window makes it stale (see `on_expire`).
                self.windows.insert(
                    key,
                    Window {
                        expires: now + wait,
                        pending: None,
                    },
                );
                ThrottleDecision::Fire(value)
            }
        }
    }

    /// Handles the expiry timer for `key`.
    ///
    /// Inside the window a pending value is kept and the remaining delay is
    /// returned; without one the timer is stale (it belongs to an earlier
    /// window).  After a trailing fire the key is ready again.
    pub fn on_expire(&mut self, key: &K, now: Instant) -> Expiry<T> {
        let Some(window) = self.windows.get(key) else {
            return Expiry::Nothing;
        };
        if now < window.expires {
            return match window.pending {
                Some(_) => Expiry::Rearm(window.expires - now),
                None => Expiry::Nothing,
            };
        }
        match self.windows.remove(key).and_then(|w| w.pending) {
            Some(value) => Expiry::Fire(value),
            None => Expiry::Nothing,
        }
    }

    /// State of `key` at time `now`.
    pub fn state(&self, key: &K, now: Instant) -> GateState {
        match self.windows.get(key) {
            Some(window) if window.pending.is_some() => GateState::CooldownWithPending,
            Some(window) if now < window.expires => GateState::CooldownIdle,
            _ => GateState::Ready,
        }
    }

    /// Drops all windows and any deferred values.
    pub fn clear(&mut self) {
        self.windows.clear();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
