//! # Cooldowns
//!
//! Two independent scopes of rate limiting:
//! - `CooldownTracker`: one timestamp per command, owned by the channel session.
//! - `CallerCooldowns`: one timestamp per caller, owned by a module instance.
//!
//! Commands use check-then-set: a check that fails leaves the state untouched.
//! Sessions are processed serially, which makes the pair atomic per channel.
//! Caller cooldowns are checked first and charged only once the module's action succeeded.
//! Timestamps come from `tokio::time::Instant` so tests can pause the clock.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    Ready,
    OnCooldown { remaining: Duration },
}

impl CooldownStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Keyed last-use timestamps.
#[derive(Debug, Default)]
struct Stamps {
    last: HashMap<String, Instant>,
}

impl Stamps {
    fn check_and_consume(&mut self, key: &str, cooldown: Duration, now: Instant) -> CooldownStatus {
        if let Some(last) = self.last.get(key) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < cooldown {
                return CooldownStatus::OnCooldown {
                    remaining: cooldown - elapsed,
                };
            }
        }
        self.last.insert(key.to_string(), now);
        CooldownStatus::Ready
    }
}

/// Command-level cooldowns for one channel.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    stamps: Stamps,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Charges the command if its cooldown has elapsed. A zero cooldown is always ready.
    pub fn check_and_consume(&mut self, command: &str, cooldown_seconds: u64) -> CooldownStatus {
        self.stamps.check_and_consume(
            command,
            Duration::from_secs(cooldown_seconds),
            Instant::now(),
        )
    }

    /// Drops the timestamp, e.g. after a command is removed.
    pub fn forget(&mut self, command: &str) {
        self.stamps.last.remove(command);
    }
}

/// Per-caller cooldowns for modules that limit each user separately.
#[derive(Debug)]
pub struct CallerCooldowns {
    cooldown: Duration,
    stamps: Stamps,
}

impl CallerCooldowns {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            stamps: Stamps::default(),
        }
    }

    /// Non-mutating check, for modules that only charge after the action succeeds.
    pub fn status(&self, caller_id: &str) -> CooldownStatus {
        match self.stamps.last.get(caller_id) {
            Some(last) => {
                let elapsed = Instant::now().saturating_duration_since(*last);
                if elapsed < self.cooldown {
                    CooldownStatus::OnCooldown {
                        remaining: self.cooldown - elapsed,
                    }
                } else {
                    CooldownStatus::Ready
                }
            }
            None => CooldownStatus::Ready,
        }
    }

    /// Unconditionally stamps the caller.
    pub fn charge(&mut self, caller_id: &str) {
        self.stamps.last.insert(caller_id.to_string(), Instant::now());
    }
}
