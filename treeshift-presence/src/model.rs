//! Presence values and the online policy.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a member's client last reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceState {
    Online,
    Background,
    Offline,
    /// Missing or unrecognised in storage.
    #[default]
    Unknown,
}

impl PresenceState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Background => "background",
            Self::Offline => "offline",
            Self::Unknown => "unknown",
        }
    }

    /// States a client writes while the app is alive.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Online | Self::Background)
    }
}

impl fmt::Display for PresenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresenceState {
    type Err = std::convert::Infallible;

    /// Never fails: unrecognised values read as [`PresenceState::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "online" => Self::Online,
            "background" => Self::Background,
            "offline" => Self::Offline,
            _ => Self::Unknown,
        })
    }
}

/// Decides who counts as online.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresencePolicy {
    /// How long after `last_seen` a member stays online.
    pub online_ttl_seconds: u64,
    /// Extra slack for clock skew and late heartbeats.
    pub grace_seconds: u64,
}

impl Default for PresencePolicy {
    fn default() -> Self {
        Self {
            online_ttl_seconds: 45,
            grace_seconds: 10,
        }
    }
}

impl PresencePolicy {
    /// Total window after `last_seen` during which a member is online.
    #[must_use]
    pub fn window(&self) -> Duration {
        let secs = self
            .online_ttl_seconds
            .saturating_add(self.grace_seconds)
            .min(u64::from(u32::MAX));
        Duration::seconds(secs as i64)
    }

    /// Offline members and members never seen are not online. Everyone else
    /// is online until `ttl + grace` has passed since they were last seen.
    #[must_use]
    pub fn is_online(
        &self,
        last_seen: Option<DateTime<Utc>>,
        state: PresenceState,
        now: DateTime<Utc>,
    ) -> bool {
        if state == PresenceState::Offline {
            return false;
        }
        match last_seen {
            Some(seen) => now - seen <= self.window(),
            None => false,
        }
    }
}

/// One member's stored presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceSnapshot {
    pub uid: String,
    pub state: PresenceState,
    pub last_seen: Option<DateTime<Utc>>,
}

impl PresenceSnapshot {
    #[must_use]
    pub fn is_online(&self, policy: &PresencePolicy, now: DateTime<Utc>) -> bool {
        policy.is_online(self.last_seen, self.state, now)
    }
}

/// A presence write. `None` fields keep whatever is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceUpdate {
    pub state: PresenceState,
    pub last_seen: DateTime<Utc>,
    pub device_id: Option<String>,
    pub app_version: Option<String>,
}

impl PresenceUpdate {
    #[must_use]
    pub fn new(state: PresenceState, last_seen: DateTime<Utc>) -> Self {
        Self {
            state,
            last_seen,
            device_id: None,
            app_version: None,
        }
    }
}
