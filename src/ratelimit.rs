//! bounded sliding-window request counter
//!
//! tracks message timestamps per user. the number of tracked users is
//! capped at `max_users`; when a new user arrives at capacity the user that
//! was registered first is dropped, regardless of how recently it was seen.

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::message::UserId;

pub const DEFAULT_MAX_PER_USER: u32 = 3;
pub const DEFAULT_MAX_USERS: usize = 1000;
pub const DEFAULT_DELETE_AFTER_HOURS: f64 = 1.0;

/// rate limit parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    max_per_user: u32,
    max_users: usize,
    delete_after: Duration,
}

impl RateLimitSettings {
    /// create settings with an explicit window
    ///
    /// fails if `max_users` is zero or the window is not positive
    pub fn new(max_per_user: u32, max_users: usize, delete_after: Duration) -> Result<Self> {
        if max_users == 0 {
            return Err(Error::config("rate_limit.max_users must be at least 1"));
        }
        if delete_after <= Duration::zero() {
            return Err(Error::config(
                "rate_limit.delete_after_hours must be greater than 0",
            ));
        }

        Ok(Self {
            max_per_user,
            max_users,
            delete_after,
        })
    }

    /// create settings with the window given in (possibly fractional) hours
    pub fn from_hours(max_per_user: u32, max_users: usize, hours: f64) -> Result<Self> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(Error::config(format!(
                "rate_limit.delete_after_hours must be a positive number, got {}",
                hours
            )));
        }

        let millis = (hours * 3_600_000.0).round();
        if millis > i64::MAX as f64 {
            return Err(Error::config(format!(
                "rate_limit.delete_after_hours is too large: {}",
                hours
            )));
        }

        Self::new(max_per_user, max_users, Duration::milliseconds(millis as i64))
    }

    pub fn max_per_user(&self) -> u32 {
        self.max_per_user
    }

    pub fn max_users(&self) -> usize {
        self.max_users
    }

    pub fn delete_after(&self) -> Duration {
        self.delete_after
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_per_user: DEFAULT_MAX_PER_USER,
            max_users: DEFAULT_MAX_USERS,
            delete_after: Duration::hours(1),
        }
    }
}

/// per-user timestamp ledger, ordered by first registration
#[derive(Debug, Clone, Default)]
pub struct RequestCounter {
    users: IndexMap<UserId, Vec<DateTime<Utc>>>,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// record a request from `user_id` at `timestamp` and decide admission
    ///
    /// not idempotent: an admitted request is remembered and counts against
    /// the next call.
    pub fn admit(
        &mut self,
        settings: &RateLimitSettings,
        user_id: UserId,
        timestamp: DateTime<Utc>,
    ) -> bool {
        let Some(timestamps) = self.users.get_mut(&user_id) else {
            if self.users.len() >= settings.max_users {
                if let Some((evicted, _)) = self.users.shift_remove_index(0) {
                    debug!(user = evicted, "rate counter full, evicted first registered user");
                }
            }
            self.users.insert(user_id, vec![timestamp]);
            return true;
        };

        // stale entries are pruned only when their user is touched
        timestamps.retain(|&t| timestamp - t < settings.delete_after);

        if (timestamps.len() as u64) < u64::from(settings.max_per_user) {
            timestamps.push(timestamp);
            true
        } else {
            debug!(
                user = user_id,
                recent = timestamps.len(),
                "rate limit reached"
            );
            false
        }
    }

    /// number of tracked users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.users.contains_key(&user_id)
    }

    /// stored timestamps for a user, as of the last time it was touched
    pub fn history(&self, user_id: UserId) -> Option<&[DateTime<Utc>]> {
        self.users.get(&user_id).map(Vec::as_slice)
    }

    /// tracked users in eviction order
    pub fn users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.users.keys().copied()
    }

    pub fn clear(&mut self) {
        self.users.clear();
    }
}
