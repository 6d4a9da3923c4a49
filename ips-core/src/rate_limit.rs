//! Sliding-window rate limiter with IP banning.
//!
//! Grounded on `original_source/src/rate_limit/rate_limiter.cpp`: a single
//! mutex guards a map from source IP to a timestamp log plus ban state.
//! `check_rate_limit` is the only operation that prunes stale timestamps;
//! `ban_ip`/`is_banned`/`get_request_count` leave the log untouched, exactly
//! matching the original's call pattern.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// How long a timestamp is kept before it no longer counts toward any
/// window, regardless of the rule's own `time_window_seconds`. Matches
/// `original_source`'s one-hour retention constant.
const RETENTION: Duration = Duration::from_secs(3600);

struct Entry {
    timestamps: Vec<Instant>,
    banned: bool,
    ban_until: Instant,
}

impl Entry {
    fn new(now: Instant) -> Self {
        Self { timestamps: Vec::new(), banned: false, ban_until: now }
    }
}

/// Per-source sliding-window counters and ban state, safe to share across
/// worker threads behind a single `Mutex`.
pub struct RateLimiter {
    entries: Mutex<HashMap<String, Entry>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }

    fn cleanup(map: &mut HashMap<String, Entry>, now: Instant) {
        map.retain(|_, entry| {
            entry.timestamps.retain(|t| now.saturating_duration_since(*t) <= RETENTION);
            !(entry.timestamps.is_empty() && !entry.banned)
        });
    }

    /// Records one request from `ip` and reports whether it trips
    /// `max_requests` within `time_window_seconds`. Runs cleanup first, as
    /// in the original: every probe prunes the whole map before counting.
    pub fn check_rate_limit(&self, ip: &str, max_requests: i64, time_window_seconds: i64) -> bool {
        let mut map = self.entries.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();
        Self::cleanup(&mut map, now);

        if let Some(entry) = map.get_mut(ip) {
            if entry.banned {
                if now < entry.ban_until {
                    return true;
                }
                entry.banned = false;
            }
        }

        let window = Duration::from_secs(time_window_seconds.max(0) as u64);
        let threshold = now.checked_sub(window).unwrap_or(now);

        let entry = map.entry(ip.to_string()).or_insert_with(|| Entry::new(now));
        let count = entry.timestamps.iter().filter(|t| **t >= threshold).count() as i64;
        if count >= max_requests {
            return true;
        }
        entry.timestamps.push(now);
        false
    }

    /// Marks `ip` as banned for `duration_seconds` from now.
    pub fn ban_ip(&self, ip: &str, duration_seconds: i64) {
        let mut map = self.entries.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();
        let entry = map.entry(ip.to_string()).or_insert_with(|| Entry::new(now));
        entry.banned = true;
        entry.ban_until = now + Duration::from_secs(duration_seconds.max(0) as u64);
    }

    /// True if `ip` is currently under an active ban. Clears an expired ban
    /// as a side effect, same as the original's lazy expiry.
    pub fn is_banned(&self, ip: &str) -> bool {
        let mut map = self.entries.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();
        if let Some(entry) = map.get_mut(ip) {
            if entry.banned {
                if now < entry.ban_until {
                    return true;
                }
                entry.banned = false;
            }
        }
        false
    }

    /// Number of timestamps for `ip` still inside `time_window_seconds`.
    /// Does not prune — purely observational.
    pub fn get_request_count(&self, ip: &str, time_window_seconds: i64) -> usize {
        let map = self.entries.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();
        match map.get(ip) {
            Some(entry) => {
                let window = Duration::from_secs(time_window_seconds.max(0) as u64);
                let threshold = now.checked_sub(window).unwrap_or(now);
                entry.timestamps.iter().filter(|t| **t >= threshold).count()
            }
            None => 0,
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
