//! Liveness probing of links and submitter profiles.
//!
//! A probe asks for headers only and keeps asking until the answer is either
//! 200 or 404. Those two answers are final and get memoized; anything else
//! (rate limiting, server errors, redirects that never settle) is retried up
//! to [`ProbePolicy::max_attempts`] times and never cached.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PostgenError, PostgenResult};
use crate::store::KeyValueStore;

pub const STATUS_OK: u16 = 200;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_TOO_MANY_REQUESTS: u16 = 429;

pub const DEFAULT_PROFILE_URL_BASE: &str = "https://www.reddit.com/user/";

/// Network capability: return the status code of a header-only request.
pub trait StatusSource {
    fn head(&self, url: &str) -> PostgenResult<u16>;
}

impl<F> StatusSource for F
where
    F: Fn(&str) -> PostgenResult<u16>,
{
    fn head(&self, url: &str) -> PostgenResult<u16> {
        self(url)
    }
}

/// Sends real `HEAD` requests.
pub struct HttpStatusSource {
    client: reqwest::blocking::Client,
}

impl HttpStatusSource {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        HttpStatusSource { client }
    }
}

impl StatusSource for HttpStatusSource {
    fn head(&self, url: &str) -> PostgenResult<u16> {
        let response = self
            .client
            .head(url)
            .send()
            .map_err(|e| PostgenError::Http(e.to_string()))?;
        Ok(response.status().as_u16())
    }
}

/// Retry and backoff settings for probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbePolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub delay_step_ms: u64,
    /// URLs containing any of these are delayed on every attempt.
    pub rate_limited_hosts: Vec<String>,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        ProbePolicy {
            max_attempts: 20,
            base_delay_ms: 1000,
            delay_step_ms: 200,
            rate_limited_hosts: vec!["reddit".to_string()],
        }
    }
}

impl ProbePolicy {
    /// Delay to wait before `attempt` (0-based), given the previous status.
    pub fn delay_before(&self, url: &str, attempt: u32, previous: Option<u16>) -> Option<Duration> {
        let sensitive = self
            .rate_limited_hosts
            .iter()
            .any(|host| url.contains(host.as_str()));
        let throttled = attempt > 1 && previous == Some(STATUS_TOO_MANY_REQUESTS);

        if !sensitive && !throttled {
            return None;
        }

        let ms = self
            .base_delay_ms
            .saturating_add(self.delay_step_ms.saturating_mul(u64::from(attempt)));
        Some(Duration::from_millis(ms))
    }
}

fn is_account_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn is_settled(code: u16) -> bool {
    code == STATUS_OK || code == STATUS_NOT_FOUND
}

/// Memoizing prober over a [`StatusSource`] and a status cache.
pub struct LivenessProber<S, C> {
    source: S,
    cache: C,
    policy: ProbePolicy,
    profile_url_base: String,
}

impl<S: StatusSource, C: KeyValueStore> LivenessProber<S, C> {
    pub fn new(source: S, cache: C, policy: ProbePolicy) -> Self {
        LivenessProber {
            source,
            cache,
            policy,
            profile_url_base: DEFAULT_PROFILE_URL_BASE.to_string(),
        }
    }

    pub fn with_profile_url_base(mut self, base: impl Into<String>) -> Self {
        self.profile_url_base = base.into();
        self
    }

    /// Status of `url`: the cached answer if one is final, otherwise the
    /// first final answer from the network, otherwise the last status seen.
    ///
    /// `None` means no attempt produced a status at all.
    pub fn status(&mut self, url: &str) -> Option<u16> {
        if let Some(code) = self.cached(url) {
            tracing::debug!(url, code, "Liveness cache hit");
            return Some(code);
        }

        let mut last = None;
        for attempt in 0..self.policy.max_attempts {
            if let Some(delay) = self.policy.delay_before(url, attempt, last) {
                std::thread::sleep(delay);
            }

            match self.source.head(url) {
                Ok(code) => {
                    last = Some(code);
                    if is_settled(code) {
                        self.remember(url, code);
                        return last;
                    }
                }
                Err(e) => tracing::warn!(url, attempt, error = %e, "Probe request failed"),
            }
        }

        tracing::debug!(
            url,
            attempts = self.policy.max_attempts,
            last = ?last,
            "Probe gave up without a final status"
        );
        last
    }

    /// Confirmed reachable: a final 200.
    pub fn is_live(&mut self, url: &str) -> bool {
        self.status(url) == Some(STATUS_OK)
    }

    /// Whether `username` has a reachable public profile.
    ///
    /// Probes that never settle count as "does not exist", and so do names
    /// that could not be an account name.
    pub fn user_exists(&mut self, username: &str) -> bool {
        match self.profile_url(username) {
            Some(url) => self.is_live(&url),
            None => {
                tracing::debug!(username, "Not a valid account name");
                false
            }
        }
    }

    /// Profile address for `username`, appended to the base as one path
    /// segment. `None` for names outside `[A-Za-z0-9_-]`.
    pub fn profile_url(&self, username: &str) -> Option<String> {
        let username = username.trim();
        if !is_account_name(username) {
            return None;
        }

        let mut url = Url::parse(&self.profile_url_base).ok()?;
        url.path_segments_mut().ok()?.pop_if_empty().push(username);
        Some(url.into())
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    fn cached(&self, url: &str) -> Option<u16> {
        match self.cache.get(url) {
            Ok(Some(value)) => value.trim().parse().ok().filter(|code| is_settled(*code)),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(url, error = %e, "Could not read liveness cache");
                None
            }
        }
    }

    fn remember(&mut self, url: &str, code: u16) {
        if let Err(e) = self.cache.put(url, &code.to_string()) {
            tracing::warn!(url, code, error = %e, "Could not persist liveness cache entry");
        }
    }
}
