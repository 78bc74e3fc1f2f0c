//! Cache Layers: a thin TTL protocol over the store's keyed cache tables,
//! plus a process-wide single-flight registry so concurrent refreshes for
//! the same key coalesce into one fetch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::common::now_secs;

/// Outcome of a cache read: whether the payload is within its TTL, stale but
/// present, or absent entirely. Modeled as a tagged variant rather than an
/// `Option` + bool pair so callers can't forget to check staleness.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Fresh(T),
    Stale { value: T, age_secs: f64 },
    Miss,
}

impl<T> Lookup<T> {
    pub fn is_miss(&self) -> bool {
        matches!(self, Lookup::Miss)
    }

    /// The payload regardless of freshness, for callers that just want
    /// "something to show" while a background refresh is in flight.
    pub fn value(self) -> Option<T> {
        match self {
            Lookup::Fresh(v) => Some(v),
            Lookup::Stale { value, .. } => Some(value),
            Lookup::Miss => None,
        }
    }
}

pub fn lookup<T>(value: Option<T>, resolved_at: f64, ttl_secs: f64) -> Lookup<T> {
    match value {
        None => Lookup::Miss,
        Some(v) => {
            let age = now_secs() - resolved_at;
            if age <= ttl_secs {
                Lookup::Fresh(v)
            } else {
                Lookup::Stale { value: v, age_secs: age }
            }
        }
    }
}

pub const DNS_TTL_SECS: f64 = 24.0 * 60.0 * 60.0;
pub const GEO_TTL_SECS: f64 = 7.0 * 24.0 * 60.0 * 60.0;
pub const ATTACKER_SCAN_TTL_SECS: f64 = 6.0 * 60.0 * 60.0;
pub const SITREP_CHANNELS_TTL_SECS: f64 = 5.0 * 60.0;
pub const SITREP_UPDATE_CHECK_TTL_SECS: f64 = 60.0 * 60.0;
pub const SITREP_ACTION_ITEMS_TTL_SECS: f64 = 5.0 * 60.0;

/// Process-wide registry of in-flight fetches, keyed by cache key. A second
/// caller for the same key blocks on the first caller's guard instead of
/// issuing a duplicate external request.
#[derive(Clone, Default)]
pub struct SingleFlight {
    inflight: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `fetch` for `key`, coalescing concurrent callers. Only the
    /// caller that actually acquires the lock first runs `fetch`; everyone
    /// else waits for it to finish and then re-reads from `reread`, which is
    /// expected to hit the now-populated cache.
    pub async fn run<F, Fut, T>(&self, key: &str, reread: impl FnOnce() -> Result<Option<T>>, fetch: F) -> Result<Option<T>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<()>>,
    {
        let guard = {
            let mut inflight = self.inflight.lock().unwrap();
            inflight
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };

        let _permit = guard.lock().await;

        // Another caller may have already refreshed the value while we
        // waited for the lock; check before doing the work ourselves.
        if let Some(existing) = reread()? {
            return Ok(Some(existing));
        }

        fetch().await?;

        {
            let mut inflight = self.inflight.lock().unwrap();
            inflight.remove(key);
        }

        reread()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_fresh_within_ttl() {
        let now = now_secs();
        let result = lookup(Some("x"), now, 60.0);
        assert_eq!(result, Lookup::Fresh("x"));
    }

    #[test]
    fn test_lookup_stale_past_ttl() {
        let now = now_secs();
        let result = lookup(Some("x"), now - 120.0, 60.0);
        match result {
            Lookup::Stale { value, age_secs } => {
                assert_eq!(value, "x");
                assert!(age_secs >= 120.0);
            }
            other => panic!("expected Stale, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_miss_when_absent() {
        let result: Lookup<&str> = lookup(None, 0.0, 60.0);
        assert_eq!(result, Lookup::Miss);
    }

    #[tokio::test]
    async fn test_single_flight_coalesces_concurrent_fetches() {
        let sf = SingleFlight::new();
        let fetch_count = Arc::new(std::sync::atomic::AtomicU32::new(0));
        let cached = Arc::new(Mutex::new(None::<String>));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let sf = sf.clone();
            let fetch_count = fetch_count.clone();
            let cached = cached.clone();
            handles.push(tokio::spawn(async move {
                sf.run(
                    "1.2.3.4",
                    || Ok(cached.lock().unwrap().clone()),
                    || {
                        let fetch_count = fetch_count.clone();
                        let cached = cached.clone();
                        async move {
                            fetch_count.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                            *cached.lock().unwrap() = Some("example.com".to_string());
                            Ok(())
                        }
                    },
                )
                .await
            }));
        }

        for h in handles {
            let result = h.await.unwrap().unwrap();
            assert_eq!(result, Some("example.com".to_string()));
        }

        // Single-flight keeps the external fetch count low; multiple callers
        // can still observe the race between lock-acquire and cache-check,
        // but it must never run once per caller.
        assert!(fetch_count.load(std::sync::atomic::Ordering::SeqCst) < 5);
    }
}
