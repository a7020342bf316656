//! Per-domain TTL cache for statistics snapshots.
//!
//! One slot per domain, replaced wholesale on refresh. Entries past the
//! freshness window are treated as absent; there is no eviction task and no
//! request coalescing, so concurrent misses may each recompute (last writer
//! wins). With four domains the map is effectively bounded.

use super::domain::{Snapshot, StatsDomain};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: Snapshot,
    computed_at: Instant,
}

/// Shared snapshot cache with a fixed freshness window.
#[derive(Debug)]
pub struct StatsCache {
    freshness_window: Duration,
    entries: RwLock<HashMap<StatsDomain, CacheEntry>>,
}

impl StatsCache {
    pub fn new(freshness_window: Duration) -> Self {
        Self {
            freshness_window,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn freshness_window(&self) -> Duration {
        self.freshness_window
    }

    /// The cached snapshot for `domain`, if present and still fresh.
    pub async fn get(&self, domain: StatsDomain) -> Option<Snapshot> {
        self.get_at(domain, Instant::now()).await
    }

    /// Store a freshly computed snapshot, replacing any previous entry.
    pub async fn put(&self, domain: StatsDomain, snapshot: Snapshot) {
        self.put_at(domain, snapshot, Instant::now()).await;
    }

    /// Age of the entry for `domain`, fresh or not.
    pub async fn age(&self, domain: StatsDomain) -> Option<Duration> {
        let entries = self.entries.read().await;
        entries
            .get(&domain)
            .map(|entry| entry.computed_at.elapsed())
    }

    async fn get_at(&self, domain: StatsDomain, now: Instant) -> Option<Snapshot> {
        let entries = self.entries.read().await;
        let entry = entries.get(&domain)?;
        let age = now.saturating_duration_since(entry.computed_at);
        if age < self.freshness_window {
            Some(entry.snapshot.clone())
        } else {
            None
        }
    }

    async fn put_at(&self, domain: StatsDomain, snapshot: Snapshot, now: Instant) {
        let mut entries = self.entries.write().await;
        entries.insert(
            domain,
            CacheEntry {
                snapshot,
                computed_at: now,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::domain::FlightStats;

    fn snapshot() -> Snapshot {
        Snapshot::Flights(FlightStats::default())
    }

    #[tokio::test]
    async fn fresh_entry_is_served() {
        let cache = StatsCache::new(Duration::from_secs(600));
        cache.put(StatsDomain::Flights, snapshot()).await;
        assert!(
            cache.get(StatsDomain::Flights).await.is_some(),
            "entry stored just now should be fresh"
        );
        assert!(
            cache.get(StatsDomain::Hotels).await.is_none(),
            "domains are cached independently"
        );
    }

    #[tokio::test]
    async fn entry_expires_after_the_window() {
        let cache = StatsCache::new(Duration::from_secs(600));
        let t0 = Instant::now();
        cache.put_at(StatsDomain::Flights, snapshot(), t0).await;

        let mid = t0 + Duration::from_secs(300);
        assert!(
            cache.get_at(StatsDomain::Flights, mid).await.is_some(),
            "entry at half the window should still be fresh"
        );

        let late = t0 + Duration::from_secs(700);
        assert!(
            cache.get_at(StatsDomain::Flights, late).await.is_none(),
            "entry past the window should be treated as absent"
        );
    }

    #[tokio::test]
    async fn boundary_age_counts_as_stale() {
        let cache = StatsCache::new(Duration::from_secs(600));
        let t0 = Instant::now();
        cache.put_at(StatsDomain::Reviews, snapshot(), t0).await;
        let exactly = t0 + Duration::from_secs(600);
        assert!(cache.get_at(StatsDomain::Reviews, exactly).await.is_none());
    }

    #[tokio::test]
    async fn put_replaces_the_previous_entry() {
        let cache = StatsCache::new(Duration::from_secs(600));
        let t0 = Instant::now();
        cache.put_at(StatsDomain::Flights, snapshot(), t0).await;
        let t1 = t0 + Duration::from_secs(500);
        cache.put_at(StatsDomain::Flights, snapshot(), t1).await;
        assert_eq!(
            cache.age(StatsDomain::Flights).await.map(|a| a.as_secs() > 400),
            Some(false),
            "refresh should reset the entry age"
        );
    }
}
