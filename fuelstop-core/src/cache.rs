//! Key/value caching with per-entry expiry.
//!
//! Route providers cache geocodes and routes behind [`ExpiringCache`] so the
//! store can be swapped without touching the provider. [`MemoryCache`] is the
//! in-process default.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// How long a resolved route stays cached.
pub const ROUTE_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// How long a geocoded location stays cached.
pub const GEOCODE_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A shared cache whose entries expire.
///
/// Implementations must tolerate concurrent readers and writers. When two
/// writers race on a key the last write wins.
pub trait ExpiringCache<V>: Send + Sync {
    /// Return the value for `key` unless it is absent or expired.
    fn get(&self, key: &str) -> Option<V>;

    /// Store `value` under `key` for `ttl`.
    fn insert(&self, key: String, value: V, ttl: Duration);
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// In-memory [`ExpiringCache`] backed by a [`DashMap`].
///
/// Expired entries are dropped lazily when read, or in bulk through
/// [`MemoryCache::prune_expired`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use fuelstop_core::{ExpiringCache, MemoryCache};
///
/// let cache = MemoryCache::new();
/// cache.insert("geocode:Chicago_IL".into(), (41.88, -87.63), Duration::from_secs(60));
/// assert_eq!(cache.get("geocode:Chicago_IL"), Some((41.88, -87.63)));
/// assert_eq!(cache.get("geocode:Denver_CO"), None);
/// ```
#[derive(Debug)]
pub struct MemoryCache<V> {
    entries: DashMap<String, Entry<V>>,
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<V> MemoryCache<V> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry.
    pub fn prune_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }
}

impl<V> ExpiringCache<V> for MemoryCache<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Some(entry.value.clone());
            }
        }
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    fn insert(&self, key: String, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries.insert(key, Entry { value, expires_at });
    }
}

/// Cache key for a geocoded free-text location.
///
/// Spaces become underscores and commas are dropped so the key stays a single
/// token.
///
/// # Examples
/// ```
/// use fuelstop_core::cache::geocode_cache_key;
///
/// assert_eq!(geocode_cache_key("New York, NY"), "geocode:New_York_NY");
/// ```
#[must_use]
pub fn geocode_cache_key(location: &str) -> String {
    format!("geocode:{}", normalise_key_part(location))
}

/// Cache key for a route between two free-text locations.
///
/// # Examples
/// ```
/// use fuelstop_core::cache::route_cache_key;
///
/// assert_eq!(
///     route_cache_key("Chicago, IL", "Denver, CO"),
///     "route:Chicago_IL:Denver_CO"
/// );
/// ```
#[must_use]
pub fn route_cache_key(start: &str, finish: &str) -> String {
    format!(
        "route:{}:{}",
        normalise_key_part(start),
        normalise_key_part(finish)
    )
}

fn normalise_key_part(part: &str) -> String {
    part.chars()
        .filter(|c| *c != ',')
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;
    use std::thread;

    #[rstest]
    fn returns_fresh_entries() {
        let cache = MemoryCache::new();
        cache.insert("k".into(), 7_u32, Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(7));
    }

    #[rstest]
    fn expired_entries_are_misses_and_evicted() {
        let cache = MemoryCache::new();
        cache.insert("k".into(), 7_u32, Duration::ZERO);
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[rstest]
    fn prune_drops_only_expired_entries() {
        let cache = MemoryCache::new();
        cache.insert("stale".into(), 1_u32, Duration::ZERO);
        cache.insert("fresh".into(), 2_u32, Duration::from_secs(60));
        cache.prune_expired();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("fresh"), Some(2));
    }

    #[rstest]
    fn later_insert_replaces_value() {
        let cache = MemoryCache::new();
        cache.insert("k".into(), "old", Duration::from_secs(60));
        cache.insert("k".into(), "new", Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some("new"));
    }

    #[rstest]
    fn concurrent_writers_do_not_lose_keys() {
        let cache = Arc::new(MemoryCache::new());
        let handles: Vec<_> = (0..4_u32)
            .map(|worker| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..50_u32 {
                        cache.insert(format!("{worker}:{i}"), i, Duration::from_secs(60));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread");
        }
        assert_eq!(cache.len(), 200);
    }

    #[rstest]
    #[case("Chicago, IL", "geocode:Chicago_IL")]
    #[case("Salt Lake City,UT", "geocode:Salt_Lake_CityUT")]
    #[case("Denver", "geocode:Denver")]
    fn geocode_keys_are_normalised(#[case] location: &str, #[case] expected: &str) {
        assert_eq!(geocode_cache_key(location), expected);
    }
}
