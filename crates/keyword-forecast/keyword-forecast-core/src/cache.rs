//! Single-flight forecast cache
//!
//! Results are memoized by request [`Fingerprint`] in an LRU map with a TTL.
//! Concurrent callers for the same fingerprint share one computation: the
//! first becomes the leader and runs the pipeline, later callers wait on the
//! leader's flight and receive its outcome. Only successful results are stored.
//! A waiting follower polls its own [`CancellationToken`] and may abandon the
//! wait without affecting the leader.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use keyword_forecast_spi::{ForecastError, ForecastResult, Result};
use lru::LruCache;
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::cancel::CancellationToken;
use crate::fingerprint::Fingerprint;

const FOLLOWER_POLL: Duration = Duration::from_millis(5);

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When false every call computes and nothing is stored
    pub enabled: bool,
    /// Maximum number of stored forecasts
    pub capacity: usize,
    /// Entry lifetime in milliseconds
    pub ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 256,
            ttl_ms: 24 * 60 * 60 * 1000,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(ForecastError::InvalidConfig(
                "cache capacity must be at least 1".to_string(),
            ));
        }
        if self.ttl_ms == 0 {
            return Err(ForecastError::InvalidConfig(
                "cache ttl_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Cache counters at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Callers that waited on another caller's computation
    pub coalesced: u64,
    /// Entries dropped for capacity
    pub evictions: u64,
    /// Entries dropped for age
    pub expirations: u64,
    pub entries: usize,
    pub capacity: usize,
    /// (hits + coalesced) / lookups
    pub hit_rate: f64,
}

struct Entry {
    result: Arc<ForecastResult>,
    inserted: Instant,
}

type Outcome = Result<Arc<ForecastResult>>;

#[derive(Default)]
struct Flight {
    outcome: Mutex<Option<Outcome>>,
    done: Condvar,
}

impl Flight {
    /// Block until the leader resolves, or `None` once `token` is cancelled.
    fn wait(&self, token: &CancellationToken) -> Option<Outcome> {
        let mut outcome = self.outcome.lock();
        loop {
            if let Some(resolved) = outcome.as_ref() {
                return Some(resolved.clone());
            }
            if token.is_cancelled() {
                return None;
            }
            self.done.wait_for(&mut outcome, FOLLOWER_POLL);
        }
    }

    fn resolve(&self, outcome: Outcome) {
        *self.outcome.lock() = Some(outcome);
        self.done.notify_all();
    }
}

enum Role {
    Hit(Arc<ForecastResult>),
    Leader(Arc<Flight>),
    Follower(Arc<Flight>),
}

/// Resolves and unregisters the leader's flight even if the computation panics.
struct FlightGuard<'a> {
    cache: &'a ForecastCache,
    key: &'a Fingerprint,
    flight: Arc<Flight>,
    resolved: bool,
}

impl FlightGuard<'_> {
    fn finish(mut self, outcome: Outcome) {
        self.cache.complete(self.key, &self.flight, outcome);
        self.resolved = true;
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            self.cache.complete(
                self.key,
                &self.flight,
                Err(ForecastError::Internal("forecast computation panicked".to_string())),
            );
        }
    }
}

/// LRU + TTL forecast cache with per-fingerprint single-flight.
pub struct ForecastCache {
    config: CacheConfig,
    // lock order: in_flight, then entries
    entries: Mutex<LruCache<Fingerprint, Entry>>,
    in_flight: Mutex<HashMap<Fingerprint, Arc<Flight>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl ForecastCache {
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.capacity).ok_or_else(|| {
            ForecastError::InvalidConfig("cache capacity must be at least 1".to_string())
        })?;

        Ok(Self {
            config,
            entries: Mutex::new(LruCache::new(capacity)),
            in_flight: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Return the stored result for `key`, or run `compute` exactly once across
    /// all concurrent callers for that key.
    ///
    /// Hits and coalesced followers get the result marked as served from the
    /// cache. A follower whose leader was cancelled retries the lookup instead
    /// of inheriting the cancellation.
    pub fn get_or_compute<F>(&self, key: &Fingerprint, compute: F) -> Result<ForecastResult>
    where
        F: FnOnce() -> Result<ForecastResult>,
    {
        self.get_or_compute_with_cancel(key, &CancellationToken::new(), compute)
    }

    /// Like [`get_or_compute`](Self::get_or_compute), but a caller waiting on
    /// another caller's computation returns `Cancelled` as soon as `token` is
    /// cancelled. The leader's computation is left running.
    pub fn get_or_compute_with_cancel<F>(
        &self,
        key: &Fingerprint,
        token: &CancellationToken,
        compute: F,
    ) -> Result<ForecastResult>
    where
        F: FnOnce() -> Result<ForecastResult>,
    {
        if !self.config.enabled {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return compute();
        }

        let flight = loop {
            match self.join(key) {
                Role::Hit(result) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    trace!(fingerprint = key.short(), "cache hit");
                    return Ok(result.as_cache_hit());
                }
                Role::Leader(flight) => break flight,
                Role::Follower(flight) => match flight.wait(token) {
                    None => {
                        debug!(fingerprint = key.short(), "abandoned wait on in-flight forecast");
                        return Err(ForecastError::Cancelled);
                    }
                    Some(Err(ForecastError::Cancelled)) => continue,
                    Some(outcome) => {
                        self.coalesced.fetch_add(1, Ordering::Relaxed);
                        trace!(fingerprint = key.short(), "joined in-flight forecast");
                        return outcome.map(|result| result.as_cache_hit());
                    }
                },
            }
        };

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(fingerprint = key.short(), "cache miss, computing forecast");

        let guard = FlightGuard {
            cache: self,
            key,
            flight,
            resolved: false,
        };
        let outcome = compute().map(Arc::new);
        guard.finish(outcome.clone());
        outcome.map(|result| result.as_ref().clone())
    }

    fn join(&self, key: &Fingerprint) -> Role {
        let mut in_flight = self.in_flight.lock();

        {
            let mut entries = self.entries.lock();
            let lookup = entries
                .get(key)
                .map(|entry| (entry.inserted.elapsed() < self.config.ttl(), entry.result.clone()));
            match lookup {
                Some((true, result)) => return Role::Hit(result),
                Some((false, _)) => {
                    entries.pop(key);
                    self.expirations.fetch_add(1, Ordering::Relaxed);
                }
                None => {}
            }
        }

        if let Some(flight) = in_flight.get(key) {
            return Role::Follower(flight.clone());
        }
        let flight = Arc::new(Flight::default());
        in_flight.insert(key.clone(), flight.clone());
        Role::Leader(flight)
    }

    fn complete(&self, key: &Fingerprint, flight: &Flight, outcome: Outcome) {
        if let Ok(result) = &outcome {
            self.store(key, result.clone());
        }
        self.in_flight.lock().remove(key);
        flight.resolve(outcome);
    }

    fn store(&self, key: &Fingerprint, result: Arc<ForecastResult>) {
        let entry = Entry {
            result,
            inserted: Instant::now(),
        };
        if let Some((evicted, _)) = self.entries.lock().push(key.clone(), entry) {
            if &evicted != key {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                trace!(fingerprint = evicted.short(), "evicted forecast");
            }
        }
    }

    /// Drop one entry; returns whether it was present.
    pub fn invalidate(&self, key: &Fingerprint) -> bool {
        self.entries.lock().pop(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let ttl = self.config.ttl();
        let mut entries = self.entries.lock();
        let expired: Vec<Fingerprint> = entries
            .iter()
            .filter(|(_, entry)| entry.inserted.elapsed() >= ttl)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        self.expirations
            .fetch_add(expired.len() as u64, Ordering::Relaxed);
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let coalesced = self.coalesced.load(Ordering::Relaxed);
        let lookups = hits + misses + coalesced;

        CacheStats {
            hits,
            misses,
            coalesced,
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            entries: self.len(),
            capacity: self.config.capacity,
            hit_rate: if lookups > 0 {
                (hits + coalesced) as f64 / lookups as f64
            } else {
                0.0
            },
        }
    }
}

impl std::fmt::Debug for ForecastCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastCache")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
