//! TTL-bounded cache guard around the CFP record set
//!
//! Readers take cheap `Arc` snapshots; writers replace the whole set
//! under a refresh lock. Concurrent callers that observe a stale cache
//! coalesce onto a single upstream fetch (lock-and-recheck).

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex as AsyncMutex;

use crate::data::{CfpRecord, CfpSource, SessionizeError};

/// How long a fetched record set stays fresh
pub const DEFAULT_TTL_MINUTES: i64 = 15;

/// The shared cache state: one generation of records plus its stamp.
struct CacheState {
    records: Arc<Vec<CfpRecord>>,
    last_refresh: Option<DateTime<Utc>>,
}

/// TTL cache guard over the CFP record set.
///
/// One instance is shared per process. `snapshot()` never blocks on a
/// refresh in flight; a refresh replaces the record set atomically, so
/// readers always see either the previous or the new generation, never
/// a partial one.
pub struct CfpCache {
    state: Mutex<CacheState>,
    /// Serializes refresh attempts; held across the upstream fetch
    refresh_lock: AsyncMutex<()>,
    ttl: Duration,
}

impl Default for CfpCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CfpCache {
    /// Creates an empty cache with the default 15-minute TTL.
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(DEFAULT_TTL_MINUTES))
    }

    /// Creates an empty cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            state: Mutex::new(CacheState {
                records: Arc::new(Vec::new()),
                last_refresh: None,
            }),
            refresh_lock: AsyncMutex::new(()),
            ttl,
        }
    }

    /// Returns the current record generation without copying.
    ///
    /// The returned snapshot is immutable; later refreshes install a
    /// new generation and leave handed-out snapshots untouched.
    pub fn snapshot(&self) -> Arc<Vec<CfpRecord>> {
        self.state.lock().unwrap().records.clone()
    }

    /// When the cache last refreshed successfully, if ever.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.state.lock().unwrap().last_refresh
    }

    /// Whether the cache has never been filled or has outlived its TTL.
    pub fn is_stale(&self) -> bool {
        match self.state.lock().unwrap().last_refresh {
            None => true,
            Some(stamp) => Utc::now() - stamp > self.ttl,
        }
    }

    /// Refreshes from `source` if the cache is stale, otherwise a no-op.
    ///
    /// Safe to call concurrently: callers that all observe staleness
    /// queue on the refresh lock, and the staleness check is re-run
    /// once the lock is held, so the losers accept the winner's result
    /// instead of fetching again.
    ///
    /// # Errors
    /// Propagates the fetch error; the cached set and its stamp are
    /// left untouched, and the next call will retry.
    pub async fn ensure_fresh<S: CfpSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<(), SessionizeError> {
        if !self.is_stale() {
            return Ok(());
        }

        let _guard = self.refresh_lock.lock().await;
        if !self.is_stale() {
            // Another caller refreshed while we waited for the lock
            return Ok(());
        }

        self.refresh(source).await
    }

    /// Refreshes from `source` unconditionally, ignoring the TTL.
    ///
    /// Serialized with `ensure_fresh` and other forced refreshes on the
    /// same lock.
    pub async fn force_refresh<S: CfpSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<(), SessionizeError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh(source).await
    }

    /// Fetches and installs a new generation. Must be called with the
    /// refresh lock held.
    async fn refresh<S: CfpSource + ?Sized>(&self, source: &S) -> Result<(), SessionizeError> {
        let records = source.fetch().await?;

        let mut state = self.state.lock().unwrap();
        state.records = Arc::new(records);
        state.last_refresh = Some(Utc::now());

        Ok(())
    }
}
