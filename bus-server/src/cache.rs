//! Caching layer for DataMall responses.
//!
//! Reference data (stops and routes) changes rarely and takes dozens of
//! paged requests to build, so it is kept for about a month. Live arrivals
//! are kept for a few seconds per stop, which absorbs refresh bursts while
//! keeping ETAs current. The raw arrival response is cached, not the
//! transformed board, so minutes are always computed against request time.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::{info, warn};

use crate::alerts::{AffectedLines, check_alerts};
use crate::datamall::{BusArrivalResponse, DataMallApi, DataMallError, Fetched};
use crate::domain::StopCode;
use crate::reference::{ReferenceData, load_reference_data};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for the stop and route tables.
    pub reference_ttl: Duration,

    /// TTL for live arrivals at a stop.
    pub arrivals_ttl: Duration,

    /// Maximum number of stops with cached arrivals.
    pub max_arrival_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            reference_ttl: Duration::from_secs(2_630_000),
            arrivals_ttl: Duration::from_secs(15),
            max_arrival_entries: 10_000,
        }
    }
}

/// Cache for DataMall responses.
pub struct DataMallCache {
    /// The single reference data snapshot.
    reference: MokaCache<(), Arc<ReferenceData>>,

    /// Raw arrival responses, keyed by stop.
    arrivals: MokaCache<StopCode, Arc<BusArrivalResponse>>,
}

impl DataMallCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let reference = MokaCache::builder()
            .time_to_live(config.reference_ttl)
            .max_capacity(1)
            .build();

        let arrivals = MokaCache::builder()
            .time_to_live(config.arrivals_ttl)
            .max_capacity(config.max_arrival_entries)
            .build();

        Self {
            reference,
            arrivals,
        }
    }

    /// Get cache statistics (for monitoring).
    pub fn arrival_entry_count(&self) -> u64 {
        self.arrivals.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.reference.invalidate_all();
        self.arrivals.invalidate_all();
    }
}

/// DataMall client with caching.
///
/// Wraps any [`DataMallApi`] implementation.
pub struct CachedDataMall<A> {
    api: A,
    cache: DataMallCache,
}

impl<A: DataMallApi> CachedDataMall<A> {
    /// Create a new cached client.
    pub fn new(api: A, cache_config: &CacheConfig) -> Self {
        Self {
            api,
            cache: DataMallCache::new(cache_config),
        }
    }

    /// Stop and route tables, from cache if available.
    ///
    /// Concurrent misses share a single fetch. Only a complete fetch is
    /// cached. A partial one is still returned, with its error, so the
    /// caller can serve what it has; the next call tries again.
    pub async fn reference_data(&self) -> Fetched<Arc<ReferenceData>> {
        let mut partial = None;

        let cached = self
            .cache
            .reference
            .optionally_get_with((), async {
                let fetched = load_reference_data(&self.api).await.map(Arc::new);
                match fetched.error {
                    None => {
                        info!(
                            stops = fetched.data.stops.len(),
                            routes = fetched.data.routes.len(),
                            "Caching reference data"
                        );
                        Some(fetched.data)
                    }
                    Some(e) => {
                        warn!(error = %e, "Reference data incomplete, not caching");
                        partial = Some(Fetched::partial(fetched.data, e));
                        None
                    }
                }
            })
            .await;

        match (cached, partial) {
            (Some(data), _) => Fetched::complete(data),
            (None, Some(partial)) => partial,
            // Another caller's fetch came back partial while this one waited
            (None, None) => load_reference_data(&self.api).await.map(Arc::new),
        }
    }

    /// Live arrivals at a stop, using cache if available.
    pub async fn bus_arrivals(
        &self,
        stop: StopCode,
    ) -> Result<Arc<BusArrivalResponse>, DataMallError> {
        if let Some(cached) = self.cache.arrivals.get(&stop).await {
            return Ok(cached);
        }

        let response = Arc::new(self.api.bus_arrivals(stop).await?);
        self.cache.arrivals.insert(stop, response.clone()).await;

        Ok(response)
    }

    /// Current train disruptions. Never cached: every call polls.
    pub async fn train_alerts(&self) -> Fetched<AffectedLines> {
        check_alerts(&self.api).await
    }

    /// Access the underlying client for operations that bypass cache.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Get cache statistics.
    pub fn arrival_entry_count(&self) -> u64 {
        self.cache.arrival_entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }
}
