/// Feed aggregator
///
/// Wraps an unfiltered `Feed` and carries short-term memory across cycles:
/// last known callsign and position per aircraft, reliability counters, and a
/// rolling buffer of recent raw snapshots. Gaps are repaired before the base
/// filter chain runs, so a transient position dropout does not make an
/// airborne aircraft disappear.

use crate::cache::BoundedCache;
use crate::config::{ConfigError, FeedConfig};
use crate::entry::{FeedEntry, Override};
use crate::feed::{key_by_id, EntryMap, Feed, FeedUpdate};
use crate::fetch::{FetchSource, HttpFetcher};
use crate::filter::EntryFilter;
use crate::geo::GeoPoint;
use crate::statistics::ReliabilityTracker;
use std::collections::VecDeque;
use std::fmt;
use tracing::{Instrument, Span};

pub struct FeedAggregator<F = HttpFetcher> {
    feed: Feed<F>,
    filter: EntryFilter,
    history: VecDeque<Option<EntryMap>>,
    history_size: usize,
    callsigns: BoundedCache<String, String>,
    coordinates: BoundedCache<String, GeoPoint>,
    statistics: ReliabilityTracker,
    span: Span,
}

impl FeedAggregator<HttpFetcher> {
    pub fn http(config: &FeedConfig) -> Result<Self, ConfigError> {
        FeedAggregator::new(config, HttpFetcher::new()?)
    }
}

impl<F: FetchSource> FeedAggregator<F> {
    pub fn new(config: &FeedConfig, fetcher: F) -> Result<Self, ConfigError> {
        let feed = Feed::new(config, fetcher)?.without_filters();
        let span = tracing::info_span!("aggregator", url = %feed.url());
        Ok(FeedAggregator {
            filter: EntryFilter::new(config.filter_radius_km),
            history: VecDeque::with_capacity(config.history_size),
            history_size: config.history_size,
            callsigns: BoundedCache::new(config.callsign_cache_size)?,
            coordinates: BoundedCache::new(config.coordinate_cache_size)?,
            statistics: ReliabilityTracker::new(config.statistics_cache_size)?,
            feed,
            span,
        })
    }

    /// Scope this aggregator and its feed to `span`
    pub fn with_span(mut self, span: Span) -> Self {
        self.feed = self.feed.with_span(span.clone());
        self.span = span;
        self
    }

    pub fn feed(&self) -> &Feed<F> {
        &self.feed
    }

    pub fn statistics(&self) -> &ReliabilityTracker {
        &self.statistics
    }

    /// Raw snapshots of recent successful fetches, newest first
    pub fn history(&self) -> impl Iterator<Item = Option<&EntryMap>> {
        self.history.iter().map(Option::as_ref)
    }

    pub fn cached_callsign(&self, id: &str) -> Option<&str> {
        self.callsigns.get(id).map(String::as_str)
    }

    pub fn cached_coordinates(&self, id: &str) -> Option<GeoPoint> {
        self.coordinates.get(id).copied()
    }

    /// Run one cycle: fetch, repair gaps, record reliability, filter.
    pub async fn update(&mut self) -> FeedUpdate {
        let span = self.span.clone();
        self.update_inner().instrument(span).await
    }

    async fn update_inner(&mut self) -> FeedUpdate {
        let (status, data) = self.feed.update().await;
        if status.is_ok() {
            self.push_history(data.clone());
        }

        let Some(mut data) = data else {
            self.statistics.record_failed_cycle();
            return (status, None);
        };

        self.repair(&mut data);
        self.statistics
            .record_successful_cycle(data.keys().map(String::as_str));

        let mut filtered = self.filter.apply(data.into_values());
        for entry in filtered.iter_mut() {
            let statistics = entry.external_id().and_then(|id| self.statistics.get(id));
            entry.set_statistics(statistics);
        }

        (status, Some(key_by_id(filtered)))
    }

    fn push_history(&mut self, snapshot: Option<EntryMap>) {
        if self.history.len() >= self.history_size {
            self.history.pop_back();
        }
        self.history.push_front(snapshot);
    }

    fn repair(&mut self, data: &mut EntryMap) {
        for (id, entry) in data.iter_mut() {
            self.repair_callsign(id, entry);
            self.repair_coordinates(id, entry);
        }
        tracing::debug!(callsigns = ?self.callsigns, "callsign cache");
        tracing::debug!(coordinates = ?self.coordinates, "coordinate cache");
    }

    fn repair_callsign(&mut self, id: &str, entry: &mut FeedEntry) {
        if entry.has_callsign() {
            if !self.callsigns.contains(id) {
                if let Some(callsign) = entry.callsign() {
                    self.callsigns.set(id.to_string(), callsign.to_string());
                }
            }
        } else if let Some(cached) = self.callsigns.get(id) {
            entry.apply_override(Override::Callsign(cached.clone()));
        }
    }

    fn repair_coordinates(&mut self, id: &str, entry: &mut FeedEntry) {
        match entry.coordinates().and_then(|c| c.to_point()) {
            Some(point) => {
                self.coordinates.set(id.to_string(), point);
            }
            None => {
                if let Some(cached) = self.coordinates.get(id) {
                    entry.apply_override(Override::Latitude(cached.latitude));
                    entry.apply_override(Override::Longitude(cached.longitude));
                }
            }
        }
    }
}

impl<F> fmt::Display for FeedAggregator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeedAggregator(feed={})", self.feed)
    }
}
