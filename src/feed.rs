/// Source feed
///
/// One `update()` per cycle: fetch under a timeout, decode, build entries,
/// optionally run the base filter chain, key by external id. Failures of any
/// kind come back as `UpdateStatus::Error` with no entries.

use crate::config::{ConfigError, FeedConfig};
use crate::decoder::FeedFormat;
use crate::entry::{EntryData, FeedEntry};
use crate::error::{FeedError, FeedResult};
use crate::fetch::{FetchSource, HttpFetcher};
use crate::filter::EntryFilter;
use crate::geo::GeoPoint;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::{Instrument, Span};

/// Entries of one cycle keyed by external id
pub type EntryMap = HashMap<String, FeedEntry>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    Ok,
    Error,
}

impl UpdateStatus {
    pub fn is_ok(&self) -> bool {
        *self == UpdateStatus::Ok
    }
}

/// Status plus entries; `(Ok, None)` means the payload held no records.
pub type FeedUpdate = (UpdateStatus, Option<EntryMap>);

pub struct Feed<F = HttpFetcher> {
    fetcher: F,
    format: FeedFormat,
    home: GeoPoint,
    url: String,
    timeout: Duration,
    filter: EntryFilter,
    apply_filters: bool,
    span: Span,
}

impl Feed<HttpFetcher> {
    /// Feed backed by a fresh HTTP client
    pub fn http(config: &FeedConfig) -> Result<Self, ConfigError> {
        Feed::new(config, HttpFetcher::new()?)
    }
}

impl<F: FetchSource> Feed<F> {
    pub fn new(config: &FeedConfig, fetcher: F) -> Result<Self, ConfigError> {
        config.validate()?;
        let url = config.endpoint();
        let span = tracing::info_span!("feed", format = config.format.name(), url = %url);
        Ok(Feed {
            fetcher,
            format: config.format,
            home: config.home,
            url,
            timeout: config.timeout(),
            filter: EntryFilter::new(config.filter_radius_km),
            apply_filters: true,
            span,
        })
    }

    /// Skip the base filter chain and return every keyed entry
    pub fn without_filters(mut self) -> Self {
        self.apply_filters = false;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn format(&self) -> FeedFormat {
        self.format
    }

    pub fn home(&self) -> GeoPoint {
        self.home
    }

    pub fn filter(&self) -> EntryFilter {
        self.filter
    }

    pub async fn update(&self) -> FeedUpdate {
        self.update_inner().instrument(self.span.clone()).await
    }

    async fn update_inner(&self) -> FeedUpdate {
        let records = match self.fetch().await {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!(url = %self.url, %error, "fetching data failed");
                return (UpdateStatus::Error, None);
            }
        };

        if records.is_empty() {
            tracing::debug!("payload contained no records");
            return (UpdateStatus::Ok, None);
        }

        let entries = records
            .into_iter()
            .map(|data| FeedEntry::new(self.home, Some(data)));
        let entries: Vec<FeedEntry> = if self.apply_filters {
            self.filter.apply(entries)
        } else {
            entries.collect()
        };

        (UpdateStatus::Ok, Some(key_by_id(entries)))
    }

    async fn fetch(&self) -> FeedResult<Vec<EntryData>> {
        let body = tokio::time::timeout(self.timeout, self.fetcher.fetch(&self.url))
            .await
            .map_err(|_| FeedError::Timeout(self.timeout))??;
        Ok(self.format.decode(&body)?)
    }
}

/// Key entries by external id; a later duplicate replaces an earlier one.
pub fn key_by_id<I>(entries: I) -> EntryMap
where
    I: IntoIterator<Item = FeedEntry>,
{
    let mut map = EntryMap::new();
    for entry in entries {
        match entry.external_id() {
            Some(id) => {
                map.insert(id.to_string(), entry);
            }
            None => tracing::debug!("dropping entry without external id"),
        }
    }
    map
}

impl<F> fmt::Display for Feed<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Feed(format={}, home={}, url={}, radius={:?})",
            self.format.name(),
            self.home,
            self.url,
            self.filter.radius_km()
        )
    }
}
