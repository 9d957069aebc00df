/// Feed manager
///
/// Tracks which external ids are currently managed and turns each aggregator
/// cycle into create / update / remove callbacks. Any failed or empty cycle
/// is treated as total loss: every managed id is removed.

use crate::aggregator::FeedAggregator;
use crate::entry::FeedEntry;
use crate::feed::EntryMap;
use crate::fetch::{FetchSource, HttpFetcher};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

/// Lifecycle callbacks. Each receives only the external id; entry data is
/// looked up through the manager's `FeedEntries`.
#[async_trait]
pub trait EntityHandler: Send {
    async fn on_create(&mut self, id: &str);
    async fn on_update(&mut self, id: &str);
    async fn on_remove(&mut self, id: &str);
}

/// Shared view of the latest accepted snapshot
#[derive(Debug, Clone, Default)]
pub struct FeedEntries {
    inner: Arc<RwLock<EntryMap>>,
}

impl FeedEntries {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &str) -> Option<FeedEntry> {
        self.inner.read().await.get(id).cloned()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.inner.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Ids in the snapshot, sorted
    pub async fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.read().await.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    pub async fn snapshot(&self) -> EntryMap {
        self.inner.read().await.clone()
    }

    async fn replace(&self, entries: EntryMap) {
        *self.inner.write().await = entries;
    }

    async fn clear(&self) {
        self.inner.write().await.clear();
    }
}

pub struct FeedManager<H, F = HttpFetcher> {
    aggregator: FeedAggregator<F>,
    handler: H,
    entries: FeedEntries,
    managed: BTreeSet<String>,
    span: Span,
}

impl<H, F> FeedManager<H, F>
where
    H: EntityHandler,
    F: FetchSource,
{
    pub fn new(aggregator: FeedAggregator<F>, handler: H) -> Self {
        let span = tracing::info_span!("manager", url = %aggregator.feed().url());
        let aggregator = aggregator.with_span(span.clone());
        FeedManager {
            aggregator,
            handler,
            entries: FeedEntries::new(),
            managed: BTreeSet::new(),
            span,
        }
    }

    /// Publish snapshots into `entries`, typically a handle the handler
    /// already holds.
    pub fn with_entries(mut self, entries: FeedEntries) -> Self {
        self.entries = entries;
        self
    }

    /// Scope the manager, its aggregator and its feed to `span`
    pub fn with_span(mut self, span: Span) -> Self {
        self.aggregator = self.aggregator.with_span(span.clone());
        self.span = span;
        self
    }

    pub fn entries(&self) -> FeedEntries {
        self.entries.clone()
    }

    pub fn managed_ids(&self) -> impl Iterator<Item = &str> {
        self.managed.iter().map(String::as_str)
    }

    pub fn is_managed(&self, id: &str) -> bool {
        self.managed.contains(id)
    }

    pub fn aggregator(&self) -> &FeedAggregator<F> {
        &self.aggregator
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// One reconciliation cycle. Callbacks are awaited one at a time:
    /// removes, then updates, then creates, each phase in id order.
    pub async fn tick(&mut self) {
        let span = self.span.clone();
        self.tick_inner().instrument(span).await
    }

    async fn tick_inner(&mut self) {
        let (status, data) = self.aggregator.update().await;
        match data {
            Some(data) if status.is_ok() => self.reconcile(data).await,
            _ => self.remove_all().await,
        }
    }

    async fn reconcile(&mut self, data: EntryMap) {
        let current: BTreeSet<String> = data.keys().cloned().collect();
        self.entries.replace(data).await;

        let to_remove: Vec<String> = self.managed.difference(&current).cloned().collect();
        let to_update: Vec<String> = self.managed.intersection(&current).cloned().collect();
        let to_create: Vec<String> = current.difference(&self.managed).cloned().collect();
        tracing::debug!(
            remove = to_remove.len(),
            update = to_update.len(),
            create = to_create.len(),
            "reconciling entries"
        );

        for id in to_remove {
            self.handler.on_remove(&id).await;
            self.managed.remove(&id);
        }
        for id in &to_update {
            self.handler.on_update(id).await;
        }
        for id in to_create {
            self.handler.on_create(&id).await;
            self.managed.insert(id);
        }
    }

    async fn remove_all(&mut self) {
        if !self.managed.is_empty() {
            tracing::info!(count = self.managed.len(), "no usable data, removing all managed entries");
        }
        for id in std::mem::take(&mut self.managed) {
            self.handler.on_remove(&id).await;
        }
        self.entries.clear().await;
    }

    /// Tick every `period` until `cancel` fires. Cancellation is only
    /// observed between ticks. Returns the manager so callers can inspect
    /// its final state.
    pub async fn run(mut self, period: Duration, cancel: CancellationToken) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }
            self.tick().await;
        }

        tracing::info!(parent: &self.span, managed = self.managed.len(), "polling stopped");
        self
    }
}

impl<H, F> fmt::Display for FeedManager<H, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FeedManager(aggregator={}, managed={})",
            self.aggregator,
            self.managed.len()
        )
    }
}
