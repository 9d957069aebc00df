#![allow(dead_code)]

/// Shared helpers for integration tests

use async_trait::async_trait;
use flight_feed::{EntityHandler, FeedEntries, FeedError, FeedResult, FetchSource, GeoPoint};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub const HOME: GeoPoint = GeoPoint::new(-31.0, 151.0);

pub fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("reading {}: {}", path.display(), e))
}

/// Plays back a fixed list of responses, one per fetch. Once the script is
/// exhausted every fetch fails with a transport error.
pub struct ScriptedSource {
    responses: Mutex<VecDeque<FeedResult<Vec<u8>>>>,
    fetches: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSource {
    pub fn new(responses: Vec<FeedResult<Vec<u8>>>) -> Self {
        ScriptedSource {
            responses: Mutex::new(responses.into()),
            fetches: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn bodies<I, B>(bodies: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        Self::new(bodies.into_iter().map(|body| Ok(body.into())).collect())
    }

    /// URLs requested so far, shared with the source
    pub fn fetches(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.fetches)
    }
}

#[async_trait]
impl FetchSource for ScriptedSource {
    async fn fetch(&self, url: &str) -> FeedResult<Vec<u8>> {
        self.fetches.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FeedError::Transport("connection refused".to_string())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Create(String),
    Update(String),
    Remove(String),
}

/// Records every callback, and for creates also whether the entry was
/// already visible in the published snapshot.
#[derive(Default)]
pub struct RecordingHandler {
    pub events: Vec<Event>,
    pub entries: FeedEntries,
    pub visible_on_create: Vec<bool>,
}

impl RecordingHandler {
    pub fn new(entries: FeedEntries) -> Self {
        RecordingHandler {
            entries,
            ..Default::default()
        }
    }

    pub fn take(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn count(&self, pick: fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| pick(e)).count()
    }
}

#[async_trait]
impl EntityHandler for RecordingHandler {
    async fn on_create(&mut self, id: &str) {
        let visible = self.entries.contains(id).await;
        self.visible_on_create.push(visible);
        self.events.push(Event::Create(id.to_string()));
    }

    async fn on_update(&mut self, id: &str) {
        self.events.push(Event::Update(id.to_string()));
    }

    async fn on_remove(&mut self, id: &str) {
        self.events.push(Event::Remove(id.to_string()));
    }
}
