/// Poll a receiver and print lifecycle events
///
/// Usage: poll_feed <url> [radius_km]
/// Set RUST_LOG=flight_feed=debug to see per-cycle detail.

use async_trait::async_trait;
use flight_feed::{EntityHandler, FeedAggregator, FeedConfig, FeedEntries, FeedFormat, FeedManager, GeoPoint};
use std::env;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const HOME: GeoPoint = GeoPoint::new(-31.0, 151.0);
const POLL_INTERVAL: Duration = Duration::from_secs(10);

struct PrintingHandler {
    entries: FeedEntries,
}

#[async_trait]
impl EntityHandler for PrintingHandler {
    async fn on_create(&mut self, id: &str) {
        match self.entries.get(id).await {
            Some(entry) => println!(
                "+ {} callsign={} altitude={:?} distance={:.1}km",
                id,
                entry.callsign().unwrap_or("-"),
                entry.altitude(),
                entry.distance_to_home().unwrap_or_default()
            ),
            None => println!("+ {}", id),
        }
    }

    async fn on_update(&mut self, id: &str) {
        if let Some(entry) = self.entries.get(id).await {
            let reliability = entry.statistics().map(|s| s.to_string()).unwrap_or_default();
            println!("~ {} altitude={:?} reliability={}", id, entry.altitude(), reliability);
        }
    }

    async fn on_remove(&mut self, id: &str) {
        println!("- {}", id);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let url = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| "http://localhost:8888/data/aircraft.json".to_string());

    let mut config = FeedConfig::new(FeedFormat::Dump1090, HOME).with_url(url);
    if let Some(radius) = args.get(2) {
        config = config.with_filter_radius(radius.parse()?);
    }

    let entries = FeedEntries::new();
    let aggregator = FeedAggregator::http(&config)?;
    let manager = FeedManager::new(aggregator, PrintingHandler { entries: entries.clone() }).with_entries(entries);
    println!("Polling {}", manager);

    let cancel = CancellationToken::new();
    let polling = tokio::spawn(manager.run(POLL_INTERVAL, cancel.clone()));

    tokio::signal::ctrl_c().await?;
    cancel.cancel();
    let manager = polling.await?;
    println!("Stopped with {} managed aircraft", manager.managed_ids().count());

    Ok(())
}
