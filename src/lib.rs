/// Flight Feed - Aircraft Feed Aggregator
///
/// Polls an ADS-B receiver JSON endpoint and turns each snapshot into a
/// stable, filtered set of tracked aircraft. Features include:
/// - dump1090 and Flightradar24 feed decoding
/// - Distance, altitude and position-fix filtering around a home location
/// - Callsign and coordinate gap repair across cycles
/// - Per-aircraft reliability statistics
/// - Create / update / remove lifecycle callbacks per tracked aircraft

pub mod geo;
pub mod cache;
pub mod statistics;
pub mod entry;
pub mod decoder;
pub mod error;
pub mod config;
pub mod fetch;
pub mod filter;
pub mod feed;
pub mod aggregator;
pub mod manager;

pub use geo::{Coordinates, GeoPoint, EARTH_RADIUS_KM};
pub use cache::BoundedCache;
pub use statistics::{ReliabilityRecord, ReliabilityTracker};
pub use entry::{Altitude, EntryData, FeedEntry, Override};
pub use decoder::{DecodeError, FeedFormat};
pub use error::{FeedError, FeedResult};
pub use config::{ConfigError, FeedConfig};
pub use fetch::{FetchSource, HttpFetcher};
pub use filter::EntryFilter;
pub use feed::{key_by_id, EntryMap, Feed, FeedUpdate, UpdateStatus};
pub use aggregator::FeedAggregator;
pub use manager::{EntityHandler, FeedEntries, FeedManager};
