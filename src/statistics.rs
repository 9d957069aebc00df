/// Per-aircraft retrieval reliability
///
/// Tracks, for each external id, how many update cycles actually reported it
/// out of the cycles in which it was expected.

use crate::cache::BoundedCache;
use crate::config::ConfigError;
use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroUsize;

pub const DEFAULT_STATISTICS_CACHE_SIZE: usize = 250;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(DEFAULT_STATISTICS_CACHE_SIZE) {
    Some(capacity) => capacity,
    None => panic!("statistics cache size must be non-zero"),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReliabilityRecord {
    successes: u32,
    total: u32,
}

impl ReliabilityRecord {
    /// A record for an id seen for the first time
    pub fn first_seen() -> Self {
        ReliabilityRecord {
            successes: 1,
            total: 1,
        }
    }

    pub fn from_counts(successes: u32, total: u32) -> Self {
        ReliabilityRecord { successes, total }
    }

    pub fn record_success(&mut self) {
        self.successes = self.successes.saturating_add(1);
        self.total = self.total.saturating_add(1);
    }

    pub fn record_miss(&mut self) {
        self.total = self.total.saturating_add(1);
    }

    pub fn successes(&self) -> u32 {
        self.successes
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// successes / total, or 0 when nothing has been attempted
    pub fn success_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.successes as f64 / self.total as f64
    }
}

impl fmt::Display for ReliabilityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.success_ratio() * 100.0)
    }
}

#[derive(Debug, Clone)]
pub struct ReliabilityTracker {
    records: BoundedCache<String, ReliabilityRecord>,
}

impl ReliabilityTracker {
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Ok(ReliabilityTracker {
            records: BoundedCache::new(capacity)?,
        })
    }

    pub fn get(&self, id: &str) -> Option<ReliabilityRecord> {
        self.records.get(id).copied()
    }

    /// Record a cycle that returned data.
    ///
    /// Tracked ids present in `seen_ids` gain a success, the rest a miss.
    /// New ids start at one success out of one.
    pub fn record_successful_cycle<'a, I>(&mut self, seen_ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let seen_ids: Vec<&str> = seen_ids.into_iter().collect();
        let seen: HashSet<&str> = seen_ids.iter().copied().collect();

        for (id, record) in self.records.iter_mut() {
            if seen.contains(id.as_str()) {
                record.record_success();
            } else {
                record.record_miss();
            }
        }

        for id in seen_ids {
            if !self.records.contains(id) {
                let evicted = self.records.set(id.to_string(), ReliabilityRecord::first_seen());
                if let Some((evicted, _)) = evicted {
                    tracing::debug!(id = %evicted, "reliability history evicted");
                }
            }
        }
    }

    /// Record a cycle with no data: every tracked id missed it
    pub fn record_failed_cycle(&mut self) {
        for (_, record) in self.records.iter_mut() {
            record.record_miss();
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for ReliabilityTracker {
    fn default() -> Self {
        ReliabilityTracker {
            records: BoundedCache::with_capacity(DEFAULT_CAPACITY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_id() {
        let tracker = ReliabilityTracker::default();
        assert_eq!(tracker.get("non-existing"), None);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_record_display() {
        let mut record = ReliabilityRecord::from_counts(0, 0);
        assert_eq!(record.to_string(), "0.0%");
        assert_eq!(record.success_ratio(), 0.0);

        record.record_success();
        assert_eq!(record.to_string(), "100.0%");

        record.record_miss();
        assert_eq!(record.to_string(), "50.0%");
    }

    #[test]
    fn test_successful_then_failed_cycles() {
        let mut tracker = ReliabilityTracker::default();
        let keys = ["a", "b", "c"];

        tracker.record_successful_cycle(keys);
        assert_eq!(tracker.get("a").unwrap().success_ratio(), 1.0);

        tracker.record_successful_cycle(keys);
        assert_eq!(tracker.get("a").unwrap().success_ratio(), 1.0);

        tracker.record_failed_cycle();
        let record = tracker.get("a").unwrap();
        assert_eq!((record.successes(), record.total()), (2, 3));
        assert_eq!(record.to_string(), "66.7%");
    }

    #[test]
    fn test_missing_for_one_cycle() {
        let mut tracker = ReliabilityTracker::default();
        tracker.record_successful_cycle(["x", "y"]);
        tracker.record_successful_cycle(["y"]);

        assert_eq!(tracker.get("x").unwrap().success_ratio(), 0.5);
        assert_eq!(tracker.get("y").unwrap().success_ratio(), 1.0);
    }

    #[test]
    fn test_new_id_joins_later() {
        let mut tracker = ReliabilityTracker::default();
        tracker.record_successful_cycle(["a"]);
        tracker.record_successful_cycle(["a", "b"]);

        assert_eq!(tracker.get("a").unwrap().total(), 2);
        assert_eq!(tracker.get("b").unwrap(), ReliabilityRecord::first_seen());
    }

    #[test]
    fn test_eviction_drops_history() {
        let mut tracker = ReliabilityTracker::new(2).unwrap();
        tracker.record_successful_cycle(["a"]);
        tracker.record_successful_cycle(["b"]);
        tracker.record_successful_cycle(["c"]);

        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.get("a"), None);

        // Reobserved: tracked again from scratch.
        tracker.record_successful_cycle(["a"]);
        assert_eq!(tracker.get("a").unwrap(), ReliabilityRecord::first_seen());
    }
}
