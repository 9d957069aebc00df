/// Base filter chain
///
/// Three independent predicates, applied in order:
/// 1. a usable position fix (not absent, not `(0, 0)`)
/// 2. airborne (altitude above 0)
/// 3. within the configured radius of home, boundary included

use crate::entry::FeedEntry;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EntryFilter {
    radius_km: Option<f64>,
}

impl EntryFilter {
    pub fn new(radius_km: Option<f64>) -> Self {
        EntryFilter { radius_km }
    }

    pub fn radius_km(&self) -> Option<f64> {
        self.radius_km
    }

    pub fn accepts(&self, entry: &FeedEntry) -> bool {
        has_fix(entry) && is_airborne(entry) && self.within_radius(entry)
    }

    pub fn apply<I>(&self, entries: I) -> Vec<FeedEntry>
    where
        I: IntoIterator<Item = FeedEntry>,
    {
        entries.into_iter().filter(|entry| self.accepts(entry)).collect()
    }

    fn within_radius(&self, entry: &FeedEntry) -> bool {
        match self.radius_km {
            None => true,
            Some(radius) => entry
                .distance_to_home()
                .is_some_and(|distance| distance <= radius),
        }
    }
}

fn has_fix(entry: &FeedEntry) -> bool {
    entry.coordinates().is_some_and(|c| c.is_fix())
}

fn is_airborne(entry: &FeedEntry) -> bool {
    entry.altitude().is_some_and(|altitude| altitude > 0)
}
