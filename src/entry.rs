/// Normalized feed entries
///
/// `EntryData` is the canonical record every provider format decodes into.
/// `FeedEntry` wraps an optional `EntryData` together with the home point and
/// answers derived questions about it. An entry without data answers `None`
/// to everything.

use crate::geo::{Coordinates, GeoPoint};
use crate::statistics::ReliabilityRecord;
use chrono::{DateTime, Utc};
use std::fmt;

/// Reported altitude; dump1090 uses the string `"ground"` for surface targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Altitude {
    Feet(i64),
    Ground,
}

impl Altitude {
    pub fn feet(&self) -> i64 {
        match self {
            Altitude::Feet(feet) => *feet,
            Altitude::Ground => 0,
        }
    }
}

/// Canonical post-parse record
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntryData {
    pub mode_s: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub track: Option<f64>,
    pub altitude: Option<Altitude>,
    pub speed: Option<f64>,
    pub squawk: Option<String>,
    /// Epoch seconds
    pub updated: Option<f64>,
    pub vert_rate: Option<i64>,
    pub callsign: Option<String>,
}

/// A single-field replacement applied by the aggregator before an entry is
/// handed out.
#[derive(Debug, Clone, PartialEq)]
pub enum Override {
    Callsign(String),
    Latitude(f64),
    Longitude(f64),
    Altitude(Altitude),
    Track(f64),
    Speed(f64),
    Squawk(String),
    VertRate(i64),
    Updated(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    home: GeoPoint,
    data: Option<EntryData>,
    statistics: Option<ReliabilityRecord>,
}

impl FeedEntry {
    pub fn new(home: GeoPoint, data: Option<EntryData>) -> Self {
        FeedEntry {
            home,
            data,
            statistics: None,
        }
    }

    pub fn data(&self) -> Option<&EntryData> {
        self.data.as_ref()
    }

    pub fn home(&self) -> GeoPoint {
        self.home
    }

    /// Replace one field of the backing data. No-op without data.
    pub fn apply_override(&mut self, value: Override) {
        let Some(data) = self.data.as_mut() else {
            return;
        };
        match value {
            Override::Callsign(callsign) => data.callsign = Some(callsign),
            Override::Latitude(lat) => data.latitude = Some(lat),
            Override::Longitude(lon) => data.longitude = Some(lon),
            Override::Altitude(altitude) => data.altitude = Some(altitude),
            Override::Track(track) => data.track = Some(track),
            Override::Speed(speed) => data.speed = Some(speed),
            Override::Squawk(squawk) => data.squawk = Some(squawk),
            Override::VertRate(rate) => data.vert_rate = Some(rate),
            Override::Updated(updated) => data.updated = Some(updated),
        }
    }

    pub fn external_id(&self) -> Option<&str> {
        self.data.as_ref()?.mode_s.as_deref()
    }

    /// Reported coordinates, unfiltered
    pub fn coordinates(&self) -> Option<Coordinates> {
        let data = self.data.as_ref()?;
        Some(Coordinates {
            latitude: data.latitude,
            longitude: data.longitude,
        })
    }

    /// Great-circle distance from home in km, if both components are known
    pub fn distance_to_home(&self) -> Option<f64> {
        let coordinates = self.coordinates()?;
        let point = GeoPoint::new(coordinates.latitude?, coordinates.longitude?);
        Some(self.home.distance_km(&point))
    }

    /// Altitude in feet; on-ground reports are 0
    pub fn altitude(&self) -> Option<i64> {
        self.data.as_ref()?.altitude.map(|a| a.feet())
    }

    /// Trimmed callsign, possibly empty
    pub fn callsign(&self) -> Option<&str> {
        self.data.as_ref()?.callsign.as_deref().map(str::trim)
    }

    /// True if the callsign is present and not blank
    pub fn has_callsign(&self) -> bool {
        self.callsign().is_some_and(|c| !c.is_empty())
    }

    pub fn speed(&self) -> Option<f64> {
        self.data.as_ref()?.speed
    }

    pub fn track(&self) -> Option<f64> {
        self.data.as_ref()?.track
    }

    pub fn squawk(&self) -> Option<&str> {
        self.data.as_ref()?.squawk.as_deref()
    }

    pub fn vert_rate(&self) -> Option<i64> {
        self.data.as_ref()?.vert_rate
    }

    /// Update time; a missing or zero epoch value is absent
    pub fn updated(&self) -> Option<DateTime<Utc>> {
        let seconds = self.data.as_ref()?.updated?;
        if seconds == 0.0 || !seconds.is_finite() {
            return None;
        }
        DateTime::<Utc>::from_timestamp_millis((seconds * 1000.0).round() as i64)
    }

    pub fn statistics(&self) -> Option<ReliabilityRecord> {
        self.statistics
    }

    pub fn set_statistics(&mut self, statistics: Option<ReliabilityRecord>) {
        self.statistics = statistics;
    }
}

impl fmt::Display for FeedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.external_id() {
            Some(id) => write!(f, "FeedEntry(id={})", id),
            None => write!(f, "FeedEntry(id=None)"),
        }
    }
}
