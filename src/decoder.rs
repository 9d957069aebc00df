/// Provider payload decoding
///
/// Turns a raw response body into canonical `EntryData` records. This is the
/// only provider-specific code; everything downstream works on `EntryData`.

use crate::entry::{Altitude, EntryData};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const DUMP1090_DEFAULT_PORT: u16 = 8888;
pub const FLIGHTRADAR24_DEFAULT_PORT: u16 = 8754;

/// Minimum number of positional fields in a flightradar24 record
pub const FLIGHTRADAR24_RECORD_LEN: usize = 17;

const GROUND_MARKER: &str = "ground";

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object at the top level")]
    NotAnObject,

    #[error("missing required key `{0}`")]
    MissingKey(&'static str),

    #[error("record {id}: need {need} fields, have {have}")]
    ShortRecord { id: String, need: usize, have: usize },
}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// Supported feed providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedFormat {
    /// dump1090 `data/aircraft.json`
    #[default]
    Dump1090,
    /// Local flightradar24 feeder `flights.json`
    Flightradar24,
}

impl FeedFormat {
    pub fn name(&self) -> &'static str {
        match self {
            FeedFormat::Dump1090 => "dump1090",
            FeedFormat::Flightradar24 => "flightradar24",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            FeedFormat::Dump1090 => DUMP1090_DEFAULT_PORT,
            FeedFormat::Flightradar24 => FLIGHTRADAR24_DEFAULT_PORT,
        }
    }

    /// Build the endpoint URL for a host/port pair
    pub fn url(&self, hostname: &str, port: u16) -> String {
        match self {
            FeedFormat::Dump1090 => format!("http://{}:{}/data/aircraft.json", hostname, port),
            FeedFormat::Flightradar24 => format!("http://{}:{}/flights.json", hostname, port),
        }
    }

    /// Decode a response body into canonical records
    pub fn decode(&self, payload: &[u8]) -> DecodeResult<Vec<EntryData>> {
        let value: Value = serde_json::from_slice(payload)?;
        let records = match self {
            FeedFormat::Dump1090 => decode_dump1090(value)?,
            FeedFormat::Flightradar24 => decode_flightradar24(value)?,
        };
        tracing::debug!(format = self.name(), records = records.len(), "decoded payload");
        Ok(records)
    }
}

#[derive(Deserialize)]
struct Dump1090Payload {
    now: Option<f64>,
    aircraft: Vec<Dump1090Aircraft>,
}

#[derive(Deserialize)]
struct Dump1090Aircraft {
    hex: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    track: Option<f64>,
    altitude: Option<RawAltitude>,
    speed: Option<f64>,
    squawk: Option<String>,
    vert_rate: Option<f64>,
    flight: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAltitude {
    Feet(f64),
    Marker(String),
}

impl RawAltitude {
    fn normalize(self) -> Option<Altitude> {
        match self {
            RawAltitude::Feet(feet) => Some(Altitude::Feet(feet.round() as i64)),
            RawAltitude::Marker(marker) if marker == GROUND_MARKER => Some(Altitude::Ground),
            RawAltitude::Marker(_) => None,
        }
    }
}

fn decode_dump1090(value: Value) -> DecodeResult<Vec<EntryData>> {
    let object = value.as_object().ok_or(DecodeError::NotAnObject)?;
    if object.get("aircraft").map_or(true, Value::is_null) {
        return Err(DecodeError::MissingKey("aircraft"));
    }
    let payload: Dump1090Payload = serde_json::from_value(value)?;

    // Records carry no time of their own; the snapshot time applies to all.
    let updated = payload.now;
    Ok(payload
        .aircraft
        .into_iter()
        .map(|aircraft| EntryData {
            mode_s: aircraft.hex,
            latitude: aircraft.lat,
            longitude: aircraft.lon,
            track: aircraft.track,
            altitude: aircraft.altitude.and_then(RawAltitude::normalize),
            speed: aircraft.speed,
            squawk: aircraft.squawk,
            updated,
            vert_rate: aircraft.vert_rate.map(|rate| rate.round() as i64),
            callsign: aircraft.flight,
        })
        .collect())
}

// Positional layout of a flightradar24 record.
const FR24_MODE_S: usize = 0;
const FR24_LATITUDE: usize = 1;
const FR24_LONGITUDE: usize = 2;
const FR24_TRACK: usize = 3;
const FR24_ALTITUDE: usize = 4;
const FR24_SPEED: usize = 5;
const FR24_SQUAWK: usize = 6;
const FR24_UPDATED: usize = 10;
const FR24_VERT_RATE: usize = 15;
const FR24_CALLSIGN: usize = 16;

fn decode_flightradar24(value: Value) -> DecodeResult<Vec<EntryData>> {
    let Value::Object(object) = value else {
        return Err(DecodeError::NotAnObject);
    };

    let mut records = Vec::with_capacity(object.len());
    for (key, value) in object {
        // Non-array members are feeder metadata (counters, version).
        let Value::Array(fields) = value else {
            continue;
        };
        if fields.len() < FLIGHTRADAR24_RECORD_LEN {
            return Err(DecodeError::ShortRecord {
                id: key,
                need: FLIGHTRADAR24_RECORD_LEN,
                have: fields.len(),
            });
        }
        records.push(EntryData {
            mode_s: string_at(&fields, FR24_MODE_S),
            latitude: number_at(&fields, FR24_LATITUDE),
            longitude: number_at(&fields, FR24_LONGITUDE),
            track: number_at(&fields, FR24_TRACK),
            altitude: number_at(&fields, FR24_ALTITUDE).map(|feet| Altitude::Feet(feet.round() as i64)),
            speed: number_at(&fields, FR24_SPEED),
            squawk: string_at(&fields, FR24_SQUAWK),
            updated: number_at(&fields, FR24_UPDATED),
            vert_rate: number_at(&fields, FR24_VERT_RATE).map(|rate| rate.round() as i64),
            callsign: string_at(&fields, FR24_CALLSIGN),
        });
    }
    Ok(records)
}

fn string_at(fields: &[Value], index: usize) -> Option<String> {
    fields.get(index)?.as_str().map(str::to_string)
}

fn number_at(fields: &[Value], index: usize) -> Option<f64> {
    fields.get(index)?.as_f64()
}
