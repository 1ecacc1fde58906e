//! Instants paired with a named time zone.
//!
//! The vendor's event API shares one time-value format: an object holding a
//! UTC timestamp and a zone identifier, e.g.
//! `{"time":"2014-08-05 15:30:00Z","tzid":"Etc/UTC"}`. Responses also use
//! RFC 3339 strings with an explicit offset, so parsing accepts both.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

pub const UTC_TZID: &str = "Etc/UTC";

const WIRE_FORMAT: &str = "%Y-%m-%d %H:%M:%SZ";

/// A point in time together with the IANA zone it should be read in.
///
/// Equality compares the instant, not its offset: 21:00Z and 23:00+02:00 in
/// the same zone are the same `EventTime`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTime {
    instant: DateTime<FixedOffset>,
    tzid: String,
}

impl EventTime {
    pub fn new(instant: DateTime<FixedOffset>, tzid: impl Into<String>) -> Self {
        Self {
            instant,
            tzid: tzid.into(),
        }
    }

    /// An instant read in `Etc/UTC`.
    pub fn utc(instant: DateTime<Utc>) -> Self {
        Self::new(instant.fixed_offset(), UTC_TZID)
    }

    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.instant
    }

    pub fn tzid(&self) -> &str {
        &self.tzid
    }

    /// The `time` member of the wire object.
    pub fn wire_time(&self) -> String {
        self.instant.with_timezone(&Utc).format(WIRE_FORMAT).to_string()
    }
}

impl From<DateTime<Utc>> for EventTime {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::utc(instant)
    }
}

/// Parses either an RFC 3339 timestamp or the `yyyy-mm-dd HH:MM:SSZ` form
/// this crate writes.
pub fn parse_instant(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant);
    }
    NaiveDateTime::parse_from_str(value, WIRE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

impl Serialize for EventTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.tzid.is_empty() {
            return self
                .instant
                .to_rfc3339_opts(SecondsFormat::Secs, true)
                .serialize(serializer);
        }
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("time", &self.wire_time())?;
        map.serialize_entry("tzid", &self.tzid)?;
        map.end()
    }
}
