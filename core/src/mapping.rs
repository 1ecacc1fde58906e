//! Response bodies mapped onto the domain model.
//!
//! # Design
//! Mapping walks a `serde_json::Value` by hand instead of deriving
//! `Deserialize`, so that every lookup knows its field path and the
//! presence-driven choices (`recipient` or `recipients`, absent `replies`,
//! bare or object timestamps) are written out where they happen. Keys the
//! model does not know are ignored. A known key holding the wrong type is an
//! `Error::Mapping` naming the path, never a silent default.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::time::{parse_instant, EventTime, UTC_TZID};
use crate::types::{
    Attendee, Event, InviteAttachments, InviteRecipients, Location, Proposal, SmartInvite,
};

type Object = Map<String, Value>;

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn mismatch(path: &str, expected: &str) -> Error {
    let path = if path.is_empty() { "$" } else { path };
    Error::mapping(path, format!("expected {expected}"))
}

fn object<'a>(value: &'a Value, path: &str) -> Result<&'a Object> {
    value.as_object().ok_or_else(|| mismatch(path, "an object"))
}

/// A key that is absent or explicitly `null`.
fn lookup<'a>(obj: &'a Object, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn required_str(obj: &Object, path: &str, key: &str) -> Result<String> {
    let path = child(path, key);
    match lookup(obj, key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(mismatch(&path, "a string")),
        None => Err(Error::mapping(path, "missing required field")),
    }
}

fn optional_str(obj: &Object, path: &str, key: &str) -> Result<Option<String>> {
    match lookup(obj, key) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(mismatch(&child(path, key), "a string")),
        None => Ok(None),
    }
}

/// Coordinates come back as strings, but numbers are accepted as well.
fn optional_coordinate(obj: &Object, path: &str, key: &str) -> Result<Option<String>> {
    match lookup(obj, key) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(mismatch(&child(path, key), "a string or number")),
        None => Ok(None),
    }
}

fn array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| mismatch(path, "an array"))
}

/// Maps a Smart Invite response body.
pub fn smart_invite_from_str(body: &str) -> Result<SmartInvite> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| Error::mapping("$", e.to_string()))?;
    smart_invite(&value)
}

pub fn smart_invite(value: &Value) -> Result<SmartInvite> {
    let obj = object(value, "")?;

    let event = match lookup(obj, "event") {
        Some(event_value) => event(event_value, "event")?,
        None => return Err(Error::mapping("event", "missing required field")),
    };

    Ok(SmartInvite {
        smart_invite_id: required_str(obj, "", "smart_invite_id")?,
        callback_url: optional_str(obj, "", "callback_url")?,
        method: required_str(obj, "", "method")?,
        event,
        recipients: invite_recipients(obj)?,
        attachments: lookup(obj, "attachments")
            .map(|v| attachments(v, "attachments"))
            .transpose()?,
    })
}

/// Picks the single- or multi-recipient shape from whichever key is present.
fn invite_recipients(obj: &Object) -> Result<InviteRecipients> {
    match (lookup(obj, "recipient"), lookup(obj, "recipients")) {
        (Some(recipient), None) => {
            let replies = match lookup(obj, "replies") {
                Some(replies) => attendees(replies, "replies")?,
                None => Vec::new(),
            };
            Ok(InviteRecipients::Single {
                recipient: attendee(recipient, "recipient")?,
                replies,
            })
        }
        (None, Some(recipients)) => {
            if lookup(obj, "replies").is_some() {
                tracing::warn!("ignoring `replies` on a multi-recipient invite");
            }
            Ok(InviteRecipients::Multiple(attendees(recipients, "recipients")?))
        }
        (Some(_), Some(_)) => Err(Error::mapping(
            "recipients",
            "`recipient` and `recipients` are mutually exclusive",
        )),
        (None, None) => Err(Error::mapping(
            "recipient",
            "expected `recipient` or `recipients`",
        )),
    }
}

fn attendees(value: &Value, path: &str) -> Result<Vec<Attendee>> {
    array(value, path)?
        .iter()
        .enumerate()
        .map(|(i, item)| attendee(item, &format!("{path}[{i}]")))
        .collect()
}

pub fn attendee(value: &Value, path: &str) -> Result<Attendee> {
    let obj = object(value, path)?;
    Ok(Attendee {
        email: required_str(obj, path, "email")?,
        status: optional_str(obj, path, "status")?,
        comment: optional_str(obj, path, "comment")?,
        proposal: lookup(obj, "proposal")
            .map(|v| proposal(v, &child(path, "proposal")))
            .transpose()?,
    })
}

fn proposal(value: &Value, path: &str) -> Result<Proposal> {
    let obj = object(value, path)?;
    Ok(Proposal {
        start: required_time(obj, path, "start", None)?,
        end: required_time(obj, path, "end", None)?,
    })
}

fn attachments(value: &Value, path: &str) -> Result<InviteAttachments> {
    let obj = object(value, path)?;
    Ok(InviteAttachments {
        icalendar: optional_str(obj, path, "icalendar")?,
    })
}

fn event(value: &Value, path: &str) -> Result<Event> {
    let obj = object(value, path)?;
    let tzid = optional_str(obj, path, "tzid")?;

    Ok(Event {
        summary: required_str(obj, path, "summary")?,
        description: optional_str(obj, path, "description")?,
        start: required_time(obj, path, "start", tzid.as_deref())?,
        end: required_time(obj, path, "end", tzid.as_deref())?,
        location: lookup(obj, "location")
            .map(|v| location(v, &child(path, "location")))
            .transpose()?,
        url: optional_str(obj, path, "url")?,
        transparency: optional_str(obj, path, "transparency")?,
    })
}

fn location(value: &Value, path: &str) -> Result<Location> {
    let obj = object(value, path)?;
    Ok(Location {
        description: optional_str(obj, path, "description")?,
        lat: optional_coordinate(obj, path, "lat")?,
        long: optional_coordinate(obj, path, "long")?,
    })
}

fn required_time(obj: &Object, path: &str, key: &str, zone: Option<&str>) -> Result<EventTime> {
    let path = child(path, key);
    match lookup(obj, key) {
        Some(value) => event_time(value, &path, zone),
        None => Err(Error::mapping(path, "missing required field")),
    }
}

/// Either `"2017-10-05T09:30:00Z"`, read in `zone` (or UTC), or
/// `{"time": ..., "tzid": ...}`.
pub fn event_time(value: &Value, path: &str, zone: Option<&str>) -> Result<EventTime> {
    let instant = |s: &str, path: &str| {
        parse_instant(s).ok_or_else(|| mismatch(path, "an RFC 3339 timestamp"))
    };
    let zone = zone.unwrap_or(UTC_TZID);

    match value {
        Value::String(s) => Ok(EventTime::new(instant(s, path)?, zone)),
        Value::Object(obj) => {
            let time = required_str(obj, path, "time")?;
            let tzid = optional_str(obj, path, "tzid")?;
            Ok(EventTime::new(
                instant(&time, &child(path, "time"))?,
                tzid.as_deref().unwrap_or(zone),
            ))
        }
        _ => Err(mismatch(path, "a timestamp string or {time, tzid} object")),
    }
}
