//! Request payloads and their wire encoding.
//!
//! # Design
//! Each payload implements `Serialize` by hand through `serialize_map`, so
//! the key order and the omission of unset optionals are spelled out field by
//! field. An unset optional never appears on the wire, not even as `null`.
//! Payloads are produced by the builders in `crate::builder` and are
//! read-only afterwards.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::builder::{SmartInviteMultiRecipientRequestBuilder, SmartInviteRequestBuilder};
use crate::error;
use crate::time::EventTime;
use crate::types::Location;

pub const METHOD_REQUEST: &str = "request";
pub const METHOD_UPDATE: &str = "update";
pub const METHOD_CANCEL: &str = "cancel";

/// Who the invite comes from. Only ever sent, never returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organizer {
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestRecipients {
    Single(String),
    Multiple(Vec<String>),
}

/// A create, update or cancel payload for `POST /v1/smart_invites`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartInviteRequest {
    pub(crate) method: String,
    pub(crate) smart_invite_id: String,
    pub(crate) callback_url: Option<String>,
    pub(crate) recipients: RequestRecipients,
    pub(crate) event: Option<EventRequest>,
    pub(crate) organizer: Option<Organizer>,
}

impl SmartInviteRequest {
    pub fn builder() -> SmartInviteRequestBuilder {
        SmartInviteRequestBuilder::default()
    }

    pub fn multi_recipient_builder() -> SmartInviteMultiRecipientRequestBuilder {
        SmartInviteMultiRecipientRequestBuilder::default()
    }

    /// The reduced payload that withdraws an invite from one recipient.
    pub fn cancel(smart_invite_id: &str, recipient_email: &str) -> error::Result<Self> {
        Self::builder()
            .method(METHOD_CANCEL)
            .invite_id(smart_invite_id)
            .recipient(recipient_email)
            .build()
    }

    /// The reduced payload that withdraws an invite from several recipients.
    pub fn cancel_for_recipients<I, S>(
        smart_invite_id: &str,
        recipient_emails: I,
    ) -> error::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        recipient_emails
            .into_iter()
            .fold(
                Self::multi_recipient_builder()
                    .method(METHOD_CANCEL)
                    .invite_id(smart_invite_id),
                |builder, email| builder.add_recipient(email),
            )
            .build()
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn smart_invite_id(&self) -> &str {
        &self.smart_invite_id
    }

    pub fn callback_url(&self) -> Option<&str> {
        self.callback_url.as_deref()
    }

    pub fn recipients(&self) -> &RequestRecipients {
        &self.recipients
    }

    pub fn event(&self) -> Option<&EventRequest> {
        self.event.as_ref()
    }

    pub fn organizer(&self) -> Option<&Organizer> {
        self.organizer.as_ref()
    }
}

/// The event an outbound invite describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRequest {
    pub(crate) summary: String,
    pub(crate) description: Option<String>,
    pub(crate) start: EventTime,
    pub(crate) end: EventTime,
    pub(crate) url: Option<String>,
    pub(crate) location: Option<Location>,
    pub(crate) transparency: Option<String>,
}

impl EventRequest {
    pub fn builder() -> crate::builder::EventRequestBuilder {
        crate::builder::EventRequestBuilder::default()
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn start(&self) -> &EventTime {
        &self.start
    }

    pub fn end(&self) -> &EventTime {
        &self.end
    }
}

/// What a revocation targets: one token, or every token of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevocationTarget {
    Token(String),
    Sub(String),
}

/// Payload for `POST /oauth/token/revoke`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRevocationRequest {
    pub(crate) client_id: String,
    pub(crate) client_secret: String,
    pub(crate) target: RevocationTarget,
    pub(crate) request_pii_erasure: Option<bool>,
}

impl TokenRevocationRequest {
    pub fn builder() -> crate::builder::TokenRevocationRequestBuilder {
        crate::builder::TokenRevocationRequestBuilder::default()
    }

    pub fn target(&self) -> &RevocationTarget {
        &self.target
    }
}

/// `{"email": ...}`, the wire form of a recipient.
struct EmailRef<'a>(&'a str);

impl Serialize for EmailRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("email", self.0)?;
        map.end()
    }
}

struct EmailList<'a>(&'a [String]);

impl Serialize for EmailList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|email| EmailRef(email)))
    }
}

impl Serialize for SmartInviteRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("method", &self.method)?;
        map.serialize_entry("smart_invite_id", &self.smart_invite_id)?;
        if let Some(callback_url) = &self.callback_url {
            map.serialize_entry("callback_url", callback_url)?;
        }
        match &self.recipients {
            RequestRecipients::Single(email) => map.serialize_entry("recipient", &EmailRef(email))?,
            RequestRecipients::Multiple(emails) => {
                map.serialize_entry("recipients", &EmailList(emails))?
            }
        }
        if let Some(event) = &self.event {
            map.serialize_entry("event", event)?;
        }
        if let Some(organizer) = &self.organizer {
            map.serialize_entry("organizer", organizer)?;
        }
        map.end()
    }
}

impl Serialize for Organizer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", &self.name)?;
        if let Some(email) = &self.email {
            map.serialize_entry("email", email)?;
        }
        map.end()
    }
}

impl Serialize for EventRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("summary", &self.summary)?;
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }
        map.serialize_entry("start", &self.start)?;
        map.serialize_entry("end", &self.end)?;
        if let Some(url) = &self.url {
            map.serialize_entry("url", url)?;
        }
        if let Some(location) = &self.location {
            map.serialize_entry("location", location)?;
        }
        if let Some(transparency) = &self.transparency {
            map.serialize_entry("transparency", transparency)?;
        }
        map.end()
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }
        if let Some(lat) = &self.lat {
            map.serialize_entry("lat", lat)?;
        }
        if let Some(long) = &self.long {
            map.serialize_entry("long", long)?;
        }
        map.end()
    }
}

impl Serialize for TokenRevocationRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("client_id", &self.client_id)?;
        map.serialize_entry("client_secret", &self.client_secret)?;
        match &self.target {
            RevocationTarget::Token(token) => map.serialize_entry("token", token)?,
            RevocationTarget::Sub(sub) => map.serialize_entry("sub", sub)?,
        }
        if let Some(erase) = self.request_pii_erasure {
            map.serialize_entry("request_pii_erasure", &erase)?;
        }
        map.end()
    }
}
