//! Synchronous client core for the Cronofy Smart Invites API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The facade methods on
//! `CronofyClient` run a request through any `Transport`; the optional `ureq`
//! feature (on by default) provides a blocking one.
//!
//! # Design
//! - `CronofyClient` is stateless apart from its `ClientConfig`.
//! - Request payloads come out of builders that validate once, in `build()`,
//!   and serialize through hand-written `Serialize` impls that omit unset
//!   optional fields.
//! - Responses are mapped field by field in `mapping`, so a shape mismatch is
//!   reported with the path of the offending field.
//! - Single- and multi-recipient invites are one `InviteRecipients` variant.

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod mapping;
pub mod request;
pub mod time;
pub mod types;

pub use builder::{
    EventRequestBuilder, SmartInviteMultiRecipientRequestBuilder, SmartInviteRequestBuilder,
    TokenRevocationRequestBuilder,
};
pub use client::CronofyClient;
pub use config::{ClientConfig, DataCenter};
pub use error::{Error, Result};
#[cfg(feature = "ureq")]
pub use http::UreqTransport;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use request::{
    EventRequest, Organizer, RequestRecipients, RevocationTarget, SmartInviteRequest,
    TokenRevocationRequest,
};
pub use time::EventTime;
pub use types::{
    Attendee, Event, InviteAttachments, InviteRecipients, Location, Proposal, SmartInvite,
};
