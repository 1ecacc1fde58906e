//! Domain model returned by the Smart Invites API.
//!
//! # Design
//! These are the values callers work with after a response has been mapped.
//! The single-recipient and multi-recipient wire shapes are carried as one
//! `InviteRecipients` variant instead of two nullable fields, so an invite
//! can never hold both or neither.

use crate::time::EventTime;

/// A tracked invitation and the replies it has collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartInvite {
    pub smart_invite_id: String,
    pub callback_url: Option<String>,
    /// `"request"`, `"cancel"` or `"update"`; passed through as received.
    pub method: String,
    pub event: Event,
    pub recipients: InviteRecipients,
    pub attachments: Option<InviteAttachments>,
}

impl SmartInvite {
    /// The invitee of a single-recipient invite.
    pub fn recipient(&self) -> Option<&Attendee> {
        match &self.recipients {
            InviteRecipients::Single { recipient, .. } => Some(recipient),
            InviteRecipients::Multiple(_) => None,
        }
    }

    /// The invitees of a multi-recipient invite, in the order sent.
    pub fn recipients(&self) -> Option<&[Attendee]> {
        match &self.recipients {
            InviteRecipients::Single { .. } => None,
            InviteRecipients::Multiple(recipients) => Some(recipients),
        }
    }

    /// Replies recorded against a single-recipient invite. Always empty for
    /// multi-recipient invites, whose statuses live on `recipients()`.
    pub fn replies(&self) -> &[Attendee] {
        match &self.recipients {
            InviteRecipients::Single { replies, .. } => replies,
            InviteRecipients::Multiple(_) => &[],
        }
    }

    /// Every attendee the invite knows about: the recipient followed by its
    /// replies, or the recipient list.
    pub fn attendees(&self) -> impl Iterator<Item = &Attendee> {
        let (head, tail): (Option<&Attendee>, &[Attendee]) = match &self.recipients {
            InviteRecipients::Single { recipient, replies } => (Some(recipient), replies),
            InviteRecipients::Multiple(recipients) => (None, recipients),
        };
        head.into_iter().chain(tail)
    }

    /// The iCalendar attachment, if the server produced one.
    pub fn icalendar(&self) -> Option<&str> {
        self.attachments.as_ref()?.icalendar.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteRecipients {
    Single {
        recipient: Attendee,
        replies: Vec<Attendee>,
    },
    Multiple(Vec<Attendee>),
}

/// An invitee and the state of their response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendee {
    pub email: String,
    /// `"pending"`, `"accepted"`, `"declined"`, `"tentative"`, ...
    pub status: Option<String>,
    pub comment: Option<String>,
    pub proposal: Option<Proposal>,
}

impl Attendee {
    pub fn new(email: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            status: Some(status.into()),
            comment: None,
            proposal: None,
        }
    }
}

/// An alternative time range suggested by a recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub start: EventTime,
    pub end: EventTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InviteAttachments {
    /// Raw iCalendar text, line breaks preserved.
    pub icalendar: Option<String>,
}

/// Snapshot of the event an invite describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub summary: String,
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub location: Option<Location>,
    pub url: Option<String>,
    pub transparency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub description: Option<String>,
    pub lat: Option<String>,
    pub long: Option<String>,
}
