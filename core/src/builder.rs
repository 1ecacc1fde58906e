//! Fluent builders for request payloads.
//!
//! Setters only record values; every rule is checked once in `build()`, which
//! returns `Error::Validation` naming the first field that is missing. Empty
//! strings count as missing.

use chrono::{DateTime, FixedOffset};

use crate::error::{Error, Result};
use crate::request::{
    EventRequest, Organizer, RequestRecipients, RevocationTarget, SmartInviteRequest,
    TokenRevocationRequest, METHOD_CANCEL,
};
use crate::time::EventTime;
use crate::types::Location;

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    present(value).ok_or_else(|| Error::validation(format!("{field} is required")))
}

/// Fields shared by the single- and multi-recipient invite builders.
#[derive(Debug, Clone, Default)]
struct InviteFields {
    method: Option<String>,
    callback_url: Option<String>,
    invite_id: Option<String>,
    organizer: Option<Organizer>,
    event: Option<EventRequest>,
}

impl InviteFields {
    /// Validates everything but the recipients, which each builder checks
    /// before calling this.
    fn finish(self, recipients: RequestRecipients) -> Result<SmartInviteRequest> {
        let method = required(self.method, "method")?;
        let smart_invite_id = required(self.invite_id, "invite_id")?;
        let callback_url = present(self.callback_url);

        if method != METHOD_CANCEL {
            if callback_url.is_none() {
                return Err(Error::validation(format!(
                    "callback_url is required for method `{method}`"
                )));
            }
            if self.event.is_none() {
                return Err(Error::validation(format!(
                    "event is required for method `{method}`"
                )));
            }
        }
        if let Some(organizer) = &self.organizer {
            if organizer.name.is_empty() {
                return Err(Error::validation("organizer name is required"));
            }
        }

        Ok(SmartInviteRequest {
            method,
            smart_invite_id,
            callback_url,
            recipients,
            event: self.event,
            organizer: self.organizer,
        })
    }
}

fn organizer(name: impl Into<String>, email: Option<String>) -> Organizer {
    Organizer {
        name: name.into(),
        email: present(email),
    }
}

/// Builds an invite addressed to exactly one recipient.
#[derive(Debug, Clone, Default)]
pub struct SmartInviteRequestBuilder {
    fields: InviteFields,
    recipient: Option<String>,
}

impl SmartInviteRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `"request"`, `"update"` or `"cancel"`.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.fields.method = Some(method.into());
        self
    }

    pub fn callback_url(mut self, url: impl Into<String>) -> Self {
        self.fields.callback_url = Some(url.into());
        self
    }

    pub fn invite_id(mut self, id: impl Into<String>) -> Self {
        self.fields.invite_id = Some(id.into());
        self
    }

    pub fn recipient(mut self, email: impl Into<String>) -> Self {
        self.recipient = Some(email.into());
        self
    }

    pub fn organizer(mut self, name: impl Into<String>) -> Self {
        self.fields.organizer = Some(organizer(name, None));
        self
    }

    pub fn organizer_with_email(
        mut self,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        self.fields.organizer = Some(organizer(name, Some(email.into())));
        self
    }

    pub fn event(mut self, event: EventRequest) -> Self {
        self.fields.event = Some(event);
        self
    }

    pub fn build(self) -> Result<SmartInviteRequest> {
        let recipient = required(self.recipient, "recipient")?;
        self.fields.finish(RequestRecipients::Single(recipient))
    }
}

/// Builds an invite addressed to several recipients, kept in the order they
/// were added.
#[derive(Debug, Clone, Default)]
pub struct SmartInviteMultiRecipientRequestBuilder {
    fields: InviteFields,
    recipients: Vec<String>,
}

impl SmartInviteMultiRecipientRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.fields.method = Some(method.into());
        self
    }

    pub fn callback_url(mut self, url: impl Into<String>) -> Self {
        self.fields.callback_url = Some(url.into());
        self
    }

    pub fn invite_id(mut self, id: impl Into<String>) -> Self {
        self.fields.invite_id = Some(id.into());
        self
    }

    pub fn add_recipient(mut self, email: impl Into<String>) -> Self {
        self.recipients.push(email.into());
        self
    }

    pub fn organizer(mut self, name: impl Into<String>) -> Self {
        self.fields.organizer = Some(organizer(name, None));
        self
    }

    pub fn organizer_with_email(
        mut self,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        self.fields.organizer = Some(organizer(name, Some(email.into())));
        self
    }

    pub fn event(mut self, event: EventRequest) -> Self {
        self.fields.event = Some(event);
        self
    }

    pub fn build(self) -> Result<SmartInviteRequest> {
        if self.recipients.is_empty() {
            return Err(Error::validation("at least one recipient is required"));
        }
        if self.recipients.iter().any(|email| email.is_empty()) {
            return Err(Error::validation("recipient email must not be empty"));
        }
        self.fields.finish(RequestRecipients::Multiple(self.recipients))
    }
}

/// Builds the event embedded in an invite.
#[derive(Debug, Clone, Default)]
pub struct EventRequestBuilder {
    summary: Option<String>,
    description: Option<String>,
    start: Option<EventTime>,
    end: Option<EventTime>,
    url: Option<String>,
    location: Option<Location>,
    transparency: Option<String>,
}

impl EventRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// A `DateTime<Utc>` is read in `Etc/UTC`; pass an `EventTime` to name
    /// another zone.
    pub fn start(mut self, start: impl Into<EventTime>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn end(mut self, end: impl Into<EventTime>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Start instant recorded against the named IANA zone.
    pub fn start_in(
        self,
        instant: impl Into<DateTime<FixedOffset>>,
        tzid: impl Into<String>,
    ) -> Self {
        self.start(EventTime::new(instant.into(), tzid))
    }

    pub fn end_in(
        self,
        instant: impl Into<DateTime<FixedOffset>>,
        tzid: impl Into<String>,
    ) -> Self {
        self.end(EventTime::new(instant.into(), tzid))
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// `"opaque"` or `"transparent"`.
    pub fn transparency(mut self, transparency: impl Into<String>) -> Self {
        self.transparency = Some(transparency.into());
        self
    }

    pub fn build(self) -> Result<EventRequest> {
        let summary = required(self.summary, "event summary")?;
        let start = self
            .start
            .ok_or_else(|| Error::validation("event start is required"))?;
        let end = self
            .end
            .ok_or_else(|| Error::validation("event end is required"))?;
        if end.instant() < start.instant() {
            return Err(Error::validation("event end must not be before its start"));
        }

        Ok(EventRequest {
            summary,
            description: present(self.description),
            start,
            end,
            url: present(self.url),
            location: self.location,
            transparency: present(self.transparency),
        })
    }
}

/// Builds a token revocation targeting either a token or an account `sub`.
#[derive(Debug, Clone, Default)]
pub struct TokenRevocationRequestBuilder {
    client_id: Option<String>,
    client_secret: Option<String>,
    token: Option<String>,
    sub: Option<String>,
    request_pii_erasure: Option<bool>,
}

impl TokenRevocationRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn sub(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    pub fn request_pii_erasure(mut self, erase: bool) -> Self {
        self.request_pii_erasure = Some(erase);
        self
    }

    pub fn build(self) -> Result<TokenRevocationRequest> {
        let client_id = required(self.client_id, "client_id")?;
        let client_secret = required(self.client_secret, "client_secret")?;
        let target = match (present(self.token), present(self.sub)) {
            (Some(token), None) => RevocationTarget::Token(token),
            (None, Some(sub)) => RevocationTarget::Sub(sub),
            (Some(_), Some(_)) => {
                return Err(Error::validation("only one of token or sub may be given"))
            }
            (None, None) => return Err(Error::validation("one of token or sub is required")),
        };

        Ok(TokenRevocationRequest {
            client_id,
            client_secret,
            target,
            request_pii_erasure: self.request_pii_erasure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{METHOD_REQUEST, METHOD_UPDATE};
    use chrono::{TimeZone, Utc};

    fn event() -> EventRequest {
        EventRequestBuilder::new()
            .summary("Test Summary")
            .start(Utc.with_ymd_and_hms(2014, 8, 5, 15, 30, 0).unwrap())
            .end(Utc.with_ymd_and_hms(2014, 8, 5, 16, 30, 0).unwrap())
            .build()
            .unwrap()
    }

    fn validation_message(result: Result<impl std::fmt::Debug>) -> String {
        match result.unwrap_err() {
            Error::Validation(message) => message,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn single_recipient_build_sets_only_recipient() {
        let request = SmartInviteRequestBuilder::new()
            .method(METHOD_REQUEST)
            .callback_url("http://example.com/callbackUrl")
            .invite_id("testEventId")
            .recipient("example@example.com")
            .event(event())
            .build()
            .unwrap();
        assert_eq!(
            request.recipients(),
            &RequestRecipients::Single("example@example.com".to_string())
        );
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("recipients").is_none());
        assert_eq!(body["recipient"]["email"], "example@example.com");
    }

    #[test]
    fn missing_method_is_rejected() {
        let result = SmartInviteRequestBuilder::new()
            .invite_id("testEventId")
            .recipient("example@example.com")
            .build();
        assert_eq!(validation_message(result), "method is required");
    }

    #[test]
    fn missing_invite_id_is_rejected() {
        let result = SmartInviteRequestBuilder::new()
            .method(METHOD_CANCEL)
            .recipient("example@example.com")
            .build();
        assert_eq!(validation_message(result), "invite_id is required");
    }

    #[test]
    fn missing_recipient_is_rejected() {
        let result = SmartInviteRequestBuilder::new()
            .method(METHOD_REQUEST)
            .invite_id("testEventId")
            .callback_url("http://example.com/callbackUrl")
            .event(event())
            .build();
        assert_eq!(validation_message(result), "recipient is required");
    }

    #[test]
    fn empty_recipient_counts_as_missing() {
        let result = SmartInviteRequestBuilder::new()
            .method(METHOD_CANCEL)
            .invite_id("testEventId")
            .recipient("")
            .build();
        assert_eq!(validation_message(result), "recipient is required");
    }

    #[test]
    fn update_requires_event_and_callback() {
        let base = SmartInviteRequestBuilder::new()
            .method(METHOD_UPDATE)
            .invite_id("testEventId")
            .recipient("example@example.com");

        let result = base.clone().event(event()).build();
        assert_eq!(
            validation_message(result),
            "callback_url is required for method `update`"
        );

        let result = base.callback_url("http://example.com/callbackUrl").build();
        assert_eq!(validation_message(result), "event is required for method `update`");
    }

    #[test]
    fn cancel_needs_neither_event_nor_callback() {
        let request = SmartInviteRequestBuilder::new()
            .method(METHOD_CANCEL)
            .invite_id("testEventId")
            .recipient("example@example.com")
            .build()
            .unwrap();
        assert!(request.event().is_none());
        assert!(request.callback_url().is_none());
    }

    #[test]
    fn multi_recipient_requires_a_recipient() {
        let result = SmartInviteMultiRecipientRequestBuilder::new()
            .method(METHOD_REQUEST)
            .invite_id("testEventId")
            .callback_url("http://example.com/callbackUrl")
            .event(event())
            .build();
        assert_eq!(validation_message(result), "at least one recipient is required");
    }

    #[test]
    fn multi_recipient_keeps_insertion_order() {
        let request = SmartInviteMultiRecipientRequestBuilder::new()
            .method(METHOD_REQUEST)
            .invite_id("testEventId")
            .callback_url("http://example.com/callbackUrl")
            .add_recipient("cronofy@example.com")
            .add_recipient("cronofy2@example.com")
            .organizer_with_email("My Cool Application", "organizer@example.com")
            .event(event())
            .build()
            .unwrap();
        assert_eq!(
            request.recipients(),
            &RequestRecipients::Multiple(vec![
                "cronofy@example.com".to_string(),
                "cronofy2@example.com".to_string(),
            ])
        );
        assert_eq!(
            request.organizer().unwrap().email.as_deref(),
            Some("organizer@example.com")
        );
    }

    #[test]
    fn organizer_with_empty_email_drops_the_email() {
        let request = SmartInviteRequestBuilder::new()
            .method(METHOD_CANCEL)
            .invite_id("testEventId")
            .recipient("example@example.com")
            .organizer_with_email("My Cool Application", "")
            .build()
            .unwrap();
        assert_eq!(request.organizer().unwrap().email, None);
    }

    #[test]
    fn event_requires_summary_start_and_end() {
        let start = Utc.with_ymd_and_hms(2014, 8, 5, 15, 30, 0).unwrap();
        assert_eq!(
            validation_message(EventRequestBuilder::new().start(start).end(start).build()),
            "event summary is required"
        );
        assert_eq!(
            validation_message(EventRequestBuilder::new().summary("s").end(start).build()),
            "event start is required"
        );
        assert_eq!(
            validation_message(EventRequestBuilder::new().summary("s").start(start).build()),
            "event end is required"
        );
    }

    #[test]
    fn event_times_keep_an_explicit_zone() {
        let paris = FixedOffset::east_opt(2 * 3600).unwrap();
        let event = EventRequestBuilder::new()
            .summary("Test Summary")
            .start_in(Utc.with_ymd_and_hms(2014, 9, 13, 21, 0, 0).unwrap(), "Europe/Paris")
            .end_in(
                paris.with_ymd_and_hms(2014, 9, 14, 0, 0, 0).unwrap(),
                "Europe/Paris",
            )
            .build()
            .unwrap();
        assert_eq!(event.start().tzid(), "Europe/Paris");

        let body = serde_json::to_value(&event).unwrap();
        assert_eq!(
            body["start"],
            serde_json::json!({ "time": "2014-09-13 21:00:00Z", "tzid": "Europe/Paris" })
        );
        assert_eq!(
            body["end"],
            serde_json::json!({ "time": "2014-09-13 22:00:00Z", "tzid": "Europe/Paris" })
        );
    }

    #[test]
    fn event_end_before_start_is_rejected() {
        let result = EventRequestBuilder::new()
            .summary("Backwards")
            .start(Utc.with_ymd_and_hms(2014, 8, 5, 16, 30, 0).unwrap())
            .end(Utc.with_ymd_and_hms(2014, 8, 5, 15, 30, 0).unwrap())
            .build();
        assert_eq!(
            validation_message(result),
            "event end must not be before its start"
        );
    }

    #[test]
    fn revocation_needs_exactly_one_target() {
        let base = TokenRevocationRequestBuilder::new()
            .client_id("abcdef123456")
            .client_secret("s3cr3t1v3");
        assert_eq!(
            validation_message(base.clone().build()),
            "one of token or sub is required"
        );
        assert_eq!(
            validation_message(base.clone().token("t").sub("s").build()),
            "only one of token or sub may be given"
        );
        let request = base.sub("acc_1").build().unwrap();
        assert_eq!(request.target(), &RevocationTarget::Sub("acc_1".to_string()));
    }

    #[test]
    fn revocation_needs_client_credentials() {
        let result = TokenRevocationRequestBuilder::new().token("t").build();
        assert_eq!(validation_message(result), "client_id is required");
    }
}
