//! Request builder, response parser and facade for the Smart Invites API.
//!
//! # Design
//! `CronofyClient` holds only its configuration and carries no mutable state
//! between calls. Every operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`, so the core stays free of I/O. The facade methods
//! (`create_invite`, `get_smart_invite`, ...) run both halves around a
//! caller-supplied `Transport`, one attempt per call.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::mapping;
use crate::request::{RevocationTarget, SmartInviteRequest, TokenRevocationRequest};
use crate::types::SmartInvite;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Synchronous, stateless client for Smart Invites and token revocation.
#[derive(Debug, Clone)]
pub struct CronofyClient {
    config: ClientConfig,
    api_url: String,
    app_url: String,
}

impl CronofyClient {
    pub fn new(config: ClientConfig) -> Self {
        let api_url = config.data_center.api_url();
        let app_url = config.data_center.app_url();
        Self {
            config,
            api_url,
            app_url,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn smart_invites_url(&self) -> String {
        format!("{}/v1/smart_invites", self.api_url)
    }

    fn authorization(&self) -> (String, String) {
        (
            "authorization".to_string(),
            format!("Bearer {}", self.config.client_secret),
        )
    }

    fn json_body<T: serde::Serialize>(payload: &T) -> Result<String> {
        serde_json::to_string(payload).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// `POST /v1/smart_invites` for a create, update or cancel payload.
    pub fn build_create_invite(&self, request: &SmartInviteRequest) -> Result<HttpRequest> {
        let body = Self::json_body(request)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.smart_invites_url(),
            headers: vec![
                self.authorization(),
                ("content-type".to_string(), JSON_CONTENT_TYPE.to_string()),
            ],
            body: Some(body),
        })
    }

    pub fn build_cancel_invite(
        &self,
        smart_invite_id: &str,
        recipient_email: &str,
    ) -> Result<HttpRequest> {
        let request = SmartInviteRequest::cancel(smart_invite_id, recipient_email)?;
        self.build_create_invite(&request)
    }

    pub fn build_cancel_invite_for_recipients(
        &self,
        smart_invite_id: &str,
        recipient_emails: &[&str],
    ) -> Result<HttpRequest> {
        let request = SmartInviteRequest::cancel_for_recipients(
            smart_invite_id,
            recipient_emails.iter().copied(),
        )?;
        self.build_create_invite(&request)
    }

    /// `GET /v1/smart_invites`, optionally narrowed to one recipient.
    pub fn build_get_smart_invite(
        &self,
        smart_invite_id: &str,
        recipient_email: Option<&str>,
    ) -> Result<HttpRequest> {
        if smart_invite_id.is_empty() {
            return Err(Error::validation("smart_invite_id is required"));
        }
        if recipient_email == Some("") {
            return Err(Error::validation("recipient_email must not be empty"));
        }
        let mut url = format!(
            "{}?smart_invite_id={}",
            self.smart_invites_url(),
            urlencoding::encode(smart_invite_id)
        );
        if let Some(email) = recipient_email {
            url.push_str("&recipient_email=");
            url.push_str(&urlencoding::encode(email));
        }
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: vec![self.authorization()],
            body: None,
        })
    }

    /// `POST /oauth/token/revoke`. Authenticated by the client credentials in
    /// the body, so no bearer header is sent.
    pub fn build_revoke(&self, request: &TokenRevocationRequest) -> Result<HttpRequest> {
        let body = Self::json_body(request)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/oauth/token/revoke", self.app_url),
            headers: vec![("content-type".to_string(), JSON_CONTENT_TYPE.to_string())],
            body: Some(body),
        })
    }

    /// A revocation request signed with this client's credentials.
    pub fn revocation(
        &self,
        target: RevocationTarget,
        request_pii_erasure: Option<bool>,
    ) -> Result<TokenRevocationRequest> {
        let builder = TokenRevocationRequest::builder()
            .client_id(self.config.client_id.as_str())
            .client_secret(self.config.client_secret.as_str());
        let builder = match target {
            RevocationTarget::Token(token) => builder.token(token),
            RevocationTarget::Sub(sub) => builder.sub(sub),
        };
        match request_pii_erasure {
            Some(erase) => builder.request_pii_erasure(erase).build(),
            None => builder.build(),
        }
    }

    /// Parses the invite returned by create, cancel and get.
    pub fn parse_smart_invite(&self, response: HttpResponse) -> Result<SmartInvite> {
        check_status(&response)?;
        mapping::smart_invite_from_str(&response.body)
    }

    pub fn parse_revoke(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)?;
        Ok(())
    }

    fn send(&self, transport: &impl Transport, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = transport.execute(request)?;
        tracing::debug!(status = response.status, "received response");
        Ok(response)
    }

    /// Creates or updates an invite, single- or multi-recipient alike.
    pub fn create_invite(
        &self,
        transport: &impl Transport,
        request: &SmartInviteRequest,
    ) -> Result<SmartInvite> {
        let http_request = self.build_create_invite(request)?;
        self.parse_smart_invite(self.send(transport, http_request)?)
    }

    pub fn cancel_invite(
        &self,
        transport: &impl Transport,
        smart_invite_id: &str,
        recipient_email: &str,
    ) -> Result<SmartInvite> {
        let http_request = self.build_cancel_invite(smart_invite_id, recipient_email)?;
        self.parse_smart_invite(self.send(transport, http_request)?)
    }

    pub fn cancel_invite_for_recipients(
        &self,
        transport: &impl Transport,
        smart_invite_id: &str,
        recipient_emails: &[&str],
    ) -> Result<SmartInvite> {
        let http_request =
            self.build_cancel_invite_for_recipients(smart_invite_id, recipient_emails)?;
        self.parse_smart_invite(self.send(transport, http_request)?)
    }

    pub fn get_smart_invite(
        &self,
        transport: &impl Transport,
        smart_invite_id: &str,
        recipient_email: Option<&str>,
    ) -> Result<SmartInvite> {
        let http_request = self.build_get_smart_invite(smart_invite_id, recipient_email)?;
        self.parse_smart_invite(self.send(transport, http_request)?)
    }

    pub fn revoke(
        &self,
        transport: &impl Transport,
        request: &TokenRevocationRequest,
    ) -> Result<()> {
        let http_request = self.build_revoke(request)?;
        self.parse_revoke(self.send(transport, http_request)?)
    }

    /// Revokes a single access or refresh token.
    pub fn revoke_token(&self, transport: &impl Transport, token: &str) -> Result<()> {
        let request = self.revocation(RevocationTarget::Token(token.to_string()), None)?;
        self.revoke(transport, &request)
    }

    /// Revokes every token of the account or profile identified by `sub`.
    pub fn revoke_sub(
        &self,
        transport: &impl Transport,
        sub: &str,
        request_pii_erasure: Option<bool>,
    ) -> Result<()> {
        let request = self.revocation(RevocationTarget::Sub(sub.to_string()), request_pii_erasure)?;
        self.revoke(transport, &request)
    }
}

/// Map non-2xx status codes to `Error::Api`.
fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    tracing::warn!(status = response.status, "request rejected");
    Err(Error::Api {
        status: response.status,
        body: response.body.clone(),
    })
}
