use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use chrono::{NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Credentials the mock accepts. Smart Invite calls must carry
/// `Bearer CLIENT_SECRET`; revocations must send both in the body.
pub const CLIENT_ID: &str = "mock-client-id";
pub const CLIENT_SECRET: &str = "mock-client-secret";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    pub email: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal: Option<Value>,
}

impl Reply {
    fn pending(email: String) -> Self {
        Self {
            email,
            status: "pending".to_string(),
            comment: None,
            proposal: None,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Recipients {
    Single { recipient: Reply, replies: Vec<Reply> },
    Multiple(Vec<Reply>),
}

#[derive(Clone, Debug)]
pub struct StoredInvite {
    pub smart_invite_id: String,
    pub callback_url: String,
    pub method: String,
    pub event: Value,
    pub recipients: Recipients,
}

#[derive(Deserialize)]
pub struct EmailOnly {
    pub email: String,
}

#[derive(Deserialize)]
pub struct InviteBody {
    pub method: Option<String>,
    pub smart_invite_id: Option<String>,
    pub callback_url: Option<String>,
    pub recipient: Option<EmailOnly>,
    pub recipients: Option<Vec<EmailOnly>>,
    pub event: Option<Value>,
    pub organizer: Option<Value>,
}

#[derive(Deserialize)]
pub struct RevokeBody {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token: Option<String>,
    pub sub: Option<String>,
    pub request_pii_erasure: Option<bool>,
}

pub type Db = Arc<RwLock<HashMap<String, StoredInvite>>>;

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/v1/smart_invites", post(upsert_invite).get(get_invite))
        .route("/v1/smart_invites/{id}/replies", post(record_reply))
        .route("/oauth/token/revoke", post(revoke))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn rejection(status: StatusCode, errors: Value) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "errors": errors })))
}

fn required(field: &str) -> Value {
    let mut errors = Map::new();
    errors.insert(
        field.to_string(),
        json!([{ "key": "errors.required", "description": "required" }]),
    );
    Value::Object(errors)
}

fn authorize(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let expected = format!("Bearer {CLIENT_SECRET}");
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" })))),
    }
}

/// Rewrites a `{time, tzid}` request time into the bare string the API
/// returns, reporting the zone alongside.
fn response_time(value: &Value) -> (Value, Option<String>) {
    let Some(obj) = value.as_object() else {
        return (value.clone(), None);
    };
    let time = obj.get("time").and_then(Value::as_str).unwrap_or_default();
    let tzid = obj.get("tzid").and_then(Value::as_str).map(str::to_string);
    let time = NaiveDateTime::parse_from_str(time, "%Y-%m-%d %H:%M:%SZ")
        .map(|naive| naive.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|_| time.to_string());
    (Value::String(time), tzid)
}

/// The event as the API echoes it back.
pub fn response_event(request: &Value) -> Value {
    let mut event = Map::new();
    for key in ["summary", "description", "location", "url", "transparency"] {
        if let Some(value) = request.get(key) {
            event.insert(key.to_string(), value.clone());
        }
    }
    let (start, tzid) = response_time(&request["start"]);
    let (end, _) = response_time(&request["end"]);
    event.insert("start".to_string(), start);
    event.insert("end".to_string(), end);
    if let Some(tzid) = tzid {
        event.insert("tzid".to_string(), Value::String(tzid));
    }
    Value::Object(event)
}

fn icalendar(invite: &StoredInvite) -> String {
    let method = if invite.method == "cancel" { "CANCEL" } else { "REQUEST" };
    let summary = invite.event["summary"].as_str().unwrap_or_default();
    format!(
        "BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:-//mock-server//EN\nMETHOD:{method}\n\
         BEGIN:VEVENT\nUID:{}\nSUMMARY:{summary}\nEND:VEVENT\nEND:VCALENDAR\n",
        invite.smart_invite_id
    )
}

pub fn invite_json(invite: &StoredInvite) -> Value {
    let mut body = Map::new();
    match &invite.recipients {
        Recipients::Single { recipient, replies } => {
            body.insert("recipient".to_string(), json!(recipient));
            if !replies.is_empty() {
                body.insert("replies".to_string(), json!(replies));
            }
        }
        Recipients::Multiple(recipients) => {
            body.insert("recipients".to_string(), json!(recipients));
        }
    }
    body.insert("method".to_string(), json!(invite.method));
    body.insert("smart_invite_id".to_string(), json!(invite.smart_invite_id));
    body.insert("callback_url".to_string(), json!(invite.callback_url));
    body.insert("event".to_string(), invite.event.clone());
    body.insert(
        "attachments".to_string(),
        json!({ "icalendar": icalendar(invite) }),
    );
    Value::Object(body)
}

fn validate(body: &InviteBody) -> Result<(), Value> {
    let mut errors = Map::new();
    let mut missing = |field: &str| {
        if let Value::Object(entry) = required(field) {
            errors.extend(entry);
        }
    };
    let method = body.method.as_deref().unwrap_or_default();
    if method.is_empty() {
        missing("method");
    }
    if body.smart_invite_id.as_deref().unwrap_or_default().is_empty() {
        missing("smart_invite_id");
    }
    match (&body.recipient, &body.recipients) {
        (Some(_), None) => {}
        (None, Some(list)) if !list.is_empty() => {}
        _ => missing("recipient"),
    }
    if method != "cancel" {
        if body.callback_url.as_deref().unwrap_or_default().is_empty() {
            missing("callback_url");
        }
        if body.event.is_none() {
            missing("event");
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Value::Object(errors))
    }
}

async fn upsert_invite(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(body): Json<InviteBody>,
) -> ApiResult {
    authorize(&headers)?;
    validate(&body).map_err(|errors| rejection(StatusCode::UNPROCESSABLE_ENTITY, errors))?;

    let id = body.smart_invite_id.unwrap_or_default();
    let method = body.method.unwrap_or_default();
    let mut invites = db.write().await;

    if method == "cancel" {
        let invite = invites
            .get_mut(&id)
            .ok_or_else(|| rejection(StatusCode::NOT_FOUND, json!({ "smart_invite_id": id })))?;
        invite.method = method;
        tracing::info!(smart_invite_id = %invite.smart_invite_id, "invite cancelled");
        return Ok(Json(invite_json(invite)));
    }

    let recipients = match (body.recipient, body.recipients) {
        (Some(recipient), _) => Recipients::Single {
            recipient: Reply::pending(recipient.email),
            replies: Vec::new(),
        },
        (None, list) => Recipients::Multiple(
            list.unwrap_or_default()
                .into_iter()
                .map(|r| Reply::pending(r.email))
                .collect(),
        ),
    };
    let event = body.event.as_ref().map(response_event).unwrap_or_default();
    let invite = StoredInvite {
        smart_invite_id: id.clone(),
        callback_url: body.callback_url.unwrap_or_default(),
        method,
        event,
        recipients,
    };
    tracing::info!(smart_invite_id = %id, organizer = ?body.organizer, "invite stored");
    let response = invite_json(&invite);
    invites.insert(id, invite);
    Ok(Json(response))
}

async fn get_invite(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    authorize(&headers)?;
    let id = params
        .get("smart_invite_id")
        .ok_or_else(|| rejection(StatusCode::UNPROCESSABLE_ENTITY, required("smart_invite_id")))?;

    let invites = db.read().await;
    let invite = invites
        .get(id)
        .ok_or_else(|| rejection(StatusCode::NOT_FOUND, json!({ "smart_invite_id": id })))?;

    if let Some(email) = params.get("recipient_email") {
        let known = match &invite.recipients {
            Recipients::Single { recipient, .. } => &recipient.email == email,
            Recipients::Multiple(recipients) => recipients.iter().any(|r| &r.email == email),
        };
        if !known {
            return Err(rejection(StatusCode::NOT_FOUND, json!({ "recipient_email": email })));
        }
    }
    Ok(Json(invite_json(invite)))
}

/// Test hook standing in for a recipient answering the invite.
async fn record_reply(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(reply): Json<Reply>,
) -> ApiResult {
    let mut invites = db.write().await;
    let invite = invites
        .get_mut(&id)
        .ok_or_else(|| rejection(StatusCode::NOT_FOUND, json!({ "smart_invite_id": id })))?;

    match &mut invite.recipients {
        Recipients::Single { recipient, replies } => {
            if recipient.email == reply.email {
                recipient.status = reply.status.clone();
            }
            replies.push(reply);
        }
        Recipients::Multiple(recipients) => {
            let entry = recipients
                .iter_mut()
                .find(|r| r.email == reply.email)
                .ok_or_else(|| {
                    rejection(StatusCode::NOT_FOUND, json!({ "recipient": reply.email }))
                })?;
            *entry = reply;
        }
    }
    Ok(Json(invite_json(invite)))
}

async fn revoke(Json(body): Json<RevokeBody>) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    let credentials_match = body.client_id.as_deref() == Some(CLIENT_ID)
        && body.client_secret.as_deref() == Some(CLIENT_SECRET);
    if !credentials_match {
        return Err((StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid_client" }))));
    }
    match (&body.token, &body.sub) {
        (Some(_), None) | (None, Some(_)) => {
            tracing::info!(
                by_sub = body.sub.is_some(),
                pii_erasure = body.request_pii_erasure.unwrap_or(false),
                "token revoked"
            );
            Ok(StatusCode::OK)
        }
        _ => Err((StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_request" })))),
    }
}
