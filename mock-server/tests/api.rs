use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, CLIENT_ID, CLIENT_SECRET};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn bearer() -> String {
    format!("Bearer {CLIENT_SECRET}")
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json; charset=utf-8")
        .header(http::header::AUTHORIZATION, bearer())
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, bearer())
        .body(String::new())
        .unwrap()
}

fn invite_body(recipients: Value) -> Value {
    let mut body = json!({
        "method": "request",
        "smart_invite_id": "testEventId",
        "callback_url": "http://example.com/callbackUrl",
        "event": {
            "summary": "Test Summary",
            "start": { "time": "2014-08-05 15:30:00Z", "tzid": "Etc/UTC" },
            "end": { "time": "2014-08-05 16:30:00Z", "tzid": "Etc/UTC" }
        },
        "organizer": { "name": "My Cool Application" }
    });
    for (key, value) in recipients.as_object().unwrap() {
        body[key] = value.clone();
    }
    body
}

async fn create(app: &Router, recipients: Value) -> Value {
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/v1/smart_invites", &invite_body(recipients)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

// --- create ---

#[tokio::test]
async fn create_single_recipient_invite() {
    let app = app();
    let invite = create(&app, json!({ "recipient": { "email": "example@example.com" } })).await;

    assert_eq!(invite["smart_invite_id"], "testEventId");
    assert_eq!(invite["recipient"], json!({ "email": "example@example.com", "status": "pending" }));
    assert!(invite.get("recipients").is_none());
    assert!(invite.get("replies").is_none());
    assert_eq!(invite["event"]["start"], "2014-08-05T15:30:00Z");
    assert_eq!(invite["event"]["tzid"], "Etc/UTC");
    assert!(invite["attachments"]["icalendar"]
        .as_str()
        .unwrap()
        .contains("METHOD:REQUEST\n"));
}

#[tokio::test]
async fn create_multi_recipient_invite() {
    let app = app();
    let invite = create(
        &app,
        json!({ "recipients": [{ "email": "a@example.com" }, { "email": "b@example.com" }] }),
    )
    .await;

    let recipients = invite["recipients"].as_array().unwrap();
    assert_eq!(recipients.len(), 2);
    assert_eq!(recipients[0]["email"], "a@example.com");
    assert_eq!(recipients[1]["email"], "b@example.com");
    assert!(invite.get("recipient").is_none());
}

#[tokio::test]
async fn create_without_bearer_returns_401() {
    let app = app();
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/smart_invites")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(invite_body(json!({ "recipient": { "email": "a@example.com" } })).to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_without_event_returns_422() {
    let app = app();
    let body = json!({
        "method": "request",
        "smart_invite_id": "testEventId",
        "callback_url": "http://example.com/callbackUrl",
        "recipient": { "email": "a@example.com" }
    });
    let resp = app
        .oneshot(json_request("POST", "/v1/smart_invites", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let errors = body_json(resp).await;
    assert!(errors["errors"].get("event").is_some());
}

// --- cancel ---

#[tokio::test]
async fn cancel_marks_invite_cancelled() {
    let app = app();
    create(&app, json!({ "recipient": { "email": "example@example.com" } })).await;

    let body = json!({
        "method": "cancel",
        "smart_invite_id": "testEventId",
        "recipient": { "email": "example@example.com" }
    });
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/v1/smart_invites", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let invite = body_json(resp).await;
    assert_eq!(invite["method"], "cancel");
    assert!(invite["attachments"]["icalendar"]
        .as_str()
        .unwrap()
        .contains("METHOD:CANCEL\n"));
}

#[tokio::test]
async fn cancel_unknown_invite_returns_404() {
    let app = app();
    let body = json!({
        "method": "cancel",
        "smart_invite_id": "nope",
        "recipient": { "email": "example@example.com" }
    });
    let resp = app
        .oneshot(json_request("POST", "/v1/smart_invites", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- get ---

#[tokio::test]
async fn get_invite_not_found() {
    let app = app();
    let resp = app
        .oneshot(get_request("/v1/smart_invites?smart_invite_id=missing"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_invite_filters_by_recipient() {
    let app = app();
    create(&app, json!({ "recipient": { "email": "example@example.com" } })).await;

    let resp = app
        .clone()
        .oneshot(get_request(
            "/v1/smart_invites?smart_invite_id=testEventId&recipient_email=example%40example.com",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(get_request(
            "/v1/smart_invites?smart_invite_id=testEventId&recipient_email=other%40example.com",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_invite_filters_multi_recipient_invites() {
    let app = app();
    create(
        &app,
        json!({ "recipients": [{ "email": "a@example.com" }, { "email": "b@example.com" }] }),
    )
    .await;

    let resp = app
        .clone()
        .oneshot(get_request(
            "/v1/smart_invites?smart_invite_id=testEventId&recipient_email=b%40example.com",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(get_request(
            "/v1/smart_invites?smart_invite_id=testEventId&recipient_email=c%40example.com",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- replies ---

#[tokio::test]
async fn reply_is_listed_on_single_recipient_invite() {
    let app = app();
    create(&app, json!({ "recipient": { "email": "example@example.com" } })).await;

    let reply = json!({
        "email": "example@example.com",
        "status": "declined",
        "comment": "example comment",
        "proposal": {
            "start": { "time": "2014-09-13T23:00:00+02:00", "tzid": "Europe/Paris" },
            "end": { "time": "2014-09-13T23:00:00+02:00", "tzid": "Europe/Paris" }
        }
    });
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/v1/smart_invites/testEventId/replies", &reply))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(get_request("/v1/smart_invites?smart_invite_id=testEventId"))
        .await
        .unwrap();
    let invite = body_json(resp).await;
    assert_eq!(invite["recipient"]["status"], "declined");
    assert_eq!(invite["replies"], json!([reply]));
}

#[tokio::test]
async fn reply_updates_multi_recipient_entry() {
    let app = app();
    create(
        &app,
        json!({ "recipients": [{ "email": "a@example.com" }, { "email": "b@example.com" }] }),
    )
    .await;

    let reply = json!({ "email": "b@example.com", "status": "accepted" });
    let resp = app
        .oneshot(json_request("POST", "/v1/smart_invites/testEventId/replies", &reply))
        .await
        .unwrap();
    let invite = body_json(resp).await;
    assert_eq!(invite["recipients"][0]["status"], "pending");
    assert_eq!(invite["recipients"][1]["status"], "accepted");
    assert!(invite.get("replies").is_none());
}

// --- revoke ---

#[tokio::test]
async fn revoke_token_returns_200_with_empty_body() {
    let app = app();
    let body = json!({ "client_id": CLIENT_ID, "client_secret": CLIENT_SECRET, "token": "t" });
    let resp = app
        .oneshot(json_request("POST", "/oauth/token/revoke", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn revoke_with_bad_credentials_returns_401() {
    let app = app();
    let body = json!({ "client_id": CLIENT_ID, "client_secret": "wrong", "sub": "acc_1" });
    let resp = app
        .oneshot(json_request("POST", "/oauth/token/revoke", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn revoke_with_token_and_sub_returns_400() {
    let app = app();
    let body = json!({
        "client_id": CLIENT_ID,
        "client_secret": CLIENT_SECRET,
        "token": "t",
        "sub": "acc_1"
    });
    let resp = app
        .oneshot(json_request("POST", "/oauth/token/revoke", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
