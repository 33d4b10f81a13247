use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use paste_vercel::config::{Config, StorageConfig};
use paste_vercel::server::{PasteState, paste_router};
use paste_vercel::service::PasteStorage;
use serde_json::{Value, json};
use tower::ServiceExt;

const PIN: &str = "2468";

async fn test_app() -> Router {
    let mut cfg = Config::default();
    cfg.basic.admin_pin = PIN.to_string();
    cfg.basic.insecure_cookie = true;
    cfg.limits.max_body_bytes = 4096;
    cfg.limits.pin_attempts_per_minute = 3;
    cfg.storage = StorageConfig {
        database_url: "sqlite::memory:".to_string(),
        ..StorageConfig::default()
    };

    let storage = PasteStorage::connect(&cfg.storage)
        .await
        .expect("failed to open storage");
    let state = PasteState::new(storage, &cfg).expect("failed to build state");
    paste_router(state)
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body was not json")
    }

    fn text(&self) -> &str {
        std::str::from_utf8(&self.body).expect("response body was not utf-8")
    }
}

async fn send(app: &Router, req: Request<Body>) -> Reply {
    let resp = app.clone().oneshot(req).await.expect("request failed");
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body")
        .to_vec();
    Reply {
        status,
        headers,
        body,
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {PIN}"))
        .body(Body::empty())
        .expect("failed to build request")
}

fn post_json(uri: &str, body: Value, pin: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(pin) = pin {
        builder = builder.header("x-admin-pin", pin);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

#[tokio::test]
async fn root_and_main_report_running() {
    let app = test_app().await;
    for uri in ["/", "/api/main"] {
        let reply = send(&app, get(uri)).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.text(), "Pastebin Rust API is Running on Vercel!");
    }
}

#[tokio::test]
async fn site_manifest_is_public() {
    let app = test_app().await;
    let reply = send(&app, get("/api/site")).await;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["head"]["title"], "Paste Vercel");
    assert_eq!(body["theme"]["colors"]["cyber"]["accent"], "#7000ff");
    assert_eq!(body["content"].as_array().map(Vec::len), Some(6));
    assert_eq!(body["modules"][0], "@nuxtjs/tailwindcss");
}

#[tokio::test]
async fn verify_accepts_right_pin_and_rejects_wrong() {
    let app = test_app().await;

    let ok = send(&app, post_json("/api/verify", json!({ "pin": PIN }), None)).await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.json(), json!({ "success": true }));
    let cookie = ok
        .headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("session cookie missing");
    assert!(cookie.starts_with("admin_session="));

    let bad = send(&app, post_json("/api/verify", json!({ "pin": "1111" }), None)).await;
    assert_eq!(bad.status, StatusCode::UNAUTHORIZED);
    let body = bad.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid PIN");
}

#[tokio::test]
async fn repeated_wrong_pins_lock_out_verification() {
    let app = test_app().await;
    for _ in 0..3 {
        let reply = send(&app, post_json("/api/verify", json!({ "pin": "0000" }), None)).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    }
    let locked = send(&app, post_json("/api/verify", json!({ "pin": "0000" }), None)).await;
    assert_eq!(locked.status, StatusCode::TOO_MANY_REQUESTS);

    let right = send(&app, post_json("/api/verify", json!({ "pin": PIN }), None)).await;
    assert_eq!(right.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn admin_routes_require_credentials() {
    let app = test_app().await;

    let anon = send(
        &app,
        post_json("/api/upload", json!({ "content": "hi" }), None),
    )
    .await;
    assert_eq!(anon.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anon.json()["code"], "UNAUTHORIZED");

    let wrong = send(
        &app,
        post_json("/api/upload", json!({ "content": "hi" }), Some("9999")),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let list = send(&app, get("/api/list")).await;
    assert_eq!(list.status, StatusCode::UNAUTHORIZED);

    let delete = send(&app, post_json("/api/delete", json!({ "id": "x" }), None)).await;
    assert_eq!(delete.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn upload_then_fetch_raw() {
    let app = test_app().await;

    let created = send(
        &app,
        post_json(
            "/api/upload",
            json!({ "content": "https://example.com/secret", "filename": " links " }),
            Some(PIN),
        ),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.json(), json!({ "id": "links", "success": true }));

    for uri in ["/raw/links", "/paste/links"] {
        let reply = send(&app, get(uri)).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.text(), "https://example.com/secret");
        let content_type = reply
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("text/plain"));
    }
}

#[tokio::test]
async fn upload_without_filename_generates_short_id() {
    let app = test_app().await;
    let created = send(
        &app,
        post_json("/api/upload", json!({ "content": "abc", "filename": "" }), Some(PIN)),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.json()["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 8);

    let reply = send(&app, get(&format!("/raw/{id}"))).await;
    assert_eq!(reply.text(), "abc");
}

#[tokio::test]
async fn upload_rejects_bad_filename() {
    let app = test_app().await;
    let reply = send(
        &app,
        post_json(
            "/api/upload",
            json!({ "content": "x", "filename": "../etc/passwd" }),
            Some(PIN),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["success"], false);
}

#[tokio::test]
async fn missing_paste_is_404() {
    let app = test_app().await;
    let reply = send(&app, get("/raw/does-not-exist")).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json()["error"], "Paste not found");
}

#[tokio::test]
async fn list_reports_ttls() {
    let app = test_app().await;
    send(
        &app,
        post_json("/api/upload", json!({ "content": "a", "filename": "forever", "ttl": 0 }), Some(PIN)),
    )
    .await;
    send(
        &app,
        post_json("/api/upload", json!({ "content": "b", "filename": "shortlived", "ttl": 120 }), Some(PIN)),
    )
    .await;

    let reply = send(&app, admin_get("/api/list")).await;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["success"], true);
    let files = body["files"].as_array().expect("files array");
    assert_eq!(files.len(), 2);

    assert_eq!(files[0]["id"], "forever");
    assert_eq!(files[0]["key"], "forever");
    assert_eq!(files[0]["ttl"], -1);

    assert_eq!(files[1]["id"], "shortlived");
    let ttl = files[1]["ttl"].as_i64().unwrap();
    assert!(ttl > 0 && ttl <= 120, "unexpected ttl {ttl}");
}

#[tokio::test]
async fn update_overwrites_content() {
    let app = test_app().await;
    send(
        &app,
        post_json("/api/upload", json!({ "content": "v1", "filename": "doc" }), Some(PIN)),
    )
    .await;

    let updated = send(
        &app,
        post_json("/api/update", json!({ "id": "doc", "content": "v2" }), Some(PIN)),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json(), json!({ "success": true, "id": "doc" }));

    let reply = send(&app, get("/raw/doc")).await;
    assert_eq!(reply.text(), "v2");
}

#[tokio::test]
async fn delete_removes_paste() {
    let app = test_app().await;
    send(
        &app,
        post_json("/api/upload", json!({ "content": "bye", "filename": "gone" }), Some(PIN)),
    )
    .await;

    let deleted = send(&app, post_json("/api/delete", json!({ "id": "gone" }), Some(PIN))).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json()["success"], true);
    assert_eq!(deleted.json()["deleted"], true);

    let reply = send(&app, get("/raw/gone")).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let again = send(&app, post_json("/api/delete", json!({ "id": "gone" }), Some(PIN))).await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.json()["deleted"], false);
}

#[tokio::test]
async fn session_cookie_authorizes_admin_routes() {
    let app = test_app().await;
    let verified = send(&app, post_json("/api/verify", json!({ "pin": PIN }), None)).await;
    let set_cookie = verified
        .headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("session cookie missing");
    let cookie_pair = set_cookie.split(';').next().unwrap().to_string();

    let req = Request::builder()
        .uri("/api/list")
        .header(header::COOKIE, cookie_pair.clone())
        .body(Body::empty())
        .unwrap();
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::OK);

    let forged = Request::builder()
        .uri("/api/list")
        .header(header::COOKIE, "admin_session=1700000000")
        .body(Body::empty())
        .unwrap();
    let reply = send(&app, forged).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_session_cookie() {
    let app = test_app().await;
    let verified = send(&app, post_json("/api/verify", json!({ "pin": PIN }), None)).await;
    let cookie_pair = verified
        .headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("session cookie missing")
        .to_string();
    let list_with_cookie = |cookie: String| {
        Request::builder()
            .uri("/api/list")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    };

    let before = send(&app, list_with_cookie(cookie_pair.clone())).await;
    assert_eq!(before.status, StatusCode::OK);

    let logout = Request::builder()
        .method("POST")
        .uri("/api/logout")
        .header(header::COOKIE, cookie_pair.clone())
        .body(Body::empty())
        .unwrap();
    let reply = send(&app, logout).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({ "success": true }));

    // a client that ignores the clearing Set-Cookie still loses access
    let after = send(&app, list_with_cookie(cookie_pair)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);

    let fresh = send(&app, post_json("/api/verify", json!({ "pin": PIN }), None)).await;
    let fresh_pair = fresh
        .headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("session cookie missing")
        .to_string();
    let again = send(&app, list_with_cookie(fresh_pair)).await;
    assert_eq!(again.status, StatusCode::OK);
}

#[tokio::test]
async fn oversized_body_returns_413() {
    let app = test_app().await;
    let big = "a".repeat(8 * 1024);
    let reply = send(
        &app,
        post_json("/api/upload", json!({ "content": big }), Some(PIN)),
    )
    .await;
    assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);
    let body = reply.json();
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(body["error"], "Request body too large");
}

#[tokio::test]
async fn malformed_json_returns_400() {
    let app = test_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/api/verify")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"pin\":"))
        .unwrap();
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["code"], "BAD_REQUEST");
}
