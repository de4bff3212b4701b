use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use intus_api::responder::{MockResponder, SAFETY_FLAG};
use intus_api::state::AppStateInner;
use intus_db::Database;

fn app() -> Router {
    let state = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        jwt_secret: "test-secret-with-enough-entropy".into(),
        token_ttl: chrono::Duration::days(1),
        responder: Box::new(MockResponder),
        reply_delay: Duration::ZERO,
    });
    intus_api::router(state)
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Register and log in, returning the bearer token.
async fn sign_up(app: &Router, email: &str) -> String {
    let (status, _) = call(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "name": "Ana", "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn register_validates_input() {
    let app = app();

    let (status, body) = call(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "not-an-email", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email");

    let (status, body) = call(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "ana@example.com", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must be at least 8 characters");
}

#[tokio::test]
async fn duplicate_email_conflicts_regardless_of_case() {
    let app = app();
    sign_up(&app, "ana@example.com").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "  ANA@Example.com ", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already in use");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = app();
    sign_up(&app, "ana@example.com").await;

    let (wrong_password, a) = call(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ana@example.com", "password": "wrong-password" })),
    )
    .await;
    let (unknown_email, b) = call(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "password123" })),
    )
    .await;

    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email, StatusCode::UNAUTHORIZED);
    assert_eq!(a, b);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = app();

    let (status, body) = call(&app, Method::GET, "/journal", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = call(&app, Method::GET, "/journal", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_reports_the_caller() {
    let app = app();
    let token = sign_up(&app, "ana@example.com").await;

    let (status, body) = call(&app, Method::GET, "/auth/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ana@example.com");
    assert_eq!(body["name"], "Ana");
}

#[tokio::test]
async fn check_in_levels_and_mood_are_validated() {
    let app = app();
    let token = sign_up(&app, "ana@example.com").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/checkins",
        Some(&token),
        Some(json!({ "mood": "calm", "stressLevel": 11, "energyLevel": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "stressLevel must be 0-10");

    let (status, body) = call(
        &app,
        Method::POST,
        "/checkins",
        Some(&token),
        Some(json!({ "mood": "ecstatic", "stressLevel": 1, "energyLevel": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid mood");

    let (status, body) = call(
        &app,
        Method::POST,
        "/checkins",
        Some(&token),
        Some(json!({ "mood": "calm", "stressLevel": 0, "energyLevel": 10, "note": "  fine  " })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["note"], "fine");

    let (status, body) = call(&app, Method::GET, "/checkins?days=7", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn other_users_rows_read_as_not_found() {
    let app = app();
    let ana = sign_up(&app, "ana@example.com").await;
    let bea = sign_up(&app, "bea@example.com").await;

    let (status, entry) = call(
        &app,
        Method::POST,
        "/journal",
        Some(&ana),
        Some(json!({ "title": "Hoy", "content": "Un buen dia", "mood": "ok", "tags": ["cole"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/journal/{}", entry["id"].as_str().unwrap());

    let (status, _) = call(&app, Method::GET, &uri, Some(&bea), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::PATCH, &uri, Some(&bea), Some(json!({ "title": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::DELETE, &uri, Some(&bea), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, Method::GET, &uri, Some(&ana), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Hoy");

    let (status, _) = call(&app, Method::GET, "/journal/not-a-uuid", Some(&ana), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn journal_take_is_capped() {
    let app = app();
    let token = sign_up(&app, "ana@example.com").await;

    for i in 0..105 {
        let (status, _) = call(
            &app,
            Method::POST,
            "/journal",
            Some(&token),
            Some(json!({ "title": format!("Entrada {i}"), "content": "texto", "mood": "calm" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = call(&app, Method::GET, "/journal?take=9999", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 100);

    let (_, body) = call(&app, Method::GET, "/journal", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 50);
}

#[tokio::test]
async fn journal_search_and_tag_filter() {
    let app = app();
    let token = sign_up(&app, "ana@example.com").await;

    for (title, tags) in [("Examen", json!(["cole"])), ("Trabajo", json!(["oficina"]))] {
        call(
            &app,
            Method::POST,
            "/journal",
            Some(&token),
            Some(json!({ "title": title, "content": "100% agotada", "mood": "stressed", "tags": tags })),
        )
        .await;
    }

    let (_, body) = call(&app, Method::GET, "/journal?tag=cole", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Examen");

    let (_, body) = call(&app, Method::GET, "/journal?q=examen", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // `%` is matched literally.
    let (_, body) = call(&app, Method::GET, "/journal?q=100%25", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    let (_, body) = call(&app, Method::GET, "/journal?q=%25x", Some(&token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn chat_flags_safety_concerns() {
    let app = app();
    let token = sign_up(&app, "ana@example.com").await;

    let (status, conversation) = call(&app, Method::POST, "/chat/conversations", Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/chat/conversations/{}/messages", conversation["id"].as_str().unwrap());

    let (status, body) = call(
        &app,
        Method::POST,
        &uri,
        Some(&token),
        Some(json!({ "content": "Ya no puedo más" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["userMessage"]["role"], "user");
    assert_eq!(body["userMessage"]["safetyFlags"], json!([SAFETY_FLAG]));
    assert_eq!(body["reply"]["role"], "assistant");
    assert_eq!(body["reply"]["safetyFlags"], json!([SAFETY_FLAG]));

    let (status, body) = call(
        &app,
        Method::POST,
        &uri,
        Some(&token),
        Some(json!({ "content": "Hoy fue un dia normal" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["reply"]["safetyFlags"], json!([]));

    let detail_uri = format!("/chat/conversations/{}", conversation["id"].as_str().unwrap());
    let (status, detail) = call(&app, Method::GET, &detail_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["messages"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn chat_rejects_empty_messages_and_foreign_conversations() {
    let app = app();
    let ana = sign_up(&app, "ana@example.com").await;
    let bea = sign_up(&app, "bea@example.com").await;

    let (_, conversation) = call(&app, Method::POST, "/chat/conversations", Some(&ana), None).await;
    let uri = format!("/chat/conversations/{}/messages", conversation["id"].as_str().unwrap());

    let (status, _) = call(&app, Method::POST, &uri, Some(&ana), Some(json!({ "content": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::POST, &uri, Some(&bea), Some(json!({ "content": "hola" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_is_public_and_filterable() {
    let app = app();

    let (status, body) = call(&app, Method::GET, "/tools", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 8);

    let (_, body) = call(&app, Method::GET, "/tools?type=breathing", None, None).await;
    assert!(body.as_array().unwrap().iter().all(|t| t["type"] == "breathing"));

    let (status, body) = call(&app, Method::GET, "/tools?type=yoga", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid type");

    let (status, _) = call(&app, Method::GET, "/scenarios/s1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, Method::GET, "/scenarios/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = call(&app, Method::GET, "/resources?type=emergency", None, None).await;
    assert!(!body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn purge_requires_confirmation() {
    let app = app();
    let token = sign_up(&app, "ana@example.com").await;

    let (status, body) = call(&app, Method::POST, "/user/purge", Some(&token), Some(json!({ "confirm": "borrar" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Confirmation required: confirm must be \"BORRAR\"");

    let (status, _) = call(&app, Method::GET, "/user/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn wipe_keeps_the_account_usable() {
    let app = app();
    let token = sign_up(&app, "ana@example.com").await;

    call(
        &app,
        Method::POST,
        "/journal",
        Some(&token),
        Some(json!({ "title": "Hoy", "content": "texto", "mood": "sad" })),
    )
    .await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/user/purge",
        Some(&token),
        Some(json!({ "confirm": "BORRAR", "wipeDataOnly": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "deletedUser": false }));

    let (_, body) = call(&app, Method::GET, "/journal", Some(&token), None).await;
    assert_eq!(body, json!([]));

    let (status, _) = call(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ana@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn full_purge_revokes_the_session() {
    let app = app();
    let token = sign_up(&app, "ana@example.com").await;

    let (status, body) = call(&app, Method::POST, "/user/purge", Some(&token), Some(json!({ "confirm": "BORRAR" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedUser"], true);

    let (status, _) = call(&app, Method::GET, "/user/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "ana@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_update_and_export() {
    let app = app();
    let ana = sign_up(&app, "ana@example.com").await;
    sign_up(&app, "bea@example.com").await;

    let (status, body) = call(&app, Method::PATCH, "/user/profile", Some(&ana), Some(json!({ "email": "BEA@example.com" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already in use");

    let (status, body) = call(&app, Method::PATCH, "/user/profile", Some(&ana), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Nothing to update");

    let (status, body) = call(&app, Method::PATCH, "/user/profile", Some(&ana), Some(json!({ "name": "Ana María" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ana María");

    call(
        &app,
        Method::POST,
        "/checkins",
        Some(&ana),
        Some(json!({ "mood": "ok", "stressLevel": 3, "energyLevel": 6 })),
    )
    .await;
    call(&app, Method::POST, "/chat/conversations", Some(&ana), None).await;

    let (status, export) = call(&app, Method::GET, "/user/export", Some(&ana), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(export["profile"]["email"], "ana@example.com");
    assert_eq!(export["checkIns"].as_array().unwrap().len(), 1);
    assert_eq!(export["conversations"].as_array().unwrap().len(), 1);
    assert_eq!(export["journal"], json!([]));
}

#[tokio::test]
async fn journal_rejects_unknown_moods() {
    let app = app();
    let token = sign_up(&app, "ana@example.com").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/journal",
        Some(&token),
        Some(json!({ "title": "Hoy", "content": "texto", "mood": "ecstatic" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid mood");

    let (_, entry) = call(
        &app,
        Method::POST,
        "/journal",
        Some(&token),
        Some(json!({ "title": "Hoy", "content": "texto", "mood": "calm" })),
    )
    .await;
    let uri = format!("/journal/{}", entry["id"].as_str().unwrap());
    let (status, body) = call(&app, Method::PATCH, &uri, Some(&token), Some(json!({ "mood": "meh" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid mood");
}

#[tokio::test]
async fn journal_tags_are_trimmed_and_deduplicated() {
    let app = app();
    let token = sign_up(&app, "ana@example.com").await;

    let (status, entry) = call(
        &app,
        Method::POST,
        "/journal",
        Some(&token),
        Some(json!({ "title": "Hoy", "content": "texto", "mood": "ok", "tags": ["a", "a", "  b  ", ""] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["tags"], json!(["a", "b"]));

    let uri = format!("/journal/{}", entry["id"].as_str().unwrap());
    let (_, stored) = call(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(stored["tags"], json!(["a", "b"]));

    let (_, updated) = call(&app, Method::PATCH, &uri, Some(&token), Some(json!({ "tags": [" c", "c ", "d"] }))).await;
    assert_eq!(updated["tags"], json!(["c", "d"]));
}

#[tokio::test]
async fn journal_search_folds_accented_capitals() {
    let app = app();
    let token = sign_up(&app, "ana@example.com").await;

    call(
        &app,
        Method::POST,
        "/journal",
        Some(&token),
        Some(json!({ "title": "ÁNIMO BAJO", "content": "Él no vino", "mood": "sad" })),
    )
    .await;

    for q in ["%C3%A1nimo", "%C3%A9l%20no", "bajo"] {
        let (status, body) = call(&app, Method::GET, &format!("/journal?q={q}"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1, "q={q}");
    }
}
