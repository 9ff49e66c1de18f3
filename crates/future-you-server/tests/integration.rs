use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode};
use future_you_core::completion::{CompletionError, CompletionRequest, TextCompletion};
use future_you_core::config::Config;
use future_you_core::identity::{IdentityPolicy, LocalIdentityProvider};
use future_you_core::store::ProfileStore;
use future_you_server::{build_router, AppState};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Letters carry a temperature, daily prompts do not.
struct Scripted;

#[async_trait]
impl TextCompletion for Scripted {
    async fn complete(&self, req: &CompletionRequest) -> Result<String, CompletionError> {
        if req.user_text.contains("letter to help me") {
            Ok("Dear Asha, you are already on your way.".into())
        } else if req.temperature.is_none() {
            Ok("What would feel gentle today?".into())
        } else {
            Ok("I hear you. Keep going.".into())
        }
    }
}

struct Down;

#[async_trait]
impl TextCompletion for Down {
    async fn complete(&self, _: &CompletionRequest) -> Result<String, CompletionError> {
        Err(CompletionError::Provider("503".into()))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_state(completion: Arc<dyn TextCompletion>) -> AppState {
    AppState::with_parts(
        std::path::PathBuf::from("/tmp/future-you-test"),
        Config::new(),
        Arc::new(LocalIdentityProvider::in_memory(IdentityPolicy::default())),
        Arc::new(ProfileStore::in_memory()),
        completion,
    )
}

/// Send a request via `oneshot` and return (status, headers, parsed JSON body).
async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, HeaderMap, serde_json::Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if let Some(c) = cookie {
        builder = builder.header("cookie", c);
    }
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(serde_json::to_vec(&b).unwrap()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, headers, json)
}

/// `name=value` from the Set-Cookie header.
fn cookie_from(headers: &HeaderMap) -> String {
    headers["set-cookie"]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn signup(app: &axum::Router, email: &str) -> String {
    let (status, headers, json) = send(
        app.clone(),
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({ "name": "Asha", "email": email, "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    cookie_from(&headers)
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn signup_sets_cookie_and_returns_landing() {
    let app = build_router(test_state(Arc::new(Scripted)));
    let (status, headers, json) = send(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({ "name": "Asha", "email": "asha@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let set_cookie = headers["set-cookie"].to_str().unwrap();
    assert!(set_cookie.starts_with("future_you_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert_eq!(json["session"]["email"], "asha@example.com");
    assert!(json["session"].get("token").is_none());
    assert_eq!(json["screen"]["name"], "landing");
    assert_eq!(json["loading"], false);
    assert_eq!(json["state"]["profile"]["setupComplete"], false);
}

#[tokio::test]
async fn bad_login_returns_localised_error() {
    let app = build_router(test_state(Arc::new(Scripted)));
    signup(&app, "asha@example.com").await;

    let (status, _, json) = send(
        app.clone(),
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": "asha@example.com", "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid email or password");
    assert_eq!(json["kind"], "invalid_credentials");
    assert_eq!(json["loading"], false);

    let (_, _, json) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": "asha@example.com", "password": "wrong", "language": "ta" })),
    )
    .await;
    assert_eq!(json["error"], "தவறான மின்னஞ்சல் அல்லது கடவுச்சொல்");
}

#[tokio::test]
async fn duplicate_signup_is_conflict() {
    let app = build_router(test_state(Arc::new(Scripted)));
    signup(&app, "asha@example.com").await;
    let (status, _, json) = send(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({ "name": "A", "email": "asha@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["kind"], "email_in_use");
}

#[tokio::test]
async fn logout_invalidates_cookie() {
    let app = build_router(test_state(Arc::new(Scripted)));
    let cookie = signup(&app, "asha@example.com").await;

    let (status, headers, _) = send(app.clone(), "POST", "/api/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers["set-cookie"].to_str().unwrap().contains("Max-Age=0"));

    let (status, _, _) = send(app.clone(), "POST", "/api/start", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, _, json) = send(app, "GET", "/api/session", Some(&cookie), None).await;
    assert_eq!(json["authenticated"], false);
}

// ---------------------------------------------------------------------------
// Route guard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn gated_pages_redirect_without_session() {
    let app = build_router(test_state(Arc::new(Scripted)));
    for path in ["/setup", "/generating", "/letter", "/reflection"] {
        let (status, headers, _) = send(app.clone(), "GET", path, None, None).await;
        assert_eq!(status, StatusCode::FOUND, "{path}");
        assert_eq!(headers["location"], format!("/login?from={path}"));
    }
}

#[tokio::test]
async fn public_pages_never_redirect() {
    let app = build_router(test_state(Arc::new(Scripted)));
    for path in ["/", "/login", "/signup"] {
        let (status, _, json) = send(app.clone(), "GET", path, None, None).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert_eq!(json["authenticated"], false);
    }
}

#[tokio::test]
async fn protected_api_without_session_is_401() {
    let app = build_router(test_state(Arc::new(Scripted)));
    let (status, _, json) = send(
        app,
        "POST",
        "/api/setup",
        None,
        Some(serde_json::json!({
            "futureDescription": "x", "timeHorizon": "1 year", "emotionalFocus": "Calm"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["redirect"], "/login");
}

#[tokio::test]
async fn languages_are_public() {
    let app = build_router(test_state(Arc::new(Scripted)));
    let (status, _, json) = send(app, "GET", "/api/languages", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let list = json.as_array().unwrap();
    assert_eq!(list.len(), 12);
    assert!(list.iter().any(|l| l["code"] == "ar" && l["rtl"] == true));
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_journey_through_setup_letter_and_reflection() {
    let app = build_router(test_state(Arc::new(Scripted)));
    let cookie = signup(&app, "asha@example.com").await;
    let c = Some(cookie.as_str());

    let (_, _, json) = send(app.clone(), "POST", "/api/start", c, None).await;
    assert_eq!(json["screen"]["name"], "setup");
    assert_eq!(json["screen"]["step"], "time_horizon");

    let (_, _, json) = send(
        app.clone(),
        "POST",
        "/api/setup/time-horizon",
        c,
        Some(serde_json::json!({ "timeHorizon": "1 year" })),
    )
    .await;
    assert_eq!(json["screen"]["step"], "description");

    let (_, _, json) = send(
        app.clone(),
        "POST",
        "/api/setup/description",
        c,
        Some(serde_json::json!({ "futureDescription": "unhurried and kind" })),
    )
    .await;
    assert_eq!(json["screen"]["step"], "emotional_focus");

    let (status, _, json) = send(
        app.clone(),
        "POST",
        "/api/setup/focus",
        c,
        Some(serde_json::json!({ "emotionalFocus": "Courage" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["screen"]["name"], "letter");
    assert_eq!(json["route"], "/letter");
    assert_eq!(json["letter"], "Dear Asha, you are already on your way.");
    assert_eq!(json["profile"]["setupComplete"], true);

    let (_, _, json) = send(app.clone(), "GET", "/api/letter", c, None).await;
    assert_eq!(json["dailyPrompt"], "What would feel gentle today?");

    let (_, _, json) = send(app.clone(), "POST", "/api/letter/continue", c, None).await;
    assert_eq!(json["screen"]["name"], "reflection");
    assert_eq!(json["screen"]["step"], "unanswered");

    let (status, _, _) = send(
        app.clone(),
        "POST",
        "/api/reflection",
        c,
        Some(serde_json::json!({ "response": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, json) = send(
        app.clone(),
        "POST",
        "/api/reflection",
        c,
        Some(serde_json::json!({ "response": "Walking helped." })),
    )
    .await;
    assert_eq!(json["screen"]["step"], "saved");
    assert_eq!(json["lastEntry"]["prompt"], "What would feel gentle today?");

    let (_, _, json) = send(app.clone(), "POST", "/api/reflection/reply", c, None).await;
    assert_eq!(json["responseLetter"], "I hear you. Keep going.");

    let (_, _, json) = send(app.clone(), "GET", "/api/reflections", c, None).await;
    assert_eq!(json["reflections"].as_array().unwrap().len(), 1);

    let (_, _, json) = send(app.clone(), "POST", "/api/landing", c, None).await;
    assert_eq!(json["screen"]["name"], "landing");

    let (status, _, _) = send(app.clone(), "POST", "/api/letter/continue", c, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _, json) = send(app, "GET", "/letter", c, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["authenticated"], true);
}

#[tokio::test]
async fn provider_outage_serves_fallbacks() {
    let app = build_router(test_state(Arc::new(Down)));
    let cookie = signup(&app, "asha@example.com").await;
    let c = Some(cookie.as_str());

    let (_, _, json) = send(
        app.clone(),
        "PUT",
        "/api/language",
        c,
        Some(serde_json::json!({ "language": "ta" })),
    )
    .await;
    assert_eq!(json["language"], "ta");

    let (status, _, json) = send(
        app,
        "POST",
        "/api/setup",
        c,
        Some(serde_json::json!({
            "futureDescription": "calm", "timeHorizon": "5 years", "emotionalFocus": "calm"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["letter"], "நான் இங்கே இருக்கிறேன்.");
    assert_eq!(json["dailyPrompt"], "உங்களை நீங்களே எப்படி கவனித்துக் கொள்வீர்கள்?");
}

#[tokio::test]
async fn invalid_setup_input_is_rejected() {
    let app = build_router(test_state(Arc::new(Scripted)));
    let cookie = signup(&app, "asha@example.com").await;
    let (status, _, json) = send(
        app.clone(),
        "POST",
        "/api/setup",
        Some(&cookie),
        Some(serde_json::json!({
            "futureDescription": "x", "timeHorizon": "10 years", "emotionalFocus": "Calm"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("10 years"));

    let (status, _, _) = send(
        app,
        "POST",
        "/api/setup",
        Some(&cookie),
        Some(serde_json::json!({
            "futureDescription": "x", "timeHorizon": "1 year", "emotionalFocus": "Joy"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn saving_before_reflection_screen_is_422() {
    let app = build_router(test_state(Arc::new(Scripted)));
    let cookie = signup(&app, "asha@example.com").await;
    let (status, _, _) = send(
        app,
        "POST",
        "/api/reflection",
        Some(&cookie),
        Some(serde_json::json!({ "response": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn login_restores_set_up_profile() {
    let app = build_router(test_state(Arc::new(Scripted)));
    let cookie = signup(&app, "asha@example.com").await;
    send(
        app.clone(),
        "POST",
        "/api/setup",
        Some(&cookie),
        Some(serde_json::json!({
            "futureDescription": "steady", "timeHorizon": "6 months", "emotionalFocus": "Strength"
        })),
    )
    .await;
    send(app.clone(), "POST", "/api/auth/logout", Some(&cookie), None).await;

    let (status, headers, _) = send(
        app.clone(),
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": "asha@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let cookie = cookie_from(&headers);

    let (_, _, json) = send(app, "POST", "/api/start", Some(&cookie), None).await;
    assert_eq!(json["screen"]["name"], "letter");
    assert_eq!(json["profile"]["timeHorizon"], "6 months");
}

#[tokio::test]
async fn file_backed_state_survives_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let app = build_router(AppState::new(dir.path().to_path_buf()).unwrap());
    signup(&app, "asha@example.com").await;
    assert!(dir.path().join(".future-you/accounts.yaml").exists());

    let app = build_router(AppState::new(dir.path().to_path_buf()).unwrap());
    let (status, _, json) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": "asha@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"]["profile"]["displayName"], "Asha");
}
