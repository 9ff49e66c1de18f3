use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::auth::{clear_session_cookie, session_cookie, session_token};
use crate::error::AppError;
use crate::state::{AppState, ClientSession};

#[derive(Debug, Deserialize)]
pub struct SignupBody {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub language: Option<String>,
}

fn signed_in(token: &str, client: &ClientSession) -> Response {
    let body = serde_json::json!({
        "session": client.gate.current_session(),
        "screen": client.controller.screen(),
        "state": client.controller.snapshot(),
        "loading": client.gate.loading(),
    });
    ([(SET_COOKIE, session_cookie(token))], Json(body)).into_response()
}

/// POST /api/auth/signup — create an account, its default profile and a client.
pub async fn signup(
    State(app): State<AppState>,
    Json(body): Json<SignupBody>,
) -> Result<Response, AppError> {
    let mut gate = app.gate();
    if let Some(lang) = &body.language {
        gate.set_language(lang.clone());
    }
    let out = gate.signup(&body.name, &body.email, &body.password).await?;

    let mut controller = app.controller(&gate).with_profile(out.profile);
    if let Some(lang) = &body.language {
        if let Err(e) = controller.change_language(lang).await {
            tracing::warn!(error = %e, "ignoring signup language");
        }
    }

    let client = ClientSession { gate, controller };
    let response = signed_in(&out.session.token, &client);
    app.insert_client(&out.session.token, client).await;
    tracing::info!(user_id = %out.session.user_id, "signed up");
    Ok(response)
}

/// POST /api/auth/login
pub async fn login(
    State(app): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Response, AppError> {
    let mut gate = app.gate();
    if let Some(lang) = &body.language {
        gate.set_language(lang.clone());
    }
    let session = gate.login(&body.email, &body.password).await?;

    let mut controller = app.controller(&gate);
    if let Err(e) = controller.load().await {
        tracing::warn!(error = %e, "loading workflow state after login failed");
    }
    gate.set_language(controller.language().to_string());

    let client = ClientSession { gate, controller };
    let response = signed_in(&session.token, &client);
    app.insert_client(&session.token, client).await;
    tracing::info!(user_id = %session.user_id, "signed in");
    Ok(response)
}

/// POST /api/auth/logout — always succeeds and clears the cookie.
pub async fn logout(State(app): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        match app.remove_client(&token).await {
            Some(client) => client.lock().await.gate.logout().await,
            None => {
                if let Err(e) = app.identity.sign_out(&token).await {
                    tracing::warn!(error = %e, "sign-out failed");
                }
            }
        }
    }
    let body = serde_json::json!({ "ok": true, "redirect": "/" });
    ([(SET_COOKIE, clear_session_cookie())], Json(body)).into_response()
}

/// GET /api/session — the current session, if the cookie resolves to one.
pub async fn get_session(State(app): State<AppState>, headers: HeaderMap) -> Json<serde_json::Value> {
    let client = match session_token(&headers) {
        Some(token) => app.resolve(&token).await,
        None => None,
    };
    let Some(client) = client else {
        return Json(serde_json::json!({ "authenticated": false, "session": null }));
    };
    let client = client.lock().await;
    Json(serde_json::json!({
        "authenticated": client.gate.is_authenticated(),
        "session": client.gate.current_session(),
        "screen": client.controller.screen(),
        "language": client.controller.language(),
    }))
}
