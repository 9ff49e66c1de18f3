use axum::extract::{Extension, State};
use axum::http::{HeaderMap, Uri};
use axum::Json;
use future_you_core::route::Route;
use future_you_core::types::Language;

use crate::auth::{session_token, ClientHandle};
use crate::state::AppState;

/// GET /, /login, /signup — public; includes the workflow state when signed in.
pub async fn public_page(
    State(app): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let route = Route::from_path(uri.path()).unwrap_or(Route::Landing);
    let client = match session_token(&headers) {
        Some(token) => app.resolve(&token).await,
        None => None,
    };
    let state = match client {
        Some(c) => Some(c.lock().await.controller.snapshot()),
        None => None,
    };
    Json(serde_json::json!({
        "route": route.path(),
        "authenticated": state.is_some(),
        "state": state,
    }))
}

/// GET /setup, /generating, /letter, /reflection — behind the session middleware.
pub async fn gated_page(
    Extension(handle): Extension<ClientHandle>,
    uri: Uri,
) -> Json<serde_json::Value> {
    let client = handle.client.lock().await;
    Json(serde_json::json!({
        "route": uri.path(),
        "authenticated": true,
        "state": client.controller.snapshot(),
    }))
}

/// GET /api/languages
pub async fn list_languages() -> Json<serde_json::Value> {
    let list: Vec<serde_json::Value> = Language::all()
        .iter()
        .map(|l| {
            serde_json::json!({
                "code": l.code(),
                "label": l.label(),
                "nativeLabel": l.native_label(),
                "rtl": l.is_rtl(),
            })
        })
        .collect();
    Json(serde_json::json!(list))
}
