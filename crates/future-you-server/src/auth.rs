use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use future_you_core::route::{Route, RouteAccess};

use crate::state::{AppState, SharedClient};

pub const SESSION_COOKIE: &str = "future_you_session";

/// The signed-in client for the current request, inserted by [`session_middleware`].
#[derive(Clone)]
pub struct ClientHandle {
    pub token: String,
    pub client: SharedClient,
}

/// Session token from the `future_you_session` cookie, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get("cookie").and_then(|v| v.to_str().ok())?;
    cookies.split(';').find_map(|part| {
        part.trim()
            .strip_prefix(SESSION_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/")
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// Gate every route behind it on a valid session cookie.
///
/// Auth flow:
/// 1. Cookie token resolves to a client → attach [`ClientHandle`] and pass through
/// 2. `/api/*` → 401 JSON naming the login redirect
/// 3. Gated page route → 302 to `/login?from=<path>`
pub async fn session_middleware(
    State(app): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = session_token(req.headers()) {
        if let Some(client) = app.resolve(&token).await {
            req.extensions_mut().insert(ClientHandle { token, client });
            return next.run(req).await;
        }
    }

    let path = req.uri().path().to_string();
    if path.starts_with("/api/") {
        tracing::debug!(%path, "rejecting unauthenticated api request");
        let body = serde_json::json!({
            "error": "not authenticated",
            "redirect": Route::Login.path(),
        });
        return Response::builder()
            .status(401)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("infallible: all header values are valid ASCII");
    }

    let location = match Route::from_path(&path).map(|r| r.guard(false)) {
        Some(access @ RouteAccess::RedirectToLogin { .. }) => access.location(),
        _ => None,
    }
    .unwrap_or_else(|| format!("{}?from={}", Route::Login.path(), path));
    Response::builder()
        .status(302)
        .header("Location", location)
        .body(Body::empty())
        .expect("infallible: all header values are valid ASCII")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use axum::{middleware, routing::get, Router};
    use future_you_core::config::Config;
    use future_you_core::identity::{IdentityPolicy, LocalIdentityProvider};
    use future_you_core::store::ProfileStore;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct Silent;

    #[async_trait::async_trait]
    impl future_you_core::completion::TextCompletion for Silent {
        async fn complete(
            &self,
            req: &future_you_core::completion::CompletionRequest,
        ) -> Result<String, future_you_core::completion::CompletionError> {
            Ok(req.empty_default.clone())
        }
    }

    fn app_state() -> AppState {
        AppState::with_parts(
            std::path::PathBuf::from("/tmp/unused"),
            Config::new(),
            Arc::new(LocalIdentityProvider::in_memory(IdentityPolicy::default())),
            Arc::new(ProfileStore::in_memory()),
            Arc::new(Silent),
        )
    }

    async fn ok_handler() -> &'static str {
        "ok"
    }

    fn test_app(state: AppState) -> Router {
        Router::new()
            .route("/letter", get(ok_handler))
            .route("/api/letter", get(ok_handler))
            .layer(middleware::from_fn_with_state(state, session_middleware))
    }

    #[test]
    fn session_token_parses_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("theme=dark; future_you_session=abc123; other=1"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));

        headers.insert("cookie", HeaderValue::from_static("future_you_session="));
        assert_eq!(session_token(&headers), None);

        headers.insert("cookie", HeaderValue::from_static("future_you_session_old=x"));
        assert_eq!(session_token(&headers), None);
    }

    #[tokio::test]
    async fn page_without_session_redirects_to_login() {
        let resp = test_app(app_state())
            .oneshot(Request::builder().uri("/letter").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()["location"], "/login?from=/letter");
    }

    #[tokio::test]
    async fn api_without_session_is_401_json() {
        let resp = test_app(app_state())
            .oneshot(
                Request::builder()
                    .uri("/api/letter")
                    .header("cookie", "future_you_session=bogus")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers()["content-type"]
            .to_str()
            .unwrap()
            .contains("application/json"));
    }

    #[tokio::test]
    async fn valid_token_passes_and_restores_client() {
        let state = app_state();
        let session = state
            .identity
            .sign_up("asha@example.com", "secret1")
            .await
            .unwrap();
        let resp = test_app(state.clone())
            .oneshot(
                Request::builder()
                    .uri("/letter")
                    .header("cookie", format!("{SESSION_COOKIE}={}", session.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.client_count().await, 1);
    }
}
