use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use future_you_core::auth::{AuthErrorKind, AuthFailure};
use future_you_core::error::FutureYouError;

// ---------------------------------------------------------------------------
// Internal sentinel for explicit 400 Bad Request errors
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 400 through the `anyhow::Error` chain for input
/// problems that have no `FutureYouError` variant (e.g. a missing field).
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }
}

fn auth_status(kind: AuthErrorKind) -> StatusCode {
    match kind {
        AuthErrorKind::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthErrorKind::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
        AuthErrorKind::Network => StatusCode::SERVICE_UNAVAILABLE,
        AuthErrorKind::EmailInUse => StatusCode::CONFLICT,
        AuthErrorKind::WeakPassword => StatusCode::UNPROCESSABLE_ENTITY,
        AuthErrorKind::Unknown => StatusCode::BAD_REQUEST,
    }
}

fn core_status(e: &FutureYouError) -> StatusCode {
    match e {
        FutureYouError::NotInitialized => StatusCode::BAD_REQUEST,
        FutureYouError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        FutureYouError::InvalidTimeHorizon(_)
        | FutureYouError::InvalidEmotionalFocus(_)
        | FutureYouError::UnsupportedLanguage(_)
        | FutureYouError::EmptyDescription
        | FutureYouError::EmptyReflection => StatusCode::BAD_REQUEST,
        FutureYouError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        FutureYouError::Storage(_)
        | FutureYouError::Io(_)
        | FutureYouError::Yaml(_)
        | FutureYouError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(b) = self.0.downcast_ref::<BadRequestError>() {
            let body = serde_json::json!({ "error": b.0.clone() });
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }
        // Auth failures keep the form usable: the client gets the localised
        // message, the kind and an explicit loading=false.
        if let Some(f) = self.0.downcast_ref::<AuthFailure>() {
            let body = serde_json::json!({
                "error": f.message,
                "kind": f.kind,
                "loading": false,
            });
            return (auth_status(f.kind), axum::Json(body)).into_response();
        }

        let status = match self.0.downcast_ref::<FutureYouError>() {
            Some(e) => core_status(e),
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn not_authenticated_maps_to_401() {
        let err = AppError(FutureYouError::NotAuthenticated.into());
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn validation_errors_map_to_400() {
        for e in [
            FutureYouError::EmptyReflection,
            FutureYouError::EmptyDescription,
            FutureYouError::InvalidTimeHorizon("10 years".into()),
            FutureYouError::UnsupportedLanguage("xx".into()),
        ] {
            assert_eq!(AppError(e.into()).into_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn invalid_transition_maps_to_422() {
        let err = AppError(
            FutureYouError::InvalidTransition {
                from: "landing".into(),
                to: "reflection/saved".into(),
                reason: "no active reflection prompt".into(),
            }
            .into(),
        );
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn io_error_maps_to_500() {
        let err = AppError(FutureYouError::Io(std::io::Error::other("disk full")).into());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn foreign_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_request_constructor_maps_to_400() {
        assert_eq!(
            AppError::bad_request("missing field").into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn auth_failure_body_carries_kind_and_loading_false() {
        let failure = AuthFailure {
            kind: AuthErrorKind::TooManyAttempts,
            message: AuthErrorKind::TooManyAttempts.message("en").to_string(),
        };
        let response = AppError(failure.into()).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["kind"], "too_many_attempts");
        assert_eq!(json["loading"], false);
        assert_eq!(json["error"], "Too many attempts. Please try again later.");
    }

    #[test]
    fn each_auth_kind_has_a_status() {
        assert_eq!(auth_status(AuthErrorKind::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(auth_status(AuthErrorKind::EmailInUse), StatusCode::CONFLICT);
        assert_eq!(auth_status(AuthErrorKind::WeakPassword), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(auth_status(AuthErrorKind::Network), StatusCode::SERVICE_UNAVAILABLE);
    }
}
