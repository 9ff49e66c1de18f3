pub mod auth;
pub mod completion;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post, put};
use axum::{middleware, Router};
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = Router::new()
        // Workflow
        .route("/api/start", post(routes::workflow::start))
        .route(
            "/api/setup/time-horizon",
            post(routes::workflow::choose_time_horizon),
        )
        .route(
            "/api/setup/description",
            post(routes::workflow::describe_future),
        )
        .route(
            "/api/setup/focus",
            post(routes::workflow::choose_emotional_focus),
        )
        .route("/api/setup", post(routes::workflow::complete_setup))
        .route("/api/generate", post(routes::workflow::generate))
        .route("/api/letter", get(routes::workflow::get_letter))
        .route(
            "/api/letter/continue",
            post(routes::workflow::continue_to_reflection),
        )
        .route("/api/reflection", post(routes::workflow::save_reflection))
        .route("/api/reflections", get(routes::workflow::list_reflections))
        .route(
            "/api/reflection/reply",
            post(routes::workflow::respond_to_reflection),
        )
        .route("/api/language", put(routes::workflow::change_language))
        .route("/api/landing", post(routes::workflow::return_to_landing))
        // Gated pages
        .route("/setup", get(routes::pages::gated_page))
        .route("/generating", get(routes::pages::gated_page))
        .route("/letter", get(routes::pages::gated_page))
        .route("/reflection", get(routes::pages::gated_page))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::session_middleware,
        ));

    Router::new()
        // Auth
        .route("/api/auth/signup", post(routes::auth::signup))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/session", get(routes::auth::get_session))
        .route("/api/languages", get(routes::pages::list_languages))
        // Public pages
        .route("/", get(routes::pages::public_page))
        .route("/login", get(routes::pages::public_page))
        .route("/signup", get(routes::pages::public_page))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the future-you server.
pub async fn serve(root: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener, open_browser).await
}

/// Start the server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(AppState::new(root)?);

    tracing::info!("future-you server listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
