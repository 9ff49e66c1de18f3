use axum::extract::{Extension, State};
use axum::Json;
use future_you_core::error::FutureYouError;
use future_you_core::types::EmotionalFocus;
use future_you_core::workflow::WorkflowSnapshot;
use serde::Deserialize;

use crate::auth::ClientHandle;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeHorizonBody {
    pub time_horizon: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionBody {
    pub future_description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusBody {
    pub emotional_focus: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupBody {
    pub future_description: String,
    pub time_horizon: String,
    pub emotional_focus: String,
}

#[derive(Debug, Deserialize)]
pub struct ReflectionBody {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct LanguageBody {
    pub language: String,
}

type Snapshot = Result<Json<WorkflowSnapshot>, AppError>;

/// POST /api/start — Landing's start action.
pub async fn start(Extension(h): Extension<ClientHandle>) -> Snapshot {
    let mut client = h.client.lock().await;
    client.controller.start().await?;
    Ok(Json(client.controller.snapshot()))
}

/// POST /api/setup/time-horizon
pub async fn choose_time_horizon(
    Extension(h): Extension<ClientHandle>,
    Json(body): Json<TimeHorizonBody>,
) -> Snapshot {
    let mut client = h.client.lock().await;
    client.controller.choose_time_horizon(&body.time_horizon)?;
    Ok(Json(client.controller.snapshot()))
}

/// POST /api/setup/description
pub async fn describe_future(
    Extension(h): Extension<ClientHandle>,
    Json(body): Json<DescriptionBody>,
) -> Snapshot {
    let mut client = h.client.lock().await;
    client.controller.describe_future(&body.future_description)?;
    Ok(Json(client.controller.snapshot()))
}

/// POST /api/setup/focus — final setup step; generation runs right after.
pub async fn choose_emotional_focus(
    Extension(h): Extension<ClientHandle>,
    Json(body): Json<FocusBody>,
) -> Snapshot {
    let focus: EmotionalFocus = body.emotional_focus.parse()?;
    let mut client = h.client.lock().await;
    client.controller.choose_emotional_focus(focus).await?;
    client.controller.generate().await?;
    Ok(Json(client.controller.snapshot()))
}

/// POST /api/setup — all three answers at once; generation runs right after.
pub async fn complete_setup(
    Extension(h): Extension<ClientHandle>,
    Json(body): Json<SetupBody>,
) -> Snapshot {
    let focus: EmotionalFocus = body.emotional_focus.parse()?;
    let mut client = h.client.lock().await;
    client
        .controller
        .complete_setup(&body.future_description, &body.time_horizon, focus)
        .await?;
    client.controller.generate().await?;
    Ok(Json(client.controller.snapshot()))
}

/// POST /api/generate — Generating's entry action.
pub async fn generate(Extension(h): Extension<ClientHandle>) -> Snapshot {
    let mut client = h.client.lock().await;
    client.controller.generate().await?;
    Ok(Json(client.controller.snapshot()))
}

/// GET /api/letter — the held letter and daily prompt.
pub async fn get_letter(Extension(h): Extension<ClientHandle>) -> Json<serde_json::Value> {
    let client = h.client.lock().await;
    let c = &client.controller;
    Json(serde_json::json!({
        "letter": c.letter(),
        "dailyPrompt": c.daily_prompt(),
        "screen": c.screen(),
    }))
}

/// POST /api/letter/continue
pub async fn continue_to_reflection(Extension(h): Extension<ClientHandle>) -> Snapshot {
    let mut client = h.client.lock().await;
    client.controller.continue_to_reflection()?;
    Ok(Json(client.controller.snapshot()))
}

/// POST /api/reflection — save a reflection against the active prompt.
pub async fn save_reflection(
    Extension(h): Extension<ClientHandle>,
    Json(body): Json<ReflectionBody>,
) -> Snapshot {
    let mut client = h.client.lock().await;
    client.controller.save_reflection(&body.response).await?;
    Ok(Json(client.controller.snapshot()))
}

/// GET /api/reflections — saved history, oldest first.
pub async fn list_reflections(
    State(app): State<AppState>,
    Extension(h): Extension<ClientHandle>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = h
        .client
        .lock()
        .await
        .gate
        .current_session()
        .ok_or(FutureYouError::NotAuthenticated)?;
    let reflections = app.store.list_reflections(&session.user_id).await?;
    Ok(Json(serde_json::json!({ "reflections": reflections })))
}

/// POST /api/reflection/reply — the future self's answer to the saved reflection.
pub async fn respond_to_reflection(Extension(h): Extension<ClientHandle>) -> Snapshot {
    let mut client = h.client.lock().await;
    client.controller.respond_to_reflection().await?;
    Ok(Json(client.controller.snapshot()))
}

/// PUT /api/language
pub async fn change_language(
    Extension(h): Extension<ClientHandle>,
    Json(body): Json<LanguageBody>,
) -> Snapshot {
    let mut client = h.client.lock().await;
    client.controller.change_language(&body.language).await?;
    let code = client.controller.language().to_string();
    client.gate.set_language(code);
    Ok(Json(client.controller.snapshot()))
}

/// POST /api/landing
pub async fn return_to_landing(Extension(h): Extension<ClientHandle>) -> Snapshot {
    let mut client = h.client.lock().await;
    client.controller.return_to_landing();
    Ok(Json(client.controller.snapshot()))
}
