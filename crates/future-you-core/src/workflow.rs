//! The screen state machine for one signed-in client.
//!
//! [`WorkflowController`] owns the current [`Screen`], the loaded profile, the
//! setup draft and the generated content. It reads the session from an
//! explicit `watch` receiver handed in at construction, so every gated
//! transition sees the same session the [`AuthGate`](crate::auth::AuthGate)
//! published.
//!
//! Generation never fails from the caller's point of view: each of the two
//! requests falls back to localised text on error or timeout, independently.
//! Persistence failures are logged and swallowed.

use crate::completion::{complete_within, CompletionRequest, TextCompletion};
use crate::error::{FutureYouError, Result};
use crate::identity::Session;
use crate::messages::{fallback_letter, fallback_prompt, fallback_response_letter};
use crate::profile::{Profile, ProfilePatch};
use crate::prompt::{
    build_daily_prompt_request, build_letter_prompt, build_response_letter_prompt,
    DEFAULT_LETTER_TEMPERATURE,
};
use crate::reflection::ReflectionEntry;
use crate::route::Route;
use crate::store::ProfileStore;
use crate::types::{parse_time_horizon, EmotionalFocus, Language, DEFAULT_LANGUAGE};
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    Login,
    Signup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStep {
    TimeHorizon,
    Description,
    EmotionalFocus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionStatus {
    Unanswered,
    Saved,
}

/// Exactly one screen is active per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "name", content = "step", rename_all = "snake_case")]
pub enum Screen {
    Landing,
    Auth(AuthMode),
    Setup(SetupStep),
    Generating,
    Letter,
    Reflection(ReflectionStatus),
}

impl Screen {
    pub fn route(self) -> Route {
        match self {
            Screen::Landing => Route::Landing,
            Screen::Auth(AuthMode::Login) => Route::Login,
            Screen::Auth(AuthMode::Signup) => Route::Signup,
            Screen::Setup(_) => Route::Setup,
            Screen::Generating => Route::Generating,
            Screen::Letter => Route::Letter,
            Screen::Reflection(_) => Route::Reflection,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Landing => f.write_str("landing"),
            Screen::Auth(AuthMode::Login) => f.write_str("auth/login"),
            Screen::Auth(AuthMode::Signup) => f.write_str("auth/signup"),
            Screen::Setup(SetupStep::TimeHorizon) => f.write_str("setup/time_horizon"),
            Screen::Setup(SetupStep::Description) => f.write_str("setup/description"),
            Screen::Setup(SetupStep::EmotionalFocus) => f.write_str("setup/emotional_focus"),
            Screen::Generating => f.write_str("generating"),
            Screen::Letter => f.write_str("letter"),
            Screen::Reflection(ReflectionStatus::Unanswered) => f.write_str("reflection"),
            Screen::Reflection(ReflectionStatus::Saved) => f.write_str("reflection/saved"),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings / snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct GenerationSettings {
    pub letter_temperature: f32,
    /// Applied to each completion call separately.
    pub timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            letter_temperature: DEFAULT_LETTER_TEMPERATURE,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Answers collected by the three setup steps so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupDraft {
    pub time_horizon: Option<String>,
    pub future_description: Option<String>,
}

/// Everything a client needs to render its current screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub screen: Screen,
    pub route: &'static str,
    pub language: String,
    pub profile: Option<Profile>,
    pub draft: SetupDraft,
    pub letter: Option<String>,
    pub daily_prompt: Option<String>,
    pub last_entry: Option<ReflectionEntry>,
    pub response_letter: Option<String>,
}

// ---------------------------------------------------------------------------
// WorkflowController
// ---------------------------------------------------------------------------

pub struct WorkflowController {
    session: watch::Receiver<Option<Session>>,
    store: Arc<ProfileStore>,
    completion: Arc<dyn TextCompletion>,
    settings: GenerationSettings,
    screen: Screen,
    language: String,
    profile: Option<Profile>,
    draft: SetupDraft,
    letter: Option<String>,
    daily_prompt: Option<String>,
    last_entry: Option<ReflectionEntry>,
    response_letter: Option<String>,
}

impl WorkflowController {
    pub fn new(
        session: watch::Receiver<Option<Session>>,
        store: Arc<ProfileStore>,
        completion: Arc<dyn TextCompletion>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            session,
            store,
            completion,
            settings,
            screen: Screen::Landing,
            language: DEFAULT_LANGUAGE.to_string(),
            profile: None,
            draft: SetupDraft::default(),
            letter: None,
            daily_prompt: None,
            last_entry: None,
            response_letter: None,
        }
    }

    /// Seed the controller with a profile already in hand (e.g. right after sign-up).
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.language = profile.language_code.clone();
        self.profile = Some(profile);
        self
    }

    // -- accessors ------------------------------------------------------------

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn draft(&self) -> &SetupDraft {
        &self.draft
    }

    pub fn letter(&self) -> Option<&str> {
        self.letter.as_deref()
    }

    pub fn daily_prompt(&self) -> Option<&str> {
        self.daily_prompt.as_deref()
    }

    pub fn last_entry(&self) -> Option<&ReflectionEntry> {
        self.last_entry.as_ref()
    }

    pub fn response_letter(&self) -> Option<&str> {
        self.response_letter.as_deref()
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            screen: self.screen,
            route: self.screen.route().path(),
            language: self.language.clone(),
            profile: self.profile.clone(),
            draft: self.draft.clone(),
            letter: self.letter.clone(),
            daily_prompt: self.daily_prompt.clone(),
            last_entry: self.last_entry.clone(),
            response_letter: self.response_letter.clone(),
        }
    }

    // -- internals ------------------------------------------------------------

    fn session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    fn transition(&mut self, to: Screen) {
        if self.screen != to {
            tracing::info!(from = %self.screen, to = %to, "screen transition");
        }
        self.screen = to;
    }

    /// The current session, or route to login and fail.
    fn require_session(&mut self) -> Result<Session> {
        match self.session() {
            Some(s) => Ok(s),
            None => {
                self.transition(Screen::Auth(AuthMode::Login));
                Err(FutureYouError::NotAuthenticated)
            }
        }
    }

    fn invalid(&self, to: Screen, reason: &str) -> FutureYouError {
        FutureYouError::InvalidTransition {
            from: self.screen.to_string(),
            to: to.to_string(),
            reason: reason.to_string(),
        }
    }

    // -- operations -----------------------------------------------------------

    /// Read the stored profile, language preference and cached letter for the
    /// current session.
    pub async fn load(&mut self) -> Result<()> {
        let session = self.require_session()?;
        match self.store.get_profile(&session.user_id).await {
            Ok(profile) => self.profile = profile,
            Err(e) => {
                tracing::warn!(user_id = %session.user_id, error = %e, "profile read failed");
            }
        }

        let preference = self
            .store
            .language_preference(&session.user_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "language preference read failed");
                None
            });
        self.language = preference
            .or_else(|| self.profile.as_ref().map(|p| p.language_code.clone()))
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        if let Some(p) = self.profile.as_mut() {
            p.language_code = self.language.clone();
        }

        self.letter = self.store.last_letter(&session.user_id).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "cached letter read failed");
            None
        });
        tracing::debug!(
            user_id = %session.user_id,
            has_profile = self.profile.is_some(),
            language = %self.language,
            "workflow loaded"
        );
        Ok(())
    }

    /// Landing's start action. Routes by session and setup status; a set-up
    /// user goes straight through generation to the letter.
    pub async fn start(&mut self) -> Result<Screen> {
        let Some(session) = self.session() else {
            self.transition(Screen::Auth(AuthMode::Login));
            return Ok(self.screen);
        };
        if self.profile.is_none() {
            self.load().await?;
        }
        if let Err(e) = self.store.record_visit(&session.user_id, Utc::now()).await {
            tracing::warn!(error = %e, "last-visit write failed");
        }

        let set_up = self.profile.as_ref().is_some_and(|p| p.setup_complete);
        if set_up {
            self.transition(Screen::Generating);
            self.generate().await?;
        } else {
            self.draft = SetupDraft::default();
            self.transition(Screen::Setup(SetupStep::TimeHorizon));
        }
        Ok(self.screen)
    }

    /// Setup step 1.
    pub fn choose_time_horizon(&mut self, horizon: &str) -> Result<()> {
        self.require_session()?;
        let to = Screen::Setup(SetupStep::Description);
        if !matches!(self.screen, Screen::Setup(_)) {
            return Err(self.invalid(to, "not in setup"));
        }
        let horizon = parse_time_horizon(horizon)?;
        self.draft.time_horizon = Some(horizon.to_string());
        self.transition(to);
        Ok(())
    }

    /// Setup step 2. Blank descriptions are rejected.
    pub fn describe_future(&mut self, description: &str) -> Result<()> {
        self.require_session()?;
        let to = Screen::Setup(SetupStep::EmotionalFocus);
        if !matches!(
            self.screen,
            Screen::Setup(SetupStep::Description | SetupStep::EmotionalFocus)
        ) {
            return Err(self.invalid(to, "choose a time horizon first"));
        }
        if description.trim().is_empty() {
            return Err(FutureYouError::EmptyDescription);
        }
        self.draft.future_description = Some(description.to_string());
        self.transition(to);
        Ok(())
    }

    /// Setup step 3: completes setup with the drafted answers.
    pub async fn choose_emotional_focus(&mut self, focus: EmotionalFocus) -> Result<()> {
        self.require_session()?;
        let (Screen::Setup(SetupStep::EmotionalFocus), Some(horizon), Some(description)) = (
            self.screen,
            self.draft.time_horizon.clone(),
            self.draft.future_description.clone(),
        ) else {
            return Err(self.invalid(Screen::Generating, "setup answers incomplete"));
        };
        self.complete_setup(&description, &horizon, focus).await
    }

    /// Build the fully typed profile from the three setup answers, persist it
    /// with merge semantics and move to `Generating`.
    pub async fn complete_setup(
        &mut self,
        future_description: &str,
        time_horizon: &str,
        focus: EmotionalFocus,
    ) -> Result<()> {
        let session = self.require_session()?;
        let horizon = parse_time_horizon(time_horizon)?;
        if future_description.trim().is_empty() {
            return Err(FutureYouError::EmptyDescription);
        }

        let mut profile = self.profile.clone().unwrap_or_else(|| {
            Profile::new_default(
                session.display_name.clone().unwrap_or_default(),
                session.email.clone(),
            )
        });
        profile.future_description = future_description.to_string();
        profile.time_horizon = horizon.to_string();
        profile.emotional_focus = Some(focus);
        profile.language_code = self.language.clone();
        profile.setup_complete = true;

        if let Err(e) = self
            .store
            .update_profile(&session.user_id, &ProfilePatch::setup(&profile))
            .await
        {
            tracing::warn!(user_id = %session.user_id, error = %e, "profile update failed (non-blocking)");
        }

        self.profile = Some(profile);
        self.draft = SetupDraft::default();
        self.transition(Screen::Generating);
        Ok(())
    }

    /// Generating's entry action. Both requests run together; each one that
    /// fails or times out is replaced by its own fallback text.
    pub async fn generate(&mut self) -> Result<()> {
        let session = self.require_session()?;
        let Some(profile) = self.profile.clone().filter(|p| p.setup_complete) else {
            self.draft = SetupDraft::default();
            self.transition(Screen::Setup(SetupStep::TimeHorizon));
            return Ok(());
        };
        self.transition(Screen::Generating);

        let letter_req = build_letter_prompt(&profile, self.settings.letter_temperature);
        let prompt_req = build_daily_prompt_request(&profile);
        let client = Arc::clone(&self.completion);
        let limit = self.settings.timeout;
        let (letter, prompt) = tokio::join!(
            complete_within(client.as_ref(), &letter_req, limit),
            complete_within(client.as_ref(), &prompt_req, limit),
        );

        let language = profile.language_code.as_str();
        let letter = letter.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "letter generation failed, using fallback");
            fallback_letter(language).to_string()
        });
        let prompt = prompt.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "daily prompt generation failed, using fallback");
            fallback_prompt(language).to_string()
        });

        if let Err(e) = self.store.cache_last_letter(&session.user_id, &letter).await {
            tracing::warn!(error = %e, "letter cache write failed");
        }
        self.letter = Some(letter);
        self.daily_prompt = Some(prompt);
        self.last_entry = None;
        self.response_letter = None;
        self.transition(Screen::Letter);
        Ok(())
    }

    /// Letter's continue action. Only valid while the letter is showing.
    pub fn continue_to_reflection(&mut self) -> Result<()> {
        self.require_session()?;
        if self.screen != Screen::Letter {
            return Err(self.invalid(
                Screen::Reflection(ReflectionStatus::Unanswered),
                "no letter on screen",
            ));
        }
        if self.daily_prompt.is_some() && self.profile.is_some() {
            self.transition(Screen::Reflection(ReflectionStatus::Unanswered));
        } else {
            self.transition(Screen::Landing);
        }
        Ok(())
    }

    /// Reflection's save action. Blank text is rejected without any state
    /// change; every accepted call appends a new entry.
    pub async fn save_reflection(&mut self, response: &str) -> Result<ReflectionEntry> {
        let session = self.require_session()?;
        let to = Screen::Reflection(ReflectionStatus::Saved);
        if !matches!(self.screen, Screen::Reflection(_)) {
            return Err(self.invalid(to, "no active reflection prompt"));
        }
        if response.trim().is_empty() {
            return Err(FutureYouError::EmptyReflection);
        }

        let prompt = self.daily_prompt.clone().unwrap_or_default();
        let entry = ReflectionEntry::new(prompt, response);
        if let Err(e) = self.store.append_reflection(&session.user_id, &entry).await {
            tracing::warn!(error = %e, "reflection write failed");
        }
        tracing::info!(user_id = %session.user_id, entry_id = %entry.id, "reflection saved");
        self.last_entry = Some(entry.clone());
        self.response_letter = None;
        self.transition(to);
        Ok(entry)
    }

    /// Ask the future self to answer the last saved reflection.
    pub async fn respond_to_reflection(&mut self) -> Result<String> {
        self.require_session()?;
        let (Screen::Reflection(ReflectionStatus::Saved), Some(entry), Some(profile)) =
            (self.screen, self.last_entry.clone(), self.profile.clone())
        else {
            return Err(self.invalid(self.screen, "no saved reflection to answer"));
        };

        let request: CompletionRequest = build_response_letter_prompt(
            &profile,
            &entry.prompt,
            &entry.response,
            self.settings.letter_temperature,
        );
        let reply = complete_within(self.completion.as_ref(), &request, self.settings.timeout)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "response letter generation failed, using fallback");
                fallback_response_letter(profile.greeting_name())
            });
        self.response_letter = Some(reply.clone());
        Ok(reply)
    }

    /// Back to Landing. Stored profile and history are untouched.
    pub fn return_to_landing(&mut self) {
        self.draft = SetupDraft::default();
        self.transition(Screen::Landing);
    }

    /// Switch the active language, persisting the local preference and, when
    /// a profile is loaded, its `languageCode`.
    pub async fn change_language(&mut self, code: &str) -> Result<()> {
        let language =
            Language::from_code(code).ok_or_else(|| FutureYouError::UnsupportedLanguage(code.to_string()))?;
        self.language = language.code().to_string();

        let Some(session) = self.session() else {
            return Ok(());
        };
        if let Err(e) = self
            .store
            .set_language_preference(&session.user_id, &self.language)
            .await
        {
            tracing::warn!(error = %e, "language preference write failed");
        }
        if let Some(profile) = self.profile.as_mut() {
            profile.language_code = self.language.clone();
            if let Err(e) = self
                .store
                .update_profile(&session.user_id, &ProfilePatch::language(&self.language))
                .await
            {
                tracing::warn!(error = %e, "profile language update failed (non-blocking)");
            }
        }
        tracing::info!(language = %self.language, "language changed");
        Ok(())
    }
}
