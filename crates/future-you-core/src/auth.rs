use crate::identity::{
    IdentityError, IdentityProvider, Session, CODE_EMAIL_IN_USE, CODE_INVALID_CREDENTIAL,
    CODE_NETWORK_FAILED, CODE_TOO_MANY_REQUESTS, CODE_WEAK_PASSWORD,
};
use crate::messages::auth_messages;
use crate::profile::Profile;
use crate::store::ProfileStore;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

// ---------------------------------------------------------------------------
// AuthErrorKind / AuthFailure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
    InvalidCredentials,
    TooManyAttempts,
    Network,
    EmailInUse,
    WeakPassword,
    Unknown,
}

impl AuthErrorKind {
    /// Classify a provider error code. Codes may carry an `auth/` prefix.
    pub fn classify(code: &str) -> Self {
        let code = code.strip_prefix("auth/").unwrap_or(code);
        match code {
            CODE_INVALID_CREDENTIAL | "wrong-password" | "user-not-found" | "invalid-login-credentials" => {
                AuthErrorKind::InvalidCredentials
            }
            CODE_TOO_MANY_REQUESTS => AuthErrorKind::TooManyAttempts,
            CODE_NETWORK_FAILED | "network-failed" => AuthErrorKind::Network,
            CODE_EMAIL_IN_USE => AuthErrorKind::EmailInUse,
            CODE_WEAK_PASSWORD => AuthErrorKind::WeakPassword,
            _ => AuthErrorKind::Unknown,
        }
    }

    /// User-facing message in the given language (Tamil or English).
    pub fn message(self, language_code: &str) -> &'static str {
        let m = auth_messages(language_code);
        match self {
            AuthErrorKind::InvalidCredentials => m.invalid_credentials,
            AuthErrorKind::TooManyAttempts => m.too_many_attempts,
            AuthErrorKind::Network => m.network,
            AuthErrorKind::EmailInUse => m.email_in_use,
            AuthErrorKind::WeakPassword => m.weak_password,
            AuthErrorKind::Unknown => m.generic,
        }
    }
}

/// A classified, localised auth failure. Always recoverable by retrying the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthFailure {
    pub kind: AuthErrorKind,
    pub message: String,
}

impl AuthFailure {
    fn from_identity(err: &IdentityError, language_code: &str) -> Self {
        let kind = AuthErrorKind::classify(&err.code);
        Self {
            kind,
            message: kind.message(language_code).to_string(),
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AuthFailure {}

// ---------------------------------------------------------------------------
// AuthGate
// ---------------------------------------------------------------------------

/// Result of a successful sign-up: the session plus the in-memory default
/// profile, which is valid even when the profile document write failed.
#[derive(Debug, Clone)]
pub struct SignedUp {
    pub session: Session,
    pub profile: Profile,
}

/// Client-side wrapper over the identity provider.
///
/// Publishes the current session on a `watch` channel; the workflow
/// controller holds a receiver and reads it for every gated transition.
pub struct AuthGate {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<ProfileStore>,
    session_tx: watch::Sender<Option<Session>>,
    language: String,
    loading: bool,
    error: Option<AuthFailure>,
}

impl AuthGate {
    pub fn new(identity: Arc<dyn IdentityProvider>, store: Arc<ProfileStore>) -> Self {
        let (session_tx, _) = watch::channel(None);
        Self {
            identity,
            store,
            session_tx,
            language: crate::types::DEFAULT_LANGUAGE.to_string(),
            loading: false,
            error: None,
        }
    }

    /// Language used for error messages.
    pub fn set_language(&mut self, code: impl Into<String>) {
        self.language = code.into();
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session_tx.subscribe()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session_tx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session_tx.borrow().is_some()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&AuthFailure> {
        self.error.as_ref()
    }

    fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn fail(&mut self, err: &IdentityError) -> AuthFailure {
        let failure = AuthFailure::from_identity(err, &self.language);
        tracing::warn!(code = %err.code, kind = ?failure.kind, "auth request failed");
        self.error = Some(failure.clone());
        failure
    }

    pub async fn signup(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SignedUp, AuthFailure> {
        self.begin();
        let result = self.signup_inner(name, email, password).await;
        self.loading = false;
        result
    }

    async fn signup_inner(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SignedUp, AuthFailure> {
        let mut session = match self.identity.sign_up(email, password).await {
            Ok(s) => s,
            Err(e) => return Err(self.fail(&e)),
        };

        match self.identity.update_display_name(&session.user_id, name).await {
            Ok(()) => session.display_name = Some(name.to_string()),
            Err(e) => tracing::warn!(error = %e, "display name update failed (non-blocking)"),
        }

        let profile = Profile::new_default(name, session.email.clone());
        if let Err(e) = self.store.create_profile(&session.user_id, &profile).await {
            tracing::warn!(user_id = %session.user_id, error = %e, "profile document write failed (non-blocking)");
        }

        self.session_tx.send_replace(Some(session.clone()));
        Ok(SignedUp { session, profile })
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<Session, AuthFailure> {
        self.begin();
        let result = match self.identity.sign_in(email, password).await {
            Ok(session) => {
                self.session_tx.send_replace(Some(session.clone()));
                Ok(session)
            }
            Err(e) => Err(self.fail(&e)),
        };
        self.loading = false;
        result
    }

    /// Adopt a session that was established elsewhere (e.g. a verified cookie).
    pub fn restore(&mut self, session: Session) {
        self.session_tx.send_replace(Some(session));
    }

    pub async fn logout(&mut self) {
        let previous = self.session_tx.send_replace(None);
        if let Some(session) = previous {
            if let Err(e) = self.identity.sign_out(&session.token).await {
                tracing::warn!(error = %e, "sign-out failed");
            }
        }
    }
}
