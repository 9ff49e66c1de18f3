//! Identity provider boundary and a file-backed local implementation.
//!
//! Providers report failures as coded errors (`invalid-credential`,
//! `email-already-in-use`, ...). [`crate::auth::AuthGate`] classifies the
//! codes into user-facing categories.

use crate::error::Result as CoreResult;
use crate::paths;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

pub const CODE_INVALID_CREDENTIAL: &str = "invalid-credential";
pub const CODE_TOO_MANY_REQUESTS: &str = "too-many-requests";
pub const CODE_NETWORK_FAILED: &str = "network-request-failed";
pub const CODE_EMAIL_IN_USE: &str = "email-already-in-use";
pub const CODE_WEAK_PASSWORD: &str = "weak-password";
pub const CODE_INVALID_EMAIL: &str = "invalid-email";
pub const CODE_USER_NOT_FOUND: &str = "user-not-found";
pub const CODE_INTERNAL: &str = "internal-error";

// ---------------------------------------------------------------------------
// Session / IdentityError
// ---------------------------------------------------------------------------

/// Proof of authenticated identity issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(skip_serializing, default)]
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct IdentityError {
    pub code: String,
    pub message: String,
}

impl IdentityError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    fn internal(e: impl std::fmt::Display) -> Self {
        Self::new(CODE_INTERNAL, e.to_string())
    }
}

pub type IdentityResult<T> = std::result::Result<T, IdentityError>;

// ---------------------------------------------------------------------------
// IdentityProvider
// ---------------------------------------------------------------------------

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> IdentityResult<Session>;
    async fn sign_in(&self, email: &str, password: &str) -> IdentityResult<Session>;
    async fn sign_out(&self, token: &str) -> IdentityResult<()>;
    async fn update_display_name(&self, user_id: &str, name: &str) -> IdentityResult<()>;
    /// Resolve a session token issued by this provider.
    async fn verify(&self, token: &str) -> Option<Session>;
}

// ---------------------------------------------------------------------------
// LocalIdentityProvider
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    user_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    /// Argon2id PHC string; carries its own salt and parameters.
    password_hash: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountBook {
    #[serde(default)]
    accounts: Vec<Account>,
}

struct IssuedSession {
    session: Session,
    issued_at: Instant,
}

struct Failures {
    count: u32,
    first_failure: Instant,
}

#[derive(Default)]
struct Inner {
    book: AccountBook,
    sessions: HashMap<String, IssuedSession>,
    /// Only emails that belong to an account are tracked.
    failed_attempts: HashMap<String, Failures>,
}

/// Policy knobs for [`LocalIdentityProvider`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentityPolicy {
    pub min_password_len: usize,
    pub max_failed_attempts: u32,
    /// Failures older than this no longer count towards the lockout.
    pub lockout_window: Duration,
    pub session_ttl: Duration,
}

impl Default for IdentityPolicy {
    fn default() -> Self {
        Self {
            min_password_len: 6,
            max_failed_attempts: 5,
            lockout_window: Duration::from_secs(15 * 60),
            session_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

/// Accounts in `.future-you/accounts.yaml` (or memory only), sessions in memory.
pub struct LocalIdentityProvider {
    path: Option<PathBuf>,
    policy: IdentityPolicy,
    inner: Mutex<Inner>,
}

impl LocalIdentityProvider {
    /// Load accounts from the data root, creating none until the first sign-up.
    pub fn open(root: &std::path::Path, policy: IdentityPolicy) -> CoreResult<Self> {
        let path = paths::accounts_path(root);
        let book = match crate::io::read_optional(&path)? {
            Some(data) => serde_yaml::from_str(&data)?,
            None => AccountBook::default(),
        };
        Ok(Self {
            path: Some(path),
            policy,
            inner: Mutex::new(Inner {
                book,
                ..Inner::default()
            }),
        })
    }

    pub fn in_memory(policy: IdentityPolicy) -> Self {
        Self {
            path: None,
            policy,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn persist(&self, book: &AccountBook) -> IdentityResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let data = serde_yaml::to_string(book).map_err(IdentityError::internal)?;
        crate::io::atomic_write(path, data.as_bytes()).map_err(IdentityError::internal)
    }

    /// Mint a session token, dropping any that have outlived the TTL.
    fn issue(&self, inner: &mut Inner, account: &Account) -> Session {
        let ttl = self.policy.session_ttl;
        inner.sessions.retain(|_, s| s.issued_at.elapsed() < ttl);

        let session = Session {
            user_id: account.user_id.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            token: random_token(32),
        };
        inner.sessions.insert(
            session.token.clone(),
            IssuedSession {
                session: session.clone(),
                issued_at: Instant::now(),
            },
        );
        session
    }

    fn prune_failures(&self, inner: &mut Inner) {
        let window = self.policy.lockout_window;
        inner
            .failed_attempts
            .retain(|_, f| f.first_failure.elapsed() < window);
    }

    fn check_lockout(&self, inner: &mut Inner, email: &str) -> IdentityResult<()> {
        self.prune_failures(inner);
        let locked = inner
            .failed_attempts
            .get(email)
            .is_some_and(|f| f.count >= self.policy.max_failed_attempts);
        if locked {
            tracing::warn!(email, "sign-in refused: too many failed attempts");
            return Err(IdentityError::new(
                CODE_TOO_MANY_REQUESTS,
                "too many failed sign-in attempts",
            ));
        }
        Ok(())
    }

    fn record_failure(&self, inner: &mut Inner, email: String) {
        self.prune_failures(inner);
        inner
            .failed_attempts
            .entry(email)
            .or_insert_with(|| Failures {
                count: 0,
                first_failure: Instant::now(),
            })
            .count += 1;
    }
}

fn invalid_credential() -> IdentityError {
    IdentityError::new(CODE_INVALID_CREDENTIAL, "email or password is incorrect")
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
    })
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn random_token(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn hash_password(password: &str) -> IdentityResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| IdentityError::internal(format!("failed to hash password: {e}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is not a PHC string");
            false
        }
    }
}

// Argon2 is CPU-bound; run it on the blocking pool.
async fn hash_blocking(password: &str) -> IdentityResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(IdentityError::internal)?
}

async fn verify_blocking(password: &str, hash: &str) -> IdentityResult<bool> {
    let (password, hash) = (password.to_string(), hash.to_string());
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(IdentityError::internal)
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> IdentityResult<Session> {
        let email = normalize_email(email);
        if !email_regex().is_match(&email) {
            return Err(IdentityError::new(CODE_INVALID_EMAIL, "email address is badly formatted"));
        }
        if password.chars().count() < self.policy.min_password_len {
            return Err(IdentityError::new(
                CODE_WEAK_PASSWORD,
                format!(
                    "password should be at least {} characters",
                    self.policy.min_password_len
                ),
            ));
        }

        let password_hash = hash_blocking(password).await?;

        let mut inner = self.inner.lock().await;
        if inner.book.accounts.iter().any(|a| a.email == email) {
            return Err(IdentityError::new(CODE_EMAIL_IN_USE, "email already in use"));
        }

        let account = Account {
            user_id: uuid::Uuid::new_v4().simple().to_string(),
            email,
            display_name: None,
            password_hash,
        };
        inner.book.accounts.push(account.clone());
        if let Err(e) = self.persist(&inner.book) {
            inner.book.accounts.pop();
            return Err(e);
        }
        tracing::info!(user_id = %account.user_id, "account created");
        Ok(self.issue(&mut inner, &account))
    }

    async fn sign_in(&self, email: &str, password: &str) -> IdentityResult<Session> {
        let email = normalize_email(email);
        let account = {
            let mut inner = self.inner.lock().await;
            self.check_lockout(&mut inner, &email)?;
            inner.book.accounts.iter().find(|a| a.email == email).cloned()
        };
        let Some(account) = account else {
            return Err(invalid_credential());
        };

        let matches = verify_blocking(password, &account.password_hash).await?;
        let mut inner = self.inner.lock().await;
        if matches {
            inner.failed_attempts.remove(&email);
            Ok(self.issue(&mut inner, &account))
        } else {
            self.record_failure(&mut inner, email);
            Err(invalid_credential())
        }
    }

    async fn sign_out(&self, token: &str) -> IdentityResult<()> {
        self.inner.lock().await.sessions.remove(token);
        Ok(())
    }

    async fn update_display_name(&self, user_id: &str, name: &str) -> IdentityResult<()> {
        let mut inner = self.inner.lock().await;
        let Some(account) = inner.book.accounts.iter_mut().find(|a| a.user_id == user_id) else {
            return Err(IdentityError::new(CODE_USER_NOT_FOUND, "no such user"));
        };
        account.display_name = Some(name.to_string());
        self.persist(&inner.book)?;
        for issued in inner
            .sessions
            .values_mut()
            .filter(|s| s.session.user_id == user_id)
        {
            issued.session.display_name = Some(name.to_string());
        }
        Ok(())
    }

    async fn verify(&self, token: &str) -> Option<Session> {
        let mut inner = self.inner.lock().await;
        let expired = inner.sessions.get(token)?.issued_at.elapsed() >= self.policy.session_ttl;
        if expired {
            inner.sessions.remove(token);
            tracing::debug!("session token expired");
            return None;
        }
        inner.sessions.get(token).map(|s| s.session.clone())
    }
}
