use crate::completion::GeminiCompletion;
use future_you_core::auth::AuthGate;
use future_you_core::completion::TextCompletion;
use future_you_core::config::Config;
use future_you_core::identity::{IdentityProvider, LocalIdentityProvider, Session};
use future_you_core::store::ProfileStore;
use future_you_core::workflow::{GenerationSettings, WorkflowController};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// One signed-in client: its auth gate and the workflow controller that
/// watches the gate's session.
pub struct ClientSession {
    pub gate: AuthGate,
    pub controller: WorkflowController,
}

pub type SharedClient = Arc<Mutex<ClientSession>>;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    pub identity: Arc<dyn IdentityProvider>,
    pub store: Arc<ProfileStore>,
    pub completion: Arc<dyn TextCompletion>,
    clients: Arc<RwLock<HashMap<String, SharedClient>>>,
}

impl AppState {
    /// File-backed stores and the hosted completion client, configured from `root`.
    pub fn new(root: PathBuf) -> anyhow::Result<Self> {
        let config = Config::load_or_default(&root)?;
        let identity = LocalIdentityProvider::open(&root, config.auth.policy())?;
        let store = ProfileStore::open(&root);
        let completion = GeminiCompletion::from_config(&config.generation);
        Ok(Self::with_parts(
            root,
            config,
            Arc::new(identity),
            Arc::new(store),
            Arc::new(completion),
        ))
    }

    pub fn with_parts(
        root: PathBuf,
        config: Config,
        identity: Arc<dyn IdentityProvider>,
        store: Arc<ProfileStore>,
        completion: Arc<dyn TextCompletion>,
    ) -> Self {
        Self {
            root,
            config: Arc::new(config),
            identity,
            store,
            completion,
            clients: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn settings(&self) -> GenerationSettings {
        GenerationSettings {
            letter_temperature: self.config.generation.letter_temperature,
            timeout: self.config.generation.timeout(),
        }
    }

    pub fn gate(&self) -> AuthGate {
        AuthGate::new(self.identity.clone(), self.store.clone())
    }

    /// A controller bound to `gate`'s session.
    pub fn controller(&self, gate: &AuthGate) -> WorkflowController {
        WorkflowController::new(
            gate.subscribe(),
            self.store.clone(),
            self.completion.clone(),
            self.settings(),
        )
    }

    pub async fn insert_client(&self, token: &str, client: ClientSession) -> SharedClient {
        self.prune_clients().await;
        let shared = Arc::new(Mutex::new(client));
        self.clients
            .write()
            .await
            .insert(token.to_string(), shared.clone());
        shared
    }

    pub async fn remove_client(&self, token: &str) -> Option<SharedClient> {
        self.clients.write().await.remove(token)
    }

    /// Find the client for a session token, rebuilding it from the identity
    /// provider when the token is valid but no client is held yet. A token
    /// the provider no longer accepts drops its client.
    pub async fn resolve(&self, token: &str) -> Option<SharedClient> {
        let Some(session) = self.identity.verify(token).await else {
            if self.clients.write().await.remove(token).is_some() {
                tracing::debug!("dropped client for expired session");
            }
            return None;
        };
        if let Some(c) = self.clients.read().await.get(token) {
            return Some(c.clone());
        }
        Some(self.restore(session).await)
    }

    /// Drop clients whose session tokens have expired.
    async fn prune_clients(&self) {
        let tokens: Vec<String> = self.clients.read().await.keys().cloned().collect();
        let mut stale = Vec::new();
        for token in tokens {
            if self.identity.verify(&token).await.is_none() {
                stale.push(token);
            }
        }
        if stale.is_empty() {
            return;
        }
        let mut clients = self.clients.write().await;
        for token in &stale {
            clients.remove(token);
        }
        tracing::debug!(count = stale.len(), "pruned expired clients");
    }

    async fn restore(&self, session: Session) -> SharedClient {
        let token = session.token.clone();
        let mut gate = self.gate();
        gate.restore(session);
        let mut controller = self.controller(&gate);
        if let Err(e) = controller.load().await {
            tracing::warn!(error = %e, "restoring client state failed");
        }
        gate.set_language(controller.language().to_string());
        tracing::debug!("client restored from session token");
        let shared = Arc::new(Mutex::new(ClientSession { gate, controller }));
        // A concurrent request may have restored the same token first.
        self.clients
            .write()
            .await
            .entry(token)
            .or_insert(shared)
            .clone()
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }
}
