//! Profile persistence.
//!
//! Two boundaries sit under [`ProfileStore`]:
//! - [`DocumentStore`]: the per-user profile document (`users/{id}`), async
//!   because it stands in for a remote service.
//! - [`KeyValueStore`]: flat per-user string keys for the cached letter, the
//!   reflection history, the language preference and the last-visit marker.
//!
//! Both have a file-backed implementation rooted at the data directory and an
//! in-memory implementation for tests.

use crate::error::{FutureYouError, Result};
use crate::paths;
use crate::profile::{Profile, ProfilePatch};
use crate::reflection::ReflectionEntry;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub type Fields = serde_json::Map<String, serde_json::Value>;

pub const LAST_LETTER_KEY: &str = "future_you_last_letter";
pub const REFLECTION_HISTORY_KEY: &str = "future_you_reflections";
pub const LANGUAGE_PREF_KEY: &str = "future_you_language";
pub const LAST_VISIT_KEY: &str = "future_you_last_visit";

// ---------------------------------------------------------------------------
// DocumentStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Replace the whole document.
    async fn set_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()>;

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Fields>>;

    /// Merge `fields` into an existing document. Fails if the document is missing.
    async fn update_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()>;

    /// Write the document only if none exists. Returns true if written.
    async fn create_document(&self, collection: &str, id: &str, fields: Fields) -> Result<bool>;
}

fn missing_document(collection: &str, id: &str) -> FutureYouError {
    FutureYouError::Storage(format!("document {collection}/{id} does not exist"))
}

fn merge(target: &mut Fields, patch: Fields) {
    for (k, v) in patch {
        target.insert(k, v);
    }
}

/// YAML documents under `.future-you/documents/{collection}/{id}.yaml`.
pub struct FileDocumentStore {
    root: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn read(path: &Path) -> Result<Option<Fields>> {
        match crate::io::read_optional(path)? {
            Some(data) => Ok(Some(serde_yaml::from_str(&data)?)),
            None => Ok(None),
        }
    }

    fn write(path: &Path, fields: &Fields) -> Result<()> {
        let data = serde_yaml::to_string(fields)?;
        crate::io::atomic_write(path, data.as_bytes())
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn set_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let path = paths::document_path(&self.root, collection, id);
        blocking(move || Self::write(&path, &fields)).await
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Fields>> {
        let path = paths::document_path(&self.root, collection, id);
        blocking(move || Self::read(&path)).await
    }

    async fn update_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let path = paths::document_path(&self.root, collection, id);
        let (collection, id) = (collection.to_string(), id.to_string());
        blocking(move || {
            let mut doc = Self::read(&path)?.ok_or_else(|| missing_document(&collection, &id))?;
            merge(&mut doc, fields);
            Self::write(&path, &doc)
        })
        .await
    }

    async fn create_document(&self, collection: &str, id: &str, fields: Fields) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let path = paths::document_path(&self.root, collection, id);
        blocking(move || {
            if path.exists() {
                return Ok(false);
            }
            Self::write(&path, &fields)?;
            Ok(true)
        })
        .await
    }
}

#[derive(Default)]
pub struct MemoryDocumentStore {
    docs: tokio::sync::Mutex<HashMap<(String, String), Fields>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn set_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.docs
            .lock()
            .await
            .insert((collection.to_string(), id.to_string()), fields);
        Ok(())
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Fields>> {
        let docs = self.docs.lock().await;
        Ok(docs.get(&(collection.to_string(), id.to_string())).cloned())
    }

    async fn update_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let mut docs = self.docs.lock().await;
        let doc = docs
            .get_mut(&(collection.to_string(), id.to_string()))
            .ok_or_else(|| missing_document(collection, id))?;
        merge(doc, fields);
        Ok(())
    }

    async fn create_document(&self, collection: &str, id: &str, fields: Fields) -> Result<bool> {
        let mut docs = self.docs.lock().await;
        let key = (collection.to_string(), id.to_string());
        if docs.contains_key(&key) {
            return Ok(false);
        }
        docs.insert(key, fields);
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// KeyValueStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, user_id: &str, key: &str) -> Result<Option<String>>;
    async fn set(&self, user_id: &str, key: &str, value: &str) -> Result<()>;
}

fn poisoned() -> FutureYouError {
    FutureYouError::Storage("local store lock poisoned".into())
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| FutureYouError::Storage(format!("task join error: {e}")))?
}

/// One JSON object of string keys per user under `.future-you/local/`.
pub struct FileKeyValueStore {
    root: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    fn load(path: &Path) -> Result<HashMap<String, String>> {
        match crate::io::read_optional(path)? {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Ok(HashMap::new()),
        }
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, user_id: &str, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        let path = paths::local_store_path(&self.root, user_id);
        let key = key.to_string();
        blocking(move || Ok(Self::load(&path)?.remove(&key))).await
    }

    async fn set(&self, user_id: &str, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let path = paths::local_store_path(&self.root, user_id);
        let (key, value) = (key.to_string(), value.to_string());
        blocking(move || {
            let mut map = Self::load(&path)?;
            map.insert(key, value);
            let data = serde_json::to_string_pretty(&map)?;
            crate::io::atomic_write(&path, data.as_bytes())
        })
        .await
    }
}

#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<(String, String), String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, user_id: &str, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|_| poisoned())?;
        Ok(values.get(&(user_id.to_string(), key.to_string())).cloned())
    }

    async fn set(&self, user_id: &str, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| poisoned())?;
        values.insert((user_id.to_string(), key.to_string()), value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ProfileStore
// ---------------------------------------------------------------------------

pub struct ProfileStore {
    documents: Arc<dyn DocumentStore>,
    local: Arc<dyn KeyValueStore>,
    history_lock: tokio::sync::Mutex<()>,
}

impl ProfileStore {
    pub fn new(documents: Arc<dyn DocumentStore>, local: Arc<dyn KeyValueStore>) -> Self {
        Self {
            documents,
            local,
            history_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// File-backed stores under `root`.
    pub fn open(root: &Path) -> Self {
        Self::new(
            Arc::new(FileDocumentStore::new(root)),
            Arc::new(FileKeyValueStore::new(root)),
        )
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(MemoryKeyValueStore::new()),
        )
    }

    // -- remote profile document --------------------------------------------

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let Some(fields) = self
            .documents
            .get_document(paths::USERS_COLLECTION, user_id)
            .await?
        else {
            return Ok(None);
        };
        let profile = serde_json::from_value(serde_json::Value::Object(fields))?;
        Ok(Some(profile))
    }

    /// Create the profile document unless one already exists for `user_id`.
    ///
    /// Returns false, leaving the stored document untouched, when it exists.
    pub async fn create_profile(&self, user_id: &str, defaults: &Profile) -> Result<bool> {
        let fields = with_identity(to_fields(defaults)?, user_id);
        self.documents
            .create_document(paths::USERS_COLLECTION, user_id, fields)
            .await
    }

    /// Merge `patch` into the stored profile, creating the document when the
    /// sign-up write never landed.
    pub async fn update_profile(&self, user_id: &str, patch: &ProfilePatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let fields = to_fields(patch)?;
        let seeded = with_identity(fields.clone(), user_id);
        if self
            .documents
            .create_document(paths::USERS_COLLECTION, user_id, seeded)
            .await?
        {
            tracing::info!(user_id, "profile document created by update");
            return Ok(());
        }
        self.documents
            .update_document(paths::USERS_COLLECTION, user_id, fields)
            .await
    }

    // -- local keys ------------------------------------------------------------

    pub async fn cache_last_letter(&self, user_id: &str, text: &str) -> Result<()> {
        self.local.set(user_id, LAST_LETTER_KEY, text).await
    }

    pub async fn last_letter(&self, user_id: &str) -> Result<Option<String>> {
        self.local.get(user_id, LAST_LETTER_KEY).await
    }

    pub async fn append_reflection(&self, user_id: &str, entry: &ReflectionEntry) -> Result<()> {
        let _guard = self.history_lock.lock().await;
        let mut history = self.list_reflections(user_id).await?;
        history.push(entry.clone());
        let data = serde_json::to_string(&history)?;
        self.local.set(user_id, REFLECTION_HISTORY_KEY, &data).await
    }

    /// Reflection history in insertion order.
    pub async fn list_reflections(&self, user_id: &str) -> Result<Vec<ReflectionEntry>> {
        match self.local.get(user_id, REFLECTION_HISTORY_KEY).await? {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn language_preference(&self, user_id: &str) -> Result<Option<String>> {
        self.local.get(user_id, LANGUAGE_PREF_KEY).await
    }

    pub async fn set_language_preference(&self, user_id: &str, code: &str) -> Result<()> {
        self.local.set(user_id, LANGUAGE_PREF_KEY, code).await
    }

    pub async fn record_visit(&self, user_id: &str, at: DateTime<Utc>) -> Result<()> {
        self.local.set(user_id, LAST_VISIT_KEY, &at.to_rfc3339()).await
    }

    pub async fn last_visit(&self, user_id: &str) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.local.get(user_id, LAST_VISIT_KEY).await? else {
            return Ok(None);
        };
        DateTime::parse_from_rfc3339(&raw)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| FutureYouError::Storage(format!("bad last-visit marker '{raw}': {e}")))
    }
}

fn with_identity(mut fields: Fields, user_id: &str) -> Fields {
    fields.insert("userId".into(), user_id.into());
    fields.insert("createdAt".into(), Utc::now().to_rfc3339().into());
    fields
}

fn to_fields<T: serde::Serialize>(value: &T) -> Result<Fields> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(FutureYouError::Storage(format!(
            "expected an object, got {other}"
        ))),
    }
}
