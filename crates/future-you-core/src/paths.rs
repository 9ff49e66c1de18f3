use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const DATA_DIR: &str = ".future-you";
pub const DOCUMENTS_DIR: &str = ".future-you/documents";
pub const LOCAL_DIR: &str = ".future-you/local";

pub const CONFIG_FILE: &str = ".future-you/config.yaml";
pub const ACCOUNTS_FILE: &str = ".future-you/accounts.yaml";

/// Collection holding one profile document per user id.
pub const USERS_COLLECTION: &str = "users";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn data_dir(root: &Path) -> PathBuf {
    root.join(DATA_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn accounts_path(root: &Path) -> PathBuf {
    root.join(ACCOUNTS_FILE)
}

pub fn documents_dir(root: &Path) -> PathBuf {
    root.join(DOCUMENTS_DIR)
}

pub fn document_path(root: &Path, collection: &str, id: &str) -> PathBuf {
    documents_dir(root)
        .join(collection)
        .join(format!("{}.yaml", sanitize(id)))
}

pub fn local_dir(root: &Path) -> PathBuf {
    root.join(LOCAL_DIR)
}

pub fn local_store_path(root: &Path, user_id: &str) -> PathBuf {
    local_dir(root).join(format!("{}.json", sanitize(user_id)))
}

/// Keep ids usable as file names: anything outside `[A-Za-z0-9_-]` becomes `_`.
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
