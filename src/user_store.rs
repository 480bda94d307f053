use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::image_types::Provider;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedImage {
    #[serde(rename = "webformatURL")]
    pub webformat_url: String,
    pub tags: String,
    pub provider: Option<Provider>,
    pub saved_at: DateTime<Utc>,
}

/// One account. Local accounts carry `salt`/`hash`; federated accounts carry
/// `google_id` instead. `token` is the single active session: every
/// successful authentication overwrites it, invalidating the previous one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub username: String,
    pub salt: Option<String>,
    pub hash: Option<String>,
    pub google_id: Option<String>,
    pub auth_provider: String,
    pub token: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub saved: Vec<SavedImage>,
}

impl UserRecord {
    pub fn local(username: &str, password: &str) -> Self {
        let salt = new_salt();
        let hash = hash_password(&salt, password);
        UserRecord {
            username: username.to_string(),
            salt: Some(salt),
            hash: Some(hash),
            google_id: None,
            auth_provider: "local".to_string(),
            token: None,
            created_at: Utc::now(),
            saved: Vec::new(),
        }
    }

    pub fn federated(username: &str, google_id: &str) -> Self {
        UserRecord {
            username: username.to_string(),
            salt: None,
            hash: None,
            google_id: Some(google_id.to_string()),
            auth_provider: "google".to_string(),
            token: None,
            created_at: Utc::now(),
            saved: Vec::new(),
        }
    }

    pub fn verify_password(&self, password: &str) -> bool {
        match (&self.salt, &self.hash) {
            (Some(salt), Some(hash)) => &hash_password(salt, password) == hash,
            _ => false,
        }
    }

    /// Issue a fresh bearer token, replacing any previous session.
    pub fn rotate_token(&mut self) -> String {
        let token = new_token();
        self.token = Some(token.clone());
        token
    }
}

pub fn new_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn new_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("user store corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("user store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed user repository. Key is the username (or e-mail for federated
/// accounts). Records are never deleted.
pub trait UserStore: Send + Sync {
    fn get(&self, username: &str) -> StoreResult<Option<UserRecord>>;
    fn upsert(&self, record: UserRecord) -> StoreResult<()>;
    fn list(&self) -> StoreResult<Vec<UserRecord>>;

    fn find_by_token(&self, token: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self
            .list()?
            .into_iter()
            .find(|u| u.token.as_deref() == Some(token)))
    }
}

/// JSON-file-backed store. The whole file is rewritten on every upsert via a
/// temp file and rename. Concurrent writers from simultaneous signups can
/// still interleave read-modify-write cycles; that race is a known limitation.
pub struct FileUserStore {
    path: PathBuf,
    users: Mutex<HashMap<String, UserRecord>>,
}

impl FileUserStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let users = if path.exists() {
            let contents = fs::read_to_string(path)?;
            if contents.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            HashMap::new()
        };

        Ok(FileUserStore {
            path: path.to_path_buf(),
            users: Mutex::new(users),
        })
    }

    fn persist(&self, users: &HashMap<String, UserRecord>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_string_pretty(users)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl UserStore for FileUserStore {
    fn get(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let users = self.users.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(users.get(username).cloned())
    }

    fn upsert(&self, record: UserRecord) -> StoreResult<()> {
        let mut users = self.users.lock().map_err(|_| StoreError::Poisoned)?;
        users.insert(record.username.clone(), record);
        self.persist(&users)
    }

    fn list(&self) -> StoreResult<Vec<UserRecord>> {
        let users = self.users.lock().map_err(|_| StoreError::Poisoned)?;
        let mut all: Vec<UserRecord> = users.values().cloned().collect();
        all.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(all)
    }
}

/// In-memory store satisfying the same contract, for tests.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryUserStore {
    fn get(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let users = self.users.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(users.get(username).cloned())
    }

    fn upsert(&self, record: UserRecord) -> StoreResult<()> {
        let mut users = self.users.lock().map_err(|_| StoreError::Poisoned)?;
        users.insert(record.username.clone(), record);
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<UserRecord>> {
        let users = self.users.lock().map_err(|_| StoreError::Poisoned)?;
        let mut all: Vec<UserRecord> = users.values().cloned().collect();
        all.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_depends_on_salt() {
        let a = hash_password("salt-a", "secret");
        let b = hash_password("salt-b", "secret");
        assert_ne!(a, b);
        assert_eq!(a, hash_password("salt-a", "secret"));
    }

    #[test]
    fn test_local_record_verifies_own_password() {
        let record = UserRecord::local("alice", "hunter2");
        assert!(record.verify_password("hunter2"));
        assert!(!record.verify_password("hunter3"));
    }

    #[test]
    fn test_federated_record_rejects_passwords() {
        let record = UserRecord::federated("bob@example.com", "google-123");
        assert!(!record.verify_password("anything"));
    }

    #[test]
    fn test_rotate_token_invalidates_previous() {
        let mut record = UserRecord::local("alice", "pw");
        let first = record.rotate_token();
        let second = record.rotate_token();
        assert_ne!(first, second);
        assert_eq!(record.token.as_deref(), Some(second.as_str()));
    }

    #[test]
    fn test_memory_store_upsert_and_find_by_token() {
        let store = MemoryUserStore::new();
        let mut record = UserRecord::local("alice", "pw");
        let token = record.rotate_token();
        store.upsert(record).unwrap();

        let found = store.find_by_token(&token).unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert!(store.find_by_token("bogus").unwrap().is_none());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("users.json");

        {
            let store = FileUserStore::open(&path).unwrap();
            store.upsert(UserRecord::local("alice", "pw")).unwrap();
            store
                .upsert(UserRecord::federated("bob@example.com", "g-1"))
                .unwrap();
        }

        let reopened = FileUserStore::open(&path).unwrap();
        let all = reopened.list().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].username, "alice");
        assert!(all[0].verify_password("pw"));
        assert_eq!(all[1].auth_provider, "google");
    }

    #[test]
    fn test_file_store_last_write_wins() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        let store = FileUserStore::open(&path).unwrap();

        let mut record = UserRecord::local("alice", "pw");
        store.upsert(record.clone()).unwrap();
        let token = record.rotate_token();
        store.upsert(record).unwrap();

        let current = store.get("alice").unwrap().unwrap();
        assert_eq!(current.token.as_deref(), Some(token.as_str()));
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
