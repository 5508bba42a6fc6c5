//! Flat username/password credential store backing the login gate.
//!
//! Passwords are kept as BLAKE3 hex digests in a users file managed by
//! the storage manager. There are no sessions, tokens, or lockouts; the
//! gate is a single authenticate call at startup.

use crate::storage_utils::AsyncStorageManager;
use async_trait::async_trait;
use std::collections::BTreeMap;

const USERS_FILE: &str = "users";

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Registers a user. `false` when the username is taken or empty.
    async fn create(&self, username: &str, password: &str) -> anyhow::Result<bool>;

    /// `true` only for a known username with a matching password.
    async fn authenticate(&self, username: &str, password: &str) -> anyhow::Result<bool>;
}

pub struct JsonCredentialStore {
    storage: AsyncStorageManager,
}

impl JsonCredentialStore {
    pub fn new(storage: AsyncStorageManager) -> Self {
        Self { storage }
    }

    /// A missing users file is an empty table, not an error.
    async fn load_users(&self) -> BTreeMap<String, String> {
        self.storage.load(USERS_FILE).await.unwrap_or_default()
    }
}

fn digest(password: &str) -> String {
    blake3::hash(password.as_bytes()).to_hex().to_string()
}

#[async_trait]
impl CredentialStore for JsonCredentialStore {
    async fn create(&self, username: &str, password: &str) -> anyhow::Result<bool> {
        let username = username.trim();
        if username.is_empty() {
            return Ok(false);
        }

        let mut users = self.load_users().await;
        if users.contains_key(username) {
            return Ok(false);
        }

        users.insert(username.to_string(), digest(password));
        self.storage.save(USERS_FILE, &users).await?;
        Ok(true)
    }

    async fn authenticate(&self, username: &str, password: &str) -> anyhow::Result<bool> {
        let users = self.load_users().await;
        Ok(users
            .get(username.trim())
            .is_some_and(|stored| *stored == digest(password)))
    }
}
