use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, mapref::entry::Entry};
use types::ids::UserId;

use super::StoreError;
use crate::auth::Role;

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    /// Stored lowercased; lookups are case-insensitive.
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// New account with an already hashed password.
    pub fn new(email: &str, name: Option<String>, role: Role, password_hash: String) -> Self {
        Self {
            id: UserId::new(),
            email: normalize_email(email),
            name,
            role,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hash a password with argon2 and a random salt (PHC string format).
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))
}

/// Check a password against a stored PHC hash. A malformed hash never verifies.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Duplicate` when the email is already registered.
    async fn insert(&self, user: User) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<User>, StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    by_email: DashMap<String, User>,
    emails_by_id: DashMap<UserId, String>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let key = normalize_email(&user.email);
        match self.by_email.entry(key.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(key)),
            Entry::Vacant(slot) => {
                self.emails_by_id.insert(user.id, key);
                slot.insert(user);
                Ok(())
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .by_email
            .get(&normalize_email(email))
            .map(|u| u.value().clone()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let Some(email) = self.emails_by_id.get(id).map(|e| e.value().clone()) else {
            return Ok(None);
        };
        Ok(self.by_email.get(&email).map(|u| u.value().clone()))
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.by_email.iter().map(|u| u.value().clone()).collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }
}
