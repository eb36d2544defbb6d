use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    email::Email, hashed_password::HashedPassword, token::RevocationEntry, user::User,
    user_id::UserId,
};

// UserStore port trait and errors
#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("User not found")]
    UserNotFound,
    #[error("Unexpected error {0}")]
    UnexpectedError(String),
}

impl PartialEq for UserStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::UserAlreadyExists, Self::UserAlreadyExists)
                | (Self::UserNotFound, Self::UserNotFound)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

/// Durable user records, keyed by email with a secondary id index.
///
/// `insert` is the authoritative uniqueness guard: it must fail with
/// [`UserStoreError::UserAlreadyExists`] when the email is taken, even if a
/// caller's earlier `exists_by_email` said otherwise.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &Email) -> Result<User, UserStoreError>;
    async fn find_by_id(&self, id: &UserId) -> Result<User, UserStoreError>;
    async fn exists_by_email(&self, email: &Email) -> Result<bool, UserStoreError>;
    async fn insert(&self, user: User) -> Result<UserId, UserStoreError>;
    async fn update_password_hash(
        &self,
        email: &Email,
        password_hash: HashedPassword,
    ) -> Result<(), UserStoreError>;
    async fn delete(&self, email: &Email) -> Result<(), UserStoreError>;
}

// RevocationStore port trait and errors
#[derive(Debug, Error)]
pub enum RevocationStoreError {
    #[error("Revocation store error: {0}")]
    Backend(String),
}

/// The set of tokens that must no longer be honoured, each remembered until
/// its own expiry.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn revoke(
        &self,
        token: &str,
        entry: RevocationEntry,
    ) -> Result<(), RevocationStoreError>;
    async fn is_revoked(&self, token: &str) -> Result<bool, RevocationStoreError>;
    /// Every revoked token currently recorded for `subject`.
    async fn tokens_for_subject(
        &self,
        subject: &str,
    ) -> Result<Vec<(String, RevocationEntry)>, RevocationStoreError>;
    /// Drop entries that expired before `now`; returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, RevocationStoreError>;
    async fn clear(&self) -> Result<(), RevocationStoreError>;

    /// True when other processes, possibly still on an older signing secret,
    /// read the same entries. Such a store is never cleared on rotation.
    fn is_shared(&self) -> bool {
        false
    }
}
