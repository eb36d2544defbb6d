use std::sync::Arc;

use async_trait::async_trait;
use secrecy::Secret;
use thiserror::Error;

use super::repositories::RevocationStoreError;
use crate::domain::{
    email::Email,
    hashed_password::HashedPassword,
    password::Password,
    token::{SessionToken, TokenKind, VerifiedToken},
};

#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
    #[error("Password hashing failed: {0}")]
    Unexpected(String),
}

#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &Password) -> Result<HashedPassword, PasswordHashError>;
    /// `Ok(false)` on mismatch; an error only when the stored hash is unusable.
    async fn verify(
        &self,
        hash: &HashedPassword,
        candidate: &Password,
    ) -> Result<bool, PasswordHashError>;
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token has been revoked")]
    Revoked,
    #[error("Token is malformed: {0}")]
    Malformed(String),
    #[error("Token signature is invalid")]
    SignatureInvalid,
    #[error("Token has expired")]
    Expired,
    #[error("Unexpected token error: {0}")]
    Unexpected(String),
}

impl PartialEq for TokenError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::Revoked, Self::Revoked)
                | (Self::Malformed(_), Self::Malformed(_))
                | (Self::SignatureInvalid, Self::SignatureInvalid)
                | (Self::Expired, Self::Expired)
                | (Self::Unexpected(_), Self::Unexpected(_))
        )
    }
}

impl From<RevocationStoreError> for TokenError {
    fn from(value: RevocationStoreError) -> Self {
        TokenError::Unexpected(value.to_string())
    }
}

/// Issues, verifies and revokes session tokens.
///
/// Verification checks, in order: revocation, structure, signature, expiry.
#[async_trait]
pub trait TokenService: Send + Sync {
    async fn issue(&self, subject: &Email, kind: TokenKind) -> Result<SessionToken, TokenError>;
    async fn verify(&self, token: &SessionToken) -> Result<VerifiedToken, TokenError>;
    /// Revoking an already revoked token succeeds without doing anything.
    async fn revoke(&self, token: &SessionToken) -> Result<(), TokenError>;
    /// Re-asserts every revocation already recorded for `subject` and returns
    /// how many there were. Tokens that were never revoked stay valid.
    async fn revoke_all_for_subject(&self, subject: &Email) -> Result<usize, TokenError>;
    /// Swap the signing secret. Every token issued before the swap stops
    /// verifying and the revocation list is emptied.
    async fn rotate_secret(&self, new_secret: Secret<String>) -> Result<(), TokenError>;
    async fn purge_expired(&self) -> Result<usize, TokenError>;
}

#[async_trait]
impl<T: TokenService + ?Sized> TokenService for Arc<T> {
    async fn issue(&self, subject: &Email, kind: TokenKind) -> Result<SessionToken, TokenError> {
        (**self).issue(subject, kind).await
    }

    async fn verify(&self, token: &SessionToken) -> Result<VerifiedToken, TokenError> {
        (**self).verify(token).await
    }

    async fn revoke(&self, token: &SessionToken) -> Result<(), TokenError> {
        (**self).revoke(token).await
    }

    async fn revoke_all_for_subject(&self, subject: &Email) -> Result<usize, TokenError> {
        (**self).revoke_all_for_subject(subject).await
    }

    async fn rotate_secret(&self, new_secret: Secret<String>) -> Result<(), TokenError> {
        (**self).rotate_secret(new_secret).await
    }

    async fn purge_expired(&self) -> Result<usize, TokenError> {
        (**self).purge_expired().await
    }
}
