//! Hand-rolled port doubles shared by the use case tests.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use chrono::{Duration, Utc};
use dfood_core::{
    Email, HashedPassword, Password, PasswordHashError, PasswordHasher, SessionToken, TokenError,
    TokenKind, TokenService, User, UserId, UserStore, UserStoreError, VerifiedToken,
};
use secrecy::{ExposeSecret, Secret};
use tokio::sync::RwLock;

pub fn email(s: &str) -> Email {
    Email::try_from(Secret::from(s.to_owned())).unwrap()
}

pub fn password(s: &str) -> Password {
    Password::try_from(Secret::from(s.to_owned())).unwrap()
}

#[derive(Clone, Default)]
pub struct MockUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
    stale_exists_check: bool,
    failing_delete: bool,
}

impl MockUserStore {
    /// `exists_by_email` always answers false, as if another request
    /// inserted the same email between the pre-check and the insert.
    pub fn with_stale_exists_check() -> Self {
        Self {
            stale_exists_check: true,
            ..Default::default()
        }
    }

    /// `delete` fails with a backend error and leaves the record in place.
    pub fn with_failing_delete() -> Self {
        Self {
            failing_delete: true,
            ..Default::default()
        }
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait::async_trait]
impl UserStore for MockUserStore {
    async fn find_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
        self.users
            .read()
            .await
            .get(email.as_str())
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<User, UserStoreError> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.id() == id)
            .cloned()
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn exists_by_email(&self, email: &Email) -> Result<bool, UserStoreError> {
        if self.stale_exists_check {
            return Ok(false);
        }
        Ok(self.users.read().await.contains_key(email.as_str()))
    }

    async fn insert(&self, user: User) -> Result<UserId, UserStoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(user.email().as_str()) {
            return Err(UserStoreError::UserAlreadyExists);
        }
        let id = user.id().clone();
        users.insert(user.email().as_str().to_owned(), user);
        Ok(id)
    }

    async fn update_password_hash(
        &self,
        email: &Email,
        password_hash: HashedPassword,
    ) -> Result<(), UserStoreError> {
        let mut users = self.users.write().await;
        let user = users
            .remove(email.as_str())
            .ok_or(UserStoreError::UserNotFound)?;
        users.insert(
            email.as_str().to_owned(),
            user.with_password_hash(password_hash, Utc::now()),
        );
        Ok(())
    }

    async fn delete(&self, email: &Email) -> Result<(), UserStoreError> {
        if self.failing_delete {
            return Err(UserStoreError::UnexpectedError("connection reset".into()));
        }
        self.users
            .write()
            .await
            .remove(email.as_str())
            .map(|_| ())
            .ok_or(UserStoreError::UserNotFound)
    }
}

/// "Hashes" by prefixing, and counts how often it was asked to.
#[derive(Clone, Default)]
pub struct MockHasher {
    pub hash_calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl PasswordHasher for MockHasher {
    async fn hash(&self, password: &Password) -> Result<HashedPassword, PasswordHashError> {
        self.hash_calls.fetch_add(1, Ordering::SeqCst);
        Ok(HashedPassword::new(Secret::from(format!(
            "plain:{}",
            password.as_ref().expose_secret()
        ))))
    }

    async fn verify(
        &self,
        hash: &HashedPassword,
        candidate: &Password,
    ) -> Result<bool, PasswordHashError> {
        match hash.as_str().strip_prefix("plain:") {
            Some(stored) => Ok(stored == candidate.as_ref().expose_secret()),
            None => Err(PasswordHashError::MalformedHash(hash.as_str().to_owned())),
        }
    }
}

#[derive(Clone, Default)]
pub struct MockTokenService {
    issued: Arc<RwLock<HashMap<String, VerifiedToken>>>,
    revoked: Arc<RwLock<HashMap<String, String>>>,
    counter: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl TokenService for MockTokenService {
    async fn issue(&self, subject: &Email, kind: TokenKind) -> Result<SessionToken, TokenError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let token = format!("{kind}-{n}-{}", subject.as_str());
        self.issued.write().await.insert(
            token.clone(),
            VerifiedToken {
                subject: subject.clone(),
                kind,
                expires_at: Utc::now() + Duration::minutes(15),
            },
        );
        Ok(SessionToken::new(token))
    }

    async fn verify(&self, token: &SessionToken) -> Result<VerifiedToken, TokenError> {
        if self.revoked.read().await.contains_key(token.as_str()) {
            return Err(TokenError::Revoked);
        }
        self.issued
            .read()
            .await
            .get(token.as_str())
            .cloned()
            .ok_or_else(|| TokenError::Malformed("unknown token".into()))
    }

    async fn revoke(&self, token: &SessionToken) -> Result<(), TokenError> {
        let verified = match self.verify(token).await {
            Ok(verified) => verified,
            Err(TokenError::Revoked) => return Ok(()),
            Err(e) => return Err(e),
        };
        self.revoked.write().await.insert(
            token.as_str().to_owned(),
            verified.subject.as_str().to_owned(),
        );
        Ok(())
    }

    async fn revoke_all_for_subject(&self, subject: &Email) -> Result<usize, TokenError> {
        Ok(self
            .revoked
            .read()
            .await
            .values()
            .filter(|s| s.as_str() == subject.as_str())
            .count())
    }

    async fn rotate_secret(&self, _new_secret: Secret<String>) -> Result<(), TokenError> {
        self.issued.write().await.clear();
        self.revoked.write().await.clear();
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, TokenError> {
        Ok(0)
    }
}
