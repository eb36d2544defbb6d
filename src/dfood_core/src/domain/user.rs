use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{email::Email, hashed_password::HashedPassword, user_id::UserId};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password is required")]
    MissingPassword,
    #[error("Password must be at least {} characters", super::password::MIN_PASSWORD_LENGTH)]
    PasswordTooShort,
    #[error("Invalid user id")]
    InvalidUserId,
}

/// Optional personal details captured at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

/// A user record as held by the credential store, hash included.
#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    email: Email,
    password_hash: HashedPassword,
    profile: UserProfile,
    first_time_login: bool,
    email_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// A freshly registered user: first login pending, email unverified.
    pub fn new(
        id: UserId,
        email: Email,
        password_hash: HashedPassword,
        profile: UserProfile,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            profile,
            first_time_login: true,
            email_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a user from persisted state.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: UserId,
        email: Email,
        password_hash: HashedPassword,
        profile: UserProfile,
        first_time_login: bool,
        email_verified: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            profile,
            first_time_login,
            email_verified,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password_hash(&self) -> &HashedPassword {
        &self.password_hash
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn first_time_login(&self) -> bool {
        self.first_time_login
    }

    pub fn email_verified(&self) -> bool {
        self.email_verified
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn with_password_hash(mut self, password_hash: HashedPassword, now: DateTime<Utc>) -> Self {
        self.password_hash = password_hash;
        self.updated_at = now;
        self
    }

    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            email: self.email.as_str().to_owned(),
            profile: self.profile.clone(),
            first_time_login: self.first_time_login,
            email_verified: self.email_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A user with the password hash stripped. Every orchestrator operation that
/// hands a user back returns this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: UserId,
    pub email: String,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub first_time_login: bool,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
