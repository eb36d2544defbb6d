use crate::{
    domain::user::UserError,
    ports::{
        repositories::{RevocationStoreError, UserStoreError},
        services::{PasswordHashError, TokenError},
    },
};

/// Transport-neutral classification of every failure the auth core reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    Conflict,
    NotFound,
    Internal,
}

pub trait HasErrorKind {
    fn kind(&self) -> AuthErrorKind;
}

impl HasErrorKind for UserError {
    fn kind(&self) -> AuthErrorKind {
        AuthErrorKind::BadRequest
    }
}

impl HasErrorKind for UserStoreError {
    fn kind(&self) -> AuthErrorKind {
        match self {
            UserStoreError::UserAlreadyExists => AuthErrorKind::Conflict,
            UserStoreError::UserNotFound => AuthErrorKind::NotFound,
            UserStoreError::UnexpectedError(_) => AuthErrorKind::Internal,
        }
    }
}

impl HasErrorKind for TokenError {
    fn kind(&self) -> AuthErrorKind {
        match self {
            TokenError::Unexpected(_) => AuthErrorKind::Internal,
            TokenError::Revoked
            | TokenError::Malformed(_)
            | TokenError::SignatureInvalid
            | TokenError::Expired => AuthErrorKind::Unauthorized,
        }
    }
}

impl HasErrorKind for PasswordHashError {
    fn kind(&self) -> AuthErrorKind {
        AuthErrorKind::Internal
    }
}

impl HasErrorKind for RevocationStoreError {
    fn kind(&self) -> AuthErrorKind {
        AuthErrorKind::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_failures_are_unauthorized_except_faults() {
        assert_eq!(TokenError::Expired.kind(), AuthErrorKind::Unauthorized);
        assert_eq!(TokenError::Revoked.kind(), AuthErrorKind::Unauthorized);
        assert_eq!(
            TokenError::Unexpected("boom".into()).kind(),
            AuthErrorKind::Internal
        );
    }

    #[test]
    fn store_errors_map_to_conflict_and_not_found() {
        assert_eq!(
            UserStoreError::UserAlreadyExists.kind(),
            AuthErrorKind::Conflict
        );
        assert_eq!(UserStoreError::UserNotFound.kind(), AuthErrorKind::NotFound);
    }
}
