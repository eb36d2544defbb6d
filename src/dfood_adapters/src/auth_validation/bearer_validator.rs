use async_trait::async_trait;
use axum_extra::extract::CookieJar;
use dfood_core::{
    AuthErrorKind, AuthValidator, HasErrorKind, SessionToken, TokenError, TokenKind,
    TokenService, VerifiedToken,
};
use http::{HeaderMap, header::AUTHORIZATION};
use thiserror::Error;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Error)]
pub enum GateError {
    #[error("No authorization token provided")]
    MissingToken,
    #[error("Invalid authorization token")]
    InvalidToken(TokenError),
    #[error("Invalid authorization token")]
    WrongTokenKind(TokenKind),
    #[error("Unexpected error")]
    UnexpectedError(String),
}

impl HasErrorKind for GateError {
    fn kind(&self) -> AuthErrorKind {
        match self {
            GateError::MissingToken | GateError::InvalidToken(_) | GateError::WrongTokenKind(_) => {
                AuthErrorKind::Unauthorized
            }
            GateError::UnexpectedError(_) => AuthErrorKind::Internal,
        }
    }
}

impl From<TokenError> for GateError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Unexpected(msg) => GateError::UnexpectedError(msg),
            other => GateError::InvalidToken(other),
        }
    }
}

/// Admits requests carrying an access token that still verifies. Refresh
/// tokens are turned away even when valid.
#[derive(Clone)]
pub struct BearerTokenValidator<T> {
    token_service: T,
    cookie_name: String,
}

impl<T> BearerTokenValidator<T> {
    pub fn new(token_service: T, cookie_name: impl Into<String>) -> Self {
        Self {
            token_service,
            cookie_name: cookie_name.into(),
        }
    }
}

#[async_trait]
impl<T: TokenService + Clone + 'static> AuthValidator for BearerTokenValidator<T> {
    type Claims = VerifiedToken;
    type RequestParts = http::request::Parts;
    type Error = GateError;

    async fn validate(&self, parts: &Self::RequestParts) -> Result<Self::Claims, Self::Error> {
        let token =
            extract_token(&parts.headers, &self.cookie_name).ok_or(GateError::MissingToken)?;

        let verified = self.token_service.verify(&token).await.inspect_err(|e| {
            tracing::debug!(error = %e, "session token rejected");
        })?;

        if verified.kind != TokenKind::Access {
            tracing::debug!(kind = ?verified.kind, "non-access token presented to the gate");
            return Err(GateError::WrongTokenKind(verified.kind));
        }

        Ok(verified)
    }
}

/// Look for a token in `Authorization` (with or without the `Bearer `
/// scheme), then in the session cookie.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<SessionToken> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim())
        .filter(|value| !value.is_empty());

    if let Some(token) = from_header {
        return Some(SessionToken::new(token));
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .map(SessionToken::new)
}
