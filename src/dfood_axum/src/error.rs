use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dfood_adapters::GateError;
use dfood_application::{
    DeleteAccountError, LoginError, LogoutError, RegisterError, UpdatePasswordError,
};
use dfood_core::{AuthErrorKind, HasErrorKind, TokenError, UserError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AuthApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Too many requests")]
    TooManyRequests,

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl AuthApiError {
    pub fn from_kind(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            AuthErrorKind::BadRequest => AuthApiError::BadRequest(message),
            AuthErrorKind::Unauthorized => AuthApiError::Unauthorized(message),
            AuthErrorKind::Forbidden => AuthApiError::Forbidden(message),
            AuthErrorKind::Conflict => AuthApiError::Conflict(message),
            AuthErrorKind::NotFound => AuthApiError::NotFound(message),
            AuthErrorKind::Internal => AuthApiError::UnexpectedError(message),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthApiError::Conflict(_) => StatusCode::CONFLICT,
            AuthApiError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AuthApiError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_message = match self {
            AuthApiError::UnexpectedError(detail) => {
                tracing::error!(error = %detail, "request failed");
                "Unexpected error".to_owned()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status_code, body).into_response()
    }
}

macro_rules! impl_from_kinded_error {
    ($($error:ty),* $(,)?) => {
        $(
            impl From<$error> for AuthApiError {
                fn from(error: $error) -> Self {
                    AuthApiError::from_kind(error.kind(), error.to_string())
                }
            }
        )*
    };
}

impl_from_kinded_error!(
    UserError,
    TokenError,
    GateError,
    RegisterError,
    LoginError,
    UpdatePasswordError,
    LogoutError,
    DeleteAccountError,
);

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn kinds_map_to_statuses() {
        let cases = [
            (AuthErrorKind::BadRequest, StatusCode::BAD_REQUEST),
            (AuthErrorKind::Unauthorized, StatusCode::UNAUTHORIZED),
            (AuthErrorKind::Forbidden, StatusCode::FORBIDDEN),
            (AuthErrorKind::Conflict, StatusCode::CONFLICT),
            (AuthErrorKind::NotFound, StatusCode::NOT_FOUND),
            (AuthErrorKind::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (kind, status) in cases {
            assert_eq!(AuthApiError::from_kind(kind, "x").status_code(), status);
        }
    }

    #[tokio::test]
    async fn login_failure_renders_error_body() {
        let response = AuthApiError::from(LoginError::InvalidCredentials).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_of(response).await["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        let response =
            AuthApiError::from(TokenError::Unexpected("redis down at 10.0.0.3".into()))
                .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await["error"], "Unexpected error");
    }
}
