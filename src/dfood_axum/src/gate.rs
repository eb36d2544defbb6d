use axum::{
    Router,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::{self, Next},
    response::Response,
};
use dfood_core::{AuthValidator, HasErrorKind, VerifiedToken};

use crate::error::AuthApiError;

/// Middleware that rejects requests whose session token does not validate.
///
/// On success the validator's claims are stored in the request extensions,
/// where [`Session`] picks them up.
pub async fn require_session<V>(
    State(validator): State<V>,
    request: Request,
    next: Next,
) -> Result<Response, AuthApiError>
where
    V: AuthValidator<RequestParts = Parts>,
    V::Error: HasErrorKind,
{
    let (parts, body) = request.into_parts();

    let claims = validator
        .validate(&parts)
        .await
        .map_err(|e| AuthApiError::from_kind(e.kind(), e.to_string()))?;

    let mut request = Request::from_parts(parts, body);
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Put every route of `router` behind [`require_session`].
pub fn protect<S, V>(router: Router<S>, validator: V) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    V: AuthValidator<RequestParts = Parts>,
    V::Error: HasErrorKind,
{
    router.layer(middleware::from_fn_with_state(
        validator,
        require_session::<V>,
    ))
}

/// The verified session of the current request.
#[derive(Debug, Clone)]
pub struct Session(pub VerifiedToken);

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AuthApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VerifiedToken>()
            .cloned()
            .map(Session)
            .ok_or_else(|| AuthApiError::Unauthorized("No authorization token provided".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::routing::get;
    use dfood_adapters::{BearerTokenValidator, DashMapRevocationStore, JwtConfig, JwtTokenService};
    use dfood_core::{Email, TokenKind, TokenService};
    use reqwest::StatusCode;
    use secrecy::Secret;
    use tokio::net::TcpListener;

    use super::*;

    type Tokens = Arc<JwtTokenService<DashMapRevocationStore>>;

    async fn whoami(Session(session): Session) -> String {
        session.subject.as_str().to_owned()
    }

    async fn spawn_app() -> (String, Tokens) {
        let tokens: Tokens = Arc::new(JwtTokenService::new(
            JwtConfig::new(Secret::from("gate-secret".to_owned())),
            DashMapRevocationStore::new(),
        ));
        let validator = BearerTokenValidator::new(tokens.clone(), "access_token");
        let app = protect(Router::new().route("/me", get(whoami)), validator);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (address, tokens)
    }

    fn alice() -> Email {
        Email::try_from(Secret::from("alice@example.com".to_owned())).unwrap()
    }

    #[tokio::test]
    async fn request_without_token_is_rejected() {
        let (address, _) = spawn_app().await;

        let response = reqwest::get(format!("{address}/me")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "No authorization token provided");
    }

    #[tokio::test]
    async fn valid_bearer_token_reaches_handler() {
        let (address, tokens) = spawn_app().await;
        let token = tokens.issue(&alice(), TokenKind::Access).await.unwrap();

        let response = reqwest::Client::new()
            .get(format!("{address}/me"))
            .bearer_auth(token.as_str())
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "alice@example.com");
    }

    #[tokio::test]
    async fn session_cookie_is_accepted() {
        let (address, tokens) = spawn_app().await;
        let token = tokens.issue(&alice(), TokenKind::Access).await.unwrap();

        let response = reqwest::Client::new()
            .get(format!("{address}/me"))
            .header("cookie", format!("access_token={}", token.as_str()))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() {
        let (address, tokens) = spawn_app().await;
        let token = tokens.issue(&alice(), TokenKind::Access).await.unwrap();
        tokens.revoke(&token).await.unwrap();

        let response = reqwest::Client::new()
            .get(format!("{address}/me"))
            .bearer_auth(token.as_str())
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let (address, _) = spawn_app().await;

        let response = reqwest::Client::new()
            .get(format!("{address}/me"))
            .bearer_auth("not-a-jwt")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
