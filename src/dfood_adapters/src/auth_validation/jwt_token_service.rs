use async_trait::async_trait;
use chrono::{DateTime, Duration};
use dfood_core::{
    Clock, Email, RevocationEntry, RevocationStore, SessionToken, SystemClock, TokenError,
    TokenKind, TokenService, VerifiedToken,
};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
    errors::ErrorKind,
};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize, ser::SerializeStruct};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl JwtConfig {
    /// Config with the standard 15 minute / 7 day lifetimes.
    pub fn new(secret: Secret<String>) -> Self {
        Self {
            secret,
            access_ttl: TokenKind::Access.default_ttl(),
            refresh_ttl: TokenKind::Refresh.default_ttl(),
        }
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }
}

/// HS256 session tokens checked against a revocation list.
///
/// The signing secret sits behind an async `RwLock`. Verification and
/// revocation hold the read guard for their whole check-then-write against
/// the revocation store; rotation holds the write guard while it swaps the
/// secret and clears the store.
pub struct JwtTokenService<R, C = SystemClock> {
    secret: RwLock<Secret<String>>,
    access_ttl: Duration,
    refresh_ttl: Duration,
    revocations: R,
    clock: C,
}

impl<R: RevocationStore> JwtTokenService<R, SystemClock> {
    pub fn new(config: JwtConfig, revocations: R) -> Self {
        Self::with_clock(config, revocations, SystemClock)
    }
}

impl<R: RevocationStore, C: Clock> JwtTokenService<R, C> {
    pub fn with_clock(config: JwtConfig, revocations: R, clock: C) -> Self {
        Self {
            access_ttl: config.ttl(TokenKind::Access),
            refresh_ttl: config.ttl(TokenKind::Refresh),
            secret: RwLock::new(config.secret),
            revocations,
            clock,
        }
    }

    pub fn revocations(&self) -> &R {
        &self.revocations
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Full check under an already held secret guard.
    async fn verify_with(
        &self,
        secret: &Secret<String>,
        token: &str,
    ) -> Result<VerifiedToken, TokenError> {
        if self.revocations.is_revoked(token).await? {
            return Err(TokenError::Revoked);
        }

        let claims = decode_claims(token, secret)?;
        let subject =
            Email::try_from(claims.sub).map_err(|e| TokenError::Malformed(e.to_string()))?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| TokenError::Malformed("exp out of range".to_owned()))?;

        if expires_at < self.clock.now() {
            return Err(TokenError::Expired);
        }

        Ok(VerifiedToken {
            subject,
            kind: claims.kind,
            expires_at,
        })
    }
}

#[async_trait]
impl<R: RevocationStore, C: Clock> TokenService for JwtTokenService<R, C> {
    #[tracing::instrument(name = "JwtTokenService::issue", skip(self))]
    async fn issue(&self, subject: &Email, kind: TokenKind) -> Result<SessionToken, TokenError> {
        let now = self.clock.now();
        let exp = now
            .checked_add_signed(self.ttl(kind))
            .ok_or_else(|| TokenError::Unexpected("Duration out of range".to_owned()))?;

        let claims = Claims {
            sub: Secret::from(subject.as_str().to_owned()),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            kind,
            jti: Uuid::new_v4().to_string(),
        };

        let secret = self.secret.read().await;
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
        )
        .map(SessionToken::new)
        .map_err(|e| TokenError::Unexpected(e.to_string()))
    }

    async fn verify(&self, token: &SessionToken) -> Result<VerifiedToken, TokenError> {
        let secret = self.secret.read().await;
        self.verify_with(&secret, token.as_str()).await
    }

    #[tracing::instrument(name = "JwtTokenService::revoke", skip_all)]
    async fn revoke(&self, token: &SessionToken) -> Result<(), TokenError> {
        let secret = self.secret.read().await;
        let verified = match self.verify_with(&secret, token.as_str()).await {
            Ok(verified) => verified,
            Err(TokenError::Revoked) => return Ok(()),
            Err(e) => return Err(e),
        };

        self.revocations
            .revoke(
                token.as_str(),
                RevocationEntry {
                    subject: verified.subject.as_str().to_owned(),
                    expires_at: verified.expires_at,
                },
            )
            .await?;

        Ok(())
    }

    #[tracing::instrument(name = "JwtTokenService::revoke_all_for_subject", skip(self))]
    async fn revoke_all_for_subject(&self, subject: &Email) -> Result<usize, TokenError> {
        let _secret = self.secret.read().await;
        let tokens = self.revocations.tokens_for_subject(subject.as_str()).await?;
        let count = tokens.len();

        for (token, entry) in tokens {
            self.revocations.revoke(&token, entry).await?;
        }

        tracing::warn!(
            count,
            "only tokens already on the revocation list were re-asserted"
        );
        Ok(count)
    }

    #[tracing::instrument(name = "JwtTokenService::rotate_secret", skip_all)]
    async fn rotate_secret(&self, new_secret: Secret<String>) -> Result<(), TokenError> {
        let mut secret = self.secret.write().await;
        *secret = new_secret;
        if self.revocations.is_shared() {
            tracing::debug!("shared revocation list kept; entries expire on their own");
        } else {
            self.revocations.clear().await?;
        }

        tracing::info!("signing secret rotated");
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, TokenError> {
        let removed = self.revocations.purge_expired(self.clock.now()).await?;
        Ok(removed)
    }
}

fn decode_claims(token: &str, secret: &Secret<String>) -> Result<Claims, TokenError> {
    decode_header(token).map_err(|e| TokenError::Malformed(e.to_string()))?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["exp", "sub"]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
        _ => TokenError::Malformed(e.to_string()),
    })
}

#[derive(Debug, Deserialize, Clone)]
struct Claims {
    sub: Secret<String>,
    exp: i64,
    iat: i64,
    kind: TokenKind,
    jti: String,
}

impl Serialize for Claims {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("Claims", 5)?;
        state.serialize_field("sub", self.sub.expose_secret())?;
        state.serialize_field("exp", &self.exp)?;
        state.serialize_field("iat", &self.iat)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("jti", &self.jti)?;
        state.end()
    }
}
