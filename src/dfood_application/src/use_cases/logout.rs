use dfood_core::{AuthErrorKind, HasErrorKind, SessionToken, TokenError, TokenService};

/// Error types specific to logout use case
#[derive(Debug, thiserror::Error)]
pub enum LogoutError {
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),
}

impl HasErrorKind for LogoutError {
    fn kind(&self) -> AuthErrorKind {
        match self {
            LogoutError::InvalidToken(e) => e.kind(),
        }
    }
}

/// Logout use case - revokes the presented session token
pub struct LogoutUseCase<'a, T>
where
    T: TokenService,
{
    token_service: &'a T,
}

impl<'a, T> LogoutUseCase<'a, T>
where
    T: TokenService,
{
    pub fn new(token_service: &'a T) -> Self {
        Self { token_service }
    }

    /// A token that no longer verifies, revoked ones included, is rejected.
    #[tracing::instrument(name = "LogoutUseCase::execute", skip_all)]
    pub async fn execute(&self, token: SessionToken) -> Result<(), LogoutError> {
        let verified = self.token_service.verify(&token).await?;
        self.token_service.revoke(&token).await?;

        tracing::debug!(kind = %verified.kind, "session token revoked");
        Ok(())
    }
}
