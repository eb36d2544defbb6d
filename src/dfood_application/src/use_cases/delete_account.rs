use dfood_core::{
    AuthErrorKind, Email, HasErrorKind, SessionToken, TokenError, TokenService, UserError,
    UserStore, UserStoreError,
};

/// Error types specific to delete account use case
#[derive(Debug, thiserror::Error)]
pub enum DeleteAccountError {
    #[error("{0}")]
    InvalidInput(#[from] UserError),
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),
    #[error("Token does not belong to this account")]
    SubjectMismatch,
    #[error("User store error: {0}")]
    UserStoreError(#[from] UserStoreError),
}

impl HasErrorKind for DeleteAccountError {
    fn kind(&self) -> AuthErrorKind {
        match self {
            DeleteAccountError::InvalidInput(_) => AuthErrorKind::BadRequest,
            DeleteAccountError::InvalidToken(e) => e.kind(),
            DeleteAccountError::SubjectMismatch => AuthErrorKind::Forbidden,
            DeleteAccountError::UserStoreError(e) => e.kind(),
        }
    }
}

/// Delete account use case - removes a user after revoking their sessions
pub struct DeleteAccountUseCase<'a, U, T>
where
    U: UserStore,
    T: TokenService,
{
    user_store: &'a U,
    token_service: &'a T,
}

impl<'a, U, T> DeleteAccountUseCase<'a, U, T>
where
    U: UserStore,
    T: TokenService,
{
    pub fn new(user_store: &'a U, token_service: &'a T) -> Self {
        Self {
            user_store,
            token_service,
        }
    }

    #[tracing::instrument(name = "DeleteAccountUseCase::execute", skip(self, token))]
    pub async fn execute(
        &self,
        email: Email,
        token: SessionToken,
    ) -> Result<(), DeleteAccountError> {
        let verified = self.token_service.verify(&token).await?;
        if verified.subject != email {
            return Err(DeleteAccountError::SubjectMismatch);
        }

        self.user_store.find_by_email(&email).await?;

        // The record goes first: a failed delete must leave the session usable
        // for a retry.
        self.user_store.delete(&email).await?;
        tracing::info!("account deleted");

        if let Err(e) = self.token_service.revoke(&token).await {
            tracing::error!(error = %e, "account deleted but its session token was not revoked");
        }
        match self.token_service.revoke_all_for_subject(&email).await {
            Ok(count) => tracing::debug!(count, "revocations re-asserted for subject"),
            Err(e) => tracing::warn!(error = %e, "failed to revoke remaining sessions"),
        }

        Ok(())
    }
}
