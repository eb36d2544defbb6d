use dfood_core::{
    AuthErrorKind, Email, HasErrorKind, Password, PasswordHashError, PasswordHasher, UserError,
    UserStore, UserStoreError,
};

/// Error types specific to update password use case
#[derive(Debug, thiserror::Error)]
pub enum UpdatePasswordError {
    #[error("{0}")]
    InvalidInput(#[from] UserError),
    #[error("Current password is incorrect")]
    IncorrectPassword,
    #[error("New password must differ from the current password")]
    PasswordUnchanged,
    #[error("User store error: {0}")]
    UserStoreError(#[from] UserStoreError),
    #[error("Password hashing error: {0}")]
    HashingError(#[from] PasswordHashError),
}

impl HasErrorKind for UpdatePasswordError {
    fn kind(&self) -> AuthErrorKind {
        match self {
            UpdatePasswordError::InvalidInput(_) | UpdatePasswordError::PasswordUnchanged => {
                AuthErrorKind::BadRequest
            }
            UpdatePasswordError::IncorrectPassword => AuthErrorKind::Unauthorized,
            UpdatePasswordError::UserStoreError(e) => e.kind(),
            UpdatePasswordError::HashingError(_) => AuthErrorKind::Internal,
        }
    }
}

/// Update password use case - replaces a user's password after re-checking the current one
pub struct UpdatePasswordUseCase<'a, U, H>
where
    U: UserStore,
    H: PasswordHasher,
{
    user_store: &'a U,
    hasher: &'a H,
}

impl<'a, U, H> UpdatePasswordUseCase<'a, U, H>
where
    U: UserStore,
    H: PasswordHasher,
{
    pub fn new(user_store: &'a U, hasher: &'a H) -> Self {
        Self { user_store, hasher }
    }

    #[tracing::instrument(
        name = "UpdatePasswordUseCase::execute",
        skip(self, current_password, new_password)
    )]
    pub async fn execute(
        &self,
        email: Email,
        current_password: Password,
        new_password: Password,
    ) -> Result<(), UpdatePasswordError> {
        let user = self.user_store.find_by_email(&email).await?;

        if !self
            .hasher
            .verify(user.password_hash(), &current_password)
            .await?
        {
            return Err(UpdatePasswordError::IncorrectPassword);
        }

        if self.hasher.verify(user.password_hash(), &new_password).await? {
            return Err(UpdatePasswordError::PasswordUnchanged);
        }

        new_password.check_policy()?;

        let password_hash = self.hasher.hash(&new_password).await?;
        self.user_store
            .update_password_hash(&email, password_hash)
            .await?;

        Ok(())
    }
}
