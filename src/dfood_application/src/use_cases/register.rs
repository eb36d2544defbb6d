use chrono::Utc;
use dfood_core::{
    AuthErrorKind, Email, HasErrorKind, Password, PasswordHashError, PasswordHasher, PublicUser,
    User, UserError, UserId, UserProfile, UserStore, UserStoreError,
};

/// Error types specific to register use case
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("{0}")]
    InvalidInput(#[from] UserError),
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("User store error: {0}")]
    UserStoreError(UserStoreError),
    #[error("Password hashing error: {0}")]
    HashingError(#[from] PasswordHashError),
}

impl From<UserStoreError> for RegisterError {
    fn from(value: UserStoreError) -> Self {
        match value {
            UserStoreError::UserAlreadyExists => RegisterError::UserAlreadyExists,
            other => RegisterError::UserStoreError(other),
        }
    }
}

impl HasErrorKind for RegisterError {
    fn kind(&self) -> AuthErrorKind {
        match self {
            RegisterError::InvalidInput(_) => AuthErrorKind::BadRequest,
            RegisterError::UserAlreadyExists => AuthErrorKind::Conflict,
            RegisterError::UserStoreError(e) => e.kind(),
            RegisterError::HashingError(_) => AuthErrorKind::Internal,
        }
    }
}

/// Register use case - creates a user record with a hashed password
pub struct RegisterUseCase<'a, U, H>
where
    U: UserStore,
    H: PasswordHasher,
{
    user_store: &'a U,
    hasher: &'a H,
}

impl<'a, U, H> RegisterUseCase<'a, U, H>
where
    U: UserStore,
    H: PasswordHasher,
{
    pub fn new(user_store: &'a U, hasher: &'a H) -> Self {
        Self { user_store, hasher }
    }

    /// Register a new user. A missing `id` is generated.
    ///
    /// The existence check is only a fast path; the store's insert decides
    /// uniqueness, so a concurrent duplicate still ends in
    /// [`RegisterError::UserAlreadyExists`].
    #[tracing::instrument(name = "RegisterUseCase::execute", skip(self, password, profile))]
    pub async fn execute(
        &self,
        email: Email,
        password: Password,
        profile: UserProfile,
        id: Option<UserId>,
    ) -> Result<PublicUser, RegisterError> {
        password.check_policy()?;

        if self.user_store.exists_by_email(&email).await? {
            return Err(RegisterError::UserAlreadyExists);
        }

        let password_hash = self.hasher.hash(&password).await?;
        let id = id.unwrap_or_else(UserId::generate);
        let user = User::new(id, email, password_hash, profile, Utc::now());
        let public = user.to_public();

        self.user_store.insert(user).await?;
        tracing::info!(user_id = %public.id, "user registered");

        Ok(public)
    }
}
