use dfood_core::{
    AuthErrorKind, Email, HasErrorKind, Password, PasswordHashError, PasswordHasher, PublicUser,
    TokenError, TokenKind, TokenPair, TokenService, UserError, UserStore, UserStoreError,
};
use serde::Serialize;

/// Response from login use case
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: PublicUser,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Error types specific to login use case
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("{0}")]
    InvalidInput(#[from] UserError),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User store error: {0}")]
    UserStoreError(#[from] UserStoreError),
    #[error("Password hashing error: {0}")]
    HashingError(#[from] PasswordHashError),
    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl HasErrorKind for LoginError {
    fn kind(&self) -> AuthErrorKind {
        match self {
            LoginError::InvalidInput(_) => AuthErrorKind::BadRequest,
            LoginError::InvalidCredentials => AuthErrorKind::Unauthorized,
            LoginError::UserStoreError(e) => e.kind(),
            LoginError::HashingError(_) | LoginError::TokenError(_) => AuthErrorKind::Internal,
        }
    }
}

/// Login use case - checks credentials and issues an access/refresh pair
pub struct LoginUseCase<'a, U, H, T>
where
    U: UserStore,
    H: PasswordHasher,
    T: TokenService,
{
    user_store: &'a U,
    hasher: &'a H,
    token_service: &'a T,
}

impl<'a, U, H, T> LoginUseCase<'a, U, H, T>
where
    U: UserStore,
    H: PasswordHasher,
    T: TokenService,
{
    pub fn new(user_store: &'a U, hasher: &'a H, token_service: &'a T) -> Self {
        Self {
            user_store,
            hasher,
            token_service,
        }
    }

    /// Unknown email and wrong password fail identically, and both paths pay
    /// for one hash evaluation.
    #[tracing::instrument(name = "LoginUseCase::execute", skip(self, password))]
    pub async fn execute(
        &self,
        email: Email,
        password: Password,
    ) -> Result<LoginResponse, LoginError> {
        let user = match self.user_store.find_by_email(&email).await {
            Ok(user) => user,
            Err(UserStoreError::UserNotFound) => {
                let _ = self.hasher.hash(&password).await;
                return Err(LoginError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        if !self.hasher.verify(user.password_hash(), &password).await? {
            tracing::debug!("password mismatch");
            return Err(LoginError::InvalidCredentials);
        }

        let tokens = TokenPair {
            access_token: self.token_service.issue(&email, TokenKind::Access).await?,
            refresh_token: self.token_service.issue(&email, TokenKind::Refresh).await?,
        };

        Ok(LoginResponse {
            user: user.to_public(),
            tokens,
        })
    }
}
