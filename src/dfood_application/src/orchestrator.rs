use dfood_core::{
    Email, Password, PasswordHasher, PublicUser, SessionToken, TokenError, TokenService, UserId,
    UserProfile, UserStore, VerifiedToken,
};
use secrecy::Secret;
use serde::Deserialize;

use crate::use_cases::{
    delete_account::{DeleteAccountError, DeleteAccountUseCase},
    login::{LoginError, LoginResponse, LoginUseCase},
    logout::{LogoutError, LogoutUseCase},
    register::{RegisterError, RegisterUseCase},
    update_password::{UpdatePasswordError, UpdatePasswordUseCase},
};

/// Raw registration input, before any validation.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Secret<String>,
    pub password: Secret<String>,
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(default)]
    pub id: Option<String>,
}

/// Entry point for every account and session operation.
///
/// Accepts raw caller input, parses it into domain values and delegates to
/// the matching use case.
pub struct AuthOrchestrator<U, H, T>
where
    U: UserStore,
    H: PasswordHasher,
    T: TokenService,
{
    user_store: U,
    hasher: H,
    token_service: T,
}

impl<U, H, T> AuthOrchestrator<U, H, T>
where
    U: UserStore,
    H: PasswordHasher,
    T: TokenService,
{
    pub fn new(user_store: U, hasher: H, token_service: T) -> Self {
        Self {
            user_store,
            hasher,
            token_service,
        }
    }

    pub fn user_store(&self) -> &U {
        &self.user_store
    }

    pub fn token_service(&self) -> &T {
        &self.token_service
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<PublicUser, RegisterError> {
        let email = Email::try_from(request.email)?;
        let password = Password::try_from(request.password)?;
        let id = request.id.map(UserId::parse).transpose()?;

        RegisterUseCase::new(&self.user_store, &self.hasher)
            .execute(email, password, request.profile, id)
            .await
    }

    pub async fn login(
        &self,
        email: Secret<String>,
        password: Secret<String>,
    ) -> Result<LoginResponse, LoginError> {
        let email = Email::try_from(email)?;
        let password = Password::try_from(password)?;

        LoginUseCase::new(&self.user_store, &self.hasher, &self.token_service)
            .execute(email, password)
            .await
    }

    pub async fn update_password(
        &self,
        email: Secret<String>,
        current_password: Secret<String>,
        new_password: Secret<String>,
    ) -> Result<(), UpdatePasswordError> {
        let email = Email::try_from(email)?;
        let current_password = Password::try_from(current_password)?;
        let new_password = Password::try_from(new_password)?;

        UpdatePasswordUseCase::new(&self.user_store, &self.hasher)
            .execute(email, current_password, new_password)
            .await
    }

    pub async fn logout(&self, token: Secret<String>) -> Result<(), LogoutError> {
        LogoutUseCase::new(&self.token_service)
            .execute(SessionToken::from(token))
            .await
    }

    pub async fn delete_account(
        &self,
        email: Secret<String>,
        token: Secret<String>,
    ) -> Result<(), DeleteAccountError> {
        let email = Email::try_from(email)?;

        DeleteAccountUseCase::new(&self.user_store, &self.token_service)
            .execute(email, SessionToken::from(token))
            .await
    }

    pub async fn verify(&self, token: Secret<String>) -> Result<VerifiedToken, TokenError> {
        self.token_service.verify(&SessionToken::from(token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockHasher, MockTokenService, MockUserStore};
    use dfood_core::{AuthErrorKind, HasErrorKind};

    fn secret(s: &str) -> Secret<String> {
        Secret::from(s.to_owned())
    }

    fn orchestrator() -> AuthOrchestrator<MockUserStore, MockHasher, MockTokenService> {
        AuthOrchestrator::new(
            MockUserStore::default(),
            MockHasher::default(),
            MockTokenService::default(),
        )
    }

    #[tokio::test]
    async fn register_request_deserializes_flat_profile() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"email":"alice@example.com","password":"secret1","first_name":"Alice"}"#,
        )
        .unwrap();

        let user = orchestrator().register(request).await.unwrap();

        assert_eq!(user.profile.first_name, "Alice");
        assert_eq!(user.profile.phone_number, "");
    }

    #[tokio::test]
    async fn malformed_email_is_bad_request_everywhere() {
        let auth = orchestrator();

        let register = auth
            .register(RegisterRequest {
                email: secret("not-an-email"),
                password: secret("secret1"),
                profile: UserProfile::default(),
                id: None,
            })
            .await
            .unwrap_err();
        let login = auth
            .login(secret("not-an-email"), secret("secret1"))
            .await
            .unwrap_err();
        let delete = auth
            .delete_account(secret("not-an-email"), secret("token"))
            .await
            .unwrap_err();

        assert_eq!(register.kind(), AuthErrorKind::BadRequest);
        assert_eq!(login.kind(), AuthErrorKind::BadRequest);
        assert_eq!(delete.kind(), AuthErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn blank_supplied_id_is_bad_request() {
        let err = orchestrator()
            .register(RegisterRequest {
                email: secret("alice@example.com"),
                password: secret("secret1"),
                profile: UserProfile::default(),
                id: Some("  ".into()),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), AuthErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn full_session_lifecycle() {
        let auth = orchestrator();
        auth.register(RegisterRequest {
            email: secret("alice@example.com"),
            password: secret("secret1"),
            profile: UserProfile::default(),
            id: None,
        })
        .await
        .unwrap();

        let login = auth
            .login(secret("alice@example.com"), secret("secret1"))
            .await
            .unwrap();
        let access = secret(login.tokens.access_token.as_str());

        let verified = auth.verify(access.clone()).await.unwrap();
        assert_eq!(verified.subject.as_str(), "alice@example.com");

        auth.logout(access.clone()).await.unwrap();
        assert_eq!(auth.verify(access).await, Err(TokenError::Revoked));
    }
}
