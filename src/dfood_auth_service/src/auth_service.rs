use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, request},
};
use color_eyre::eyre::{Result, eyre};
use dfood_adapters::{
    Argon2PasswordHasher, AuthServiceSetting, BearerTokenValidator, DashMapRevocationStore,
    HashMapUserStore, JwtTokenService, PostgresUserStore, RedisRevocationStore,
    config::{AllowedOrigins, AuthSettings},
};
use dfood_application::AuthOrchestrator;
use dfood_axum::RateLimiter;
use dfood_core::{PasswordHasher, TokenService, UserStore};
use tokio::task::JoinHandle;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    helpers::{configure_postgresql, configure_redis},
    sweeper::spawn_revocation_sweeper,
    tracing::{make_span_with_request_id, on_request, on_response},
};

pub type InMemoryAuthService =
    AuthService<HashMapUserStore, Argon2PasswordHasher, Arc<JwtTokenService<DashMapRevocationStore>>>;

pub type PersistentAuthService =
    AuthService<PostgresUserStore, Argon2PasswordHasher, Arc<JwtTokenService<RedisRevocationStore>>>;

/// Runtime wiring of the authentication core.
///
/// Holds the orchestrator for account operations, hands out the request gate
/// for caller routers and owns the background revocation sweep.
pub struct AuthService<U, H, T>
where
    U: UserStore,
    H: PasswordHasher,
    T: TokenService + Clone + 'static,
{
    orchestrator: Arc<AuthOrchestrator<U, H, T>>,
    token_service: T,
    session_cookie_name: String,
    sweep_interval: Duration,
    allowed_origins: Option<AllowedOrigins>,
    rate_limiter: Option<RateLimiter>,
}

impl<U, H, T> AuthService<U, H, T>
where
    U: UserStore,
    H: PasswordHasher,
    T: TokenService + Clone + 'static,
{
    pub fn new(user_store: U, hasher: H, token_service: T, settings: &AuthSettings) -> Self {
        Self {
            orchestrator: Arc::new(AuthOrchestrator::new(
                user_store,
                hasher,
                token_service.clone(),
            )),
            token_service,
            session_cookie_name: settings.session_cookie_name.clone(),
            sweep_interval: Duration::from_secs(settings.revocation_sweep_interval_in_secs),
            allowed_origins: settings.allowed_origins.clone(),
            rate_limiter: settings.rate_limit_per_minute.map(RateLimiter::per_minute),
        }
    }

    pub fn orchestrator(&self) -> Arc<AuthOrchestrator<U, H, T>> {
        self.orchestrator.clone()
    }

    pub fn token_service(&self) -> &T {
        &self.token_service
    }

    pub fn validator(&self) -> BearerTokenValidator<T> {
        BearerTokenValidator::new(self.token_service.clone(), self.session_cookie_name.clone())
    }

    /// Put `router` behind the session gate and wrap it in request tracing.
    ///
    /// When configured, a per-IP rate limit runs before the gate and a CORS
    /// layer answers preflight requests before either of them. Handlers can
    /// take `dfood_axum::Session` to read the verified claims.
    pub fn protect<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let mut router = dfood_axum::protect(router, self.validator());

        if let Some(limiter) = self.rate_limiter.clone() {
            router = dfood_axum::rate_limit(router, limiter);
        }

        if let Some(allowed_origins) = self.allowed_origins.clone() {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(
                    move |origin: &HeaderValue, _request_parts: &request::Parts| {
                        allowed_origins.contains(origin)
                    },
                ));
            router = router.layer(cors);
        }

        router.layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span_with_request_id)
                .on_request(on_request)
                .on_response(on_response),
        )
    }

    /// Start the periodic purge of expired revocation entries.
    pub fn start_revocation_sweeper(&self) -> JoinHandle<()> {
        tracing::info!(
            interval_in_secs = self.sweep_interval.as_secs(),
            "starting revocation sweeper"
        );
        spawn_revocation_sweeper(self.token_service.clone(), self.sweep_interval)
    }
}

impl InMemoryAuthService {
    /// Process-local stores. Revocations are lost on restart.
    pub fn in_memory(settings: &AuthServiceSetting) -> Result<Self> {
        let auth = &settings.auth;
        let hasher = Argon2PasswordHasher::new(auth.password_hashing)?;
        let token_service = Arc::new(JwtTokenService::new(
            auth.jwt.to_jwt_config()?,
            DashMapRevocationStore::new(),
        ));

        Ok(Self::new(HashMapUserStore::new(), hasher, token_service, auth))
    }
}

impl PersistentAuthService {
    /// PostgreSQL credentials and a Redis revocation list shared between
    /// instances. Both sections must be configured.
    pub async fn connect(settings: &AuthServiceSetting) -> Result<Self> {
        let postgres = settings
            .postgres
            .as_ref()
            .ok_or_else(|| eyre!("missing `postgres` configuration"))?;
        let redis = settings
            .redis
            .as_ref()
            .ok_or_else(|| eyre!("missing `redis` configuration"))?;

        let pg_pool = configure_postgresql(postgres).await?;
        let redis_conn = configure_redis(redis)?;

        let auth = &settings.auth;
        let hasher = Argon2PasswordHasher::new(auth.password_hashing)?;
        let token_service = Arc::new(JwtTokenService::new(
            auth.jwt.to_jwt_config()?,
            RedisRevocationStore::new(redis_conn),
        ));

        tracing::info!("auth service connected to postgres and redis");
        Ok(Self::new(
            PostgresUserStore::new(pg_pool),
            hasher,
            token_service,
            auth,
        ))
    }
}
