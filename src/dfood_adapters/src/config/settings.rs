use std::num::NonZeroU32;

use chrono::Duration;
use config::{Config, ConfigError, Environment, File, FileFormat, builder::DefaultState};
use http::HeaderValue;
use secrecy::Secret;
use serde::{Deserialize, Deserializer, de};

use super::constants::{
    CONFIG_DIR, DEFAULT_APP_ENV, DEFAULT_POSTGRES_MAX_CONNECTIONS,
    DEFAULT_REVOCATION_SWEEP_INTERVAL_IN_SECS, DEFAULT_SESSION_COOKIE_NAME, ENV_PREFIX, env,
};
use crate::{auth_validation::jwt_token_service::JwtConfig, hashing::argon2_hasher::HashingParams};

#[derive(Debug, Clone, Deserialize)]
pub struct AuthServiceSetting {
    pub auth: AuthSettings,
    #[serde(default)]
    pub postgres: Option<PostgresSettings>,
    #[serde(default)]
    pub redis: Option<RedisSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt: JwtSettings,
    #[serde(default = "default_session_cookie_name")]
    pub session_cookie_name: String,
    #[serde(default)]
    pub password_hashing: HashingParams,
    #[serde(default = "default_revocation_sweep_interval")]
    pub revocation_sweep_interval_in_secs: u64,
    /// Browser origins allowed to call with credentials. No CORS layer when unset.
    #[serde(default)]
    pub allowed_origins: Option<AllowedOrigins>,
    /// Requests per minute per client IP. No limit when unset.
    #[serde(default)]
    pub rate_limit_per_minute: Option<NonZeroU32>,
}

/// Origins accepted by the CORS layer, already parsed into header values.
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins(Vec<HeaderValue>);

impl AllowedOrigins {
    pub fn contains(&self, origin: &HeaderValue) -> bool {
        self.0.contains(origin)
    }
}

impl<'de> Deserialize<'de> for AllowedOrigins {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin.trim_end_matches('/'))
                    .map_err(|_| de::Error::custom(format!("invalid origin `{origin}`")))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    pub secret: Secret<String>,
    #[serde(default = "default_access_ttl")]
    pub access_ttl_in_seconds: i64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_in_seconds: i64,
}

impl JwtSettings {
    pub fn to_jwt_config(&self) -> Result<JwtConfig, ConfigError> {
        Ok(JwtConfig {
            secret: self.secret.clone(),
            access_ttl: positive_ttl(
                "auth.jwt.access_ttl_in_seconds",
                self.access_ttl_in_seconds,
            )?,
            refresh_ttl: positive_ttl(
                "auth.jwt.refresh_ttl_in_seconds",
                self.refresh_ttl_in_seconds,
            )?,
        })
    }
}

fn positive_ttl(key: &str, seconds: i64) -> Result<Duration, ConfigError> {
    if seconds <= 0 {
        return Err(ConfigError::Message(format!("{key} must be positive, got {seconds}")));
    }
    Duration::try_seconds(seconds)
        .ok_or_else(|| ConfigError::Message(format!("{key} is out of range: {seconds}")))
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresSettings {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    pub host_name: String,
}

impl AuthServiceSetting {
    /// Layered load: `.env`, `config/base.json`, `config/<APP_ENV>.json`,
    /// `DFOOD__*` variables, then the plain `JWT_SECRET` / `DATABASE_URL` /
    /// `REDIS_HOST_NAME` overrides.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let app_env =
            std::env::var(env::APP_ENV_ENV_VAR).unwrap_or_else(|_| DEFAULT_APP_ENV.to_owned());

        let settings: Self = Self::builder(&app_env)?.build()?.try_deserialize()?;
        settings.auth.jwt.to_jwt_config()?;
        tracing::debug!(app_env = %app_env, "configuration loaded");
        Ok(settings)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = Config::builder()
            .add_source(File::from_str(json, FileFormat::Json))
            .build()?
            .try_deserialize()?;
        settings.auth.jwt.to_jwt_config()?;
        Ok(settings)
    }

    fn builder(app_env: &str) -> Result<config::ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .add_source(File::with_name(&format!("{CONFIG_DIR}/base")).required(false))
            .add_source(File::with_name(&format!("{CONFIG_DIR}/{app_env}")).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("auth.jwt.secret", std::env::var(env::JWT_SECRET_ENV_VAR).ok())?
            .set_override_option("postgres.url", std::env::var(env::DATABASE_URL_ENV_VAR).ok())?
            .set_override_option(
                "redis.host_name",
                std::env::var(env::REDIS_HOST_NAME_ENV_VAR).ok(),
            )
    }

    pub fn revocation_sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.auth.revocation_sweep_interval_in_secs)
    }
}

fn default_session_cookie_name() -> String {
    DEFAULT_SESSION_COOKIE_NAME.to_owned()
}

fn default_revocation_sweep_interval() -> u64 {
    DEFAULT_REVOCATION_SWEEP_INTERVAL_IN_SECS
}

fn default_access_ttl() -> i64 {
    900
}

fn default_refresh_ttl() -> i64 {
    604_800
}

fn default_max_connections() -> u32 {
    DEFAULT_POSTGRES_MAX_CONNECTIONS
}
