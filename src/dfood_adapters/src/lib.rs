pub mod auth_validation;
pub mod config;
pub mod hashing;
pub mod persistence;

pub use auth_validation::{
    bearer_validator::{BearerTokenValidator, GateError, extract_token},
    jwt_token_service::{JwtConfig, JwtTokenService},
};
pub use self::config::AuthServiceSetting;
pub use hashing::argon2_hasher::{Argon2PasswordHasher, HashingParams};
pub use persistence::{
    dashmap_revocation_store::DashMapRevocationStore, hashmap_user_store::HashMapUserStore,
    postgres_user_store::PostgresUserStore, redis_revocation_store::RedisRevocationStore,
};
