pub mod env {
    pub const APP_ENV_ENV_VAR: &str = "APP_ENV";
    pub const JWT_SECRET_ENV_VAR: &str = "JWT_SECRET";
    pub const DATABASE_URL_ENV_VAR: &str = "DATABASE_URL";
    pub const REDIS_HOST_NAME_ENV_VAR: &str = "REDIS_HOST_NAME";
}

pub const DEFAULT_APP_ENV: &str = "dev";
pub const ENV_PREFIX: &str = "DFOOD";
pub const CONFIG_DIR: &str = "config";

pub const DEFAULT_SESSION_COOKIE_NAME: &str = "access_token";
pub const DEFAULT_REVOCATION_SWEEP_INTERVAL_IN_SECS: u64 = 300;
pub const DEFAULT_POSTGRES_MAX_CONNECTIONS: u32 = 5;
