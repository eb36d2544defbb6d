pub mod constants;
pub mod settings;

pub use constants::*;
pub use settings::{
    AllowedOrigins, AuthServiceSetting, AuthSettings, JwtSettings, PostgresSettings, RedisSettings,
};
