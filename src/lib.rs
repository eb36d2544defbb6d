//! # dfood - authentication and session trust for the food-delivery backend
//!
//! Facade crate re-exporting the public API of the workspace crates.
//!
//! ## Structure
//!
//! - **Core domain types**: `Email`, `Password`, `User`, `SessionToken`, ...
//! - **Ports**: `UserStore`, `RevocationStore`, `PasswordHasher`, `TokenService`
//! - **Use cases**: `RegisterUseCase`, `LoginUseCase`, ... behind `AuthOrchestrator`
//! - **Adapters**: `JwtTokenService`, `Argon2PasswordHasher`, `PostgresUserStore`,
//!   `RedisRevocationStore`, ...
//! - **Gate**: `protect` / `Session` for axum routers, `rate_limit` per client IP
//! - **Service**: `AuthService`, the runtime wiring of all of the above

// ============================================================================
// Core Domain Types
// ============================================================================

/// Core domain types and value objects
pub mod core {
    pub use dfood_core::*;
}

pub use dfood_core::{
    AuthErrorKind, Clock, Email, HasErrorKind, HashedPassword, ManualClock, Password,
    PublicUser, SessionToken, SystemClock, TokenKind, TokenPair, User, UserError, UserId,
    UserProfile, VerifiedToken,
};

// ============================================================================
// Ports
// ============================================================================

pub use dfood_core::{
    AuthValidator, PasswordHashError, PasswordHasher, RevocationStore, RevocationStoreError,
    TokenError, TokenService, UserStore, UserStoreError,
};

// ============================================================================
// Use Cases (Application Layer)
// ============================================================================

/// Application use cases
pub mod use_cases {
    pub use dfood_application::*;
}

pub use dfood_application::{
    AuthOrchestrator, DeleteAccountError, LoginError, LoginResponse, LogoutError,
    RegisterError, RegisterRequest, UpdatePasswordError,
};

// ============================================================================
// Adapters (Infrastructure)
// ============================================================================

/// Infrastructure adapters
pub mod adapters {
    pub use dfood_adapters::*;
}

pub use dfood_adapters::{
    Argon2PasswordHasher, AuthServiceSetting, BearerTokenValidator, DashMapRevocationStore,
    GateError, HashMapUserStore, HashingParams, JwtConfig, JwtTokenService, PostgresUserStore,
    RedisRevocationStore,
};

// ============================================================================
// HTTP Gate
// ============================================================================

pub use dfood_axum::{AuthApiError, ErrorResponse, RateLimiter, Session, protect, rate_limit};

// ============================================================================
// Auth Service (Main Entry Point)
// ============================================================================

pub use dfood_auth_service::{
    AuthService, InMemoryAuthService, PersistentAuthService, configure_postgresql,
    configure_redis, init_tracing, spawn_revocation_sweeper,
};

// ============================================================================
// Re-export common external dependencies
// ============================================================================

/// Re-export async-trait for implementing the ports
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};

pub use http;
