pub mod clock;
pub mod domain;
pub mod error;
pub mod ports;
pub mod strategies;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};

pub use domain::{
    email::Email,
    hashed_password::HashedPassword,
    password::{MIN_PASSWORD_LENGTH, Password},
    token::{RevocationEntry, SessionToken, TokenKind, TokenPair, VerifiedToken},
    user::{PublicUser, User, UserError, UserProfile},
    user_id::UserId,
};

pub use error::{AuthErrorKind, HasErrorKind};

pub use ports::{
    repositories::{RevocationStore, RevocationStoreError, UserStore, UserStoreError},
    services::{PasswordHashError, PasswordHasher, TokenError, TokenService},
};

pub use strategies::auth_validator::AuthValidator;
