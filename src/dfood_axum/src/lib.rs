//! Axum integration for the dfood authentication core.
//!
//! The request gate ([`protect`], [`require_session`] and the [`Session`]
//! extractor), a per-IP [`RateLimiter`], and [`AuthApiError`], which turns
//! any error of the core into a JSON response with the matching status code.
//!
//! # Usage
//!
//! ```ignore
//! use dfood_axum::{Session, protect};
//!
//! async fn profile(Session(session): Session) -> String {
//!     session.subject.as_str().to_owned()
//! }
//!
//! let app = protect(Router::new().route("/profile", get(profile)), validator);
//! ```

pub mod error;
pub mod gate;
pub mod rate_limit;

pub use error::{AuthApiError, ErrorResponse};
pub use gate::{Session, protect, require_session};
pub use rate_limit::{RateLimiter, limit_by_ip, rate_limit};
