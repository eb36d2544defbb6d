//! Runtime wiring for the dfood authentication core.
//!
//! [`AuthService`] assembles stores, hasher and token service from
//! [`AuthServiceSetting`](dfood_adapters::AuthServiceSetting), protects
//! caller routers with the session gate and runs the revocation sweeper.

pub mod auth_service;
pub mod helpers;
pub mod sweeper;
pub mod tracing;

pub use auth_service::{AuthService, InMemoryAuthService, PersistentAuthService};
pub use helpers::{configure_postgresql, configure_redis, get_postgres_pool, get_redis_client};
pub use sweeper::spawn_revocation_sweeper;
pub use crate::tracing::{init_tracing, make_span_with_request_id, on_request, on_response};
