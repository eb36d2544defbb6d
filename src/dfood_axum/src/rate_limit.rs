use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Instant,
};

use axum::{
    Router,
    extract::{ConnectInfo, Request, State},
    middleware::{self, Next},
    response::Response,
};
use dashmap::DashMap;

use crate::error::AuthApiError;

/// Per-client token bucket limiter, keyed by peer IP.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    buckets: Arc<DashMap<IpAddr, TokenBucket>>,
    capacity: f64,
    refill_per_sec: f64,
}

#[derive(Debug, Clone, Copy)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Allow bursts of `requests` and refill at the same number per minute.
    pub fn per_minute(requests: NonZeroU32) -> Self {
        let capacity = f64::from(requests.get());
        Self {
            buckets: Arc::new(DashMap::new()),
            capacity,
            refill_per_sec: capacity / 60.0,
        }
    }

    /// Take one token for `client`. `false` means the request should be
    /// turned away.
    pub fn check(&self, client: IpAddr) -> bool {
        let now = Instant::now();
        let mut bucket = self.buckets.entry(client).or_insert(TokenBucket {
            tokens: self.capacity,
            last_refill: now,
        });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Middleware answering `429 Too Many Requests` once a client has used up
/// its bucket.
///
/// The client is the peer address from [`ConnectInfo`]. Servers started
/// without `into_make_service_with_connect_info` put every caller in one
/// shared bucket.
pub async fn limit_by_ip(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, AuthApiError> {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if !limiter.check(client) {
        tracing::warn!(%client, "rate limit exceeded");
        return Err(AuthApiError::TooManyRequests);
    }

    Ok(next.run(request).await)
}

/// Put every route of `router` behind [`limit_by_ip`].
pub fn rate_limit<S>(router: Router<S>, limiter: RateLimiter) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(limiter, limit_by_ip))
}
