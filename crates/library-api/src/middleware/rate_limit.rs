//! Per-IP rate limiting for the login callback

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

type KeyedLimiter<C> =
    RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Keyed limiter that keeps one entry per client IP until [`purge`](Self::purge)
/// drops the idle ones.
pub struct IpRateLimiter<C: Clock = DefaultClock> {
    inner: Arc<KeyedLimiter<C>>,
}

impl<C: Clock> Clone for IpRateLimiter<C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl IpRateLimiter {
    pub fn per_minute(requests: u32) -> Self {
        Self::with_clock(requests, DefaultClock::default())
    }
}

impl<C: Clock> IpRateLimiter<C> {
    pub fn with_clock(requests: u32, clock: C) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN));
        Self { inner: Arc::new(RateLimiter::new(quota, DefaultKeyedStateStore::default(), clock)) }
    }

    pub fn check(&self, ip: IpAddr) -> bool {
        self.inner.check_key(&ip).is_ok()
    }

    /// Drops clients whose quota has fully replenished.
    pub fn purge(&self) {
        let before = self.inner.len();
        self.inner.retain_recent();
        self.inner.shrink_to_fit();
        debug!(before, after = self.inner.len(), "Purged idle rate limit entries");
    }

    /// Number of client IPs currently tracked.
    pub fn tracked(&self) -> usize {
        self.inner.len()
    }
}

/// Try ConnectInfo first, then X-Forwarded-For, then X-Real-IP.
fn client_ip(req: &Request) -> IpAddr {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip();
    }

    let header_ip = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    header_ip("x-forwarded-for")
        .or_else(|| header_ip("x-real-ip"))
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn auth_rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let ip = client_ip(&req);
    if !state.auth_limiter.check(ip) {
        warn!(ip = %ip, "Rate limit exceeded");
        return ApiError::RateLimited.into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use governor::clock::FakeRelativeClock;
    use std::time::Duration;

    #[test]
    fn test_limiter_allows_quota_then_blocks() {
        let limiter = IpRateLimiter::per_minute(3);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();

        for _ in 0..3 {
            assert!(limiter.check(ip));
        }
        assert!(!limiter.check(ip));
    }

    #[test]
    fn test_limiter_is_per_ip() {
        let limiter = IpRateLimiter::per_minute(1);
        let ip1: IpAddr = "10.0.0.1".parse().unwrap();
        let ip2: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check(ip1));
        assert!(!limiter.check(ip1));
        assert!(limiter.check(ip2));
    }

    #[test]
    fn test_purge_drops_clients_after_quota_window() {
        let clock = FakeRelativeClock::default();
        let limiter = IpRateLimiter::with_clock(5, clock.clone());

        for n in 0..10_000u32 {
            assert!(limiter.check(IpAddr::V4(Ipv4Addr::from(n))));
        }
        assert_eq!(limiter.tracked(), 10_000);

        // still inside the window: nothing is forgotten
        limiter.purge();
        assert_eq!(limiter.tracked(), 10_000);

        clock.advance(Duration::from_secs(60));
        limiter.purge();
        assert_eq!(limiter.tracked(), 0);
    }

    #[test]
    fn test_purge_keeps_blocked_client_blocked() {
        let clock = FakeRelativeClock::default();
        let limiter = IpRateLimiter::with_clock(1, clock.clone());
        let ip: IpAddr = "10.0.0.7".parse().unwrap();

        assert!(limiter.check(ip));
        assert!(!limiter.check(ip));

        clock.advance(Duration::from_secs(10));
        limiter.purge();
        assert_eq!(limiter.tracked(), 1);
        assert!(!limiter.check(ip));
    }
}
