use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota};

use crate::{config::RateLimitConfig, error::AppError};

/// Tracked clients before idle entries are dropped.
const PRUNE_THRESHOLD: usize = 10_000;

/// Per-IP limiter: each client may burst up to `max_requests`, refilled
/// evenly across the window.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<DefaultKeyedRateLimiter<IpAddr>>,
}

pub fn quota_for(config: RateLimitConfig) -> Quota {
    let burst = NonZeroU32::new(config.max_requests).unwrap_or(NonZeroU32::MIN);
    let period = config.window / burst.get();
    Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            inner: Arc::new(governor::RateLimiter::keyed(quota_for(config))),
        }
    }

    /// Takes one request from the client's budget.
    pub fn allow(&self, ip: IpAddr) -> bool {
        if self.inner.len() > PRUNE_THRESHOLD {
            self.inner.retain_recent();
        }
        self.inner.check_key(&ip).is_ok()
    }
}

/// Rejects with 429 once an IP exceeds its budget. Requests without
/// connection info (e.g. in-process tests) are not limited.
pub async fn limit_by_ip(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if let Some(ip) = ip {
        if !limiter.allow(ip) {
            tracing::warn!(%ip, "rate limit exceeded");
            return AppError::TooManyRequests.into_response();
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn limiter(max_requests: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            window: Duration::from_secs(900),
            max_requests,
        })
    }

    #[test]
    fn blocks_once_the_burst_is_spent() {
        let limiter = limiter(3);
        let ip: IpAddr = "10.0.0.1".parse().unwrap();

        assert!(limiter.allow(ip));
        assert!(limiter.allow(ip));
        assert!(limiter.allow(ip));
        assert!(!limiter.allow(ip));
    }

    #[test]
    fn counts_each_ip_separately() {
        let limiter = limiter(1);
        assert!(limiter.allow("10.0.0.1".parse().unwrap()));
        assert!(limiter.allow("10.0.0.2".parse().unwrap()));
        assert!(!limiter.allow("10.0.0.1".parse().unwrap()));
    }

    #[test]
    fn quota_spreads_the_window_across_the_burst() {
        let quota = quota_for(RateLimitConfig {
            window: Duration::from_secs(900),
            max_requests: 100,
        });
        assert_eq!(quota.burst_size().get(), 100);
        assert_eq!(quota.replenish_interval(), Duration::from_secs(9));
    }

    #[test]
    fn zero_budget_still_admits_one_request() {
        let limiter = limiter(0);
        let ip: IpAddr = "10.0.0.9".parse().unwrap();
        assert!(limiter.allow(ip));
        assert!(!limiter.allow(ip));
    }
}
