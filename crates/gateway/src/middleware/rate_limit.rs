//! Rate limiting middleware using token bucket algorithm

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use docqa_common::errors::AppError;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Process-wide token bucket shared by every question route
pub struct GlobalRateLimiter {
    limiter: DefaultDirectRateLimiter,
    requests_per_second: u32,
}

impl GlobalRateLimiter {
    /// Zero values are raised to one
    pub fn new(requests_per_second: u32, burst: u32) -> Arc<Self> {
        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(burst).unwrap_or(per_second);
        let quota = Quota::per_second(per_second).allow_burst(burst);

        Arc::new(Self {
            limiter: RateLimiter::direct(quota),
            requests_per_second: per_second.get(),
        })
    }

    /// Take one token; `false` when the bucket is empty
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<GlobalRateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if limiter.check() {
        Ok(next.run(request).await)
    } else {
        tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
        Err(AppError::RateLimited {
            limit: limiter.requests_per_second,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_then_reject() {
        let limiter = GlobalRateLimiter::new(1, 2);
        assert!(limiter.check());
        assert!(limiter.check());
        assert!(!limiter.check());
    }

    #[test]
    fn test_zero_quota_is_clamped() {
        let limiter = GlobalRateLimiter::new(0, 0);
        assert_eq!(limiter.requests_per_second, 1);
        assert!(limiter.check());
    }
}
