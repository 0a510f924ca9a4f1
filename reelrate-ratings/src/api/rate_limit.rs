//! Per-client request rate limiting
//!
//! A keyed governor limiter, one bucket per client IP. The bucket holds
//! `max_requests` and refills evenly across `window_secs`. Buckets that have
//! fully refilled are swept periodically so the key map stays bounded.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::clock::Clock;
use governor::middleware::NoOpMiddleware;
use governor::state::keyed::DashMapStateStore;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use reelrate_common::config::RateLimitConfig;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::ApiError;

pub type ClientRateLimiter = DefaultKeyedRateLimiter<IpAddr>;

/// Per-client quota: `max_requests` burst refilled evenly over the window
pub fn client_quota(config: &RateLimitConfig) -> Quota {
    let burst = NonZeroU32::new(config.max_requests).unwrap_or(NonZeroU32::MIN);
    let window = Duration::from_secs(config.window_secs.max(1));

    Quota::with_period(window / burst.get())
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}

/// Build the shared limiter from configuration
pub fn client_rate_limiter(config: &RateLimitConfig) -> Arc<ClientRateLimiter> {
    Arc::new(RateLimiter::keyed(client_quota(config)))
}

/// Drop client buckets indistinguishable from a fresh one
pub fn sweep_idle_clients<C: Clock>(
    limiter: &RateLimiter<IpAddr, DashMapStateStore<IpAddr>, C, NoOpMiddleware<C::Instant>>,
) {
    limiter.retain_recent();
    limiter.shrink_to_fit();
}

/// Sweep idle client buckets every `every` until the runtime shuts down
pub fn spawn_client_sweep(limiter: Arc<ClientRateLimiter>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_idle_clients(&limiter);
            debug!(clients = limiter.len(), "Rate limiter swept");
        }
    })
}

/// Middleware: reject with 429 once a client's bucket is empty
///
/// Requests without connection info (e.g. in-process tests) share the
/// unspecified address bucket.
pub async fn limit_by_client_ip(
    State(limiter): State<Arc<ClientRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    match limiter.check_key(&client) {
        Ok(()) => next.run(request).await,
        Err(_) => {
            warn!(client = %client, "Rate limit exceeded");
            ApiError::RateLimited.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use governor::clock::FakeRelativeClock;

    #[test]
    fn test_burst_then_reject_per_client() {
        let limiter = client_rate_limiter(&RateLimitConfig {
            window_secs: 900,
            max_requests: 3,
        });
        let a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

        for _ in 0..3 {
            assert!(limiter.check_key(&a).is_ok());
        }
        assert!(limiter.check_key(&a).is_err());
        assert!(limiter.check_key(&b).is_ok(), "buckets are per client");
    }

    #[test]
    fn test_sweep_drops_replenished_clients_only() {
        let clock = FakeRelativeClock::default();
        let quota = client_quota(&RateLimitConfig {
            window_secs: 900,
            max_requests: 3,
        });
        let limiter = RateLimiter::dashmap_with_clock(quota, clock.clone());
        let idle = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let busy = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

        assert!(limiter.check_key(&idle).is_ok());
        assert!(limiter.check_key(&busy).is_ok());
        assert_eq!(limiter.len(), 2);

        // One token refills every 300s; the idle client is whole again
        clock.advance(Duration::from_secs(301));
        for _ in 0..3 {
            assert!(limiter.check_key(&busy).is_ok());
        }

        sweep_idle_clients(&limiter);
        assert_eq!(limiter.len(), 1);
        assert!(limiter.check_key(&busy).is_err(), "busy bucket survives the sweep");
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_sweep_keeps_running() {
        let limiter = client_rate_limiter(&RateLimitConfig::default());
        let handle = spawn_client_sweep(limiter, Duration::from_secs(60));

        tokio::time::advance(Duration::from_secs(181)).await;
        tokio::task::yield_now().await;
        assert!(!handle.is_finished());
        handle.abort();
    }

    #[test]
    fn test_zero_max_requests_still_builds() {
        let limiter = client_rate_limiter(&RateLimitConfig {
            window_secs: 0,
            max_requests: 0,
        });
        assert!(limiter.check_key(&IpAddr::V4(Ipv4Addr::LOCALHOST)).is_ok());
    }
}
