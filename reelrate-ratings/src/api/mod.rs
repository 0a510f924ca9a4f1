//! HTTP API handlers
//!
//! - `GET /api/movie/:id` - aggregate ratings for one movie
//! - `GET /api/search?q=` - metadata search passthrough
//! - `GET /health` - liveness and cache size
//!
//! The `/api` routes sit behind the per-client rate limiter; health does not.

pub mod health;
pub mod movies;
pub mod rate_limit;

pub use health::health_routes;
pub use movies::movie_routes;
pub use rate_limit::{
    client_rate_limiter, limit_by_client_ip, spawn_client_sweep, ClientRateLimiter,
};
