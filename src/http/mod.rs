//! HTTP client module
//!
//! Provides HTTP client with retry, rate limiting, and backoff strategies.
//!
//! # Features
//!
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **Service Errors**: AWS error bodies surface as code and message

mod client;
mod rate_limit;

pub use client::{
    is_name_resolution, status_error, HttpClient, HttpClientConfig, HttpClientConfigBuilder,
    RequestConfig,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
