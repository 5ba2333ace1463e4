//! Shared outbound HTTP client

pub mod client;

pub use client::{HttpClient, HttpClientBuilder, RetryOn, UpstreamCall};
