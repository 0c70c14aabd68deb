//! Public extension contracts (credential attachment, dashboard fallbacks).
//!
//! Both traits ship with a default implementation; downstream applications swap them in through
//! [`ApiClient::with_signer`](crate::client::ApiClient::with_signer) or by passing their own
//! provider to [`ApiClient::dashboard_or_fallback`](crate::client::ApiClient::dashboard_or_fallback).

pub mod fallback;
pub mod request_signer;

pub use fallback::*;
pub use request_signer::*;
