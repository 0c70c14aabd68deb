//! Optional observability helpers for the request pipeline.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `agrimarket_client.request` with the `method`
//!   and `stage` (call site) fields, plus warn/debug events for credential retries, storage
//!   failures, credentials cleared after a `401`, and dashboards served from a fallback.
//! - Enable `metrics` to increment the `agrimarket_client_request_total` counter for every
//!   attempt/success/rejection/transport failure, labeled by `method` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each dispatched request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry to the dispatcher.
	Attempt,
	/// Response folded into an `Ok` envelope.
	Success,
	/// Response folded into an `Err` envelope.
	Rejected,
	/// No response was obtained.
	TransportFailure,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::Rejected => "rejected",
			RequestOutcome::TransportFailure => "transport_failure",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
