// self
use crate::{_prelude::*, auth::Slot, request::Method, store::StoreError};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRequest<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRequest<F> = F;

/// A span builder used by the dispatcher and the typed endpoints.
#[derive(Clone, Debug)]
pub struct RequestSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RequestSpan {
	/// Creates a new span tagged with the provided method + stage.
	pub fn new(method: Method, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("agrimarket_client.request", method = method.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (method, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRequest<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a credential-store miss that will be retried after `delay`.
pub fn credential_retry(attempt: u32, max_attempts: u32, delay: Duration) {
	#[cfg(feature = "tracing")]
	tracing::debug!(
		attempt,
		max_attempts,
		delay_ms = delay.as_millis() as u64,
		"credential not yet available"
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (attempt, max_attempts, delay);
}

/// Logs a storage failure that the pipeline swallowed to keep its envelope contract.
pub fn store_failure(stage: &'static str, slot: Option<Slot>, err: &StoreError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		stage,
		slot = slot.map_or("any", Slot::as_str),
		error = %err,
		"credential store failure"
	);
	#[cfg(not(feature = "tracing"))]
	let _ = (stage, slot, err);
}

/// Logs that a dashboard was served from a fallback provider.
pub fn dashboard_fallback(kind: &'static str) {
	#[cfg(feature = "tracing")]
	tracing::info!(kind, "dashboard served from fallback payload");
	#[cfg(not(feature = "tracing"))]
	let _ = kind;
}

/// Logs that a `401` response wiped the stored credentials.
pub fn credentials_cleared(status: u16) {
	#[cfg(feature = "tracing")]
	tracing::warn!(status, "authentication rejected; stored credentials cleared");
	#[cfg(not(feature = "tracing"))]
	let _ = status;
}
