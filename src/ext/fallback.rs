//! Canned dashboard payloads used when the backend cannot serve one.

// crates.io
use serde_json::json;
// self
use crate::{_prelude::*, api::DashboardKind};

/// Supplies a stand-in dashboard payload after a failed fetch.
///
/// The dispatcher never consults a provider; callers opt in through
/// [`ApiClient::dashboard_or_fallback`](crate::client::ApiClient::dashboard_or_fallback).
pub trait FallbackProvider
where
	Self: Send + Sync,
{
	/// Payload to show for `kind`, or `None` to surface the failure.
	fn fallback(&self, kind: DashboardKind) -> Option<Value>;
}

/// Empty skeleton per dashboard: every section present, no data, `"fallback": true`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SkeletonDashboards;
impl FallbackProvider for SkeletonDashboards {
	fn fallback(&self, kind: DashboardKind) -> Option<Value> {
		let sections = match kind {
			DashboardKind::Farmer => json!({
				"summary": {},
				"products": [],
				"orders": [],
				"notifications": [],
			}),
			DashboardKind::Financial => json!({
				"summary": {},
				"transactions": [],
				"loans": [],
			}),
			DashboardKind::Technical => json!({
				"advisories": [],
				"tasks": [],
				"weather": {},
			}),
			DashboardKind::Legal => json!({
				"contracts": [],
				"documents": [],
				"cases": [],
			}),
			DashboardKind::MarketAgent => json!({
				"listings": [],
				"prices": [],
				"buyers": [],
			}),
		};
		let mut payload = json!({"kind": kind.as_str(), "fallback": true});

		if let (Value::Object(payload), Value::Object(sections)) = (&mut payload, sections) {
			payload.extend(sections);
		}

		Some(payload)
	}
}

/// Provider that never substitutes anything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoFallback;
impl FallbackProvider for NoFallback {
	fn fallback(&self, _: DashboardKind) -> Option<Value> {
		None
	}
}
