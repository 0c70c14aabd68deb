//! Role dashboards and their caller-side fallback.

// self
use crate::{
	_prelude::*,
	client::ApiClient,
	envelope::Envelope,
	error::TransportError,
	ext::FallbackProvider,
	http::HttpTransport,
	obs,
};

/// Dashboards served by the backend, one per marketplace role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DashboardKind {
	/// Farmer overview.
	Farmer,
	/// Financial agent view.
	Financial,
	/// Technical (agronomy) agent view.
	Technical,
	/// Legal agent view.
	Legal,
	/// Market agent view.
	MarketAgent,
}
impl DashboardKind {
	/// Every dashboard kind.
	pub const ALL: [Self; 5] =
		[Self::Farmer, Self::Financial, Self::Technical, Self::Legal, Self::MarketAgent];

	/// URL segment and stable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Farmer => "farmer",
			Self::Financial => "financial",
			Self::Technical => "technical",
			Self::Legal => "legal",
			Self::MarketAgent => "market-agent",
		}
	}

	/// Base-relative path of the dashboard endpoint.
	pub fn path(self) -> String {
		format!("dashboard/{}/", self.as_str())
	}
}
impl Display for DashboardKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Dashboard payload for `kind`.
	pub async fn dashboard(&self, kind: DashboardKind) -> Result<Envelope, TransportError> {
		self.get(&kind.path()).await
	}

	/// [`dashboard`](Self::dashboard), substituting `provider`'s payload when the fetch fails.
	///
	/// Rejections and transport failures fall back; a rejection that requires sign-in is
	/// returned unchanged so the caller still redirects. When `provider` has nothing for `kind`
	/// the original outcome is returned.
	pub async fn dashboard_or_fallback(
		&self,
		kind: DashboardKind,
		provider: &dyn FallbackProvider,
	) -> Result<Envelope, TransportError> {
		let outcome = self.dashboard(kind).await;

		if outcome.as_ref().is_ok_and(|envelope| envelope.is_success() || envelope.requires_login())
		{
			return outcome;
		}

		match provider.fallback(kind) {
			Some(data) => {
				obs::dashboard_fallback(kind.as_str());

				Ok(Envelope::ok(data))
			},
			None => outcome,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn paths_and_labels() {
		assert_eq!(DashboardKind::MarketAgent.path(), "dashboard/market-agent/");
		assert_eq!(
			serde_json::to_value(DashboardKind::MarketAgent).expect("Kind should serialize."),
			Value::String("market-agent".into())
		);
		assert_eq!(DashboardKind::ALL.len(), 5);
	}
}
