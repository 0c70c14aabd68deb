//! Client configuration: base URL, credential wait strategy, and transport timeout.

// crates.io
use url::ParseError;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	resolver::RetryPolicy,
};

/// Environment variable holding the API base URL.
pub const BASE_URL_ENV: &str = "AGRIMARKET_API_URL";
/// Base URL used when [`BASE_URL_ENV`] is unset or blank.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";

/// How the dispatcher waits for a credential that is not stored yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialWait {
	/// Poll the store with exponential backoff.
	Retry(RetryPolicy),
	/// Park on the session's ready signal for at most `timeout`, then check the store once more.
	Signal {
		/// Upper bound on the wait.
		timeout: Duration,
	},
}
impl CredentialWait {
	/// Same worst-case wait as the default [`RetryPolicy`] (100ms + 200ms).
	pub const DEFAULT_SIGNAL_TIMEOUT: Duration = Duration::from_millis(300);
}
impl Default for CredentialWait {
	fn default() -> Self {
		Self::Signal { timeout: Self::DEFAULT_SIGNAL_TIMEOUT }
	}
}

/// Validated settings shared by every request an [`ApiClient`](crate::client::ApiClient) sends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	base_url: Url,
	credential_wait: CredentialWait,
	timeout: Option<Duration>,
}
impl ClientConfig {
	/// Starts a builder for the provided base URL.
	pub fn builder(base_url: impl Into<String>) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Reads [`BASE_URL_ENV`] from the process environment, falling back to [`DEFAULT_BASE_URL`].
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Same as [`from_env`](Self::from_env) but with a caller-supplied variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: FnOnce(&str) -> Option<String>,
	{
		let base_url = lookup(BASE_URL_ENV)
			.filter(|value| !value.trim().is_empty())
			.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

		Self::builder(base_url).build()
	}

	/// Base URL; always ends with `/`.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Strategy used while waiting for the credential.
	pub fn credential_wait(&self) -> CredentialWait {
		self.credential_wait
	}

	/// Overall per-request timeout applied by the transport.
	pub fn timeout(&self) -> Option<Duration> {
		self.timeout
	}

	/// Builds the absolute URL for `path`.
	///
	/// A `path` that starts with a scheme is used as-is; anything else is resolved against the
	/// base URL, ignoring a leading `/` so the base path is kept.
	pub fn resolve_url(
		&self,
		path: &str,
		query: &[(String, String)],
	) -> Result<Url, TransportError> {
		let parsed = match Url::parse(path) {
			Err(ParseError::RelativeUrlWithoutBase) =>
				self.base_url.join(path.trim_start_matches('/')),
			parsed => parsed,
		};
		let mut url = parsed.map_err(|e| {
			TransportError::invalid_request(format!("`{path}` is not a valid URL: {e}"))
		})?;

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(query);
		}

		Ok(url)
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Clone, Debug)]
pub struct ClientConfigBuilder {
	/// Raw base URL; a trailing `/` is appended when missing.
	pub base_url: String,
	/// Credential wait strategy.
	pub credential_wait: CredentialWait,
	/// Optional per-request timeout.
	pub timeout: Option<Duration>,
}
impl ClientConfigBuilder {
	/// Creates a builder that waits on the ready signal and sets no timeout.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			credential_wait: CredentialWait::default(),
			timeout: None,
		}
	}

	/// Polls the store with `policy` instead of waiting on the ready signal.
	pub fn retry(mut self, policy: RetryPolicy) -> Self {
		self.credential_wait = CredentialWait::Retry(policy);

		self
	}

	/// Waits on the ready signal for at most `timeout`.
	pub fn wait_for_signal(mut self, timeout: Duration) -> Self {
		self.credential_wait = CredentialWait::Signal { timeout };

		self
	}

	/// Sets the per-request timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let mut raw = self.base_url.trim().to_owned();

		if !raw.ends_with('/') {
			raw.push('/');
		}

		let base_url = Url::parse(&raw).map_err(|source| ConfigError::InvalidBaseUrl {
			value: self.base_url.clone(),
			source,
		})?;

		if !matches!(base_url.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { url: base_url.to_string() });
		}
		if let CredentialWait::Retry(policy) = self.credential_wait
			&& policy.max_attempts == 0
		{
			return Err(ConfigError::ZeroAttempts);
		}

		Ok(ClientConfig { base_url, credential_wait: self.credential_wait, timeout: self.timeout })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config(base: &str) -> ClientConfig {
		ClientConfig::builder(base).build().expect("Base URL should be accepted.")
	}

	#[test]
	fn base_url_gains_trailing_slash() {
		let config = config("https://market.example/api");

		assert_eq!(config.base_url().as_str(), "https://market.example/api/");
		assert_eq!(config.credential_wait(), CredentialWait::default());
		assert_eq!(config.timeout(), None);
	}

	#[test]
	fn builder_switches_wait_strategy() {
		let policy = RetryPolicy::new(5, Duration::from_millis(20));
		let polling = ClientConfig::builder(DEFAULT_BASE_URL)
			.retry(policy)
			.timeout(Duration::from_secs(10))
			.build()
			.expect("Polling configuration should be valid.");
		let signalled = ClientConfig::builder(DEFAULT_BASE_URL)
			.retry(policy)
			.wait_for_signal(Duration::from_secs(1))
			.build()
			.expect("Signal configuration should be valid.");

		assert_eq!(polling.credential_wait(), CredentialWait::Retry(policy));
		assert_eq!(polling.timeout(), Some(Duration::from_secs(10)));
		assert_eq!(
			signalled.credential_wait(),
			CredentialWait::Signal { timeout: Duration::from_secs(1) }
		);
	}

	#[test]
	fn relative_paths_keep_the_base_path() {
		let config = config("https://market.example/api/");
		let plain = config.resolve_url("products/", &[]).expect("Relative path should resolve.");
		let rooted = config.resolve_url("/orders/7/", &[]).expect("Rooted path should resolve.");

		assert_eq!(plain.as_str(), "https://market.example/api/products/");
		assert_eq!(rooted.as_str(), "https://market.example/api/orders/7/");
	}

	#[test]
	fn absolute_urls_are_used_as_is() {
		let url = config("https://market.example/api/")
			.resolve_url("https://cdn.example/avatars/1.png", &[])
			.expect("Absolute URL should resolve.");

		assert_eq!(url.as_str(), "https://cdn.example/avatars/1.png");
	}

	#[test]
	fn embedded_urls_stay_relative() {
		let url = config("https://market.example/api/")
			.resolve_url("redirect/?next=https://market.example/home", &[])
			.expect("A URL inside the query must not make the path absolute.");

		assert_eq!(url.path(), "/api/redirect/");
		assert_eq!(url.query(), Some("next=https://market.example/home"));
	}

	#[test]
	fn query_parameters_are_encoded() {
		let query = [("search".to_owned(), "sweet potato".to_owned()), ("page".into(), "2".into())];
		let url = config("https://market.example/api/")
			.resolve_url("products/", &query)
			.expect("Path with query should resolve.");

		assert_eq!(url.as_str(), "https://market.example/api/products/?search=sweet+potato&page=2");
	}

	#[test]
	fn lookup_falls_back_to_default() {
		let unset = ClientConfig::from_lookup(|_| None).expect("Default base URL should be valid.");
		let blank = ClientConfig::from_lookup(|_| Some("   ".into()))
			.expect("Blank values should fall back to the default.");
		let custom = ClientConfig::from_lookup(|key| {
			assert_eq!(key, BASE_URL_ENV);

			Some("https://api.agrimarket.example/v1".into())
		})
		.expect("Custom base URL should be valid.");

		assert_eq!(unset.base_url().as_str(), DEFAULT_BASE_URL);
		assert_eq!(blank.base_url().as_str(), DEFAULT_BASE_URL);
		assert_eq!(custom.base_url().as_str(), "https://api.agrimarket.example/v1/");
	}

	#[test]
	fn invalid_settings_are_rejected() {
		assert!(matches!(
			ClientConfig::builder("ftp://market.example/").build(),
			Err(ConfigError::UnsupportedScheme { .. })
		));
		assert!(matches!(
			ClientConfig::builder("not a url").build(),
			Err(ConfigError::InvalidBaseUrl { .. })
		));
		assert!(matches!(
			ClientConfig::builder(DEFAULT_BASE_URL)
				.retry(RetryPolicy::new(0, Duration::from_millis(10)))
				.build(),
			Err(ConfigError::ZeroAttempts)
		));
	}
}
