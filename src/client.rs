//! API client facade that owns the transport, configuration, and session.

mod dispatch;

// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	ext::{RequestSigner, SchemeSigner},
	http::HttpTransport,
	resolver::CredentialResolver,
	session::Session,
};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, http::ReqwestTransport};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Sends requests to the marketplace API on behalf of one [`Session`].
///
/// Every call goes through [`ApiClient::send`]: the credential is resolved from the session's
/// store, the request is signed and executed, and the response is folded into an
/// [`Envelope`](crate::envelope::Envelope). The typed endpoint methods in [`api`](crate::api)
/// are thin wrappers around it.
pub struct ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used for every outbound request.
	pub transport: Arc<T>,
	/// Validated base URL, wait strategy, and timeout.
	pub config: ClientConfig,
	/// Session whose store supplies credentials and is cleared on `401`.
	pub session: Session,
	/// Writes the resolved credential into each request.
	pub signer: Arc<dyn RequestSigner>,
	resolver: CredentialResolver,
}
impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client over a caller-provided transport.
	pub fn with_transport(
		config: ClientConfig,
		session: Session,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			config,
			resolver: CredentialResolver::new(session.clone()),
			session,
			signer: Arc::new(SchemeSigner::default()),
		}
	}

	/// Replaces the default `Authorization: Bearer` signer.
	pub fn with_signer(mut self, signer: impl 'static + RequestSigner) -> Self {
		self.signer = Arc::new(signer);

		self
	}

	/// Resolver reading from this client's session.
	pub fn resolver(&self) -> &CredentialResolver {
		&self.resolver
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client with its own reqwest transport honoring [`ClientConfig::timeout`].
	pub fn new(config: ClientConfig, session: Session) -> Result<Self, ConfigError> {
		let transport = ReqwestTransport::with_timeout(config.timeout())?;

		Ok(Self::with_transport(config, session, transport))
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			config: self.config.clone(),
			session: self.session.clone(),
			signer: self.signer.clone(),
			resolver: self.resolver.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("config", &self.config)
			.field("session", &self.session)
			.finish()
	}
}
