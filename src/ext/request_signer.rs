//! Credential attachment for prepared requests.

// self
use crate::{_prelude::*, auth::Credential, error::TransportError, http::PreparedRequest};

/// Injects a resolved [`Credential`] into an outbound request.
///
/// The dispatcher calls the signer after merging default and descriptor headers, so whatever the
/// signer writes takes precedence over both.
pub trait RequestSigner
where
	Self: Send + Sync,
{
	/// Writes the credential into `request`.
	fn attach_credential(
		&self,
		request: &mut PreparedRequest,
		credential: &Credential,
	) -> Result<(), TransportError>;
}

/// Writes `<header>: <scheme> <credential>`; `Authorization: Bearer …` by default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemeSigner {
	header: String,
	scheme: String,
}
impl SchemeSigner {
	/// `Authorization: Bearer <credential>`.
	pub fn bearer() -> Self {
		Self::new("authorization", "Bearer")
	}

	/// Custom header and scheme, e.g. `("Authorization", "Token")` for DRF token auth.
	pub fn new(header: impl AsRef<str>, scheme: impl Into<String>) -> Self {
		Self { header: header.as_ref().to_ascii_lowercase(), scheme: scheme.into() }
	}
}
impl Default for SchemeSigner {
	fn default() -> Self {
		Self::bearer()
	}
}
impl RequestSigner for SchemeSigner {
	fn attach_credential(
		&self,
		request: &mut PreparedRequest,
		credential: &Credential,
	) -> Result<(), TransportError> {
		if credential.expose().chars().any(char::is_control) {
			return Err(TransportError::invalid_request(
				"credential contains control characters and cannot be sent as a header",
			));
		}

		let value = if self.scheme.is_empty() {
			credential.expose().to_owned()
		} else {
			format!("{} {}", self.scheme, credential.expose())
		};

		request.headers.insert(self.header.clone(), value);

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{http::PreparedBody, request::Method};

	fn request() -> PreparedRequest {
		PreparedRequest {
			method: Method::Get,
			url: Url::parse("https://market.example/api/products/").expect("URL should parse."),
			headers: BTreeMap::from([("authorization".to_owned(), "Basic stale".to_owned())]),
			body: PreparedBody::Empty,
		}
	}

	#[test]
	fn bearer_overrides_existing_header() {
		let mut request = request();

		SchemeSigner::default()
			.attach_credential(&mut request, &Credential::new("abc123"))
			.expect("Signing should succeed.");

		assert_eq!(request.header("Authorization"), Some("Bearer abc123"));
	}

	#[test]
	fn custom_scheme_and_header() {
		let mut request = request();

		SchemeSigner::new("X-Api-Token", "Token")
			.attach_credential(&mut request, &Credential::new("abc123"))
			.expect("Signing should succeed.");

		assert_eq!(request.header("x-api-token"), Some("Token abc123"));
		assert_eq!(request.header("authorization"), Some("Basic stale"));
	}

	#[test]
	fn control_characters_are_rejected() {
		let mut request = request();
		let err = SchemeSigner::default()
			.attach_credential(&mut request, &Credential::new("abc\r\nX-Injected: 1"))
			.expect_err("Header injection must be refused.");

		assert!(matches!(err, TransportError::InvalidRequest { .. }));
		assert!(!err.to_string().contains("abc"));
	}
}
