//! Transport primitives for the request pipeline.
//!
//! The module exposes [`HttpTransport`] together with the transport-neutral
//! [`PreparedRequest`] and [`RawResponse`] types so downstream crates can plug in any HTTP
//! stack (or a fake for tests) without touching the dispatcher. A transport's only job is to
//! put bytes on the wire and hand back status, headers, and body; classification into
//! envelopes happens above it.

// std
use std::ops::Deref;
// crates.io
use time::{OffsetDateTime, format_description::well_known::Rfc2822};
// self
use crate::{
	_prelude::*,
	error::TransportError,
	request::{Method, MultipartForm},
};
#[cfg(feature = "reqwest")] use crate::request::PartContent;

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing prepared API requests.
///
/// Implementations must return `Err` **only** when no response was received (DNS, connect,
/// TLS, timeout). Any HTTP status, including 4xx/5xx, is a successful transport call.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and collects the full response body.
	fn execute(&self, request: PreparedRequest) -> TransportFuture<'_>;
}

/// Fully resolved request: absolute URL, merged headers, encoded body.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedRequest {
	/// Request verb.
	pub method: Method,
	/// Absolute URL including query string.
	pub url: Url,
	/// Headers keyed by lower-case name.
	pub headers: BTreeMap<String, String>,
	/// Encoded body.
	pub body: PreparedBody,
}
impl PreparedRequest {
	/// Looks up a header case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}
}

/// Encoded request body.
#[derive(Clone, Debug, PartialEq)]
pub enum PreparedBody {
	/// No body.
	Empty,
	/// Bytes sent unchanged (JSON text, raw text, or raw bytes).
	Bytes(Vec<u8>),
	/// Multipart form left for the transport to encode with its own boundary.
	Multipart(MultipartForm),
}

/// Status, headers, and body returned by a transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: u16,
	/// Reason phrase (`Internal Server Error`), when the transport knows it.
	pub reason: Option<String>,
	/// Headers keyed by lower-case name.
	pub headers: BTreeMap<String, String>,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl RawResponse {
	/// Creates a response with the provided status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into(), ..Default::default() }
	}

	/// Sets the reason phrase.
	pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
		self.reason = Some(reason.into());

		self
	}

	/// Adds a header.
	pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
		self.headers.insert(name.to_ascii_lowercase(), value.into());

		self
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Looks up a header case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Parses `Retry-After` as either delta-seconds or an RFC 2822 date in the future.
	pub fn retry_after(&self) -> Option<Duration> {
		let raw = self.header("retry-after")?.trim();

		if let Ok(secs) = raw.parse::<u64>() {
			return Some(Duration::from_secs(secs));
		}
		if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
			let delta = moment - OffsetDateTime::now_utc();

			if delta.is_positive() {
				return Duration::try_from(delta).ok();
			}
		}

		None
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client with an optional overall request timeout.
	pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, crate::error::ConfigError> {
		let mut builder = ReqwestClient::builder();

		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}

		Ok(Self(builder.build()?))
	}

	async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
		let PreparedRequest { method, url, headers, body } = request;
		let mut builder = self.0.request(reqwest_method(method), url);

		for (name, value) in &headers {
			builder = builder.header(name.as_str(), value.as_str());
		}

		builder = match body {
			PreparedBody::Empty => builder,
			PreparedBody::Bytes(bytes) => builder.body(bytes),
			PreparedBody::Multipart(form) => builder.multipart(reqwest_form(form)?),
		};

		let response = builder.send().await?;
		let status = response.status();
		let headers = response
			.headers()
			.iter()
			.filter_map(|(name, value)| {
				value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
			})
			.collect();
		let body = response.bytes().await?.to_vec();

		Ok(RawResponse {
			status: status.as_u16(),
			reason: status.canonical_reason().map(str::to_owned),
			headers,
			body,
		})
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: PreparedRequest) -> TransportFuture<'_> {
		Box::pin(self.send(request))
	}
}

#[cfg(feature = "reqwest")]
fn reqwest_method(method: Method) -> reqwest::Method {
	match method {
		Method::Get => reqwest::Method::GET,
		Method::Post => reqwest::Method::POST,
		Method::Put => reqwest::Method::PUT,
		Method::Patch => reqwest::Method::PATCH,
		Method::Delete => reqwest::Method::DELETE,
	}
}

#[cfg(feature = "reqwest")]
fn reqwest_form(form: MultipartForm) -> Result<reqwest::multipart::Form, TransportError> {
	use reqwest::multipart::{Form, Part};

	let mut out = Form::new();

	for part in form.parts() {
		out = match &part.content {
			PartContent::Text(value) => out.text(part.name.clone(), value.clone()),
			PartContent::File { file_name, mime, bytes } => {
				let mut file = Part::bytes(bytes.clone()).file_name(file_name.clone());

				if let Some(mime) = mime {
					file = file.mime_str(mime).map_err(TransportError::invalid_request)?;
				}

				out.part(part.name.clone(), file)
			},
		};
	}

	Ok(out)
}
