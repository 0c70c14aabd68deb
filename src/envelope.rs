//! Uniform result contract for every dispatched request.
//!
//! Upstream endpoints wrap payloads inconsistently. [`normalize`] folds a parsed 2xx body into
//! [`Envelope::Ok`], and [`Envelope::from_response`] classifies non-2xx statuses and unparsable
//! bodies into [`Envelope::Err`] with a [`FailureKind`], a user-facing message, and the status.

pub mod decode;

pub use decode::{DecodeError, ResponseShape};

// crates.io
use serde::{Serializer, de::DeserializeOwned, ser::SerializeMap};
// self
use crate::{_prelude::*, http::RawResponse};

const MESSAGE_KEYS: [&str; 3] = ["message", "detail", "error"];
const FIELD_ERRORS_KEY: &str = "non_field_errors";

/// Classification of a rejected request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
	/// HTTP 401; stored credentials were cleared and the caller should re-authenticate.
	Unauthenticated,
	/// HTTP 403; the credential is valid but lacks privileges.
	Forbidden,
	/// A 2xx response whose body was not JSON (or lacked a field the endpoint requires).
	MalformedResponse,
	/// Any other 4xx (and non-2xx statuses outside 4xx/5xx).
	ClientError,
	/// HTTP 5xx.
	ServerError,
}
impl FailureKind {
	/// Maps a non-2xx status code onto a kind.
	pub const fn from_status(status: u16) -> Self {
		match status {
			401 => Self::Unauthenticated,
			403 => Self::Forbidden,
			500..=599 => Self::ServerError,
			_ => Self::ClientError,
		}
	}

	/// Returns a stable snake-case label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Unauthenticated => "unauthenticated",
			Self::Forbidden => "forbidden",
			Self::MalformedResponse => "malformed_response",
			Self::ClientError => "client_error",
			Self::ServerError => "server_error",
		}
	}
}
impl Display for FailureKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Payload of [`Envelope::Err`].
#[derive(Clone, Debug, PartialEq, ThisError)]
#[error("{message}")]
pub struct Failure {
	/// Failure classification.
	pub kind: FailureKind,
	/// Message suitable for showing to end users.
	pub message: String,
	/// HTTP status, when a response was received.
	pub status: Option<u16>,
	/// `true` only for [`FailureKind::Unauthenticated`].
	pub requires_login: bool,
	/// `Retry-After` hint from upstream, if supplied.
	pub retry_after: Option<Duration>,
	/// Parsed error body (field errors and similar), when the server sent JSON.
	pub details: Option<Value>,
}
impl Failure {
	/// Creates a failure with no status attached.
	pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
		Self {
			kind,
			message: message.into(),
			status: None,
			requires_login: matches!(kind, FailureKind::Unauthenticated),
			retry_after: None,
			details: None,
		}
	}

	/// Attaches an HTTP status.
	pub fn with_status(mut self, status: u16) -> Self {
		self.status = Some(status);

		self
	}

	/// Attaches the parsed error body.
	pub fn with_details(mut self, details: Value) -> Self {
		self.details = Some(details);

		self
	}

	fn rejected(response: &RawResponse) -> Self {
		let body = parse_body(&response.body).ok().filter(|body| !body.is_null());
		let message = body
			.as_ref()
			.and_then(extract_message)
			.unwrap_or_else(|| synthesize_message(response.status, response.reason.as_deref()));
		let mut failure = Self::new(FailureKind::from_status(response.status), message)
			.with_status(response.status);

		failure.retry_after = response.retry_after();
		failure.details = body;

		failure
	}
}

/// Outcome of one pipeline call: exactly one of `Ok{data}` or `Err{failure}`.
#[derive(Clone, Debug, PartialEq)]
pub enum Envelope {
	/// Request succeeded; `data` is the normalized payload.
	Ok {
		/// Normalized payload.
		data: Value,
	},
	/// Request was rejected or its response could not be interpreted.
	Err(Failure),
}
impl Envelope {
	/// Wraps a payload into [`Envelope::Ok`].
	pub fn ok(data: Value) -> Self {
		Self::Ok { data }
	}

	/// Builds a [`FailureKind::MalformedResponse`] envelope.
	pub fn malformed(message: impl Into<String>, status: Option<u16>) -> Self {
		let mut failure = Failure::new(FailureKind::MalformedResponse, message);

		failure.status = status;

		Self::Err(failure)
	}

	/// Folds a received response into an envelope.
	///
	/// 2xx bodies are parsed as JSON (an empty body becomes `null`) and passed through
	/// [`normalize`]; anything else becomes [`Envelope::Err`].
	pub fn from_response(response: &RawResponse) -> Self {
		if !response.is_success() {
			return Self::Err(Failure::rejected(response));
		}

		match parse_body(&response.body) {
			Ok(raw) => normalize(raw),
			Err(_) => Self::malformed(
				format!("Server returned a non-JSON body with status {}.", response.status),
				Some(response.status),
			),
		}
	}

	/// Returns `true` for [`Envelope::Ok`].
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Ok { .. })
	}

	/// Payload of a successful envelope.
	pub fn data(&self) -> Option<&Value> {
		match self {
			Self::Ok { data } => Some(data),
			Self::Err(_) => None,
		}
	}

	/// Failure of a rejected envelope.
	pub fn failure(&self) -> Option<&Failure> {
		match self {
			Self::Ok { .. } => None,
			Self::Err(failure) => Some(failure),
		}
	}

	/// `true` when the caller should send the user back through sign-in.
	pub fn requires_login(&self) -> bool {
		self.failure().is_some_and(|failure| failure.requires_login)
	}

	/// `true` when transport succeeded but the payload itself carries `"success": false`.
	///
	/// Such bodies stay [`Envelope::Ok`] so the caller can still read their fields.
	pub fn reports_failure(&self) -> bool {
		self.data()
			.and_then(|data| data.get("success"))
			.is_some_and(|success| matches!(success, Value::Bool(false)))
	}

	/// Converts into a standard [`Result`].
	pub fn into_result(self) -> Result<Value, Failure> {
		match self {
			Self::Ok { data } => Ok(data),
			Self::Err(failure) => Err(failure),
		}
	}

	/// Decodes the payload into `T` after locating it according to `shape`.
	pub fn decode<T>(self, shape: ResponseShape) -> Result<T, DecodeError>
	where
		T: DeserializeOwned,
	{
		let data = self.into_result().map_err(DecodeError::Rejected)?;

		shape.decode(data)
	}
}
impl Serialize for Envelope {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match self {
			Self::Ok { data } => {
				let mut map = serializer.serialize_map(Some(2))?;

				map.serialize_entry("success", &true)?;
				map.serialize_entry("data", data)?;

				map.end()
			},
			Self::Err(failure) => {
				let mut map = serializer.serialize_map(Some(5))?;

				map.serialize_entry("success", &false)?;
				map.serialize_entry("error", &failure.kind)?;
				map.serialize_entry("message", &failure.message)?;
				map.serialize_entry("status", &failure.status)?;
				map.serialize_entry("requiresLogin", &failure.requires_login)?;

				map.end()
			},
		}
	}
}

/// Folds a parsed 2xx body into [`Envelope::Ok`].
///
/// `{"success": true, "data": X}` is unwrapped to `X`. Every other body, including one that
/// already reports `"success": false`, is passed through unchanged.
pub fn normalize(raw: Value) -> Envelope {
	match raw {
		Value::Object(mut map)
			if matches!(map.get("success"), Some(Value::Bool(true))) && map.contains_key("data") =>
			Envelope::ok(map.remove("data").unwrap_or_default()),
		raw => Envelope::ok(raw),
	}
}

fn parse_body(body: &[u8]) -> Result<Value, serde_json::Error> {
	if body.iter().all(u8::is_ascii_whitespace) {
		return Ok(Value::Null);
	}

	serde_json::from_slice(body)
}

fn extract_message(body: &Value) -> Option<String> {
	let non_blank = |value: &Value| {
		value.as_str().map(str::trim).filter(|text| !text.is_empty()).map(str::to_owned)
	};

	MESSAGE_KEYS
		.iter()
		.find_map(|key| body.get(key).and_then(non_blank))
		.or_else(|| body.get(FIELD_ERRORS_KEY)?.get(0).and_then(non_blank))
}

fn synthesize_message(status: u16, reason: Option<&str>) -> String {
	match reason {
		Some(reason) => format!("Request failed with status {status} {reason}."),
		None => format!("Request failed with status {status}."),
	}
}
