//! Immutable request descriptors handed to the dispatcher.
//!
//! A [`RequestDescriptor`] names *what* to call (verb, path, body, header overrides). The
//! dispatcher derives the final [`PreparedRequest`](crate::http::PreparedRequest) from it by
//! resolving the URL, merging default headers, and injecting the credential.

// self
use crate::{_prelude::*, error::TransportError};

/// HTTP verbs accepted by the marketplace API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical upper-case verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Request payload.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
	/// Structured value, encoded as JSON text by the dispatcher.
	Json(Value),
	/// Raw text sent unchanged.
	Text(String),
	/// Raw bytes sent unchanged.
	Bytes(Vec<u8>),
	/// Multipart form; the transport chooses the boundary and `Content-Type`.
	Multipart(MultipartForm),
}
impl RequestBody {
	/// Serializes any [`Serialize`] value into a [`RequestBody::Json`].
	pub fn json<T>(value: &T) -> Result<Self, serde_json::Error>
	where
		T: ?Sized + Serialize,
	{
		serde_json::to_value(value).map(Self::Json)
	}

	/// Returns `true` for multipart payloads.
	pub fn is_multipart(&self) -> bool {
		matches!(self, Self::Multipart(_))
	}

	/// Returns `true` for payloads that must not carry the default JSON `Content-Type`.
	pub fn is_binary(&self) -> bool {
		matches!(self, Self::Bytes(_) | Self::Multipart(_))
	}
}

/// [`RequestBody::json`] with the failure reported as an unbuildable request.
pub(crate) fn json_body<B>(body: &B) -> Result<RequestBody, TransportError>
where
	B: ?Sized + Serialize,
{
	RequestBody::json(body).map_err(TransportError::invalid_request)
}
impl From<Value> for RequestBody {
	fn from(value: Value) -> Self {
		Self::Json(value)
	}
}
impl From<MultipartForm> for RequestBody {
	fn from(form: MultipartForm) -> Self {
		Self::Multipart(form)
	}
}

/// Ordered multipart form used by file uploads.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultipartForm {
	parts: Vec<MultipartPart>,
}
impl MultipartForm {
	/// Creates an empty form.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a plain text field.
	pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		let part = MultipartPart { name: name.into(), content: PartContent::Text(value.into()) };

		self.parts.push(part);

		self
	}

	/// Appends a file field.
	pub fn file(
		mut self,
		name: impl Into<String>,
		file_name: impl Into<String>,
		mime: Option<&str>,
		bytes: impl Into<Vec<u8>>,
	) -> Self {
		self.parts.push(MultipartPart {
			name: name.into(),
			content: PartContent::File {
				file_name: file_name.into(),
				mime: mime.map(str::to_owned),
				bytes: bytes.into(),
			},
		});

		self
	}

	/// Parts in insertion order.
	pub fn parts(&self) -> &[MultipartPart] {
		&self.parts
	}

	/// Returns `true` if no parts were added.
	pub fn is_empty(&self) -> bool {
		self.parts.is_empty()
	}
}

/// Single named part of a [`MultipartForm`].
#[derive(Clone, Debug, PartialEq)]
pub struct MultipartPart {
	/// Form field name.
	pub name: String,
	/// Field payload.
	pub content: PartContent,
}

/// Payload of a [`MultipartPart`].
#[derive(Clone, PartialEq)]
pub enum PartContent {
	/// Plain text value.
	Text(String),
	/// Uploaded file.
	File {
		/// File name reported to the server.
		file_name: String,
		/// MIME type, if known.
		mime: Option<String>,
		/// File contents.
		bytes: Vec<u8>,
	},
}
impl Debug for PartContent {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Text(value) => f.debug_tuple("Text").field(value).finish(),
			Self::File { file_name, mime, bytes } => f
				.debug_struct("File")
				.field("file_name", file_name)
				.field("mime", mime)
				.field("len", &bytes.len())
				.finish(),
		}
	}
}

/// Verb, path, optional body, and header overrides for one API call.
///
/// Descriptors are built with consuming setters and never change once handed to the dispatcher.
/// Header names are stored lower-cased; setting the same header twice keeps the last value.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDescriptor {
	method: Method,
	path: String,
	query: Vec<(String, String)>,
	headers: BTreeMap<String, String>,
	body: Option<RequestBody>,
	authenticated: bool,
}
impl RequestDescriptor {
	/// Creates a descriptor for `method` against `path` (absolute URL or base-relative path).
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			headers: BTreeMap::new(),
			body: None,
			authenticated: true,
		}
	}

	/// `GET path`
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// `POST path`
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// `PUT path`
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put, path)
	}

	/// `PATCH path`
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::Patch, path)
	}

	/// `DELETE path`
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	/// Sets the request body.
	pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Sets a header override; it wins over the dispatcher's defaults but not over the credential.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Appends a query parameter.
	pub fn with_query(mut self, name: impl Into<String>, value: impl Display) -> Self {
		self.query.push((name.into(), value.to_string()));

		self
	}

	/// Sends the request without resolving or attaching a credential (sign-in, public listings).
	pub fn anonymous(mut self) -> Self {
		self.authenticated = false;

		self
	}

	/// Request verb.
	pub fn method(&self) -> Method {
		self.method
	}

	/// Path or absolute URL as supplied.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Query parameters in insertion order.
	pub fn query(&self) -> &[(String, String)] {
		&self.query
	}

	/// Header overrides keyed by lower-case name.
	pub fn headers(&self) -> &BTreeMap<String, String> {
		&self.headers
	}

	/// Request body, if any.
	pub fn body(&self) -> Option<&RequestBody> {
		self.body.as_ref()
	}

	/// `false` once [`anonymous`](Self::anonymous) was called.
	pub fn is_authenticated(&self) -> bool {
		self.authenticated
	}
}
