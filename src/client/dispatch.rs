//! Request dispatch: credential lookup, request preparation, and response folding.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	client::ApiClient,
	config::CredentialWait,
	envelope::{Envelope, FailureKind},
	error::TransportError,
	http::{HttpTransport, PreparedBody, PreparedRequest},
	obs::{self, RequestOutcome, RequestSpan},
	request::{Method, MultipartForm, RequestBody, RequestDescriptor, json_body},
};

const JSON: &str = "application/json";

impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Sends `descriptor` and folds the response into an [`Envelope`].
	///
	/// Only a missing response surfaces as `Err`. A `401` additionally clears both credential
	/// slots and resets the session's ready signal; a `403` leaves the credential in place.
	pub async fn send(&self, descriptor: &RequestDescriptor) -> Result<Envelope, TransportError> {
		self.exchange(descriptor).await.map(|(_, envelope)| envelope)
	}

	/// [`send`](Self::send), also returning the HTTP status that produced the envelope.
	pub(crate) async fn exchange(
		&self,
		descriptor: &RequestDescriptor,
	) -> Result<(u16, Envelope), TransportError> {
		let method = descriptor.method();
		let span = RequestSpan::new(method, "send");

		obs::record_request_outcome(method, RequestOutcome::Attempt);

		let result = span
			.instrument(async move {
				let credential = self.credential_for(descriptor).await;
				let request = self.prepare(descriptor, credential.as_ref())?;
				let response = self.transport.execute(request).await?;
				let envelope = Envelope::from_response(&response);

				if envelope.failure().is_some_and(|f| f.kind == FailureKind::Unauthenticated) {
					obs::credentials_cleared(response.status);
					// Per-slot failures are logged by the session.
					let _ = self.session.sign_out().await;
				}

				Ok((response.status, envelope))
			})
			.await;
		let outcome = match &result {
			Ok((_, envelope)) if envelope.is_success() => RequestOutcome::Success,
			Ok(_) => RequestOutcome::Rejected,
			Err(_) => RequestOutcome::TransportFailure,
		};

		obs::record_request_outcome(method, outcome);

		result
	}

	/// `GET path`
	pub async fn get(&self, path: &str) -> Result<Envelope, TransportError> {
		self.send(&RequestDescriptor::get(path)).await
	}

	/// `POST path` with a JSON body.
	pub async fn post<B>(&self, path: &str, body: &B) -> Result<Envelope, TransportError>
	where
		B: ?Sized + Serialize,
	{
		self.send(&RequestDescriptor::post(path).with_body(json_body(body)?)).await
	}

	/// `PUT path` with a JSON body.
	pub async fn put<B>(&self, path: &str, body: &B) -> Result<Envelope, TransportError>
	where
		B: ?Sized + Serialize,
	{
		self.send(&RequestDescriptor::put(path).with_body(json_body(body)?)).await
	}

	/// `PATCH path` with a JSON body.
	pub async fn patch<B>(&self, path: &str, body: &B) -> Result<Envelope, TransportError>
	where
		B: ?Sized + Serialize,
	{
		self.send(&RequestDescriptor::patch(path).with_body(json_body(body)?)).await
	}

	/// `DELETE path`
	pub async fn delete(&self, path: &str) -> Result<Envelope, TransportError> {
		self.send(&RequestDescriptor::delete(path)).await
	}

	/// Sends a multipart form with `method` (usually `POST` or `PATCH`).
	pub async fn upload(
		&self,
		method: Method,
		path: &str,
		form: MultipartForm,
	) -> Result<Envelope, TransportError> {
		self.send(&RequestDescriptor::new(method, path).with_body(form)).await
	}

	async fn credential_for(&self, descriptor: &RequestDescriptor) -> Option<Credential> {
		if !descriptor.is_authenticated() {
			return None;
		}

		let resolved = match self.config.credential_wait() {
			CredentialWait::Retry(policy) => self.resolver().resolve_with_retry(policy).await,
			CredentialWait::Signal { timeout } => self.resolver().wait_ready(timeout).await,
		};

		resolved.unwrap_or_else(|e| {
			obs::store_failure("resolve", None, &e);

			None
		})
	}

	fn prepare(
		&self,
		descriptor: &RequestDescriptor,
		credential: Option<&Credential>,
	) -> Result<PreparedRequest, TransportError> {
		let url = self.config.resolve_url(descriptor.path(), descriptor.query())?;
		let mut headers = BTreeMap::from([("accept".to_owned(), JSON.to_owned())]);

		if !descriptor.body().is_some_and(RequestBody::is_binary) {
			headers.insert("content-type".into(), JSON.into());
		}

		headers.extend(descriptor.headers().clone());

		let body = match descriptor.body() {
			None => PreparedBody::Empty,
			Some(RequestBody::Json(value)) => PreparedBody::Bytes(
				serde_json::to_vec(value).map_err(TransportError::invalid_request)?,
			),
			Some(RequestBody::Text(text)) => PreparedBody::Bytes(text.as_bytes().to_vec()),
			Some(RequestBody::Bytes(bytes)) => PreparedBody::Bytes(bytes.clone()),
			Some(RequestBody::Multipart(form)) => PreparedBody::Multipart(form.clone()),
		};
		let mut request = PreparedRequest { method: descriptor.method(), url, headers, body };

		if let Some(credential) = credential {
			self.signer.attach_credential(&mut request, credential)?;
		}

		Ok(request)
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::{
		auth::Slot,
		config::ClientConfig,
		http::{RawResponse, TransportFuture},
		resolver::RetryPolicy,
		session::Session,
		store::MemoryStore,
	};

	#[derive(Default)]
	struct Recorder {
		requests: Mutex<Vec<PreparedRequest>>,
		calls: AtomicUsize,
	}
	impl HttpTransport for Recorder {
		fn execute(&self, request: PreparedRequest) -> TransportFuture<'_> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.requests.lock().push(request);

			Box::pin(async { Ok(RawResponse::new(200, r#"{"ok":true}"#)) })
		}
	}

	fn client(store: Arc<MemoryStore>) -> ApiClient<Recorder> {
		let config = ClientConfig::builder("https://market.example/api")
			.retry(RetryPolicy::no_retry())
			.build()
			.expect("Test configuration should be valid.");

		ApiClient::with_transport(config, Session::new(store), Recorder::default())
	}

	fn last_request(client: &ApiClient<Recorder>) -> PreparedRequest {
		client.transport.requests.lock().last().cloned().expect("A request should be recorded.")
	}

	#[tokio::test]
	async fn credential_header_wins_over_overrides() {
		let client =
			client(Arc::new(MemoryStore::seeded(Slot::Durable, Credential::new("fresh-token"))));
		let descriptor = RequestDescriptor::get("products/")
			.with_header("Authorization", "Bearer forged")
			.with_header("Content-Type", "application/vnd.agrimarket+json");

		client.send(&descriptor).await.expect("Recorder never fails.");

		let request = last_request(&client);

		assert_eq!(request.url.as_str(), "https://market.example/api/products/");
		assert_eq!(request.header("authorization"), Some("Bearer fresh-token"));
		assert_eq!(request.header("content-type"), Some("application/vnd.agrimarket+json"));
		assert_eq!(request.header("accept"), Some(JSON));
	}

	#[tokio::test]
	async fn missing_credential_sends_without_header() {
		let client = client(Arc::new(MemoryStore::default()));

		client.get("products/").await.expect("Recorder never fails.");

		assert_eq!(last_request(&client).header("authorization"), None);
	}

	#[tokio::test]
	async fn anonymous_requests_skip_the_credential() {
		let client = client(Arc::new(MemoryStore::seeded(Slot::Session, Credential::new("t"))));

		client
			.send(&RequestDescriptor::get("products/").anonymous())
			.await
			.expect("Recorder never fails.");

		assert_eq!(last_request(&client).header("authorization"), None);
	}

	#[tokio::test]
	async fn json_and_binary_bodies() {
		let client = client(Arc::new(MemoryStore::default()));

		client
			.post("orders/", &serde_json::json!({"product": 3, "quantity": 2}))
			.await
			.expect("Recorder never fails.");

		let json = last_request(&client);

		assert_eq!(json.header("content-type"), Some(JSON));
		assert_eq!(json.body, PreparedBody::Bytes(br#"{"product":3,"quantity":2}"#.to_vec()));

		let form = MultipartForm::new().file("avatar", "me.png", Some("image/png"), vec![1_u8, 2]);

		client
			.upload(Method::Patch, "users/profile/", form.clone())
			.await
			.expect("Recorder never fails.");

		let upload = last_request(&client);

		assert_eq!(upload.header("content-type"), None);
		assert_eq!(upload.body, PreparedBody::Multipart(form));
		assert_eq!(upload.method, Method::Patch);
	}

	#[tokio::test]
	async fn invalid_paths_fail_before_the_transport() {
		let client = client(Arc::new(MemoryStore::default()));
		let err = client.get("http://[::1").await.expect_err("Malformed URL must be rejected.");

		assert!(matches!(err, TransportError::InvalidRequest { .. }));
		assert_eq!(client.transport.calls.load(Ordering::SeqCst), 0);
	}
}
