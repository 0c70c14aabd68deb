//! Sign-in, sign-out, and current-user endpoints.

// self
use crate::{
	_prelude::*,
	api::UserProfile,
	auth::{Credential, Slot},
	client::ApiClient,
	envelope::{Envelope, ResponseShape},
	error::TransportError,
	http::HttpTransport,
	obs::{self, RequestSpan},
	request::{Method, RequestDescriptor, json_body},
};

/// `POST` target for username/password sign-in.
pub const LOGIN_PATH: &str = "auth/login/";
/// `POST` target that invalidates the server-side token.
pub const LOGOUT_PATH: &str = "auth/logout/";
/// `GET` target describing the signed-in user.
pub const CURRENT_USER_PATH: &str = "auth/user/";

/// Keys under which Django auth backends return the issued token, in lookup order.
const TOKEN_KEYS: [&str; 3] = ["token", "access", "key"];

#[derive(Serialize)]
struct LoginRequest<'a> {
	username: &'a str,
	password: &'a str,
}

impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Signs in and, on success, stores the returned token in `slot` through the session.
	///
	/// The request itself is sent without a credential. A `2xx` body without a usable token is
	/// reported as a malformed response. Storage failures are logged; the envelope is returned
	/// as received.
	pub async fn login(
		&self,
		username: &str,
		password: &str,
		slot: Slot,
	) -> Result<Envelope, TransportError> {
		let span = RequestSpan::new(Method::Post, "login");

		span.instrument(async move {
			let descriptor = RequestDescriptor::post(LOGIN_PATH)
				.with_body(json_body(&LoginRequest { username, password })?)
				.anonymous();
			let (status, envelope) = self.exchange(&descriptor).await?;
			let Some(data) = envelope.data() else {
				return Ok(envelope);
			};
			let Some(token) = extract_token(data) else {
				return Ok(Envelope::malformed(
					"Sign-in response did not include a token.",
					Some(status),
				));
			};

			if let Err(e) = self.session.sign_in(Credential::new(token), slot).await {
				obs::store_failure("login", Some(slot), &e);
			}

			Ok(envelope)
		})
		.await
	}

	/// Notifies the server and clears both credential slots, whatever the server answered.
	pub async fn logout(&self) -> Result<Envelope, TransportError> {
		let result = self.send(&RequestDescriptor::post(LOGOUT_PATH)).await;

		// Per-slot failures are logged by the session.
		let _ = self.session.sign_out().await;

		result
	}

	/// Profile of the signed-in user.
	pub async fn current_user(&self) -> Result<Envelope, TransportError> {
		self.get(CURRENT_USER_PATH).await
	}

	/// [`current_user`](Self::current_user) decoded into a [`UserProfile`].
	pub async fn fetch_current_user(&self) -> Result<UserProfile> {
		Ok(self.current_user().await?.decode(ResponseShape::Object)?)
	}
}

fn extract_token(data: &Value) -> Option<String> {
	TOKEN_KEYS.iter().find_map(|key| {
		data.get(key)
			.and_then(Value::as_str)
			.map(str::trim)
			.filter(|token| !token.is_empty())
			.map(str::to_owned)
	})
}
