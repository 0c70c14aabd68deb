//! Profile endpoints.

// self
use crate::{
	_prelude::*,
	client::ApiClient,
	envelope::{Envelope, ResponseShape},
	error::TransportError,
	http::HttpTransport,
	request::{Method, MultipartForm},
};

/// `GET`/`PATCH` target for the signed-in user's profile.
pub const PROFILE_PATH: &str = "users/profile/";
/// Multipart `POST` target for profile pictures.
pub const AVATAR_PATH: &str = "users/profile/avatar/";
/// Form field carrying the uploaded picture.
pub const AVATAR_FIELD: &str = "avatar";

/// Marketplace account as returned by the profile and current-user endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
	/// Server-side identifier.
	pub id: u64,
	/// Login name.
	pub username: String,
	/// Contact address; empty when not provided.
	#[serde(default)]
	pub email: String,
	/// Given name.
	#[serde(default)]
	pub first_name: String,
	/// Family name.
	#[serde(default)]
	pub last_name: String,
	/// Marketplace role (`farmer`, `market_agent`, ...), when the backend exposes it.
	#[serde(default)]
	pub role: Option<String>,
	/// Absolute URL of the profile picture.
	#[serde(default)]
	pub avatar: Option<String>,
}

/// Picture uploaded through [`ApiClient::upload_avatar`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarUpload {
	/// File name reported to the server.
	pub file_name: String,
	/// MIME type, e.g. `image/png`.
	pub mime: Option<String>,
	/// Image bytes.
	pub bytes: Vec<u8>,
}

impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Profile of the signed-in user.
	pub async fn profile(&self) -> Result<Envelope, TransportError> {
		self.get(PROFILE_PATH).await
	}

	/// [`profile`](Self::profile) decoded into a [`UserProfile`].
	pub async fn fetch_profile(&self) -> Result<UserProfile> {
		Ok(self.profile().await?.decode(ResponseShape::Object)?)
	}

	/// Partially updates the profile with the fields present in `changes`.
	pub async fn update_profile<B>(&self, changes: &B) -> Result<Envelope, TransportError>
	where
		B: ?Sized + Serialize,
	{
		self.patch(PROFILE_PATH, changes).await
	}

	/// Uploads a new profile picture as `multipart/form-data`.
	pub async fn upload_avatar(&self, file: AvatarUpload) -> Result<Envelope, TransportError> {
		let AvatarUpload { file_name, mime, bytes } = file;
		let form = MultipartForm::new().file(AVATAR_FIELD, file_name, mime.as_deref(), bytes);

		self.upload(Method::Post, AVATAR_PATH, form).await
	}
}
