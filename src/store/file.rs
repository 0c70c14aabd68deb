//! File-backed [`CredentialStore`] whose durable slot survives restarts.

// std
use std::{
	fs, io,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{CREDENTIAL_KEY, Credential, Slot},
	store::{CredentialStore, StoreError, StoreFuture},
};

/// On-disk layout: `{"authToken": "..."}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
	#[serde(rename = "authToken", default, skip_serializing_if = "Option::is_none")]
	auth_token: Option<Credential>,
}

/// Keeps the durable slot in a JSON file and the session slot in memory.
///
/// Every durable write replaces the file through a sibling `.tmp` file and a rename, so a crash
/// leaves either the old token or the new one on disk.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	durable: Arc<RwLock<Option<Credential>>>,
	session: Arc<RwLock<Option<Credential>>>,
}
impl FileStore {
	/// Opens the store at `path`, reading a previously persisted durable credential.
	///
	/// A missing or blank file starts empty; the parent directory is created on demand.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		create_parent(&path)?;

		let durable = read_snapshot(&path)?.auth_token;

		Ok(Self { path, durable: Arc::new(RwLock::new(durable)), session: Default::default() })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn write_durable(&self, credential: Option<&Credential>) -> Result<(), StoreError> {
		let bytes = serde_json::to_vec_pretty(&Snapshot { auth_token: credential.cloned() })
			.map_err(|e| StoreError::Serialization {
				message: format!("Cannot encode the {CREDENTIAL_KEY} snapshot: {e}"),
			})?;
		let staging = self.path.with_extension("tmp");

		create_parent(&self.path)?;
		fs::write(&staging, bytes).map_err(|e| backend_error("write", &staging, e))?;
		fs::rename(&staging, &self.path).map_err(|e| backend_error("replace", &self.path, e))
	}

	fn cell(&self, slot: Slot) -> &RwLock<Option<Credential>> {
		match slot {
			Slot::Durable => &self.durable,
			Slot::Session => &self.session,
		}
	}
}
impl CredentialStore for FileStore {
	fn load(&self, slot: Slot) -> StoreFuture<'_, Option<Credential>> {
		Box::pin(async move { Ok(self.cell(slot).read().clone()) })
	}

	fn save(&self, slot: Slot, credential: Credential) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut cell = self.cell(slot).write();

			if slot == Slot::Durable {
				self.write_durable(Some(&credential))?;
			}

			*cell = Some(credential);

			Ok(())
		})
	}

	fn clear(&self, slot: Slot) -> StoreFuture<'_, Option<Credential>> {
		Box::pin(async move {
			let mut cell = self.cell(slot).write();

			if slot == Slot::Durable && cell.is_some() {
				self.write_durable(None)?;
			}

			Ok(cell.take())
		})
	}
}

fn read_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
	let bytes = match fs::read(path) {
		Ok(bytes) => bytes,
		Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Snapshot::default()),
		Err(e) => return Err(backend_error("read", path, e)),
	};

	if bytes.iter().all(u8::is_ascii_whitespace) {
		return Ok(Snapshot::default());
	}

	serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
		message: format!("{} is not a credential snapshot: {e}", path.display()),
	})
}

fn create_parent(path: &Path) -> Result<(), StoreError> {
	match path.parent() {
		Some(dir) if !dir.as_os_str().is_empty() =>
			fs::create_dir_all(dir).map_err(|e| backend_error("create", dir, e)),
		_ => Ok(()),
	}
}

fn backend_error(action: &str, path: &Path, e: io::Error) -> StoreError {
	StoreError::Backend { message: format!("Cannot {action} {}: {e}", path.display()) }
}
