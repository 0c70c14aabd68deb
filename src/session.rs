//! Explicit session object owned by the application's composition root.
//!
//! A [`Session`] bundles the credential store with a "credential ready" signal. The auth flow
//! calls [`Session::sign_in`] once it obtains a token, which both writes the chosen slot and
//! wakes every resolver parked in [`CredentialResolver::wait_ready`](crate::resolver::CredentialResolver::wait_ready).
//! Cloning a session is cheap; clones share the store and the signal.

// crates.io
use tokio::sync::watch;
// self
use crate::{
	_prelude::*,
	auth::{Credential, Slot},
	obs,
	store::{CredentialStore, MemoryStore, StoreError},
};

/// Shared credential state handed to [`ApiClient`](crate::client::ApiClient) at construction.
#[derive(Clone)]
pub struct Session {
	store: Arc<dyn CredentialStore>,
	ready: Arc<watch::Sender<bool>>,
}
impl Session {
	/// Wraps an existing store.
	pub fn new(store: Arc<dyn CredentialStore>) -> Self {
		let (ready, _) = watch::channel(false);

		Self { store, ready: Arc::new(ready) }
	}

	/// Session backed by a fresh [`MemoryStore`].
	pub fn in_memory() -> Self {
		Self::new(Arc::new(MemoryStore::default()))
	}

	/// Underlying credential store.
	pub fn store(&self) -> &dyn CredentialStore {
		self.store.as_ref()
	}

	/// Writes `credential` to `slot`, empties the other slot, and fires the ready signal.
	pub async fn sign_in(&self, credential: Credential, slot: Slot) -> Result<(), StoreError> {
		self.store.save(slot, credential).await?;
		self.store.clear(slot.other()).await?;
		self.ready.send_replace(true);

		Ok(())
	}

	/// Empties both slots and resets the ready signal.
	///
	/// Both slots are attempted even when the first clear fails; the first failure is returned.
	pub async fn sign_out(&self) -> Result<(), StoreError> {
		self.ready.send_replace(false);

		let mut first_err = None;

		for slot in Slot::RESOLUTION_ORDER {
			if let Err(e) = self.store.clear(slot).await {
				obs::store_failure("sign_out", Some(slot), &e);

				first_err.get_or_insert(e);
			}
		}

		match first_err {
			Some(e) => Err(e),
			None => Ok(()),
		}
	}

	/// Returns `true` once [`Session::sign_in`] has completed and no sign-out followed.
	pub fn is_signalled(&self) -> bool {
		*self.ready.borrow()
	}

	pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
		self.ready.subscribe()
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session").field("signalled", &self.is_signalled()).finish()
	}
}
