//! Thread-safe in-memory [`CredentialStore`] for tests, demos, and session-only deployments.

// self
use crate::{
	_prelude::*,
	auth::{Credential, Slot},
	store::{CredentialStore, StoreFuture},
};

type SlotMap = Arc<RwLock<HashMap<Slot, Credential>>>;

/// Storage backend that keeps both slots in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SlotMap);
impl MemoryStore {
	/// Creates a store with `credential` already written to `slot`.
	pub fn seeded(slot: Slot, credential: Credential) -> Self {
		let store = Self::default();

		store.0.write().insert(slot, credential);

		store
	}

	/// Synchronous peek used by tests and diagnostics.
	pub fn snapshot(&self, slot: Slot) -> Option<Credential> {
		self.0.read().get(&slot).cloned()
	}
}
impl CredentialStore for MemoryStore {
	fn load(&self, slot: Slot) -> StoreFuture<'_, Option<Credential>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(&slot).cloned()) })
	}

	fn save(&self, slot: Slot, credential: Credential) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(slot, credential);

			Ok(())
		})
	}

	fn clear(&self, slot: Slot) -> StoreFuture<'_, Option<Credential>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().remove(&slot)) })
	}
}
