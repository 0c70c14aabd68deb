//! Credential resolution with bounded retry for the startup race.
//!
//! At application start the first API call can run before the auth flow has written the token.
//! [`CredentialResolver::resolve_with_retry`] absorbs that race by re-checking the store with an
//! exponentially growing delay; [`CredentialResolver::wait_ready`] is the signal-driven
//! alternative that parks until [`Session::sign_in`](crate::session::Session::sign_in) fires.

// self
use crate::{
	_prelude::*,
	auth::{Credential, Slot},
	obs,
	session::Session,
	store::StoreError,
};

/// Bounded exponential retry used while waiting for a credential to appear.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Total number of store checks, including the first one.
	pub max_attempts: u32,
	/// Delay after the first miss; doubled after every further miss.
	pub initial_delay: Duration,
}
impl RetryPolicy {
	/// Three attempts.
	pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
	/// 100 milliseconds.
	pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(100);

	/// Creates a policy with the provided attempt budget and base delay.
	pub const fn new(max_attempts: u32, initial_delay: Duration) -> Self {
		Self { max_attempts, initial_delay }
	}

	/// Single check, no waiting.
	pub const fn no_retry() -> Self {
		Self::new(1, Duration::ZERO)
	}

	/// Delay to sleep after the miss on `attempt` (zero-indexed).
	pub fn delay_after(&self, attempt: u32) -> Duration {
		2_u32
			.checked_pow(attempt)
			.and_then(|factor| self.initial_delay.checked_mul(factor))
			.unwrap_or(Duration::MAX)
	}

	fn attempts(&self) -> u32 {
		self.max_attempts.max(1)
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_INITIAL_DELAY)
	}
}

/// Read-only view over a [`Session`] that finds the credential to attach to a request.
#[derive(Clone, Debug)]
pub struct CredentialResolver {
	session: Session,
}
impl CredentialResolver {
	/// Creates a resolver over `session`.
	pub fn new(session: Session) -> Self {
		Self { session }
	}

	/// Returns the first non-blank credential, checking the durable slot before the session slot.
	pub async fn resolve(&self) -> Result<Option<Credential>, StoreError> {
		for slot in Slot::RESOLUTION_ORDER {
			let found = self.session.store().load(slot).await?;

			if let Some(credential) = found.filter(|c| !c.is_blank()) {
				return Ok(Some(credential));
			}
		}

		Ok(None)
	}

	/// Calls [`resolve`](Self::resolve) up to `policy.max_attempts` times, sleeping
	/// `initial_delay * 2^n` between misses. Never sleeps after a hit or after the final miss.
	pub async fn resolve_with_retry(
		&self,
		policy: RetryPolicy,
	) -> Result<Option<Credential>, StoreError> {
		let attempts = policy.attempts();

		for attempt in 0..attempts {
			if let Some(credential) = self.resolve().await? {
				return Ok(Some(credential));
			}
			if attempt + 1 == attempts {
				break;
			}

			let delay = policy.delay_after(attempt);

			obs::credential_retry(attempt + 1, attempts, delay);
			tokio::time::sleep(delay).await;
		}

		Ok(None)
	}

	/// Resolves immediately when a credential is stored; otherwise parks until the session's
	/// ready signal fires or `timeout` elapses, then resolves once more.
	///
	/// A signal that already fired (and was not reset by a sign-out) does not park.
	pub async fn wait_ready(&self, timeout: Duration) -> Result<Option<Credential>, StoreError> {
		let mut ready = self.session.subscribe();

		if let Some(credential) = self.resolve().await? {
			return Ok(Some(credential));
		}

		// Timing out is not an error; the store may have been written without a sign-in.
		let _ = tokio::time::timeout(timeout, ready.wait_for(|ready| *ready)).await;

		self.resolve().await
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::time::Instant;
	// self
	use super::*;
	use crate::store::{CredentialStore, MemoryStore};

	fn resolver_over(store: Arc<MemoryStore>) -> CredentialResolver {
		CredentialResolver::new(Session::new(store))
	}

	#[test]
	fn delay_doubles_per_attempt() {
		let policy = RetryPolicy::new(4, Duration::from_millis(100));

		assert_eq!(policy.delay_after(0), Duration::from_millis(100));
		assert_eq!(policy.delay_after(1), Duration::from_millis(200));
		assert_eq!(policy.delay_after(2), Duration::from_millis(400));
		assert_eq!(policy.delay_after(40), Duration::MAX);
	}

	#[tokio::test]
	async fn resolve_prefers_durable_slot() {
		let store = Arc::new(MemoryStore::seeded(Slot::Session, Credential::new("session")));

		store
			.save(Slot::Durable, Credential::new("durable"))
			.await
			.expect("Saving the durable credential should succeed.");

		let resolved = resolver_over(store)
			.resolve()
			.await
			.expect("Resolution should succeed.")
			.expect("A credential should be found.");

		assert_eq!(resolved.expose(), "durable");
	}

	#[tokio::test]
	async fn resolve_skips_blank_values() {
		let store = Arc::new(MemoryStore::seeded(Slot::Durable, Credential::new("  ")));

		store
			.save(Slot::Session, Credential::new("session"))
			.await
			.expect("Saving the session credential should succeed.");

		let resolved = resolver_over(store).resolve().await.expect("Resolution should succeed.");

		assert_eq!(resolved.map(|c| c.expose().to_owned()), Some("session".into()));
	}

	#[tokio::test]
	async fn resolve_is_idempotent_without_writes() {
		let store = Arc::new(MemoryStore::seeded(Slot::Durable, Credential::new("stable")));
		let resolver = resolver_over(store);
		let first = resolver.resolve().await.expect("First resolution should succeed.");
		let second = resolver.resolve().await.expect("Second resolution should succeed.");

		assert_eq!(first, second);
		assert!(first.is_some());
	}

	#[tokio::test]
	async fn present_credential_returns_without_delay() {
		let store = Arc::new(MemoryStore::seeded(Slot::Durable, Credential::new("ready")));
		let resolver = resolver_over(store);
		let started = Instant::now();
		let resolved = resolver
			.resolve_with_retry(RetryPolicy::new(3, Duration::from_millis(500)))
			.await
			.expect("Resolution should succeed.");

		assert!(resolved.is_some());
		assert!(started.elapsed() < Duration::from_millis(250));
	}

	#[tokio::test]
	async fn late_credential_is_picked_up_by_a_retry() {
		let store = Arc::new(MemoryStore::default());
		let resolver = resolver_over(store.clone());
		let writer = tokio::spawn(async move {
			tokio::time::sleep(Duration::from_millis(150)).await;
			store
				.save(Slot::Session, Credential::new("late-token"))
				.await
				.expect("Late write should succeed.");
		});
		let started = Instant::now();
		let resolved = resolver
			.resolve_with_retry(RetryPolicy::new(3, Duration::from_millis(100)))
			.await
			.expect("Resolution should succeed.");
		let elapsed = started.elapsed();

		writer.await.expect("Writer task should not panic.");

		assert_eq!(resolved.map(|c| c.expose().to_owned()), Some("late-token".into()));
		assert!(elapsed >= Duration::from_millis(100), "Resolved too early: {elapsed:?}.");
		assert!(elapsed < Duration::from_millis(700), "Resolved too late: {elapsed:?}.");
	}

	#[tokio::test]
	async fn exhausted_attempts_return_none() {
		let resolver = resolver_over(Arc::new(MemoryStore::default()));
		let started = Instant::now();
		let resolved = resolver
			.resolve_with_retry(RetryPolicy::new(3, Duration::from_millis(10)))
			.await
			.expect("Resolution should succeed.");

		assert!(resolved.is_none());
		// 10ms + 20ms of sleeping, nothing after the final miss.
		assert!(started.elapsed() >= Duration::from_millis(30));
	}

	#[tokio::test]
	async fn wait_ready_wakes_on_sign_in() {
		let session = Session::in_memory();
		let resolver = CredentialResolver::new(session.clone());
		let signer = tokio::spawn(async move {
			tokio::time::sleep(Duration::from_millis(50)).await;
			session
				.sign_in(Credential::new("signalled"), Slot::Durable)
				.await
				.expect("Sign-in should succeed.");
		});
		let resolved = resolver
			.wait_ready(Duration::from_secs(5))
			.await
			.expect("Waiting for the credential should succeed.");

		signer.await.expect("Sign-in task should not panic.");

		assert_eq!(resolved.map(|c| c.expose().to_owned()), Some("signalled".into()));
	}

	#[tokio::test]
	async fn wait_ready_times_out_without_sign_in() {
		let resolver = CredentialResolver::new(Session::in_memory());
		let resolved = resolver
			.wait_ready(Duration::from_millis(20))
			.await
			.expect("Waiting for the credential should succeed.");

		assert!(resolved.is_none());
	}

	#[tokio::test]
	async fn wait_ready_rechecks_store_after_timeout() {
		let store = Arc::new(MemoryStore::default());
		let resolver = resolver_over(store.clone());
		let writer = tokio::spawn(async move {
			tokio::time::sleep(Duration::from_millis(10)).await;
			store
				.save(Slot::Durable, Credential::new("written-directly"))
				.await
				.expect("Direct write should succeed.");
		});
		let resolved = resolver
			.wait_ready(Duration::from_millis(100))
			.await
			.expect("Waiting for the credential should succeed.");

		writer.await.expect("Writer task should not panic.");

		assert_eq!(resolved.map(|c| c.expose().to_owned()), Some("written-directly".into()));
	}
}
