//! Storage contracts and the built-in store for pending authorization state.

pub mod memory;

pub use memory::MemoryStateStore;

// self
use crate::{_prelude::*, secret::Secret};

/// Boxed future returned by [`StateStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// State and PKCE verifier remembered between the authorize redirect and the callback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAuthorization {
	/// Opaque CSRF state echoed back by the provider.
	pub state: String,
	/// PKCE code verifier matching the challenge sent to the provider.
	pub verifier: Secret,
	/// Instant the authorization was started.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}
impl PendingAuthorization {
	/// Whether the entry is older than `ttl` at `now`.
	pub fn is_expired_at(&self, now: OffsetDateTime, ttl: Duration) -> bool {
		now - self.created_at > ttl
	}
}

/// Storage backend contract for pending authorizations.
pub trait StateStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the entry keyed by its state.
	fn save(&self, pending: PendingAuthorization) -> StoreFuture<'_, ()>;

	/// Removes and returns the entry for `state`; a state can be taken at most once.
	fn take<'a>(&'a self, state: &'a str) -> StoreFuture<'a, Option<PendingAuthorization>>;

	/// Whether an entry exists for `state` without consuming it.
	fn contains<'a>(&'a self, state: &'a str) -> StoreFuture<'a, bool>;

	/// Drops entries created before `cutoff`, returning how many were removed.
	fn prune(&self, cutoff: OffsetDateTime) -> StoreFuture<'_, usize>;
}

/// Error type produced by [`StateStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
