//! Thread-safe in-memory [`StateStore`] implementation for single-instance deployments and tests.

// self
use crate::{
	_prelude::*,
	store::{PendingAuthorization, StateStore, StoreError, StoreFuture},
};

type StateMap = Arc<RwLock<HashMap<String, PendingAuthorization>>>;

/// Storage backend that keeps pending authorizations in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStateStore(StateMap);
impl MemoryStateStore {
	/// Number of pending entries.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Whether no entries are pending.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn save_now(map: StateMap, pending: PendingAuthorization) -> Result<(), StoreError> {
		map.write().insert(pending.state.clone(), pending);

		Ok(())
	}

	fn prune_now(map: StateMap, cutoff: OffsetDateTime) -> usize {
		let mut guard = map.write();
		let before = guard.len();

		guard.retain(|_, pending| pending.created_at >= cutoff);

		before - guard.len()
	}
}
impl StateStore for MemoryStateStore {
	fn save(&self, pending: PendingAuthorization) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::save_now(map, pending) })
	}

	fn take<'a>(&'a self, state: &'a str) -> StoreFuture<'a, Option<PendingAuthorization>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().remove(state)) })
	}

	fn contains<'a>(&'a self, state: &'a str) -> StoreFuture<'a, bool> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().contains_key(state)) })
	}

	fn prune(&self, cutoff: OffsetDateTime) -> StoreFuture<'_, usize> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::prune_now(map, cutoff)) })
	}
}
