//! Thread-safe in-memory [`TokenStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	store::{StoreError, StoreFuture, TokenStore},
	token::TokenRecord,
};

type StoreSlot = Arc<RwLock<Option<TokenRecord>>>;

/// Thread-safe single-slot backend that keeps the record in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreSlot);
impl MemoryStore {
	fn save_now(slot: StoreSlot, record: TokenRecord) -> Result<(), StoreError> {
		*slot.write() = Some(record);

		Ok(())
	}

	fn load_now(slot: StoreSlot) -> Option<TokenRecord> {
		slot.read().clone()
	}

	fn clear_now(slot: StoreSlot) -> Option<TokenRecord> {
		slot.write().take()
	}
}
impl TokenStore for MemoryStore {
	fn save(&self, record: TokenRecord) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move { Self::save_now(slot, record) })
	}

	fn load_current(&self) -> StoreFuture<'_, Option<TokenRecord>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(Self::load_now(slot)) })
	}

	fn clear(&self) -> StoreFuture<'_, Option<TokenRecord>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(Self::clear_now(slot)) })
	}
}
