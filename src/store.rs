//! Storage contracts and built-in single-row token stores.
//!
//! The system is single-tenant: at most one [`TokenRecord`] exists at any time, so the
//! contract is a single-slot store with replace-on-write semantics. [`TokenStore::save`]
//! always overwrites; there is no append path.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, token::TokenRecord};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for the guard's single token record.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Persists the record, replacing any existing one.
	fn save(&self, record: TokenRecord) -> StoreFuture<'_, ()>;

	/// Fetches the current record, if present.
	fn load_current(&self) -> StoreFuture<'_, Option<TokenRecord>>;

	/// Removes the current record, returning it if one existed.
	fn clear(&self) -> StoreFuture<'_, Option<TokenRecord>>;
}

/// Error type produced by [`TokenStore`] implementations.
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
