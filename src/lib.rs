//! Single-tenant OAuth 2.0 token guard—transparent, race-tolerant refresh and guarded
//! upstream calls for a personal music-analytics service.
//!
//! The crate owns the process's sole access/refresh token pair, decides when it is
//! stale, performs the refresh exchange against the upstream token endpoint, and wraps
//! arbitrary outbound calls so they always carry a currently-valid bearer token.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod error;
pub mod guard;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod store;
pub mod token;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		guard::TokenGuard,
		http::ReqwestHttpClient,
		provider::Provider,
		store::{MemoryStore, TokenStore},
	};

	/// Guard type alias used by reqwest-backed integration tests.
	pub type ReqwestTestGuard = TokenGuard<ReqwestHttpClient>;

	/// Constructs a [`TokenGuard`] backed by an in-memory store and the reqwest transport
	/// used across integration tests.
	pub fn build_test_guard(
		provider: Provider,
		client_id: &str,
		client_secret: &str,
	) -> (ReqwestTestGuard, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn TokenStore> = store_backend.clone();
		let guard = TokenGuard::new(store, provider, client_id).with_client_secret(client_secret);

		(guard, store_backend)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, tokio as _};
