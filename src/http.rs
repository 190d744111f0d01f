//! Transport primitives for token-endpoint exchanges.
//!
//! The module exposes [`TokenHttpClient`] alongside [`StatusSlot`] so downstream code
//! can integrate custom HTTP clients without losing the guard's error classification.
//! Implementations call [`StatusSlot::take`] before dispatching a request and
//! [`StatusSlot::store`] once an HTTP status is known, so the facade can attach the
//! status to rejection and parse errors.

// std
use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
// self
use crate::_prelude::*;

/// Abstraction over HTTP transports capable of executing token-endpoint exchanges while
/// publishing the observed response status to the guard's error mapping.
///
/// The trait is the guard's only dependency on an HTTP stack. Callers provide an
/// implementation (typically behind `Arc<T>` where `T: TokenHttpClient`) and the guard
/// requests short-lived [`AsyncHttpClient`] handles that each carry a clone of a
/// [`StatusSlot`]. Handles must own whatever state they need so their request futures
/// remain `Send` for the lifetime of the in-flight operation.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle tied to a [`StatusSlot`].
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds an [`AsyncHttpClient`] handle that records outcomes in `slot`.
	///
	/// Implementations must drain the slot with [`StatusSlot::take`] before submitting
	/// the request so stale statuses never leak across attempts, and store the response
	/// status as soon as one is available.
	fn with_status(&self, slot: StatusSlot) -> Self::Handle;
}

/// Thread-safe slot sharing the most recent HTTP status between transport and errors.
///
/// The guard creates a fresh slot for each token request and reads the captured status
/// immediately after the exchange resolves.
#[derive(Clone, Debug, Default)]
pub struct StatusSlot(Arc<Mutex<Option<u16>>>);
impl StatusSlot {
	/// Stores the status code observed for the current request.
	pub fn store(&self, status: u16) {
		*self.0.lock() = Some(status);
	}

	/// Returns the captured status, if any, consuming it from the slot.
	pub fn take(&self) -> Option<u16> {
		self.0.lock().take()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Token requests should not follow redirects, matching OAuth 2.0 guidance that token
/// endpoints return results directly instead of delegating to another URI.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

#[cfg(feature = "reqwest")]
/// Instrumented adapter that implements [`AsyncHttpClient`] for reqwest.
pub(crate) struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: StatusSlot,
}

#[cfg(feature = "reqwest")]
/// Public handle returned by [`ReqwestHttpClient`] that satisfies [`TokenHttpClient`].
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
#[cfg(feature = "reqwest")]
impl InstrumentedHandle {
	fn new(client: ReqwestClient, slot: StatusSlot) -> Self {
		Self(Arc::new(InstrumentedHttpClient { client, slot }))
	}
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let response = client
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();

			client.slot.store(status.as_u16());

			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
#[cfg(feature = "reqwest")]
impl TokenHttpClient for ReqwestHttpClient {
	type Handle = InstrumentedHandle;
	type TransportError = ReqwestError;

	fn with_status(&self, slot: StatusSlot) -> Self::Handle {
		InstrumentedHandle::new(self.0.clone(), slot)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_slot_is_consumed_on_take() {
		let slot = StatusSlot::default();

		assert_eq!(slot.take(), None);

		slot.store(401);

		assert_eq!(slot.take(), Some(401));
		assert_eq!(slot.take(), None);
	}
}
