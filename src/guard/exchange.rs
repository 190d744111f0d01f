//! Authorization-code exchange: trade the redirect's code for the initial token pair.

// self
use crate::{
	_prelude::*,
	error::TokenExchangeError,
	guard::TokenGuard,
	http::TokenHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	token::TokenPair,
};

impl<C> TokenGuard<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Exchanges an authorization code for the initial access/refresh token pair.
	///
	/// The resulting record replaces whatever the store currently holds, so reconnecting
	/// after a revoked grant needs no separate cleanup step. The exchange serializes with
	/// in-flight refreshes so a late exchange cannot be overwritten by a refresh that was
	/// already running against the previous record.
	pub async fn exchange_authorization_code(&self, code: &str) -> Result<TokenPair> {
		const KIND: FlowKind = FlowKind::Exchange;

		let span = FlowSpan::new(KIND, "exchange_authorization_code");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				if code.trim().is_empty() {
					return Err(TokenExchangeError::EmptyCode.into());
				}

				let guard = self.refresh_guard();
				let _serialized = guard.lock().await;
				let grant = self
					.endpoint()?
					.exchange_code(code)
					.await
					.map_err(|err| err.into_exchange())?;
				let record = self.record_from_grant(grant, None)?;
				let pair = TokenPair {
					access_token: record.access_token.clone(),
					refresh_token: record.refresh_token.clone(),
				};

				self.store.save(record).await?;

				Ok(pair)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
