//! Refresh-token rotation with a process-wide serialization guard.
//!
//! All refresh work funnels through one async mutex. Callers that lose the race re-read
//! the store after acquiring the lock; when the stored access token already differs from
//! the one they observed, the concurrent rotation's result is reused instead of burning
//! the refresh token a second time. Providers may rotate refresh tokens on every use, so
//! a duplicate refresh with a stale secret would be rejected outright.

// self
use crate::{
	_prelude::*,
	error::TokenRefreshError,
	guard::TokenGuard,
	http::TokenHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	token::TokenSecret,
};

impl<C> TokenGuard<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Refreshes the access token using the provided refresh token.
	///
	/// On success the stored record is replaced with the fresh grant. When the provider
	/// omits `refresh_token` from the response, the supplied secret is retained so future
	/// refreshes keep working.
	pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenSecret> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh_access_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				if refresh_token.trim().is_empty() {
					return Err(TokenRefreshError::MissingRefreshToken.into());
				}

				let guard = self.refresh_guard();
				let _serialized = guard.lock().await;

				self.refresh_locked(refresh_token).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Refreshes the stored record, reusing a concurrent rotation's result when one
	/// finished between the caller observing `observed_access` and acquiring the lock.
	pub(crate) async fn refresh_current(&self, observed_access: &str) -> Result<TokenSecret> {
		let guard = self.refresh_guard();
		let _serialized = guard.lock().await;
		let current = self
			.store
			.load_current()
			.await?
			.ok_or(TokenRefreshError::MissingRefreshToken)?;

		if current.access_token.expose() != observed_access {
			self.refresh_metrics.record_reuse();

			return Ok(current.access_token);
		}

		let refresh_token = current
			.refresh_token
			.as_ref()
			.map(|secret| secret.expose().to_owned())
			.ok_or(TokenRefreshError::MissingRefreshToken)?;

		self.refresh_locked(&refresh_token).await
	}

	// Callers must hold the refresh guard.
	async fn refresh_locked(&self, refresh_token: &str) -> Result<TokenSecret> {
		self.refresh_metrics.record_attempt();

		let grant = self
			.endpoint()
			.inspect_err(|_| self.refresh_metrics.record_failure())?
			.refresh(refresh_token)
			.await
			.map_err(|err| {
				self.refresh_metrics.record_failure();

				err.into_refresh()
			})?;
		let retained =
			grant.refresh_token.is_none().then(|| TokenSecret::new(refresh_token));
		let record = self
			.record_from_grant(grant, retained)
			.inspect_err(|_| self.refresh_metrics.record_failure())?;
		let access = record.access_token.clone();

		self.store.save(record).await.inspect_err(|_| self.refresh_metrics.record_failure())?;
		self.refresh_metrics.record_success();

		Ok(access)
	}
}
