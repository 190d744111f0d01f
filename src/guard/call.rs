//! Guarded upstream calls: proactive refresh plus a single reactive retry on 401.

// self
use crate::{
	_prelude::*,
	error::ApiRequestError,
	guard::TokenGuard,
	http::TokenHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Responses the guard can inspect for authorization failures.
///
/// The guard never reads bodies or other headers; classifying a response as unauthorized
/// is the only transport knowledge the retry loop needs.
pub trait GuardedResponse {
	/// Returns `true` when the upstream rejected the bearer token (HTTP 401).
	fn is_unauthorized(&self) -> bool;
}
#[cfg(feature = "reqwest")]
impl GuardedResponse for reqwest::Response {
	fn is_unauthorized(&self) -> bool {
		self.status() == reqwest::StatusCode::UNAUTHORIZED
	}
}

impl<C> TokenGuard<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Runs `request` with a valid access token, refreshing at most once.
	///
	/// The closure receives the access token to use and is invoked at most twice: once
	/// with the current (possibly proactively refreshed) token, and once more after a
	/// reactive refresh if the first attempt came back unauthorized. A 401 observed after
	/// any refresh in this call fails with [`ApiRequestError::FreshTokenRejected`] rather
	/// than looping. Non-authorization failures are returned immediately without touching
	/// the stored record.
	pub async fn call_with_auto_refresh<F, Fut, R, E>(&self, mut request: F) -> Result<R>
	where
		F: FnMut(String) -> Fut,
		Fut: Future<Output = Result<R, E>>,
		R: GuardedResponse,
		E: 'static + Send + Sync + StdError,
	{
		const KIND: FlowKind = FlowKind::GuardedCall;

		let span = FlowSpan::new(KIND, "call_with_auto_refresh");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let record = self
					.store
					.load_current()
					.await?
					.ok_or(ApiRequestError::MissingToken)?;
				let now = OffsetDateTime::now_utc();
				let mut refreshed = false;
				let mut access = record.access_token.expose().to_owned();

				if self.policy.should_refresh(&record, now) {
					access = self
						.refresh_current(&access)
						.await
						.map_err(wrap_refresh_failure)?
						.expose()
						.to_owned();
					refreshed = true;
				}

				let response = request(access.clone())
					.await
					.map_err(|e| ApiRequestError::Transport { source: Box::new(e) })?;

				if !response.is_unauthorized() {
					return Ok(response);
				}
				if refreshed {
					return Err(ApiRequestError::FreshTokenRejected.into());
				}

				let fresh_access = self
					.refresh_current(&access)
					.await
					.map_err(wrap_refresh_failure)?
					.expose()
					.to_owned();
				let retry = request(fresh_access)
					.await
					.map_err(|e| ApiRequestError::RetryFailed { source: Box::new(e) })?;

				if retry.is_unauthorized() {
					return Err(ApiRequestError::FreshTokenRejected.into());
				}

				Ok(retry)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}

fn wrap_refresh_failure(err: Error) -> Error {
	match err {
		Error::Refresh(source) => ApiRequestError::RefreshFailed { source }.into(),
		other => other,
	}
}
