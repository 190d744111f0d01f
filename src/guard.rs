//! The guard facade: owns the stored token pair and every operation that touches it.

pub mod call;
pub mod connect;
pub mod policy;
pub mod refresh;

mod exchange;
mod metrics;

pub use call::*;
pub use connect::*;
pub use metrics::RefreshMetrics;
pub use policy::*;

// self
use crate::{
	_prelude::*,
	http::TokenHttpClient,
	oauth::{TokenEndpoint, TokenGrant},
	provider::Provider,
	store::TokenStore,
	token::{TokenRecord, TokenSecret},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Guard specialized for the crate's default reqwest transport stack.
pub type ReqwestTokenGuard = TokenGuard<ReqwestHttpClient>;

/// Guarantees outbound calls to the upstream music API carry a valid bearer token.
///
/// The guard owns the HTTP client, the single-row token store, and the provider
/// configuration, so flow implementations can focus on grant logic (code exchange,
/// refresh rotation, guarded retries). One guard is constructed per process and handed
/// by reference to whatever needs upstream access; there is no hidden global state.
#[derive(Clone)]
pub struct TokenGuard<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// HTTP client wrapper used for every token-endpoint request.
	pub http_client: Arc<C>,
	/// Store holding the process's single token record.
	pub store: Arc<dyn TokenStore>,
	/// Upstream endpoint configuration.
	pub provider: Provider,
	/// OAuth 2.0 client identifier used in every grant.
	pub client_id: String,
	/// Optional client secret for confidential authentication methods.
	pub client_secret: Option<String>,
	/// Redirect URI registered with the provider, when the code exchange needs one.
	pub redirect_uri: Option<Url>,
	/// Grace window and fallback-TTL heuristics applied to stored records.
	pub policy: RefreshPolicy,
	/// Shared metrics recorder for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<C> TokenGuard<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates a guard that reuses the caller-provided transport.
	pub fn with_http_client(
		store: Arc<dyn TokenStore>,
		provider: Provider,
		client_id: impl Into<String>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			store,
			provider,
			client_id: client_id.into(),
			client_secret: None,
			redirect_uri: None,
			policy: Default::default(),
			refresh_metrics: Default::default(),
			refresh_guard: Default::default(),
		}
	}

	/// Sets or replaces the client secret used for confidential client auth modes.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Sets the redirect URI sent with the authorization-code exchange.
	pub fn with_redirect_uri(mut self, uri: Url) -> Self {
		self.redirect_uri = Some(uri);

		self
	}

	/// Overrides the refresh policy (grace window, fallback TTL).
	pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
		self.policy = policy;

		self
	}

	/// Returns the currently stored access token, if any.
	pub async fn access_token(&self) -> Result<Option<String>> {
		Ok(self
			.store
			.load_current()
			.await?
			.map(|record| record.access_token.expose().to_owned()))
	}

	/// Returns the currently stored refresh token, if any.
	pub async fn refresh_token(&self) -> Result<Option<String>> {
		Ok(self
			.store
			.load_current()
			.await?
			.and_then(|record| record.refresh_token.map(|secret| secret.expose().to_owned())))
	}

	/// Returns `true` if a record exists and has not passed its expiry instant.
	pub async fn has_valid_token(&self) -> Result<bool> {
		let now = OffsetDateTime::now_utc();

		Ok(self
			.store
			.load_current()
			.await?
			.map(|record| !record.is_expired_at(now))
			.unwrap_or(false))
	}

	/// Returns `true` if the stored record is inside the grace window or expired.
	pub async fn needs_refresh(&self) -> Result<bool> {
		let now = OffsetDateTime::now_utc();

		Ok(self
			.store
			.load_current()
			.await?
			.map(|record| self.policy.should_refresh(&record, now))
			.unwrap_or(false))
	}

	/// Removes the stored record (explicit disconnect), returning it if one existed.
	pub async fn disconnect(&self) -> Result<Option<TokenRecord>> {
		Ok(self.store.clear().await?)
	}

	pub(crate) fn endpoint(&self) -> Result<TokenEndpoint<C>> {
		Ok(TokenEndpoint::from_provider(
			&self.provider,
			&self.client_id,
			self.client_secret.as_deref(),
			self.redirect_uri.as_ref(),
			self.http_client.clone(),
		)?)
	}

	/// Builds the replacement record for a fresh grant, retaining the previous refresh
	/// secret when the provider kept it stable.
	pub(crate) fn record_from_grant(
		&self,
		grant: TokenGrant,
		retained_refresh: Option<TokenSecret>,
	) -> Result<TokenRecord> {
		let issued_at = OffsetDateTime::now_utc();
		let mut builder = TokenRecord::builder()
			.access_token(grant.access_token)
			.created_at(issued_at)
			.expires_at(self.policy.expiry_from(issued_at, grant.expires_in));

		if let Some(refresh) = grant.refresh_token {
			builder = builder.refresh_token(refresh);
		} else if let Some(previous) = retained_refresh {
			builder = builder.refresh_token(previous.expose());
		}

		builder.build().map_err(|err| crate::error::ConfigError::from(err).into())
	}

	pub(crate) fn refresh_guard(&self) -> Arc<AsyncMutex<()>> {
		self.refresh_guard.clone()
	}
}
#[cfg(feature = "reqwest")]
impl TokenGuard<ReqwestHttpClient> {
	/// Creates a new guard for the provided provider configuration and client identifier.
	///
	/// The guard provisions its own reqwest-backed transport so callers do not need to
	/// pass HTTP handles explicitly. Use [`TokenGuard::with_client_secret`] to attach a
	/// confidential client secret.
	pub fn new(
		store: Arc<dyn TokenStore>,
		provider: Provider,
		client_id: impl Into<String>,
	) -> Self {
		Self::with_http_client(store, provider, client_id, ReqwestHttpClient::default())
	}
}
impl<C> Debug for TokenGuard<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenGuard")
			.field("provider", &self.provider)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("policy", &self.policy)
			.finish()
	}
}
