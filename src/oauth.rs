//! Token-endpoint facade over the `oauth2` crate.
//!
//! The facade performs the two grants the guard needs—`authorization_code` and
//! `refresh_token`—and normalizes both the success body (optional `refresh_token`,
//! optional `expires_in`) and the failure modes into [`TokenGrant`] and
//! [`TokenEndpointError`]. Flow code never touches `oauth2` types directly.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RefreshToken, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	error::{BoxError, ConfigError, TokenExchangeError, TokenRefreshError},
	http::{StatusSlot, TokenHttpClient},
	provider::{ClientAuthMethod, Provider},
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Raw outcome of a successful token-endpoint call, before any policy is applied.
#[derive(Clone, Debug)]
pub(crate) struct TokenGrant {
	pub access_token: String,
	pub refresh_token: Option<String>,
	pub expires_in: Option<Duration>,
}

/// Normalized token-endpoint failure; flows convert it into the grant-specific error.
#[derive(Debug)]
pub(crate) enum TokenEndpointError {
	Rejected { reason: String, status: Option<u16> },
	Malformed { source: serde_path_to_error::Error<serde_json::Error>, status: Option<u16> },
	Network { source: BoxError },
	Config(ConfigError),
}
impl TokenEndpointError {
	pub(crate) fn into_exchange(self) -> Error {
		match self {
			Self::Rejected { reason, status } =>
				TokenExchangeError::Rejected { reason, status }.into(),
			Self::Malformed { source, status } =>
				TokenExchangeError::Malformed { source, status }.into(),
			Self::Network { source } => TokenExchangeError::Network { source }.into(),
			Self::Config(e) => e.into(),
		}
	}

	pub(crate) fn into_refresh(self) -> Error {
		match self {
			Self::Rejected { reason, status } =>
				TokenRefreshError::Rejected { reason, status }.into(),
			Self::Malformed { source, status } =>
				TokenRefreshError::Malformed { source, status }.into(),
			Self::Network { source } => TokenRefreshError::Network { source }.into(),
			Self::Config(e) => e.into(),
		}
	}
}

/// Configured client for the provider's token endpoint.
pub(crate) struct TokenEndpoint<C>
where
	C: ?Sized + TokenHttpClient,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
}
impl<C> TokenEndpoint<C>
where
	C: ?Sized + TokenHttpClient,
{
	pub(crate) fn from_provider(
		provider: &Provider,
		client_id: &str,
		client_secret: Option<&str>,
		redirect_uri: Option<&Url>,
		http_client: Arc<C>,
	) -> Result<Self, ConfigError> {
		let auth_url = AuthUrl::new(provider.authorization_endpoint.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let token_url = TokenUrl::new(provider.token_endpoint.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let mut oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url);

		if let Some(secret) = client_secret {
			oauth_client = oauth_client.set_client_secret(ClientSecret::new(secret.to_owned()));
		}
		if let Some(redirect) = redirect_uri {
			let redirect_url = RedirectUrl::new(redirect.to_string())
				.map_err(|source| ConfigError::InvalidRedirect { source })?;

			oauth_client = oauth_client.set_redirect_uri(redirect_url);
		}

		if matches!(provider.client_auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self { oauth_client, http_client })
	}

	/// Performs the `authorization_code` grant.
	pub(crate) async fn exchange_code(&self, code: &str) -> Result<TokenGrant, TokenEndpointError> {
		let slot = StatusSlot::default();
		let instrumented = self.http_client.with_status(slot.clone());
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(slot.take(), err))?;

		Ok(grant_from_response(response))
	}

	/// Performs the `refresh_token` grant.
	pub(crate) async fn refresh(
		&self,
		refresh_token: &str,
	) -> Result<TokenGrant, TokenEndpointError> {
		let slot = StatusSlot::default();
		let instrumented = self.http_client.with_status(slot.clone());
		let secret = RefreshToken::new(refresh_token.to_owned());
		let response = self
			.oauth_client
			.exchange_refresh_token(&secret)
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(slot.take(), err))?;

		Ok(grant_from_response(response))
	}
}

fn grant_from_response(response: BasicTokenResponse) -> TokenGrant {
	TokenGrant {
		access_token: response.access_token().secret().to_owned(),
		refresh_token: response.refresh_token().map(|token| token.secret().to_owned()),
		// Providers may omit expires_in entirely; the refresh policy supplies a
		// fallback TTL in that case.
		expires_in: response
			.expires_in()
			.and_then(|ttl| i64::try_from(ttl.as_secs()).ok())
			.map(Duration::seconds),
	}
}

fn map_request_error<E>(
	status: Option<u16>,
	err: BasicRequestTokenError<HttpClientError<E>>,
) -> TokenEndpointError
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		RequestTokenError::ServerResponse(response) => {
			let reason = match response.error_description() {
				Some(description) =>
					format!("{} ({description})", response.error().as_ref()),
				None => response.error().as_ref().to_owned(),
			};

			TokenEndpointError::Rejected { reason, status }
		},
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Parse(source, _body) => TokenEndpointError::Malformed { source, status },
		RequestTokenError::Other(message) => TokenEndpointError::Rejected { reason: message, status },
	}
}

fn map_transport_error<E>(err: HttpClientError<E>) -> TokenEndpointError
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TokenEndpointError::Network { source: inner },
		HttpClientError::Http(inner) => TokenEndpointError::Config(ConfigError::HttpRequest(inner)),
		HttpClientError::Io(inner) => TokenEndpointError::Network { source: Box::new(inner) },
		HttpClientError::Other(message) =>
			TokenEndpointError::Rejected { reason: message.to_string(), status: None },
		_ => TokenEndpointError::Rejected {
			reason: "Token endpoint call failed with an unknown transport error.".into(),
			status: None,
		},
	}
}
