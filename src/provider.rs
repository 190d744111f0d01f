//! Upstream provider configuration consumed by the guard.
//!
//! The guard targets exactly one upstream music API, so configuration collapses to the
//! endpoint pair plus the client authentication mode its token endpoint expects.

// self
use crate::_prelude::*;

/// Preferred client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Immutable upstream endpoint configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
	/// Authorization endpoint end-users are redirected to during connect.
	pub authorization_endpoint: Url,
	/// Token endpoint used for code exchanges and refreshes.
	pub token_endpoint: Url,
	/// Client authentication mechanism the token endpoint expects.
	pub client_auth_method: ClientAuthMethod,
}
impl Provider {
	/// Creates a provider configuration with the default client auth method.
	pub fn new(authorization_endpoint: Url, token_endpoint: Url) -> Self {
		Self { authorization_endpoint, token_endpoint, client_auth_method: Default::default() }
	}

	/// Overrides the client authentication method.
	pub fn with_client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth_method = method;

		self
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_to_basic_client_auth() {
		let provider = Provider::new(
			Url::parse("https://provider.example.com/connect")
				.expect("Authorization endpoint fixture should parse."),
			Url::parse("https://provider.example.com/oauth2/token")
				.expect("Token endpoint fixture should parse."),
		);

		assert_eq!(provider.client_auth_method, ClientAuthMethod::ClientSecretBasic);

		let provider = provider.with_client_auth_method(ClientAuthMethod::ClientSecretPost);

		assert_eq!(provider.client_auth_method, ClientAuthMethod::ClientSecretPost);
	}
}
