//! Connect handshake helpers: authorize URL construction and state validation.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	error::TokenExchangeError,
	guard::TokenGuard,
	http::TokenHttpClient,
};

const STATE_LEN: usize = 32;

/// Connect handshake metadata returned by [`TokenGuard::start_connect`].
#[derive(Clone, Debug)]
pub struct ConnectSession {
	/// Opaque state value that must round-trip via the redirect handler.
	pub state: String,
	/// Redirect URI supplied when constructing the connect URL.
	pub redirect_uri: Url,
	/// Fully-formed connect URL that callers should send the end-user to.
	pub connect_url: Url,
}
impl ConnectSession {
	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state {
			Ok(())
		} else {
			Err(TokenExchangeError::StateMismatch.into())
		}
	}
}

impl<C> TokenGuard<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Starts the connect handshake by building the provider's authorization URL.
	///
	/// The session carries a random `state` value; redirect handlers should call
	/// [`ConnectSession::validate_state`] before exchanging the returned code.
	pub fn start_connect(&self, redirect_uri: Url) -> ConnectSession {
		let state = random_string(STATE_LEN);
		let connect_url = build_connect_url(
			&self.provider.authorization_endpoint,
			&self.client_id,
			&redirect_uri,
			&state,
		);

		ConnectSession { state, redirect_uri, connect_url }
	}
}

fn build_connect_url(
	authorization_endpoint: &Url,
	client_id: &str,
	redirect_uri: &Url,
	state: &str,
) -> Url {
	let mut url = authorization_endpoint.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", client_id);
	pairs.append_pair("redirect_uri", redirect_uri.as_str());
	pairs.append_pair("state", state);

	drop(pairs);

	url
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}
