//! Walks through starting the connect handshake and validating the redirect's `state`
//! before exchanging the authorization code.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use token_guard::{
	guard::TokenGuard,
	provider::Provider,
	store::{MemoryStore, TokenStore},
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::default());
	let provider = Provider::new(
		Url::parse("https://provider.example.com/connect")?,
		Url::parse("https://provider.example.com/oauth2/token")?,
	);
	let guard =
		TokenGuard::new(store, provider, "demo-client").with_client_secret("demo-secret");
	let session = guard.start_connect(Url::parse("https://app.example.com/oauth/callback")?);

	println!("Send your user to {}.", &session.connect_url);

	// Simulate the redirect handler receiving `state` and `code` query parameters.
	let returned_state = session.state.clone();
	let returned_code = "code-from-redirect";

	session.validate_state(&returned_state)?;
	println!("State validated; exchange `{returned_code}` for the initial token pair with");
	println!("TokenGuard::exchange_authorization_code inside the callback handler.");

	Ok(())
}
