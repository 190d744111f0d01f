//! Calls an upstream API through the guard so an expired access token is refreshed
//! transparently, with at most one retry after an unauthorized response.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use token_guard::{
	guard::TokenGuard,
	provider::Provider,
	store::{MemoryStore, TokenStore},
	token::TokenRecord,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::default());
	let provider = Provider::new(
		Url::parse("https://provider.example.com/connect")?,
		Url::parse("https://provider.example.com/oauth2/token")?,
	);
	let guard = TokenGuard::new(store.clone(), provider, "demo-client")
		.with_client_secret("demo-secret");

	// Normally the record comes from `exchange_authorization_code`; seed one here so the
	// demo can run without a live provider redirect.
	let record = TokenRecord::builder()
		.access_token("demo-access-token")
		.refresh_token("demo-refresh-token")
		.expires_at(OffsetDateTime::now_utc() + Duration::hours(2))
		.build()?;

	store.save(record).await?;
	println!("Stored token valid: {}.", guard.has_valid_token().await?);

	let client = reqwest::Client::new();
	let outcome = guard
		.call_with_auto_refresh(|token| {
			let client = client.clone();

			async move {
				client.get("https://api.example.com/me").bearer_auth(token).send().await
			}
		})
		.await;

	match outcome {
		Ok(response) => println!("Upstream answered with HTTP {}.", response.status()),
		Err(e) => eprintln!("Guarded call failed: {e}."),
	}

	Ok(())
}
