#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use token_guard::{
	error::{Error, TokenRefreshError},
	guard::{RefreshPolicy, ReqwestTokenGuard, TokenGuard},
	provider::Provider,
	store::{MemoryStore, TokenStore},
	token::TokenRecord,
};

const CLIENT_ID: &str = "client-it";
const CLIENT_SECRET: &str = "secret-it";

fn build_provider(server: &MockServer) -> Provider {
	Provider::new(
		Url::parse(&server.url("/connect"))
			.expect("Mock authorization endpoint should parse successfully."),
		Url::parse(&server.url("/token")).expect("Mock token endpoint should parse successfully."),
	)
}

fn build_guard(server: &MockServer) -> (ReqwestTokenGuard, Arc<MemoryStore>) {
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn TokenStore> = store_backend.clone();
	let guard = TokenGuard::new(store, build_provider(server), CLIENT_ID)
		.with_client_secret(CLIENT_SECRET);

	(guard, store_backend)
}

async fn seed_record(store: &MemoryStore, access: &str, refresh: Option<&str>) {
	let mut builder = TokenRecord::builder()
		.access_token(access)
		.expires_at(OffsetDateTime::now_utc() + Duration::hours(2));

	if let Some(refresh) = refresh {
		builder = builder.refresh_token(refresh);
	}

	let record = builder.build().expect("Failed to build seed record for refresh tests.");

	store.save(record).await.expect("Failed to seed the token store.");
}

#[tokio::test]
async fn refresh_rotates_the_stored_record() {
	let server = MockServer::start_async().await;
	let (guard, store) = build_guard(&server);

	seed_record(&store, "old-access", Some("old-refresh")).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").body_includes("grant_type=refresh_token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"new-access\",\"refresh_token\":\"new-refresh\",\"token_type\":\"bearer\",\"expires_in\":3600}",
			);
		})
		.await;
	let access = guard
		.refresh_access_token("old-refresh")
		.await
		.expect("Refresh exchange should succeed.");

	mock.assert_async().await;

	assert_eq!(access.expose(), "new-access");

	let stored = store
		.load_current()
		.await
		.expect("Token store load should succeed.")
		.expect("Refreshed record should be stored.");

	assert_eq!(stored.access_token.expose(), "new-access");
	assert_eq!(stored.refresh_token.as_ref().map(|secret| secret.expose()), Some("new-refresh"));
	assert_eq!(guard.refresh_metrics.attempts(), 1);
	assert_eq!(guard.refresh_metrics.successes(), 1);
	assert_eq!(guard.refresh_metrics.failures(), 0);
}

#[tokio::test]
async fn refresh_retains_the_previous_secret_when_the_response_omits_it() {
	let server = MockServer::start_async().await;
	let (guard, store) = build_guard(&server);

	seed_record(&store, "old-access", Some("stable-refresh")).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"new-access\",\"token_type\":\"bearer\",\"expires_in\":3600}",
			);
		})
		.await;

	guard
		.refresh_access_token("stable-refresh")
		.await
		.expect("Refresh exchange should succeed without a rotated secret.");
	mock.assert_async().await;

	let stored = store
		.load_current()
		.await
		.expect("Token store load should succeed.")
		.expect("Refreshed record should be stored.");

	assert_eq!(
		stored.refresh_token.as_ref().map(|secret| secret.expose()),
		Some("stable-refresh"),
		"A response without refresh_token must keep the previous secret usable."
	);
}

#[tokio::test]
async fn blank_refresh_token_fails_before_any_network_call() {
	let server = MockServer::start_async().await;
	let (guard, _store) = build_guard(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(500);
		})
		.await;
	let err = guard
		.refresh_access_token("  ")
		.await
		.expect_err("Blank refresh tokens should fail validation.");

	assert!(matches!(err, Error::Refresh(TokenRefreshError::MissingRefreshToken)));
	assert!(err.to_string().contains("Missing refresh token"));
	// Validation failures must not reach the provider.
	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn rejected_refresh_is_classified_and_counted() {
	let server = MockServer::start_async().await;
	let (guard, store) = build_guard(&server);

	seed_record(&store, "old-access", Some("revoked-refresh")).await;

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"revoked\"}");
		})
		.await;
	let err = guard
		.refresh_access_token("revoked-refresh")
		.await
		.expect_err("Rejected refreshes should surface as errors.");

	mock.assert_async().await;

	match err {
		Error::Refresh(TokenRefreshError::Rejected { reason, status }) => {
			assert!(reason.contains("invalid_grant"));
			assert_eq!(status, Some(400));
		},
		other => panic!("Expected a rejected refresh error, got {other:?}."),
	}

	assert_eq!(guard.refresh_metrics.attempts(), 1);
	assert_eq!(guard.refresh_metrics.failures(), 1);

	let stored = store
		.load_current()
		.await
		.expect("Token store load should succeed.")
		.expect("Failed refreshes must leave the previous record in place.");

	assert_eq!(stored.access_token.expose(), "old-access");
}

#[tokio::test]
async fn fallback_ttl_applies_when_expires_in_is_absent() {
	let server = MockServer::start_async().await;
	let (guard, store) = build_guard(&server);
	let guard = guard.with_policy(RefreshPolicy::default().with_fallback_ttl(Duration::hours(2)));

	seed_record(&store, "old-access", Some("old-refresh")).await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"new-access\",\"token_type\":\"bearer\"}");
		})
		.await;

	guard
		.refresh_access_token("old-refresh")
		.await
		.expect("Refresh exchange should succeed without expires_in.");

	let stored = store
		.load_current()
		.await
		.expect("Token store load should succeed.")
		.expect("Refreshed record should be stored.");
	let expires_at = stored.expires_at.expect("Fallback TTL should produce an expiry instant.");

	assert_eq!(expires_at - stored.created_at, Duration::hours(2));
}
