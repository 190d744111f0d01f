// std
use std::sync::Arc;
// crates.io
use time::{Duration, macros};
// self
use token_guard::{
	store::{MemoryStore, TokenStore},
	token::{TokenRecord, TokenStatus},
};

fn build_record(access: &str, refresh: Option<&str>) -> TokenRecord {
	let issued = macros::datetime!(2026-08-01 12:00 UTC);
	let mut builder = TokenRecord::builder()
		.access_token(access)
		.created_at(issued)
		.expires_at(issued + Duration::hours(1));

	if let Some(refresh) = refresh {
		builder = builder.refresh_token(refresh);
	}

	builder.build().expect("Failed to build record for store tests.")
}

#[tokio::test]
async fn load_on_an_empty_store_returns_none() {
	let store = MemoryStore::default();

	assert!(store.load_current().await.expect("Load should succeed.").is_none());
	assert!(store.clear().await.expect("Clear should succeed.").is_none());
}

#[tokio::test]
async fn save_replaces_the_previous_record_entirely() {
	let store = MemoryStore::default();

	store
		.save(build_record("first-access", Some("first-refresh")))
		.await
		.expect("Initial save should succeed.");
	store
		.save(build_record("second-access", None))
		.await
		.expect("Replacement save should succeed.");

	let current = store
		.load_current()
		.await
		.expect("Load should succeed.")
		.expect("Replacement record should be present.");

	assert_eq!(current.access_token.expose(), "second-access");
	assert!(
		current.refresh_token.is_none(),
		"Replace-on-write must not merge fields from the previous record."
	);
}

#[tokio::test]
async fn clear_returns_the_removed_record() {
	let store = MemoryStore::default();

	store
		.save(build_record("access", Some("refresh")))
		.await
		.expect("Initial save should succeed.");

	let removed = store
		.clear()
		.await
		.expect("Clear should succeed.")
		.expect("Clear should return the removed record.");

	assert_eq!(removed.access_token.expose(), "access");
	assert!(store.load_current().await.expect("Load should succeed.").is_none());
}

#[tokio::test]
async fn stored_records_preserve_expiry_semantics() {
	let store = MemoryStore::default();
	let record = build_record("access", Some("refresh"));

	store.save(record.clone()).await.expect("Initial save should succeed.");

	let fetched = store
		.load_current()
		.await
		.expect("Load should succeed.")
		.expect("Record should be present.");
	let grace = Duration::hours(1);
	let issued = fetched.created_at;

	assert_eq!(fetched.status_at(issued, grace), TokenStatus::ExpiringSoon);
	assert_eq!(fetched.status_at(issued - Duration::minutes(30), grace), TokenStatus::Valid);
	assert_eq!(fetched.status_at(issued + Duration::hours(2), grace), TokenStatus::Expired);
}

#[tokio::test]
async fn concurrent_saves_leave_exactly_one_record() {
	let store = Arc::new(MemoryStore::default());
	let mut handles = Vec::new();

	for i in 0..8 {
		let store = store.clone();

		handles.push(tokio::spawn(async move {
			store.save(build_record(&format!("access-{i}"), None)).await
		}));
	}
	for handle in handles {
		handle.await.expect("Save task should not panic.").expect("Save should succeed.");
	}

	let current = store
		.load_current()
		.await
		.expect("Load should succeed.")
		.expect("One record should survive concurrent saves.");

	assert!(current.access_token.expose().starts_with("access-"));
}
