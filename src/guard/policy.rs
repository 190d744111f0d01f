//! Refresh policy: grace window and fallback-TTL heuristics.

// self
use crate::{_prelude::*, token::TokenRecord};

/// Decides when a stored record should be refreshed and how long a grant without an
/// explicit `expires_in` is trusted.
///
/// Providers occasionally omit `expires_in` from token responses; the policy's fallback
/// TTL keeps such records refreshable instead of treating them as immortal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshPolicy {
	/// Window before expiry in which a token already counts as stale.
	pub grace_window: Duration,
	/// Assumed lifetime for grants that do not carry `expires_in`.
	pub fallback_ttl: Duration,
}
impl RefreshPolicy {
	/// Default lifetime assumed for grants without `expires_in`.
	pub const DEFAULT_FALLBACK_TTL: Duration = Duration::hours(10);
	/// Default window before expiry in which tokens are refreshed proactively.
	pub const DEFAULT_GRACE_WINDOW: Duration = Duration::hours(1);

	/// Overrides the grace window; negative values clamp to zero.
	pub fn with_grace_window(mut self, window: Duration) -> Self {
		self.grace_window = if window.is_negative() { Duration::ZERO } else { window };

		self
	}

	/// Overrides the fallback TTL; negative values clamp to zero.
	pub fn with_fallback_ttl(mut self, ttl: Duration) -> Self {
		self.fallback_ttl = if ttl.is_negative() { Duration::ZERO } else { ttl };

		self
	}

	/// Returns `true` when the record is expired or inside the grace window at `now`.
	pub fn should_refresh(&self, record: &TokenRecord, now: OffsetDateTime) -> bool {
		record.is_expiring_soon_at(now, self.grace_window)
	}

	/// Computes the absolute expiry instant for a grant issued at `issued_at`.
	pub fn expiry_from(&self, issued_at: OffsetDateTime, expires_in: Option<Duration>) -> OffsetDateTime {
		issued_at + expires_in.unwrap_or(self.fallback_ttl)
	}
}
impl Default for RefreshPolicy {
	fn default() -> Self {
		Self {
			grace_window: Self::DEFAULT_GRACE_WINDOW,
			fallback_ttl: Self::DEFAULT_FALLBACK_TTL,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::token::TokenRecord;

	fn record_expiring_at(expires_at: OffsetDateTime) -> TokenRecord {
		TokenRecord::builder()
			.access_token("access-token")
			.expires_at(expires_at)
			.build()
			.expect("Failed to build policy test record.")
	}

	#[test]
	fn refreshes_inside_the_grace_window_and_after_expiry() {
		let policy = RefreshPolicy::default();
		let now = OffsetDateTime::now_utc();

		assert!(!policy.should_refresh(&record_expiring_at(now + Duration::hours(2)), now));
		assert!(policy.should_refresh(&record_expiring_at(now + Duration::minutes(30)), now));
		assert!(policy.should_refresh(&record_expiring_at(now - Duration::minutes(1)), now));
	}

	#[test]
	fn fallback_ttl_applies_when_expires_in_is_absent() {
		let policy = RefreshPolicy::default().with_fallback_ttl(Duration::hours(2));
		let issued_at = OffsetDateTime::now_utc();

		assert_eq!(policy.expiry_from(issued_at, None), issued_at + Duration::hours(2));
		assert_eq!(
			policy.expiry_from(issued_at, Some(Duration::seconds(3_600))),
			issued_at + Duration::hours(1),
		);
	}

	#[test]
	fn negative_overrides_clamp_to_zero() {
		let policy = RefreshPolicy::default()
			.with_grace_window(Duration::seconds(-5))
			.with_fallback_ttl(Duration::seconds(-5));

		assert_eq!(policy.grace_window, Duration::ZERO);
		assert_eq!(policy.fallback_ttl, Duration::ZERO);
	}
}
