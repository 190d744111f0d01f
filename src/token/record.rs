//! The single persisted token record, its lifecycle helpers, and builder.

// self
use crate::{_prelude::*, token::secret::TokenSecret};

/// Lifecycle status derived from the wall clock; never persisted.
///
/// The absent state (no record stored at all) is represented by `Option<TokenRecord>`
/// at the store boundary rather than by a variant here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token is valid and outside the proactive-refresh grace window.
	Valid,
	/// Token is still valid but inside the grace window; refresh proactively.
	ExpiringSoon,
	/// Token exceeded its expiry instant.
	Expired,
}

/// Errors produced by [`TokenRecordBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenRecordBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when the access token was empty or whitespace.
	#[error("Access token must not be blank.")]
	BlankAccessToken,
	/// Issued when a refresh token was provided but empty or whitespace.
	#[error("Refresh token must not be blank.")]
	BlankRefreshToken,
}

/// The sole persisted entity: one access/refresh pair with its expiry.
///
/// Records are replaced wholesale on every exchange or refresh; both tokens and the
/// expiry travel together and are never partially updated.
#[derive(Serialize, Deserialize, Clone)]
pub struct TokenRecord {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token secret, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Expiry instant; `None` when the provider lifetime is unknown.
	pub expires_at: Option<OffsetDateTime>,
	/// Instant the record was written (stamped on every replace).
	pub created_at: OffsetDateTime,
}
impl TokenRecord {
	/// Returns a builder for constructing replacement records.
	pub fn builder() -> TokenRecordBuilder {
		TokenRecordBuilder::new()
	}

	/// Computes the lifecycle status at a given instant under a grace window.
	///
	/// Records without an expiry are treated as valid; a 401 from the upstream is the
	/// only signal that can invalidate them.
	pub fn status_at(&self, instant: OffsetDateTime, grace_window: Duration) -> TokenStatus {
		let Some(expires_at) = self.expires_at else {
			return TokenStatus::Valid;
		};

		if instant >= expires_at {
			return TokenStatus::Expired;
		}
		if instant >= expires_at - grace_window {
			return TokenStatus::ExpiringSoon;
		}

		TokenStatus::Valid
	}

	/// Returns `true` if the record has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant, Duration::ZERO), TokenStatus::Expired)
	}

	/// Returns `true` if the record is expiring soon (or already expired) at the
	/// provided instant under the given grace window.
	pub fn is_expiring_soon_at(&self, instant: OffsetDateTime, grace_window: Duration) -> bool {
		matches!(
			self.status_at(instant, grace_window),
			TokenStatus::ExpiringSoon | TokenStatus::Expired
		)
	}
}
impl Debug for TokenRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRecord")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.field("created_at", &self.created_at)
			.finish()
	}
}

/// Pair returned by a successful authorization-code exchange.
#[derive(Clone, Debug)]
pub struct TokenPair {
	/// Freshly issued access token.
	pub access_token: TokenSecret,
	/// Refresh token, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
}

/// Builder for [`TokenRecord`].
#[derive(Clone, Debug, Default)]
pub struct TokenRecordBuilder {
	access_token: Option<String>,
	refresh_token: Option<String>,
	expires_at: Option<OffsetDateTime>,
	created_at: Option<OffsetDateTime>,
}
impl TokenRecordBuilder {
	fn new() -> Self {
		Self::default()
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(token.into());

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(token.into());

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets the creation instant; defaults to the current clock.
	pub fn created_at(mut self, instant: OffsetDateTime) -> Self {
		self.created_at = Some(instant);

		self
	}

	/// Consumes the builder and produces a [`TokenRecord`].
	pub fn build(self) -> Result<TokenRecord, TokenRecordBuilderError> {
		let access_token = TokenSecret::new(
			self.access_token.ok_or(TokenRecordBuilderError::MissingAccessToken)?,
		);

		if access_token.is_blank() {
			return Err(TokenRecordBuilderError::BlankAccessToken);
		}

		let refresh_token = match self.refresh_token.map(TokenSecret::new) {
			Some(secret) if secret.is_blank() =>
				return Err(TokenRecordBuilderError::BlankRefreshToken),
			other => other,
		};

		Ok(TokenRecord {
			access_token,
			refresh_token,
			expires_at: self.expires_at,
			created_at: self.created_at.unwrap_or_else(OffsetDateTime::now_utc),
		})
	}
}
