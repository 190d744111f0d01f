//! Guard-level error types shared across flows, the token-endpoint facade, and stores.

// self
use crate::_prelude::*;

/// Guard-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical guard error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Authorization-code exchange failure.
	#[error(transparent)]
	Exchange(#[from] TokenExchangeError),
	/// Refresh-token exchange failure.
	#[error(transparent)]
	Refresh(#[from] TokenRefreshError),
	/// Guarded-call failure.
	#[error(transparent)]
	Request(#[from] ApiRequestError),
}

/// Configuration and validation failures raised by the guard.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider endpoint URL cannot be parsed.
	#[error("Provider endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Token record builder validation failed.
	#[error("Unable to build token record.")]
	TokenBuild(#[from] crate::token::TokenRecordBuilderError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Authorization-code exchange failures (initial login).
#[derive(Debug, ThisError)]
pub enum TokenExchangeError {
	/// The caller supplied a blank authorization code.
	#[error("Authorization code must not be empty.")]
	EmptyCode,
	/// The `state` parameter returned by the redirect did not match the session.
	#[error("Authorization state parameter mismatch.")]
	StateMismatch,
	/// The provider rejected the exchange.
	#[error("Token endpoint rejected the authorization code: {reason}.")]
	Rejected {
		/// Provider-supplied reason string.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The provider responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON during the code exchange.")]
	Malformed {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The exchange failed at the transport layer.
	#[error("Network error occurred during the code exchange.")]
	Network {
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
}

/// Refresh-token exchange failures.
#[derive(Debug, ThisError)]
pub enum TokenRefreshError {
	/// No usable refresh token was supplied or stored.
	#[error("Missing refresh token.")]
	MissingRefreshToken,
	/// The provider rejected the refresh.
	#[error("Token endpoint rejected the refresh token: {reason}.")]
	Rejected {
		/// Provider-supplied reason string.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The provider responded with JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON during the refresh.")]
	Malformed {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The refresh failed at the transport layer.
	#[error("Network error occurred during the refresh.")]
	Network {
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
}

/// Failures surfaced by [`call_with_auto_refresh`](crate::guard::TokenGuard::call_with_auto_refresh).
#[derive(Debug, ThisError)]
pub enum ApiRequestError {
	/// No token record exists; the authorization flow has not completed.
	#[error("No token is stored; complete the authorization flow first.")]
	MissingToken,
	/// The refresh performed inside the guarded call failed.
	#[error("Token refresh failed during a guarded call.")]
	RefreshFailed {
		/// Refresh failure that aborted the guarded call.
		#[source]
		source: TokenRefreshError,
	},
	/// The upstream returned an unauthorized response for a just-refreshed token.
	#[error("Upstream rejected a freshly refreshed access token.")]
	FreshTokenRejected,
	/// The request failed for a non-authorization reason; no refresh was attempted.
	#[error("Guarded request failed without an authorization error.")]
	Transport {
		/// Underlying request failure.
		#[source]
		source: BoxError,
	},
	/// The retry performed after a successful refresh failed at the transport layer.
	#[error("Guarded request failed after a successful token refresh.")]
	RetryFailed {
		/// Underlying request failure.
		#[source]
		source: BoxError,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_into_guard_error_with_source() {
		let store_error = StoreError::Backend { message: "token file unreadable".into() };
		let guard_error: Error = store_error.clone().into();

		assert!(matches!(guard_error, Error::Storage(_)));
		assert!(guard_error.to_string().contains("token file unreadable"));

		let source = StdError::source(&guard_error)
			.expect("Guard error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn refresh_failure_nests_inside_request_error() {
		let err: Error = ApiRequestError::RefreshFailed {
			source: TokenRefreshError::MissingRefreshToken,
		}
		.into();

		assert!(err.to_string().contains("refresh failed"));

		// `Error::Request` is transparent, so its source is the nested refresh failure.
		let source =
			StdError::source(&err).expect("Request error should chain to the refresh failure.");

		assert!(source.to_string().contains("Missing refresh token"));
	}

	#[test]
	fn boundary_messages_match_contract() {
		assert!(
			TokenExchangeError::EmptyCode
				.to_string()
				.contains("Authorization code must not be empty")
		);
		assert!(
			TokenRefreshError::MissingRefreshToken.to_string().contains("Missing refresh token")
		);
	}
}
