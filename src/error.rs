//! Crate-level error types shared across the Supabase handle, the TikTok flow, and stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Pending-state storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Upstream service answered with an error or an unreadable payload.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Callback carried a state that was never issued or was already consumed.
	#[error("Invalid state parameter.")]
	InvalidState,
	/// Callback carried a state older than the configured lifetime.
	#[error("Authorization state has expired.")]
	StateExpired,
	/// Provider redirected back with an `error` parameter instead of a code.
	#[error("Authorization was denied by the provider: {error}.")]
	AuthorizationDenied {
		/// Provider error code.
		error: String,
		/// Optional human-readable description.
		description: Option<String>,
	},
	/// Callback is missing a required query parameter.
	#[error("Callback is missing the `{name}` parameter.")]
	MissingCallbackParameter {
		/// Parameter name.
		name: &'static str,
	},
	/// Token endpoint answered successfully without an access token.
	#[error("No access token received. Response: {response}.")]
	MissingAccessToken {
		/// Raw response body.
		response: String,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Supabase endpoint URL was empty.
	#[error("supabaseUrl is required.")]
	MissingSupabaseUrl,
	/// Supabase key was empty.
	#[error("supabaseKey is required.")]
	MissingSupabaseKey,
	/// Supabase endpoint URL cannot be parsed.
	#[error("Supabase URL is invalid.")]
	InvalidSupabaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Supabase endpoint URL uses a scheme other than http or https.
	#[error("Supabase URL must use http or https, got `{scheme}`.")]
	UnsupportedScheme {
		/// Scheme found in the URL.
		scheme: String,
	},
	/// Supabase key cannot be used as an HTTP header value.
	#[error("Supabase key contains characters that are not valid in an HTTP header.")]
	InvalidKeyHeader,
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// TikTok client key is not configured.
	#[error("TikTok client key not configured.")]
	MissingTikTokClientKey,
	/// Built-in or overridden TikTok endpoint cannot be parsed.
	#[error("TikTok endpoint URL is invalid.")]
	InvalidTikTokEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Frontend URL cannot be parsed or cannot carry a path.
	#[error("Frontend URL is invalid.")]
	InvalidFrontendUrl {
		/// Underlying parsing failure, when the URL did not parse at all.
		#[source]
		source: Option<url::ParseError>,
	},
	/// Derived endpoint URL could not be built.
	#[error("Endpoint `{segment}` cannot be derived from the base URL.")]
	InvalidEndpoint {
		/// Path segment that failed to join.
		segment: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Upstream failures reported by TikTok or Supabase.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Upstream answered with a non-success status.
	#[error("{endpoint} returned HTTP {status}: {body}.")]
	Status {
		/// Logical endpoint label.
		endpoint: &'static str,
		/// HTTP status code.
		status: u16,
		/// Response body (lossy UTF-8).
		body: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Upstream responded with JSON that could not be parsed.
	#[error("{endpoint} returned malformed JSON.")]
	ResponseParse {
		/// Logical endpoint label.
		endpoint: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
impl UpstreamError {
	/// HTTP status attached to the failure, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::ResponseParse { status, .. } => *status,
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {endpoint}.")]
	Network {
		/// Logical endpoint label.
		endpoint: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request body could not be encoded.
	#[error("Request body for {endpoint} could not be encoded.")]
	Encode {
		/// Logical endpoint label.
		endpoint: &'static str,
		/// Encoding failure.
		#[source]
		source: serde_json::Error,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(endpoint: &'static str, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn config_errors_match_factory_messages() {
		assert_eq!(ConfigError::MissingSupabaseUrl.to_string(), "supabaseUrl is required.");
		assert_eq!(ConfigError::MissingSupabaseKey.to_string(), "supabaseKey is required.");
	}

	#[test]
	fn upstream_status_is_exposed() {
		let err = UpstreamError::Status {
			endpoint: "tiktok.token",
			status: 401,
			body: "{}".into(),
			retry_after: None,
		};

		assert_eq!(err.status(), Some(401));
		assert_eq!(err.to_string(), "tiktok.token returned HTTP 401: {}.");
	}
}
