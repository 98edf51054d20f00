//! Client-wide error types shared by requests, pagination, signing, and token verification.

// self
use crate::{_prelude::*, jwt::TokenField};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body or token segment could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Secret or key material is unusable.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Token is structurally malformed.
	#[error(transparent)]
	Format(#[from] FormatError),

	/// Service answered with a non-zero `errorCode`.
	#[error("Service returned error {code}: {reason}.")]
	Api {
		/// Numeric `errorCode` reported by the service.
		code: i64,
		/// Service-provided `statusReason`.
		reason: String,
		/// Longer `errorDetails` / `errorMessage` text, when present.
		details: Option<String>,
		/// `callId` of the failing call, useful when contacting the vendor.
		call_id: Option<String>,
		/// `totalCount` carried by the failing response, when present.
		total_count: Option<u64>,
	},
	/// Token signature does not match the published key.
	#[error("Token signature does not match the published key.")]
	InvalidSignature,
}
impl Error {
	/// Returns the service `errorCode` for [`Error::Api`] failures.
	pub fn api_code(&self) -> Option<i64> {
		match self {
			Self::Api { code, .. } => Some(*code),
			_ => None,
		}
	}
}

/// Configuration failures raised while building a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Client configuration failed validation.
	#[error(transparent)]
	Build(#[from] crate::config::ConfigBuildError),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint URL for a method could not be derived from the base URL.
	#[error("Endpoint URL for `{method}` is invalid.")]
	InvalidEndpoint {
		/// Wire name of the method.
		method: &'static str,
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
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling `{method}`.")]
	Network {
		/// Wire name of the method being called.
		method: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		method: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { method, source: Box::new(src) }
	}
}

/// Decoding failures for service responses and token segments.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Response JSON did not match the expected shape.
	#[error("Failed to decode the `{method}` response at `{}`.", .source.path())]
	Response {
		/// Wire name of the method whose response failed to decode.
		method: &'static str,
		/// Structured parsing failure naming the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// Raw JSON found at the offending path (verbose mode only).
		offending_value: Option<String>,
		/// Truncated body preview (verbose mode only).
		body_preview: Option<String>,
	},
	/// A base64url token segment or key component is malformed.
	#[error("Failed to decode the {field} as base64url.")]
	Base64 {
		/// Which segment or key component failed.
		field: TokenField,
		/// Underlying base64 failure.
		#[source]
		source: base64::DecodeError,
	},
	/// Token claims or an extension body do not match the expected JSON shape.
	#[error("Failed to decode claims at `{}`.", .source.path())]
	Claims {
		/// Structured parsing failure naming the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl DecodeError {
	/// Returns the token field that failed base64url decoding, if any.
	pub fn token_field(&self) -> Option<TokenField> {
		match self {
			Self::Base64 { field, .. } => Some(*field),
			_ => None,
		}
	}
}

/// Secret or key-material failures.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// The shared secret is not valid standard base64.
	#[error("Signing secret is not valid base64.")]
	MalformedSecret {
		/// Underlying base64 failure.
		#[source]
		source: base64::DecodeError,
	},
	/// RSA key material cannot be used for verification.
	#[error("RSA key material is unusable: {reason}.")]
	KeyMaterial {
		/// Why the key was rejected.
		reason: String,
	},
}

/// Structural token failures.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum FormatError {
	/// Token did not split into header, payload, and signature.
	#[error("Token must have 3 period-separated segments, found {found}.")]
	TokenSegments {
		/// Number of segments actually present.
		found: usize,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn api_errors_render_code_and_reason() {
		let err = Error::Api {
			code: 403_005,
			reason: "Forbidden".into(),
			details: Some("Unauthorized user".into()),
			call_id: Some("call-1".into()),
			total_count: None,
		};

		assert_eq!(err.to_string(), "Service returned error 403005: Forbidden.");
		assert_eq!(err.api_code(), Some(403_005));
		assert_eq!(Error::InvalidSignature.api_code(), None);
	}

	#[test]
	fn format_errors_report_segment_count() {
		let err = Error::from(FormatError::TokenSegments { found: 2 });

		assert_eq!(err.to_string(), "Token must have 3 period-separated segments, found 2.");
	}
}
