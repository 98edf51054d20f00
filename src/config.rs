//! Immutable client configuration.
//!
//! A [`ClientConfig`] is assembled once through [`ClientConfig::builder`] and then
//! shared read-only by every call a client makes. Changing a key or data center
//! means building a new config and a new client; nothing is mutated in place.

pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, api::ApiMethod, auth::Secret, error::ConfigError};

/// Credentials attached to every call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
	/// Site API key (`apiKey`).
	pub api_key: String,
	/// Application/user key (`userKey`).
	pub user_key: String,
	/// Shared secret; standard base64 when used for HMAC signing.
	pub secret: Secret,
}

/// Validated, immutable client configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Credentials applied to every call.
	pub credentials: Credentials,
	/// Base URL every method name is appended to; always ends with `/`.
	pub base_url: Url,
	/// Upper bound for a single request/response exchange.
	pub request_timeout: Duration,
	/// Attaches raw-body diagnostics to decode failures when `true`.
	pub verbose_errors: bool,
}
impl ClientConfig {
	/// Default per-request deadline.
	pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(30);

	/// Creates a new builder.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::new()
	}

	/// Resolves the endpoint URL for `method` (`{base_url}{method}`).
	pub fn endpoint(&self, method: ApiMethod) -> Result<Url, ConfigError> {
		self.base_url
			.join(method.as_str())
			.map_err(|source| ConfigError::InvalidEndpoint { method: method.as_str(), source })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn endpoint_appends_method_to_domain() {
		let config = ClientConfig::builder()
			.api_key("key")
			.user_key("user")
			.secret("c2VjcmV0")
			.domain("accounts.eu1.gigya.com")
			.build()
			.expect("Domain-based config should build.");
		let url = config.endpoint(ApiMethod::Search).expect("Search endpoint should resolve.");

		assert_eq!(url.as_str(), "https://accounts.eu1.gigya.com/accounts.search");
	}

	#[test]
	fn endpoint_keeps_base_path_prefix() {
		let config = ClientConfig::builder()
			.api_key("key")
			.user_key("user")
			.secret("c2VjcmV0")
			.base_url(Url::parse("http://127.0.0.1:8080/proxy").expect("Proxy URL should parse."))
			.build()
			.expect("Base-URL config should build.");
		let url = config
			.endpoint(ApiMethod::GetJwtPublicKey)
			.expect("Key endpoint should resolve.");

		assert_eq!(url.as_str(), "http://127.0.0.1:8080/proxy/accounts.getJWTPublicKey");
	}

	#[test]
	fn config_debug_never_prints_the_secret() {
		let config = crate::_preludet::test_config();

		assert!(!format!("{config:?}").contains("Zml4dHVyZS1zaWduaW5nLXNlY3JldA=="));
	}
}
