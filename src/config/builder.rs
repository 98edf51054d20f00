//! Validating builder for [`ClientConfig`].

// self
use crate::{
	_prelude::*,
	auth::Secret,
	config::{ClientConfig, Credentials},
};

/// Errors raised while constructing or validating a [`ClientConfig`].
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ConfigBuildError {
	/// A required value was not supplied or is empty.
	#[error("Missing required configuration value `{field}`.")]
	MissingField {
		/// Builder field that is missing.
		field: &'static str,
	},
	/// Neither a data-center domain nor a base URL was supplied.
	#[error("Either a domain or a base URL must be configured.")]
	MissingEndpoint,
	/// The data-center domain does not form a valid URL.
	#[error("Domain `{domain}` does not form a valid URL.")]
	InvalidDomain {
		/// Domain that failed to parse.
		domain: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URLs must use HTTP(S) and be able to carry a path.
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// URL that failed validation.
		url: String,
	},
	/// Request timeouts must be strictly positive.
	#[error("Request timeout must be positive.")]
	NonPositiveTimeout,
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
	/// Site API key.
	pub api_key: Option<String>,
	/// Application/user key.
	pub user_key: Option<String>,
	/// Shared secret.
	pub secret: Option<Secret>,
	/// Data-center domain such as `accounts.us1.gigya.com`.
	pub domain: Option<String>,
	/// Explicit base URL; wins over `domain` when both are set.
	pub base_url: Option<Url>,
	/// Per-request deadline override.
	pub request_timeout: Option<Duration>,
	/// Verbose decode diagnostics toggle.
	pub verbose_errors: bool,
}
impl ClientConfigBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the site API key.
	pub fn api_key(mut self, value: impl Into<String>) -> Self {
		self.api_key = Some(value.into());

		self
	}

	/// Sets the application/user key.
	pub fn user_key(mut self, value: impl Into<String>) -> Self {
		self.user_key = Some(value.into());

		self
	}

	/// Sets the shared secret.
	pub fn secret(mut self, value: impl Into<String>) -> Self {
		self.secret = Some(Secret::new(value));

		self
	}

	/// Sets the data-center domain; the base URL becomes `https://{domain}/`.
	pub fn domain(mut self, value: impl Into<String>) -> Self {
		self.domain = Some(value.into());

		self
	}

	/// Sets an explicit base URL (proxies, tests).
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Overrides the per-request deadline (defaults to 30 seconds).
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Enables raw-body diagnostics on decode failures.
	pub fn verbose_errors(mut self, enabled: bool) -> Self {
		self.verbose_errors = enabled;

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<ClientConfig, ConfigBuildError> {
		let api_key = required("api_key", self.api_key)?;
		let user_key = required("user_key", self.user_key)?;
		let secret = self
			.secret
			.filter(|secret| !secret.is_empty())
			.ok_or(ConfigBuildError::MissingField { field: "secret" })?;
		let base_url = match (self.base_url, self.domain) {
			(Some(url), _) => url,
			(None, Some(domain)) => domain_url(&domain)?,
			(None, None) => return Err(ConfigBuildError::MissingEndpoint),
		};
		let base_url = normalize_base_url(base_url)?;
		let request_timeout = self.request_timeout.unwrap_or(ClientConfig::DEFAULT_REQUEST_TIMEOUT);

		if !request_timeout.is_positive() {
			return Err(ConfigBuildError::NonPositiveTimeout);
		}

		Ok(ClientConfig {
			credentials: Credentials { api_key, user_key, secret },
			base_url,
			request_timeout,
			verbose_errors: self.verbose_errors,
		})
	}
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ConfigBuildError> {
	value
		.filter(|value| !value.trim().is_empty())
		.ok_or(ConfigBuildError::MissingField { field })
}

fn domain_url(domain: &str) -> Result<Url, ConfigBuildError> {
	let trimmed = domain.trim();

	if trimmed.is_empty() {
		return Err(ConfigBuildError::MissingField { field: "domain" });
	}

	Url::parse(&format!("https://{trimmed}/"))
		.map_err(|source| ConfigBuildError::InvalidDomain { domain: domain.to_owned(), source })
}

fn normalize_base_url(mut url: Url) -> Result<Url, ConfigBuildError> {
	if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
		return Err(ConfigBuildError::UnsupportedScheme { url: url.to_string() });
	}
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	url.set_query(None);
	url.set_fragment(None);

	Ok(url)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn complete() -> ClientConfigBuilder {
		ClientConfig::builder().api_key("key").user_key("user").secret("c2VjcmV0")
	}

	#[test]
	fn build_requires_credentials_and_endpoint() {
		assert_eq!(
			ClientConfig::builder().user_key("u").secret("s").domain("d.example").build(),
			Err(ConfigBuildError::MissingField { field: "api_key" })
		);
		assert_eq!(
			complete().secret("").domain("d.example").build(),
			Err(ConfigBuildError::MissingField { field: "secret" })
		);
		assert_eq!(complete().build(), Err(ConfigBuildError::MissingEndpoint));
	}

	#[test]
	fn build_rejects_unusable_endpoints() {
		let err = complete()
			.base_url(Url::parse("ftp://files.example.com/").expect("FTP URL should parse."))
			.build()
			.expect_err("Non-HTTP schemes must be rejected.");

		assert!(matches!(err, ConfigBuildError::UnsupportedScheme { .. }));

		let err = complete()
			.domain("bad domain")
			.build()
			.expect_err("Domains with spaces must be rejected.");

		assert!(matches!(err, ConfigBuildError::InvalidDomain { .. }));
	}

	#[test]
	fn build_applies_timeout_defaults_and_validation() {
		let config = complete().domain("accounts.us1.gigya.com").build().expect("Config should build.");

		assert_eq!(config.request_timeout, ClientConfig::DEFAULT_REQUEST_TIMEOUT);
		assert!(!config.verbose_errors);
		assert_eq!(config.base_url.as_str(), "https://accounts.us1.gigya.com/");
		assert_eq!(
			complete().domain("d.example").request_timeout(Duration::ZERO).build(),
			Err(ConfigBuildError::NonPositiveTimeout)
		);
	}

	#[test]
	fn base_url_wins_over_domain() {
		let config = complete()
			.domain("accounts.us1.gigya.com")
			.base_url(Url::parse("http://localhost:4000").expect("Local URL should parse."))
			.verbose_errors(true)
			.build()
			.expect("Config should build.");

		assert_eq!(config.base_url.as_str(), "http://localhost:4000/");
		assert!(config.verbose_errors);
	}
}
