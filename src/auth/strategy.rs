//! Pluggable request authorization.
//!
//! The service accepts two schemes: the raw secret sent as a form parameter, and a
//! canonical HMAC-SHA1 signature over timestamped parameters. Which one a deployment
//! enforces is a site setting, so the client delegates the choice to an
//! [`Authorizer`] supplied at construction.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{_prelude::*, auth::signer, config::Credentials, error::AuthError, http::RequestParams};

const NONCE_LEN: usize = 16;

/// Strategy that turns unauthenticated parameters into authorized ones.
///
/// The client inserts `apiKey` and `userKey` before calling [`Authorizer::authorize`],
/// so implementations only add whatever proves possession of the secret.
pub trait Authorizer: Send + Sync {
	/// Returns `params` with authorization material attached.
	fn authorize(
		&self,
		credentials: &Credentials,
		params: RequestParams,
	) -> Result<RequestParams, AuthError>;
}

/// Sends the shared secret verbatim as the `secret` parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SecretParamAuthorizer;
impl Authorizer for SecretParamAuthorizer {
	fn authorize(
		&self,
		credentials: &Credentials,
		params: RequestParams,
	) -> Result<RequestParams, AuthError> {
		Ok(params.with("secret", credentials.secret.expose()))
	}
}

/// Signs each request with HMAC-SHA1 over its canonical parameter string.
///
/// Adds `timestamp` (unix seconds) and a random `nonce` before signing, then sends
/// the digest as `sig`. The raw secret never leaves the process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SignedRequestAuthorizer;
impl SignedRequestAuthorizer {
	fn nonce() -> String {
		rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect()
	}
}
impl Authorizer for SignedRequestAuthorizer {
	fn authorize(
		&self,
		credentials: &Credentials,
		mut params: RequestParams,
	) -> Result<RequestParams, AuthError> {
		params.remove("secret");
		params.remove("sig");
		params
			.insert("timestamp", OffsetDateTime::now_utc().unix_timestamp().to_string())
			.insert("nonce", Self::nonce());

		let sig = signer::sign(params.iter(), credentials.secret.expose())?;

		Ok(params.with("sig", sig))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::Secret;

	fn credentials(secret: &str) -> Credentials {
		Credentials {
			api_key: "4_fixtureApiKey".into(),
			user_key: "AbCdEf".into(),
			secret: Secret::new(secret),
		}
	}

	fn base_params() -> RequestParams {
		RequestParams::new().with("apiKey", "4_fixtureApiKey").with("userKey", "AbCdEf")
	}

	#[test]
	fn secret_param_adds_raw_secret() {
		let params = SecretParamAuthorizer
			.authorize(&credentials("c2VjcmV0"), base_params())
			.expect("Plain secret authorization cannot fail.");

		assert_eq!(params.get("secret"), Some("c2VjcmV0"));
		assert_eq!(params.get("apiKey"), Some("4_fixtureApiKey"));
		assert!(!params.contains("sig"));
	}

	#[test]
	fn signed_request_adds_verifiable_signature() {
		let secret = "Zml4dHVyZS1zaWduaW5nLXNlY3JldA==";
		let mut params = SignedRequestAuthorizer
			.authorize(&credentials(secret), base_params().with("secret", "leaked"))
			.expect("Fixture secret should sign.");

		assert!(!params.contains("secret"));
		assert_eq!(params.get("nonce").map(str::len), Some(NONCE_LEN));
		assert!(params.get("timestamp").is_some_and(|ts| ts.parse::<i64>().is_ok()));

		let sig = params.remove("sig").expect("Signature should be attached.");

		assert_eq!(sig, signer::sign(params.iter(), secret).expect("Recomputing should succeed."));
	}

	#[test]
	fn signed_request_rejects_malformed_secret() {
		let err = SignedRequestAuthorizer
			.authorize(&credentials("not-base64!!"), base_params())
			.expect_err("Malformed secrets must fail.");

		assert!(matches!(err, AuthError::MalformedSecret { .. }));
	}

	#[test]
	fn nonces_differ_between_requests() {
		assert_ne!(SignedRequestAuthorizer::nonce(), SignedRequestAuthorizer::nonce());
	}
}
