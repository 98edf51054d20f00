//! Transport primitives for service calls.
//!
//! The client's only dependency on an HTTP stack is [`Transport`]: submit one
//! form-encoded [`ApiRequest`], get the raw response body back. Failures reported
//! by the service itself (non-zero `errorCode`) arrive as ordinary bodies and are
//! classified by the client, so transports return bytes regardless of HTTP status.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, api::ApiMethod};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, obs};

/// Boxed future returned by [`Transport::submit`].
pub type TransportFuture<'a, E> = Pin<Box<dyn Future<Output = Result<Vec<u8>, E>> + 'a + Send>>;

const REDACTED_PARAMS: [&str; 2] = ["secret", "sig"];

/// Form parameters of a single call, kept in ascending key order.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequestParams(BTreeMap<String, String>);
impl RequestParams {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or replaces a parameter.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
		self.0.insert(key.into(), value.into());

		self
	}

	/// Builder-style variant of [`RequestParams::insert`].
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.insert(key, value);

		self
	}

	/// Removes a parameter, returning its value.
	pub fn remove(&mut self, key: &str) -> Option<String> {
		self.0.remove(key)
	}

	/// Returns the value of a parameter.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Returns `true` when the parameter is present.
	pub fn contains(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Iterates over parameters in ascending key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Number of parameters.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no parameter is set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for RequestParams {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let mut map = f.debug_map();

		for (key, value) in &self.0 {
			if REDACTED_PARAMS.contains(&key.as_str()) {
				map.entry(key, &"<redacted>");
			} else {
				map.entry(key, value);
			}
		}

		map.finish()
	}
}
impl<K, V> FromIterator<(K, V)> for RequestParams
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}

/// One outbound, fully authorized call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
	/// Service method being invoked.
	pub method: ApiMethod,
	/// Endpoint URL (`{base_url}{method}`).
	pub url: Url,
	/// Form body parameters.
	pub params: RequestParams,
}

/// Abstraction over HTTP transports capable of executing service calls.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared
/// by several clients, and the returned future must be `Send`. The client never
/// submits a second request before the previous future resolved, so
/// implementations need no ordering guarantees of their own.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type Error: 'static + Send + Sync + StdError;

	/// Submits `request` and resolves to the raw response body.
	fn submit(&self, request: ApiRequest) -> TransportFuture<'_, Self::Error>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Build it through [`ReqwestTransport::with_timeout`] (or hand in a client that
/// already carries a timeout); without one, an unresponsive endpoint stalls a bulk
/// retrieval indefinitely.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose every request is bounded by `timeout`.
	pub fn with_timeout(timeout: Duration) -> Result<Self, ConfigError> {
		let timeout =
			std::time::Duration::try_from(timeout).map_err(ConfigError::http_client_build)?;
		let client = ReqwestClient::builder().timeout(timeout).build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	type Error = ReqwestError;

	fn submit(&self, request: ApiRequest) -> TransportFuture<'_, Self::Error> {
		Box::pin(async move {
			let response = self.0.post(request.url).form(&request.params).send().await?;
			let status = response.status();

			obs::event!(
				debug,
				method = request.method.as_str(),
				status = status.as_u16(),
				"Service response received."
			);

			let body = response.bytes().await?;

			Ok(body.to_vec())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn params_debug_redacts_credentials() {
		let params = RequestParams::new()
			.with("apiKey", "public")
			.with("secret", "very-secret")
			.with("sig", "signature");
		let rendered = format!("{params:?}");

		assert!(rendered.contains("public"));
		assert!(!rendered.contains("very-secret"));
		assert!(!rendered.contains("signature"));
	}

	#[test]
	fn params_iterate_in_key_order() {
		let params: RequestParams = [("query", "q"), ("apiKey", "k"), ("cursorId", "c")]
			.into_iter()
			.collect();
		let keys = params.iter().map(|(key, _)| key).collect::<Vec<_>>();

		assert_eq!(keys, ["apiKey", "cursorId", "query"]);
		assert_eq!(params.len(), 3);
		assert_eq!(params.get("cursorId"), Some("c"));
	}
}
