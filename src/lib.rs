//! Async client for the Gigya customer-identity service.
//!
//! Requests are authorized through a pluggable [`auth::Authorizer`], bulk account
//! search follows service-side cursors while keeping partial progress on failure, and
//! inbound tokens are verified with RS256 against published raw key material.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod extension;
pub mod http;
pub mod jwt;
pub mod obs;
pub mod search;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// crates.io
	use parking_lot::Mutex;
	// self
	use crate::{
		auth::{Authorizer, SecretParamAuthorizer},
		client::AccountsClient,
		config::ClientConfig,
		http::{ApiRequest, Transport, TransportFuture},
	};

	/// Error produced by [`ScriptedTransport`] when a scripted failure is replayed or the script
	/// runs dry.
	#[derive(Debug, ThisError)]
	pub enum ScriptedTransportError {
		/// A failure queued via [`ScriptedTransport::push_failure`].
		#[error("Scripted transport failure: {0}.")]
		Scripted(String),
		/// More requests were submitted than responses were scripted.
		#[error("Scripted transport has no response left for request #{0}.")]
		Exhausted(usize),
	}

	/// In-process [`Transport`] that replays queued responses in order and records every request.
	#[derive(Debug, Default)]
	pub struct ScriptedTransport {
		responses: Mutex<VecDeque<Result<Vec<u8>, String>>>,
		requests: Mutex<Vec<ApiRequest>>,
	}
	impl ScriptedTransport {
		/// Queues a successful response body.
		pub fn push_body(&self, body: impl Into<String>) -> &Self {
			self.responses.lock().push_back(Ok(body.into().into_bytes()));

			self
		}

		/// Queues a successful JSON response.
		pub fn push_json(&self, value: serde_json::Value) -> &Self {
			self.push_body(value.to_string())
		}

		/// Queues a transport failure.
		pub fn push_failure(&self, message: impl Into<String>) -> &Self {
			self.responses.lock().push_back(Err(message.into()));

			self
		}

		/// Returns a snapshot of every request received so far.
		pub fn requests(&self) -> Vec<ApiRequest> {
			self.requests.lock().clone()
		}
	}
	impl Transport for ScriptedTransport {
		type Error = ScriptedTransportError;

		fn submit(&self, request: ApiRequest) -> TransportFuture<'_, Self::Error> {
			let seq = {
				let mut requests = self.requests.lock();

				requests.push(request);

				requests.len()
			};
			let next = self.responses.lock().pop_front();

			Box::pin(async move {
				match next {
					Some(Ok(body)) => Ok(body),
					Some(Err(message)) => Err(ScriptedTransportError::Scripted(message)),
					None => Err(ScriptedTransportError::Exhausted(seq)),
				}
			})
		}
	}

	/// Builds a config pointing at a loopback base URL with fixture credentials.
	pub fn test_config() -> ClientConfig {
		ClientConfig::builder()
			.api_key("4_fixtureApiKey")
			.user_key("AbCdEf")
			.secret("Zml4dHVyZS1zaWduaW5nLXNlY3JldA==")
			.base_url(
				Url::parse("http://127.0.0.1:9/")
					.expect("Loopback fixture base URL should always parse."),
			)
			.build()
			.expect("Fixture config should pass validation.")
	}

	/// Constructs an [`AccountsClient`] backed by a fresh [`ScriptedTransport`].
	pub fn build_scripted_client() -> (AccountsClient<ScriptedTransport>, Arc<ScriptedTransport>) {
		let transport = Arc::new(ScriptedTransport::default());
		let authorizer: Arc<dyn Authorizer> = Arc::new(SecretParamAuthorizer);
		let client = AccountsClient::with_transport(test_config(), transport.clone(), authorizer);

		(client, transport)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
