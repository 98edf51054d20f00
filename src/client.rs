//! Account client facade.
//!
//! [`AccountsClient`] owns an immutable [`ClientConfig`], a [`Transport`], and an
//! [`Authorizer`]. Every call goes through the same pipeline: attach `apiKey` and
//! `userKey`, authorize, submit, decode the status envelope, and only then decode the
//! typed payload. Bulk search lives in [`crate::search`].

// self
use crate::{
	_prelude::*,
	api::{self, Account, AccountUpdate, ApiMethod, JwtPublicKey, ResponseStatus},
	auth::Authorizer,
	config::ClientConfig,
	error::TransportError,
	http::{ApiRequest, RequestParams, Transport},
	obs::{self, CallOutcome, CallSpan},
};
#[cfg(feature = "reqwest")]
use crate::{auth::SecretParamAuthorizer, http::ReqwestTransport};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestAccountsClient = AccountsClient<ReqwestTransport>;

/// Client for the `accounts.*` service methods.
///
/// Cloning is cheap; clones share the config, transport, and authorizer. To change
/// credentials or the data center, build a new [`ClientConfig`] and a new client.
pub struct AccountsClient<T>
where
	T: ?Sized + Transport,
{
	/// Immutable configuration applied to every call.
	pub config: Arc<ClientConfig>,
	/// Transport used for every outbound request.
	pub transport: Arc<T>,
	/// Strategy that attaches authorization material.
	pub authorizer: Arc<dyn Authorizer>,
}
impl<T> AccountsClient<T>
where
	T: ?Sized + Transport,
{
	/// Creates a client over a caller-provided transport and authorizer.
	///
	/// The transport is responsible for enforcing [`ClientConfig::request_timeout`].
	pub fn with_transport(
		config: ClientConfig,
		transport: impl Into<Arc<T>>,
		authorizer: Arc<dyn Authorizer>,
	) -> Self {
		Self { config: Arc::new(config), transport: transport.into(), authorizer }
	}

	/// Replaces the authorization strategy.
	pub fn with_authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
		self.authorizer = authorizer;

		self
	}

	/// Fetches one account by `UID`.
	///
	/// The response envelope (`callId`, `errorCode`, …) is stripped; every other field
	/// is returned untouched.
	pub async fn get_account_info(&self, uid: &str) -> Result<Account> {
		const METHOD: ApiMethod = ApiMethod::GetAccountInfo;

		let params = RequestParams::new().with("UID", uid);
		let account = self
			.observe(METHOD, "get_account_info", self.call::<Account>(METHOD, params))
			.await?;

		Ok(account.without_envelope())
	}

	/// Applies a partial update to one account.
	pub async fn set_account_info(&self, update: AccountUpdate) -> Result<ResponseStatus> {
		const METHOD: ApiMethod = ApiMethod::SetAccountInfo;

		self.observe(METHOD, "set_account_info", self.call(METHOD, update.into_params())).await
	}

	/// Deletes one account by `UID`.
	pub async fn delete_account(&self, uid: &str) -> Result<ResponseStatus> {
		const METHOD: ApiMethod = ApiMethod::DeleteAccount;

		let params = RequestParams::new().with("UID", uid);

		self.observe(METHOD, "delete_account", self.call(METHOD, params)).await
	}

	/// Imports a complete account record.
	///
	/// Each top-level field becomes one form parameter: strings are sent as-is and
	/// every other value is JSON-encoded.
	pub async fn import_full_account(&self, account: &Account) -> Result<ResponseStatus> {
		const METHOD: ApiMethod = ApiMethod::ImportFullAccount;

		let params = account
			.as_map()
			.iter()
			.map(|(key, value)| match value {
				serde_json::Value::String(s) => (key.clone(), s.clone()),
				other => (key.clone(), other.to_string()),
			})
			.collect::<RequestParams>();

		self.observe(METHOD, "import_full_account", self.call(METHOD, params)).await
	}

	/// Fetches the RSA key the service signs tokens with.
	pub async fn get_jwt_public_key(&self) -> Result<JwtPublicKey> {
		const METHOD: ApiMethod = ApiMethod::GetJwtPublicKey;

		self.observe(METHOD, "get_jwt_public_key", self.call(METHOD, RequestParams::new())).await
	}

	/// Submits one call and decodes its payload after the status check.
	pub(crate) async fn call<R>(&self, method: ApiMethod, params: RequestParams) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let body = self.submit(method, params).await?;

		self.decode_checked(method, &body)
	}

	pub(crate) async fn submit(&self, method: ApiMethod, params: RequestParams) -> Result<Vec<u8>> {
		let credentials = &self.config.credentials;
		let params = params
			.with("apiKey", credentials.api_key.as_str())
			.with("userKey", credentials.user_key.as_str());
		let params = self.authorizer.authorize(credentials, params)?;
		let url = self.config.endpoint(method)?;
		let body = self
			.transport
			.submit(ApiRequest { method, url, params })
			.await
			.map_err(|e| TransportError::network(method.as_str(), e))?;

		Ok(body)
	}

	/// Decodes the status envelope first so failures surface as [`Error::Api`] even when
	/// the payload fields are missing.
	pub(crate) fn decode_checked<R>(&self, method: ApiMethod, body: &[u8]) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let verbose = self.config.verbose_errors;
		let status = api::decode::<ResponseStatus>(method, body, verbose)?;

		if let Some(e) = status.into_error() {
			obs::event!(warn, method = method.as_str(), error = %e, "Service reported an error.");

			return Err(e);
		}

		Ok(api::decode(method, body, verbose)?)
	}

	pub(crate) async fn observe<F, R>(
		&self,
		method: ApiMethod,
		stage: &'static str,
		fut: F,
	) -> Result<R>
	where
		F: Future<Output = Result<R>>,
	{
		let span = CallSpan::new(method, stage);

		obs::record_call_outcome(method, CallOutcome::Attempt);

		let result = span.instrument(fut).await;
		let outcome = if result.is_ok() { CallOutcome::Success } else { CallOutcome::Failure };

		span.finish(outcome);
		obs::record_call_outcome(method, outcome);

		result
	}
}
#[cfg(feature = "reqwest")]
impl AccountsClient<ReqwestTransport> {
	/// Creates a client over a reqwest transport bounded by the configured timeout,
	/// authorizing with [`SecretParamAuthorizer`].
	pub fn new(config: ClientConfig) -> Result<Self> {
		let transport = ReqwestTransport::with_timeout(config.request_timeout)?;

		Ok(Self::with_transport(config, transport, Arc::new(SecretParamAuthorizer)))
	}
}
impl<T> Clone for AccountsClient<T>
where
	T: ?Sized + Transport,
{
	fn clone(&self) -> Self {
		Self {
			config: self.config.clone(),
			transport: self.transport.clone(),
			authorizer: self.authorizer.clone(),
		}
	}
}
impl<T> Debug for AccountsClient<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccountsClient")
			.field("config", &self.config)
			.field("transport", &std::any::type_name::<T>())
			.finish()
	}
}
