//! Typed extension (webhook) requests and responses.
//!
//! The service calls an extension endpoint before selected account operations and
//! expects a verdict back. Requests are a closed set selected by `extensionPoint`;
//! an unknown point fails to decode instead of falling through to untyped probing.
//! Inbound bodies usually arrive as signed tokens, so verify them with
//! [`crate::api::JwtPublicKey::verify_claims`] before trusting any field.

// crates.io
use serde_json::{Map, Value, json};
// self
use crate::{_prelude::*, api::Account, auth::Secret, error::DecodeError};

/// Decoded extension call.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "RawEnvelope")]
pub struct ExtensionEnvelope {
	/// Site API key the call belongs to.
	pub api_key: String,
	/// Service-side call identifier.
	pub call_id: String,
	/// Typed request.
	pub request: ExtensionRequest,
}
impl ExtensionEnvelope {
	/// Decodes an unsigned JSON body.
	pub fn from_slice(body: &[u8]) -> Result<Self> {
		let mut de = serde_json::Deserializer::from_slice(body);

		Ok(serde_path_to_error::deserialize(&mut de)
			.map_err(|source| DecodeError::Claims { source })?)
	}
}
impl TryFrom<RawEnvelope> for ExtensionEnvelope {
	type Error = ExtensionDecodeError;

	fn try_from(raw: RawEnvelope) -> Result<Self, Self::Error> {
		let point = raw.extension_point;
		let request = match point.as_str() {
			ExtensionRequest::ON_BEFORE_ACCOUNTS_REGISTER => {
				ExtensionRequest::OnBeforeAccountsRegister(decode_data(&point, raw.data)?)
			},
			ExtensionRequest::ON_BEFORE_ACCOUNTS_LOGIN => {
				ExtensionRequest::OnBeforeAccountsLogin(decode_data(&point, raw.data)?)
			},
			ExtensionRequest::ON_BEFORE_SET_ACCOUNT_INFO => {
				ExtensionRequest::OnBeforeSetAccountInfo(decode_data(&point, raw.data)?)
			},
			_ => return Err(ExtensionDecodeError::UnknownPoint(point)),
		};

		Ok(Self { api_key: raw.api_key, call_id: raw.call_id, request })
	}
}

/// Failure to map an envelope onto a typed request.
#[derive(Debug, ThisError)]
pub enum ExtensionDecodeError {
	/// `extensionPoint` names no supported request.
	#[error("Unsupported extension point `{0}`.")]
	UnknownPoint(String),
	/// `data` does not match the fields of its extension point.
	#[error("Invalid `{point}` data at `{}`: {}.", .source.path(), .source.inner())]
	InvalidData {
		/// Extension point being decoded.
		point: String,
		/// Structured parsing failure naming the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Closed set of extension requests.
#[derive(Clone, Debug, PartialEq)]
pub enum ExtensionRequest {
	/// Runs before a registration is committed.
	OnBeforeAccountsRegister(ExtensionData<RegisterParams>),
	/// Runs before a login is accepted.
	OnBeforeAccountsLogin(ExtensionData<LoginParams>),
	/// Runs before account fields are updated.
	OnBeforeSetAccountInfo(ExtensionData<SetAccountInfoParams>),
}
impl ExtensionRequest {
	const ON_BEFORE_ACCOUNTS_LOGIN: &str = "OnBeforeAccountsLogin";
	const ON_BEFORE_ACCOUNTS_REGISTER: &str = "OnBeforeAccountsRegister";
	const ON_BEFORE_SET_ACCOUNT_INFO: &str = "OnBeforeSetAccountInfo";

	/// Wire name of the extension point.
	pub fn extension_point(&self) -> &'static str {
		match self {
			Self::OnBeforeAccountsRegister(_) => Self::ON_BEFORE_ACCOUNTS_REGISTER,
			Self::OnBeforeAccountsLogin(_) => Self::ON_BEFORE_ACCOUNTS_LOGIN,
			Self::OnBeforeSetAccountInfo(_) => Self::ON_BEFORE_SET_ACCOUNT_INFO,
		}
	}

	/// Caller context shared by every point.
	pub fn context(&self) -> &ExtensionContext {
		match self {
			Self::OnBeforeAccountsRegister(data) => &data.context,
			Self::OnBeforeAccountsLogin(data) => &data.context,
			Self::OnBeforeSetAccountInfo(data) => &data.context,
		}
	}

	/// Account the operation targets, when the service included it.
	pub fn account_info(&self) -> Option<&Account> {
		match self {
			Self::OnBeforeAccountsRegister(data) => data.account_info.as_ref(),
			Self::OnBeforeAccountsLogin(data) => data.account_info.as_ref(),
			Self::OnBeforeSetAccountInfo(data) => data.account_info.as_ref(),
		}
	}

	/// UI language requested by the end user.
	pub fn lang(&self) -> Option<&str> {
		match self {
			Self::OnBeforeAccountsRegister(data) => data.params.lang.as_deref(),
			Self::OnBeforeAccountsLogin(data) => data.params.lang.as_deref(),
			Self::OnBeforeSetAccountInfo(data) => data.params.lang.as_deref(),
		}
	}
}

/// `data` object of an extension call.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionData<P> {
	/// Parameters of the intercepted operation.
	pub params: P,
	/// Current account state.
	#[serde(default)]
	pub account_info: Option<Account>,
	/// Caller context.
	#[serde(default)]
	pub context: ExtensionContext,
}

/// Caller context.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ExtensionContext {
	/// End-user IP address.
	#[serde(default, rename = "clientIP")]
	pub client_ip: Option<String>,
}

/// Registration parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterParams {
	/// Email being registered.
	pub email: String,
	/// Chosen password.
	#[serde(default)]
	pub password: Option<Secret>,
	/// UI language.
	#[serde(default)]
	pub lang: Option<String>,
	/// Profile fields submitted with the registration.
	#[serde(default)]
	pub profile: Option<Value>,
	/// Fields not modeled above.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Login parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginParams {
	/// Identifier the user logs in with.
	pub login_id: String,
	/// Submitted password.
	#[serde(default)]
	pub password: Option<Secret>,
	/// UI language.
	#[serde(default)]
	pub lang: Option<String>,
	/// Fields not modeled above.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Account update parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAccountInfoParams {
	/// Profile patch.
	#[serde(default)]
	pub profile: Option<Value>,
	/// Data patch.
	#[serde(default)]
	pub data: Option<Value>,
	/// UI language.
	#[serde(default)]
	pub lang: Option<String>,
	/// Fields not modeled above.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Verdict returned to the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExtensionStatus {
	/// Let the operation proceed.
	Ok,
	/// Block the operation.
	Fail,
	/// Proceed with the fields in `data` merged in.
	Enrich,
}

/// Field-level validation failure shown next to the offending input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
	/// Dotted field path, e.g. `profile.firstName`.
	pub field_name: String,
	/// Message shown to the end user.
	pub message: String,
}
impl ValidationError {
	/// Creates a validation error.
	pub fn new(field_name: impl Into<String>, message: impl Into<String>) -> Self {
		Self { field_name: field_name.into(), message: message.into() }
	}
}

/// Extension response body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtensionResponse {
	/// Verdict.
	pub status: ExtensionStatus,
	/// Verdict-specific payload.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,
}
impl ExtensionResponse {
	/// Lets the operation proceed unchanged.
	pub fn ok() -> Self {
		Self { status: ExtensionStatus::Ok, data: None }
	}

	/// Blocks the operation with field-level errors.
	pub fn fail_validation(errors: Vec<ValidationError>) -> Self {
		Self { status: ExtensionStatus::Fail, data: Some(json!({ "validationErrors": errors })) }
	}

	/// Blocks the operation with a single message.
	pub fn fail_with_message(message: impl Into<String>) -> Self {
		Self {
			status: ExtensionStatus::Fail,
			data: Some(json!({ "userFacingErrorMessage": message.into() })),
		}
	}

	/// Lets the operation proceed with `data` merged into the account.
	pub fn enrich(data: Value) -> Self {
		Self { status: ExtensionStatus::Enrich, data: Some(data) }
	}
}

#[derive(Deserialize)]
struct RawEnvelope {
	#[serde(rename = "apiKey")]
	api_key: String,
	#[serde(rename = "callID", alias = "callId")]
	call_id: String,
	#[serde(rename = "extensionPoint")]
	extension_point: String,
	#[serde(default)]
	data: Value,
}

fn decode_data<P>(point: &str, data: Value) -> Result<ExtensionData<P>, ExtensionDecodeError>
where
	P: DeserializeOwned,
{
	serde_path_to_error::deserialize(data)
		.map_err(|source| ExtensionDecodeError::InvalidData { point: point.to_owned(), source })
}
