//! Opaque account payloads and the parameters of account-mutating calls.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{_prelude::*, http::RequestParams};

/// Envelope keys stripped from single-account responses.
const ENVELOPE_KEYS: [&str; 6] =
	["callId", "errorCode", "statusCode", "statusReason", "time", "apiVersion"];

/// Account record as returned by the service.
///
/// The client never interprets its fields beyond the `UID`; profile, data,
/// preference, and subscription shapes belong to the caller.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Account(Map<String, Value>);
impl Account {
	/// Wraps a JSON object.
	pub fn new(fields: Map<String, Value>) -> Self {
		Self(fields)
	}

	/// Unique account identifier, when present.
	pub fn uid(&self) -> Option<&str> {
		self.0.get("UID").and_then(Value::as_str)
	}

	/// Returns a top-level field.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Borrows the raw JSON object.
	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	/// Returns the raw JSON object.
	pub fn into_inner(self) -> Map<String, Value> {
		self.0
	}

	pub(crate) fn without_envelope(mut self) -> Self {
		for key in ENVELOPE_KEYS {
			self.0.remove(key);
		}

		self
	}
}
impl From<Map<String, Value>> for Account {
	fn from(fields: Map<String, Value>) -> Self {
		Self(fields)
	}
}

/// Partial update sent through `accounts.setAccountInfo`.
///
/// `profile` and `data` travel as JSON-encoded form values; fields left `None` are
/// not sent and remain untouched on the service side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountUpdate {
	/// Account to update.
	pub uid: String,
	/// Profile fields to merge.
	pub profile: Option<Value>,
	/// Site-specific data fields to merge.
	pub data: Option<Value>,
	/// Targets a lite (email-only) account when `true`.
	pub is_lite: Option<bool>,
}
impl AccountUpdate {
	/// Starts an empty update for `uid`.
	pub fn new(uid: impl Into<String>) -> Self {
		Self { uid: uid.into(), profile: None, data: None, is_lite: None }
	}

	/// Sets the profile patch.
	pub fn profile(mut self, profile: Value) -> Self {
		self.profile = Some(profile);

		self
	}

	/// Sets the data patch.
	pub fn data(mut self, data: Value) -> Self {
		self.data = Some(data);

		self
	}

	/// Marks the target as a lite account.
	pub fn lite(mut self, is_lite: bool) -> Self {
		self.is_lite = Some(is_lite);

		self
	}

	pub(crate) fn into_params(self) -> RequestParams {
		let mut params = RequestParams::new().with("UID", self.uid);

		if let Some(profile) = self.profile {
			params.insert("profile", profile.to_string());
		}
		if let Some(data) = self.data {
			params.insert("data", data.to_string());
		}
		if let Some(is_lite) = self.is_lite {
			params.insert("isLite", is_lite.to_string());
		}

		params
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn envelope_is_stripped_but_fields_survive() {
		let account: Account = serde_json::from_value(json!({
			"callId": "c4",
			"errorCode": 0,
			"statusCode": 200,
			"statusReason": "OK",
			"time": "2024-11-11T03:56:09.570Z",
			"apiVersion": 2,
			"UID": "uid-42",
			"profile": { "email": "ada@example.com" },
		}))
		.expect("Account response should decode.");
		let account = account.without_envelope();

		assert_eq!(account.uid(), Some("uid-42"));
		assert_eq!(account.as_map().len(), 2);
		assert_eq!(account.get("profile"), Some(&json!({ "email": "ada@example.com" })));
	}

	#[test]
	fn aggregate_rows_have_no_uid() {
		let row: Account = serde_json::from_value(json!({ "count(*)": 7, "data.country": "NL" }))
			.expect("Aggregate rows should decode.");

		assert_eq!(row.uid(), None);
		assert_eq!(row.get("count(*)"), Some(&json!(7)));
	}

	#[test]
	fn update_encodes_only_set_fields() {
		let params =
			AccountUpdate::new("uid-42").data(json!({ "terms": true })).lite(false).into_params();

		assert_eq!(params.get("UID"), Some("uid-42"));
		assert_eq!(params.get("data"), Some(r#"{"terms":true}"#));
		assert_eq!(params.get("isLite"), Some("false"));
		assert!(!params.contains("profile"));
	}
}
