//! Service methods, the common response envelope, and path-aware response decoding.

pub mod accounts;
pub mod keys;

pub use accounts::*;
pub use keys::*;

// crates.io
use serde_path_to_error::{Path, Segment};
// self
use crate::{_prelude::*, error::DecodeError};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Service methods invoked by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiMethod {
	/// `accounts.search`.
	Search,
	/// `accounts.getAccountInfo`.
	GetAccountInfo,
	/// `accounts.setAccountInfo`.
	SetAccountInfo,
	/// `accounts.importFullAccount`.
	ImportFullAccount,
	/// `accounts.deleteAccount`.
	DeleteAccount,
	/// `accounts.getJWTPublicKey`.
	GetJwtPublicKey,
}
impl ApiMethod {
	/// Returns the wire name appended to the base URL.
	pub const fn as_str(self) -> &'static str {
		match self {
			ApiMethod::Search => "accounts.search",
			ApiMethod::GetAccountInfo => "accounts.getAccountInfo",
			ApiMethod::SetAccountInfo => "accounts.setAccountInfo",
			ApiMethod::ImportFullAccount => "accounts.importFullAccount",
			ApiMethod::DeleteAccount => "accounts.deleteAccount",
			ApiMethod::GetJwtPublicKey => "accounts.getJWTPublicKey",
		}
	}
}
impl Display for ApiMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Status fields every response carries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStatus {
	/// Service-side call identifier.
	#[serde(default)]
	pub call_id: Option<String>,
	/// `0` on success, a vendor error code otherwise.
	pub error_code: i64,
	/// HTTP-like status code mirrored in the body.
	#[serde(default)]
	pub status_code: Option<u16>,
	/// Short reason text (`OK`, `Forbidden`, …).
	#[serde(default)]
	pub status_reason: Option<String>,
	/// Human-readable error message, on failures.
	#[serde(default)]
	pub error_message: Option<String>,
	/// Extended error details, on failures.
	#[serde(default)]
	pub error_details: Option<String>,
	/// Server timestamp as sent (ISO 8601).
	#[serde(default)]
	pub time: Option<String>,
	/// Total match count; only search responses carry it.
	#[serde(default)]
	pub total_count: Option<u64>,
}
impl ResponseStatus {
	/// Returns `true` when the service reported success.
	pub fn is_success(&self) -> bool {
		self.error_code == 0
	}

	/// Parses the server timestamp, if present and well-formed.
	pub fn timestamp(&self) -> Option<OffsetDateTime> {
		let raw = self.time.as_deref()?;

		OffsetDateTime::parse(raw, &time::format_description::well_known::Rfc3339).ok()
	}

	/// Converts a failed status into [`Error::Api`]; `None` when the call succeeded.
	pub fn into_error(self) -> Option<Error> {
		if self.is_success() {
			return None;
		}

		let reason = self
			.status_reason
			.or_else(|| self.error_message.clone())
			.unwrap_or_else(|| "unknown error".into());
		let details = self.error_details.or(self.error_message);

		Some(Error::Api {
			code: self.error_code,
			reason,
			details,
			call_id: self.call_id,
			total_count: self.total_count,
		})
	}
}

/// Decodes a response body into `T`, naming the offending JSON path on failure.
///
/// With `verbose` set, the raw body is re-scanned as untyped JSON to attach the value
/// found at the failing path and a bounded preview of the body.
pub(crate) fn decode<T>(method: ApiMethod, body: &[u8], verbose: bool) -> Result<T, DecodeError>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de).map_err(|source| {
		let (offending_value, body_preview) = if verbose {
			(value_at_path(body, source.path()), Some(truncate_preview(body)))
		} else {
			(None, None)
		};

		DecodeError::Response { method: method.as_str(), source, offending_value, body_preview }
	})
}

fn value_at_path(body: &[u8], path: &Path) -> Option<String> {
	let root = serde_json::from_slice::<serde_json::Value>(body).ok()?;
	let mut current = &root;

	for segment in path.iter() {
		current = match segment {
			Segment::Seq { index } => current.get(*index)?,
			Segment::Map { key } => current.get(key.as_str())?,
			_ => return None,
		};
	}

	Some(current.to_string())
}

fn truncate_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	let mut buf = text.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	#[serde(rename_all = "camelCase")]
	struct Page {
		#[allow(dead_code)]
		total_count: u64,
	}

	#[test]
	fn failed_status_becomes_api_error() {
		let status: ResponseStatus = serde_json::from_str(
			r#"{"callId":"c1","errorCode":400006,"statusCode":400,"statusReason":"Bad Request","errorDetails":"Invalid parameter value","totalCount":12}"#,
		)
		.expect("Status fixture should decode.");

		match status.into_error() {
			Some(Error::Api { code, reason, details, call_id, total_count }) => {
				assert_eq!(code, 400_006);
				assert_eq!(reason, "Bad Request");
				assert_eq!(details.as_deref(), Some("Invalid parameter value"));
				assert_eq!(call_id.as_deref(), Some("c1"));
				assert_eq!(total_count, Some(12));
			},
			other => panic!("Unexpected conversion result: {other:?}."),
		}
	}

	#[test]
	fn successful_status_has_no_error_and_parses_time() {
		let status: ResponseStatus = serde_json::from_str(
			r#"{"callId":"c2","errorCode":0,"statusCode":200,"statusReason":"OK","time":"2024-11-11T03:56:09.570Z"}"#,
		)
		.expect("Status fixture should decode.");

		assert!(status.is_success());
		assert_eq!(
			status.timestamp().map(|moment| moment.unix_timestamp()),
			Some(1_731_297_369)
		);
		assert!(status.into_error().is_none());
	}

	#[test]
	fn decode_names_the_offending_path() {
		let body = br#"{"totalCount":"many"}"#;
		let err = decode::<Page>(ApiMethod::Search, body, false)
			.expect_err("String total counts must fail to decode.");

		match err {
			DecodeError::Response { method, source, offending_value, body_preview } => {
				assert_eq!(method, "accounts.search");
				assert_eq!(source.path().to_string(), "totalCount");
				assert!(offending_value.is_none());
				assert!(body_preview.is_none());
			},
			other => panic!("Unexpected decode error: {other:?}."),
		}
	}

	#[test]
	fn verbose_decode_attaches_offending_value() {
		let body = br#"{"totalCount":"many"}"#;
		let err = decode::<Page>(ApiMethod::Search, body, true)
			.expect_err("String total counts must fail to decode.");

		match err {
			DecodeError::Response { offending_value, body_preview, .. } => {
				assert_eq!(offending_value.as_deref(), Some("\"many\""));
				assert_eq!(body_preview.as_deref(), Some(r#"{"totalCount":"many"}"#));
			},
			other => panic!("Unexpected decode error: {other:?}."),
		}
	}

	#[test]
	fn preview_truncates_long_bodies() {
		let body = "x".repeat(BODY_PREVIEW_LIMIT + 10);
		let preview = truncate_preview(body.as_bytes());

		assert_eq!(preview.chars().count(), BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
	}
}
