//! Canonical HMAC-SHA1 request signing.
//!
//! The canonical string concatenates `key=value` for every parameter in ascending
//! byte-wise key order with no separator between pairs. The shared secret is the
//! standard-base64 encoding of the raw HMAC key, and the resulting digest is
//! returned standard-base64 encoded.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use ring::hmac;
// self
use crate::{_prelude::*, error::AuthError};

/// Builds the canonical signing string for a parameter set.
///
/// Keys are sorted regardless of the iteration order the caller used; when a key
/// repeats, the last value wins.
pub fn canonical_string<I, K, V>(params: I) -> String
where
	I: IntoIterator<Item = (K, V)>,
	K: Into<String>,
	V: Into<String>,
{
	let sorted =
		params.into_iter().map(|(k, v)| (k.into(), v.into())).collect::<BTreeMap<String, String>>();
	let mut buf = String::new();

	for (key, value) in &sorted {
		buf.push_str(key);
		buf.push('=');
		buf.push_str(value);
	}

	buf
}

/// Signs `params` with the base64-encoded `secret`.
///
/// Fails with [`AuthError::MalformedSecret`] before any digest is computed when the
/// secret is not valid standard base64.
pub fn sign<I, K, V>(params: I, secret: &str) -> Result<String, AuthError>
where
	I: IntoIterator<Item = (K, V)>,
	K: Into<String>,
	V: Into<String>,
{
	let key_bytes =
		STANDARD.decode(secret).map_err(|source| AuthError::MalformedSecret { source })?;
	let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, &key_bytes);
	let tag = hmac::sign(&key, canonical_string(params).as_bytes());

	Ok(STANDARD.encode(tag.as_ref()))
}
