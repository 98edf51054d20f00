//! Redacting holder for the partner secret and other credentials.

// self
use crate::_prelude::*;

const REDACTED: &str = "<redacted>";

/// Shared secret (or user password) kept out of `Debug` and `Display` output.
///
/// Serde reads and writes the plain string so configs round-trip; only formatting
/// redacts.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);
impl Secret {
	/// Wraps a secret value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw value; never log it.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` for an empty secret, which the config builder rejects.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl From<String> for Secret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl From<&str> for Secret {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Secret({REDACTED})")
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(REDACTED)
	}
}
