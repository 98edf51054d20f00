//! Published token-signing key.

// self
use crate::{
	_prelude::*,
	error::DecodeError,
	jwt::{DecodedToken, PublicKeyMaterial},
};

/// RSA public key published by `accounts.getJWTPublicKey`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtPublicKey {
	/// Key identifier, matched against the token header's `kid`.
	#[serde(default)]
	pub kid: String,
	/// Signing algorithm, `RS256` in practice.
	#[serde(default)]
	pub alg: String,
	/// Key type, `RSA` in practice.
	#[serde(default)]
	pub kty: Option<String>,
	/// Base64url modulus.
	pub n: String,
	/// Base64url public exponent.
	pub e: String,
	/// Intended key use, `sig` in practice.
	#[serde(default, rename = "use")]
	pub key_use: Option<String>,
}
impl JwtPublicKey {
	/// Rebuilds the RSA key material.
	pub fn material(&self) -> Result<PublicKeyMaterial> {
		PublicKeyMaterial::from_base64url(&self.n, &self.e)
	}

	/// Verifies `token` against this key; see [`crate::jwt::verify_rs256`].
	pub fn verify(&self, token: &str) -> Result<bool> {
		crate::jwt::verify_rs256(token, &self.n, &self.e)
	}

	/// Verifies `token` and decodes its payload into `T`.
	///
	/// A signature mismatch yields [`Error::InvalidSignature`]; the payload is never
	/// decoded unless the signature holds.
	pub fn verify_claims<T>(&self, token: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let decoded = DecodedToken::parse(token)?;

		if !decoded.verify_with(&self.material()?) {
			return Err(Error::InvalidSignature);
		}

		let mut de = serde_json::Deserializer::from_slice(&decoded.payload);

		let claims = serde_path_to_error::deserialize(&mut de)
			.map_err(|source| DecodeError::Claims { source })?;

		Ok(claims)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::jwt::fixtures::{E, N, TOKEN};

	#[derive(Debug, Deserialize)]
	struct Claims {
		#[serde(rename = "apiKey")]
		api_key: String,
		#[serde(rename = "extensionPoint")]
		extension_point: String,
	}

	#[derive(Debug, Deserialize)]
	struct StrictClaims {
		#[allow(dead_code)]
		#[serde(rename = "callID")]
		call_id: u64,
	}

	fn key() -> JwtPublicKey {
		serde_json::from_value(serde_json::json!({
			"callId": "c3",
			"errorCode": 0,
			"kid": "fixture-key",
			"alg": "RS256",
			"kty": "RSA",
			"use": "sig",
			"n": N,
			"e": E,
		}))
		.expect("Key response should decode.")
	}

	#[test]
	fn decodes_published_key_fields() {
		let key = key();

		assert_eq!(key.kid, "fixture-key");
		assert_eq!(key.key_use.as_deref(), Some("sig"));
		assert!(key.verify(TOKEN).expect("Fixture token should verify."));
	}

	#[test]
	fn verify_claims_decodes_payload() {
		let claims = key().verify_claims::<Claims>(TOKEN).expect("Claims should decode.");

		assert_eq!(claims.api_key, "4_fixtureApiKey");
		assert_eq!(claims.extension_point, "OnBeforeAccountsLogin");
	}

	#[test]
	fn verify_claims_rejects_foreign_signature() {
		let mut parts = TOKEN.split('.').map(str::to_owned).collect::<Vec<_>>();

		parts[1].replace_range(..1, "f");

		match key().verify_claims::<Claims>(&parts.join(".")) {
			Err(Error::InvalidSignature) => {},
			other => panic!("Expected a signature mismatch, got {other:?}."),
		}
	}

	#[test]
	fn verify_claims_reports_claim_path() {
		match key().verify_claims::<StrictClaims>(TOKEN) {
			Err(Error::Decode(DecodeError::Claims { source })) => {
				assert_eq!(source.path().to_string(), "callID");
			},
			other => panic!("Expected a claims decode failure, got {other:?}."),
		}
	}
}
