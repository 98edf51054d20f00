//! RS256 verification of compact tokens against raw base64url key components.
//!
//! Published keys arrive as the base64url-encoded big-endian bytes of the RSA
//! modulus (`n`) and public exponent (`e`), not as PEM or DER. [`verify_rs256`]
//! rebuilds the key from those integers and checks the PKCS#1 v1.5 / SHA-256
//! signature over the literal `header.payload` text.

// crates.io
use base64::{
	Engine,
	alphabet,
	engine::{GeneralPurpose, GeneralPurposeConfig},
};
use num_bigint::BigUint;
use ring::signature::{self, RsaPublicKeyComponents};
// self
use crate::{
	_prelude::*,
	error::{AuthError, DecodeError, FormatError},
	obs,
};

/// Standard-alphabet engine that tolerates non-zero trailing bits, applied after the
/// base64url alphabet has been translated and padding restored.
const TRANSLATED_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
	&alphabet::STANDARD,
	GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

const MIN_MODULUS_BITS: u64 = 1024;
const MAX_MODULUS_BITS: u64 = 8192;
const EXPONENT_WIDTH: usize = 8;

/// Base64url-encoded input that failed to decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenField {
	/// First token segment.
	Header,
	/// Second token segment.
	Payload,
	/// Third token segment.
	Signature,
	/// RSA modulus (`n`).
	Modulus,
	/// RSA public exponent (`e`).
	Exponent,
}
impl TokenField {
	/// Returns a short human-readable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenField::Header => "token header",
			TokenField::Payload => "token payload",
			TokenField::Signature => "token signature",
			TokenField::Modulus => "key modulus",
			TokenField::Exponent => "key exponent",
		}
	}
}
impl Display for TokenField {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Decodes base64url text, with or without trailing `=` padding.
///
/// `-` and `_` are translated to `+` and `/`, padding is restored to a multiple of
/// four, and the result is decoded with the standard alphabet.
pub fn decode_base64url(input: &str, field: TokenField) -> Result<Vec<u8>, DecodeError> {
	let mut translated = input
		.chars()
		.map(|c| match c {
			'-' => '+',
			'_' => '/',
			c => c,
		})
		.collect::<String>();

	let padding = (4 - translated.len() % 4) % 4;

	translated.extend(std::iter::repeat_n('=', padding));

	TRANSLATED_URL_SAFE.decode(translated).map_err(|source| DecodeError::Base64 { field, source })
}

/// RSA public key rebuilt from raw big-endian integers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKeyMaterial {
	modulus: BigUint,
	exponent: u64,
}
impl PublicKeyMaterial {
	/// Decodes and validates base64url `n` and `e` components.
	///
	/// Exponents wider than eight bytes or above `u32::MAX`, even exponents, exponents
	/// below 3, and moduli outside 1024..=8192 bits are rejected with
	/// [`AuthError::KeyMaterial`].
	pub fn from_base64url(n: &str, e: &str) -> Result<Self> {
		let modulus = BigUint::from_bytes_be(&decode_base64url(n, TokenField::Modulus)?);
		let exponent = Self::exponent_from_be(&decode_base64url(e, TokenField::Exponent)?)?;

		Ok(Self::new(modulus, exponent)?)
	}

	/// Validates already-decoded components.
	pub fn new(modulus: BigUint, exponent: u64) -> Result<Self, AuthError> {
		let bits = modulus.bits();

		if !(MIN_MODULUS_BITS..=MAX_MODULUS_BITS).contains(&bits) {
			return Err(key_material(format!(
				"modulus is {bits} bits, expected {MIN_MODULUS_BITS}..={MAX_MODULUS_BITS}"
			)));
		}
		if exponent > u64::from(u32::MAX) {
			return Err(key_material(format!("exponent {exponent} exceeds 32 bits")));
		}
		if exponent < 3 || exponent & 1 == 0 {
			return Err(key_material(format!("exponent {exponent} is not an odd value >= 3")));
		}

		Ok(Self { modulus, exponent })
	}

	/// Modulus as an unsigned integer.
	pub fn modulus(&self) -> &BigUint {
		&self.modulus
	}

	/// Public exponent.
	pub fn exponent(&self) -> u64 {
		self.exponent
	}

	/// Checks a PKCS#1 v1.5 / SHA-256 signature over `message`.
	pub fn verify(&self, message: &[u8], sig: &[u8]) -> bool {
		let n = self.modulus.to_bytes_be();
		let e = BigUint::from(self.exponent).to_bytes_be();

		RsaPublicKeyComponents { n: &n, e: &e }
			.verify(&signature::RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY, message, sig)
			.is_ok()
	}

	fn exponent_from_be(bytes: &[u8]) -> Result<u64, AuthError> {
		if bytes.len() > EXPONENT_WIDTH {
			return Err(key_material(format!(
				"exponent is {} bytes, at most {EXPONENT_WIDTH} supported",
				bytes.len()
			)));
		}

		let mut buf = [0_u8; EXPONENT_WIDTH];

		buf[EXPONENT_WIDTH - bytes.len()..].copy_from_slice(bytes);

		Ok(u64::from_be_bytes(buf))
	}
}

/// A compact token split into its three segments, each decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedToken<'a> {
	/// `header.payload` text exactly as received; the signed message.
	pub signing_input: &'a str,
	/// Decoded header JSON bytes.
	pub header: Vec<u8>,
	/// Decoded payload JSON bytes.
	pub payload: Vec<u8>,
	/// Decoded signature bytes.
	pub signature: Vec<u8>,
}
impl<'a> DecodedToken<'a> {
	/// Splits and decodes `token`.
	///
	/// Structure is checked before anything is decoded, so a two-segment token fails
	/// with [`FormatError::TokenSegments`] without a decode attempt.
	pub fn parse(token: &'a str) -> Result<Self> {
		let segments = token.split('.').collect::<Vec<_>>();
		let [header, payload, signature] = segments.as_slice() else {
			return Err(FormatError::TokenSegments { found: segments.len() }.into());
		};
		let signing_input = &token[..header.len() + 1 + payload.len()];

		Ok(Self {
			signing_input,
			header: decode_base64url(header, TokenField::Header)?,
			payload: decode_base64url(payload, TokenField::Payload)?,
			signature: decode_base64url(signature, TokenField::Signature)?,
		})
	}

	/// Verifies the signature with `key`.
	pub fn verify_with(&self, key: &PublicKeyMaterial) -> bool {
		key.verify(self.signing_input.as_bytes(), &self.signature)
	}
}

/// Verifies an RS256 compact token against base64url modulus `n` and exponent `e`.
///
/// Returns `Ok(true)` for a valid signature and `Ok(false)` for a cryptographic
/// mismatch. Structural problems yield [`Error::Format`], encoding problems
/// [`Error::Decode`] naming the failing field, and unusable keys [`Error::Auth`].
pub fn verify_rs256(token: &str, n: &str, e: &str) -> Result<bool> {
	let decoded = DecodedToken::parse(token)?;
	let key = PublicKeyMaterial::from_base64url(n, e)?;
	let valid = decoded.verify_with(&key);

	if !valid {
		obs::event!(debug, modulus_bits = key.modulus.bits(), "Token signature mismatch.");
	}

	Ok(valid)
}

fn key_material(reason: String) -> AuthError {
	AuthError::KeyMaterial { reason }
}


#[cfg(test)]
mod tests {
	// crates.io
	use base64::engine::general_purpose::URL_SAFE_NO_PAD;
	// self
	use super::{fixtures::*, *};

	fn segments() -> Vec<&'static str> {
		TOKEN.split('.').collect()
	}

	fn expect_key_material(result: Result<bool>) {
		match result {
			Err(Error::Auth(AuthError::KeyMaterial { .. })) => {},
			other => panic!("Expected a key-material failure, got {other:?}."),
		}
	}

	#[test]
	fn base64url_decoding_restores_padding() {
		assert_eq!(decode_base64url("AQAB", TokenField::Exponent).expect("AQAB should decode."), [
			1, 0, 1
		]);
		assert_eq!(decode_base64url("-_8", TokenField::Header).expect("Unpadded input."), [
			0xfb, 0xff
		]);
		assert_eq!(decode_base64url("-_8=", TokenField::Header).expect("Padded input."), [
			0xfb, 0xff
		]);
	}

	#[test]
	fn valid_token_verifies() {
		assert!(verify_rs256(TOKEN, N, E).expect("Fixture token should verify."));
	}

	#[test]
	fn legacy_1024_bit_key_verifies() {
		assert!(verify_rs256(LEGACY_TOKEN, LEGACY_N, E).expect("1024-bit keys should be usable."));
		assert!(!verify_rs256(TOKEN, LEGACY_N, E).expect("Foreign token should still decode."));
	}

	#[test]
	fn flipped_payload_character_fails_verification() {
		let parts = segments();
		let mut payload = parts[1].to_owned();
		let replacement = if payload.starts_with('e') { "f" } else { "e" };

		payload.replace_range(..1, replacement);

		let token = format!("{}.{payload}.{}", parts[0], parts[2]);

		assert!(!verify_rs256(&token, N, E).expect("Tampered payload should still decode."));
	}

	#[test]
	fn flipped_signature_bit_fails_verification() {
		let parts = segments();
		let mut sig = URL_SAFE_NO_PAD.decode(parts[2]).expect("Fixture signature should decode.");

		sig[17] ^= 0x01;

		let token = format!("{}.{}.{}", parts[0], parts[1], URL_SAFE_NO_PAD.encode(sig));

		assert!(!verify_rs256(&token, N, E).expect("Tampered signature should still decode."));
	}

	#[test]
	fn corrupted_alphabet_names_the_segment() {
		let parts = segments();

		for (index, field) in
			[(0, TokenField::Header), (1, TokenField::Payload), (2, TokenField::Signature)]
		{
			let mut corrupted = parts.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>();

			corrupted[index].insert(4, '!');

			match verify_rs256(&corrupted.join("."), N, E) {
				Err(Error::Decode(err)) => assert_eq!(err.token_field(), Some(field)),
				other => panic!("Expected a decode failure for {field}, got {other:?}."),
			}
		}
	}

	#[test]
	fn two_segment_token_is_a_format_error() {
		match verify_rs256("abc.def", N, E) {
			Err(Error::Format(err)) => assert_eq!(err, FormatError::TokenSegments { found: 2 }),
			other => panic!("Expected a format failure, got {other:?}."),
		}
	}

	#[test]
	fn malformed_key_components_are_decode_errors() {
		match verify_rs256(TOKEN, "%%%%", E) {
			Err(Error::Decode(err)) => assert_eq!(err.token_field(), Some(TokenField::Modulus)),
			other => panic!("Expected a modulus decode failure, got {other:?}."),
		}
	}

	#[test]
	fn oversized_exponents_are_rejected() {
		// Nine bytes do not fit the eight-byte buffer.
		expect_key_material(verify_rs256(TOKEN, N, "AQEBAQEBAQEB"));
		// Five bytes fit but exceed 32 bits.
		expect_key_material(verify_rs256(TOKEN, N, "AQAAAAE"));
	}

	#[test]
	fn short_modulus_is_rejected() {
		expect_key_material(verify_rs256(TOKEN, "AQAB", E));
		// Under 1024 bits: the legacy key with three leading bytes dropped.
		expect_key_material(verify_rs256(LEGACY_TOKEN, &LEGACY_N[4..], E));
	}

	#[test]
	fn exponent_is_zero_extended() {
		let key = PublicKeyMaterial::from_base64url(N, E).expect("Fixture key should decode.");

		assert_eq!(key.exponent(), 65_537);
		assert_eq!(key.modulus().bits(), 2048);
	}
}
