//! DSA-SHA1 keygen/sign/verify, SHA-1/SHA-256 hashing, and the base32/base64
//! codecs used to derive a [`crate::destination::Destination`]'s textual
//! forms.
//!
//! DSA parameters are the well-known I2P group (L=1024, N=160), shared by
//! every key this process generates or loads: they are fixed network
//! constants rather than generated per-process, so there is nothing to
//! cache beyond the parsed [`BigUint`]s themselves, which `lazy_static`
//! memoizes for us.

use data_encoding::{Encoding, Specification};
use lazy_static::lazy_static;
use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::{I2cpError, Result};
use crate::stream::Stream;

/// Supported signature algorithms. The library only implements DSA-SHA1.
pub const DSA_SHA1: u32 = 0;

/// Supported hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
	Sha1,
	Sha256,
}

/// Supported textual codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
	Base32,
	Base64,
}

lazy_static! {
	pub static ref BASE32_I2P: Encoding = {
		let mut spec = Specification::new();
		spec.symbols.push_str("abcdefghijklmnopqrstuvwxyz234567");
		spec.padding = None;
		spec.encoding().unwrap()
	};
}

lazy_static! {
	/// Standard RFC 4648 base64, *not* the I2P `-`/`~` variant: that
	/// substitution is applied only by `Destination::generate_b64` /
	/// `Destination::from_base64`.
	pub static ref BASE64_STD: Encoding = data_encoding::BASE64;
}

// The well-known I2P DSA group (see common structures spec), L=1024, N=160.
const DSA_P_HEX: &str = "9C05B2AA960D9B97B8931963C9CC9E8C3026E9B8ED92FAD0A69CC886D5BF8015FCADAE31A0AD18FAB3F01B00A358DE237655C4964AFAA2B337E96AD316B9FB1CC564B5AEC5B69A9FF6C3E4548707FEF8503D91DD8602E867E6D35D2235C1869CE2479C3B9D5401DE04E0727FB33D6511285D4CF29538D9E3B6051F5B22CC1C93";
const DSA_Q_HEX: &str = "A5DFC28FEF4CA1E286744CD8EED9D29D684046B7";
const DSA_G_HEX: &str = "0C1F4D27D40093B429E962D7223824E0BBC47E7C832A39236FC683AF84889581075FF9082ED32353AA7F4D17602D2DC11F2C5BF3A4E5F60478F14D89CC34201E8D12AC1E53AE3E19AD7B2F9A2392E173F";

lazy_static! {
	pub static ref DSA_P: BigUint = BigUint::parse_bytes(DSA_P_HEX.as_bytes(), 16).unwrap();
	pub static ref DSA_Q: BigUint = BigUint::parse_bytes(DSA_Q_HEX.as_bytes(), 16).unwrap();
	pub static ref DSA_G: BigUint = BigUint::parse_bytes(DSA_G_HEX.as_bytes(), 16).unwrap();
}

/// Private exponent size in bytes (N=160 bits).
const X_LEN: usize = 20;
/// Public value size in bytes (L=1024 bits).
const Y_LEN: usize = 128;
/// `r`/`s` component size in the 40-byte appended signature.
const SIG_COMPONENT_LEN: usize = 20;

/// A DSA-SHA1 keypair, or the public half of one read off the wire.
#[derive(Debug, Clone)]
pub struct SignatureKeyPair {
	pub algorithm_type: u32,
	x: Option<BigUint>,
	y: BigUint,
}

impl SignatureKeyPair {
	/// Generates a fresh DSA-SHA1 keypair over the shared I2P parameters.
	pub fn generate() -> SignatureKeyPair {
		let mut rng = rand::thread_rng();
		let x = loop {
			let candidate = rng.gen_biguint_below(&DSA_Q);
			if !candidate.is_zero() {
				break candidate;
			}
		};
		let y = DSA_G.modpow(&x, &DSA_P);
		SignatureKeyPair {
			algorithm_type: DSA_SHA1,
			x: Some(x),
			y,
		}
	}

	/// Builds a public-only keypair from a `y` value read off the wire.
	pub fn from_public(y: BigUint) -> SignatureKeyPair {
		SignatureKeyPair {
			algorithm_type: DSA_SHA1,
			x: None,
			y,
		}
	}

	pub fn y(&self) -> &BigUint {
		&self.y
	}

	pub fn x(&self) -> Option<&BigUint> {
		self.x.as_ref()
	}
}

fn biguint_to_fixed_be(n: &BigUint, len: usize) -> Vec<u8> {
	let bytes = n.to_bytes_be();
	match bytes.len().cmp(&len) {
		std::cmp::Ordering::Equal => bytes,
		std::cmp::Ordering::Greater => bytes[bytes.len() - len..].to_vec(),
		std::cmp::Ordering::Less => {
			let mut out = vec![0u8; len - bytes.len()];
			out.extend_from_slice(&bytes);
			out
		}
	}
}

fn mod_inverse(a: &BigUint, modulus: &BigUint) -> Result<BigUint> {
	let a_int = BigInt::from(a.clone());
	let m_int = BigInt::from(modulus.clone());
	let egcd = a_int.extended_gcd(&m_int);
	if !egcd.gcd.is_one() {
		return Err(I2cpError::Crypto("no modular inverse exists".into()));
	}
	let mut x = egcd.x % &m_int;
	if x.sign() == num_bigint::Sign::Minus {
		x += &m_int;
	}
	Ok(x.to_biguint().expect("reduced mod a positive modulus"))
}

fn sha1_digest(data: &[u8]) -> BigUint {
	let mut hasher = Sha1::new();
	hasher.update(data);
	BigUint::from_bytes_be(&hasher.finalize())
}

/// Signs `stream`'s current contents with `SHA1(stream.bytes())` and
/// appends the 40-byte `r‖s` signature, each component left-zero-padded to
/// 20 bytes.
pub fn sign_stream(sgk: &SignatureKeyPair, stream: &mut Stream) -> Result<()> {
	let x = sgk
		.x
		.as_ref()
		.ok_or_else(|| I2cpError::Crypto("signing requires a private key".into()))?;
	let digest = sha1_digest(stream.bytes());
	let mut rng = rand::thread_rng();
	let (r, s) = loop {
		let k = loop {
			let candidate = rng.gen_biguint_below(&DSA_Q);
			if !candidate.is_zero() {
				break candidate;
			}
		};
		let r = DSA_G.modpow(&k, &DSA_P) % &*DSA_Q;
		if r.is_zero() {
			continue;
		}
		let k_inv = mod_inverse(&k, &DSA_Q)?;
		let s = (k_inv * (&digest + x * &r)) % &*DSA_Q;
		if s.is_zero() {
			continue;
		}
		break (r, s);
	};
	stream.write_bytes(&biguint_to_fixed_be(&r, SIG_COMPONENT_LEN));
	stream.write_bytes(&biguint_to_fixed_be(&s, SIG_COMPONENT_LEN));
	Ok(())
}

/// Splits the last 40 bytes of `stream` as `r‖s` and verifies them against
/// the preceding bytes.
pub fn verify_stream(sgk: &SignatureKeyPair, stream: &Stream) -> Result<bool> {
	let bytes = stream.bytes();
	if bytes.len() < 2 * SIG_COMPONENT_LEN {
		return Err(I2cpError::Protocol(
			"stream too short to contain a signature".into(),
		));
	}
	let split = bytes.len() - 2 * SIG_COMPONENT_LEN;
	let message = &bytes[..split];
	let r = BigUint::from_bytes_be(&bytes[split..split + SIG_COMPONENT_LEN]);
	let s = BigUint::from_bytes_be(&bytes[split + SIG_COMPONENT_LEN..]);
	if r.is_zero() || s.is_zero() || r >= *DSA_Q || s >= *DSA_Q {
		return Ok(false);
	}
	let digest = sha1_digest(message);
	let w = mod_inverse(&s, &DSA_Q)?;
	let u1 = (&digest * &w) % &*DSA_Q;
	let u2 = (&r * &w) % &*DSA_Q;
	let v = (DSA_G.modpow(&u1, &DSA_P) * sgk.y.modpow(&u2, &DSA_P)) % &*DSA_P % &*DSA_Q;
	Ok(v == r)
}

/// Appends `y` (128 bytes) to the stream. Fails if the algorithm isn't
/// DSA-SHA1.
pub fn write_public_signature_to_stream(sgk: &SignatureKeyPair, stream: &mut Stream) -> Result<()> {
	if sgk.algorithm_type != DSA_SHA1 {
		return Err(I2cpError::Protocol("unsupported signature algorithm".into()));
	}
	stream.write_bytes(&biguint_to_fixed_be(&sgk.y, Y_LEN));
	Ok(())
}

/// Emits `u32 algorithm_type ‖ x(20) ‖ y(128)`. Fails without a private key.
pub fn write_signature_to_stream(sgk: &SignatureKeyPair, stream: &mut Stream) -> Result<()> {
	if sgk.algorithm_type != DSA_SHA1 {
		return Err(I2cpError::Protocol("unsupported signature algorithm".into()));
	}
	let x = sgk
		.x
		.as_ref()
		.ok_or_else(|| I2cpError::Crypto("no private key to export".into()))?;
	stream.write_u32(sgk.algorithm_type);
	stream.write_bytes(&biguint_to_fixed_be(x, X_LEN));
	stream.write_bytes(&biguint_to_fixed_be(&sgk.y, Y_LEN));
	Ok(())
}

/// Inverse of [`write_signature_to_stream`]. Fails on an unknown algorithm.
pub fn read_signature_keypair_from_stream(stream: &mut Stream) -> Result<SignatureKeyPair> {
	let algorithm_type = stream.read_u32()?;
	if algorithm_type != DSA_SHA1 {
		return Err(I2cpError::Protocol(format!(
			"unsupported signature algorithm {algorithm_type}"
		)));
	}
	let x = BigUint::from_bytes_be(&stream.read_bytes(X_LEN)?);
	let y = BigUint::from_bytes_be(&stream.read_bytes(Y_LEN)?);
	Ok(SignatureKeyPair {
		algorithm_type,
		x: Some(x),
		y,
	})
}

/// Returns a new [`Stream`] containing `SHA256(src.bytes())`. This is the
/// only hash algorithm exposed to callers; SHA-1 is used internally by
/// [`sign_stream`]/[`verify_stream`].
pub fn hash_stream(alg: HashAlgorithm, src: &Stream) -> Result<Stream> {
	match alg {
		HashAlgorithm::Sha256 => {
			let mut hasher = Sha256::new();
			hasher.update(src.bytes());
			Ok(Stream::from_vec(hasher.finalize().to_vec()))
		}
		HashAlgorithm::Sha1 => Err(I2cpError::Misuse(
			"SHA-1 is not exposed to callers, only used internally for signing".into(),
		)),
	}
}

/// Base32/base64 encodes `src.bytes()`. Base32 output is lowercase without
/// padding; base64 is standard RFC 4648 (the I2P `-`/`~` alphabet is applied
/// only at the `Destination` layer).
pub fn encode_stream(codec: Codec, src: &Stream) -> Stream {
	let encoded = match codec {
		Codec::Base32 => BASE32_I2P.encode(src.bytes()).to_lowercase(),
		Codec::Base64 => BASE64_STD.encode(src.bytes()),
	};
	Stream::from_vec(encoded.into_bytes())
}

pub fn decode_stream(codec: Codec, src: &Stream) -> Result<Stream> {
	let decoded = match codec {
		Codec::Base32 => BASE32_I2P
			.decode(src.bytes())
			.map_err(|e| I2cpError::Protocol(format!("bad base32: {e}")))?,
		Codec::Base64 => BASE64_STD
			.decode(src.bytes())
			.map_err(|e| I2cpError::Protocol(format!("bad base64: {e}")))?,
	};
	Ok(Stream::from_vec(decoded))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sign_then_verify_succeeds() {
		let sgk = SignatureKeyPair::generate();
		let mut s = Stream::new();
		s.write_bytes(b"hello world");
		sign_stream(&sgk, &mut s).unwrap();
		assert_eq!(s.len(), "hello world".len() + 40);
		assert!(verify_stream(&sgk, &s).unwrap());
	}

	#[test]
	fn flipping_a_bit_breaks_verification() {
		let sgk = SignatureKeyPair::generate();
		let mut s = Stream::new();
		s.write_bytes(b"hello world");
		sign_stream(&sgk, &mut s).unwrap();
		let mut bytes = s.bytes().to_vec();
		bytes[0] ^= 0x01;
		let tampered = Stream::from_vec(bytes);
		assert!(!verify_stream(&sgk, &tampered).unwrap());
	}

	#[test]
	fn signature_keypair_round_trips_through_stream() {
		let sgk = SignatureKeyPair::generate();
		let mut s = Stream::new();
		write_signature_to_stream(&sgk, &mut s).unwrap();
		let back = read_signature_keypair_from_stream(&mut s).unwrap();
		assert_eq!(back.y(), sgk.y());
		assert_eq!(back.x(), sgk.x());
	}

	#[test]
	fn base32_is_lowercase_without_padding() {
		let src = Stream::from_vec(vec![0u8; 32]);
		let enc = encode_stream(Codec::Base32, &src);
		let text = String::from_utf8(enc.into_vec()).unwrap();
		assert!(text.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
		assert!(!text.contains('='));
	}

	#[test]
	fn base32_round_trips_through_encode_and_decode() {
		let src = Stream::from_vec(b"i2cp destination hash".to_vec());
		let enc = encode_stream(Codec::Base32, &src);
		let dec = decode_stream(Codec::Base32, &enc).unwrap();
		assert_eq!(dec.bytes(), src.bytes());
	}
}
