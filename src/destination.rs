//! Destination: the keypair + certificate triple that identifies an I2P
//! endpoint, with its two textual derivations (`.b32.i2p` and I2P-flavored
//! base64).

use crate::certificate::Certificate;
use crate::crypto::{self, Codec, HashAlgorithm, SignatureKeyPair};
use crate::error::{I2cpError, Result};
use crate::stream::Stream;

pub const PUB_KEY_LEN: usize = 256;
pub const SIGN_PUB_KEY_LEN: usize = 128;

/// A destination's canonical wire form is `pub_key(256) ‖ sign_pub_key_y(128)
/// ‖ Certificate`. `generate_b32`/`generate_b64` are computed on first call
/// and memoized: callers must treat both strings as immutable once derived.
#[derive(Debug, Clone)]
pub struct Destination {
	pub_key: [u8; PUB_KEY_LEN],
	sgk: SignatureKeyPair,
	cert: Certificate,
	b32: Option<String>,
	b64: Option<String>,
}

impl Destination {
	/// Generates a fresh destination. The 256-byte ElGamal public-key slot
	/// is left zero-initialized: this library never generates ElGamal keys,
	/// matching the router-observed wire layout (see DESIGN.md).
	pub fn new() -> Destination {
		Destination {
			pub_key: [0u8; PUB_KEY_LEN],
			sgk: SignatureKeyPair::generate(),
			cert: Certificate::null(),
			b32: None,
			b64: None,
		}
	}

	pub fn from_message(stream: &mut Stream) -> Result<Destination> {
		let mut pub_key = [0u8; PUB_KEY_LEN];
		stream.read_exact(&mut pub_key)?;
		let mut y_bytes = [0u8; SIGN_PUB_KEY_LEN];
		stream.read_exact(&mut y_bytes)?;
		let y = num_bigint::BigUint::from_bytes_be(&y_bytes);
		let cert = Certificate::read_from_message(stream)?;
		Ok(Destination {
			pub_key,
			sgk: SignatureKeyPair::from_public(y),
			cert,
			b32: None,
			b64: None,
		})
	}

	/// Reads the persisted "file layout": `Certificate ‖ SignatureKeyPair ‖
	/// u16 pub_key_len(==256) ‖ pub_key`.
	pub fn from_stream(stream: &mut Stream) -> Result<Destination> {
		let cert = Certificate::read_from_message(stream)?;
		let sgk = crypto::read_signature_keypair_from_stream(stream)?;
		let len = stream.read_u16()? as usize;
		if len != PUB_KEY_LEN {
			return Err(I2cpError::Protocol(format!(
				"expected a {PUB_KEY_LEN}-byte public key, found {len}"
			)));
		}
		let mut pub_key = [0u8; PUB_KEY_LEN];
		stream.read_exact(&mut pub_key)?;
		Ok(Destination {
			pub_key,
			sgk,
			cert,
			b32: None,
			b64: None,
		})
	}

	pub fn to_stream(&self, stream: &mut Stream) -> Result<()> {
		self.cert.write_to_message(stream);
		crypto::write_signature_to_stream(&self.sgk, stream)?;
		stream.write_u16(PUB_KEY_LEN as u16);
		stream.write_bytes(&self.pub_key);
		Ok(())
	}

	/// Substitutes `~→/`, `-→+`, base64-decodes, then parses as a message.
	pub fn from_base64(s: &str) -> Result<Destination> {
		let standard = s.replace('~', "/").replace('-', "+");
		let decoded = crypto::decode_stream(Codec::Base64, &Stream::from_vec(standard.into_bytes()))?;
		let mut stream = decoded;
		Destination::from_message(&mut stream)
	}

	pub fn write_to_message(&self, stream: &mut Stream) {
		stream.write_bytes(&self.pub_key);
		stream.write_bytes(&crypto_y_bytes(&self.sgk));
		self.cert.write_to_message(stream);
	}

	fn canonical_wire_form(&self) -> Stream {
		let mut s = Stream::new();
		self.write_to_message(&mut s);
		s
	}

	pub fn generate_b32(&mut self) -> Result<String> {
		if let Some(b32) = &self.b32 {
			return Ok(b32.clone());
		}
		let canonical = self.canonical_wire_form();
		let digest = crypto::hash_stream(HashAlgorithm::Sha256, &canonical)?;
		let encoded = crypto::encode_stream(Codec::Base32, &digest);
		let mut address = String::from_utf8(encoded.into_vec())
			.map_err(|e| I2cpError::Crypto(format!("base32 output was not utf-8: {e}")))?;
		address.push_str(".b32.i2p");
		self.b32 = Some(address.clone());
		Ok(address)
	}

	pub fn generate_b64(&mut self) -> Result<String> {
		if let Some(b64) = &self.b64 {
			return Ok(b64.clone());
		}
		let canonical = self.canonical_wire_form();
		let encoded = crypto::encode_stream(Codec::Base64, &canonical);
		let text = String::from_utf8(encoded.into_vec())
			.map_err(|e| I2cpError::Crypto(format!("base64 output was not utf-8: {e}")))?;
		let i2p = text.replace('/', "~").replace('+', "-");
		self.b64 = Some(i2p.clone());
		Ok(i2p)
	}

	/// Verifies the last 40 bytes of `stream` as a signature over the
	/// preceding bytes, using this destination's public signing key.
	pub fn verify(&self, stream: &Stream) -> Result<bool> {
		crypto::verify_stream(&self.sgk, stream)
	}

	pub fn sgk(&self) -> &SignatureKeyPair {
		&self.sgk
	}

	pub fn cert(&self) -> &Certificate {
		&self.cert
	}
}

impl Default for Destination {
	fn default() -> Destination {
		Destination::new()
	}
}

fn crypto_y_bytes(sgk: &SignatureKeyPair) -> Vec<u8> {
	let bytes = sgk.y().to_bytes_be();
	if bytes.len() == SIGN_PUB_KEY_LEN {
		bytes
	} else if bytes.len() > SIGN_PUB_KEY_LEN {
		bytes[bytes.len() - SIGN_PUB_KEY_LEN..].to_vec()
	} else {
		let mut out = vec![0u8; SIGN_PUB_KEY_LEN - bytes.len()];
		out.extend_from_slice(&bytes);
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn message_round_trips() {
		let dest = Destination::new();
		let mut s = Stream::new();
		dest.write_to_message(&mut s);
		assert_eq!(s.len(), PUB_KEY_LEN + SIGN_PUB_KEY_LEN + 3);
		let back = Destination::from_message(&mut s).unwrap();
		assert_eq!(back.pub_key, dest.pub_key);
		assert_eq!(back.sgk.y(), dest.sgk.y());
	}

	#[test]
	fn file_layout_round_trips() {
		let dest = Destination::new();
		let mut s = Stream::new();
		dest.to_stream(&mut s).unwrap();
		let back = Destination::from_stream(&mut s).unwrap();
		assert_eq!(back.pub_key, dest.pub_key);
		assert_eq!(back.sgk.x(), dest.sgk.x());
	}

	#[test]
	fn base64_round_trips_through_i2p_alphabet() {
		let mut dest = Destination::new();
		let b64 = dest.generate_b64().unwrap();
		let back = Destination::from_base64(&b64).unwrap();
		assert_eq!(back.pub_key, dest.pub_key);
		assert_eq!(back.sgk.y(), dest.sgk.y());
	}

	#[test]
	fn b32_address_is_deterministic_and_well_formed() {
		let mut dest = Destination::new();
		let first = dest.generate_b32().unwrap();
		let second = dest.generate_b32().unwrap();
		assert_eq!(first, second);
		assert!(first.ends_with(".b32.i2p"));
		assert_eq!(first.len(), 52 + ".b32.i2p".len());
	}

	#[test]
	fn signature_over_canonical_form_verifies() {
		let dest = Destination::new();
		let mut s = dest.canonical_wire_form();
		crypto::sign_stream(&dest.sgk, &mut s).unwrap();
		assert!(dest.verify(&s).unwrap());
	}
}
