//! Certificate: a tagged, length-prefixed blob attached to every
//! destination. Only the `Null` type is meaningful to this library; the
//! others are carried opaquely so a destination from the network round-trips
//! even when signed with a scheme this crate does not understand.

use crate::error::{I2cpError, Result};
use crate::stream::Stream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertType {
	Null,
	HashCash,
	Signed,
	Multiple,
}

impl CertType {
	fn from_u8(v: u8) -> Result<CertType> {
		match v {
			0 => Ok(CertType::Null),
			1 => Ok(CertType::HashCash),
			2 => Ok(CertType::Signed),
			3 => Ok(CertType::Multiple),
			other => Err(I2cpError::Protocol(format!("unknown certificate type {other}"))),
		}
	}

	fn to_u8(self) -> u8 {
		match self {
			CertType::Null => 0,
			CertType::HashCash => 1,
			CertType::Signed => 2,
			CertType::Multiple => 3,
		}
	}
}

/// `Certificate::null()` is the only constructor this crate ever signs or
/// verifies; it has the wire invariant that its payload length is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
	cert_type: CertType,
	payload: Vec<u8>,
}

impl Certificate {
	pub fn null() -> Certificate {
		Certificate {
			cert_type: CertType::Null,
			payload: Vec::new(),
		}
	}

	pub fn new(cert_type: CertType, payload: Vec<u8>) -> Certificate {
		Certificate { cert_type, payload }
	}

	pub fn cert_type(&self) -> CertType {
		self.cert_type
	}

	pub fn payload(&self) -> &[u8] {
		&self.payload
	}

	/// Wire size: `1 (type) + 2 (length) + payload.len()`.
	pub fn len(&self) -> usize {
		3 + self.payload.len()
	}

	pub fn is_empty(&self) -> bool {
		false
	}

	pub fn write_to_message(&self, stream: &mut Stream) {
		stream.write_u8(self.cert_type.to_u8());
		stream.write_u16(self.payload.len() as u16);
		stream.write_bytes(&self.payload);
	}

	pub fn read_from_message(stream: &mut Stream) -> Result<Certificate> {
		let cert_type = CertType::from_u8(stream.read_u8()?)?;
		let len = stream.read_u16()? as usize;
		let payload = stream.read_bytes(len)?;
		if cert_type == CertType::Null && !payload.is_empty() {
			return Err(I2cpError::Protocol(
				"null certificate must carry a zero-length payload".into(),
			));
		}
		if cert_type != CertType::Null && payload.is_empty() {
			return Err(I2cpError::Protocol(
				"non-null certificate must carry a non-zero-length payload".into(),
			));
		}
		Ok(Certificate { cert_type, payload })
	}
}
