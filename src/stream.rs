//! Length-prefixed byte buffer with typed, big-endian read/write, used for
//! every I2CP frame body.
//!
//! A `Stream` is an in-memory, growable byte buffer with a read cursor.
//! Writes always succeed (the buffer grows); reads past the end of the
//! buffer return [`I2cpError::Protocol`].

use crate::error::I2cpError;

#[derive(Debug, Clone, Default)]
pub struct Stream {
	buf: Vec<u8>,
	pos: usize,
}

impl Stream {
	pub fn new() -> Stream {
		Stream {
			buf: Vec::new(),
			pos: 0,
		}
	}

	pub fn with_capacity(cap: usize) -> Stream {
		Stream {
			buf: Vec::with_capacity(cap),
			pos: 0,
		}
	}

	pub fn from_vec(buf: Vec<u8>) -> Stream {
		Stream { buf, pos: 0 }
	}

	pub fn bytes(&self) -> &[u8] {
		&self.buf
	}

	pub fn into_vec(self) -> Vec<u8> {
		self.buf
	}

	pub fn len(&self) -> usize {
		self.buf.len()
	}

	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	/// Remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.buf.len().saturating_sub(self.pos)
	}

	fn eof(what: &str) -> I2cpError {
		I2cpError::Protocol(format!("unexpected end of stream reading {what}"))
	}

	pub fn read_u8(&mut self) -> crate::error::Result<u8> {
		if self.remaining() < 1 {
			return Err(Self::eof("u8"));
		}
		let v = self.buf[self.pos];
		self.pos += 1;
		Ok(v)
	}

	pub fn read_u16(&mut self) -> crate::error::Result<u16> {
		if self.remaining() < 2 {
			return Err(Self::eof("u16"));
		}
		let v = u16::from_be_bytes([self.buf[self.pos], self.buf[self.pos + 1]]);
		self.pos += 2;
		Ok(v)
	}

	pub fn read_u32(&mut self) -> crate::error::Result<u32> {
		if self.remaining() < 4 {
			return Err(Self::eof("u32"));
		}
		let mut b = [0u8; 4];
		b.copy_from_slice(&self.buf[self.pos..self.pos + 4]);
		self.pos += 4;
		Ok(u32::from_be_bytes(b))
	}

	pub fn read_u64(&mut self) -> crate::error::Result<u64> {
		if self.remaining() < 8 {
			return Err(Self::eof("u64"));
		}
		let mut b = [0u8; 8];
		b.copy_from_slice(&self.buf[self.pos..self.pos + 8]);
		self.pos += 8;
		Ok(u64::from_be_bytes(b))
	}

	pub fn read_bytes(&mut self, n: usize) -> crate::error::Result<Vec<u8>> {
		if self.remaining() < n {
			return Err(Self::eof("byte run"));
		}
		let v = self.buf[self.pos..self.pos + n].to_vec();
		self.pos += n;
		Ok(v)
	}

	pub fn read_exact(&mut self, buf: &mut [u8]) -> crate::error::Result<()> {
		if self.remaining() < buf.len() {
			return Err(Self::eof("fixed-size array"));
		}
		buf.copy_from_slice(&self.buf[self.pos..self.pos + buf.len()]);
		self.pos += buf.len();
		Ok(())
	}

	/// Reads the rest of the stream.
	pub fn read_to_end(&mut self) -> Vec<u8> {
		let v = self.buf[self.pos..].to_vec();
		self.pos = self.buf.len();
		v
	}

	pub fn write_u8(&mut self, v: u8) {
		self.buf.push(v);
	}

	pub fn write_u16(&mut self, v: u16) {
		self.buf.extend_from_slice(&v.to_be_bytes());
	}

	pub fn write_u32(&mut self, v: u32) {
		self.buf.extend_from_slice(&v.to_be_bytes());
	}

	pub fn write_u64(&mut self, v: u64) {
		self.buf.extend_from_slice(&v.to_be_bytes());
	}

	pub fn write_bytes(&mut self, data: &[u8]) {
		self.buf.extend_from_slice(data);
	}

	/// Writes a mapping: a u16 total payload length followed by
	/// `key=value;` ASCII records concatenated in iteration order. No
	/// escaping is performed; values must not contain `;`.
	pub fn write_mapping(&mut self, entries: &[(&str, &str)]) {
		let mut payload = Vec::new();
		for (k, v) in entries {
			payload.extend_from_slice(k.as_bytes());
			payload.push(b'=');
			payload.extend_from_slice(v.as_bytes());
			payload.push(b';');
		}
		self.write_u16(payload.len() as u16);
		self.buf.extend_from_slice(&payload);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trip_integers() {
		let mut s = Stream::new();
		s.write_u8(0x12);
		s.write_u16(0x3456);
		s.write_u32(0x789a_bcde);
		s.write_u64(0x0102_0304_0506_0708);
		assert_eq!(s.read_u8().unwrap(), 0x12);
		assert_eq!(s.read_u16().unwrap(), 0x3456);
		assert_eq!(s.read_u32().unwrap(), 0x789a_bcde);
		assert_eq!(s.read_u64().unwrap(), 0x0102_0304_0506_0708);
	}

	#[test]
	fn big_endian_on_the_wire() {
		let mut s = Stream::new();
		s.write_u32(1);
		assert_eq!(s.bytes(), &[0, 0, 0, 1]);
	}

	#[test]
	fn read_past_end_is_protocol_error() {
		let mut s = Stream::new();
		s.write_u8(1);
		let _ = s.read_u8().unwrap();
		match s.read_u8() {
			Err(crate::error::I2cpError::Protocol(_)) => {}
			other => panic!("expected protocol error, got {other:?}"),
		}
	}

	#[test]
	fn mapping_encoding_matches_length_and_order() {
		let mut s = Stream::new();
		s.write_mapping(&[("a", "1"), ("b", "2")]);
		let len = s.read_u16().unwrap();
		let payload = s.read_bytes(len as usize).unwrap();
		assert_eq!(payload, b"a=1;b=2;");
		assert_eq!(len as usize, payload.len());
	}

	#[test]
	fn empty_mapping_has_zero_length() {
		let mut s = Stream::new();
		s.write_mapping(&[]);
		assert_eq!(s.read_u16().unwrap(), 0);
	}
}
