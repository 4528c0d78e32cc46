//! Lease: a single tunnel endpoint entry inside a lease set — the gateway
//! router's identity hash, the tunnel id at that gateway, and the tunnel's
//! expiry.

use crate::error::Result;
use crate::stream::Stream;

pub const GATEWAY_HASH_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
	pub gateway_hash: [u8; GATEWAY_HASH_LEN],
	pub tunnel_id: u32,
	pub end_date: u64,
}

impl Lease {
	pub fn new(gateway_hash: [u8; GATEWAY_HASH_LEN], tunnel_id: u32, end_date: u64) -> Lease {
		Lease {
			gateway_hash,
			tunnel_id,
			end_date,
		}
	}

	pub fn write_to_message(&self, stream: &mut Stream) {
		stream.write_bytes(&self.gateway_hash);
		stream.write_u32(self.tunnel_id);
		stream.write_u64(self.end_date);
	}

	pub fn read_from_message(stream: &mut Stream) -> Result<Lease> {
		let mut gateway_hash = [0u8; GATEWAY_HASH_LEN];
		stream.read_exact(&mut gateway_hash)?;
		let tunnel_id = stream.read_u32()?;
		let end_date = stream.read_u64()?;
		Ok(Lease {
			gateway_hash,
			tunnel_id,
			end_date,
		})
	}
}
