//! SessionConfig: the option mapping bound to a [`Destination`], serialized
//! with a signed timestamp when a session is created.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::crypto;
use crate::destination::Destination;
use crate::error::Result;
use crate::stream::Stream;

/// The closed set of recognized session-config option names, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigOption {
	CryptoLowTagThreshold,
	CryptoTagsToSend,
	DontPublishLeaseSet,
	FastReceive,
	Gzip,
	MessageReliability,
	Password,
	Username,
	InboundAllowZeroHop,
	InboundBackupQuantity,
	InboundIpRestriction,
	InboundLength,
	InboundLengthVariance,
	InboundNickname,
	InboundQuantity,
	OutboundAllowZeroHop,
	OutboundBackupQuantity,
	OutboundIpRestriction,
	OutboundLength,
	OutboundLengthVariance,
	OutboundNickname,
	OutboundPriority,
	OutboundQuantity,
}

impl ConfigOption {
	pub fn wire_name(self) -> &'static str {
		use ConfigOption::*;
		match self {
			CryptoLowTagThreshold => "crypto.lowTagThreshold",
			CryptoTagsToSend => "crypto.tagsToSend",
			DontPublishLeaseSet => "i2cp.dontPublishLeaseSet",
			FastReceive => "i2cp.fastReceive",
			Gzip => "i2cp.gzip",
			MessageReliability => "i2cp.messageReliability",
			Password => "i2cp.password",
			Username => "i2cp.username",
			InboundAllowZeroHop => "inbound.allowZeroHop",
			InboundBackupQuantity => "inbound.backupQuantity",
			InboundIpRestriction => "inbound.IPRestriction",
			InboundLength => "inbound.length",
			InboundLengthVariance => "inbound.lengthVariance",
			InboundNickname => "inbound.nickname",
			InboundQuantity => "inbound.quantity",
			OutboundAllowZeroHop => "outbound.allowZeroHop",
			OutboundBackupQuantity => "outbound.backupQuantity",
			OutboundIpRestriction => "outbound.IPRestriction",
			OutboundLength => "outbound.length",
			OutboundLengthVariance => "outbound.lengthVariance",
			OutboundNickname => "outbound.nickname",
			OutboundPriority => "outbound.priority",
			OutboundQuantity => "outbound.quantity",
		}
	}

	pub const ALL: [ConfigOption; 23] = {
		use ConfigOption::*;
		[
			CryptoLowTagThreshold,
			CryptoTagsToSend,
			DontPublishLeaseSet,
			FastReceive,
			Gzip,
			MessageReliability,
			Password,
			Username,
			InboundAllowZeroHop,
			InboundBackupQuantity,
			InboundIpRestriction,
			InboundLength,
			InboundLengthVariance,
			InboundNickname,
			InboundQuantity,
			OutboundAllowZeroHop,
			OutboundBackupQuantity,
			OutboundIpRestriction,
			OutboundLength,
			OutboundLengthVariance,
			OutboundNickname,
			OutboundPriority,
			OutboundQuantity,
		]
	};
}

/// `(properties, destination, date)`. `write_to_message` signs the stream
/// with `destination`'s private key, so `SessionConfig` can only be
/// serialized by the party holding that key.
#[derive(Debug, Clone)]
pub struct SessionConfig {
	properties: BTreeMap<ConfigOption, String>,
	destination: Destination,
}

impl SessionConfig {
	pub fn new(destination: Destination) -> SessionConfig {
		SessionConfig {
			properties: BTreeMap::new(),
			destination,
		}
	}

	/// Stores `value` for `prop`. An empty string is equivalent to unset
	/// and is omitted from the wire mapping.
	pub fn set_property(&mut self, prop: ConfigOption, value: impl Into<String>) {
		let value = value.into();
		if value.is_empty() {
			self.properties.remove(&prop);
		} else {
			self.properties.insert(prop, value);
		}
	}

	pub fn property(&self, prop: ConfigOption) -> Option<&str> {
		self.properties.get(&prop).map(|s| s.as_str())
	}

	pub fn destination(&self) -> &Destination {
		&self.destination
	}

	pub fn destination_mut(&mut self) -> &mut Destination {
		&mut self.destination
	}

	/// `destination ‖ mapping ‖ u64 date_ms ‖ signature`.
	pub fn write_to_message(&self, stream: &mut Stream) -> Result<()> {
		self.destination.write_to_message(stream);
		let entries: Vec<(&str, &str)> = ConfigOption::ALL
			.iter()
			.filter_map(|opt| self.properties.get(opt).map(|v| (opt.wire_name(), v.as_str())))
			.collect();
		stream.write_mapping(&entries);
		let date_ms = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.unwrap_or_default()
			.as_millis() as u64;
		stream.write_u64(date_ms);
		crypto::sign_stream(self.destination.sgk(), stream)?;
		Ok(())
	}
}
