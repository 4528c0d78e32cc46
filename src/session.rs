//! Session: a created destination's view onto the client — sends payloads,
//! receives status/lookup/payload callbacks.

use std::sync::{Arc, Weak};

use log::debug;

use crate::destination::Destination;
use crate::error::Result;
use crate::session_config::SessionConfig;

/// Reply to a `HostLookup`/`DestLookup`. `None` means the router could not
/// resolve the address.
pub type LookupResult = Option<Destination>;

/// User-supplied callbacks invoked as the owning client dispatches inbound
/// messages for this session. Default implementations log and do nothing,
/// so a caller only overrides what it cares about.
pub trait SessionCallbacks: Send + Sync {
	fn on_status(&self, _status: SessionStatus) {}
	fn on_destination(&self, _request_id: u32, _address: &str, _dest: LookupResult) {}
	fn on_message(&self, _protocol: u8, _src_port: u16, _dst_port: u16, _payload: &[u8]) {}
	fn on_disconnect(&self, _reason: &str) {}
}

/// Status values carried by a `SessionStatus` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
	Created,
	Destroyed,
	Updated,
	Invalid,
	Unknown(u8),
}

impl SessionStatus {
	pub fn from_u8(v: u8) -> SessionStatus {
		match v {
			0 => SessionStatus::Destroyed,
			1 => SessionStatus::Created,
			2 => SessionStatus::Updated,
			3 => SessionStatus::Invalid,
			other => SessionStatus::Unknown(other),
		}
	}
}

pub(crate) trait OutboundSink: Send + Sync {
	fn enqueue_payload(
		&self,
		session_id: u16,
		dest: &Destination,
		protocol: u8,
		src_port: u16,
		dst_port: u16,
		payload: &[u8],
		nonce: u32,
	) -> Result<()>;
}

/// `id` is `None` until the router assigns one in `SessionStatus(Created)`.
pub struct Session {
	id: Option<u16>,
	config: SessionConfig,
	callbacks: Arc<dyn SessionCallbacks>,
	client: Weak<dyn OutboundSink>,
}

impl Session {
	pub(crate) fn new(
		config: SessionConfig,
		callbacks: Arc<dyn SessionCallbacks>,
		client: Weak<dyn OutboundSink>,
	) -> Session {
		Session {
			id: None,
			config,
			callbacks,
			client,
		}
	}

	pub fn id(&self) -> Option<u16> {
		self.id
	}

	pub(crate) fn set_id(&mut self, id: u16) {
		self.id = Some(id);
	}

	pub fn config(&self) -> &SessionConfig {
		&self.config
	}

	/// Enqueues a `SendMessage` for this session's destination.
	pub fn send_message(
		&self,
		protocol: u8,
		src_port: u16,
		dst_port: u16,
		payload: &[u8],
		nonce: u32,
	) -> Result<()> {
		let id = self.id.expect("send_message called before session was created");
		let client = self
			.client
			.upgrade()
			.ok_or_else(|| crate::error::I2cpError::Misuse("client has been dropped".into()))?;
		client.enqueue_payload(id, self.config.destination(), protocol, src_port, dst_port, payload, nonce)
	}

	pub(crate) fn dispatch_status(&self, status: SessionStatus) {
		debug!("session {:?}: status {:?}", self.id, status);
		self.callbacks.on_status(status);
	}

	pub(crate) fn dispatch_destination(&self, request_id: u32, address: &str, dest: LookupResult) {
		self.callbacks.on_destination(request_id, address, dest);
	}

	pub(crate) fn dispatch_message(&self, protocol: u8, src_port: u16, dst_port: u16, payload: &[u8]) {
		self.callbacks.on_message(protocol, src_port, dst_port, payload);
	}

	pub(crate) fn dispatch_disconnect(&self, reason: &str) {
		self.callbacks.on_disconnect(reason);
	}
}
