//! Client: the protocol driver. Owns the transport and the shared state
//! (output queue, session registry, pending lookups); dials the router,
//! runs the handshake, and dispatches every inbound message type.

use std::collections::{HashMap, VecDeque};
use std::io::{Read, Write as _};
use std::sync::{Arc, Mutex, Weak};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, error, info, warn};

use crate::crypto;
use crate::destination::Destination;
use crate::error::{I2cpError, Result};
use crate::lease::Lease;
use crate::session::{LookupResult, OutboundSink, Session, SessionCallbacks, SessionStatus};
use crate::session_config::{ConfigOption, SessionConfig};
use crate::stream::Stream;
use crate::transport::{TcpTransport, Transport, PROP_ADDRESS, PROP_PORT, PROP_TLS_CLIENT_CERT, PROP_USE_TLS};
use crate::version::{RouterInfo, Version};

pub const PROTOCOL_INIT: u8 = 0x2A;
pub const CLIENT_VERSION: &str = "0.9.11";
pub const MAX_SESSIONS_PER_CLIENT: usize = 32;
pub const LOOKUP_TIMEOUT_MS: u32 = 30_000;

pub const PROTOCOL_STREAMING: u8 = 6;
pub const PROTOCOL_DATAGRAM: u8 = 17;
pub const PROTOCOL_RAW_DATAGRAM: u8 = 18;

/// Wire message-type codes, exposed for tests and callers that want to
/// drive a fake router.
pub mod msg {
	pub const CREATE_SESSION: u8 = 1;
	pub const DESTROY_SESSION: u8 = 3;
	pub const CREATE_LEASE_SET: u8 = 4;
	pub const SEND_MESSAGE: u8 = 5;
	pub const GET_BANDWIDTH_LIMITS: u8 = 8;
	pub const SESSION_STATUS: u8 = 20;
	pub const MESSAGE_STATUS: u8 = 22;
	pub const BANDWIDTH_LIMITS: u8 = 23;
	pub const DISCONNECT: u8 = 30;
	pub const PAYLOAD_MESSAGE: u8 = 31;
	pub const GET_DATE: u8 = 32;
	pub const SET_DATE: u8 = 33;
	pub const DEST_LOOKUP: u8 = 34;
	pub const DEST_REPLY: u8 = 35;
	pub const REQUEST_VARIABLE_LEASESET: u8 = 37;
	pub const HOST_LOOKUP: u8 = 38;
	pub const HOST_REPLY: u8 = 39;
}

const HOST_LOOKUP_TYPE_HASH: u8 = 0;
const HOST_LOOKUP_TYPE_HOST: u8 = 1;

struct LookupEntry {
	session_id: u16,
	address: String,
}

struct ClientState {
	output_queue: VecDeque<Stream>,
	sessions: HashMap<u16, Session>,
	lookup_req: HashMap<u32, LookupEntry>,
	/// Legacy `DestLookup` correlation: hex(hash) -> (request_id, session_id,
	/// address), recovered when a failure reply arrives bearing only the
	/// looked-up hash.
	lookup_by_b32: HashMap<String, (u32, u16, String)>,
	lookup_request_id: u32,
	current_session: Option<Session>,
	last_created_session: Option<u16>,
	router: RouterInfo,
	connected: bool,
}

impl ClientState {
	fn new() -> ClientState {
		ClientState {
			output_queue: VecDeque::new(),
			sessions: HashMap::new(),
			lookup_req: HashMap::new(),
			lookup_by_b32: HashMap::new(),
			lookup_request_id: 0,
			current_session: None,
			last_created_session: None,
			router: RouterInfo::default(),
			connected: false,
		}
	}
}

/// `Client<T>` is shared across threads behind an `Arc`. One thread ("the
/// I/O thread") drives `connect`/`process_io`/`create_session`; any thread
/// may call `send_payload`/`destination_lookup`/the `Session` handle's
/// `send_message`, which only touch the state lock.
pub struct Client<T: Transport> {
	transport: Mutex<T>,
	state: Mutex<ClientState>,
	username: Option<String>,
	password: Option<String>,
}

impl<T: Transport> Client<T> {
	pub fn new(transport: T) -> Arc<Client<T>> {
		Arc::new(Client {
			transport: Mutex::new(transport),
			state: Mutex::new(ClientState::new()),
			username: None,
			password: None,
		})
	}

	pub fn with_credentials(transport: T, username: String, password: String) -> Arc<Client<T>> {
		Arc::new(Client {
			transport: Mutex::new(transport),
			state: Mutex::new(ClientState::new()),
			username: Some(username),
			password: Some(password),
		})
	}

	pub fn is_connected(&self) -> bool {
		self.state.lock().unwrap().connected
	}

	pub fn router_info(&self) -> RouterInfo {
		self.state.lock().unwrap().router.clone()
	}

	/// Dials the transport, sends the protocol-init byte, and exchanges
	/// `GetDate`/`SetDate`.
	pub fn connect(&self) -> Result<()> {
		self.transport.lock().unwrap().connect()?;
		{
			let mut transport = self.transport.lock().unwrap();
			transport.send(&[PROTOCOL_INIT])?;
		}
		self.send_get_date(false)?;
		let (msg_type, body) = self.recv_frame(Some(msg::SET_DATE))?;
		self.dispatch(msg_type, body)?;
		self.state.lock().unwrap().connected = true;
		Ok(())
	}

	pub fn disconnect(&self) {
		self.transport.lock().unwrap().disconnect();
		let mut state = self.state.lock().unwrap();
		state.connected = false;
		state.lookup_req.clear();
		state.lookup_by_b32.clear();
	}

	fn send_get_date(&self, queue: bool) -> Result<()> {
		debug!("sending GetDate");
		let mut body = Stream::new();
		body.write_bytes(CLIENT_VERSION.as_bytes());
		if let Some(username) = &self.username {
			let password = self.password.as_deref().unwrap_or("");
			let mut auth = Stream::new();
			auth.write_mapping(&[("i2cp.password", password), ("i2cp.username", username)]);
			// write_mapping already prefixes its own u16 length; GetDate's
			// auth block needs that exact shape, so splice it in directly.
			body.write_bytes(auth.bytes());
		}
		self.send_frame(msg::GET_DATE, body, queue)
	}

	fn send_frame(&self, typ: u8, body: Stream, queue: bool) -> Result<()> {
		let mut frame = Stream::with_capacity(body.len() + 5);
		frame.write_u32((body.len() + 1) as u32);
		frame.write_u8(typ);
		frame.write_bytes(body.bytes());
		if queue {
			debug!("queuing {} byte message, type {typ}", frame.len());
			self.state.lock().unwrap().output_queue.push_back(frame);
			Ok(())
		} else {
			self.write_frame_now(&frame).1
		}
	}

	/// Writes `frame` to the transport, retrying on partial writes. Returns
	/// the number of bytes actually written alongside the result: a frame
	/// that fails partway through must never be requeued whole, since the
	/// already-sent prefix is already on the wire and resending it would
	/// corrupt the stream.
	fn write_frame_now(&self, frame: &Stream) -> (usize, Result<()>) {
		let mut transport = self.transport.lock().unwrap();
		let mut sent = 0;
		let bytes = frame.bytes();
		while sent < bytes.len() {
			match transport.send(&bytes[sent..]) {
				Ok(0) => {
					return (
						sent,
						Err(I2cpError::Transport("transport closed mid-write".into())),
					)
				}
				Ok(n) => sent += n,
				Err(e) => return (sent, Err(e)),
			}
		}
		(sent, Ok(()))
	}

	/// Reads one frame: `u32 length ‖ u8 type ‖ body[length-1]`.
	fn recv_frame(&self, expected_type: Option<u8>) -> Result<(u8, Stream)> {
		let mut transport = self.transport.lock().unwrap();
		let mut header = [0u8; 5];
		read_exact_from_transport(&mut *transport, &mut header)?;
		let mut header_stream = Stream::from_vec(header.to_vec());
		let length = header_stream.read_u32()?;
		let msg_type = header_stream.read_u8()?;
		if length > 0xFFFF {
			return Err(I2cpError::Protocol(
				"message length exceeds 0xFFFF; router may be TLS-only".into(),
			));
		}
		if let Some(expected) = expected_type {
			if msg_type != expected {
				error!("expected message type {expected}, received {msg_type}");
			}
		}
		let mut body = vec![0u8; length as usize - 1];
		read_exact_from_transport(&mut *transport, &mut body)?;
		Ok((msg_type, Stream::from_vec(body)))
	}

	/// Drains the queued output under the state lock, then writes it to the
	/// transport outside the lock; then dispatches every message the
	/// transport has ready.
	pub fn process_io(self: &Arc<Self>) -> Result<()> {
		let pending: Vec<Stream> = {
			let mut state = self.state.lock().unwrap();
			state.output_queue.drain(..).collect()
		};
		let mut requeue_from = None;
		for (i, frame) in pending.iter().enumerate() {
			let (sent, result) = self.write_frame_now(frame);
			if result.is_err() {
				let remainder = if sent < frame.len() {
					Stream::from_vec(frame.bytes()[sent..].to_vec())
				} else {
					frame.clone()
				};
				requeue_from = Some((i, remainder));
				break;
			}
		}
		if let Some((i, remainder)) = requeue_from {
			let mut state = self.state.lock().unwrap();
			for frame in pending.into_iter().skip(i + 1).rev() {
				state.output_queue.push_front(frame);
			}
			state.output_queue.push_front(remainder);
		}
		loop {
			let can_read = self.transport.lock().unwrap().can_read()?;
			if !can_read {
				break;
			}
			let (msg_type, body) = self.recv_frame(None)?;
			self.dispatch(msg_type, body)?;
		}
		Ok(())
	}

	fn dispatch(self: &Arc<Self>, msg_type: u8, mut body: Stream) -> Result<()> {
		match msg_type {
			msg::SET_DATE => self.on_set_date(&mut body),
			msg::DISCONNECT => self.on_disconnect(&mut body),
			msg::PAYLOAD_MESSAGE => self.on_payload(&mut body),
			msg::MESSAGE_STATUS => self.on_message_status(&mut body),
			msg::DEST_REPLY => self.on_dest_reply(&mut body),
			msg::BANDWIDTH_LIMITS => {
				debug!("received BandwidthLimits ({} bytes)", body.remaining());
				Ok(())
			}
			msg::SESSION_STATUS => self.on_session_status(&mut body),
			msg::REQUEST_VARIABLE_LEASESET => self.on_request_variable_lease_set(&mut body),
			msg::HOST_REPLY => self.on_host_reply(&mut body),
			other => {
				info!("received unhandled I2CP message type {other}");
				Ok(())
			}
		}
	}

	fn on_set_date(&self, body: &mut Stream) -> Result<()> {
		let date = body.read_u64()?;
		let version_bytes = body.read_to_end();
		let version_str = String::from_utf8_lossy(&version_bytes);
		let version: Version = version_str.parse().unwrap_or_default();
		debug!("router date {date}, version {version}");
		let mut state = self.state.lock().unwrap();
		state.router.date = date;
		state.router.set_version(version);
		Ok(())
	}

	fn on_disconnect(&self, body: &mut Stream) -> Result<()> {
		let len = body.read_u8()? as usize;
		let reason = String::from_utf8_lossy(&body.read_bytes(len)?).into_owned();
		warn!("router disconnected: {reason}");
		let sessions: Vec<Session> = {
			let mut state = self.state.lock().unwrap();
			state.connected = false;
			state.sessions.drain().map(|(_, s)| s).collect()
		};
		for session in &sessions {
			session.dispatch_disconnect(&reason);
		}
		Ok(())
	}

	fn on_payload(&self, body: &mut Stream) -> Result<()> {
		let session_id = body.read_u16()?;
		let _message_id = body.read_u32()?;
		let payload_len = body.read_u32()? as usize;
		let raw = body.read_bytes(payload_len)?;
		if raw.len() < 10 || &raw[0..3] != [0x1F, 0x8B, 0x08] {
			warn!("payload for session {session_id} did not start with a gzip magic, dropping");
			return Ok(());
		}
		let src_port = u16::from_le_bytes([raw[4], raw[5]]);
		let dst_port = u16::from_le_bytes([raw[6], raw[7]]);
		let protocol = raw[9];
		let mut decoder = GzDecoder::new(raw.as_slice());
		let mut payload = Vec::new();
		decoder
			.read_to_end(&mut payload)
			.map_err(|e| I2cpError::Protocol(format!("bad gzip payload: {e}")))?;
		let state = self.state.lock().unwrap();
		match state.sessions.get(&session_id) {
			Some(session) => {
				session.dispatch_message(protocol, src_port, dst_port, &payload);
				Ok(())
			}
			None => Err(I2cpError::Protocol(format!(
				"payload message for unknown session {session_id}"
			))),
		}
	}

	fn on_message_status(&self, body: &mut Stream) -> Result<()> {
		let session_id = body.read_u16()?;
		let message_id = body.read_u32()?;
		let status = body.read_u8()?;
		let size = body.read_u32()?;
		let nonce = body.read_u32()?;
		debug!(
			"MessageStatus session={session_id} message={message_id} status={status} size={size} nonce={nonce}"
		);
		Ok(())
	}

	fn on_dest_reply(&self, body: &mut Stream) -> Result<()> {
		if body.remaining() == 32 {
			let hash = body.read_bytes(32)?;
			let key = hex_encode(&hash);
			let mut state = self.state.lock().unwrap();
			if let Some((request_id, session_id, address)) = state.lookup_by_b32.remove(&key) {
				state.lookup_req.remove(&request_id);
				drop(state);
				warn!("legacy destination lookup failed for {address}");
				self.dispatch_orphan_destination(session_id, request_id, &address, None);
			}
			return Ok(());
		}
		let dest = Destination::from_message(body)?;
		let mut canonical = Stream::new();
		dest.write_to_message(&mut canonical);
		let digest = crypto::hash_stream(crate::crypto::HashAlgorithm::Sha256, &canonical)?;
		let key = hex_encode(digest.bytes());
		let mut state = self.state.lock().unwrap();
		if let Some((request_id, session_id, address)) = state.lookup_by_b32.remove(&key) {
			state.lookup_req.remove(&request_id);
			drop(state);
			self.dispatch_orphan_destination(session_id, request_id, &address, Some(dest));
		}
		Ok(())
	}

	/// Legacy-path lookup replies are not addressed to a session in the wire
	/// message itself; route by the `session_id` recorded when the lookup
	/// was issued, or drop silently if that session has since disconnected.
	fn dispatch_orphan_destination(
		&self,
		session_id: u16,
		request_id: u32,
		address: &str,
		dest: LookupResult,
	) {
		let state = self.state.lock().unwrap();
		if let Some(session) = state.sessions.get(&session_id) {
			session.dispatch_destination(request_id, address, dest);
		}
	}

	fn on_session_status(&self, body: &mut Stream) -> Result<()> {
		let session_id = body.read_u16()?;
		let status = SessionStatus::from_u8(body.read_u8()?);
		let mut state = self.state.lock().unwrap();
		match status {
			SessionStatus::Created => {
				if let Some(mut session) = state.current_session.take() {
					session.set_id(session_id);
					session.dispatch_status(status);
					state.sessions.insert(session_id, session);
					state.last_created_session = Some(session_id);
				} else {
					warn!("SessionStatus(Created) for {session_id} with no pending session");
				}
			}
			SessionStatus::Destroyed => {
				if let Some(session) = state.sessions.remove(&session_id) {
					session.dispatch_status(status);
				}
			}
			_ => {
				if let Some(session) = state.sessions.get(&session_id) {
					session.dispatch_status(status);
				}
			}
		}
		Ok(())
	}

	fn on_request_variable_lease_set(self: &Arc<Self>, body: &mut Stream) -> Result<()> {
		let session_id = body.read_u16()?;
		let tunnels = body.read_u8()?;
		let mut leases = Vec::with_capacity(tunnels as usize);
		for _ in 0..tunnels {
			leases.push(Lease::read_from_message(body)?);
		}
		self.create_lease_set(session_id, &leases)
	}

	fn on_host_reply(&self, body: &mut Stream) -> Result<()> {
		let session_id = body.read_u16()?;
		let request_id = body.read_u32()?;
		let result = body.read_u8()?;
		let dest = if result == 0 {
			Some(Destination::from_message(body)?)
		} else {
			None
		};
		let mut state = self.state.lock().unwrap();
		let address = state
			.lookup_req
			.remove(&request_id)
			.map(|e| e.address)
			.unwrap_or_default();
		if let Some(session) = state.sessions.get(&session_id) {
			session.dispatch_destination(request_id, &address, dest);
		}
		Ok(())
	}

	/// Registers a new session. Forces `i2cp.fastReceive`/
	/// `i2cp.messageReliability` as the router expects of this client.
	pub fn create_session(
		self: &Arc<Self>,
		mut config: SessionConfig,
		callbacks: Arc<dyn SessionCallbacks>,
	) -> Result<u16> {
		{
			let state = self.state.lock().unwrap();
			if state.sessions.len() >= MAX_SESSIONS_PER_CLIENT {
				return Err(I2cpError::LimitExceeded);
			}
		}
		config.set_property(ConfigOption::FastReceive, "true");
		config.set_property(ConfigOption::MessageReliability, "none");
		let sink: Weak<dyn OutboundSink> = Arc::downgrade(self);
		let session = Session::new(config, callbacks, sink);
		let mut body = Stream::new();
		session.config().write_to_message(&mut body)?;
		{
			let mut state = self.state.lock().unwrap();
			state.current_session = Some(session);
			state.last_created_session = None;
		}
		self.send_frame(msg::CREATE_SESSION, body, false)?;
		let (msg_type, reply) = self.recv_frame(Some(msg::SESSION_STATUS))?;
		self.dispatch(msg_type, reply)?;
		let mut state = self.state.lock().unwrap();
		state
			.last_created_session
			.take()
			.ok_or_else(|| I2cpError::Protocol("CreateSession did not receive SessionStatus(Created)".into()))
	}

	/// Sends an application payload on behalf of `session_id`, the public
	/// entry point mirroring `Session::send_message` without requiring the
	/// caller to hold a borrow into the client's session registry.
	pub fn send_message(
		&self,
		session_id: u16,
		protocol: u8,
		src_port: u16,
		dst_port: u16,
		payload: &[u8],
		nonce: u32,
	) -> Result<()> {
		let destination = {
			let state = self.state.lock().unwrap();
			state
				.sessions
				.get(&session_id)
				.map(|s| s.config().destination().clone())
				.ok_or_else(|| I2cpError::Misuse(format!("unknown session {session_id}")))?
		};
		self.enqueue_payload(session_id, &destination, protocol, src_port, dst_port, payload, nonce)
	}

	pub fn destroy_session(&self, session_id: u16) -> Result<()> {
		let mut body = Stream::new();
		body.write_u16(session_id);
		self.send_frame(msg::DESTROY_SESSION, body, false)
	}

	pub fn get_bandwidth_limits(&self) -> Result<()> {
		self.send_frame(msg::GET_BANDWIDTH_LIMITS, Stream::new(), false)
	}

	/// Allocates the next `request_id` and sends a `HostLookup` (router
	/// advertises `CAN_HOST_LOOKUP`) or legacy `DestLookup`.
	pub fn destination_lookup(&self, session_id: u16, address: &str) -> Result<u32> {
		let (request_id, can_host_lookup) = {
			let mut state = self.state.lock().unwrap();
			state.lookup_request_id = state.lookup_request_id.wrapping_add(1);
			(state.lookup_request_id, state.router.can_host_lookup())
		};
		if can_host_lookup {
			let (lookup_type, data) = if is_b32_address(address) {
				(HOST_LOOKUP_TYPE_HASH, decode_b32_host(address)?)
			} else {
				(HOST_LOOKUP_TYPE_HOST, address.as_bytes().to_vec())
			};
			self.state.lock().unwrap().lookup_req.insert(
				request_id,
				LookupEntry {
					session_id,
					address: address.to_string(),
				},
			);
			let mut body = Stream::new();
			body.write_u16(session_id);
			body.write_u32(request_id);
			body.write_u32(LOOKUP_TIMEOUT_MS);
			body.write_u8(lookup_type);
			body.write_bytes(&data);
			self.send_frame(msg::HOST_LOOKUP, body, true)?;
		} else {
			if !is_b32_address(address) {
				return Err(I2cpError::Misuse(
					"router lacks HostLookup support; only .b32.i2p addresses can be resolved".into(),
				));
			}
			let hash = decode_b32_host(address)?;
			let key = hex_encode(&hash);
			{
				let mut state = self.state.lock().unwrap();
				state
					.lookup_by_b32
					.insert(key, (request_id, session_id, address.to_string()));
				state.lookup_req.insert(
					request_id,
					LookupEntry {
						session_id,
						address: address.to_string(),
					},
				);
			}
			let mut body = Stream::new();
			body.write_bytes(&hash);
			self.send_frame(msg::DEST_LOOKUP, body, true)?;
		}
		Ok(request_id)
	}

	fn create_lease_set(&self, session_id: u16, leases: &[Lease]) -> Result<()> {
		let destination = {
			let state = self.state.lock().unwrap();
			state
				.sessions
				.get(&session_id)
				.map(|s| s.config().destination().clone())
				.ok_or_else(|| I2cpError::Protocol(format!("RequestVariableLeaseSet for unknown session {session_id}")))?
		};
		let mut leaseset = Stream::new();
		destination.write_to_message(&mut leaseset);
		leaseset.write_bytes(&[0u8; 256]);
		leaseset.write_bytes(&signing_pub_key_bytes(&destination));
		leaseset.write_u8(leases.len() as u8);
		for lease in leases {
			lease.write_to_message(&mut leaseset);
		}
		crypto::sign_stream(destination.sgk(), &mut leaseset)?;

		let mut body = Stream::new();
		body.write_u16(session_id);
		body.write_bytes(&[0u8; 20]);
		body.write_bytes(&[0u8; 256]);
		body.write_bytes(leaseset.bytes());
		self.send_frame(msg::CREATE_LEASE_SET, body, false)
	}
}

/// Builds a `TcpTransport` from `$HOME/.i2cp.conf` (falling back to
/// `127.0.0.1:7654`), dials it, and runs the handshake. Composes three
/// fallible steps (config load, transport dial, protocol handshake) behind
/// a single `anyhow::Result`, the way the rest of this crate's callers
/// compose construction logic.
pub fn connect_from_config() -> anyhow::Result<Arc<Client<TcpTransport>>> {
	let config = crate::config::Config::load_from_home();
	let mut transport = TcpTransport::new();
	transport.set_property(PROP_ADDRESS, &config.host)?;
	transport.set_property(PROP_PORT, &config.port.to_string())?;
	transport.set_property(PROP_USE_TLS, if config.use_tls { "true" } else { "false" })?;
	let client = match (&config.username, &config.password) {
		(Some(user), Some(pass)) => Client::with_credentials(transport, user.clone(), pass.clone()),
		_ => Client::new(transport),
	};
	client.connect()?;
	Ok(client)
}

/// Like [`connect_from_config`], but lets the caller override individual
/// connection parameters via [`crate::config::ClientOptions`] instead of
/// editing `$HOME/.i2cp.conf`.
pub fn connect_with_options(options: crate::config::ClientOptions) -> anyhow::Result<Arc<Client<TcpTransport>>> {
	let mut config = crate::config::Config::load_from_home();
	options.apply(&mut config);
	let mut transport = TcpTransport::new();
	transport.set_property(PROP_ADDRESS, &config.host)?;
	transport.set_property(PROP_PORT, &config.port.to_string())?;
	transport.set_property(PROP_USE_TLS, if config.use_tls { "true" } else { "false" })?;
	if let Some(cert) = options.tls_client_cert_path() {
		transport.set_property(PROP_TLS_CLIENT_CERT, cert)?;
	}
	let client = match (&config.username, &config.password) {
		(Some(user), Some(pass)) => Client::with_credentials(transport, user.clone(), pass.clone()),
		_ => Client::new(transport),
	};
	client.connect()?;
	Ok(client)
}

impl<T: Transport> OutboundSink for Client<T> {
	fn enqueue_payload(
		&self,
		session_id: u16,
		dest: &Destination,
		protocol: u8,
		src_port: u16,
		dst_port: u16,
		payload: &[u8],
		nonce: u32,
	) -> Result<()> {
		let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
		encoder
			.write_all(payload)
			.map_err(|e| I2cpError::Protocol(format!("gzip encode: {e}")))?;
		let mut gz = encoder
			.finish()
			.map_err(|e| I2cpError::Protocol(format!("gzip encode: {e}")))?;
		if gz.len() < 10 {
			return Err(I2cpError::Protocol("gzip output shorter than its own header".into()));
		}
		gz[4..6].copy_from_slice(&src_port.to_le_bytes());
		gz[6..8].copy_from_slice(&dst_port.to_le_bytes());
		gz[9] = protocol;

		let mut body = Stream::new();
		body.write_u16(session_id);
		dest.write_to_message(&mut body);
		body.write_u32(gz.len() as u32);
		body.write_bytes(&gz);
		body.write_u32(nonce);
		self.send_frame(msg::SEND_MESSAGE, body, true)
	}
}

fn signing_pub_key_bytes(dest: &Destination) -> Vec<u8> {
	let mut s = Stream::new();
	dest.write_to_message(&mut s);
	s.bytes()[crate::destination::PUB_KEY_LEN
		..crate::destination::PUB_KEY_LEN + crate::destination::SIGN_PUB_KEY_LEN]
		.to_vec()
}

fn is_b32_address(address: &str) -> bool {
	address.len() == 60 && address.ends_with(".b32.i2p")
}

fn decode_b32_host(address: &str) -> Result<Vec<u8>> {
	let host = &address[..address.len() - ".b32.i2p".len()];
	let decoded = crypto::decode_stream(
		crate::crypto::Codec::Base32,
		&Stream::from_vec(host.as_bytes().to_vec()),
	)?;
	Ok(decoded.into_vec())
}

fn hex_encode(bytes: &[u8]) -> String {
	let mut s = String::with_capacity(bytes.len() * 2);
	for b in bytes {
		s.push_str(&format!("{b:02x}"));
	}
	s
}

fn read_exact_from_transport<T: Transport + ?Sized>(transport: &mut T, buf: &mut [u8]) -> Result<()> {
	let mut read = 0;
	while read < buf.len() {
		let n = transport.receive(&mut buf[read..])?;
		if n == 0 {
			return Err(I2cpError::Transport("transport closed mid-read".into()));
		}
		read += n;
	}
	Ok(())
}
